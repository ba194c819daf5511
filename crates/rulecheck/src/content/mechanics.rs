use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use tracing::info;

use super::types::{parse_json_document, read_input, AuditInputError, InputErrorCode};

const MAPPING_ENTRY_PATTERN: &str =
    r#"['"]([^'"]+)['"]\s*:\s*\{\s*logicKey\s*:\s*['"]([^'"]+)['"]"#;

/// Lower-cases `label` and keeps only `a-z` and `0-9`.
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MappingEntry {
    logic_key: String,
}

/// Mechanic label -> logic key, indexed by normalized label and by normalized key.
#[derive(Debug, Clone, Default)]
pub struct MechanicTable {
    entries: Vec<(String, String)>,
    lookup: HashMap<String, String>,
}

impl MechanicTable {
    pub fn from_entries<I, L, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (L, K)>,
        L: Into<String>,
        K: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(label, key)| (label.into(), key.into()))
            .collect::<Vec<(String, String)>>();

        let mut lookup = HashMap::with_capacity(entries.len() * 2);
        for (label, key) in &entries {
            lookup.insert(normalize_label(label), key.clone());
        }
        // Keys resolve to themselves, winning over a label that normalizes the same way.
        for (_, key) in &entries {
            lookup.insert(normalize_label(key), key.clone());
        }

        Self { entries, lookup }
    }

    /// Scans a source file for `"label": { logicKey: "key" ... }` entries.
    pub fn extract(file_path: &Path, raw: &str) -> Result<Self, AuditInputError> {
        let entry_re = Regex::new(MAPPING_ENTRY_PATTERN).expect("static pattern");
        let entries = entry_re
            .captures_iter(raw)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect::<Vec<_>>();
        if entries.is_empty() {
            return Err(AuditInputError {
                code: InputErrorCode::PatternNotFound,
                message: "no `label: { logicKey: ... }` mapping entries found".to_string(),
                file_path: file_path.to_path_buf(),
                location: None,
            });
        }
        Ok(Self::from_entries(entries))
    }

    /// Reads `{ "<label>": { "logicKey": "<key>", "display": "<text>" } }`.
    pub fn parse_json(file_path: &Path, raw: &str) -> Result<Self, AuditInputError> {
        let document = parse_json_document::<IndexMap<String, MappingEntry>>(file_path, raw)?;
        if document.is_empty() {
            return Err(AuditInputError {
                code: InputErrorCode::EmptyExtraction,
                message: "mapping document has no entries".to_string(),
                file_path: file_path.to_path_buf(),
                location: None,
            });
        }
        if let Some(label) = document
            .iter()
            .find(|(_, entry)| entry.logic_key.trim().is_empty())
            .map(|(label, _)| label)
        {
            return Err(AuditInputError {
                code: InputErrorCode::UnexpectedShape,
                message: format!("mapping '{label}' has an empty logicKey"),
                file_path: file_path.to_path_buf(),
                location: None,
            });
        }
        Ok(Self::from_entries(
            document
                .into_iter()
                .map(|(label, entry)| (label, entry.logic_key)),
        ))
    }

    /// Looks up an already-normalized mechanic.
    pub fn get(&self, normalized: &str) -> Option<&str> {
        self.lookup.get(normalized).map(String::as_str)
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn lookup_len(&self) -> usize {
        self.lookup.len()
    }
}

/// Loads the table from JSON when the file has a `.json` extension, otherwise by pattern scan.
pub fn load_mechanic_table(path: &Path) -> Result<MechanicTable, AuditInputError> {
    let raw = read_input(path)?;
    let structured = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let table = if structured {
        MechanicTable::parse_json(path, &raw)?
    } else {
        MechanicTable::extract(path, &raw)?
    };
    info!(
        path = %path.display(),
        structured,
        entry_count = table.entries().len(),
        lookup_size = table.lookup_len(),
        "mechanic_table_loaded"
    );
    Ok(table)
}
