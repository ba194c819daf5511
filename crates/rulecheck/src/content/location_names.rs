use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use tracing::info;

use super::types::{read_input, AuditInputError, InputErrorCode, SourceLocation};

const RAW_LOCATIONS_PATTERN: &str = r"(?s)RAW_LOCATIONS\s*=\s*\[(.*?)\];";
const QUOTED_NAME_PATTERN: &str = r#""([^"]+)""#;

/// Location names known to the external system.
///
/// `ordered` keeps the source order (and any repeats) for reporting; `set` answers membership.
#[derive(Debug, Clone, Default)]
pub struct CanonicalLocationNames {
    ordered: Vec<String>,
    set: HashSet<String>,
}

impl CanonicalLocationNames {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ordered = names.into_iter().map(Into::into).collect::<Vec<String>>();
        let set = ordered.iter().cloned().collect();
        Self { ordered, set }
    }

    /// Pulls the names out of the `RAW_LOCATIONS = [ ... ];` literal of a source file.
    pub fn extract(file_path: &Path, raw: &str) -> Result<Self, AuditInputError> {
        let list_re = Regex::new(RAW_LOCATIONS_PATTERN).expect("static pattern");
        let name_re = Regex::new(QUOTED_NAME_PATTERN).expect("static pattern");

        let Some(list) = list_re.captures(raw).and_then(|caps| caps.get(1)) else {
            return Err(AuditInputError {
                code: InputErrorCode::PatternNotFound,
                message: "no `RAW_LOCATIONS = [ ... ];` list found".to_string(),
                file_path: file_path.to_path_buf(),
                location: None,
            });
        };

        let names = name_re
            .captures_iter(list.as_str())
            .map(|caps| caps[1].to_string())
            .collect::<Vec<_>>();
        if names.is_empty() {
            return Err(AuditInputError {
                code: InputErrorCode::EmptyExtraction,
                message: "`RAW_LOCATIONS` contains no quoted names".to_string(),
                file_path: file_path.to_path_buf(),
                location: Some(SourceLocation::at_offset(raw, list.start())),
            });
        }

        Ok(Self::from_names(names))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.set.contains(name)
    }

    pub fn ordered(&self) -> &[String] {
        &self.ordered
    }

    pub fn distinct_len(&self) -> usize {
        self.set.len()
    }
}

pub fn load_location_names(path: &Path) -> Result<CanonicalLocationNames, AuditInputError> {
    let raw = read_input(path)?;
    let names = CanonicalLocationNames::extract(path, &raw)?;
    info!(
        path = %path.display(),
        listed = names.ordered().len(),
        distinct = names.distinct_len(),
        "location_names_extracted"
    );
    Ok(names)
}
