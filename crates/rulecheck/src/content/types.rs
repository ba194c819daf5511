use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    /// 1-based line/column of a byte offset into `raw`.
    pub(crate) fn at_offset(raw: &str, offset: usize) -> Self {
        let prefix = &raw[..offset.min(raw.len())];
        let line = prefix.matches('\n').count() + 1;
        let line_start = prefix.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
        Self {
            line,
            column: prefix[line_start..].chars().count() + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputErrorCode {
    ReadFile,
    JsonMalformed,
    UnexpectedShape,
    PatternNotFound,
    EmptyExtraction,
}

#[derive(Debug, Clone)]
pub struct AuditInputError {
    pub code: InputErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for AuditInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for AuditInputError {}

pub(crate) fn read_input(path: &Path) -> Result<String, AuditInputError> {
    fs::read_to_string(path).map_err(|source| AuditInputError {
        code: InputErrorCode::ReadFile,
        message: format!("failed to read input file: {source}"),
        file_path: path.to_path_buf(),
        location: None,
    })
}

/// Deserializes JSON keeping the path of the field that failed to match.
pub(crate) fn parse_json_document<T>(file_path: &Path, raw: &str) -> Result<T, AuditInputError>
where
    T: serde::de::DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        let inner = error.into_inner();
        let location = Some(SourceLocation {
            line: inner.line(),
            column: inner.column(),
        });
        if inner.is_data() {
            AuditInputError {
                code: InputErrorCode::UnexpectedShape,
                message: format!("document does not match the expected shape at '{json_path}': {inner}"),
                file_path: file_path.to_path_buf(),
                location,
            }
        } else {
            AuditInputError {
                code: InputErrorCode::JsonMalformed,
                message: format!("malformed JSON: {inner}"),
                file_path: file_path.to_path_buf(),
                location,
            }
        }
    })
}
