use thiserror::Error;

pub type ProbeResult<T> = Result<T, ProbeError>;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Cannot open workbook '{path}': {reason}")]
    FileAccess { path: String, reason: String },

    #[error("Unknown sheet '{name}' (available: {})", available.join(", "))]
    UnknownSheet { name: String, available: Vec<String> },

    #[error("Failed to read sheet '{sheet}' of '{path}': {reason}")]
    SheetRead {
        path: String,
        sheet: String,
        reason: String,
    },

    #[error("Failed to read sheet '{sheet}' as a table: {reason}")]
    TabularRead { sheet: String, reason: String },

    #[error("Invalid cell coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid named-cell profile: {0}")]
    Profile(String),

    #[error("Workbook opened in {actual} mode, operation requires {expected} mode")]
    ModeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ProbeError {
    /// Whether a report can carry on past this error for the current section
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProbeError::TabularRead { .. } | ProbeError::UnknownSheet { .. }
        )
    }
}
