use thiserror::Error;

/// Result type alias using DiffError
pub type Result<T> = std::result::Result<T, DiffError>;

/// Error taxonomy for diff and reconciliation operations.
///
/// Each variant maps to a stable error code via [`DiffError::code`] that can
/// be used for programmatic handling, testing, and caller-facing responses.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffError {
    /// A collection routed through the file reconciliation path contained an
    /// element that is not a file payload. This is a caller contract error,
    /// not a recoverable runtime condition.
    #[error("element in file collection is not a file payload: {detail}")]
    NotAFilePayload { detail: String },

    /// A file payload carried content that could not be decoded
    #[error("invalid file payload content: {detail}")]
    InvalidPayload { detail: String },

    /// A snapshot input had the wrong top-level shape (e.g. not a JSON array
    /// where a collection was expected)
    #[error("invalid snapshot: {detail}")]
    InvalidSnapshot { detail: String },

    /// Serializing a computed diff structure failed
    #[error("serialization failed: {detail}")]
    Serialization { detail: String },
}

impl DiffError {
    /// Get the stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            DiffError::NotAFilePayload { .. } => "ERR_NOT_A_FILE_PAYLOAD",
            DiffError::InvalidPayload { .. } => "ERR_INVALID_PAYLOAD",
            DiffError::InvalidSnapshot { .. } => "ERR_INVALID_SNAPSHOT",
            DiffError::Serialization { .. } => "ERR_SERIALIZATION",
        }
    }
}

impl From<serde_json::Error> for DiffError {
    fn from(e: serde_json::Error) -> Self {
        DiffError::Serialization {
            detail: e.to_string(),
        }
    }
}
