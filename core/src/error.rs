use std::fmt;

/// Failures a board operation can report. None of them is fatal: the
/// operation is skipped and the session keeps running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    MissingElement { id: String },
    InvalidInput { reason: String },
    LoadFailure { source: String },
}

impl BoardError {
    pub fn missing(id: impl Into<String>) -> Self {
        BoardError::MissingElement { id: id.into() }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        BoardError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn load_failure(source: impl Into<String>) -> Self {
        BoardError::LoadFailure {
            source: source.into(),
        }
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::MissingElement { id } => write!(f, "element '{id}' not found"),
            BoardError::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            BoardError::LoadFailure { source } => write!(f, "failed to load '{source}'"),
        }
    }
}

impl std::error::Error for BoardError {}
