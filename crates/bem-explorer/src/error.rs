use std::path::PathBuf;

/// Failure reported by an [`EntityWalker`](crate::walker::EntityWalker).
///
/// Variants carry rendered messages rather than source errors so a failed
/// aggregation can be handed to every caller that observes it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalkError {
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid cell: {0}")]
    InvalidCell(String),

    #[error("Walker error: {0}")]
    Walker(String),
}

impl WalkError {
    pub fn io(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplorerError {
    #[error("Walk failed: {0}")]
    Walk(#[from] WalkError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Host error: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
