//! Error types for rowsync.

use thiserror::Error;

/// Errors that can occur in rowsync operations.
#[derive(Error, Debug)]
pub enum RowSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed record in row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("No records to derive a date range from")]
    EmptyBatch,

    #[error("Sheet error: {0}")]
    Sheet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RowSyncError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RowSyncError::NotFound(_))
    }

    /// Sheet row a record error refers to.
    pub fn row(&self) -> Option<usize> {
        match self {
            RowSyncError::MalformedRecord { row, .. } => Some(*row),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RowSyncError {
    fn from(e: serde_json::Error) -> Self {
        RowSyncError::Serialization(e.to_string())
    }
}

/// Result type alias for rowsync operations.
pub type RowSyncResult<T> = Result<T, RowSyncError>;
