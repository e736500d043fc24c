use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Customer not found: {query}")]
    NotFound { query: String },

    #[error("Cannot read store {}: {reason}", .path.display())]
    StorageRead { path: PathBuf, reason: String },

    #[error("Cannot write store {}: {source}", .path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write export {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation { field, reason: reason.into() }
    }

    pub fn not_found(query: impl Into<String>) -> Self {
        Self::NotFound { query: query.into() }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
