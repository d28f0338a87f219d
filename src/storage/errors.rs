//! Storage error types
//!
//! Error codes:
//! - STUDENTDB_STORAGE_INVALID_URI (startup)
//! - STUDENTDB_STORAGE_OPEN_FAILED (startup)
//! - STUDENTDB_STORAGE_WRITE_FAILED
//! - STUDENTDB_STORAGE_READ_FAILED
//! - STUDENTDB_DATA_CORRUPTION (FATAL)
//! - STUDENTDB_STORAGE_DUPLICATE_KEY
//! - STUDENTDB_STORAGE_DECODE_FAILED
//! - STUDENTDB_STORAGE_CLOSED
//! - STUDENTDB_STORAGE_POISONED

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection string could not be understood
    #[error("invalid store URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// Data directory or file could not be opened
    #[error("failed to open store at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Persisting a snapshot failed
    #[error("storage write failed: {context}: {source}")]
    Write {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Reading the data file failed
    #[error("storage read failed: {context}: {source}")]
    Read {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Checksum mismatch or truncated record
    #[error("data corruption at offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },

    /// A document with the same id already exists in the collection
    #[error("duplicate document id '{0}'")]
    DuplicateKey(String),

    /// Stored body could not be decoded into the expected entity
    #[error("malformed document '{id}': {reason}")]
    Decode { id: String, reason: String },

    /// The store has been closed
    #[error("store is closed")]
    Closed,

    /// A thread panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn invalid_uri(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    pub fn write_failed(context: impl Into<String>, source: io::Error) -> Self {
        Self::Write {
            context: context.into(),
            source,
        }
    }

    pub fn read_failed(context: impl Into<String>, source: io::Error) -> Self {
        Self::Read {
            context: context.into(),
            source,
        }
    }

    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self::Corruption {
            offset,
            reason: reason.into(),
        }
    }

    pub fn decode(id: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidUri { .. } => "STUDENTDB_STORAGE_INVALID_URI",
            StoreError::Open { .. } => "STUDENTDB_STORAGE_OPEN_FAILED",
            StoreError::Write { .. } => "STUDENTDB_STORAGE_WRITE_FAILED",
            StoreError::Read { .. } => "STUDENTDB_STORAGE_READ_FAILED",
            StoreError::Corruption { .. } => "STUDENTDB_DATA_CORRUPTION",
            StoreError::DuplicateKey(_) => "STUDENTDB_STORAGE_DUPLICATE_KEY",
            StoreError::Decode { .. } => "STUDENTDB_STORAGE_DECODE_FAILED",
            StoreError::Closed => "STUDENTDB_STORAGE_CLOSED",
            StoreError::Poisoned => "STUDENTDB_STORAGE_POISONED",
        }
    }

    /// Corruption means the data file can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Corruption { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            StoreError::invalid_uri("x", "y"),
            StoreError::write_failed("w", io::Error::other("boom")),
            StoreError::read_failed("r", io::Error::other("boom")),
            StoreError::corruption_at_offset(0, "bad"),
            StoreError::DuplicateKey("a".into()),
            StoreError::decode("a", "bad json"),
            StoreError::Closed,
            StoreError::Poisoned,
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_only_corruption_is_fatal() {
        assert!(StoreError::corruption_at_offset(12, "checksum").is_fatal());
        assert!(!StoreError::Closed.is_fatal());
        assert!(!StoreError::DuplicateKey("x".into()).is_fatal());
    }

    #[test]
    fn test_display_includes_offset() {
        let err = StoreError::corruption_at_offset(42, "Checksum mismatch");
        let display = err.to_string();
        assert!(display.contains("42"));
        assert!(display.contains("Checksum mismatch"));
    }
}
