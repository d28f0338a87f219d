//! Store connection strings
//!
//! - `memory://` keeps documents in process memory only
//! - `file://<dir>` persists snapshots under `<dir>`

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::errors::StoreError;

/// Parsed store connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUri {
    Memory,
    File(PathBuf),
}

impl FromStr for StoreUri {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let uri = raw.trim();
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| StoreError::invalid_uri(raw, "expected <scheme>://"))?;

        match scheme.to_ascii_lowercase().as_str() {
            "memory" if rest.is_empty() => Ok(StoreUri::Memory),
            "memory" => Err(StoreError::invalid_uri(
                raw,
                "memory:// does not take a path",
            )),
            "file" if rest.is_empty() => {
                Err(StoreError::invalid_uri(raw, "file:// requires a directory"))
            }
            "file" => Ok(StoreUri::File(PathBuf::from(rest))),
            other => Err(StoreError::invalid_uri(
                raw,
                format!("unsupported scheme '{}' (use memory:// or file://)", other),
            )),
        }
    }
}

impl fmt::Display for StoreUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreUri::Memory => write!(f, "memory://"),
            StoreUri::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_uri() {
        assert_eq!("memory://".parse::<StoreUri>().unwrap(), StoreUri::Memory);
        assert!("memory://somewhere".parse::<StoreUri>().is_err());
    }

    #[test]
    fn test_file_uri() {
        assert_eq!(
            "file://./data/studentdb".parse::<StoreUri>().unwrap(),
            StoreUri::File(PathBuf::from("./data/studentdb"))
        );
        assert_eq!(
            "file:///var/lib/studentdb".parse::<StoreUri>().unwrap(),
            StoreUri::File(PathBuf::from("/var/lib/studentdb"))
        );
    }

    #[test]
    fn test_rejected_uris() {
        for raw in ["", "file://", "mongodb://localhost:27017/studentdb", "./data"] {
            let err = raw.parse::<StoreUri>().unwrap_err();
            assert_eq!(err.code(), "STUDENTDB_STORAGE_INVALID_URI", "{}", raw);
        }
    }

    #[test]
    fn test_display_roundtrip() {
        let uri: StoreUri = "file://./data/studentdb".parse().unwrap();
        assert_eq!(uri.to_string(), "file://./data/studentdb");
    }
}
