//! Snapshot writer
//!
//! The data file always holds the complete live document set. A write
//! produces `documents.dat.tmp`, fsyncs it and renames it over
//! `documents.dat`; readers see either the previous or the new snapshot,
//! never a mix. Deleted documents are simply absent from the next snapshot.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::record::DocumentRecord;

/// File name of the live snapshot inside the data directory
pub const SNAPSHOT_FILE: &str = "documents.dat";
const SNAPSHOT_TMP_FILE: &str = "documents.dat.tmp";

/// Writes complete snapshots into a data directory
#[derive(Debug)]
pub struct SnapshotWriter {
    snapshot_path: PathBuf,
    tmp_path: PathBuf,
}

impl SnapshotWriter {
    /// Prepares the data directory, creating it if missing.
    ///
    /// An empty snapshot is written when none exists yet so that the
    /// directory is known to be writable before the service starts.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(data_dir).map_err(|e| StoreError::Open {
            path: data_dir.to_path_buf(),
            source: e,
        })?;

        let writer = Self {
            snapshot_path: data_dir.join(SNAPSHOT_FILE),
            tmp_path: data_dir.join(SNAPSHOT_TMP_FILE),
        };

        // Leftover from a crash between write and rename; the live file is authoritative
        if writer.tmp_path.exists() {
            fs::remove_file(&writer.tmp_path).map_err(|e| StoreError::Open {
                path: writer.tmp_path.clone(),
                source: e,
            })?;
        }

        if !writer.snapshot_path.exists() {
            writer.write_snapshot(std::iter::empty())?;
        }

        Ok(writer)
    }

    /// Path of the live snapshot
    pub fn path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Atomically replaces the snapshot with the given records.
    pub fn write_snapshot<'a, I>(&self, records: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = &'a DocumentRecord>,
    {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.tmp_path)
            .map_err(|e| {
                StoreError::write_failed(
                    format!("Failed to create {}", self.tmp_path.display()),
                    e,
                )
            })?;

        let mut out = BufWriter::new(file);
        for record in records {
            out.write_all(&record.serialize()).map_err(|e| {
                StoreError::write_failed(
                    format!("Failed to write document {}", record.document_id),
                    e,
                )
            })?;
        }

        let file = out
            .into_inner()
            .map_err(|e| StoreError::write_failed("Failed to flush snapshot", e.into_error()))?;
        file.sync_all()
            .map_err(|e| StoreError::write_failed("fsync failed on snapshot", e))?;
        drop(file);

        fs::rename(&self.tmp_path, &self.snapshot_path).map_err(|e| {
            StoreError::write_failed(
                format!("Failed to replace {}", self.snapshot_path.display()),
                e,
            )
        })?;

        sync_dir(self.snapshot_path.parent());
        Ok(())
    }
}

/// Best-effort fsync of the directory entry after a rename
fn sync_dir(dir: Option<&Path>) {
    if let Some(dir) = dir {
        if let Ok(handle) = File::open(dir) {
            let _ = handle.sync_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::reader::SnapshotReader;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory_and_empty_snapshot() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("nested").join("studentdb");

        let writer = SnapshotWriter::open(&data_dir).unwrap();
        assert!(writer.path().exists());
        assert_eq!(fs::metadata(writer.path()).unwrap().len(), 0);
    }

    #[test]
    fn test_snapshot_replaces_previous_contents() {
        let temp = TempDir::new().unwrap();
        let writer = SnapshotWriter::open(temp.path()).unwrap();

        let a = DocumentRecord::new("students", "a", 0, b"{}".to_vec());
        let b = DocumentRecord::new("students", "b", 1, b"{}".to_vec());
        writer.write_snapshot([&a, &b]).unwrap();
        writer.write_snapshot([&b]).unwrap();

        let records = SnapshotReader::open(writer.path()).unwrap().read_all().unwrap();
        assert_eq!(records, vec![(0, b)]);
        assert!(!temp.path().join(SNAPSHOT_TMP_FILE).exists());
    }

    #[test]
    fn test_open_discards_stale_tmp_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SNAPSHOT_TMP_FILE), b"partial").unwrap();

        SnapshotWriter::open(temp.path()).unwrap();
        assert!(!temp.path().join(SNAPSHOT_TMP_FILE).exists());
    }

    #[test]
    fn test_open_keeps_existing_snapshot() {
        let temp = TempDir::new().unwrap();
        let record = DocumentRecord::new("students", "a", 0, b"{}".to_vec());
        SnapshotWriter::open(temp.path())
            .unwrap()
            .write_snapshot([&record])
            .unwrap();

        let writer = SnapshotWriter::open(temp.path()).unwrap();
        let records = SnapshotReader::open(writer.path()).unwrap().read_all().unwrap();
        assert_eq!(records, vec![(0, record)]);
    }
}
