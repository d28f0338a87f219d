//! Snapshot reader with strict corruption detection
//!
//! Every record's checksum is verified. A checksum failure or a truncated
//! tail is reported as corruption; the store refuses to open.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::errors::{StoreError, StoreResult};
use super::record::{DocumentRecord, MIN_RECORD_SIZE};

/// Sequential reader over a snapshot file
pub struct SnapshotReader {
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl SnapshotReader {
    /// Opens the snapshot file for reading.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = File::open(path).map_err(|e| {
            StoreError::read_failed(format!("Failed to open {}", path.display()), e)
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StoreError::read_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    /// Reads the next record.
    ///
    /// - `Ok(Some(record))` if a record was read
    /// - `Ok(None)` at end of file
    /// - `Err(Corruption)` on checksum failure or truncation
    pub fn read_next(&mut self) -> StoreResult<Option<DocumentRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated snapshot: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StoreError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 || record_length > remaining {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Invalid record length {} with {} bytes remaining",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StoreError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (record, consumed) = DocumentRecord::deserialize(&record_buf)
            .map_err(|e| StoreError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;
        Ok(Some(record))
    }

    /// Reads every remaining record, paired with the offset it starts at.
    pub fn read_all(&mut self) -> StoreResult<Vec<(u64, DocumentRecord)>> {
        let mut records = Vec::new();
        loop {
            let offset = self.current_offset;
            match self.read_next()? {
                Some(record) => records.push((offset, record)),
                None => return Ok(records),
            }
        }
    }
}
