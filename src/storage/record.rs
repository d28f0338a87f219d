//! Snapshot record format
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, includes itself and the checksum)
//! +------------------+
//! | Collection       | (length-prefixed string)
//! +------------------+
//! | Document ID      | (length-prefixed string)
//! +------------------+
//! | Sequence         | (u64 LE, insertion order)
//! +------------------+
//! | Document Body    | (length-prefixed bytes)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io::{self, Cursor, Read};

use super::checksum::{compute_checksum, verify_checksum};

/// Smallest possible record: length + two empty strings + sequence + empty body + checksum
pub const MIN_RECORD_SIZE: usize = 4 + 4 + 4 + 8 + 4 + 4;

/// One document as stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub collection: String,
    pub document_id: String,
    pub sequence: u64,
    pub body: Vec<u8>,
}

impl DocumentRecord {
    pub fn new(
        collection: impl Into<String>,
        document_id: impl Into<String>,
        sequence: u64,
        body: Vec<u8>,
    ) -> Self {
        Self {
            collection: collection.into(),
            document_id: document_id.into(),
            sequence,
            body,
        }
    }

    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            4 + self.collection.len() + 4 + self.document_id.len() + 8 + 4 + self.body.len(),
        );

        buf.extend_from_slice(&(self.collection.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.collection.as_bytes());

        buf.extend_from_slice(&(self.document_id.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.document_id.as_bytes());

        buf.extend_from_slice(&self.sequence.to_le_bytes());

        buf.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.body);

        buf
    }

    /// Serialize the complete record, length prefix and checksum included.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let record_length = (4 + body.len() + 4) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);

        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Deserialize a record from bytes, verifying checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let mut checksum_buf = [0u8; 4];
        checksum_buf.copy_from_slice(&data[checksum_offset..record_length]);
        let stored_checksum = u32::from_le_bytes(checksum_buf);

        if !verify_checksum(&data[..checksum_offset], stored_checksum) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    compute_checksum(&data[..checksum_offset]),
                    stored_checksum
                ),
            ));
        }

        let mut cursor = Cursor::new(&data[4..checksum_offset]);

        let collection = read_string(&mut cursor)?;
        let document_id = read_string(&mut cursor)?;

        let mut seq_buf = [0u8; 8];
        cursor.read_exact(&mut seq_buf)?;
        let sequence = u64::from_le_bytes(seq_buf);

        let body = read_bytes(&mut cursor)?;

        Ok((
            Self {
                collection,
                document_id,
                sequence,
                body,
            },
            record_length,
        ))
    }
}

fn read_bytes<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
    let buf = read_bytes(reader)?;
    String::from_utf8(buf)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentRecord {
        DocumentRecord::new(
            "students",
            "6f1c2b1e-8f43-4a43-9a8e-1e7f2b9c0d11",
            7,
            br#"{"name":"Ada","age":20,"course":"Mathematics"}"#.to_vec(),
        )
    }

    #[test]
    fn test_record_roundtrip() {
        let record = sample();
        let serialized = record.serialize();
        let (decoded, consumed) = DocumentRecord::deserialize(&serialized).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(consumed, serialized.len());
    }

    #[test]
    fn test_consumes_only_one_record() {
        let mut bytes = sample().serialize();
        let first_len = bytes.len();
        bytes.extend_from_slice(&DocumentRecord::new("students", "b", 8, vec![]).serialize());

        let (_, consumed) = DocumentRecord::deserialize(&bytes).unwrap();
        assert_eq!(consumed, first_len);
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut serialized = sample().serialize();
        let mid = serialized.len() / 2;
        serialized[mid] ^= 0xFF;

        let err = DocumentRecord::deserialize(&serialized).unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_truncated_record_rejected() {
        let serialized = sample().serialize();
        let err = DocumentRecord::deserialize(&serialized[..serialized.len() - 3]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
