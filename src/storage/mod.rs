//! Embedded document storage for studentdb
//!
//! The store holds the canonical persistent state of all documents and is
//! reached through a connection string (`memory://` or `file://<dir>`).
//!
//! # Design Principles
//!
//! - One call touches one document
//! - Checksum-verified on every load
//! - Snapshot replaced atomically on every mutation
//! - Deleted documents are gone; no tombstones are kept
//! - Corruption is fatal at open

mod checksum;
mod errors;
mod reader;
mod record;
mod store;
mod uri;
mod writer;

pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{StoreError, StoreResult};
pub use reader::SnapshotReader;
pub use record::DocumentRecord;
pub use store::{connect, Document, DocumentStore, DocumentUpdate, EmbeddedStore};
pub use uri::StoreUri;
pub use writer::{SnapshotWriter, SNAPSHOT_FILE};
