//! Embedded document store
//!
//! Documents live in named collections and are keyed by id. All reads are
//! served from memory; with a `file://` URI every mutation is followed by an
//! atomic snapshot write, and a failed write rolls the mutation back so
//! memory never runs ahead of disk.
//!
//! Writes are serialized by a single `RwLock`; each call touches one
//! document, and concurrent writers to the same document are
//! last-writer-wins.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::errors::{StoreError, StoreResult};
use super::reader::SnapshotReader;
use super::record::DocumentRecord;
use super::uri::StoreUri;
use super::writer::SnapshotWriter;

/// A stored document: an id and its encoded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub body: Vec<u8>,
}

impl Document {
    pub fn new(id: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }
}

/// Read-modify-write callback for [`DocumentStore::update`].
///
/// Receives the current body and returns the replacement, or `None` to
/// leave the document as it is.
pub type DocumentUpdate<'a> = Box<dyn FnOnce(&[u8]) -> Option<Vec<u8>> + 'a>;

/// Per-document operations over named collections
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. Fails with `DuplicateKey` if the id exists.
    fn insert(&self, collection: &str, document: Document) -> StoreResult<()>;

    /// All documents of a collection, in insertion order
    fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Atomically rewrite one document from its current body.
    ///
    /// `apply` runs while the document is locked, so concurrent updates to
    /// the same id never interleave. Returns `false` when no document has
    /// that id, in which case `apply` is not called.
    fn update(&self, collection: &str, id: &str, apply: DocumentUpdate<'_>) -> StoreResult<bool>;

    /// Remove a document, returning it if it existed
    fn remove(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    fn document_count(&self, collection: &str) -> StoreResult<usize>;

    /// Close the store. Every later call fails with `Closed`.
    fn close(&self) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
struct Entry {
    sequence: u64,
    body: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    closed: bool,
    next_sequence: u64,
    collections: HashMap<String, BTreeMap<String, Entry>>,
}

impl State {
    fn entry_mut(&mut self, collection: &str, id: &str) -> Option<&mut Entry> {
        self.collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
    }

    fn records(&self) -> Vec<DocumentRecord> {
        let mut records: Vec<DocumentRecord> = self
            .collections
            .iter()
            .flat_map(|(collection, docs)| {
                docs.iter().map(move |(id, entry)| {
                    DocumentRecord::new(collection.clone(), id.clone(), entry.sequence, entry.body.clone())
                })
            })
            .collect();
        records.sort_by_key(|r| r.sequence);
        records
    }
}

/// Document store opened from a connection string
#[derive(Debug)]
pub struct EmbeddedStore {
    uri: StoreUri,
    state: RwLock<State>,
    snapshot: Option<SnapshotWriter>,
}

impl EmbeddedStore {
    /// Volatile store, for tests and `memory://`
    pub fn memory() -> Self {
        Self {
            uri: StoreUri::Memory,
            state: RwLock::new(State::default()),
            snapshot: None,
        }
    }

    /// Open the store named by `uri`.
    ///
    /// For `file://` this loads and verifies the existing snapshot; any
    /// corruption fails the open.
    pub fn open(uri: &StoreUri) -> StoreResult<Self> {
        let dir = match uri {
            StoreUri::Memory => return Ok(Self::memory()),
            StoreUri::File(dir) => dir,
        };

        let writer = SnapshotWriter::open(dir)?;
        let records = SnapshotReader::open(writer.path())?.read_all()?;

        let mut state = State::default();
        for (offset, record) in records {
            state.next_sequence = state.next_sequence.max(record.sequence + 1);
            let docs = state.collections.entry(record.collection.clone()).or_default();
            if docs.contains_key(&record.document_id) {
                return Err(StoreError::corruption_at_offset(
                    offset,
                    format!(
                        "Document {}:{} appears twice in snapshot",
                        record.collection, record.document_id
                    ),
                ));
            }
            docs.insert(
                record.document_id,
                Entry {
                    sequence: record.sequence,
                    body: record.body,
                },
            );
        }

        Ok(Self {
            uri: uri.clone(),
            state: RwLock::new(state),
            snapshot: Some(writer),
        })
    }

    pub fn uri(&self) -> &StoreUri {
        &self.uri
    }

    /// Document count per collection, sorted by collection name
    pub fn collection_counts(&self) -> StoreResult<Vec<(String, usize)>> {
        let state = self.read()?;
        let mut counts: Vec<_> = state
            .collections
            .iter()
            .map(|(name, docs)| (name.clone(), docs.len()))
            .collect();
        counts.sort();
        Ok(counts)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        if state.closed {
            return Err(StoreError::Closed);
        }
        Ok(state)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        let state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        if state.closed {
            return Err(StoreError::Closed);
        }
        Ok(state)
    }

    fn persist(&self, state: &State) -> StoreResult<()> {
        match &self.snapshot {
            Some(writer) => writer.write_snapshot(state.records().iter()),
            None => Ok(()),
        }
    }
}

impl DocumentStore for EmbeddedStore {
    fn insert(&self, collection: &str, document: Document) -> StoreResult<()> {
        let mut state = self.write()?;
        let sequence = state.next_sequence;

        let docs = state.collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&document.id) {
            return Err(StoreError::DuplicateKey(document.id));
        }
        docs.insert(
            document.id.clone(),
            Entry {
                sequence,
                body: document.body,
            },
        );
        state.next_sequence += 1;

        if let Err(e) = self.persist(&state) {
            if let Some(docs) = state.collections.get_mut(collection) {
                docs.remove(&document.id);
            }
            state.next_sequence = sequence;
            return Err(e);
        }
        Ok(())
    }

    fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let state = self.read()?;
        let Some(docs) = state.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<_> = docs.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.sequence);
        Ok(entries
            .into_iter()
            .map(|(id, entry)| Document::new(id.clone(), entry.body.clone()))
            .collect())
    }

    fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let state = self.read()?;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|entry| Document::new(id, entry.body.clone())))
    }

    fn update(&self, collection: &str, id: &str, apply: DocumentUpdate<'_>) -> StoreResult<bool> {
        let mut state = self.write()?;
        let Some(entry) = state.entry_mut(collection, id) else {
            return Ok(false);
        };
        let Some(body) = apply(&entry.body) else {
            return Ok(true);
        };
        let previous = std::mem::replace(&mut entry.body, body);

        if let Err(e) = self.persist(&state) {
            if let Some(entry) = state.entry_mut(collection, id) {
                entry.body = previous;
            }
            return Err(e);
        }
        Ok(true)
    }

    fn remove(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let mut state = self.write()?;
        let removed = match state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
        {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if let Err(e) = self.persist(&state) {
            state
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), removed);
            return Err(e);
        }
        Ok(Some(Document::new(id, removed.body)))
    }

    fn document_count(&self, collection: &str) -> StoreResult<usize> {
        let state = self.read()?;
        Ok(state.collections.get(collection).map_or(0, |docs| docs.len()))
    }

    fn close(&self) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        state.closed = true;
        Ok(())
    }
}

/// Open a store from its connection string
pub fn connect(uri: &str) -> StoreResult<EmbeddedStore> {
    let uri: StoreUri = uri.parse()?;
    EmbeddedStore::open(&uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doc(id: &str, body: &str) -> Document {
        Document::new(id, body.as_bytes().to_vec())
    }

    #[test]
    fn test_insert_and_find() {
        let store = EmbeddedStore::memory();
        store.insert("students", doc("a", "{}")).unwrap();

        assert_eq!(
            store.find_by_id("students", "a").unwrap(),
            Some(doc("a", "{}"))
        );
        assert_eq!(store.find_by_id("students", "b").unwrap(), None);
        assert_eq!(store.find_by_id("teachers", "a").unwrap(), None);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let store = EmbeddedStore::memory();
        store.insert("students", doc("a", "1")).unwrap();
        let err = store.insert("students", doc("a", "2")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(id) if id == "a"));
        assert_eq!(store.find_by_id("students", "a").unwrap(), Some(doc("a", "1")));
    }

    #[test]
    fn test_find_all_preserves_insertion_order() {
        let store = EmbeddedStore::memory();
        for id in ["zeta", "alpha", "mid"] {
            store.insert("students", doc(id, "{}")).unwrap();
        }
        let ids: Vec<_> = store
            .find_all("students")
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
        assert!(store.find_all("empty").unwrap().is_empty());
    }

    #[test]
    fn test_update_and_remove() {
        let store = EmbeddedStore::memory();
        store.insert("students", doc("a", "old")).unwrap();

        assert!(store
            .update("students", "a", Box::new(|_: &[u8]| Some(b"new".to_vec())))
            .unwrap());
        assert_eq!(store.find_by_id("students", "a").unwrap(), Some(doc("a", "new")));

        assert_eq!(store.remove("students", "a").unwrap(), Some(doc("a", "new")));
        assert_eq!(store.remove("students", "a").unwrap(), None);
        assert_eq!(store.document_count("students").unwrap(), 0);
    }

    #[test]
    fn test_update_rewrites_from_current_body() {
        let store = EmbeddedStore::memory();
        store.insert("students", doc("a", "1")).unwrap();

        let found = store
            .update(
                "students",
                "a",
                Box::new(|body: &[u8]| {
                    let mut next = body.to_vec();
                    next.push(b'2');
                    Some(next)
                }),
            )
            .unwrap();
        assert!(found);
        assert_eq!(store.find_by_id("students", "a").unwrap(), Some(doc("a", "12")));

        // Declining leaves the document untouched
        assert!(store.update("students", "a", Box::new(|_: &[u8]| None)).unwrap());
        assert_eq!(store.find_by_id("students", "a").unwrap(), Some(doc("a", "12")));
    }

    #[test]
    fn test_update_missing_skips_callback() {
        let store = EmbeddedStore::memory();
        let mut called = false;
        let found = store
            .update(
                "students",
                "missing",
                Box::new(|_: &[u8]| {
                    called = true;
                    None
                }),
            )
            .unwrap();
        assert!(!found);
        assert!(!called);
    }

    #[test]
    fn test_concurrent_updates_do_not_interleave() {
        let store = EmbeddedStore::memory();
        store.insert("counters", doc("c", "0")).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        store
                            .update(
                                "counters",
                                "c",
                                Box::new(|body: &[u8]| {
                                    let n: u64 = std::str::from_utf8(body).unwrap().parse().unwrap();
                                    Some((n + 1).to_string().into_bytes())
                                }),
                            )
                            .unwrap();
                    }
                });
            }
        });

        assert_eq!(store.find_by_id("counters", "c").unwrap(), Some(doc("c", "2000")));
    }

    #[test]
    fn test_duplicate_document_reports_its_offset() {
        let temp = TempDir::new().unwrap();
        let first = DocumentRecord::new("students", "a", 0, b"1".to_vec());
        let second = DocumentRecord::new("students", "b", 1, b"2".to_vec());
        let duplicate = DocumentRecord::new("students", "a", 2, b"3".to_vec());

        let writer = SnapshotWriter::open(temp.path()).unwrap();
        writer.write_snapshot([&first, &second, &duplicate]).unwrap();

        let expected = (first.serialize().len() + second.serialize().len()) as u64;
        match EmbeddedStore::open(&StoreUri::File(temp.path().to_path_buf())) {
            Err(StoreError::Corruption { offset, .. }) => assert_eq!(offset, expected),
            other => panic!("expected corruption, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_closed_store_rejects_calls() {
        let store = EmbeddedStore::memory();
        store.close().unwrap();
        assert!(matches!(store.find_all("students"), Err(StoreError::Closed)));
        assert!(matches!(
            store.insert("students", doc("a", "{}")),
            Err(StoreError::Closed)
        ));
        store.close().unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let uri = StoreUri::File(temp.path().to_path_buf());

        {
            let store = EmbeddedStore::open(&uri).unwrap();
            store.insert("students", doc("a", "1")).unwrap();
            store.insert("students", doc("b", "2")).unwrap();
            store.insert("students", doc("c", "3")).unwrap();
            store
                .update("students", "b", Box::new(|_: &[u8]| Some(b"22".to_vec())))
                .unwrap();
            store.remove("students", "a").unwrap();
            store.close().unwrap();
        }

        let store = EmbeddedStore::open(&uri).unwrap();
        assert_eq!(
            store.find_all("students").unwrap(),
            vec![doc("b", "22"), doc("c", "3")]
        );

        // Sequence numbers continue after the highest persisted one
        store.insert("students", doc("d", "4")).unwrap();
        let ids: Vec<_> = store
            .find_all("students")
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_collection_counts() {
        let store = EmbeddedStore::memory();
        store.insert("students", doc("a", "{}")).unwrap();
        store.insert("students", doc("b", "{}")).unwrap();
        store.insert("courses", doc("x", "{}")).unwrap();

        assert_eq!(
            store.collection_counts().unwrap(),
            vec![("courses".to_string(), 1), ("students".to_string(), 2)]
        );
    }

    #[test]
    fn test_connect_parses_uri() {
        let store = connect("memory://").unwrap();
        assert_eq!(store.uri(), &StoreUri::Memory);
        assert!(connect("postgres://localhost").is_err());
    }
}
