//! Student repository
//!
//! Translates student operations into single-document store calls. Inputs
//! are validated before the store is touched; store bodies are the JSON
//! encoding of `Student`.

use std::sync::Arc;

use crate::schema::{self, NewStudent, Student, StudentId, StudentPatch};
use crate::storage::{Document, DocumentStore};

use super::errors::{StudentError, StudentResult};

/// Collection holding student documents
pub const COLLECTION: &str = "students";

/// Data access for student records
#[derive(Clone)]
pub struct StudentRepository {
    store: Arc<dyn DocumentStore>,
}

impl StudentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The underlying store handle
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Validate and persist a new student.
    pub fn create(&self, input: NewStudent) -> StudentResult<Student> {
        let fields = schema::validate(input)?;
        let student = Student::create(fields);

        self.store.insert(COLLECTION, encode(&student)?)?;
        tracing::debug!(id = %student.id, "student created");
        Ok(student)
    }

    /// Every student, in store order.
    pub fn list_all(&self) -> StudentResult<Vec<Student>> {
        self.store
            .find_all(COLLECTION)?
            .iter()
            .map(decode)
            .collect()
    }

    /// Fetch one student. A malformed id is reported as `NotFound`.
    pub fn get_by_id(&self, id: &str) -> StudentResult<Student> {
        let id = parse_id(id)?;
        match self.store.find_by_id(COLLECTION, &id.to_string())? {
            Some(doc) => decode(&doc),
            None => Err(StudentError::NotFound),
        }
    }

    /// Merge the supplied fields into an existing student.
    ///
    /// The merge runs inside a single store update, so concurrent updates to
    /// the same student each see the other's result. The merged record is
    /// validated as a whole; a rejected merge leaves the stored record as is.
    pub fn update_by_id(&self, id: &str, patch: StudentPatch) -> StudentResult<Student> {
        let id = parse_id(id)?.to_string();
        let mut outcome = Err(StudentError::NotFound);

        let found = self.store.update(
            COLLECTION,
            &id,
            Box::new(|body: &[u8]| match merge_patch(&id, body, patch) {
                Ok((student, doc)) => {
                    outcome = Ok(student);
                    Some(doc.body)
                }
                Err(e) => {
                    outcome = Err(e);
                    None
                }
            }),
        )?;

        if !found {
            return Err(StudentError::NotFound);
        }
        let student = outcome?;
        tracing::debug!(id = %student.id, "student updated");
        Ok(student)
    }

    /// Remove a student and return the removed record.
    pub fn delete_by_id(&self, id: &str) -> StudentResult<Student> {
        let id = parse_id(id)?;
        match self.store.remove(COLLECTION, &id.to_string())? {
            Some(doc) => {
                tracing::debug!(%id, "student deleted");
                decode(&doc)
            }
            None => Err(StudentError::NotFound),
        }
    }

    pub fn count(&self) -> StudentResult<usize> {
        Ok(self.store.document_count(COLLECTION)?)
    }
}

fn parse_id(raw: &str) -> StudentResult<StudentId> {
    StudentId::parse(raw).ok_or_else(|| {
        tracing::debug!(id = raw, "malformed student id");
        StudentError::NotFound
    })
}

/// Decode the stored record, overlay the patch, validate and re-encode.
fn merge_patch(id: &str, body: &[u8], patch: StudentPatch) -> StudentResult<(Student, Document)> {
    let mut student = decode_body(id, body)?;
    let fields = schema::validate(patch.merge_into(&student.fields()))?;
    student.apply(fields);
    let doc = encode(&student)?;
    Ok((student, doc))
}

fn encode(student: &Student) -> StudentResult<Document> {
    let body = serde_json::to_vec(student)
        .map_err(|e| crate::storage::StoreError::decode(student.id.to_string(), e))?;
    Ok(Document::new(student.id.to_string(), body))
}

fn decode(doc: &Document) -> StudentResult<Student> {
    decode_body(&doc.id, &doc.body)
}

fn decode_body(id: &str, body: &[u8]) -> StudentResult<Student> {
    serde_json::from_slice(body).map_err(|e| crate::storage::StoreError::decode(id, e).into())
}
