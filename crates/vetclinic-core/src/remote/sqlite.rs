//! Embedded document store backed by SQLite.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{new_document_id, Document, DocumentStore, RemoteError, RemoteResult};
use crate::db::{Database, DocumentRow};
use crate::models::CollectionPath;

/// [`DocumentStore`] over a local SQLite database.
///
/// The connection is shared behind a mutex; each call holds it only for the
/// duration of one statement and never across an await point.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteDocumentStore {
    /// Wrap an open database.
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open or create a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> RemoteResult<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    /// In-memory database (for testing).
    pub fn open_in_memory() -> RemoteResult<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    fn with_db<T>(&self, f: impl FnOnce(&Database) -> RemoteResult<T>) -> RemoteResult<T> {
        let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        f(&db)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list_documents(&self, path: &CollectionPath) -> RemoteResult<Vec<Document>> {
        let rows = self.with_db(|db| Ok(db.list_documents(path.as_str())?))?;
        rows.into_iter().map(|row| row_to_document(path, row)).collect()
    }

    async fn append_document(
        &self,
        path: &CollectionPath,
        fields: Map<String, Value>,
    ) -> RemoteResult<String> {
        let body = serde_json::to_string(&fields)?;
        let id = new_document_id();
        self.with_db(|db| Ok(db.insert_document(path.as_str(), &id, &body)?))?;
        Ok(id)
    }
}

fn row_to_document(path: &CollectionPath, row: DocumentRow) -> RemoteResult<Document> {
    match serde_json::from_str::<Value>(&row.body)? {
        Value::Object(fields) => Ok(Document {
            id: row.doc_id,
            fields,
        }),
        _ => Err(RemoteError::InvalidDocument {
            path: path.to_string(),
            reason: format!("document {} is not an object", row.doc_id),
        }),
    }
}
