//! Document store collaborator.
//!
//! Appointments live in a hierarchical document store addressed by
//! [`CollectionPath`]. The store supports exactly two operations: list every
//! document under a path, and append one document under a path returning the
//! generated ID. There is no update, delete, or cross-document transaction.
//!
//! - [`SqliteDocumentStore`]: embedded store over [`crate::db::Database`]
//! - [`MemoryDocumentStore`]: in-process store with call counters and fault
//!   injection

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::CollectionPath;

/// Document store errors.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid document in {path}: {reason}")]
    InvalidDocument { path: String, reason: String },
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// A document as returned by a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-generated ID
    pub id: String,
    /// Document body
    pub fields: Map<String, Value>,
}

/// Hierarchical document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List all documents under `path`, in the store's listing order.
    async fn list_documents(&self, path: &CollectionPath) -> RemoteResult<Vec<Document>>;

    /// Append one document under `path`, returning its generated ID.
    async fn append_document(
        &self,
        path: &CollectionPath,
        fields: Map<String, Value>,
    ) -> RemoteResult<String>;
}

/// Generate a fresh document ID.
pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
