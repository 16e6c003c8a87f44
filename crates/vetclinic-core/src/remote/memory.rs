//! In-process document store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Notify;

use super::{new_document_id, Document, DocumentStore, RemoteError, RemoteResult};
use crate::models::CollectionPath;

/// [`DocumentStore`] kept in memory.
///
/// Counts every remote call and can be told to fail reads or writes, or to
/// hold reads until released, so callers can observe ordering and failure
/// handling without a real backend.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    list_calls: AtomicUsize,
    append_calls: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    read_gate: Mutex<Option<Arc<Notify>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document directly, bypassing call accounting.
    pub fn seed(&self, path: &CollectionPath, fields: Map<String, Value>) -> String {
        let id = new_document_id();
        self.lock_collections()
            .entry(path.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        id
    }

    /// Snapshot of a collection.
    pub fn documents(&self, path: &CollectionPath) -> Vec<Document> {
        self.lock_collections()
            .get(path.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Number of `list_documents` calls received.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `append_document` calls received.
    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Hold every subsequent read until the returned handle is notified.
    pub fn hold_reads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.read_gate.lock().unwrap_or_else(PoisonError::into_inner) = Some(gate.clone());
        gate
    }

    /// Stop holding reads. Reads already waiting still need a notification.
    pub fn release_reads(&self) {
        *self.read_gate.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn lock_collections(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Document>>> {
        self.collections.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_documents(&self, path: &CollectionPath) -> RemoteResult<Vec<Document>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self
            .read_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable(format!("read of {} failed", path)));
        }

        Ok(self.documents(path))
    }

    async fn append_document(
        &self,
        path: &CollectionPath,
        fields: Map<String, Value>,
    ) -> RemoteResult<String> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable(format!("write to {} failed", path)));
        }

        Ok(self.seed(path, fields))
    }
}
