//! Appointment store: the active patient and its cached appointment history.
//!
//! The store is an explicitly constructed service shared by the views of one
//! session. It owns the only mutable state of the appointment core:
//!
//! - the active [`IdentityPair`]
//! - the pair whose history has been requested (the load marker)
//! - the cached history for that pair
//!
//! The document store remains authoritative. The history is replaced wholesale
//! on each effective load and extended in place on a successful create for the
//! active pair. State is only touched between awaits, and every completion
//! re-checks the active pair before writing, so a late response for a patient
//! the user already left is dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::models::{
    AppointmentRecord, CollectionPath, IdentityError, IdentityPair, NewAppointment,
};
use crate::navigation::{resolve_identity, NavigationParams};
use crate::remote::{Document, DocumentStore, RemoteError};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Missing identity: {0}")]
    MissingIdentity(#[from] IdentityError),

    #[error("Document store error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a history load. Loads never fail the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// History replaced with this many records
    Loaded(usize),
    /// A load for this pair was already issued; no remote call made
    Skipped,
    /// Tutor or patient ID missing; no remote call made
    MissingIdentity,
    /// Remote read failed; history reset to empty
    Failed,
    /// The active pair changed while the read was in flight; result dropped
    Stale,
}

/// Result of applying a navigation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// No source carried a complete pair
    Unresolved,
    /// Pair resolved and its history requested
    Resolved { pair: IdentityPair, load: LoadOutcome },
}

#[derive(Debug, Default)]
struct StoreState {
    identity: Option<IdentityPair>,
    loaded: Option<IdentityPair>,
    history: Vec<AppointmentRecord>,
}

/// Appointment history cache over a [`DocumentStore`].
pub struct AppointmentStore<S> {
    remote: S,
    state: Mutex<StoreState>,
}

impl<S: DocumentStore> AppointmentStore<S> {
    pub fn new(remote: S) -> Self {
        Self {
            remote,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// The underlying document store.
    pub fn remote(&self) -> &S {
        &self.remote
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The active pair, if any.
    pub fn identity(&self) -> Option<IdentityPair> {
        self.state().identity.clone()
    }

    /// Snapshot of the cached history, in store listing order.
    pub fn history(&self) -> Vec<AppointmentRecord> {
        self.state().history.clone()
    }

    pub fn history_len(&self) -> usize {
        self.state().history.len()
    }

    /// Replace the active pair. No I/O.
    ///
    /// Switching to a different pair drops the cached history so it can never
    /// be shown against another patient.
    pub fn set_identity(&self, pair: IdentityPair) {
        let mut state = self.state();
        if state.identity.as_ref() != Some(&pair) {
            tracing::debug!(
                tutor_id = pair.tutor_id(),
                patient_id = pair.patient_id(),
                "active patient changed"
            );
            state.history.clear();
            state.loaded = None;
        }
        state.identity = Some(pair);
    }

    /// Apply one navigation event: resolve the pair, activate it, load it.
    pub async fn navigate(&self, params: &NavigationParams) -> NavigationOutcome {
        let stored = self.identity();

        let Some(pair) = resolve_identity(params, stored.as_ref()) else {
            tracing::debug!("navigation carries no complete tutor/patient pair");
            return NavigationOutcome::Unresolved;
        };

        if stored.as_ref() != Some(&pair) {
            self.set_identity(pair.clone());
        }

        let load = self.load_history(pair.tutor_id(), pair.patient_id()).await;
        NavigationOutcome::Resolved { pair, load }
    }

    /// Load the history of a pair and make it the active pair.
    ///
    /// At most one effective load is issued per distinct pair: repeated calls
    /// for a pair already loaded (or loading) return [`LoadOutcome::Skipped`].
    /// Errors are logged, never returned.
    pub async fn load_history(&self, tutor_id: &str, patient_id: &str) -> LoadOutcome {
        let pair = match IdentityPair::new(tutor_id, patient_id) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "cannot load appointment history");
                return LoadOutcome::MissingIdentity;
            }
        };

        {
            let mut state = self.state();
            if state.loaded.as_ref() == Some(&pair) {
                tracing::debug!(
                    tutor_id,
                    patient_id,
                    "appointment history already requested, skipping"
                );
                return LoadOutcome::Skipped;
            }
            if state.identity.as_ref() != Some(&pair) {
                state.history.clear();
            }
            state.identity = Some(pair.clone());
            state.loaded = Some(pair.clone());
        }

        self.fetch_history(pair).await
    }

    /// Reload the active pair, bypassing the load guard.
    pub async fn refresh_history(&self) -> LoadOutcome {
        let pair = {
            let mut state = self.state();
            let Some(pair) = state.identity.clone() else {
                tracing::error!("cannot refresh appointment history without an active patient");
                return LoadOutcome::MissingIdentity;
            };
            state.loaded = Some(pair.clone());
            pair
        };

        self.fetch_history(pair).await
    }

    async fn fetch_history(&self, pair: IdentityPair) -> LoadOutcome {
        let path = CollectionPath::appointments(&pair);
        let result = self.remote.list_documents(&path).await;

        let mut state = self.state();
        if state.identity.as_ref() != Some(&pair) || state.loaded.as_ref() != Some(&pair) {
            tracing::debug!(
                path = %path,
                "active patient changed during load, dropping result"
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(documents) => {
                let records = decode_documents(&path, documents);
                let count = records.len();
                state.history = records;
                tracing::info!(path = %path, count, "appointment history loaded");
                LoadOutcome::Loaded(count)
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "failed to load appointment history");
                state.history.clear();
                LoadOutcome::Failed
            }
        }
    }

    /// Append a new appointment under a pair.
    ///
    /// Missing identifiers fail before any I/O. On success the record is
    /// returned with its generated ID and, when the pair is the active one,
    /// appended to the cached history.
    pub async fn create_appointment(
        &self,
        tutor_id: &str,
        patient_id: &str,
        appointment: NewAppointment,
    ) -> StoreResult<AppointmentRecord> {
        let pair = IdentityPair::new(tutor_id, patient_id).map_err(|e| {
            tracing::error!(error = %e, "cannot create appointment");
            StoreError::MissingIdentity(e)
        })?;

        let path = CollectionPath::appointments(&pair);
        let fields = appointment.to_fields()?;

        let id = match self.remote.append_document(&path, fields).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "failed to add appointment");
                return Err(e.into());
            }
        };
        tracing::info!(path = %path, id = %id, "appointment added");

        let record = appointment.into_record(id);

        // A load that listed the collection after the write already holds it
        let mut state = self.state();
        if state.identity.as_ref() == Some(&pair)
            && !state.history.iter().any(|r| r.id == record.id)
        {
            state.history.push(record.clone());
        }

        Ok(record)
    }
}

fn decode_documents(path: &CollectionPath, documents: Vec<Document>) -> Vec<AppointmentRecord> {
    documents
        .into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            match AppointmentRecord::from_document(doc.id, doc.fields) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        path = %path,
                        id = %id,
                        error = %e,
                        "skipping malformed appointment document"
                    );
                    None
                }
            }
        })
        .collect()
}
