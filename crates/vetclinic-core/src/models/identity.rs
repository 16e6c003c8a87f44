//! Patient identity and document collection addressing.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Tutor ID is missing")]
    EmptyTutorId,

    #[error("Patient ID is missing")]
    EmptyPatientId,

    #[error("Identifier cannot contain '/': {0}")]
    InvalidSegment(String),
}

/// The (tutor, patient) pair that scopes every appointment operation.
///
/// Both identifiers are always present; a partial pair cannot be built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct IdentityPair {
    /// Tutor (owner/guardian) ID - top-level grouping key
    tutor_id: String,
    /// Patient (pet) ID nested under the tutor
    patient_id: String,
}

impl IdentityPair {
    /// Build a pair, rejecting blank identifiers and path separators.
    pub fn new(tutor_id: impl Into<String>, patient_id: impl Into<String>) -> Result<Self, IdentityError> {
        let tutor_id = tutor_id.into();
        let patient_id = patient_id.into();

        if tutor_id.trim().is_empty() {
            return Err(IdentityError::EmptyTutorId);
        }
        if patient_id.trim().is_empty() {
            return Err(IdentityError::EmptyPatientId);
        }
        for id in [&tutor_id, &patient_id] {
            if id.contains('/') {
                return Err(IdentityError::InvalidSegment(id.clone()));
            }
        }

        Ok(Self {
            tutor_id,
            patient_id,
        })
    }

    pub fn tutor_id(&self) -> &str {
        &self.tutor_id
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

impl fmt::Display for IdentityPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tutor_id, self.patient_id)
    }
}

/// Hierarchical address of a document collection in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Appointment collection of one patient:
    /// `tutors/{tutorId}/patients/{patientId}/appointments`.
    pub fn appointments(pair: &IdentityPair) -> Self {
        Self(format!(
            "tutors/{}/patients/{}/appointments",
            pair.tutor_id, pair.patient_id
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
