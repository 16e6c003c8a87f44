//! Appointment intake form.
//!
//! Holds the ephemeral field values of one form instance. Nothing is persisted
//! until [`AppointmentForm::submit`], which stamps the record with the current
//! instant and hands it to the [`AppointmentStore`].

use thiserror::Error;

use crate::clock::{iso_timestamp, Clock};
use crate::models::{note_template, AppointmentRecord, NewAppointment, UnknownVeterinarian, Veterinarian};
use crate::remote::DocumentStore;
use crate::store::{AppointmentStore, StoreError};

/// Form submission errors.
#[derive(Error, Debug)]
pub enum FormError {
    #[error("No active patient: tutor ID or patient ID not set")]
    MissingIdentity,

    #[error("Summary title is required")]
    MissingTitle,

    #[error(transparent)]
    UnknownVet(#[from] UnknownVeterinarian),

    #[error("Failed to save appointment: {0}")]
    Store(#[from] StoreError),
}

/// Field values of the intake form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentForm {
    category: String,
    vet: Option<Veterinarian>,
    notes: String,
    title: String,
    send_to_admission: bool,
}

impl AppointmentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn vet(&self) -> Option<Veterinarian> {
        self.vet
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn send_to_admission(&self) -> bool {
        self.send_to_admission
    }

    /// Select a category. Always overwrites the notes with its template,
    /// including any manual edits; unknown or empty categories clear them.
    pub fn select_category(&mut self, value: &str) {
        self.category = value.to_string();
        self.notes = note_template(value).to_string();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Select a practitioner by name. Empty clears the selection.
    pub fn select_vet(&mut self, name: &str) -> Result<(), FormError> {
        self.vet = match name {
            "" => None,
            name => Some(name.parse()?),
        };
        Ok(())
    }

    pub fn set_send_to_admission(&mut self, send: bool) {
        self.send_to_admission = send;
    }

    /// Reset every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Build the record body stamped with the clock's current instant.
    pub fn to_appointment(&self, clock: &dyn Clock) -> NewAppointment {
        NewAppointment {
            appointment_type: self.category.clone(),
            title: self.title.clone(),
            vet: self.vet.map(|v| v.as_str().to_string()).unwrap_or_default(),
            notes: self.notes.clone(),
            send_to_admission: self.send_to_admission,
            time_stamp: iso_timestamp(clock.now()),
            is_last: false,
        }
    }

    /// Submit to the store's active pair.
    ///
    /// On success every field is reset; on failure the fields are kept so the
    /// user does not lose what was typed.
    pub async fn submit<S: DocumentStore>(
        &mut self,
        store: &AppointmentStore<S>,
        clock: &dyn Clock,
    ) -> Result<AppointmentRecord, FormError> {
        let Some(pair) = store.identity() else {
            tracing::error!("cannot submit appointment: no active patient");
            return Err(FormError::MissingIdentity);
        };

        if self.title.trim().is_empty() {
            tracing::warn!("cannot submit appointment: summary title is empty");
            return Err(FormError::MissingTitle);
        }

        let appointment = self.to_appointment(clock);
        tracing::debug!(
            tutor_id = pair.tutor_id(),
            patient_id = pair.patient_id(),
            appointment_type = %appointment.appointment_type,
            "submitting appointment"
        );

        match store
            .create_appointment(pair.tutor_id(), pair.patient_id(), appointment)
            .await
        {
            Ok(record) => {
                self.reset();
                Ok(record)
            }
            Err(e) => {
                tracing::error!(error = %e, "appointment submission failed");
                Err(e.into())
            }
        }
    }
}
