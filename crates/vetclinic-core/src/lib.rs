//! Vet Clinic Core Library
//!
//! Medical-appointment core of the veterinary clinic patient profile.
//!
//! # Architecture
//!
//! ```text
//! URL / route params ──► navigation::resolve_identity ──► (tutorId, patientId)
//!                                                               │
//!                                                  store::AppointmentStore
//!                                                  (active pair, history cache)
//!                                                    │                   │
//!                                          list / append            history
//!                                                    │                   │
//!                                         remote::DocumentStore   timeline::render_timeline
//!                                   tutors/{t}/patients/{p}/appointments
//!                                                    ▲
//!                                           form::AppointmentForm
//! ```
//!
//! # Modules
//!
//! - [`models`]: Identity pair, appointment records, categories, practitioners
//! - [`navigation`]: Route parsing and identity resolution
//! - [`remote`]: Document store abstraction with SQLite and in-memory backends
//! - [`db`]: SQLite database layer backing the embedded document store
//! - [`store`]: Active patient and cached appointment history
//! - [`form`]: Appointment intake form
//! - [`timeline`]: Timeline projection of the history
//! - [`clock`]: Wall clock and date/time display
//! - [`config`]: JSON configuration
//! - [`logging`]: `tracing` subscriber setup

pub mod clock;
pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod remote;
pub mod store;
pub mod timeline;

// Re-export commonly used types
pub use config::ClinicConfig;
pub use db::Database;
pub use form::AppointmentForm;
pub use models::{
    AppointmentCategory, AppointmentRecord, CollectionPath, IdentityPair, NewAppointment,
    Veterinarian,
};
pub use navigation::{NavigationParams, RoutePattern};
pub use remote::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore};
pub use store::{AppointmentStore, LoadOutcome, NavigationOutcome};
pub use timeline::{render_timeline, TimelineEntry};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex, PoisonError};

use chrono::FixedOffset;
use tokio::runtime::Runtime;
use tokio::sync::watch;

use clock::{spawn_clock_ticker, Clock, ClockDisplay, SystemClock};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetClinicError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Missing identity: {0}")]
    MissingIdentity(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document store error: {0}")]
    StoreError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl From<config::ConfigError> for VetClinicError {
    fn from(e: config::ConfigError) -> Self {
        VetClinicError::ConfigError(e.to_string())
    }
}

impl From<remote::RemoteError> for VetClinicError {
    fn from(e: remote::RemoteError) -> Self {
        match e {
            remote::RemoteError::Database(e) => VetClinicError::DatabaseError(e.to_string()),
            other => VetClinicError::StoreError(other.to_string()),
        }
    }
}

impl From<models::IdentityError> for VetClinicError {
    fn from(e: models::IdentityError) -> Self {
        VetClinicError::MissingIdentity(e.to_string())
    }
}

impl From<navigation::NavigationError> for VetClinicError {
    fn from(e: navigation::NavigationError) -> Self {
        VetClinicError::InvalidInput(e.to_string())
    }
}

impl From<store::StoreError> for VetClinicError {
    fn from(e: store::StoreError) -> Self {
        match e {
            store::StoreError::MissingIdentity(e) => e.into(),
            store::StoreError::Remote(e) => e.into(),
            store::StoreError::Serialization(e) => VetClinicError::InvalidInput(e.to_string()),
        }
    }
}

impl From<form::FormError> for VetClinicError {
    fn from(e: form::FormError) -> Self {
        match e {
            form::FormError::MissingIdentity => VetClinicError::MissingIdentity(e.to_string()),
            form::FormError::MissingTitle | form::FormError::UnknownVet(_) => {
                VetClinicError::InvalidInput(e.to_string())
            }
            form::FormError::Store(e) => e.into(),
        }
    }
}

impl From<std::io::Error> for VetClinicError {
    fn from(e: std::io::Error) -> Self {
        VetClinicError::RuntimeError(e.to_string())
    }
}

impl<T> From<PoisonError<T>> for VetClinicError {
    fn from(e: PoisonError<T>) -> Self {
        VetClinicError::RuntimeError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the clinic core from a JSON config file, or with defaults when no
/// path is given.
#[uniffi::export]
pub fn open_clinic(config_path: Option<String>) -> Result<Arc<VetClinicCore>, VetClinicError> {
    let config = match config_path {
        Some(path) => ClinicConfig::load(path)?,
        None => ClinicConfig::default(),
    };
    logging::init(&config.log_filter);

    let remote = match &config.database_path {
        Some(path) => SqliteDocumentStore::open(path)?,
        None => SqliteDocumentStore::open_in_memory()?,
    };
    VetClinicCore::new(config, remote, Arc::new(SystemClock)).map(Arc::new)
}

/// Open the clinic core over an in-memory database (for testing).
#[uniffi::export]
pub fn open_clinic_in_memory() -> Result<Arc<VetClinicCore>, VetClinicError> {
    let config = ClinicConfig::default();
    logging::init(&config.log_filter);
    let remote = SqliteDocumentStore::open_in_memory()?;
    VetClinicCore::new(config, remote, Arc::new(SystemClock)).map(Arc::new)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Appointment core for one host session.
///
/// Blocking methods drive the async store on a runtime owned by this object.
#[derive(uniffi::Object)]
pub struct VetClinicCore {
    runtime: Runtime,
    store: AppointmentStore<SqliteDocumentStore>,
    config: ClinicConfig,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    clock_display: watch::Receiver<ClockDisplay>,
}

impl VetClinicCore {
    /// Build a core over an already opened store.
    pub fn new(
        config: ClinicConfig,
        remote: SqliteDocumentStore,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, VetClinicError> {
        config.validate()?;
        let offset = config.display_offset()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("vetclinic-core")
            .enable_all()
            .build()?;

        let clock_display = {
            let _guard = runtime.enter();
            let (rx, _ticker) = spawn_clock_ticker(clock.clone(), config.clock_refresh(), offset);
            rx
        };

        tracing::info!(
            route = %config.patient_route,
            persistent = config.database_path.is_some(),
            "clinic core opened"
        );

        Ok(Self {
            runtime,
            store: AppointmentStore::new(remote),
            config,
            clock,
            offset,
            clock_display,
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &AppointmentStore<SqliteDocumentStore> {
        &self.store
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }
}

#[uniffi::export]
impl VetClinicCore {
    // =========================================================================
    // Identity Operations
    // =========================================================================

    /// Apply a navigation URL: resolve the pair from its path or query and
    /// load that patient's history.
    pub fn navigate_url(&self, url: String) -> Result<FfiNavigationOutcome, VetClinicError> {
        let params = NavigationParams::from_url(&url, &self.config.patient_route)?;
        let outcome = self.runtime.block_on(self.store.navigate(&params));
        Ok(outcome.into())
    }

    /// Make a pair active without loading it.
    pub fn set_identity(&self, tutor_id: String, patient_id: String) -> Result<(), VetClinicError> {
        self.store.set_identity(IdentityPair::new(tutor_id, patient_id)?);
        Ok(())
    }

    /// The active pair, if any.
    pub fn identity(&self) -> Option<FfiIdentity> {
        self.store.identity().map(Into::into)
    }

    // =========================================================================
    // History Operations
    // =========================================================================

    pub fn load_history(&self, tutor_id: String, patient_id: String) -> FfiLoadOutcome {
        self.runtime
            .block_on(self.store.load_history(&tutor_id, &patient_id))
            .into()
    }

    /// Reload the active pair even if it was already loaded.
    pub fn refresh_history(&self) -> FfiLoadOutcome {
        self.runtime.block_on(self.store.refresh_history()).into()
    }

    pub fn history(&self) -> Vec<FfiAppointment> {
        self.store.history().into_iter().map(Into::into).collect()
    }

    /// The history projected for display, in history order.
    pub fn timeline(&self) -> Vec<FfiTimelineEntry> {
        render_timeline(&self.store.history(), self.offset)
            .into_iter()
            .map(Into::into)
            .collect()
    }

    pub fn create_appointment(
        &self,
        tutor_id: String,
        patient_id: String,
        appointment: FfiNewAppointment,
    ) -> Result<FfiAppointment, VetClinicError> {
        let appointment = appointment.into_appointment(self.clock.as_ref());
        let record = self.runtime.block_on(self.store.create_appointment(
            &tutor_id,
            &patient_id,
            appointment,
        ))?;
        Ok(record.into())
    }

    // =========================================================================
    // Form Support
    // =========================================================================

    /// Notes template for a category value; empty for unknown values.
    pub fn note_template(&self, category: String) -> String {
        models::note_template(&category).to_string()
    }

    pub fn categories(&self) -> Vec<FfiCategory> {
        AppointmentCategory::ALL
            .iter()
            .map(|c| FfiCategory {
                value: c.value().to_string(),
                label: c.label().to_string(),
            })
            .collect()
    }

    pub fn veterinarians(&self) -> Vec<String> {
        Veterinarian::ALL.iter().map(|v| v.as_str().to_string()).collect()
    }

    /// Current date and time display, refreshed on the configured period.
    pub fn clock_display(&self) -> FfiClockDisplay {
        self.clock_display.borrow().clone().into()
    }

    /// Start a new, empty intake form bound to this core.
    pub fn new_form(self: Arc<Self>) -> Arc<AppointmentFormHandle> {
        Arc::new(AppointmentFormHandle {
            core: self,
            form: Mutex::new(AppointmentForm::new()),
        })
    }
}

// =========================================================================
// Form Object
// =========================================================================

/// One intake form instance.
#[derive(uniffi::Object)]
pub struct AppointmentFormHandle {
    core: Arc<VetClinicCore>,
    form: Mutex<AppointmentForm>,
}

#[uniffi::export]
impl AppointmentFormHandle {
    /// Select a category; the notes are replaced by its template.
    pub fn select_category(&self, category: String) -> Result<(), VetClinicError> {
        self.form.lock()?.select_category(&category);
        Ok(())
    }

    pub fn set_notes(&self, notes: String) -> Result<(), VetClinicError> {
        self.form.lock()?.set_notes(notes);
        Ok(())
    }

    pub fn set_title(&self, title: String) -> Result<(), VetClinicError> {
        self.form.lock()?.set_title(title);
        Ok(())
    }

    pub fn select_vet(&self, vet: String) -> Result<(), VetClinicError> {
        self.form.lock()?.select_vet(&vet)?;
        Ok(())
    }

    pub fn set_send_to_admission(&self, send: bool) -> Result<(), VetClinicError> {
        self.form.lock()?.set_send_to_admission(send);
        Ok(())
    }

    pub fn reset(&self) -> Result<(), VetClinicError> {
        self.form.lock()?.reset();
        Ok(())
    }

    pub fn state(&self) -> Result<FfiFormState, VetClinicError> {
        let form = self.form.lock()?;
        Ok(FfiFormState {
            category: form.category().to_string(),
            vet: form.vet().map(|v| v.as_str().to_string()),
            notes: form.notes().to_string(),
            title: form.title().to_string(),
            send_to_admission: form.send_to_admission(),
        })
    }

    /// Save the form under the active patient. Fields reset on success.
    pub fn submit(&self) -> Result<FfiAppointment, VetClinicError> {
        let mut form = self.form.lock()?;
        let core = &self.core;
        let record = core
            .runtime
            .block_on(form.submit(&core.store, core.clock.as_ref()))?;
        Ok(record.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe identity pair.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiIdentity {
    pub tutor_id: String,
    pub patient_id: String,
}

impl From<IdentityPair> for FfiIdentity {
    fn from(pair: IdentityPair) -> Self {
        Self {
            tutor_id: pair.tutor_id().to_string(),
            patient_id: pair.patient_id().to_string(),
        }
    }
}

/// FFI-safe history load outcome.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiLoadOutcome {
    Loaded { count: u64 },
    Skipped,
    MissingIdentity,
    Failed,
    Stale,
}

impl From<LoadOutcome> for FfiLoadOutcome {
    fn from(outcome: LoadOutcome) -> Self {
        match outcome {
            LoadOutcome::Loaded(count) => FfiLoadOutcome::Loaded {
                count: u64::try_from(count).unwrap_or(u64::MAX),
            },
            LoadOutcome::Skipped => FfiLoadOutcome::Skipped,
            LoadOutcome::MissingIdentity => FfiLoadOutcome::MissingIdentity,
            LoadOutcome::Failed => FfiLoadOutcome::Failed,
            LoadOutcome::Stale => FfiLoadOutcome::Stale,
        }
    }
}

/// FFI-safe navigation outcome.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiNavigationOutcome {
    Unresolved,
    Resolved {
        identity: FfiIdentity,
        load: FfiLoadOutcome,
    },
}

impl From<NavigationOutcome> for FfiNavigationOutcome {
    fn from(outcome: NavigationOutcome) -> Self {
        match outcome {
            NavigationOutcome::Unresolved => FfiNavigationOutcome::Unresolved,
            NavigationOutcome::Resolved { pair, load } => FfiNavigationOutcome::Resolved {
                identity: pair.into(),
                load: load.into(),
            },
        }
    }
}

/// FFI-safe persisted appointment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: Option<String>,
    pub appointment_type: String,
    pub title: String,
    pub vet: String,
    pub notes: String,
    pub send_to_admission: bool,
    pub time_stamp: String,
}

impl From<AppointmentRecord> for FfiAppointment {
    fn from(record: AppointmentRecord) -> Self {
        Self {
            id: record.id,
            appointment_type: record.appointment_type,
            title: record.title,
            vet: record.vet,
            notes: record.notes,
            send_to_admission: record.send_to_admission,
            time_stamp: record.time_stamp,
        }
    }
}

/// FFI-safe appointment to create. A missing timestamp is stamped with the
/// current instant.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewAppointment {
    pub appointment_type: String,
    pub title: String,
    pub vet: String,
    pub notes: String,
    pub send_to_admission: bool,
    pub time_stamp: Option<String>,
}

impl FfiNewAppointment {
    fn into_appointment(self, clock: &dyn Clock) -> NewAppointment {
        NewAppointment {
            appointment_type: self.appointment_type,
            title: self.title,
            vet: self.vet,
            notes: self.notes,
            send_to_admission: self.send_to_admission,
            time_stamp: self
                .time_stamp
                .unwrap_or_else(|| clock::iso_timestamp(clock.now())),
            is_last: false,
        }
    }
}

/// FFI-safe timeline row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTimelineEntry {
    pub id: Option<String>,
    pub date: String,
    pub time: String,
    pub title: String,
    pub description: String,
}

impl From<TimelineEntry> for FfiTimelineEntry {
    fn from(entry: TimelineEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            time: entry.time,
            title: entry.title,
            description: entry.description,
        }
    }
}

/// FFI-safe category option.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCategory {
    pub value: String,
    pub label: String,
}

/// FFI-safe clock display.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClockDisplay {
    pub date: String,
    pub time: String,
}

impl From<ClockDisplay> for FfiClockDisplay {
    fn from(display: ClockDisplay) -> Self {
        Self {
            date: display.date,
            time: display.time,
        }
    }
}

/// FFI-safe form field values.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFormState {
    pub category: String,
    pub vet: Option<String>,
    pub notes: String,
    pub title: String,
    pub send_to_admission: bool,
}
