//! Host-facing API tests (blocking calls over the owned runtime).

use std::io::Write;
use std::sync::Arc;

use vetclinic_core::{
    open_clinic, open_clinic_in_memory, FfiIdentity, FfiLoadOutcome, FfiNavigationOutcome,
    FfiNewAppointment, VetClinicError,
};

fn appointment(title: &str) -> FfiNewAppointment {
    FfiNewAppointment {
        appointment_type: "Clínica Geral".to_string(),
        title: title.to_string(),
        vet: "Veterinário 1".to_string(),
        notes: String::new(),
        send_to_admission: false,
        time_stamp: Some("2024-01-01T10:00:00.000Z".to_string()),
    }
}

#[test]
fn test_navigate_and_create() {
    let core = open_clinic_in_memory().unwrap();

    let outcome = core
        .navigate_url(
            "/registers/patient-profile/tutor-1/pet-9/pet-medical-appointment".to_string(),
        )
        .unwrap();
    assert_eq!(
        outcome,
        FfiNavigationOutcome::Resolved {
            identity: FfiIdentity {
                tutor_id: "tutor-1".to_string(),
                patient_id: "pet-9".to_string(),
            },
            load: FfiLoadOutcome::Loaded { count: 0 },
        }
    );

    let record = core
        .create_appointment("tutor-1".to_string(), "pet-9".to_string(), appointment("Checkup"))
        .unwrap();
    assert!(record.id.is_some());

    let history = core.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title, "Checkup");

    let timeline = core.timeline();
    assert_eq!(timeline[0].date, "01/01/2024");
    assert_eq!(timeline[0].time, "07:00");
}

#[test]
fn test_load_guard_and_refresh() {
    let core = open_clinic_in_memory().unwrap();

    assert_eq!(
        core.load_history("tutor-1".to_string(), "pet-9".to_string()),
        FfiLoadOutcome::Loaded { count: 0 }
    );
    assert_eq!(
        core.load_history("tutor-1".to_string(), "pet-9".to_string()),
        FfiLoadOutcome::Skipped
    );
    assert_eq!(core.refresh_history(), FfiLoadOutcome::Loaded { count: 0 });
    assert_eq!(
        core.load_history(String::new(), "pet-9".to_string()),
        FfiLoadOutcome::MissingIdentity
    );
}

#[test]
fn test_create_requires_identity() {
    let core = open_clinic_in_memory().unwrap();

    let err = core
        .create_appointment(String::new(), "pet-9".to_string(), appointment("Checkup"))
        .unwrap_err();
    assert!(matches!(err, VetClinicError::MissingIdentity(_)));

    assert!(matches!(
        core.set_identity("tutor-1".to_string(), "   ".to_string()),
        Err(VetClinicError::MissingIdentity(_))
    ));
    assert!(core.identity().is_none());
}

#[test]
fn test_form_handle_submit() {
    let core = open_clinic_in_memory().unwrap();
    let form = Arc::clone(&core).new_form();

    // No active patient yet
    form.set_title("Checkup".to_string()).unwrap();
    assert!(matches!(
        form.submit(),
        Err(VetClinicError::MissingIdentity(_))
    ));

    core.set_identity("tutor-1".to_string(), "pet-9".to_string())
        .unwrap();
    form.select_category("Dermatologia Veterinária".to_string())
        .unwrap();
    form.select_vet("Veterinário 2".to_string()).unwrap();

    let state = form.state().unwrap();
    assert_eq!(
        state.notes,
        "Anamnese:\nexame físico:\ndiagnóstico:\noutras considerações:"
    );
    assert_eq!(state.vet.as_deref(), Some("Veterinário 2"));

    let record = form.submit().unwrap();
    assert_eq!(record.appointment_type, "Dermatologia Veterinária");
    assert_eq!(record.vet, "Veterinário 2");

    let state = form.state().unwrap();
    assert_eq!(state.title, "");
    assert_eq!(state.category, "");
    assert_eq!(core.history().len(), 1);
}

#[test]
fn test_form_rejects_unknown_vet() {
    let core = open_clinic_in_memory().unwrap();
    let form = core.new_form();

    assert!(matches!(
        form.select_vet("Dr. House".to_string()),
        Err(VetClinicError::InvalidInput(_))
    ));
}

#[test]
fn test_form_options_and_clock() {
    let core = open_clinic_in_memory().unwrap();

    let categories = core.categories();
    assert_eq!(categories.len(), 5);
    assert_eq!(categories[0].value, "Dermatologia Veterinária");
    assert_eq!(core.veterinarians().len(), 3);
    assert_eq!(core.note_template("Outra".to_string()), "");

    let display = core.clock_display();
    assert_eq!(display.date.len(), "dd/mm/yyyy".len());
    assert_eq!(display.time.len(), "hh:mm".len());
}

#[test]
fn test_open_clinic_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("clinic.db");
    let config_path = dir.path().join("vetclinic.json");

    let mut file = std::fs::File::create(&config_path).unwrap();
    write!(
        file,
        r#"{{"database_path": {}, "display_utc_offset_minutes": 0}}"#,
        serde_json::to_string(&db_path).unwrap()
    )
    .unwrap();

    let config_arg = Some(config_path.to_string_lossy().into_owned());
    {
        let core = open_clinic(config_arg.clone()).unwrap();
        core.create_appointment("tutor-1".to_string(), "pet-9".to_string(), appointment("Checkup"))
            .unwrap();
    }

    let core = open_clinic(config_arg).unwrap();
    assert_eq!(
        core.load_history("tutor-1".to_string(), "pet-9".to_string()),
        FfiLoadOutcome::Loaded { count: 1 }
    );
    assert_eq!(core.timeline()[0].time, "10:00");
}

#[test]
fn test_open_clinic_bad_config() {
    let result = open_clinic(Some("/nonexistent/vetclinic.json".to_string()));
    assert!(matches!(result, Err(VetClinicError::ConfigError(_))));
}
