//! Medical appointment records, categories, and practitioners.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Appointment body as written to the document store.
///
/// Decoding is lenient on absence: a missing or null field takes its
/// default (empty string / `false`). A field of the wrong type is an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAppointment {
    /// Category value (see [`AppointmentCategory`]), empty if unselected
    #[serde(deserialize_with = "null_as_default")]
    pub appointment_type: String,
    /// Free-text summary
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Responsible practitioner (see [`Veterinarian`])
    #[serde(deserialize_with = "null_as_default")]
    pub vet: String,
    /// Free-text body, pre-seeded from the category template
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
    /// Forward the patient to admission
    #[serde(rename = "send_to_admission", deserialize_with = "null_as_default")]
    pub send_to_admission: bool,
    /// Creation instant, ISO-8601 UTC with milliseconds
    #[serde(deserialize_with = "null_as_default")]
    pub time_stamp: String,
    /// Legacy marker set by older clients on the newest entry
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub is_last: bool,
}

impl NewAppointment {
    /// Serialize into a document body.
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(serde::ser::Error::custom(format!(
                "appointment serialized to non-object: {}",
                other
            ))),
        }
    }

    /// Attach the store-generated ID.
    pub fn into_record(self, id: String) -> AppointmentRecord {
        AppointmentRecord {
            id: Some(id),
            appointment_type: self.appointment_type,
            title: self.title,
            vet: self.vet,
            notes: self.notes,
            send_to_admission: self.send_to_admission,
            time_stamp: self.time_stamp,
            is_last: self.is_last,
        }
    }
}

/// A persisted (or about to be persisted) appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    /// Store-generated document ID; absent before persistence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub appointment_type: String,
    pub title: String,
    pub vet: String,
    pub notes: String,
    #[serde(rename = "send_to_admission")]
    pub send_to_admission: bool,
    pub time_stamp: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_last: bool,
}

impl AppointmentRecord {
    /// Decode a stored document body.
    pub fn from_document(id: String, fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let body: NewAppointment = serde_json::from_value(Value::Object(fields))?;
        Ok(body.into_record(id))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Appointment category. Each one seeds the notes field with a template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentCategory {
    Dermatology,
    Nutrition,
    GeneralClinic,
    Neurology,
    Surgery,
}

impl AppointmentCategory {
    pub const ALL: [AppointmentCategory; 5] = [
        AppointmentCategory::Dermatology,
        AppointmentCategory::Nutrition,
        AppointmentCategory::GeneralClinic,
        AppointmentCategory::Neurology,
        AppointmentCategory::Surgery,
    ];

    /// Value stored in `appointmentType`.
    pub fn value(&self) -> &'static str {
        match self {
            AppointmentCategory::Dermatology => "Dermatologia Veterinária",
            AppointmentCategory::Nutrition => "Nutrição Veterinária",
            AppointmentCategory::GeneralClinic => "Clínica Geral",
            AppointmentCategory::Neurology => "Neurologia Veterinária",
            AppointmentCategory::Surgery => "Cirurgia Veterinária",
        }
    }

    /// Label shown in the category picker.
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentCategory::Dermatology => "Consulta em Dermatologia",
            AppointmentCategory::Nutrition => "Consulta em Nutrição",
            AppointmentCategory::GeneralClinic => "Clínico Geral",
            AppointmentCategory::Neurology => "Consulta em Neurologia",
            AppointmentCategory::Surgery => "Cirurgia Veterinária",
        }
    }

    pub fn note_template(&self) -> &'static str {
        match self {
            AppointmentCategory::Dermatology => {
                "Anamnese:\nexame físico:\ndiagnóstico:\noutras considerações:"
            }
            AppointmentCategory::Nutrition => {
                "Histórico nutricional:\nAlimentos recomendados:\nObservações adicionais:"
            }
            AppointmentCategory::GeneralClinic => {
                "Queixa principal:\nExame físico:\nDiagnóstico:\nPlano terapêutico:"
            }
            AppointmentCategory::Neurology => {
                "Anamnese neurológica:\nExame neurológico:\nDiagnóstico neurológico:"
            }
            AppointmentCategory::Surgery => {
                "Tipo de cirurgia:\nObjetivo da cirurgia:\nObservações pré-operatórias:"
            }
        }
    }

    /// Parse a stored value. Exact match only.
    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.value() == value)
    }
}

/// Notes template for a category value; unrecognized or empty gives `""`.
pub fn note_template(value: &str) -> &'static str {
    AppointmentCategory::from_value(value)
        .map(|c| c.note_template())
        .unwrap_or("")
}

/// Unknown practitioner name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown veterinarian: {0}")]
pub struct UnknownVeterinarian(pub String);

/// Practitioners available for selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Veterinarian {
    Vet1,
    Vet2,
    Vet3,
}

impl Veterinarian {
    pub const ALL: [Veterinarian; 3] = [Veterinarian::Vet1, Veterinarian::Vet2, Veterinarian::Vet3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Veterinarian::Vet1 => "Veterinário 1",
            Veterinarian::Vet2 => "Veterinário 2",
            Veterinarian::Vet3 => "Veterinário 3",
        }
    }
}

impl fmt::Display for Veterinarian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Veterinarian {
    type Err = UnknownVeterinarian;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVeterinarian(s.to_string()))
    }
}
