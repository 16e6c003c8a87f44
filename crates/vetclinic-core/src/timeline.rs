//! Timeline projection of an appointment history.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::AppointmentRecord;

const DEFAULT_TITLE: &str = "Consulta";
const MISSING_FIELD: &str = "N/A";
const MISSING_NOTES: &str = "Sem observações";

/// One row of the appointment timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: Option<String>,
    /// `dd/MM/yyyy`, empty when the timestamp cannot be parsed
    pub date: String,
    /// `HH:mm`, empty when the timestamp cannot be parsed
    pub time: String,
    pub title: String,
    pub description: String,
}

impl TimelineEntry {
    pub fn from_record(record: &AppointmentRecord, offset: FixedOffset) -> Self {
        let (date, time) = match DateTime::parse_from_rfc3339(&record.time_stamp) {
            Ok(instant) => {
                let local = instant.with_timezone(&offset);
                (
                    local.format("%d/%m/%Y").to_string(),
                    local.format("%H:%M").to_string(),
                )
            }
            Err(_) => (String::new(), String::new()),
        };

        Self {
            id: record.id.clone(),
            date,
            time,
            title: or_default(&record.title, DEFAULT_TITLE),
            description: format!(
                "Tipo: {}\nVeterinário: {}\nNotas: {}",
                or_default(&record.appointment_type, MISSING_FIELD),
                or_default(&record.vet, MISSING_FIELD),
                or_default(&record.notes, MISSING_NOTES),
            ),
        }
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Project a history into timeline rows. Input order is preserved.
pub fn render_timeline(records: &[AppointmentRecord], offset: FixedOffset) -> Vec<TimelineEntry> {
    records
        .iter()
        .map(|record| TimelineEntry::from_record(record, offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewAppointment;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn record(title: &str, time_stamp: &str) -> AppointmentRecord {
        NewAppointment {
            appointment_type: "Clínica Geral".into(),
            title: title.into(),
            vet: "Veterinário 2".into(),
            notes: "Queixa principal: tosse".into(),
            send_to_admission: false,
            time_stamp: time_stamp.into(),
            is_last: false,
        }
        .into_record("doc-1".into())
    }

    #[test]
    fn test_entry_fields() {
        let entry = TimelineEntry::from_record(&record("Checkup", "2024-01-01T10:00:00.000Z"), brt());

        assert_eq!(entry.id.as_deref(), Some("doc-1"));
        assert_eq!(entry.date, "01/01/2024");
        assert_eq!(entry.time, "07:00");
        assert_eq!(entry.title, "Checkup");
        assert_eq!(
            entry.description,
            "Tipo: Clínica Geral\nVeterinário: Veterinário 2\nNotas: Queixa principal: tosse"
        );
    }

    #[test]
    fn test_entry_defaults() {
        let mut r = record("", "not a date");
        r.appointment_type.clear();
        r.vet.clear();
        r.notes.clear();

        let entry = TimelineEntry::from_record(&r, brt());
        assert_eq!(entry.title, "Consulta");
        assert_eq!(entry.date, "");
        assert_eq!(entry.time, "");
        assert_eq!(entry.description, "Tipo: N/A\nVeterinário: N/A\nNotas: Sem observações");
    }

    #[test]
    fn test_order_preserved() {
        let records = vec![
            record("later", "2024-05-01T10:00:00.000Z"),
            record("earlier", "2024-01-01T10:00:00.000Z"),
        ];

        let titles: Vec<String> = render_timeline(&records, brt())
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["later", "earlier"]);
    }
}
