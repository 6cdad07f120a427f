/// Data models for the clinic administration console.
///
/// This module defines the records exchanged with the clinic backend:
/// - Id: backend-assigned identifier and its normalization
/// - AppointmentStatus / Weekday: enumerations with wire and display names
/// - Patient, Doctor, Specialty, WorkingHour, Appointment, MedicalRecord,
///   Prescription, Reminder: entities as the backend returns them
/// - *Payload: request bodies for create and full-replace writes

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier assigned by the backend.
///
/// The client never mints identifiers; it only parses them from responses
/// or from user input through [`Id::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Id(u64);

impl Id {
    pub fn new(value: u64) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Id(value))
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Normalize raw text (a select value, a typed number) into an identifier.
    ///
    /// Blank, non-numeric and zero inputs have no identifier.
    pub fn normalize(raw: &str) -> Option<Self> {
        raw.trim().parse::<u64>().ok().and_then(Id::new)
    }

    /// Parse a comma separated id list as produced by [`Id::join`].
    pub fn normalize_list(raw: &str) -> Result<Vec<Self>, String> {
        let mut ids = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id = Id::normalize(part).ok_or_else(|| format!("Identificador inválido: '{}'", part))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    pub fn join(ids: &[Id]) -> String {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Id::normalize(s).ok_or_else(|| format!("Identificador inválido: '{}'", s))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        let id = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Id::new(n),
            Raw::Text(s) => Id::normalize(&s),
        };
        id.ok_or_else(|| serde::de::Error::custom("identifier must be a positive integer"))
    }
}

/// Lifecycle states of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    /// Convert a wire name (case-insensitive) to a status.
    pub fn from_string(value: &str) -> Result<Self, String> {
        match value.trim().to_uppercase().as_str() {
            "SCHEDULED" => Ok(AppointmentStatus::Scheduled),
            "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            "NO_SHOW" => Ok(AppointmentStatus::NoShow),
            _ => Err(format!(
                "Estado inválido: '{}'. Debe ser uno de: SCHEDULED, CONFIRMED, COMPLETED, CANCELLED, NO_SHOW",
                value
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Programado",
            AppointmentStatus::Confirmed => "Confirmado",
            AppointmentStatus::Completed => "Completado",
            AppointmentStatus::Cancelled => "Cancelado",
            AppointmentStatus::NoShow => "Ausente",
        }
    }
}

/// Day of the week a working hour applies to, named as the backend stores it.
///
/// The backend column is free text, so decoding goes through
/// [`Weekday::from_string`] and accepts the same spellings as user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Weekday {
    Lunes,
    Martes,
    #[serde(rename = "Miércoles")]
    Miercoles,
    Jueves,
    Viernes,
    #[serde(rename = "Sábado")]
    Sabado,
    Domingo,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Lunes,
        Weekday::Martes,
        Weekday::Miercoles,
        Weekday::Jueves,
        Weekday::Viernes,
        Weekday::Sabado,
        Weekday::Domingo,
    ];

    /// Accepts the stored name with or without accents, or 1-7 (Monday first).
    pub fn from_string(value: &str) -> Result<Self, String> {
        let folded = value
            .trim()
            .to_lowercase()
            .replace('é', "e")
            .replace('á', "a");
        match folded.as_str() {
            "lunes" | "1" => Ok(Weekday::Lunes),
            "martes" | "2" => Ok(Weekday::Martes),
            "miercoles" | "3" => Ok(Weekday::Miercoles),
            "jueves" | "4" => Ok(Weekday::Jueves),
            "viernes" | "5" => Ok(Weekday::Viernes),
            "sabado" | "6" => Ok(Weekday::Sabado),
            "domingo" | "7" => Ok(Weekday::Domingo),
            _ => Err(format!("Día inválido: '{}'", value)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Lunes => "Lunes",
            Weekday::Martes => "Martes",
            Weekday::Miercoles => "Miércoles",
            Weekday::Jueves => "Jueves",
            Weekday::Viernes => "Viernes",
            Weekday::Sabado => "Sábado",
            Weekday::Domingo => "Domingo",
        }
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u8),
            Text(String),
        }

        let raw = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        Weekday::from_string(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub email: String,
    #[serde(default)]
    pub specialties: Vec<Specialty>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn specialty_ids(&self) -> Vec<Id> {
        self.specialties.iter().map(|s| s.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingHour {
    pub id: Id,
    pub doctor_id: Id,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Id,
    pub patient_id: Id,
    pub doctor_id: Id,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub attended: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Id,
    pub patient_id: Id,
    #[serde(default)]
    pub doctor_id: Option<Id>,
    pub record_date: NaiveDateTime,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Id,
    pub medical_record_id: Id,
    pub medication: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub issued_at: Option<NaiveDate>,
}

/// Notification scheduled for an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Id,
    pub appointment_id: Id,
    #[serde(default)]
    pub channel: Option<String>,
    pub send_at: NaiveDateTime,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub sent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientPayload {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorPayload {
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub email: String,
    pub specialties: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialtyPayload {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkingHourPayload {
    pub doctor_id: Id,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentPayload {
    pub patient_id: Id,
    pub doctor_id: Id,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicalRecordPayload {
    pub patient_id: Id,
    pub doctor_id: Option<Id>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrescriptionPayload {
    pub medical_record_id: Id,
    pub medication: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderPayload {
    pub appointment_id: Id,
    pub channel: Option<String>,
    pub send_at: NaiveDateTime,
    pub payload: Option<String>,
}
