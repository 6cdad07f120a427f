/// Form templates for each entity.
///
/// Fields are kept as the text the user types or picks; conversion to typed
/// payloads happens on submit.

use crate::forms::EntityForm;
use crate::models::{
    Appointment, AppointmentPayload, AppointmentStatus, Doctor, DoctorPayload, Id, MedicalRecord,
    MedicalRecordPayload, Patient, PatientPayload, Prescription, PrescriptionPayload, Specialty,
    SpecialtyPayload, Weekday, WorkingHour, WorkingHourPayload,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub const DATE_INPUT: &str = "%Y-%m-%d";
pub const TIME_INPUT: &str = "%H:%M";
pub const DATETIME_INPUT: &str = "%Y-%m-%dT%H:%M";

pub const MSG_WEEKDAY_REQUIRED: &str = "Seleccione un día.";
pub const MSG_TIME_ORDER: &str = "La hora de inicio debe ser menor a la hora fin";
pub const MSG_DATETIME_ORDER: &str = "La fecha de inicio debe ser menor a la fecha fin";
pub const MSG_RECORD_REQUIRED: &str = "Debe seleccionar un historial médico.";

fn required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("El campo {} es obligatorio.", label))
    } else {
        Ok(())
    }
}

fn required_id(value: &str, label: &str) -> Result<Id, String> {
    required(value, label)?;
    Id::normalize(value).ok_or_else(|| format!("El campo {} no es válido.", label))
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_date(value: &str, label: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_INPUT)
        .map_err(|_| format!("El campo {} debe tener formato AAAA-MM-DD.", label))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_INPUT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("Hora inválida '{}', use HH:MM.", value))
}

fn parse_datetime(value: &str, label: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATETIME_INPUT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .map_err(|_| format!("El campo {} debe tener formato AAAA-MM-DDTHH:MM.", label))
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientForm {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Default for PatientForm {
    fn default() -> Self {
        PatientForm {
            first_name: String::new(),
            last_name: String::new(),
            birth_date: String::new(),
            gender: "Masculino".to_string(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
        }
    }
}

impl EntityForm for PatientForm {
    type Entity = Patient;

    fn from_entity(patient: &Patient) -> Self {
        PatientForm {
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            birth_date: patient.birth_date.format(DATE_INPUT).to_string(),
            gender: patient.gender.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            address: patient.address.clone().unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        required(&self.first_name, "nombre")?;
        required(&self.last_name, "apellido")?;
        required(&self.birth_date, "fecha de nacimiento")?;
        required(&self.gender, "género")?;
        required(&self.email, "email")?;
        required(&self.phone, "teléfono")?;
        if !self.email.contains('@') {
            return Err("El email no es válido.".to_string());
        }
        Ok(())
    }

    fn payload(&self) -> Result<PatientPayload, String> {
        Ok(PatientPayload {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            birth_date: parse_date(&self.birth_date, "fecha de nacimiento")?,
            gender: self.gender.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: optional(&self.address),
        })
    }
}

/// Specialties are held as a joined id list, the multi-select's value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorForm {
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub email: String,
    pub specialties: String,
}

impl DoctorForm {
    /// Add or remove one specialty from the selection.
    pub fn toggle_specialty(&mut self, id: Id) {
        let mut ids = Id::normalize_list(&self.specialties).unwrap_or_default();
        match ids.iter().position(|existing| *existing == id) {
            Some(index) => {
                ids.remove(index);
            }
            None => ids.push(id),
        }
        self.specialties = Id::join(&ids);
    }
}

impl EntityForm for DoctorForm {
    type Entity = Doctor;

    fn from_entity(doctor: &Doctor) -> Self {
        DoctorForm {
            first_name: doctor.first_name.clone(),
            last_name: doctor.last_name.clone(),
            license_number: doctor.license_number.clone(),
            email: doctor.email.clone(),
            specialties: Id::join(&doctor.specialty_ids()),
        }
    }

    fn validate(&self) -> Result<(), String> {
        required(&self.first_name, "nombre")?;
        required(&self.last_name, "apellido")?;
        required(&self.license_number, "matrícula")?;
        required(&self.email, "email")?;
        Ok(())
    }

    fn payload(&self) -> Result<DoctorPayload, String> {
        Ok(DoctorPayload {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            license_number: self.license_number.trim().to_string(),
            email: self.email.trim().to_string(),
            specialties: Id::normalize_list(&self.specialties)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecialtyForm {
    pub name: String,
    pub description: String,
}

impl EntityForm for SpecialtyForm {
    type Entity = Specialty;

    fn from_entity(specialty: &Specialty) -> Self {
        SpecialtyForm {
            name: specialty.name.clone(),
            description: specialty.description.clone().unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        required(&self.name, "nombre")
    }

    fn payload(&self) -> Result<SpecialtyPayload, String> {
        Ok(SpecialtyPayload {
            name: self.name.trim().to_string(),
            description: optional(&self.description),
        })
    }
}

/// The doctor comes from the screen's current selection, not from a field.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingHourForm {
    pub doctor_id: Option<Id>,
    pub weekday: String,
    pub start_time: String,
    pub end_time: String,
}

impl Default for WorkingHourForm {
    fn default() -> Self {
        WorkingHourForm {
            doctor_id: None,
            weekday: String::new(),
            start_time: "08:00".to_string(),
            end_time: "12:00".to_string(),
        }
    }
}

impl WorkingHourForm {
    pub fn for_doctor(doctor_id: Option<Id>) -> Self {
        WorkingHourForm {
            doctor_id,
            ..WorkingHourForm::default()
        }
    }
}

impl EntityForm for WorkingHourForm {
    type Entity = WorkingHour;

    fn from_entity(hour: &WorkingHour) -> Self {
        WorkingHourForm {
            doctor_id: Some(hour.doctor_id),
            weekday: hour.weekday.name().to_string(),
            start_time: hour.start_time.format(TIME_INPUT).to_string(),
            end_time: hour.end_time.format(TIME_INPUT).to_string(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.doctor_id.is_none() {
            return Err("Seleccione un médico.".to_string());
        }
        if self.weekday.trim().is_empty() {
            return Err(MSG_WEEKDAY_REQUIRED.to_string());
        }
        Weekday::from_string(&self.weekday)?;
        if parse_time(&self.start_time)? >= parse_time(&self.end_time)? {
            return Err(MSG_TIME_ORDER.to_string());
        }
        Ok(())
    }

    fn payload(&self) -> Result<WorkingHourPayload, String> {
        Ok(WorkingHourPayload {
            doctor_id: self.doctor_id.ok_or("Seleccione un médico.")?,
            weekday: Weekday::from_string(&self.weekday)?,
            start_time: parse_time(&self.start_time)?,
            end_time: parse_time(&self.end_time)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentForm {
    pub patient_id: String,
    pub doctor_id: String,
    pub start_at: String,
    pub end_at: String,
    pub notes: String,
    pub status: AppointmentStatus,
}

impl EntityForm for AppointmentForm {
    type Entity = Appointment;

    fn from_entity(appointment: &Appointment) -> Self {
        AppointmentForm {
            patient_id: appointment.patient_id.to_string(),
            doctor_id: appointment.doctor_id.to_string(),
            start_at: appointment.start_at.format(DATETIME_INPUT).to_string(),
            end_at: appointment.end_at.format(DATETIME_INPUT).to_string(),
            notes: appointment.notes.clone().unwrap_or_default(),
            status: appointment.status,
        }
    }

    fn validate(&self) -> Result<(), String> {
        required_id(&self.patient_id, "paciente")?;
        required_id(&self.doctor_id, "médico")?;
        required(&self.start_at, "inicio")?;
        required(&self.end_at, "fin")?;
        if parse_datetime(&self.start_at, "inicio")? >= parse_datetime(&self.end_at, "fin")? {
            return Err(MSG_DATETIME_ORDER.to_string());
        }
        Ok(())
    }

    fn payload(&self) -> Result<AppointmentPayload, String> {
        Ok(AppointmentPayload {
            patient_id: required_id(&self.patient_id, "paciente")?,
            doctor_id: required_id(&self.doctor_id, "médico")?,
            start_at: parse_datetime(&self.start_at, "inicio")?,
            end_at: parse_datetime(&self.end_at, "fin")?,
            status: self.status,
            notes: optional(&self.notes),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicalRecordForm {
    pub patient_id: String,
    pub doctor_id: String,
    pub summary: String,
}

impl MedicalRecordForm {
    pub fn for_patient(patient_id: Option<Id>) -> Self {
        MedicalRecordForm {
            patient_id: patient_id.map(|id| id.to_string()).unwrap_or_default(),
            ..MedicalRecordForm::default()
        }
    }
}

impl EntityForm for MedicalRecordForm {
    type Entity = MedicalRecord;

    fn from_entity(record: &MedicalRecord) -> Self {
        MedicalRecordForm {
            patient_id: record.patient_id.to_string(),
            doctor_id: record.doctor_id.map(|id| id.to_string()).unwrap_or_default(),
            summary: record.summary.clone(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        required_id(&self.patient_id, "paciente")?;
        if optional(&self.doctor_id).is_some() && Id::normalize(&self.doctor_id).is_none() {
            return Err("El campo médico no es válido.".to_string());
        }
        required(&self.summary, "resumen")
    }

    fn payload(&self) -> Result<MedicalRecordPayload, String> {
        Ok(MedicalRecordPayload {
            patient_id: required_id(&self.patient_id, "paciente")?,
            doctor_id: Id::normalize(&self.doctor_id),
            summary: self.summary.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrescriptionForm {
    pub medical_record_id: Option<Id>,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: String,
}

impl PrescriptionForm {
    pub fn for_record(medical_record_id: Option<Id>) -> Self {
        PrescriptionForm {
            medical_record_id,
            ..PrescriptionForm::default()
        }
    }
}

impl EntityForm for PrescriptionForm {
    type Entity = Prescription;

    fn from_entity(prescription: &Prescription) -> Self {
        PrescriptionForm {
            medical_record_id: Some(prescription.medical_record_id),
            medication: prescription.medication.clone(),
            dosage: prescription.dosage.clone().unwrap_or_default(),
            frequency: prescription.frequency.clone().unwrap_or_default(),
            instructions: prescription.instructions.clone().unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.medical_record_id.is_none() {
            return Err(MSG_RECORD_REQUIRED.to_string());
        }
        required(&self.medication, "medicamento")
    }

    fn payload(&self) -> Result<PrescriptionPayload, String> {
        Ok(PrescriptionPayload {
            medical_record_id: self.medical_record_id.ok_or(MSG_RECORD_REQUIRED)?,
            medication: self.medication.trim().to_string(),
            dosage: optional(&self.dosage),
            frequency: optional(&self.frequency),
            instructions: optional(&self.instructions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> Id {
        Id::new(n).unwrap()
    }

    #[test]
    fn inverted_working_hours_are_blocked() {
        let form = WorkingHourForm {
            doctor_id: Some(id(1)),
            weekday: "Lunes".into(),
            start_time: "14:00".into(),
            end_time: "10:00".into(),
        };
        assert_eq!(form.validate(), Err(MSG_TIME_ORDER.to_string()));
    }

    #[test]
    fn equal_working_hours_are_blocked() {
        let form = WorkingHourForm {
            weekday: "Martes".into(),
            start_time: "09:00".into(),
            end_time: "09:00".into(),
            ..WorkingHourForm::for_doctor(Some(id(1)))
        };
        assert_eq!(form.validate(), Err(MSG_TIME_ORDER.to_string()));
    }

    #[test]
    fn working_hour_needs_a_weekday() {
        let form = WorkingHourForm::for_doctor(Some(id(1)));
        assert_eq!(form.validate(), Err(MSG_WEEKDAY_REQUIRED.to_string()));
    }

    #[test]
    fn working_hour_edit_shows_hours_and_minutes() {
        let hour = WorkingHour {
            id: id(8),
            doctor_id: id(2),
            weekday: Weekday::Jueves,
            start_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        };
        let form = WorkingHourForm::from_entity(&hour);
        assert_eq!(form.start_time, "08:30");
        assert_eq!(form.end_time, "12:00");
        assert_eq!(form.weekday, "Jueves");

        let payload = form.payload().unwrap();
        assert_eq!(payload.start_time, hour.start_time);
        assert_eq!(payload.weekday, Weekday::Jueves);
    }

    #[test]
    fn unchanged_patient_edit_reproduces_the_record() {
        let patient = Patient {
            id: id(4),
            first_name: "Ana".into(),
            last_name: "Gómez".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            gender: "Femenino".into(),
            email: "ana@example.com".into(),
            phone: "555-0101".into(),
            address: Some("Calle 1".into()),
            created_at: None,
            updated_at: None,
        };
        let form = PatientForm::from_entity(&patient);
        assert_eq!(form.birth_date, "1990-05-17");

        let payload = form.payload().unwrap();
        assert_eq!(
            payload,
            PatientPayload {
                first_name: patient.first_name.clone(),
                last_name: patient.last_name.clone(),
                birth_date: patient.birth_date,
                gender: patient.gender.clone(),
                email: patient.email.clone(),
                phone: patient.phone.clone(),
                address: patient.address.clone(),
            }
        );
    }

    #[test]
    fn doctor_specialties_round_trip_through_joined_ids() {
        let doctor = Doctor {
            id: id(2),
            first_name: "Luis".into(),
            last_name: "Paz".into(),
            license_number: "MN-1234".into(),
            email: "luis@example.com".into(),
            specialties: vec![
                Specialty { id: id(3), name: "Clínica".into(), description: None },
                Specialty { id: id(5), name: "Cardiología".into(), description: None },
            ],
        };
        let mut form = DoctorForm::from_entity(&doctor);
        assert_eq!(form.specialties, "3,5");
        assert_eq!(form.payload().unwrap().specialties, vec![id(3), id(5)]);

        form.toggle_specialty(id(3));
        form.toggle_specialty(id(7));
        assert_eq!(form.specialties, "5,7");
    }

    #[test]
    fn patient_template_defaults_gender() {
        let form = PatientForm::default();
        assert_eq!(form.gender, "Masculino");
        assert!(form.validate().is_err());
    }

    #[test]
    fn appointment_requires_ordered_times() {
        let form = AppointmentForm {
            patient_id: "1".into(),
            doctor_id: "2".into(),
            start_at: "2025-03-10T10:00".into(),
            end_at: "2025-03-10T09:30".into(),
            ..AppointmentForm::default()
        };
        assert_eq!(form.validate(), Err(MSG_DATETIME_ORDER.to_string()));
    }

    #[test]
    fn appointment_template_starts_scheduled() {
        let form = AppointmentForm {
            patient_id: "1".into(),
            doctor_id: "2".into(),
            start_at: "2025-03-10T09:00".into(),
            end_at: "2025-03-10T09:30".into(),
            ..AppointmentForm::default()
        };
        let payload = form.payload().unwrap();
        assert_eq!(payload.status, AppointmentStatus::Scheduled);
        assert_eq!(payload.notes, None);
    }

    #[test]
    fn prescription_needs_a_record() {
        let form = PrescriptionForm {
            medication: "Ibuprofeno".into(),
            ..PrescriptionForm::default()
        };
        assert_eq!(form.validate(), Err(MSG_RECORD_REQUIRED.to_string()));
        assert!(PrescriptionForm { medical_record_id: Some(id(1)), ..form }.validate().is_ok());
    }
}
