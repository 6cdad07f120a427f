/// Screens: the state each console page owns while it is open.
///
/// A screen composes entity lists, cascading selectors, form controllers and
/// the report builder. Dropping a screen drops everything it fetched.

use crate::entity_forms::{
    AppointmentForm, DoctorForm, MedicalRecordForm, PatientForm, PrescriptionForm, SpecialtyForm,
    WorkingHourForm,
};
use crate::error::ApiError;
use crate::forms::{delete_confirmed, Confirm, DeleteOutcome, EntityForm, FormController, SubmitOutcome};
use crate::gateway::Gateway;
use crate::models::{
    Appointment, AppointmentStatus, Doctor, Id, MedicalRecord, Patient, Prescription, Specialty,
    WorkingHour,
};
use crate::reports::{ReportBuilder, ReportMode};
use crate::selector::{CascadingSelector, HoursOfDoctor, PrescriptionsOfRecord, RecordsOfPatient, Resolution};
use crate::status::StatusChange;
use crate::store::EntityList;
use tracing::{debug, warn};

const MSG_NOT_LISTED: &str = "El registro ya no existe.";

/// Fallback texts for a list screen.
#[derive(Debug, Clone, Copy)]
pub struct ScreenMessages {
    pub load: &'static str,
    pub save: &'static str,
    pub delete: &'static str,
}

/// List, modal form and confirmed delete over one resource.
pub struct CrudScreen<F: EntityForm> {
    list: EntityList<F::Entity>,
    form: FormController<F>,
    messages: ScreenMessages,
    delete_prompt: fn(&F::Entity) -> String,
    notice: Option<String>,
}

impl<F: EntityForm> CrudScreen<F> {
    pub fn new(messages: ScreenMessages, delete_prompt: fn(&F::Entity) -> String) -> Self {
        CrudScreen {
            list: EntityList::new(messages.load),
            form: FormController::new(messages.save),
            messages,
            delete_prompt,
            notice: None,
        }
    }

    pub fn list(&self) -> &EntityList<F::Entity> {
        &self.list
    }

    pub fn form(&self) -> &FormController<F> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController<F> {
        &mut self.form
    }

    /// Last delete failure, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub async fn mount(&mut self, gateway: &Gateway) -> bool {
        self.list.reload(gateway).await
    }

    pub fn open_create(&mut self) {
        self.form.open_create();
    }

    pub fn open_edit(&mut self, id: Id) -> bool {
        match self.list.find(id) {
            Some(entity) => {
                self.form.open_edit(entity);
                true
            }
            None => false,
        }
    }

    /// Submit the open form; a successful save refetches the list.
    pub async fn submit(&mut self, gateway: &Gateway) -> SubmitOutcome<F::Entity> {
        let outcome = self.form.submit(gateway).await;
        if outcome.is_saved() {
            self.list.reload(gateway).await;
        }
        outcome
    }

    pub async fn delete(&mut self, gateway: &Gateway, id: Id, confirm: &mut dyn Confirm) -> DeleteOutcome {
        let Some(entity) = self.list.find(id) else {
            return DeleteOutcome::Failed(MSG_NOT_LISTED.to_string());
        };
        let prompt = (self.delete_prompt)(entity);
        let outcome = delete_confirmed::<F::Entity>(gateway, id, &prompt, confirm, self.messages.delete).await;
        settle_delete(&outcome, &mut self.notice);
        if outcome == DeleteOutcome::Deleted {
            self.list.reload(gateway).await;
        }
        outcome
    }
}

pub type PatientsScreen = CrudScreen<PatientForm>;
pub type SpecialtiesScreen = CrudScreen<SpecialtyForm>;

pub fn patients_screen() -> PatientsScreen {
    CrudScreen::new(
        ScreenMessages {
            load: "Error al cargar la lista de pacientes. Intente de nuevo.",
            save: "Error al guardar paciente",
            delete: "Error al eliminar paciente",
        },
        |patient: &Patient| format!("¿Estás seguro de eliminar al paciente {}?", patient.full_name()),
    )
}

pub fn specialties_screen() -> SpecialtiesScreen {
    CrudScreen::new(
        ScreenMessages {
            load: "Error al cargar la lista de especialidades. Intente de nuevo.",
            save: "Error al guardar especialidad",
            delete: "Error al eliminar especialidad",
        },
        |specialty: &Specialty| {
            format!(
                "¿Estás seguro de eliminar la especialidad {}? Esto afectará a los médicos asociados.",
                specialty.name
            )
        },
    )
}

/// Doctors plus the specialty catalogue their form picks from.
pub struct DoctorsScreen {
    crud: CrudScreen<DoctorForm>,
    specialties: EntityList<Specialty>,
}

impl Default for DoctorsScreen {
    fn default() -> Self {
        DoctorsScreen::new()
    }
}

impl DoctorsScreen {
    pub fn new() -> Self {
        DoctorsScreen {
            crud: CrudScreen::new(
                ScreenMessages {
                    load: "Error al cargar médicos o especialidades.",
                    save: "Error al guardar médico",
                    delete: "Error eliminando médico",
                },
                |_: &Doctor| "¿Eliminar este médico?".to_string(),
            ),
            specialties: EntityList::new("Error al cargar médicos o especialidades."),
        }
    }

    pub fn crud(&self) -> &CrudScreen<DoctorForm> {
        &self.crud
    }

    pub fn crud_mut(&mut self) -> &mut CrudScreen<DoctorForm> {
        &mut self.crud
    }

    pub fn specialties(&self) -> &EntityList<Specialty> {
        &self.specialties
    }

    pub async fn mount(&mut self, gateway: &Gateway) -> bool {
        let (doctors, specialties) =
            tokio::join!(self.crud.list.reload(gateway), self.specialties.reload(gateway));
        doctors && specialties
    }

    /// Specialty names of a doctor, in the catalogue's order.
    pub fn specialty_names(&self, doctor: &Doctor) -> Vec<String> {
        let ids = doctor.specialty_ids();
        self.specialties
            .items()
            .iter()
            .filter(|specialty| ids.contains(&specialty.id))
            .map(|specialty| specialty.name.clone())
            .collect()
    }
}

/// Doctors on the left, the selected doctor's weekly hours on the right.
pub struct WorkingHoursScreen {
    doctors: EntityList<Doctor>,
    hours: CascadingSelector<HoursOfDoctor>,
    form: FormController<WorkingHourForm>,
    notice: Option<String>,
}

impl Default for WorkingHoursScreen {
    fn default() -> Self {
        WorkingHoursScreen::new()
    }
}

impl WorkingHoursScreen {
    pub fn new() -> Self {
        WorkingHoursScreen {
            doctors: EntityList::new("Error cargando médicos"),
            hours: CascadingSelector::new(HoursOfDoctor, "Error cargando horarios"),
            form: FormController::new("Error al guardar horario"),
            notice: None,
        }
    }

    pub fn doctors(&self) -> &EntityList<Doctor> {
        &self.doctors
    }

    pub fn hours(&self) -> &CascadingSelector<HoursOfDoctor> {
        &self.hours
    }

    pub fn form(&self) -> &FormController<WorkingHourForm> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController<WorkingHourForm> {
        &mut self.form
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Load the doctors and select the first one returned.
    pub async fn mount(&mut self, gateway: &Gateway) -> Resolution {
        self.doctors.reload(gateway).await;
        let first = self.doctors.first_id();
        self.hours.change(gateway, first).await
    }

    pub async fn select_doctor(&mut self, gateway: &Gateway, doctor_id: Option<Id>) -> Resolution {
        self.hours.change(gateway, doctor_id).await
    }

    pub fn open_create(&mut self) {
        self.form
            .open_create_with(WorkingHourForm::for_doctor(self.hours.selected()));
    }

    pub fn open_edit(&mut self, id: Id) -> bool {
        match self.hours.children().iter().find(|hour| hour.id == id) {
            Some(hour) => {
                self.form.open_edit(hour);
                true
            }
            None => false,
        }
    }

    pub async fn submit(&mut self, gateway: &Gateway) -> SubmitOutcome<WorkingHour> {
        let outcome = self.form.submit(gateway).await;
        if outcome.is_saved() {
            self.hours.reload(gateway).await;
        }
        outcome
    }

    pub async fn delete(&mut self, gateway: &Gateway, id: Id, confirm: &mut dyn Confirm) -> DeleteOutcome {
        let outcome = delete_confirmed::<WorkingHour>(
            gateway,
            id,
            "¿Eliminar este horario de trabajo?",
            confirm,
            "Error al eliminar",
        )
        .await;
        settle_delete(&outcome, &mut self.notice);
        if outcome == DeleteOutcome::Deleted {
            self.hours.reload(gateway).await;
        }
        outcome
    }
}

/// Patients, their medical records, and the prescriptions of one record.
pub struct ClinicalHistoryScreen {
    patients: EntityList<Patient>,
    records: CascadingSelector<RecordsOfPatient>,
    prescriptions: CascadingSelector<PrescriptionsOfRecord>,
    record_form: FormController<MedicalRecordForm>,
    prescription_form: FormController<PrescriptionForm>,
    notice: Option<String>,
}

impl Default for ClinicalHistoryScreen {
    fn default() -> Self {
        ClinicalHistoryScreen::new()
    }
}

impl ClinicalHistoryScreen {
    pub fn new() -> Self {
        ClinicalHistoryScreen {
            patients: EntityList::new("Error cargando pacientes"),
            records: CascadingSelector::new(RecordsOfPatient, "Error al cargar historial"),
            prescriptions: CascadingSelector::new(PrescriptionsOfRecord, "Error al cargar recetas"),
            record_form: FormController::new("Error al guardar historial"),
            prescription_form: FormController::new("Error guardando receta"),
            notice: None,
        }
    }

    pub fn patients(&self) -> &EntityList<Patient> {
        &self.patients
    }

    pub fn records(&self) -> &CascadingSelector<RecordsOfPatient> {
        &self.records
    }

    pub fn prescriptions(&self) -> &CascadingSelector<PrescriptionsOfRecord> {
        &self.prescriptions
    }

    pub fn record_form(&self) -> &FormController<MedicalRecordForm> {
        &self.record_form
    }

    pub fn record_form_mut(&mut self) -> &mut FormController<MedicalRecordForm> {
        &mut self.record_form
    }

    pub fn prescription_form(&self) -> &FormController<PrescriptionForm> {
        &self.prescription_form
    }

    pub fn prescription_form_mut(&mut self) -> &mut FormController<PrescriptionForm> {
        &mut self.prescription_form
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub async fn mount(&mut self, gateway: &Gateway) -> Resolution {
        self.patients.reload(gateway).await;
        let first = self.patients.first_id();
        self.select_patient(gateway, first).await
    }

    /// Select a patient, then the first of their records.
    pub async fn select_patient(&mut self, gateway: &Gateway, patient_id: Option<Id>) -> Resolution {
        let resolution = self.records.change(gateway, patient_id).await;
        let first_record = self.records.children().first().map(|record| record.id);
        self.prescriptions.change(gateway, first_record).await;
        resolution
    }

    pub async fn select_record(&mut self, gateway: &Gateway, record_id: Option<Id>) -> Resolution {
        self.prescriptions.change(gateway, record_id).await
    }

    /// Refetch the records, keeping the selected record when it survived.
    async fn refresh_records(&mut self, gateway: &Gateway) {
        self.records.reload(gateway).await;
        let current = self.prescriptions.selected();
        let record = current
            .filter(|id| self.records.children().iter().any(|record| record.id == *id))
            .or_else(|| self.records.children().first().map(|record| record.id));
        self.prescriptions.change(gateway, record).await;
    }

    pub fn open_create_record(&mut self) {
        self.record_form
            .open_create_with(MedicalRecordForm::for_patient(self.records.selected()));
    }

    pub fn open_edit_record(&mut self, id: Id) -> bool {
        match self.records.children().iter().find(|record| record.id == id) {
            Some(record) => {
                self.record_form.open_edit(record);
                true
            }
            None => false,
        }
    }

    pub async fn submit_record(&mut self, gateway: &Gateway) -> SubmitOutcome<MedicalRecord> {
        let outcome = self.record_form.submit(gateway).await;
        if outcome.is_saved() {
            self.refresh_records(gateway).await;
        }
        outcome
    }

    pub async fn delete_record(&mut self, gateway: &Gateway, id: Id, confirm: &mut dyn Confirm) -> DeleteOutcome {
        let outcome = delete_confirmed::<MedicalRecord>(
            gateway,
            id,
            "¿Eliminar este historial?",
            confirm,
            "Error al eliminar historial",
        )
        .await;
        settle_delete(&outcome, &mut self.notice);
        if outcome == DeleteOutcome::Deleted {
            self.refresh_records(gateway).await;
        }
        outcome
    }

    pub fn open_create_prescription(&mut self) {
        self.prescription_form
            .open_create_with(PrescriptionForm::for_record(self.prescriptions.selected()));
    }

    pub fn open_edit_prescription(&mut self, id: Id) -> bool {
        match self.prescriptions.children().iter().find(|p| p.id == id) {
            Some(prescription) => {
                self.prescription_form.open_edit(prescription);
                true
            }
            None => false,
        }
    }

    pub async fn submit_prescription(&mut self, gateway: &Gateway) -> SubmitOutcome<Prescription> {
        let outcome = self.prescription_form.submit(gateway).await;
        if outcome.is_saved() {
            self.prescriptions.reload(gateway).await;
        }
        outcome
    }

    pub async fn delete_prescription(
        &mut self,
        gateway: &Gateway,
        id: Id,
        confirm: &mut dyn Confirm,
    ) -> DeleteOutcome {
        let outcome = delete_confirmed::<Prescription>(
            gateway,
            id,
            "¿Eliminar esta receta?",
            confirm,
            "Error al eliminar",
        )
        .await;
        settle_delete(&outcome, &mut self.notice);
        if outcome == DeleteOutcome::Deleted {
            self.prescriptions.reload(gateway).await;
        }
        outcome
    }
}

/// Appointment list with inline status changes.
pub struct AppointmentsScreen {
    appointments: EntityList<Appointment>,
    patients: EntityList<Patient>,
    doctors: EntityList<Doctor>,
    form: FormController<AppointmentForm>,
    notice: Option<String>,
}

impl Default for AppointmentsScreen {
    fn default() -> Self {
        AppointmentsScreen::new()
    }
}

impl AppointmentsScreen {
    pub fn new() -> Self {
        AppointmentsScreen {
            appointments: EntityList::new("Error al cargar datos."),
            patients: EntityList::new("Error al cargar datos."),
            doctors: EntityList::new("Error al cargar datos."),
            form: FormController::new("Error al crear turno."),
            notice: None,
        }
    }

    pub fn appointments(&self) -> &EntityList<Appointment> {
        &self.appointments
    }

    pub fn patients(&self) -> &EntityList<Patient> {
        &self.patients
    }

    pub fn doctors(&self) -> &EntityList<Doctor> {
        &self.doctors
    }

    pub fn form(&self) -> &FormController<AppointmentForm> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController<AppointmentForm> {
        &mut self.form
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub async fn mount(&mut self, gateway: &Gateway) -> bool {
        let (appointments, patients, doctors) = tokio::join!(
            self.appointments.reload(gateway),
            self.patients.reload(gateway),
            self.doctors.reload(gateway)
        );
        appointments && patients && doctors
    }

    pub fn patient_name(&self, id: Id) -> String {
        self.patients
            .find(id)
            .map(Patient::full_name)
            .unwrap_or_else(|| "Paciente".to_string())
    }

    pub fn doctor_name(&self, id: Id) -> String {
        self.doctors
            .find(id)
            .map(Doctor::full_name)
            .unwrap_or_else(|| "Médico".to_string())
    }

    /// Appointments are created, never edited in place.
    pub fn open_create(&mut self) {
        self.form.open_create();
    }

    pub async fn submit(&mut self, gateway: &Gateway) -> SubmitOutcome<Appointment> {
        let outcome = self.form.submit(gateway).await;
        if outcome.is_saved() {
            self.appointments.reload(gateway).await;
        }
        outcome
    }

    pub async fn delete(&mut self, gateway: &Gateway, id: Id, confirm: &mut dyn Confirm) -> DeleteOutcome {
        let Some(appointment) = self.appointments.find(id) else {
            return DeleteOutcome::Failed(MSG_NOT_LISTED.to_string());
        };
        let prompt = format!("¿Eliminar el turno de {}?", self.patient_name(appointment.patient_id));
        let outcome =
            delete_confirmed::<Appointment>(gateway, id, &prompt, confirm, "Error al eliminar").await;
        settle_delete(&outcome, &mut self.notice);
        if outcome == DeleteOutcome::Deleted {
            self.appointments.reload(gateway).await;
        }
        outcome
    }

    /// Plan a transition and show it on the row while the update is pending.
    pub fn begin_status_change(&mut self, id: Id, next: AppointmentStatus) -> Option<StatusChange> {
        let appointment = self.appointments.find_mut(id)?;
        let change = StatusChange::plan(appointment, next);
        change.apply_display(appointment);
        self.notice = None;
        Some(change)
    }

    /// Settle a transition: the saved row replaces the pending one before the
    /// reload, and a rejection restores the row.
    pub async fn finish_status_change(
        &mut self,
        gateway: &Gateway,
        change: StatusChange,
        result: Result<Appointment, ApiError>,
    ) -> Result<(), String> {
        match result {
            Ok(saved) => {
                if let Some(row) = self.appointments.find_mut(saved.id) {
                    *row = saved;
                }
                self.appointments.reload(gateway).await;
                Ok(())
            }
            Err(err) => {
                warn!(appointment = %change.appointment_id, "status update rejected: {}", err);
                if let Some(appointment) = self.appointments.find_mut(change.appointment_id) {
                    change.restore_display(appointment);
                }
                let message = err.user_message("Error al actualizar el estado");
                self.notice = Some(message.clone());
                Err(message)
            }
        }
    }

    pub async fn change_status(
        &mut self,
        gateway: &Gateway,
        id: Id,
        next: AppointmentStatus,
    ) -> Result<(), String> {
        let Some(change) = self.begin_status_change(id, next) else {
            return Err(MSG_NOT_LISTED.to_string());
        };
        let result = change.submit(gateway).await;
        self.finish_status_change(gateway, change, result).await
    }
}

/// Report filters with the doctor and specialty pickers.
pub struct ReportsScreen {
    doctors: EntityList<Doctor>,
    specialties: EntityList<Specialty>,
    builder: ReportBuilder,
}

impl ReportsScreen {
    pub fn new(page_size: u32) -> Self {
        ReportsScreen {
            doctors: EntityList::new("Error cargando médicos o especialidades"),
            specialties: EntityList::new("Error cargando médicos o especialidades"),
            builder: ReportBuilder::new(page_size),
        }
    }

    pub fn doctors(&self) -> &EntityList<Doctor> {
        &self.doctors
    }

    pub fn specialties(&self) -> &EntityList<Specialty> {
        &self.specialties
    }

    pub fn builder(&self) -> &ReportBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut ReportBuilder {
        &mut self.builder
    }

    pub async fn mount(&mut self, gateway: &Gateway) -> bool {
        let (doctors, specialties) =
            tokio::join!(self.doctors.reload(gateway), self.specialties.reload(gateway));
        doctors && specialties
    }

    pub async fn run(&mut self, gateway: &Gateway, mode: ReportMode) -> Result<(), String> {
        self.builder.run(gateway, mode).await
    }

    pub async fn go_to_page(&mut self, gateway: &Gateway, page: u32) -> Result<(), String> {
        self.builder.go_to_page(gateway, page).await
    }
}

fn settle_delete(outcome: &DeleteOutcome, notice: &mut Option<String>) {
    match outcome {
        DeleteOutcome::Deleted => *notice = None,
        DeleteOutcome::Failed(message) => *notice = Some(message.clone()),
        DeleteOutcome::Declined => debug!("delete declined"),
    }
}
