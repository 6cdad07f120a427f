/// Interactive terminal console for the clinic backend.
///
/// Each menu entry opens one screen; leaving the entry drops the screen and
/// everything it fetched.
use clinic_console::entity_forms::{
    AppointmentForm, DoctorForm, MedicalRecordForm, PatientForm, PrescriptionForm, SpecialtyForm,
    WorkingHourForm,
};
use clinic_console::forms::{DeleteOutcome, EntityForm, FormController, SubmitOutcome};
use clinic_console::models::{AppointmentStatus, Id, Weekday};
use clinic_console::reports::{
    AttendanceSummary, AttendanceView, ReportFilters, ReportMode, ReportResult,
};
use clinic_console::screens::{
    self, AppointmentsScreen, ClinicalHistoryScreen, DoctorsScreen, PatientsScreen, ReportsScreen,
    SpecialtiesScreen, WorkingHoursScreen,
};
use clinic_console::{ConsoleConfig, ConsoleError, Gateway};
use chrono::NaiveDate;
use std::io::{self, Write};
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct ClinicCLI {
    gateway: Gateway,
    runtime: Runtime,
    report_page_size: u32,
    running: bool,
}

impl ClinicCLI {
    fn new(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(ClinicCLI {
            gateway: Gateway::connect(config)?,
            runtime,
            report_page_size: config.report_page_size,
            running: true,
        })
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       CONSOLA DE ADMINISTRACIÓN DE LA CLÍNICA");
        println!("{}", "=".repeat(60));
    }

    fn print_menu(&self) {
        println!("\n--- Menú principal ---");
        println!("1. Pacientes");
        println!("2. Médicos");
        println!("3. Especialidades");
        println!("4. Horarios de trabajo");
        println!("5. Turnos");
        println!("6. Historia clínica");
        println!("7. Reportes");
        println!("8. Salir");
        println!("{}", "-".repeat(20));
    }

    fn get_input(&self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(def) if !def.is_empty() => print!("{} [{}]: ", prompt, def),
            _ => print!("{}: ", prompt),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "entrada cerrada"));
        }
        let input = input.trim();

        if input.is_empty() {
            Ok(default.unwrap_or("").to_string())
        } else {
            Ok(input.to_string())
        }
    }

    fn get_int_input(&self, prompt: &str, default: Option<u32>) -> io::Result<u32> {
        loop {
            let default_str = default.map(|d| d.to_string());
            let input = self.get_input(prompt, default_str.as_deref())?;

            if let Ok(value) = input.parse::<u32>() {
                return Ok(value);
            }
            println!("Ingrese un número válido");
        }
    }

    fn get_id_input(&self, prompt: &str) -> io::Result<Option<Id>> {
        let input = self.get_input(prompt, None)?;
        let id = Id::normalize(&input);
        if id.is_none() && !input.is_empty() {
            println!("Identificador inválido: '{}'", input);
        }
        Ok(id)
    }

    fn get_date_input(&self, prompt: &str) -> io::Result<Option<NaiveDate>> {
        let input = self.get_input(prompt, None)?;
        if input.is_empty() {
            return Ok(None);
        }
        match NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
            Ok(date) => Ok(Some(date)),
            Err(_) => {
                println!("Fecha inválida '{}', use AAAA-MM-DD", input);
                Ok(None)
            }
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        matches!(
            self.get_input(&format!("{} (s/n)", prompt), Some("n"))
                .map(|answer| answer.to_lowercase()),
            Ok(answer) if answer == "s" || answer == "si" || answer == "sí"
        )
    }

    fn edit(&self, prompt: &str, value: &mut String) -> io::Result<()> {
        *value = self.get_input(prompt, Some(value.as_str()))?;
        Ok(())
    }

    fn report_submit<R>(&self, outcome: &SubmitOutcome<R>) {
        match outcome {
            SubmitOutcome::Saved(_) => println!("\nGuardado."),
            SubmitOutcome::Invalid(message) | SubmitOutcome::Failed(message) => {
                println!("\n{}", message)
            }
            SubmitOutcome::Busy => println!("\nYa hay un guardado en curso."),
            SubmitOutcome::NotOpen => println!("\nNo hay un formulario abierto."),
        }
    }

    fn report_delete(&self, outcome: &DeleteOutcome) {
        match outcome {
            DeleteOutcome::Deleted => println!("\nEliminado."),
            DeleteOutcome::Declined => println!("\nOperación cancelada."),
            DeleteOutcome::Failed(message) => println!("\n{}", message),
        }
    }

    fn crud_menu(&self, title: &str) -> io::Result<u32> {
        println!("\n--- {} ---", title);
        println!("1. Nuevo  2. Editar  3. Eliminar  4. Recargar  5. Volver");
        self.get_int_input("Opción", Some(5))
    }

    fn fill_patient(&self, form: &mut PatientForm) -> io::Result<()> {
        self.edit("Nombre", &mut form.first_name)?;
        self.edit("Apellido", &mut form.last_name)?;
        self.edit("Fecha de nacimiento (AAAA-MM-DD)", &mut form.birth_date)?;
        self.edit("Género", &mut form.gender)?;
        self.edit("Email", &mut form.email)?;
        self.edit("Teléfono", &mut form.phone)?;
        self.edit("Dirección", &mut form.address)
    }

    fn fill_specialty(&self, form: &mut SpecialtyForm) -> io::Result<()> {
        self.edit("Nombre", &mut form.name)?;
        self.edit("Descripción", &mut form.description)
    }

    fn fill_doctor(&self, form: &mut DoctorForm) -> io::Result<()> {
        self.edit("Nombre", &mut form.first_name)?;
        self.edit("Apellido", &mut form.last_name)?;
        self.edit("Matrícula", &mut form.license_number)?;
        self.edit("Email", &mut form.email)?;
        self.edit("Especialidades (ids separados por coma)", &mut form.specialties)
    }

    fn fill_working_hour(&self, form: &mut WorkingHourForm) -> io::Result<()> {
        let days: Vec<&str> = Weekday::ALL.iter().map(Weekday::name).collect();
        self.edit(&format!("Día ({})", days.join(", ")), &mut form.weekday)?;
        self.edit("Hora inicio (HH:MM)", &mut form.start_time)?;
        self.edit("Hora fin (HH:MM)", &mut form.end_time)
    }

    fn fill_appointment(&self, form: &mut AppointmentForm) -> io::Result<()> {
        self.edit("Id de paciente", &mut form.patient_id)?;
        self.edit("Id de médico", &mut form.doctor_id)?;
        self.edit("Inicio (AAAA-MM-DDTHH:MM)", &mut form.start_at)?;
        self.edit("Fin (AAAA-MM-DDTHH:MM)", &mut form.end_at)?;
        self.edit("Notas", &mut form.notes)
    }

    fn fill_record(&self, form: &mut MedicalRecordForm) -> io::Result<()> {
        self.edit("Id de médico (opcional)", &mut form.doctor_id)?;
        self.edit("Resumen", &mut form.summary)
    }

    fn fill_prescription(&self, form: &mut PrescriptionForm) -> io::Result<()> {
        self.edit("Medicamento", &mut form.medication)?;
        self.edit("Dosis", &mut form.dosage)?;
        self.edit("Frecuencia", &mut form.frequency)?;
        self.edit("Indicaciones", &mut form.instructions)
    }

    /// Prompt for the fields of an open form, or do nothing when it is closed.
    fn fill<F: EntityForm>(
        &self,
        form: &mut FormController<F>,
        prompt_fields: fn(&Self, &mut F) -> io::Result<()>,
    ) -> io::Result<bool> {
        if !form.is_open() {
            println!("\nRegistro no encontrado.");
            return Ok(false);
        }
        prompt_fields(self, form.fields_mut())?;
        Ok(true)
    }

    /// Prompt, submit and keep prompting while the save is rejected.
    ///
    /// A rejected form stays open with what was typed, so each retry offers
    /// those values as defaults. The form closes on a save or when the user
    /// gives up.
    fn save<S, F: EntityForm>(
        &self,
        screen: &mut S,
        form: fn(&mut S) -> &mut FormController<F>,
        prompt_fields: fn(&Self, &mut F) -> io::Result<()>,
        submit: fn(&Runtime, &mut S, &Gateway) -> SubmitOutcome<F::Entity>,
    ) -> io::Result<()> {
        if !self.fill(form(screen), prompt_fields)? {
            return Ok(());
        }
        loop {
            let outcome = submit(&self.runtime, screen, &self.gateway);
            self.report_submit(&outcome);
            if outcome.message().is_none() || !self.confirm("¿Corregir y reintentar?") {
                form(screen).close();
                return Ok(());
            }
            prompt_fields(self, form(screen).fields_mut())?;
        }
    }

    fn patients(&self) -> io::Result<()> {
        let mut screen = screens::patients_screen();
        self.runtime.block_on(screen.mount(&self.gateway));
        loop {
            if let Some(error) = screen.list().error() {
                println!("\n{}", error);
            }
            for patient in screen.list().items() {
                println!(
                    "  [{}] {:25} {:12} {}",
                    patient.id,
                    patient.full_name(),
                    patient.birth_date,
                    patient.email
                );
            }
            match self.crud_menu("Pacientes")? {
                1 => screen.open_create(),
                2 => {
                    if let Some(id) = self.get_id_input("Id")? {
                        screen.open_edit(id);
                    }
                }
                3 => {
                    if let Some(id) = self.get_id_input("Id")? {
                        let mut confirm = |prompt: &str| self.confirm(prompt);
                        let outcome = self
                            .runtime
                            .block_on(screen.delete(&self.gateway, id, &mut confirm));
                        self.report_delete(&outcome);
                    }
                    continue;
                }
                4 => {
                    self.runtime.block_on(screen.mount(&self.gateway));
                    continue;
                }
                _ => return Ok(()),
            }
            self.save(
                &mut screen,
                PatientsScreen::form_mut,
                Self::fill_patient,
                |runtime, screen, gateway| runtime.block_on(screen.submit(gateway)),
            )?;
        }
    }

    fn specialties(&self) -> io::Result<()> {
        let mut screen = screens::specialties_screen();
        self.runtime.block_on(screen.mount(&self.gateway));
        loop {
            if let Some(error) = screen.list().error() {
                println!("\n{}", error);
            }
            for specialty in screen.list().items() {
                println!(
                    "  [{}] {:25} {}",
                    specialty.id,
                    specialty.name,
                    specialty.description.as_deref().unwrap_or("")
                );
            }
            match self.crud_menu("Especialidades")? {
                1 => screen.open_create(),
                2 => {
                    if let Some(id) = self.get_id_input("Id")? {
                        screen.open_edit(id);
                    }
                }
                3 => {
                    if let Some(id) = self.get_id_input("Id")? {
                        let mut confirm = |prompt: &str| self.confirm(prompt);
                        let outcome = self
                            .runtime
                            .block_on(screen.delete(&self.gateway, id, &mut confirm));
                        self.report_delete(&outcome);
                    }
                    continue;
                }
                4 => {
                    self.runtime.block_on(screen.mount(&self.gateway));
                    continue;
                }
                _ => return Ok(()),
            }
            self.save(
                &mut screen,
                SpecialtiesScreen::form_mut,
                Self::fill_specialty,
                |runtime, screen, gateway| runtime.block_on(screen.submit(gateway)),
            )?;
        }
    }

    fn doctors(&self) -> io::Result<()> {
        let mut screen = DoctorsScreen::new();
        self.runtime.block_on(screen.mount(&self.gateway));
        loop {
            if let Some(error) = screen.crud().list().error() {
                println!("\n{}", error);
            }
            println!("Especialidades disponibles:");
            for specialty in screen.specialties().items() {
                println!("  ({}) {}", specialty.id, specialty.name);
            }
            for doctor in screen.crud().list().items() {
                println!(
                    "  [{}] {:25} {:10} {}",
                    doctor.id,
                    doctor.full_name(),
                    doctor.license_number,
                    screen.specialty_names(doctor).join(", ")
                );
            }
            match self.crud_menu("Médicos")? {
                1 => screen.crud_mut().open_create(),
                2 => {
                    if let Some(id) = self.get_id_input("Id")? {
                        screen.crud_mut().open_edit(id);
                    }
                }
                3 => {
                    if let Some(id) = self.get_id_input("Id")? {
                        let mut confirm = |prompt: &str| self.confirm(prompt);
                        let outcome = self
                            .runtime
                            .block_on(screen.crud_mut().delete(&self.gateway, id, &mut confirm));
                        self.report_delete(&outcome);
                    }
                    continue;
                }
                4 => {
                    self.runtime.block_on(screen.mount(&self.gateway));
                    continue;
                }
                _ => return Ok(()),
            }
            self.save(
                &mut screen,
                |screen| screen.crud_mut().form_mut(),
                Self::fill_doctor,
                |runtime, screen, gateway| runtime.block_on(screen.crud_mut().submit(gateway)),
            )?;
        }
    }

    fn working_hours(&self) -> io::Result<()> {
        let mut screen = WorkingHoursScreen::new();
        self.runtime.block_on(screen.mount(&self.gateway));
        loop {
            for doctor in screen.doctors().items() {
                let marker = if screen.hours().selected() == Some(doctor.id) { '*' } else { ' ' };
                println!("{} [{}] {}", marker, doctor.id, doctor.full_name());
            }
            if let Some(error) = screen.hours().error() {
                println!("\n{}", error);
            }
            for hour in screen.hours().children() {
                println!(
                    "    ({}) {:10} {} - {}",
                    hour.id,
                    hour.weekday.name(),
                    hour.start_time.format("%H:%M"),
                    hour.end_time.format("%H:%M")
                );
            }
            println!("\n--- Horarios de trabajo ---");
            println!("1. Elegir médico  2. Nuevo  3. Editar  4. Eliminar  5. Volver");
            match self.get_int_input("Opción", Some(5))? {
                1 => {
                    let id = self.get_id_input("Id de médico")?;
                    self.runtime.block_on(screen.select_doctor(&self.gateway, id));
                    continue;
                }
                2 => screen.open_create(),
                3 => {
                    if let Some(id) = self.get_id_input("Id de horario")? {
                        screen.open_edit(id);
                    }
                }
                4 => {
                    if let Some(id) = self.get_id_input("Id de horario")? {
                        let mut confirm = |prompt: &str| self.confirm(prompt);
                        let outcome = self
                            .runtime
                            .block_on(screen.delete(&self.gateway, id, &mut confirm));
                        self.report_delete(&outcome);
                    }
                    continue;
                }
                _ => return Ok(()),
            }
            self.save(
                &mut screen,
                WorkingHoursScreen::form_mut,
                Self::fill_working_hour,
                |runtime, screen, gateway| runtime.block_on(screen.submit(gateway)),
            )?;
        }
    }

    fn appointments(&self) -> io::Result<()> {
        let mut screen = AppointmentsScreen::new();
        self.runtime.block_on(screen.mount(&self.gateway));
        loop {
            if let Some(error) = screen.appointments().error() {
                println!("\n{}", error);
            }
            for appointment in screen.appointments().items() {
                println!(
                    "  [{}] {} {:20} {:20} {:11} {}",
                    appointment.id,
                    appointment.start_at.format("%Y-%m-%d %H:%M"),
                    screen.patient_name(appointment.patient_id),
                    screen.doctor_name(appointment.doctor_id),
                    appointment.status.label(),
                    if appointment.attended { "asistió" } else { "" }
                );
            }
            println!("\n--- Turnos ---");
            println!("1. Nuevo  2. Cambiar estado  3. Eliminar  4. Recargar  5. Volver");
            match self.get_int_input("Opción", Some(5))? {
                1 => {
                    screen.open_create();
                    self.save(
                        &mut screen,
                        AppointmentsScreen::form_mut,
                        Self::fill_appointment,
                        |runtime, screen, gateway| runtime.block_on(screen.submit(gateway)),
                    )?;
                }
                2 => {
                    let Some(id) = self.get_id_input("Id de turno")? else {
                        continue;
                    };
                    for (index, status) in AppointmentStatus::ALL.iter().enumerate() {
                        println!("  {}. {}", index + 1, status.label());
                    }
                    let choice = self.get_int_input("Nuevo estado", None)? as usize;
                    let next = choice
                        .checked_sub(1)
                        .and_then(|i| AppointmentStatus::ALL.get(i).copied());
                    let Some(next) = next else {
                        println!("Opción inválida");
                        continue;
                    };
                    if let Err(message) = self
                        .runtime
                        .block_on(screen.change_status(&self.gateway, id, next))
                    {
                        println!("\n{}", message);
                    }
                }
                3 => {
                    if let Some(id) = self.get_id_input("Id de turno")? {
                        let mut confirm = |prompt: &str| self.confirm(prompt);
                        let outcome = self
                            .runtime
                            .block_on(screen.delete(&self.gateway, id, &mut confirm));
                        self.report_delete(&outcome);
                    }
                }
                4 => {
                    self.runtime.block_on(screen.mount(&self.gateway));
                }
                _ => return Ok(()),
            }
        }
    }

    fn save_record(&self, screen: &mut ClinicalHistoryScreen) -> io::Result<()> {
        self.save(
            screen,
            ClinicalHistoryScreen::record_form_mut,
            Self::fill_record,
            |runtime, screen, gateway| runtime.block_on(screen.submit_record(gateway)),
        )
    }

    fn save_prescription(&self, screen: &mut ClinicalHistoryScreen) -> io::Result<()> {
        self.save(
            screen,
            ClinicalHistoryScreen::prescription_form_mut,
            Self::fill_prescription,
            |runtime, screen, gateway| runtime.block_on(screen.submit_prescription(gateway)),
        )
    }

    fn clinical_history(&self) -> io::Result<()> {
        let mut screen = ClinicalHistoryScreen::new();
        self.runtime.block_on(screen.mount(&self.gateway));
        loop {
            for patient in screen.patients().items() {
                let marker = if screen.records().selected() == Some(patient.id) { '*' } else { ' ' };
                println!("{} [{}] {}", marker, patient.id, patient.full_name());
            }
            if let Some(error) = screen.records().error() {
                println!("\n{}", error);
            }
            for record in screen.records().children() {
                let marker = if screen.prescriptions().selected() == Some(record.id) { '*' } else { ' ' };
                println!(
                    "  {} ({}) {} {}",
                    marker,
                    record.id,
                    record.record_date.format("%Y-%m-%d"),
                    record.summary
                );
            }
            for prescription in screen.prescriptions().children() {
                println!(
                    "      <{}> {} {}",
                    prescription.id,
                    prescription.medication,
                    prescription.dosage.as_deref().unwrap_or("")
                );
            }
            println!("\n--- Historia clínica ---");
            println!("1. Elegir paciente  2. Elegir historial  3. Nuevo historial  4. Editar historial");
            println!("5. Eliminar historial  6. Nueva receta  7. Editar receta  8. Eliminar receta  9. Volver");
            match self.get_int_input("Opción", Some(9))? {
                1 => {
                    let id = self.get_id_input("Id de paciente")?;
                    self.runtime.block_on(screen.select_patient(&self.gateway, id));
                }
                2 => {
                    let id = self.get_id_input("Id de historial")?;
                    self.runtime.block_on(screen.select_record(&self.gateway, id));
                }
                3 => {
                    screen.open_create_record();
                    self.save_record(&mut screen)?;
                }
                4 => {
                    if let Some(id) = self.get_id_input("Id de historial")? {
                        screen.open_edit_record(id);
                        self.save_record(&mut screen)?;
                    }
                }
                5 => {
                    if let Some(id) = self.get_id_input("Id de historial")? {
                        let mut confirm = |prompt: &str| self.confirm(prompt);
                        let outcome = self
                            .runtime
                            .block_on(screen.delete_record(&self.gateway, id, &mut confirm));
                        self.report_delete(&outcome);
                    }
                }
                6 => {
                    screen.open_create_prescription();
                    self.save_prescription(&mut screen)?;
                }
                7 => {
                    if let Some(id) = self.get_id_input("Id de receta")? {
                        screen.open_edit_prescription(id);
                        self.save_prescription(&mut screen)?;
                    }
                }
                8 => {
                    if let Some(id) = self.get_id_input("Id de receta")? {
                        let mut confirm = |prompt: &str| self.confirm(prompt);
                        let outcome = self
                            .runtime
                            .block_on(screen.delete_prescription(&self.gateway, id, &mut confirm));
                        self.report_delete(&outcome);
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn reports(&self) -> io::Result<()> {
        let mut screen = ReportsScreen::new(self.report_page_size);
        self.runtime.block_on(screen.mount(&self.gateway));
        loop {
            println!("\n--- Reportes ---");
            println!("1. Turnos por médico  2. Turnos por especialidad  3. Gráfico de asistencia");
            println!("4. Estadísticas de asistencia  5. Pacientes atendidos  6. Otra página  7. Volver");
            let mode = match self.get_int_input("Opción", Some(7))? {
                1 => ReportMode::ByDoctor,
                2 => ReportMode::BySpecialty,
                3 => ReportMode::Attendance(AttendanceView::Chart),
                4 => ReportMode::Attendance(AttendanceView::Stats),
                5 => ReportMode::PatientsAttended,
                6 => {
                    let page = self.get_int_input("Página", None)?;
                    if let Err(message) = self.runtime.block_on(screen.go_to_page(&self.gateway, page)) {
                        println!("\n{}", message);
                    }
                    self.print_report(&screen);
                    continue;
                }
                _ => return Ok(()),
            };

            let mut filters = ReportFilters {
                start_date: self.get_date_input("Desde (AAAA-MM-DD)")?,
                end_date: self.get_date_input("Hasta (AAAA-MM-DD)")?,
                ..ReportFilters::default()
            };
            match mode {
                ReportMode::ByDoctor => {
                    for doctor in screen.doctors().items() {
                        println!("  [{}] {}", doctor.id, doctor.full_name());
                    }
                    filters.doctor_id = self.get_id_input("Id de médico")?;
                }
                ReportMode::BySpecialty => {
                    for specialty in screen.specialties().items() {
                        println!("  [{}] {}", specialty.id, specialty.name);
                    }
                    filters.specialty_id = self.get_id_input("Id de especialidad")?;
                }
                _ => {}
            }
            screen.builder_mut().set_filters(filters);

            if let Err(message) = self.runtime.block_on(screen.run(&self.gateway, mode)) {
                println!("\n{}", message);
                continue;
            }
            self.print_report(&screen);
        }
    }

    fn print_report(&self, screen: &ReportsScreen) {
        let Some(result) = screen.builder().result() else {
            return;
        };
        match result {
            ReportResult::Appointments(rows) => {
                println!("\n{} turnos", rows.len());
                for row in rows {
                    println!(
                        "  {} {:25} {}",
                        row.start_at.format("%Y-%m-%d %H:%M"),
                        row.patient_name,
                        row.status.map(|s| s.label()).unwrap_or("")
                    );
                }
            }
            ReportResult::Specialties(counts) => {
                for count in counts {
                    println!("  {:25} {}", count.specialty_name, count.appointment_count);
                }
            }
            ReportResult::Attendance(summary) => match summary.chart_base64() {
                Some(chart) => println!("\nGráfico recibido ({} bytes en base64)", chart.len()),
                None => {
                    if let AttendanceSummary::Totals(totals) = summary {
                        for (status, total) in totals {
                            println!("  {:12} {}", status, total);
                        }
                    }
                }
            },
            ReportResult::Patients(page) => {
                for patient in &page.data {
                    println!("  {:25} {}", patient.patient_name, patient.appointment_count);
                }
                if let Some(pagination) = screen.builder().pagination() {
                    println!(
                        "\nPágina {} de {}",
                        pagination.current_page, pagination.total_pages
                    );
                }
            }
        }
    }

    fn run(&mut self) -> io::Result<()> {
        self.print_header();

        while self.running {
            self.print_menu();

            let choice = self.get_int_input("Opción", Some(8))?;

            match choice {
                1 => self.patients()?,
                2 => self.doctors()?,
                3 => self.specialties()?,
                4 => self.working_hours()?,
                5 => self.appointments()?,
                6 => self.clinical_history()?,
                7 => self.reports()?,
                8 => {
                    self.running = false;
                    println!("\n¡Hasta luego!");
                }
                _ => println!("Opción inválida"),
            }
        }
        Ok(())
    }
}

fn init_tracing(config: &ConsoleConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), ConsoleError> {
    let config = ConsoleConfig::load()?;
    init_tracing(&config);
    info!(base_url = %config.base_url, "starting console");

    let mut cli = ClinicCLI::new(&config)?;
    match cli.run() {
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(()),
        result => Ok(result?),
    }
}
