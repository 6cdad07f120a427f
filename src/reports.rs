/// Report queries.
///
/// A [`ReportBuilder`] turns the current filter set into one of four report
/// requests and holds the single result on display. Starting any report
/// replaces whatever was shown before, and a response for a superseded
/// request is dropped.

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::models::{AppointmentStatus, Id};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Optional inclusive date bounds, sent as `start_date` / `end_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateRange { start, end }
    }

    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(start) = self.start {
            query.push(("start_date", start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.end {
            query.push(("end_date", end.format(DATE_FORMAT).to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppointmentRow {
    pub id: Id,
    pub patient_id: Id,
    pub patient_name: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub attended: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DoctorAppointments {
    pub doctor_id: Id,
    pub doctor_name: String,
    pub appointment_count: u64,
    #[serde(default)]
    pub appointments: Vec<AppointmentRow>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpecialtyCount {
    pub specialty_id: Id,
    pub specialty_name: String,
    pub appointment_count: u64,
}

/// Attendance is returned either as a rendered chart or as raw totals.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttendanceSummary {
    Chart { chart_image: String },
    Totals(BTreeMap<String, u64>),
}

impl AttendanceSummary {
    /// Base64 part of a `data:image/png;base64,...` chart.
    pub fn chart_base64(&self) -> Option<&str> {
        match self {
            AttendanceSummary::Chart { chart_image } => Some(
                chart_image
                    .split_once(',')
                    .map(|(_, data)| data)
                    .unwrap_or(chart_image),
            ),
            AttendanceSummary::Totals(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatientActivity {
    pub patient_id: Id,
    pub patient_name: String,
    pub appointment_count: u64,
    #[serde(default)]
    pub last_appointment: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatientPage {
    pub data: Vec<PatientActivity>,
    pub current_page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceView {
    Chart,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    ByDoctor,
    BySpecialty,
    Attendance(AttendanceView),
    PatientsAttended,
}

impl ReportMode {
    /// Shown when the backend rejects the report without detail.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ReportMode::ByDoctor => "Error al obtener el reporte de turnos por médico.",
            ReportMode::BySpecialty => "Error al obtener el reporte de turnos por especialidad.",
            ReportMode::Attendance(_) => "Error al obtener estadísticas de asistencia.",
            ReportMode::PatientsAttended => "Error al obtener pacientes atendidos.",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilters {
    pub doctor_id: Option<Id>,
    pub specialty_id: Option<Id>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportFilters {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// A fully validated report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportQuery {
    ByDoctor { doctor_id: Id, range: DateRange },
    BySpecialty { specialty_id: Id, range: DateRange },
    Attendance { view: AttendanceView, range: DateRange },
    PatientsAttended { range: DateRange, page: u32, page_size: u32 },
}

impl ReportQuery {
    /// Validate `filters` for `mode`; the error is the message to show.
    pub fn build(
        mode: ReportMode,
        filters: &ReportFilters,
        page: u32,
        page_size: u32,
    ) -> Result<Self, String> {
        let range = filters.range();
        match mode {
            ReportMode::ByDoctor => {
                let doctor_id = filters.doctor_id.ok_or("Seleccione un médico.")?;
                Ok(ReportQuery::ByDoctor { doctor_id, range })
            }
            ReportMode::BySpecialty => {
                let specialty_id = filters.specialty_id.ok_or("Seleccione una especialidad.")?;
                Ok(ReportQuery::BySpecialty { specialty_id, range })
            }
            ReportMode::Attendance(view) => Ok(ReportQuery::Attendance { view, range }),
            ReportMode::PatientsAttended => {
                if !range.is_complete() {
                    return Err("Debe seleccionar un rango de fechas.".to_string());
                }
                Ok(ReportQuery::PatientsAttended {
                    range,
                    page: page.max(1),
                    page_size,
                })
            }
        }
    }

    pub fn mode(&self) -> ReportMode {
        match self {
            ReportQuery::ByDoctor { .. } => ReportMode::ByDoctor,
            ReportQuery::BySpecialty { .. } => ReportMode::BySpecialty,
            ReportQuery::Attendance { view, .. } => ReportMode::Attendance(*view),
            ReportQuery::PatientsAttended { .. } => ReportMode::PatientsAttended,
        }
    }

    pub async fn execute(&self, gateway: &Gateway) -> Result<ReportResult, ApiError> {
        match self {
            ReportQuery::ByDoctor { doctor_id, range } => {
                let groups = gateway.report_appointments_by_doctor(*doctor_id, range).await?;
                let rows = groups
                    .into_iter()
                    .next()
                    .map(|group| group.appointments)
                    .unwrap_or_default();
                Ok(ReportResult::Appointments(rows))
            }
            ReportQuery::BySpecialty { specialty_id, range } => {
                let counts = gateway.report_appointments_by_specialty(range).await?;
                Ok(ReportResult::Specialties(
                    counts
                        .into_iter()
                        .filter(|count| count.specialty_id == *specialty_id)
                        .collect(),
                ))
            }
            ReportQuery::Attendance { view, range } => {
                let summary = match view {
                    AttendanceView::Chart => gateway.report_attendance_chart(range).await?,
                    AttendanceView::Stats => gateway.report_attendance_stats(range).await?,
                };
                Ok(ReportResult::Attendance(summary))
            }
            ReportQuery::PatientsAttended {
                range,
                page,
                page_size,
            } => {
                let page = gateway
                    .report_patients_attended(range, *page, *page_size)
                    .await?;
                Ok(ReportResult::Patients(page))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportResult {
    Appointments(Vec<AppointmentRow>),
    Specialties(Vec<SpecialtyCount>),
    Attendance(AttendanceSummary),
    Patients(PatientPage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            current_page: 1,
            total_pages: 1,
        }
    }
}

/// Handle for an issued report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTicket {
    generation: u64,
    query: ReportQuery,
}

impl ReportTicket {
    pub fn query(&self) -> &ReportQuery {
        &self.query
    }
}

pub struct ReportBuilder {
    filters: ReportFilters,
    page_size: u32,
    mode: Option<ReportMode>,
    result: Option<ReportResult>,
    pagination: Pagination,
    generation: u64,
    loading: bool,
    error: Option<String>,
}

impl ReportBuilder {
    pub fn new(page_size: u32) -> Self {
        ReportBuilder {
            filters: ReportFilters::default(),
            page_size: page_size.max(1),
            mode: None,
            result: None,
            pagination: Pagination::default(),
            generation: 0,
            loading: false,
            error: None,
        }
    }

    pub fn filters(&self) -> &ReportFilters {
        &self.filters
    }

    /// Replace the filter set. Pagination starts over.
    pub fn set_filters(&mut self, filters: ReportFilters) {
        if filters != self.filters {
            self.pagination = Pagination::default();
        }
        self.filters = filters;
    }

    pub fn mode(&self) -> Option<ReportMode> {
        self.mode
    }

    pub fn result(&self) -> Option<&ReportResult> {
        self.result.as_ref()
    }

    /// Meaningful only while the paginated report is active.
    pub fn pagination(&self) -> Option<Pagination> {
        match self.mode {
            Some(ReportMode::PatientsAttended) => Some(self.pagination),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a fresh report in `mode`, always from the first page.
    pub fn begin(&mut self, mode: ReportMode) -> Result<ReportTicket, String> {
        self.begin_at(mode, 1)
    }

    /// Request another page of the active paginated report.
    pub fn begin_page(&mut self, page: u32) -> Result<ReportTicket, String> {
        if self.mode != Some(ReportMode::PatientsAttended) {
            return Err("No hay un reporte paginado activo.".to_string());
        }
        if page == 0 || page > self.pagination.total_pages.max(1) {
            return Err(format!(
                "Página fuera de rango (1-{}).",
                self.pagination.total_pages.max(1)
            ));
        }
        self.begin_at(ReportMode::PatientsAttended, page)
    }

    fn begin_at(&mut self, mode: ReportMode, page: u32) -> Result<ReportTicket, String> {
        let query = match ReportQuery::build(mode, &self.filters, page, self.page_size) {
            Ok(query) => query,
            Err(message) => {
                debug!(?mode, "report request blocked: {}", message);
                self.error = Some(message.clone());
                return Err(message);
            }
        };

        if self.mode != Some(mode) {
            self.pagination = Pagination::default();
        }
        self.generation += 1;
        self.mode = Some(mode);
        self.result = None;
        self.loading = true;
        self.error = None;
        info!(?mode, page, "running report");

        Ok(ReportTicket {
            generation: self.generation,
            query,
        })
    }

    /// Apply a report outcome; returns false when the ticket was superseded.
    pub fn finish(&mut self, ticket: ReportTicket, outcome: Result<ReportResult, ApiError>) -> bool {
        if ticket.generation != self.generation {
            debug!(mode = ?ticket.query.mode(), "discarding superseded report response");
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(result) => {
                if let ReportResult::Patients(page) = &result {
                    self.pagination = Pagination {
                        current_page: page.current_page.max(1),
                        total_pages: page.total_pages.max(1),
                    };
                }
                self.result = Some(result);
            }
            Err(err) => {
                self.error = Some(err.user_message(ticket.query.mode().failure_message()));
            }
        }
        true
    }

    pub async fn run(&mut self, gateway: &Gateway, mode: ReportMode) -> Result<(), String> {
        let ticket = self.begin(mode)?;
        let outcome = ticket.query().execute(gateway).await;
        self.finish(ticket, outcome);
        self.error.clone().map_or(Ok(()), Err)
    }

    pub async fn go_to_page(&mut self, gateway: &Gateway, page: u32) -> Result<(), String> {
        let ticket = self.begin_page(page)?;
        let outcome = ticket.query().execute(gateway).await;
        self.finish(ticket, outcome);
        self.error.clone().map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 1, d)
    }

    #[test]
    fn doctor_report_requires_a_doctor() {
        let mut builder = ReportBuilder::new(10);
        let blocked = builder.begin(ReportMode::ByDoctor);

        assert_eq!(blocked, Err("Seleccione un médico.".to_string()));
        assert_eq!(builder.mode(), None);
        assert!(!builder.is_loading());
    }

    #[test]
    fn attendance_report_needs_no_filters() {
        let query = ReportQuery::build(
            ReportMode::Attendance(AttendanceView::Chart),
            &ReportFilters::default(),
            1,
            10,
        )
        .unwrap();
        assert_eq!(
            query,
            ReportQuery::Attendance {
                view: AttendanceView::Chart,
                range: DateRange::default()
            }
        );
    }

    #[test]
    fn patients_report_needs_both_dates() {
        let filters = ReportFilters {
            start_date: date(1),
            ..ReportFilters::default()
        };
        assert_eq!(
            ReportQuery::build(ReportMode::PatientsAttended, &filters, 1, 10),
            Err("Debe seleccionar un rango de fechas.".to_string())
        );
    }

    #[test]
    fn new_request_clears_previous_result_and_supersedes_old_ticket() {
        let mut builder = ReportBuilder::new(10);
        builder.set_filters(ReportFilters {
            doctor_id: Id::new(1),
            ..ReportFilters::default()
        });

        let first = builder.begin(ReportMode::ByDoctor).unwrap();
        assert!(builder.finish(first, Ok(ReportResult::Appointments(Vec::new()))));
        assert!(builder.result().is_some());

        let slow = builder.begin(ReportMode::Attendance(AttendanceView::Stats)).unwrap();
        assert!(builder.result().is_none());
        let fast = builder.begin(ReportMode::ByDoctor).unwrap();

        assert!(builder.finish(fast, Ok(ReportResult::Appointments(Vec::new()))));
        assert!(!builder.finish(
            slow,
            Ok(ReportResult::Attendance(AttendanceSummary::Totals(BTreeMap::new())))
        ));
        assert_eq!(builder.result(), Some(&ReportResult::Appointments(Vec::new())));
        assert_eq!(builder.mode(), Some(ReportMode::ByDoctor));
    }

    #[test]
    fn pagination_resets_on_filter_change() {
        let mut builder = ReportBuilder::new(10);
        builder.set_filters(ReportFilters {
            start_date: date(1),
            end_date: date(31),
            ..ReportFilters::default()
        });
        let ticket = builder.begin(ReportMode::PatientsAttended).unwrap();
        builder.finish(
            ticket,
            Ok(ReportResult::Patients(PatientPage {
                data: Vec::new(),
                current_page: 1,
                total_pages: 4,
            })),
        );
        let ticket = builder.begin_page(3).unwrap();
        builder.finish(
            ticket,
            Ok(ReportResult::Patients(PatientPage {
                data: Vec::new(),
                current_page: 3,
                total_pages: 4,
            })),
        );
        assert_eq!(builder.pagination().unwrap().current_page, 3);

        builder.set_filters(ReportFilters {
            start_date: date(2),
            end_date: date(31),
            ..ReportFilters::default()
        });
        assert_eq!(builder.pagination(), Some(Pagination::default()));
        assert!(builder.begin_page(3).is_err());
    }

    #[test]
    fn paging_is_only_for_the_paginated_mode() {
        let mut builder = ReportBuilder::new(10);
        let ticket = builder.begin(ReportMode::Attendance(AttendanceView::Chart)).unwrap();
        builder.finish(
            ticket,
            Ok(ReportResult::Attendance(AttendanceSummary::Chart {
                chart_image: "data:image/png;base64,AAAA".into(),
            })),
        );
        assert_eq!(builder.pagination(), None);
        assert!(builder.begin_page(2).is_err());
    }

    #[test]
    fn attendance_summary_decodes_both_shapes() {
        let chart: AttendanceSummary =
            serde_json::from_str(r#"{"chart_image": "data:image/png;base64,iVBORw0"}"#).unwrap();
        assert_eq!(chart.chart_base64(), Some("iVBORw0"));

        let totals: AttendanceSummary =
            serde_json::from_str(r#"{"COMPLETED": 4, "NO_SHOW": 1}"#).unwrap();
        assert!(matches!(totals, AttendanceSummary::Totals(ref t) if t["COMPLETED"] == 4));
    }
}
