/// Typed gateway to the clinic backend.
///
/// Every backend operation is one method on [`Gateway`], each performing
/// exactly one request through a [`Transport`]. The gateway never retries,
/// caches or deduplicates; callers decide what to do with failures.

use crate::config::ConsoleConfig;
use crate::error::{ApiError, ConsoleError, ErrorDetail};
use crate::models::{
    Appointment, AppointmentPayload, Doctor, DoctorPayload, Id, MedicalRecord,
    MedicalRecordPayload, Patient, PatientPayload, Prescription, PrescriptionPayload, Reminder,
    ReminderPayload, Specialty, SpecialtyPayload, WorkingHour, WorkingHourPayload,
};
use crate::reports::{AttendanceSummary, DateRange, DoctorAppointments, PatientPage, SpecialtyCount};
use crate::status::StatusUpdate;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

/// One HTTP call, relative to the backend base location.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
    pub request_id: Uuid,
}

/// The network seam. Returns the decoded JSON body, or `None` for an empty one.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>, ApiError>;
}

/// `reqwest`-backed transport against a fixed base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ConsoleError::Client)?;

        Ok(HttpTransport {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &url)
            .header("X-Request-ID", request.request_id.to_string());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            warn!(request_id = %request.request_id, %url, "request failed: {}", err);
            ApiError::from(err)
        })?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(None);
            }
            return Ok(Some(serde_json::from_str(&text)?));
        }

        let detail = ErrorDetail::from_body(&text);
        warn!(
            request_id = %request.request_id,
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "backend rejected request: {}",
            detail
        );
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Which collection operations a resource supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub path: &'static str,
    pub fetch_one: bool,
    pub create: bool,
    pub replace: bool,
    pub delete: bool,
}

/// A backend collection with its endpoint table entry.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    type Payload: Serialize + Send + Sync;

    const NAME: &'static str;
    const ENDPOINTS: Endpoints;

    fn id(&self) -> Id;
}

macro_rules! resource {
    ($entity:ty, $payload:ty, $name:literal, $path:literal, get: $get:literal, create: $create:literal, replace: $replace:literal, delete: $delete:literal) => {
        impl Resource for $entity {
            type Payload = $payload;

            const NAME: &'static str = $name;
            const ENDPOINTS: Endpoints = Endpoints {
                path: $path,
                fetch_one: $get,
                create: $create,
                replace: $replace,
                delete: $delete,
            };

            fn id(&self) -> Id {
                self.id
            }
        }
    };
}

resource!(Patient, PatientPayload, "patients", "/patients", get: true, create: true, replace: true, delete: true);
resource!(Doctor, DoctorPayload, "doctors", "/doctors", get: true, create: true, replace: true, delete: true);
resource!(Specialty, SpecialtyPayload, "specialties", "/specialties", get: true, create: true, replace: true, delete: true);
resource!(WorkingHour, WorkingHourPayload, "working hours", "/working-hours", get: false, create: true, replace: true, delete: true);
resource!(Appointment, AppointmentPayload, "appointments", "/appointments", get: true, create: true, replace: false, delete: true);
resource!(MedicalRecord, MedicalRecordPayload, "medical records", "/medical-records", get: true, create: true, replace: true, delete: true);
resource!(Prescription, PrescriptionPayload, "prescriptions", "/prescriptions", get: true, create: true, replace: true, delete: true);
resource!(Reminder, ReminderPayload, "reminders", "/reminders", get: true, create: true, replace: false, delete: false);

fn require<R: Resource>(supported: bool, operation: &'static str) -> Result<(), ApiError> {
    if supported {
        Ok(())
    } else {
        Err(ApiError::Unsupported {
            resource: R::NAME,
            operation,
        })
    }
}

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Gateway { transport }
    }

    /// Gateway over HTTP to the configured backend.
    pub fn connect(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        Ok(Gateway::new(Arc::new(HttpTransport::new(config)?)))
    }

    async fn call(
        &self,
        method: Method,
        path: String,
        query: Vec<(&'static str, String)>,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest {
            method,
            path,
            query,
            body,
            request_id: Uuid::new_v4(),
        };
        debug!(request_id = %request.request_id, method = %request.method, path = %request.path, "sending request");
        self.transport.send(request).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        query: Vec<(&'static str, String)>,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let value = self.call(method, path, query, body).await?;
        Ok(serde_json::from_value(value.unwrap_or(Value::Null))?)
    }

    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
        self.fetch(Method::Get, R::ENDPOINTS.path.to_string(), Vec::new(), None)
            .await
    }

    pub async fn get<R: Resource>(&self, id: Id) -> Result<R, ApiError> {
        require::<R>(R::ENDPOINTS.fetch_one, "fetching one record")?;
        self.fetch(Method::Get, format!("{}/{}", R::ENDPOINTS.path, id), Vec::new(), None)
            .await
    }

    pub async fn create<R: Resource>(&self, payload: &R::Payload) -> Result<R, ApiError> {
        require::<R>(R::ENDPOINTS.create, "create")?;
        let body = serde_json::to_value(payload)?;
        self.fetch(Method::Post, R::ENDPOINTS.path.to_string(), Vec::new(), Some(body))
            .await
    }

    /// Full-record replace (PUT).
    pub async fn replace<R: Resource>(&self, id: Id, payload: &R::Payload) -> Result<R, ApiError> {
        require::<R>(R::ENDPOINTS.replace, "update")?;
        let body = serde_json::to_value(payload)?;
        self.fetch(Method::Put, format!("{}/{}", R::ENDPOINTS.path, id), Vec::new(), Some(body))
            .await
    }

    pub async fn delete<R: Resource>(&self, id: Id) -> Result<(), ApiError> {
        require::<R>(R::ENDPOINTS.delete, "delete")?;
        self.call(Method::Delete, format!("{}/{}", R::ENDPOINTS.path, id), Vec::new(), None)
            .await?;
        Ok(())
    }

    pub async fn working_hours_by_doctor(&self, doctor_id: Id) -> Result<Vec<WorkingHour>, ApiError> {
        self.fetch(Method::Get, format!("/working-hours/doctor/{}", doctor_id), Vec::new(), None)
            .await
    }

    pub async fn medical_records_by_patient(&self, patient_id: Id) -> Result<Vec<MedicalRecord>, ApiError> {
        self.fetch(Method::Get, format!("/medical-records/patient/{}", patient_id), Vec::new(), None)
            .await
    }

    pub async fn prescriptions_by_record(&self, medical_record_id: Id) -> Result<Vec<Prescription>, ApiError> {
        self.fetch(
            Method::Get,
            format!("/prescriptions/medical-record/{}", medical_record_id),
            Vec::new(),
            None,
        )
        .await
    }

    pub async fn appointments_by_doctor(&self, doctor_id: Id) -> Result<Vec<Appointment>, ApiError> {
        self.fetch(Method::Get, format!("/appointments/doctor/{}", doctor_id), Vec::new(), None)
            .await
    }

    pub async fn appointments_by_patient(&self, patient_id: Id) -> Result<Vec<Appointment>, ApiError> {
        self.fetch(Method::Get, format!("/appointments/patient/{}", patient_id), Vec::new(), None)
            .await
    }

    pub async fn reminders_by_appointment(&self, appointment_id: Id) -> Result<Vec<Reminder>, ApiError> {
        self.fetch(Method::Get, format!("/reminders/appointment/{}", appointment_id), Vec::new(), None)
            .await
    }

    /// Partial update of an appointment's status and attendance (PATCH).
    pub async fn update_appointment_status(
        &self,
        appointment_id: Id,
        update: &StatusUpdate,
    ) -> Result<Appointment, ApiError> {
        let body = serde_json::to_value(update)?;
        self.fetch(
            Method::Patch,
            format!("/appointments/{}/status", appointment_id),
            Vec::new(),
            Some(body),
        )
        .await
    }

    pub async fn report_appointments_by_doctor(
        &self,
        doctor_id: Id,
        range: &DateRange,
    ) -> Result<Vec<DoctorAppointments>, ApiError> {
        let mut query = vec![("doctor_id", doctor_id.to_string())];
        query.extend(range.to_query());
        self.fetch(Method::Get, "/reports/appointments-by-doctor".to_string(), query, None)
            .await
    }

    pub async fn report_appointments_by_specialty(
        &self,
        range: &DateRange,
    ) -> Result<Vec<SpecialtyCount>, ApiError> {
        self.fetch(
            Method::Get,
            "/reports/appointments-by-specialty".to_string(),
            range.to_query(),
            None,
        )
        .await
    }

    pub async fn report_attendance_chart(&self, range: &DateRange) -> Result<AttendanceSummary, ApiError> {
        self.fetch(Method::Get, "/reports/attendance-chart".to_string(), range.to_query(), None)
            .await
    }

    pub async fn report_attendance_stats(&self, range: &DateRange) -> Result<AttendanceSummary, ApiError> {
        self.fetch(Method::Get, "/reports/attendance-stats".to_string(), range.to_query(), None)
            .await
    }

    pub async fn report_patients_attended(
        &self,
        range: &DateRange,
        page: u32,
        page_size: u32,
    ) -> Result<PatientPage, ApiError> {
        self.fetch(
            Method::Get,
            "/reports/patients-attended".to_string(),
            paged_query(range, page, page_size),
            None,
        )
        .await
    }

    pub async fn report_patients_by_date_range(
        &self,
        range: &DateRange,
        page: u32,
        page_size: u32,
    ) -> Result<PatientPage, ApiError> {
        self.fetch(
            Method::Get,
            "/reports/patients-by-date-range".to_string(),
            paged_query(range, page, page_size),
            None,
        )
        .await
    }
}

fn paged_query(range: &DateRange, page: u32, page_size: u32) -> Vec<(&'static str, String)> {
    let mut query = range.to_query();
    query.push(("page", page.to_string()));
    query.push(("page_size", page_size.to_string()));
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<ApiRequest>>,
        reply: Mutex<Option<Value>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
            self.requests.lock().unwrap().push(request);
            Ok(self.reply.lock().unwrap().clone())
        }
    }

    fn gateway(reply: Value) -> (Arc<Recorder>, Gateway) {
        let recorder = Arc::new(Recorder::default());
        *recorder.reply.lock().unwrap() = Some(reply);
        (recorder.clone(), Gateway::new(recorder))
    }

    #[tokio::test]
    async fn replace_uses_put_on_member_path() {
        let (recorder, gateway) = gateway(json!({"id": 4, "name": "Cardiología", "description": null}));
        let payload = SpecialtyPayload {
            name: "Cardiología".into(),
            description: None,
        };

        let saved: Specialty = gateway.replace(Id::new(4).unwrap(), &payload).await.unwrap();

        assert_eq!(saved.name, "Cardiología");
        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(requests[0].path, "/specialties/4");
        assert_eq!(requests[0].body, Some(json!({"name": "Cardiología", "description": null})));
    }

    #[tokio::test]
    async fn unsupported_operations_fail_without_a_request() {
        let (recorder, gateway) = gateway(json!({}));
        let id = Id::new(1).unwrap();

        let get = gateway.get::<WorkingHour>(id).await;
        let delete = gateway.delete::<Reminder>(id).await;

        assert!(matches!(get, Err(ApiError::Unsupported { .. })));
        assert!(matches!(delete, Err(ApiError::Unsupported { .. })));
        assert!(recorder.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_update_is_a_patch_with_both_fields() {
        let (recorder, gateway) = gateway(json!({
            "id": 9, "patient_id": 1, "doctor_id": 2,
            "start_at": "2025-03-10T09:00:00", "end_at": "2025-03-10T09:30:00",
            "status": "COMPLETED", "attended": true
        }));
        let update = StatusUpdate::for_transition(AppointmentStatus::Completed, false);

        gateway
            .update_appointment_status(Id::new(9).unwrap(), &update)
            .await
            .unwrap();

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests[0].method, Method::Patch);
        assert_eq!(requests[0].path, "/appointments/9/status");
        assert_eq!(requests[0].body, Some(json!({"status": "COMPLETED", "attended": true})));
    }

    #[tokio::test]
    async fn paginated_report_sends_named_parameters() {
        let (recorder, gateway) = gateway(json!({"data": [], "current_page": 2, "total_pages": 3}));
        let range = DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2025, 1, 1),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 31),
        );

        let page = gateway.report_patients_attended(&range, 2, 10).await.unwrap();

        assert_eq!(page.current_page, 2);
        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests[0].path, "/reports/patients-attended");
        assert_eq!(
            requests[0].query,
            vec![
                ("start_date", "2025-01-01".to_string()),
                ("end_date", "2025-01-31".to_string()),
                ("page", "2".to_string()),
                ("page_size", "10".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn patients_by_date_range_pages_over_its_own_path() {
        let (recorder, gateway) = gateway(json!({
            "data": [{"patient_id": 4, "patient_name": "Ana Gómez", "appointment_count": 3}],
            "current_page": 1,
            "total_pages": 1
        }));
        let range = DateRange::new(chrono::NaiveDate::from_ymd_opt(2025, 2, 1), None);

        let page = gateway.report_patients_by_date_range(&range, 1, 20).await.unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].appointment_count, 3);
        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].path, "/reports/patients-by-date-range");
        assert_eq!(
            requests[0].query,
            vec![
                ("start_date", "2025-02-01".to_string()),
                ("page", "1".to_string()),
                ("page_size", "20".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn lookups_by_parent_use_nested_paths() {
        let (recorder, gateway) = gateway(json!([]));
        let id = Id::new(3).unwrap();

        gateway.appointments_by_doctor(id).await.unwrap();
        gateway.appointments_by_patient(id).await.unwrap();
        gateway.reminders_by_appointment(id).await.unwrap();
        gateway.medical_records_by_patient(id).await.unwrap();

        let paths: Vec<String> = recorder
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.path.clone())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/appointments/doctor/3",
                "/appointments/patient/3",
                "/reminders/appointment/3",
                "/medical-records/patient/3",
            ]
        );
    }

    #[tokio::test]
    async fn empty_body_decodes_as_unit_delete() {
        let recorder = Arc::new(Recorder::default());
        let gateway = Gateway::new(recorder.clone());

        gateway.delete::<Patient>(Id::new(2).unwrap()).await.unwrap();

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests[0].method, Method::Delete);
        assert_eq!(requests[0].path, "/patients/2");
        assert_eq!(requests[0].body, None);
    }
}
