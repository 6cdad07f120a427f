#![allow(dead_code)]

use async_trait::async_trait;
use clinic_console::error::{ApiError, ErrorDetail};
use clinic_console::gateway::{ApiRequest, Gateway, Method, Transport};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Empty,
    Status(u16, Value),
    Offline,
}

struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Reply>,
}

/// In-memory backend: canned replies per method and path, every request recorded.
///
/// Replies queued for a route are served in order; the last one repeats.
/// Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(ScriptedTransport::default())
    }

    pub fn gateway(self: &Arc<Self>) -> Gateway {
        Gateway::new(self.clone())
    }

    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        match routes
            .iter_mut()
            .find(|route| route.method == method && route.path == path)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        let reply = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|route| route.method == request.method && route.path == request.path)
                .and_then(|route| {
                    if route.replies.len() > 1 {
                        route.replies.pop_front()
                    } else {
                        route.replies.front().cloned()
                    }
                })
                .unwrap_or(Reply::Status(404, json!({"detail": "Not Found"})))
        };
        self.requests.lock().unwrap().push(request);

        match reply {
            Reply::Json(value) => Ok(Some(value)),
            Reply::Empty => Ok(None),
            Reply::Status(status, body) => Err(ApiError::Status {
                status,
                detail: ErrorDetail::from_value(&body),
            }),
            Reply::Offline => Err(ApiError::Connection("connection refused".to_string())),
        }
    }
}

pub fn patient(id: u64, first_name: &str, last_name: &str) -> Value {
    json!({
        "id": id,
        "first_name": first_name,
        "last_name": last_name,
        "birth_date": "1990-05-17",
        "gender": "Femenino",
        "email": format!("{}@example.com", first_name.to_lowercase()),
        "phone": "555-0101",
        "address": null
    })
}

pub fn doctor(id: u64, first_name: &str, last_name: &str) -> Value {
    json!({
        "id": id,
        "first_name": first_name,
        "last_name": last_name,
        "license_number": format!("MN-{}", id),
        "email": format!("{}@example.com", first_name.to_lowercase()),
        "specialties": []
    })
}

pub fn working_hour(id: u64, doctor_id: u64, weekday: &str, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "doctor_id": doctor_id,
        "weekday": weekday,
        "start_time": start,
        "end_time": end
    })
}

pub fn appointment(id: u64, patient_id: u64, status: &str, attended: bool) -> Value {
    json!({
        "id": id,
        "patient_id": patient_id,
        "doctor_id": 2,
        "start_at": "2025-03-10T09:00:00",
        "end_at": "2025-03-10T09:30:00",
        "status": status,
        "attended": attended,
        "notes": null
    })
}

pub fn medical_record(id: u64, patient_id: u64, summary: &str) -> Value {
    json!({
        "id": id,
        "patient_id": patient_id,
        "doctor_id": null,
        "record_date": "2025-02-01T10:00:00",
        "summary": summary
    })
}

pub fn prescription(id: u64, medical_record_id: u64, medication: &str) -> Value {
    json!({
        "id": id,
        "medical_record_id": medical_record_id,
        "medication": medication,
        "dosage": "1 comprimido",
        "frequency": null,
        "instructions": null
    })
}
