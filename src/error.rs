/// Error types for the console.
///
/// `ApiError` is what every gateway call can fail with; `ConsoleError` covers
/// start-up concerns (configuration, client construction, terminal I/O).

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Shown when the backend could not be reached at all.
pub const CONNECTION_ERROR: &str = "Error de conexión con el servidor.";

/// Structured detail the backend attaches to a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// `{"detail": "..."}`
    Message(String),
    /// `{"detail": [{"msg": ...}, ...]}` or a bare array of messages.
    Items(Vec<String>),
    /// `{"details": {"field": ["..."]}}`
    Fields(BTreeMap<String, Vec<String>>),
    Empty,
}

impl ErrorDetail {
    pub fn from_body(body: &str) -> Self {
        let body = body.trim();
        if body.is_empty() {
            return ErrorDetail::Empty;
        }
        match serde_json::from_str::<Value>(body) {
            Ok(value) => ErrorDetail::from_value(&value),
            Err(_) => ErrorDetail::Empty,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        if let Some(fields) = value.get("details").and_then(Value::as_object) {
            return ErrorDetail::Fields(field_map(fields));
        }
        match value.get("detail") {
            Some(Value::String(message)) if !message.trim().is_empty() => {
                return ErrorDetail::Message(message.clone());
            }
            Some(Value::Array(items)) => return ErrorDetail::Items(item_messages(items)),
            Some(Value::Object(fields)) => return ErrorDetail::Fields(field_map(fields)),
            _ => {}
        }
        if let Value::Array(items) = value {
            return ErrorDetail::Items(item_messages(items));
        }
        ErrorDetail::Empty
    }

    /// Text to show the user, if the backend gave any.
    pub fn message(&self) -> Option<String> {
        match self {
            ErrorDetail::Message(message) => Some(message.clone()),
            ErrorDetail::Items(items) if !items.is_empty() => Some(items.join(", ")),
            ErrorDetail::Fields(fields) if !fields.is_empty() => {
                let messages: Vec<&str> = fields.values().flatten().map(String::as_str).collect();
                Some(format!("Errores de validación: {}", messages.join(", ")))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{}", message),
            None => write!(f, "no detail"),
        }
    }
}

fn item_messages(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            other => other
                .get("msg")
                .or_else(|| other.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .collect()
}

fn field_map(fields: &serde_json::Map<String, Value>) -> BTreeMap<String, Vec<String>> {
    fields
        .iter()
        .map(|(field, value)| {
            let messages = match value {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => item_messages(items),
                other => vec![other.to_string()],
            };
            (field.clone(), messages)
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: ErrorDetail },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{resource} does not support {operation}")]
    Unsupported {
        resource: &'static str,
        operation: &'static str,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message for the screen that issued the call.
    ///
    /// Backend detail is passed through verbatim; `fallback` is used when the
    /// backend gave none.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Connection(_) => CONNECTION_ERROR.to_string(),
            ApiError::Status { detail, .. } => {
                detail.message().unwrap_or_else(|| fallback.to_string())
            }
            ApiError::Decode(_) | ApiError::Unsupported { .. } => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Connection(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_passed_through() {
        let detail = ErrorDetail::from_body(r#"{"detail": "El médico ya tiene un turno en ese horario"}"#);
        assert_eq!(
            detail.message().as_deref(),
            Some("El médico ya tiene un turno en ese horario")
        );
    }

    #[test]
    fn fastapi_validation_items_are_joined() {
        let detail = ErrorDetail::from_body(
            r#"{"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"},
                           {"loc": ["body", "phone"], "msg": "field required", "type": "missing"}]}"#,
        );
        assert_eq!(
            detail.message().as_deref(),
            Some("value is not a valid email address, field required")
        );
    }

    #[test]
    fn nested_field_map_is_flattened() {
        let detail = ErrorDetail::from_body(
            r#"{"details": {"end_at": ["must be after start_at"], "notes": "too long"}}"#,
        );
        assert_eq!(
            detail.message().as_deref(),
            Some("Errores de validación: must be after start_at, too long")
        );
    }

    #[test]
    fn missing_or_foreign_body_uses_fallback() {
        for body in ["", "<html>Bad Gateway</html>", r#"{"error": 1}"#] {
            let err = ApiError::Status {
                status: 502,
                detail: ErrorDetail::from_body(body),
            };
            assert_eq!(err.user_message("Error al guardar"), "Error al guardar");
        }
    }

    #[test]
    fn connection_failures_get_generic_message() {
        let err = ApiError::Connection("tcp connect refused".into());
        assert_eq!(err.user_message("Error al guardar"), CONNECTION_ERROR);
        assert!(!err.is_not_found());
    }
}
