/// Console configuration.
///
/// Values come from built-in defaults overridden by `CLINIC_*` environment
/// variables (a `.env` file is loaded first when present):
///
/// - `CLINIC_BASE_URL`: backend base location
/// - `CLINIC_REQUEST_TIMEOUT_SECS`: optional per-request timeout (none by default)
/// - `CLINIC_REPORT_PAGE_SIZE`: page size for paginated reports
/// - `CLINIC_LOG_FILTER`: tracing filter used when `RUST_LOG` is unset

use crate::error::ConsoleError;
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REPORT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConsoleConfig {
    pub base_url: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    pub report_page_size: u32,
    pub log_filter: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            report_page_size: DEFAULT_REPORT_PAGE_SIZE,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Load `.env` (if any) and the process environment.
    pub fn load() -> Result<Self, ConsoleError> {
        dotenv::dotenv().ok();
        Self::from_environment(Environment::with_prefix("CLINIC").try_parsing(true))
    }

    pub fn from_environment(environment: Environment) -> Result<Self, ConsoleError> {
        let settings = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("report_page_size", DEFAULT_REPORT_PAGE_SIZE as i64)?
            .set_default("log_filter", DEFAULT_LOG_FILTER)?
            .add_source(environment)
            .build()?;

        let config: ConsoleConfig = settings.try_deserialize()?;
        config.validated()
    }

    fn validated(mut self) -> Result<Self, ConsoleError> {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConsoleError::InvalidConfig(format!(
                "base_url must use http or https, got '{}'",
                self.base_url
            )));
        }
        if self.report_page_size == 0 {
            return Err(ConsoleError::InvalidConfig(
                "report_page_size must be positive".to_string(),
            ));
        }
        self.base_url = trimmed;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("CLINIC")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = ConsoleConfig::from_environment(environment(&[])).unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn variables_override_defaults() {
        let config = ConsoleConfig::from_environment(environment(&[
            ("CLINIC_BASE_URL", "https://clinic.example.org/api/"),
            ("CLINIC_REQUEST_TIMEOUT_SECS", "15"),
            ("CLINIC_REPORT_PAGE_SIZE", "25"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://clinic.example.org/api");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.report_page_size, 25);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let result = ConsoleConfig::from_environment(environment(&[(
            "CLINIC_BASE_URL",
            "ftp://clinic.local",
        )]));
        assert!(matches!(result, Err(ConsoleError::InvalidConfig(_))));
    }
}
