//! Config validation with field paths in every message.

use crate::schema::ClientConfig;
use thiserror::Error;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

pub fn validate(config: &ClientConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    let url = config.api_base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        report.error("apiBaseUrl", format!("must be an http(s) URL, got \"{url}\""));
    } else if url.ends_with("/api") || url.ends_with("/api/") {
        report.warn("apiBaseUrl", "should not include the /api suffix; paths already carry it");
    }

    if config.request_timeout_secs == 0 {
        report.error("requestTimeoutSecs", "must be greater than zero");
    } else if config.request_timeout_secs > 120 {
        report.warn("requestTimeoutSecs", "over two minutes; the CLI will look hung on failures");
    }

    if config.notification_limit == 0 {
        report.error("notificationLimit", "must be greater than zero");
    }

    let scope = &config.session_scope;
    if scope.trim().is_empty() {
        report.error("sessionScope", "cannot be empty");
    } else if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        report.warn("sessionScope", "contains characters that will be replaced with '_'");
    }

    let level = config.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) && !level.contains('=') {
        report.warn("logLevel", format!("\"{}\" is not a known level or filter directive", config.log_level));
    }

    report
}
