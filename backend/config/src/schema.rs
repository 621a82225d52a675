//! Client configuration schema.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_SCOPE: &str = "default";
pub const DEFAULT_NOTIFICATION_LIMIT: u32 = 50;

/// Root configuration for the taskflow client.
///
/// Every field has a default, so an empty or missing file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Backend base URL, without the `/api` suffix.
    pub api_base_url: String,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Where session files live. Defaults to `<config dir>/sessions`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<PathBuf>,
    /// Session scope: one per terminal "tab". Sessions never leak across scopes.
    pub session_scope: String,
    pub log_level: String,
    /// Rolling NDJSON log directory. Console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// Page size for notification listings.
    pub notification_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_dir: None,
            session_scope: DEFAULT_SESSION_SCOPE.to_string(),
            log_level: "info".to_string(),
            log_dir: None,
            notification_limit: DEFAULT_NOTIFICATION_LIMIT,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn session_dir_in(&self, config_dir: &Path) -> PathBuf {
        self.session_dir
            .clone()
            .unwrap_or_else(|| config_dir.join("sessions"))
    }
}
