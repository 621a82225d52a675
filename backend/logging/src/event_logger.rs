//! Session Event Logger
//!
//! Structured session lifecycle records (login, logout, reload) written
//! through `tracing` under the `session_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    LoggedIn {
        user_id: Option<String>,
        email: Option<String>,
        division: Option<String>,
    },
    LoggedOut,
    Restored {
        user_id: Option<String>,
    },
    /// A reload found no usable session.
    Rejected {
        reason: String,
    },
}

#[derive(Debug, Serialize)]
pub struct SessionEventEntry {
    pub scope: String,
    pub timestamp: DateTime<Utc>,
    pub event: SessionEvent,
}

pub struct SessionEventLogger;

impl SessionEventLogger {
    /// Logs a session transition with personal data redacted.
    pub fn log_event(scope: &str, mut event: SessionEvent) {
        if let SessionEvent::LoggedIn { email: Some(email), .. } = &mut event {
            *email = redact_sensitive_data(email);
        }

        let entry = SessionEventEntry {
            scope: scope.into(),
            timestamp: Utc::now(),
            event,
        };

        info!(target: "session_events", event = ?entry, "Session event");
    }
}
