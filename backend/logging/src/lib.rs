//! Structured logging for the taskflow client.
//!
//! Handles log redaction, console plus rolling NDJSON output, and session
//! lifecycle event records.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{SessionEvent, SessionEventEntry, SessionEventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
