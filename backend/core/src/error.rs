use thiserror::Error;

/// Top-level error type for the taskflow client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any request was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backend refused the caller's role or division.
    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Timeout, refused connection or other transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Any other failure reported by the backend. The message is passed through.
    #[error("{0}")]
    Application(String),

    /// A subscriber failed while an event was being delivered.
    #[error("subscriber for \"{event}\" failed: {source}")]
    Subscriber {
        event: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Maps an HTTP status and message onto the error taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => ClientError::Authorization(message),
            404 => ClientError::NotFound(message),
            408 | 504 => ClientError::Network(message),
            _ => ClientError::Application(message),
        }
    }

    /// True for failures the caller may reasonably surface as "try again later".
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
