use std::time::Duration;

use campus_common::{CampusError, Toast};

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("not connected to the relay")]
    NotConnected,

    #[error("connection lost before acknowledgement")]
    Disconnected,

    #[error("{event} was not acknowledged within {after:?}")]
    Timeout { event: &'static str, after: Duration },

    /// The relay acknowledged with an `error` field. Displays the message verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl RealtimeError {
    /// Error toast for a failed user action, titled by the caller.
    pub fn to_toast(&self, title: impl Into<String>) -> Toast {
        Toast::error(title, self.to_string())
    }
}

impl From<RealtimeError> for CampusError {
    fn from(err: RealtimeError) -> Self {
        match err {
            RealtimeError::Http(e) => CampusError::Network(e.to_string()),
            other => CampusError::Realtime(other.to_string()),
        }
    }
}
