use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdprobeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid seller id {0}: must be within 111111..=999999")]
    InvalidSellerId(i64),

    #[error("Check failed: {0}")]
    Check(String),
}

pub type Result<T> = std::result::Result<T, AdprobeError>;

impl AdprobeError {
    /// HTTP status carried by a [`AdprobeError::Status`] error.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            AdprobeError::Status { status, .. } => StatusCode::from_u16(*status).ok(),
            _ => None,
        }
    }

    /// Transport and decode failures come from the wire; everything else is
    /// either a service answer or a local problem.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AdprobeError::Transport { .. } | AdprobeError::Decode { .. }
        )
    }

    pub(crate) fn check(message: impl Into<String>) -> Self {
        AdprobeError::Check(message.into())
    }
}

impl From<serde_json::Error> for AdprobeError {
    fn from(e: serde_json::Error) -> Self {
        AdprobeError::Decode {
            url: "<local>".to_string(),
            message: e.to_string(),
        }
    }
}
