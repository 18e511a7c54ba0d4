use serde::Deserialize;
use thiserror::Error;

/// Failure of one diagnostic API call, normalized so every flow can show the
/// message inline without knowing about the transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unable to connect to the server. Is the backend running?")]
    Network,
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response from the server: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Timeout => Some(408),
            Self::Network | Self::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }

    /// Builds a server error from a non-success response body, preferring the
    /// backend's `message` and falling back to the reason phrase.
    pub fn from_response_body(status: u16, reason: Option<&str>, body: &str) -> Self {
        let payload = serde_json::from_str::<ErrorPayload>(body).ok();
        let message = payload
            .as_ref()
            .and_then(|payload| payload.message.as_deref())
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .or_else(|| reason.map(str::to_string))
            .unwrap_or_else(|| "An unexpected error occurred".to_string());
        let status = payload
            .and_then(|payload| payload.status)
            .filter(|status| *status != 0)
            .unwrap_or(status);

        Self::Server { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            Self::Server {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("An unexpected error occurred")
                    .to_string(),
            }
        } else {
            Self::Network
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<u16>,
}
