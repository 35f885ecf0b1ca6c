use thiserror::Error;

/// Errors returned by the REST client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Non-success status; `message` is the backend's own message when it sent one
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Unrecognized response envelope: {0}")]
    Envelope(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }

    /// The session must be discarded
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

impl From<libris_core::Error> for ApiError {
    fn from(e: libris_core::Error) -> Self {
        match e {
            libris_core::Error::InvalidEnvelope(msg) => ApiError::Envelope(msg),
            libris_core::Error::SerializationError(e) => ApiError::Decode(e.to_string()),
            libris_core::Error::InvalidConfig(msg) => ApiError::Config(msg),
            libris_core::Error::NotAuthenticated => ApiError::Unauthorized,
            other => ApiError::Network(other.to_string()),
        }
    }
}

#[cfg(feature = "browser")]
impl From<gloo_net::Error> for ApiError {
    fn from(e: gloo_net::Error) -> Self {
        match e {
            gloo_net::Error::SerdeError(e) => ApiError::Decode(e.to_string()),
            other => ApiError::Network(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
