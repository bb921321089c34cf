//! Error types shared by the gateway, the model layer and the credential store.

use thiserror::Error;

/// Broad category of a failure reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Bad credentials, expired token, or a token that does not own the resource
    Unauthorized,
    /// Unknown story or user
    NotFound,
    /// Malformed or missing fields
    Validation,
    /// Username already taken
    Conflict,
    Other,
}

impl ApiErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            400 | 422 => Self::Validation,
            409 => Self::Conflict,
            _ => Self::Other,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never got a response (DNS, connect, TLS, reset...)
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The HTTP client could not be built (TLS backend, bad settings)
    #[error("could not set up the HTTP client: {0}")]
    Setup(#[source] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("server rejected the request ({status}): {message}")]
    Api {
        status: u16,
        kind: ApiErrorKind,
        message: String,
    },

    /// A successful response whose body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The server answered for a different user than the one who asked
    #[error("server answered for user {actual}, expected {expected}")]
    UnexpectedUser { expected: String, actual: String },

    #[error("you need to be logged in to do that")]
    NotLoggedIn,

    #[error("credential store is unavailable")]
    StoreUnavailable,

    #[error("credential store error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            kind: ApiErrorKind::from_status(status),
            message: message.into(),
        }
    }

    /// The server-side category, if this error came from the server at all.
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
