use serde::{Deserialize, Serialize};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A serializable error for client rendering.
///
/// Every variant survives a round trip through a server function, so the
/// client can tell a backend outage apart from an expired session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    /// The backend could not be reached at all.
    #[error("could not reach the backend: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("backend responded with {status}: {message}")]
    Http { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// Bad credentials, or a missing/invalid session.
    #[error("Invalid credentials")]
    Auth,

    #[error("could not copy to clipboard: {0}")]
    Clipboard(String),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn internal(error: impl std::fmt::Display) -> Self {
        Self::Internal(error.to_string())
    }

    /// The HTTP status this error is reported with when it leaves the server.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Network(_) | Error::Http { .. } => 502,
            Error::NotFound(_) => 404,
            Error::Auth => 401,
            Error::Clipboard(_) | Error::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(error)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(error: base64::DecodeError) -> Self {
        Self::internal(error)
    }
}

impl From<jiff::Error> for Error {
    fn from(error: jiff::Error) -> Self {
        Self::internal(error)
    }
}

/// Build an [`Error::Internal`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::Internal(format!($($arg)*))
    };
}
