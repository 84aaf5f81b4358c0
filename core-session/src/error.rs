use crate::classify::ClassifiedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// No refresh token is persisted; refresh cannot be attempted.
    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Secure storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// The backend replied with a success status but an unusable body.
    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// An authentication call failed; the classification carries the
    /// user-facing message and taxonomy kind.
    #[error("{0}")]
    Classified(ClassifiedError),
}

impl SessionError {
    /// Returns the classification when this error came from a failed
    /// authentication call.
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            SessionError::Classified(c) => Some(c),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
