use bridge_traits::error::BridgeError;
use bridge_traits::http::HttpResponse;
use core_session::SessionError;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Transport failure: {0}")]
    Transport(#[from] BridgeError),

    /// The backend answered with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Builds a status error from a non-success response, pulling the
    /// backend's `message` field when one is present.
    pub fn from_response(response: &HttpResponse) -> Self {
        let message = response
            .json::<Value>()
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "no error details provided".to_string());

        ApiError::Status {
            status: response.status,
            message,
        }
    }

    /// HTTP status carried by this error, when one applies.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::HashMap;

    #[test]
    fn test_from_response_extracts_message() {
        let response = HttpResponse {
            status: 404,
            headers: HashMap::new(),
            body: Bytes::from(r#"{"message": "Transport item not found"}"#),
        };
        let err = ApiError::from_response(&response);
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Transport item not found"));
    }

    #[test]
    fn test_from_response_without_body() {
        let response = HttpResponse {
            status: 500,
            headers: HashMap::new(),
            body: Bytes::new(),
        };
        let err = ApiError::from_response(&response);
        assert_eq!(err.status(), Some(500));
    }
}
