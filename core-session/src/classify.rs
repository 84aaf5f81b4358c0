//! Error Classification
//!
//! Translates HTTP failures (status code + error body) into the closed
//! taxonomy the console acts on. This is the single point of translation:
//! nothing above this layer ever sees a raw transport error for the login
//! path.
//!
//! The message-extraction chain deliberately tolerates several body shapes
//! (`message`, `error`, `detail`, `description`, bare string) because the
//! backend has shipped all of them at one point or another. This is a
//! compatibility shim; once the error-body schema is versioned it can
//! collapse to a single field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The closed set of error kinds the UI distinguishes.
///
/// - `Credentials`: wrong email/password; the password field is cleared
/// - `Network`: connectivity or gateway failure, user-retryable
/// - `Server`: backend fault, not user-correctable
/// - `Validation`: malformed request, field-correctable
/// - `Account`: suspended/unverified/conflicted/rate-limited
/// - `Unknown`: fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Credentials,
    Network,
    Server,
    Validation,
    Account,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Credentials => "credentials",
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
            ErrorKind::Validation => "validation",
            ErrorKind::Account => "account",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified authentication failure.
///
/// Produced once per failed call; never persisted. `field` names the form
/// field the UI should mark, when one applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub field: Option<String>,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

/// Generic message for credential failures. Recognized backend phrasings
/// are replaced by this wording rather than echoed.
pub const GENERIC_CREDENTIALS_MESSAGE: &str = "Invalid email or password. Please try again.";

pub const NETWORK_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";

pub const GENERIC_VALIDATION_MESSAGE: &str = "Please check the highlighted fields and try again.";

pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";

pub const NOT_FOUND_MESSAGE: &str =
    "The service is currently unavailable. Please try again later.";

pub const CONFLICT_MESSAGE: &str = "An account with these details already exists.";

pub const RATE_LIMIT_MESSAGE: &str = "Too many attempts. Please wait a moment and try again.";

pub const SERVER_MESSAGE: &str = "Something went wrong on our end. Please try again later.";

pub const GENERIC_UNKNOWN_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Classifies an HTTP failure into the error taxonomy.
///
/// `status` 0 means no HTTP status was received (transport failure).
/// The body is the error payload as parsed JSON; pass `Value::Null` when
/// no body is available.
pub fn classify(status: u16, body: &Value) -> ClassifiedError {
    // Connectivity and gateway failures win over everything else.
    if status == 0 || status == 503 || status == 504 {
        return ClassifiedError::new(ErrorKind::Network, NETWORK_MESSAGE);
    }

    let extracted = extract_message(body);

    match status {
        400 | 422 => ClassifiedError::new(
            ErrorKind::Validation,
            extracted.unwrap_or_else(|| GENERIC_VALIDATION_MESSAGE.to_string()),
        ),
        401 => classify_unauthorized(extracted),
        403 => ClassifiedError::new(ErrorKind::Account, FORBIDDEN_MESSAGE),
        404 => ClassifiedError::new(ErrorKind::Server, NOT_FOUND_MESSAGE),
        409 => ClassifiedError::new(ErrorKind::Account, CONFLICT_MESSAGE),
        429 => ClassifiedError::new(ErrorKind::Account, RATE_LIMIT_MESSAGE),
        500 | 502 => ClassifiedError::new(ErrorKind::Server, SERVER_MESSAGE),
        _ => ClassifiedError::new(
            ErrorKind::Unknown,
            extracted.unwrap_or_else(|| GENERIC_UNKNOWN_MESSAGE.to_string()),
        ),
    }
}

fn classify_unauthorized(extracted: Option<String>) -> ClassifiedError {
    let Some(message) = extracted else {
        return ClassifiedError::new(ErrorKind::Credentials, GENERIC_CREDENTIALS_MESSAGE)
            .with_field("password");
    };

    let lower = message.to_lowercase();

    if lower.contains("invalid credentials")
        || lower.contains("account not exists")
        || lower.contains("user not found")
    {
        ClassifiedError::new(ErrorKind::Credentials, GENERIC_CREDENTIALS_MESSAGE)
            .with_field("password")
    } else if lower.contains("account not verified") || lower.contains("account suspended") {
        ClassifiedError::new(ErrorKind::Account, message)
    } else {
        ClassifiedError::new(ErrorKind::Credentials, message).with_field("password")
    }
}

/// Extracts a human-readable message from an error body.
///
/// Checked in order: `message` (first element if it is a list), `error`
/// (recursing into it when it is an object), `detail`, `description`, the
/// whole body if it is a string.
fn extract_message(body: &Value) -> Option<String> {
    match body.get("message") {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(Value::Array(items)) => {
            if let Some(Value::String(s)) = items.first() {
                if !s.is_empty() {
                    return Some(s.clone());
                }
            }
        }
        _ => {}
    }

    match body.get("error") {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(nested @ Value::Object(_)) => {
            if let Some(message) = extract_message(nested) {
                return Some(message);
            }
        }
        _ => {}
    }

    if let Some(Value::String(s)) = body.get("detail") {
        if !s.is_empty() {
            return Some(s.clone());
        }
    }

    if let Some(Value::String(s)) = body.get("description") {
        if !s.is_empty() {
            return Some(s.clone());
        }
    }

    if let Value::String(s) = body {
        if !s.is_empty() {
            return Some(s.clone());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_zero_is_network() {
        let classified = classify(0, &Value::Null);
        assert_eq!(classified.kind, ErrorKind::Network);
        assert_eq!(classified.message, NETWORK_MESSAGE);
        assert!(classified.field.is_none());
    }

    #[test]
    fn test_gateway_statuses_are_network() {
        assert_eq!(classify(503, &Value::Null).kind, ErrorKind::Network);
        assert_eq!(classify(504, &Value::Null).kind, ErrorKind::Network);
    }

    #[test]
    fn test_invalid_credentials_uses_generic_wording() {
        let body = json!({"error": {"message": "Invalid credentials"}});
        let classified = classify(401, &body);
        assert_eq!(classified.kind, ErrorKind::Credentials);
        assert_eq!(classified.message, GENERIC_CREDENTIALS_MESSAGE);
        assert_eq!(classified.field.as_deref(), Some("password"));
    }

    #[test]
    fn test_user_not_found_is_credentials() {
        let body = json!({"message": "User not found"});
        let classified = classify(401, &body);
        assert_eq!(classified.kind, ErrorKind::Credentials);
        assert_eq!(classified.message, GENERIC_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn test_account_suspended_is_account() {
        let body = json!({"message": "Account suspended pending review"});
        let classified = classify(401, &body);
        assert_eq!(classified.kind, ErrorKind::Account);
        assert_eq!(classified.message, "Account suspended pending review");
        assert!(classified.field.is_none());
    }

    #[test]
    fn test_account_not_verified_is_account() {
        let body = json!({"message": "Account not verified"});
        assert_eq!(classify(401, &body).kind, ErrorKind::Account);
    }

    #[test]
    fn test_unrecognized_401_message_echoed_as_credentials() {
        let body = json!({"message": "Session token revoked"});
        let classified = classify(401, &body);
        assert_eq!(classified.kind, ErrorKind::Credentials);
        assert_eq!(classified.message, "Session token revoked");
        assert_eq!(classified.field.as_deref(), Some("password"));
    }

    #[test]
    fn test_401_without_message_is_generic_credentials() {
        let classified = classify(401, &Value::Null);
        assert_eq!(classified.kind, ErrorKind::Credentials);
        assert_eq!(classified.message, GENERIC_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn test_validation_message_list_takes_first() {
        let body = json!({"message": ["field required", "other problem"]});
        let classified = classify(422, &body);
        assert_eq!(classified.kind, ErrorKind::Validation);
        assert_eq!(classified.message, "field required");
    }

    #[test]
    fn test_400_is_validation() {
        let body = json!({"message": "email must be an email"});
        let classified = classify(400, &body);
        assert_eq!(classified.kind, ErrorKind::Validation);
        assert_eq!(classified.message, "email must be an email");
    }

    #[test]
    fn test_rate_limit_wording() {
        let classified = classify(429, &Value::Null);
        assert_eq!(classified.kind, ErrorKind::Account);
        assert_eq!(classified.message, RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn test_server_errors() {
        assert_eq!(classify(500, &Value::Null).kind, ErrorKind::Server);
        assert_eq!(classify(502, &Value::Null).kind, ErrorKind::Server);
        assert_eq!(classify(404, &Value::Null).kind, ErrorKind::Server);
    }

    #[test]
    fn test_403_and_409_are_account() {
        assert_eq!(classify(403, &Value::Null).kind, ErrorKind::Account);
        assert_eq!(classify(409, &Value::Null).kind, ErrorKind::Account);
    }

    #[test]
    fn test_unknown_status_falls_back() {
        let classified = classify(418, &Value::Null);
        assert_eq!(classified.kind, ErrorKind::Unknown);
        assert_eq!(classified.message, GENERIC_UNKNOWN_MESSAGE);
    }

    #[test]
    fn test_extraction_chain_order() {
        assert_eq!(
            extract_message(&json!({"message": "from message", "error": "from error"})),
            Some("from message".to_string())
        );
        assert_eq!(
            extract_message(&json!({"error": "from error", "detail": "from detail"})),
            Some("from error".to_string())
        );
        assert_eq!(
            extract_message(&json!({"detail": "from detail"})),
            Some("from detail".to_string())
        );
        assert_eq!(
            extract_message(&json!({"description": "from description"})),
            Some("from description".to_string())
        );
        assert_eq!(
            extract_message(&json!("bare string body")),
            Some("bare string body".to_string())
        );
        assert_eq!(extract_message(&json!({})), None);
    }

    #[test]
    fn test_extraction_ignores_empty_strings() {
        assert_eq!(
            extract_message(&json!({"message": "", "error": "real message"})),
            Some("real message".to_string())
        );
    }
}
