use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Login credentials.
///
/// The `Debug` implementation redacts the password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// An authenticated session.
///
/// Owned exclusively by the [`SessionStore`](crate::SessionStore); mutated
/// only through its set/update/clear operations. The user payload is kept
/// as raw JSON because the console only ever forwards it.
///
/// # Security
///
/// Token values are never logged; the `Debug` implementation redacts them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token attached to API requests
    pub access_token: String,
    /// Token exchanged for a new access token on 401
    pub refresh_token: String,
    /// The authenticated user object, as returned by the backend
    pub user: Value,
}

impl Session {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: Value,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user,
        }
    }

    /// Email of the authenticated user, when the backend reported one.
    pub fn user_email(&self) -> Option<&str> {
        self.user.get("email").and_then(Value::as_str)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("user_email", &self.user_email())
            .finish()
    }
}

/// Successful login response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Value,
}

/// Extracts the refreshed access token from a refresh response body.
///
/// The backend has shipped both `access_token` and `accessToken`; both
/// spellings are tolerated, first present wins.
pub(crate) fn access_token_from_refresh_body(body: &Value) -> Option<String> {
    for key in ["access_token", "accessToken"] {
        if let Some(Value::String(token)) = body.get(key) {
            if !token.is_empty() {
                return Some(token.clone());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("admin@rmobility.example", "hunter2");
        let debug_str = format!("{:?}", credentials);
        assert!(debug_str.contains("admin@rmobility.example"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_session_debug_redacts_tokens() {
        let session = Session::new(
            "secret_access",
            "secret_refresh",
            json!({"email": "admin@rmobility.example"}),
        );
        let debug_str = format!("{:?}", session);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret_access"));
        assert!(!debug_str.contains("secret_refresh"));
    }

    #[test]
    fn test_user_email() {
        let session = Session::new("a", "r", json!({"email": "ops@rmobility.example"}));
        assert_eq!(session.user_email(), Some("ops@rmobility.example"));

        let session = Session::new("a", "r", json!({"id": 7}));
        assert_eq!(session.user_email(), None);
    }

    #[test]
    fn test_refresh_body_snake_case() {
        let body = json!({"access_token": "new_token"});
        assert_eq!(
            access_token_from_refresh_body(&body),
            Some("new_token".to_string())
        );
    }

    #[test]
    fn test_refresh_body_camel_case() {
        let body = json!({"accessToken": "new_token"});
        assert_eq!(
            access_token_from_refresh_body(&body),
            Some("new_token".to_string())
        );
    }

    #[test]
    fn test_refresh_body_both_spellings_snake_wins() {
        let body = json!({"access_token": "snake", "accessToken": "camel"});
        assert_eq!(
            access_token_from_refresh_body(&body),
            Some("snake".to_string())
        );
    }

    #[test]
    fn test_refresh_body_missing_token() {
        assert_eq!(access_token_from_refresh_body(&json!({})), None);
        assert_eq!(
            access_token_from_refresh_body(&json!({"access_token": ""})),
            None
        );
    }

    #[test]
    fn test_login_response_parses() {
        let body = json!({
            "access_token": "a",
            "refresh_token": "r",
            "user": {"id": 1, "email": "admin@rmobility.example"}
        });
        let parsed: LoginResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.access_token, "a");
        assert_eq!(parsed.refresh_token, "r");
        assert_eq!(parsed.user["id"], 1);
    }
}
