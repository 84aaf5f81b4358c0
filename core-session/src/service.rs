//! Session Service
//!
//! Drives the session lifecycle against the backend: login, refresh,
//! logout. All failures on the authentication path are translated through
//! the [classifier](crate::classify) before they reach the caller; exactly
//! one notification is emitted per classified failure.
//!
//! Refresh failures always force logout: an unrefreshable session is
//! treated as no session.

use crate::classify::{classify, ClassifiedError, ErrorKind};
use crate::error::{Result, SessionError};
use crate::store::SessionStore;
use crate::types::{access_token_from_refresh_body, Credentials, LoginResponse, Session};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, NotificationEvent, SessionEvent, Severity};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Session lifecycle service.
///
/// Cheap to clone; clones share the same store and event bus.
#[derive(Clone)]
pub struct SessionService {
    http: Arc<dyn HttpClient>,
    store: SessionStore,
    events: EventBus,
    login_url: String,
    refresh_url: String,
    http_timeout: Duration,
}

impl SessionService {
    /// Creates a new session service.
    ///
    /// Endpoint URLs are resolved against the configured base URL up
    /// front so a malformed configuration fails here, not on first use.
    pub fn new(
        http: Arc<dyn HttpClient>,
        store: SessionStore,
        events: EventBus,
        config: &CoreConfig,
    ) -> Result<Self> {
        let login_url = config
            .endpoint_url(&config.endpoints.login)
            .map_err(|e| SessionError::Config(e.to_string()))?;
        let refresh_url = config
            .endpoint_url(&config.endpoints.refresh_token)
            .map_err(|e| SessionError::Config(e.to_string()))?;

        Ok(Self {
            http,
            store,
            events,
            login_url: login_url.into(),
            refresh_url: refresh_url.into(),
            http_timeout: config.http_timeout,
        })
    }

    /// The underlying session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Authenticates with email and password.
    ///
    /// On success the session is persisted and `SignedIn` is emitted. On
    /// failure the error passes through the classifier and exactly one
    /// notification of the corresponding severity is emitted.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: Credentials) -> Result<Session> {
        info!("Logging in");

        let request = HttpRequest::new(HttpMethod::Post, &self.login_url)
            .json(&credentials)
            .map_err(|e| SessionError::SerializationFailed(e.to_string()))?
            .timeout(self.http_timeout);

        let response = match self
            .http
            .execute_with_retry(request, RetryPolicy::no_retry())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Login request failed before a status was received");
                return Err(self.raise_classified(classify(0, &Value::Null)));
            }
        };

        if !response.is_success() {
            let body = response.json::<Value>().unwrap_or(Value::Null);
            let classified = classify(response.status, &body);
            warn!(
                status = response.status,
                kind = %classified.kind,
                "Login rejected"
            );
            return Err(self.raise_classified(classified));
        }

        let parsed: LoginResponse = response
            .json()
            .map_err(|e| SessionError::UnexpectedResponse(e.to_string()))?;

        let session = Session {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            user: parsed.user,
        };

        self.store.set_session(session.clone()).await?;

        let email = session
            .user_email()
            .unwrap_or(&credentials.email)
            .to_string();
        self.emit(SessionEvent::SignedIn { email });
        info!("Login succeeded");

        Ok(session)
    }

    /// Exchanges the persisted refresh token for a new access token.
    ///
    /// Fails immediately with [`SessionError::NoRefreshToken`] when no
    /// refresh token is persisted (no network call). Any failure after
    /// that clears the session before the error is raised (fail closed).
    ///
    /// Returns the new access token on success.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<String> {
        let Some(refresh_token) = self.store.refresh_token().await? else {
            debug!("Refresh requested without a persisted refresh token");
            return Err(SessionError::NoRefreshToken);
        };

        self.emit(SessionEvent::TokenRefreshing);
        info!("Refreshing access token");

        let request = HttpRequest::new(HttpMethod::Post, &self.refresh_url)
            .json(&json!({ "refreshToken": refresh_token }))
            .map_err(|e| SessionError::SerializationFailed(e.to_string()))?
            .timeout(self.http_timeout);

        let response = match self
            .http
            .execute_with_retry(request, RetryPolicy::no_retry())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Refresh request failed before a status was received");
                self.expire_session("refresh request failed").await;
                return Err(self.raise_classified(classify(0, &Value::Null)));
            }
        };

        if !response.is_success() {
            let body = response.json::<Value>().unwrap_or(Value::Null);
            let classified = classify(response.status, &body);
            warn!(
                status = response.status,
                kind = %classified.kind,
                "Refresh rejected"
            );
            self.expire_session("refresh rejected by server").await;
            return Err(self.raise_classified(classified));
        }

        let body = response.json::<Value>().unwrap_or(Value::Null);
        let Some(access_token) = access_token_from_refresh_body(&body) else {
            warn!("Refresh response carried no access token");
            self.expire_session("refresh response unusable").await;
            return Err(SessionError::UnexpectedResponse(
                "refresh response carried no access token".to_string(),
            ));
        };

        self.store.update_access_token(&access_token).await?;
        self.emit(SessionEvent::TokenRefreshed);
        info!("Access token refreshed");

        Ok(access_token)
    }

    /// Clears the session unconditionally. No network call.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await?;
        self.emit(SessionEvent::SignedOut);
        info!("Logged out");
        Ok(())
    }

    /// True iff an access token is persisted (structural check only).
    pub async fn is_authenticated(&self) -> Result<bool> {
        self.store.is_authenticated().await
    }

    /// Clears the session for a reason other than an explicit logout.
    ///
    /// Storage failure here is logged and swallowed: fail-closed must not
    /// be interrupted by a broken keychain.
    async fn expire_session(&self, reason: &str) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear session while expiring it");
        }
        self.emit(SessionEvent::SessionExpired {
            reason: reason.to_string(),
        });
    }

    fn raise_classified(&self, classified: ClassifiedError) -> SessionError {
        self.events.notify(NotificationEvent {
            severity: severity_for(classified.kind),
            message: classified.message.clone(),
        });
        SessionError::Classified(classified)
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.emit(CoreEvent::Session(event));
    }
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("login_url", &self.login_url)
            .field("refresh_url", &self.refresh_url)
            .finish()
    }
}

fn severity_for(kind: ErrorKind) -> Severity {
    match kind {
        ErrorKind::Validation => Severity::Warning,
        _ => Severity::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use bridge_traits::http::HttpResponse;
    use bridge_traits::storage::SecretStore;
    use bytes::Bytes;
    use core_runtime::config::StorageKeys;
    use std::collections::{HashMap, VecDeque};
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MemoryStore {
        values: Arc<Mutex<HashMap<String, String>>>,
    }

    #[async_trait]
    impl SecretStore for MemoryStore {
        async fn set(&self, key: &str, value: &str) -> bridge_traits::error::Result<()> {
            self.values
                .lock()
                .await
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get(&self, key: &str) -> bridge_traits::error::Result<Option<String>> {
            Ok(self.values.lock().await.get(key).cloned())
        }

        async fn delete(&self, key: &str) -> bridge_traits::error::Result<()> {
            self.values.lock().await.remove(key);
            Ok(())
        }
    }

    /// Scripted HTTP client; pops one queued outcome per request.
    #[derive(Default)]
    struct ScriptedHttpClient {
        responses: Mutex<VecDeque<bridge_traits::error::Result<HttpResponse>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        async fn push_response(&self, status: u16, body: Value) {
            self.responses.lock().await.push_back(Ok(HttpResponse {
                status,
                headers: HashMap::new(),
                body: Bytes::from(serde_json::to_vec(&body).unwrap()),
            }));
        }

        async fn push_transport_error(&self) {
            self.responses
                .lock()
                .await
                .push_back(Err(BridgeError::ConnectionFailed("refused".to_string())));
        }

        async fn request_count(&self) -> usize {
            self.requests.lock().await.len()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedHttpClient {
        async fn execute(
            &self,
            request: HttpRequest,
        ) -> bridge_traits::error::Result<HttpResponse> {
            self.requests.lock().await.push(request);
            self.responses
                .lock()
                .await
                .pop_front()
                .expect("no scripted response left")
        }
    }

    struct Fixture {
        http: Arc<ScriptedHttpClient>,
        storage: MemoryStore,
        service: SessionService,
        events: EventBus,
    }

    async fn fixture() -> Fixture {
        let http = Arc::new(ScriptedHttpClient::default());
        let storage = MemoryStore::default();
        let store = SessionStore::open(Arc::new(storage.clone()), StorageKeys::default())
            .await
            .unwrap();
        let events = EventBus::new(32);
        let config = CoreConfig::builder()
            .api_base_url("https://api.rmobility.example/api/v1")
            .build()
            .unwrap();
        let service =
            SessionService::new(http.clone(), store, events.clone(), &config).unwrap();
        Fixture {
            http,
            storage,
            service,
            events,
        }
    }

    fn login_body() -> Value {
        json!({
            "access_token": "access_1",
            "refresh_token": "refresh_1",
            "user": {"id": 1, "email": "admin@rmobility.example"}
        })
    }

    async fn drain_notifications(
        rx: &mut core_runtime::events::Receiver<CoreEvent>,
    ) -> Vec<NotificationEvent> {
        let mut notifications = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let CoreEvent::Notification(n) = event {
                notifications.push(n);
            }
        }
        notifications
    }

    #[tokio::test]
    async fn test_login_success_stores_session_and_emits_signed_in() {
        let fx = fixture().await;
        let mut rx = fx.events.subscribe();
        fx.http.push_response(200, login_body()).await;

        let session = fx
            .service
            .login(Credentials::new("admin@rmobility.example", "pw"))
            .await
            .unwrap();

        assert_eq!(session.access_token, "access_1");
        assert!(fx.service.is_authenticated().await.unwrap());
        assert_eq!(
            fx.storage.get("refresh_token").await.unwrap(),
            Some("refresh_1".to_string())
        );

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            CoreEvent::Session(SessionEvent::SignedIn {
                email: "admin@rmobility.example".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_login_rejection_is_classified_with_one_notification() {
        let fx = fixture().await;
        let mut rx = fx.events.subscribe();
        fx.http
            .push_response(401, json!({"message": "Invalid credentials"}))
            .await;

        let err = fx
            .service
            .login(Credentials::new("admin@rmobility.example", "wrong"))
            .await
            .unwrap_err();

        let classified = err.classified().expect("should be classified");
        assert_eq!(classified.kind, ErrorKind::Credentials);
        assert_eq!(
            classified.message,
            crate::classify::GENERIC_CREDENTIALS_MESSAGE
        );

        let notifications = drain_notifications(&mut rx).await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].severity, Severity::Error);
        assert!(!fx.service.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_login_transport_failure_is_network() {
        let fx = fixture().await;
        fx.http.push_transport_error().await;

        let err = fx
            .service
            .login(Credentials::new("a@b.c", "pw"))
            .await
            .unwrap_err();

        assert_eq!(err.classified().unwrap().kind, ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_refresh_without_token_makes_no_network_call() {
        let fx = fixture().await;

        let err = fx.service.refresh().await.unwrap_err();

        assert!(matches!(err, SessionError::NoRefreshToken));
        assert_eq!(fx.http.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_success_updates_only_access_token() {
        let fx = fixture().await;
        fx.http.push_response(200, login_body()).await;
        fx.service
            .login(Credentials::new("admin@rmobility.example", "pw"))
            .await
            .unwrap();

        fx.http
            .push_response(200, json!({"access_token": "access_2"}))
            .await;

        let token = fx.service.refresh().await.unwrap();

        assert_eq!(token, "access_2");
        assert_eq!(
            fx.storage.get("access_token").await.unwrap(),
            Some("access_2".to_string())
        );
        assert_eq!(
            fx.storage.get("refresh_token").await.unwrap(),
            Some("refresh_1".to_string())
        );
    }

    #[tokio::test]
    async fn test_refresh_tolerates_camel_case_spelling() {
        let fx = fixture().await;
        fx.http.push_response(200, login_body()).await;
        fx.service
            .login(Credentials::new("admin@rmobility.example", "pw"))
            .await
            .unwrap();

        fx.http
            .push_response(200, json!({"accessToken": "access_camel"}))
            .await;

        assert_eq!(fx.service.refresh().await.unwrap(), "access_camel");
    }

    #[tokio::test]
    async fn test_refresh_rejection_clears_session() {
        let fx = fixture().await;
        fx.http.push_response(200, login_body()).await;
        fx.service
            .login(Credentials::new("admin@rmobility.example", "pw"))
            .await
            .unwrap();

        fx.http
            .push_response(401, json!({"message": "token expired"}))
            .await;

        let err = fx.service.refresh().await.unwrap_err();

        assert!(err.classified().is_some());
        assert!(!fx.service.is_authenticated().await.unwrap());
        assert!(fx.storage.get("current_user").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_transport_failure_clears_session() {
        let fx = fixture().await;
        fx.http.push_response(200, login_body()).await;
        fx.service
            .login(Credentials::new("admin@rmobility.example", "pw"))
            .await
            .unwrap();

        fx.http.push_transport_error().await;

        let err = fx.service.refresh().await.unwrap_err();

        assert_eq!(err.classified().unwrap().kind, ErrorKind::Network);
        assert!(!fx.service.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_refresh_with_unusable_success_body_clears_session() {
        let fx = fixture().await;
        fx.http.push_response(200, login_body()).await;
        fx.service
            .login(Credentials::new("admin@rmobility.example", "pw"))
            .await
            .unwrap();

        fx.http.push_response(200, json!({"ok": true})).await;

        let err = fx.service.refresh().await.unwrap_err();

        assert!(matches!(err, SessionError::UnexpectedResponse(_)));
        assert!(!fx.service.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_clears_and_emits_signed_out() {
        let fx = fixture().await;
        fx.http.push_response(200, login_body()).await;
        fx.service
            .login(Credentials::new("admin@rmobility.example", "pw"))
            .await
            .unwrap();

        let mut rx = fx.events.subscribe();
        fx.service.logout().await.unwrap();

        assert!(!fx.service.is_authenticated().await.unwrap());
        assert_eq!(
            rx.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SignedOut)
        );
        assert_eq!(fx.http.request_count().await, 1);
    }
}
