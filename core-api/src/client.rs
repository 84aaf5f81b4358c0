//! Authenticated HTTP Client
//!
//! Wraps the transport client with the session concerns every API call
//! shares: bearer attachment, and the single-flight refresh dance on 401.
//!
//! ## Refresh coordination
//!
//! At most one token refresh runs at a time. The first request to observe
//! a 401 becomes the leader: it marks the refresh in flight, resets the
//! outcome slot to pending, and calls the session service. Requests that
//! 401 while a refresh is in flight become followers: they park on the
//! outcome slot and never trigger a second refresh. When the refresh
//! resolves, every parked request replays itself exactly once with the new
//! token — or surfaces its original 401 if the refresh failed. No ordering
//! among the followers is guaranteed.
//!
//! A 401 from one of the session-establishing endpoints (login, register,
//! refresh-token, verify-phone, upload-verification) passes through
//! untouched; refreshing there would loop.
//!
//! Non-2xx statuses are returned as `Ok(HttpResponse)`; only transport and
//! storage failures are `Err`. Resource layers turn statuses into
//! [`ApiError::Status`](crate::error::ApiError).

use crate::error::{ApiError, Result};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, NotificationEvent, SessionEvent};
use core_session::{SessionService, SessionStore};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

/// Message shown when the session can no longer be repaired.
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Outcome slot for the in-flight refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RefreshOutcome {
    /// No refresh has run yet this cycle.
    Idle,
    /// A refresh is in flight; wait for the next value.
    Pending,
    /// The refresh succeeded; replay with this token.
    Refreshed(String),
    /// The refresh failed; surface the original error.
    Failed,
}

struct RefreshGate {
    in_flight: Mutex<bool>,
    outcome: watch::Sender<RefreshOutcome>,
}

impl RefreshGate {
    fn new() -> Self {
        let (outcome, _) = watch::channel(RefreshOutcome::Idle);
        Self {
            in_flight: Mutex::new(false),
            outcome,
        }
    }
}

/// HTTP client with session handling.
///
/// Cheap to clone; all clones share the refresh gate, so the single-flight
/// invariant holds across them.
#[derive(Clone)]
pub struct AuthClient {
    http: Arc<dyn HttpClient>,
    session: SessionService,
    events: EventBus,
    config: CoreConfig,
    gate: Arc<RefreshGate>,
}

impl AuthClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        session: SessionService,
        events: EventBus,
        config: CoreConfig,
    ) -> Self {
        Self {
            http,
            session,
            events,
            config,
            gate: Arc::new(RefreshGate::new()),
        }
    }

    /// The session service this client refreshes through.
    pub fn session(&self) -> &SessionService {
        &self.session
    }

    fn store(&self) -> &SessionStore {
        self.session.store()
    }

    /// The configuration this client resolves endpoints against.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Executes a request with bearer attachment and 401 handling.
    ///
    /// Every status is returned as `Ok`; callers inspect
    /// [`HttpResponse::is_success`] or go through the typed resource
    /// layers. `Err` means the request could not complete at all.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.attach_bearer(request).await?;

        let response = self.http.execute(request.clone()).await?;

        if response.status != 401 {
            return Ok(response);
        }

        if self.config.is_refresh_exempt(&request.url) {
            debug!("401 from refresh-exempt endpoint, passing through");
            return Ok(response);
        }

        self.handle_unauthorized(request, response).await
    }

    async fn attach_bearer(&self, request: HttpRequest) -> Result<HttpRequest> {
        match self.store().access_token().await? {
            Some(token) => Ok(request.bearer_token(token)),
            None => Ok(request),
        }
    }

    /// 401 from a protected endpoint: refresh (or wait for the refresh in
    /// flight) and replay, or give up and surface the original response.
    async fn handle_unauthorized(
        &self,
        request: HttpRequest,
        response: HttpResponse,
    ) -> Result<HttpResponse> {
        if self.store().refresh_token().await?.is_none() {
            warn!("401 with no refresh token, forcing logout");
            self.force_logout().await;
            return Ok(response);
        }

        // Decide leader/follower under the lock; the leader resets the
        // outcome slot to Pending in the same critical section so a
        // follower can never observe a stale outcome from a previous
        // cycle.
        let waiter = {
            let mut in_flight = self.gate.in_flight.lock().await;
            if *in_flight {
                Some(self.gate.outcome.subscribe())
            } else {
                *in_flight = true;
                self.gate.outcome.send_replace(RefreshOutcome::Pending);
                None
            }
        };

        match waiter {
            None => self.lead_refresh(request, response).await,
            Some(rx) => self.follow_refresh(rx, request, response).await,
        }
    }

    async fn lead_refresh(
        &self,
        request: HttpRequest,
        response: HttpResponse,
    ) -> Result<HttpResponse> {
        info!("401 received, refreshing session");

        let refreshed = self.session.refresh().await;

        // Publish the outcome before clearing the flag, still under the
        // lock, so late followers either see the flag down (and lead a
        // fresh cycle) or the final outcome.
        let outcome = {
            let mut in_flight = self.gate.in_flight.lock().await;
            let outcome = match &refreshed {
                Ok(token) => RefreshOutcome::Refreshed(token.clone()),
                Err(_) => RefreshOutcome::Failed,
            };
            self.gate.outcome.send_replace(outcome.clone());
            *in_flight = false;
            outcome
        };

        match outcome {
            RefreshOutcome::Refreshed(token) => {
                debug!("Refresh succeeded, replaying request");
                self.replay(request, &token).await
            }
            _ => {
                // Session already cleared and the failure already
                // notified inside refresh(); the caller gets its
                // original 401 back.
                warn!("Refresh failed, surfacing original response");
                Ok(response)
            }
        }
    }

    async fn follow_refresh(
        &self,
        mut rx: watch::Receiver<RefreshOutcome>,
        request: HttpRequest,
        response: HttpResponse,
    ) -> Result<HttpResponse> {
        debug!("401 while refresh in flight, waiting for outcome");

        loop {
            let outcome = rx.borrow_and_update().clone();
            match outcome {
                RefreshOutcome::Refreshed(token) => {
                    debug!("Refresh resolved, replaying request");
                    return self.replay(request, &token).await;
                }
                RefreshOutcome::Failed | RefreshOutcome::Idle => {
                    return Ok(response);
                }
                RefreshOutcome::Pending => {
                    if rx.changed().await.is_err() {
                        return Ok(response);
                    }
                }
            }
        }
    }

    /// Replays the original request exactly once with the refreshed token.
    async fn replay(&self, request: HttpRequest, token: &str) -> Result<HttpResponse> {
        let replay = request.bearer_token(token);
        Ok(self.http.execute(replay).await?)
    }

    async fn force_logout(&self) {
        if let Err(e) = self.store().clear().await {
            warn!(error = %e, "Failed to clear session during forced logout");
        }
        let _ = self.events.emit(CoreEvent::Session(SessionEvent::SessionExpired {
            reason: "unauthorized with no refresh token".to_string(),
        }));
        self.events
            .notify(NotificationEvent::error(SESSION_EXPIRED_MESSAGE));
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("api_base_url", &self.config.api_base_url.as_str())
            .finish()
    }
}

/// Turns a response into parsed JSON, or a status error for non-2xx.
pub(crate) fn expect_json<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    if !response.is_success() {
        return Err(ApiError::from_response(response));
    }
    response.json().map_err(|e| ApiError::Parse(e.to_string()))
}

/// Checks the status of a response with no interesting body.
pub(crate) fn expect_success(response: &HttpResponse) -> Result<()> {
    if !response.is_success() {
        return Err(ApiError::from_response(response));
    }
    Ok(())
}
