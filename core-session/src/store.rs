//! Secure Session Storage
//!
//! This module provides persistence for the authenticated session using the
//! platform `SecretStore` (Keychain, Credential Manager, Secret Service).
//!
//! ## Security Features
//!
//! - Token values are never logged or exposed in error messages
//! - Storage uses the platform-specific secure store (via `SecretStore`)
//! - Corrupt persisted state is discarded rather than surfaced
//!
//! ## Storage layout
//!
//! The session is persisted under three independent string keys: the access
//! token, the refresh token, and the serialized user object. The three keys
//! are written and cleared together, except for the single-field access
//! token rewrite performed after a refresh.
//!
//! ## Example
//!
//! ```ignore
//! use core_session::SessionStore;
//! use core_runtime::config::StorageKeys;
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecretStore;
//! # async fn example(storage: Arc<dyn SecretStore>) -> core_session::Result<()> {
//! let store = SessionStore::open(storage, StorageKeys::default()).await?;
//!
//! if store.is_authenticated().await? {
//!     println!("session restored");
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SessionError};
use crate::types::Session;
use bridge_traits::storage::SecretStore;
use core_runtime::config::StorageKeys;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Persistent store for the authenticated session.
///
/// Cheap to clone; all clones share the same persisted state and the same
/// published view. Subscribers observe every `set`/`update`/`clear` through
/// a `watch` channel.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    storage: Arc<dyn SecretStore>,
    keys: StorageKeys,
    current: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Opens the store, hydrating a session from the persisted fields.
    ///
    /// If the stored user field cannot be parsed as JSON, all three fields
    /// are deleted and "no session" is published. A corrupt session is
    /// discarded, not surfaced (fail-safe, not fail-loud).
    pub async fn open(storage: Arc<dyn SecretStore>, keys: StorageKeys) -> Result<Self> {
        let access_token = read_field(&storage, &keys.access_token).await?;
        let refresh_token = read_field(&storage, &keys.refresh_token).await?;
        let raw_user = read_field(&storage, &keys.current_user).await?;

        let session = match (access_token, refresh_token, raw_user) {
            (Some(access_token), Some(refresh_token), Some(raw_user)) => {
                match serde_json::from_str::<Value>(&raw_user) {
                    Ok(user) => {
                        info!("Session restored from secure storage");
                        Some(Session {
                            access_token,
                            refresh_token,
                            user,
                        })
                    }
                    Err(e) => {
                        warn!(error = %e, "Persisted user is corrupt, discarding session");
                        clear_fields(&storage, &keys).await?;
                        None
                    }
                }
            }
            (None, None, None) => {
                debug!("No persisted session found");
                None
            }
            _ => {
                // A partial session is as unusable as a corrupt one.
                warn!("Partially persisted session found, discarding");
                clear_fields(&storage, &keys).await?;
                None
            }
        };

        let (current, _) = watch::channel(session);

        Ok(Self {
            inner: Arc::new(StoreInner {
                storage,
                keys,
                current,
            }),
        })
    }

    /// Overwrites all three persisted fields and publishes the new session.
    pub async fn set_session(&self, session: Session) -> Result<()> {
        let inner = &self.inner;

        let raw_user = serde_json::to_string(&session.user)
            .map_err(|e| SessionError::SerializationFailed(e.to_string()))?;

        write_field(&inner.storage, &inner.keys.access_token, &session.access_token).await?;
        write_field(
            &inner.storage,
            &inner.keys.refresh_token,
            &session.refresh_token,
        )
        .await?;
        write_field(&inner.storage, &inner.keys.current_user, &raw_user).await?;

        info!("Session stored securely");
        // send_replace, not send: the cached view must update even with no
        // subscribers.
        inner.current.send_replace(Some(session));

        Ok(())
    }

    /// Last published session, or `None`.
    ///
    /// This is the cached view; it does not touch storage.
    pub fn session(&self) -> Option<Session> {
        self.inner.current.borrow().clone()
    }

    /// Reads the persisted access token directly from storage.
    ///
    /// Bypasses the published cache so that concurrent store instances over
    /// the same backing storage observe each other's writes.
    pub async fn access_token(&self) -> Result<Option<String>> {
        read_field(&self.inner.storage, &self.inner.keys.access_token).await
    }

    /// Reads the persisted refresh token directly from storage.
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        read_field(&self.inner.storage, &self.inner.keys.refresh_token).await
    }

    /// Rewrites only the access-token field and republishes the cached
    /// session with that field replaced.
    ///
    /// The refresh token and user are untouched; no storage write happens
    /// for them.
    pub async fn update_access_token(&self, token: &str) -> Result<()> {
        let inner = &self.inner;

        write_field(&inner.storage, &inner.keys.access_token, token).await?;

        inner.current.send_modify(|session| {
            if let Some(session) = session {
                session.access_token = token.to_string();
            }
        });

        debug!("Access token updated");
        Ok(())
    }

    /// Removes all three fields and publishes "no session".
    ///
    /// Idempotent; succeeds when nothing is persisted.
    pub async fn clear(&self) -> Result<()> {
        clear_fields(&self.inner.storage, &self.inner.keys).await?;
        self.inner.current.send_replace(None);
        info!("Session cleared");
        Ok(())
    }

    /// Subscribes to session changes.
    ///
    /// The receiver immediately holds the current value.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.inner.current.subscribe()
    }

    /// True iff an access token is persisted.
    ///
    /// Structural check only; no expiry introspection.
    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.access_token().await?.is_some())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_session", &self.inner.current.borrow().is_some())
            .finish()
    }
}

async fn read_field(storage: &Arc<dyn SecretStore>, key: &str) -> Result<Option<String>> {
    storage.get(key).await.map_err(|e| {
        warn!(key = key, error = %e, "Failed to read from secure storage");
        SessionError::StorageUnavailable(e.to_string())
    })
}

async fn write_field(storage: &Arc<dyn SecretStore>, key: &str, value: &str) -> Result<()> {
    storage.set(key, value).await.map_err(|e| {
        warn!(key = key, error = %e, "Failed to write to secure storage");
        SessionError::StorageUnavailable(e.to_string())
    })
}

async fn clear_fields(storage: &Arc<dyn SecretStore>, keys: &StorageKeys) -> Result<()> {
    for key in [&keys.access_token, &keys.refresh_token, &keys.current_user] {
        storage.delete(key).await.map_err(|e| {
            warn!(key = key.as_str(), error = %e, "Failed to delete from secure storage");
            SessionError::StorageUnavailable(e.to_string())
        })?;
    }
    Ok(())
}
