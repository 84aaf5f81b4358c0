//! # rmobility Client Core
//!
//! Facade crate for the rmobility console's client core. Host shells can
//! depend on `rmobility-core` alone and reach every member crate through
//! the re-exports below.
//!
//! ## Crates
//!
//! - [`bridge_traits`]: platform seams (`HttpClient`, `SecretStore`)
//! - [`bridge_desktop`]: desktop implementations (reqwest, OS keychain);
//!   behind the `desktop-shims` feature (default)
//! - [`core_runtime`]: event bus, logging, configuration
//! - [`core_session`]: session store, session service, error classifier
//! - [`core_api`]: authenticated client, route guard, typed resources
//!
//! ## Example
//!
//! ```ignore
//! use rmobility_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.rmobility.example/api/v1")
//!     .build()?;
//!
//! let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
//! let storage: Arc<dyn SecretStore> = Arc::new(KeyringSecretStore::new());
//! let events = EventBus::default();
//!
//! let store = SessionStore::open(storage, config.storage_keys.clone()).await?;
//! let session = SessionService::new(http.clone(), store, events.clone(), &config)?;
//! let client = AuthClient::new(http, session, events, config);
//!
//! let items = TransportItemsApi::new(client)?.list().await?;
//! # Ok(())
//! # }
//! ```

pub use bridge_traits;
pub use core_api;
pub use core_runtime;
pub use core_session;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

/// Commonly used types, re-exported flat.
pub mod prelude {
    pub use bridge_traits::{HttpClient, SecretStore};
    pub use core_api::{
        AuthClient, GuardDecision, RouteGuard, TransportItemsApi, TransportPodiumsApi,
    };
    pub use core_runtime::{CoreConfig, EventBus, NotificationEvent, SessionEvent};
    pub use core_session::{Credentials, Session, SessionService, SessionStore};

    #[cfg(feature = "desktop-shims")]
    pub use bridge_desktop::{KeyringSecretStore, ReqwestHttpClient};
}
