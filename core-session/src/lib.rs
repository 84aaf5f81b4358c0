//! # Session Core
//!
//! Authentication session lifecycle for the rmobility client:
//! - [`SessionStore`]: secure persistence of the three session fields
//!   (access token, refresh token, current user) with a reactive view
//! - [`SessionService`]: login, refresh, logout against the backend
//! - [`classify`]: translation of HTTP failures into the closed error
//!   taxonomy the UI acts on
//!
//! ## Security
//!
//! Token material is never logged and never appears in error messages.
//! `Debug` implementations on session types redact sensitive fields.
//!
//! ## Example
//!
//! ```ignore
//! use core_session::{SessionService, SessionStore, Credentials};
//! use core_runtime::{CoreConfig, EventBus};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     storage: Arc<dyn bridge_traits::SecretStore>,
//! #     http: Arc<dyn bridge_traits::HttpClient>,
//! # ) -> core_session::Result<()> {
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.rmobility.example/api/v1")
//!     .build()?;
//! let store = SessionStore::open(storage, config.storage_keys.clone()).await?;
//! let service = SessionService::new(http, store, EventBus::default(), &config)?;
//!
//! service
//!     .login(Credentials::new("admin@rmobility.example", "secret"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use classify::{classify, ClassifiedError, ErrorKind};
pub use error::{Result, SessionError};
pub use service::SessionService;
pub use store::SessionStore;
pub use types::{Credentials, Session};
