//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits
//! using desktop-appropriate libraries:
//! - `HttpClient` using `reqwest`
//! - `SecretStore` using the `keyring` crate (OS keychain)
//!
//! ## Feature Flags
//!
//! - `secret-store`: Enable OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{KeyringSecretStore, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new());
//! let secrets = Arc::new(KeyringSecretStore::new());
//! // Hand both to the session core.
//! ```

mod http;

#[cfg(feature = "secret-store")]
mod secret_store;

pub use http::ReqwestHttpClient;

#[cfg(feature = "secret-store")]
pub use secret_store::KeyringSecretStore;
