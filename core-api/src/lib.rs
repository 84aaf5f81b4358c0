//! # API Layer
//!
//! The authenticated request path of the rmobility client:
//! - [`AuthClient`]: bearer attachment and single-flight token refresh on 401
//! - [`RouteGuard`]: keeps unauthenticated users out of protected routes
//! - [`TransportItemsApi`] / [`TransportPodiumsApi`]: typed CRUD resources
//!
//! ## Invariant
//!
//! N concurrent 401s cause at most one refresh call; every affected request
//! replays exactly once with the refreshed token, or surfaces its original
//! 401 when the refresh fails.

pub mod client;
pub mod error;
pub mod guard;
pub mod transport_items;
pub mod transport_podiums;

pub use client::AuthClient;
pub use error::{ApiError, Result};
pub use guard::{GuardDecision, RouteGuard};
pub use transport_items::{PodiumRef, TransportItem, TransportItemRequest, TransportItemsApi};
pub use transport_podiums::{TransportPodium, TransportPodiumRequest, TransportPodiumsApi};
