//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the rmobility client core:
//! - Logging and tracing infrastructure
//! - Configuration management (API endpoints, storage key names)
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the core runtime utilities that other modules depend on.
//! It establishes the logging conventions, configuration surface, and event
//! broadcasting mechanisms used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::CoreConfig;
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, NotificationEvent, SessionEvent, Severity};
