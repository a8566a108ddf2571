//! Domain layer for Sentilytics.
//!
//! Models, service contracts and the application state reducer. No I/O
//! happens here; infrastructure and interaction crates implement the traits.

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod persistence;
pub mod secret;
pub mod session;
pub mod state;
pub mod user;

// Re-export common error type
pub use error::{Result, SentilyticsError};
pub use persistence::PersistenceService;
