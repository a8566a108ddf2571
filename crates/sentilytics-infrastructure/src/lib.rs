//! Infrastructure layer for Sentilytics.
//!
//! File-backed implementations of the core service contracts, plus path,
//! configuration and secret management.

pub mod config_service;
pub mod local_persistence;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::local_persistence::LocalPersistenceService;
pub use crate::paths::SentilyticsPaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::storage::FileTokenStore;
