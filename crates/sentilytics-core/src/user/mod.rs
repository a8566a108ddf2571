//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: User identity and the grant returned by a successful login
//!
//! # Usage
//!
//! ```ignore
//! use sentilytics_core::user::{User, AuthGrant};
//! ```

mod model;

// Re-export public API
pub use model::{AuthGrant, User};
