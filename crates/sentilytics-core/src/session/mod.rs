//! Session domain module.
//!
//! Contains the authenticated-session model, the registration saga record,
//! and the durable token slot abstraction.

mod model;
mod token_store;

pub use model::{PendingRegistration, RegistrationStage, Session};
pub use token_store::{SESSION_TOKEN_KEY, TokenStore};
