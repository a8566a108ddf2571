//! User domain model.

use serde::{Deserialize, Serialize};

/// A user as issued by the persistence service.
///
/// Immutable once issued; the session owns it for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier assigned by the persistence service
    pub id: String,
    pub email: String,
    /// Display name
    pub name: String,
}

/// What a successful login hands back: the session token and its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGrant {
    pub token: String,
    pub user: User,
}
