//! Durable storage for the session token.

use async_trait::async_trait;

use crate::error::Result;

/// Fixed name of the key-value slot that holds the session token.
pub const SESSION_TOKEN_KEY: &str = "token";

/// A single durable slot holding the session token across process restarts.
///
/// The token is the only session data persisted locally; the user is
/// re-derived from it on restore.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the persisted token, if any.
    async fn load(&self) -> Result<Option<String>>;

    /// Persists `token`, replacing any previous value.
    async fn save(&self, token: &str) -> Result<()>;

    /// Removes the persisted token. Clearing an empty slot is not an error.
    async fn clear(&self) -> Result<()>;
}
