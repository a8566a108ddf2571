//! Persistence service contract.

use async_trait::async_trait;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::user::{AuthGrant, User};

/// Backend that stores users, credentials and datasets.
///
/// Dataset operations are scoped to the user the session `token` belongs to.
/// An unknown or expired token yields `Authentication`.
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Checks credentials. `Ok(None)` means they were rejected.
    async fn login(&self, email: &str, password: &str) -> Result<Option<AuthGrant>>;

    /// Creates an account. Fails with `Registration` on a duplicate email.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<()>;

    /// Resolves a token to its user. `Ok(None)` for unknown tokens.
    async fn fetch_profile(&self, token: &str) -> Result<Option<User>>;

    async fn save_dataset(&self, token: &str, dataset: &Dataset) -> Result<()>;

    /// Lists the session user's datasets in upload order.
    async fn list_datasets(&self, token: &str) -> Result<Vec<Dataset>>;

    async fn fetch_dataset(&self, token: &str, id: &str) -> Result<Option<Dataset>>;

    /// Ends the session `token` belongs to. Unknown tokens are ignored.
    async fn revoke(&self, _token: &str) -> Result<()> {
        Ok(())
    }
}
