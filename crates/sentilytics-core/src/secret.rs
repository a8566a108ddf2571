//! Source of the API credentials used by the analysis service.

use async_trait::async_trait;

use crate::config::SecretConfig;
use crate::error::Result;

/// Supplies the contents of `secret.json`.
///
/// Error messages name the file and the failure, never the key itself.
#[async_trait]
pub trait SecretService: Send + Sync {
    /// Fails with `Config` when the secrets cannot be read or parsed.
    async fn load_secrets(&self) -> Result<SecretConfig>;
}
