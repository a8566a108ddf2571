//! Local, file-backed persistence service.
//!
//! Stands in for a remote backend: users, issued session tokens and datasets
//! live in a single TOML document (`store.toml`) written atomically.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sentilytics_core::dataset::Dataset;
use sentilytics_core::user::{AuthGrant, User};
use sentilytics_core::{PersistenceService, Result, SentilyticsError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::paths::SentilyticsPaths;
use crate::storage::AtomicTomlFile;

/// How long an issued token stays valid.
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    users: Vec<StoredUser>,
    #[serde(default)]
    sessions: Vec<StoredSession>,
    #[serde(default)]
    datasets: Vec<StoredDataset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    id: String,
    /// Normalized (trimmed, lowercase)
    email: String,
    name: String,
    salt: String,
    password_hash: String,
}

impl StoredUser {
    fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user_id: String,
    issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDataset {
    owner_id: String,
    dataset: Dataset,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn new_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// [`PersistenceService`] that keeps everything in one local TOML document.
///
/// Passwords are stored as salted SHA-256 digests. Emails are matched
/// case-insensitively. Each login issues a fresh token.
#[derive(Clone)]
pub struct LocalPersistenceService {
    file: Arc<AtomicTomlFile<StoreDocument>>,
    session_ttl: Duration,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl LocalPersistenceService {
    /// Opens (or lazily creates) `store.toml` in the resolved data directory.
    pub fn new(paths: &SentilyticsPaths) -> Result<Self> {
        let path = paths
            .store_file()
            .map_err(|e| SentilyticsError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Overrides how long issued tokens stay valid.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    async fn read<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&StoreDocument) -> Result<R> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || {
            let document = file.load()?.unwrap_or_default();
            f(&document)
        })
        .await
        .map_err(|e| SentilyticsError::internal(format!("Failed to join task: {}", e)))?
    }

    async fn write<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut StoreDocument) -> Result<R> + Send + 'static,
    {
        let _guard = self.write_lock.lock().await;
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || {
            let value = file.update(StoreDocument::default(), |document| Ok(f(document)?))?;
            Ok(value)
        })
        .await
        .map_err(|e| SentilyticsError::internal(format!("Failed to join task: {}", e)))?
    }

    fn resolve_user<'a>(
        document: &'a StoreDocument,
        token: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Option<&'a StoredUser> {
        let session = document
            .sessions
            .iter()
            .find(|s| s.token == token && now - s.issued_at < ttl)?;
        document.users.iter().find(|u| u.id == session.user_id)
    }

    fn require_owner(document: &StoreDocument, token: &str, ttl: Duration) -> Result<String> {
        Self::resolve_user(document, token, ttl, Utc::now())
            .map(|u| u.id.clone())
            .ok_or_else(|| SentilyticsError::authentication("Session is invalid or expired"))
    }
}

#[async_trait]
impl PersistenceService for LocalPersistenceService {
    async fn login(&self, email: &str, password: &str) -> Result<Option<AuthGrant>> {
        let email = normalize_email(email);
        let password = password.to_string();
        let ttl = self.session_ttl;

        self.write(move |document| {
            let Some(user) = document
                .users
                .iter()
                .find(|u| u.email == email && u.password_hash == hash_password(&u.salt, &password))
            else {
                return Ok(None);
            };

            let grant = AuthGrant {
                token: Uuid::new_v4().to_string(),
                user: user.to_user(),
            };

            let now = Utc::now();
            let before = document.sessions.len();
            document.sessions.retain(|s| now - s.issued_at < ttl);
            if document.sessions.len() < before {
                tracing::debug!(
                    pruned = before - document.sessions.len(),
                    "[LocalPersistenceService] Pruned expired sessions"
                );
            }

            document.sessions.push(StoredSession {
                token: grant.token.clone(),
                user_id: grant.user.id.clone(),
                issued_at: now,
            });
            Ok(Some(grant))
        })
        .await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(SentilyticsError::registration("A valid email is required"));
        }
        if password.is_empty() {
            return Err(SentilyticsError::registration("Password must not be empty"));
        }

        let name = name.trim().to_string();
        let password = password.to_string();

        self.write(move |document| {
            if document.users.iter().any(|u| u.email == email) {
                return Err(SentilyticsError::registration(format!(
                    "An account for {} already exists",
                    email
                )));
            }

            let salt = new_salt();
            let password_hash = hash_password(&salt, &password);
            document.users.push(StoredUser {
                id: Uuid::new_v4().to_string(),
                email,
                name,
                salt,
                password_hash,
            });
            Ok(())
        })
        .await
    }

    async fn fetch_profile(&self, token: &str) -> Result<Option<User>> {
        let token = token.to_string();
        let ttl = self.session_ttl;
        self.read(move |document| {
            Ok(Self::resolve_user(document, &token, ttl, Utc::now()).map(StoredUser::to_user))
        })
        .await
    }

    async fn save_dataset(&self, token: &str, dataset: &Dataset) -> Result<()> {
        let token = token.to_string();
        let dataset = dataset.clone();
        let ttl = self.session_ttl;

        self.write(move |document| {
            let owner_id = Self::require_owner(document, &token, ttl)?;
            if document.datasets.iter().any(|d| d.dataset.id == dataset.id) {
                return Err(SentilyticsError::persistence(format!(
                    "Dataset {} already exists",
                    dataset.id
                )));
            }
            document.datasets.push(StoredDataset { owner_id, dataset });
            Ok(())
        })
        .await
    }

    async fn list_datasets(&self, token: &str) -> Result<Vec<Dataset>> {
        let token = token.to_string();
        let ttl = self.session_ttl;

        self.read(move |document| {
            let owner_id = Self::require_owner(document, &token, ttl)?;
            Ok(document
                .datasets
                .iter()
                .filter(|d| d.owner_id == owner_id)
                .map(|d| d.dataset.clone())
                .collect())
        })
        .await
    }

    async fn fetch_dataset(&self, token: &str, id: &str) -> Result<Option<Dataset>> {
        let token = token.to_string();
        let id = id.to_string();
        let ttl = self.session_ttl;

        self.read(move |document| {
            let owner_id = Self::require_owner(document, &token, ttl)?;
            Ok(document
                .datasets
                .iter()
                .find(|d| d.owner_id == owner_id && d.dataset.id == id)
                .map(|d| d.dataset.clone()))
        })
        .await
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        let token = token.to_string();

        let removed = self
            .write(move |document| {
                let before = document.sessions.len();
                document.sessions.retain(|s| s.token != token);
                Ok(before - document.sessions.len())
            })
            .await?;
        tracing::debug!(removed, "[LocalPersistenceService] Session revoked");
        Ok(())
    }
}
