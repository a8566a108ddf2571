//! File-backed session token slot.

use async_trait::async_trait;
use sentilytics_core::session::{SESSION_TOKEN_KEY, TokenStore};
use sentilytics_core::{Result, SentilyticsError};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::atomic_toml::{AtomicTomlError, AtomicTomlFile};

type Slots = BTreeMap<String, String>;

/// [`TokenStore`] backed by a small key-value TOML file (`session.toml`).
///
/// The token lives under the fixed key `token`. File I/O runs on the blocking
/// pool so callers never block the async runtime.
///
/// `load` reports an unparseable file as an error; `save` and `clear` replace
/// it so a damaged slot never blocks signing in or out.
#[derive(Clone)]
pub struct FileTokenStore {
    file: Arc<AtomicTomlFile<Slots>>,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }

    async fn with_file<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&AtomicTomlFile<Slots>) -> Result<R> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || f(&file))
            .await
            .map_err(|e| SentilyticsError::internal(format!("Failed to join task: {}", e)))?
    }
}

/// Loads the slots, deleting the file first if it does not parse.
fn load_or_discard(file: &AtomicTomlFile<Slots>) -> Result<Option<Slots>> {
    match file.load() {
        Err(AtomicTomlError::TomlError(e)) => {
            tracing::warn!(
                path = %file.path().display(),
                error = %e,
                "[FileTokenStore] Discarding unreadable token file"
            );
            file.remove()?;
            Ok(None)
        }
        other => Ok(other?),
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        self.with_file(|file| {
            let slots = file.load()?.unwrap_or_default();
            Ok(slots.get(SESSION_TOKEN_KEY).cloned())
        })
        .await
    }

    async fn save(&self, token: &str) -> Result<()> {
        let token = token.to_string();
        self.with_file(move |file| {
            load_or_discard(file)?;
            file.update(Slots::new(), |slots| {
                slots.insert(SESSION_TOKEN_KEY.to_string(), token);
                Ok(())
            })?;
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.with_file(|file| {
            if load_or_discard(file)?.is_none() {
                return Ok(());
            }
            file.update(Slots::new(), |slots| {
                slots.remove(SESSION_TOKEN_KEY);
                Ok(())
            })?;
            Ok(())
        })
        .await
    }
}
