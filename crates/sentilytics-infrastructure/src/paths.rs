//! Unified path management for sentilytics files.
//!
//! This ensures consistency across all platforms (Linux, macOS, Windows).

use std::path::{Path, PathBuf};

use sentilytics_core::config::{GeminiConfig, SecretConfig};

/// Environment variable that relocates every sentilytics file under one directory.
pub const HOME_ENV_VAR: &str = "SENTILYTICS_HOME";

const APP_DIR_NAME: &str = "sentilytics";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for sentilytics.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/sentilytics/       # Config directory
/// ├── config.toml              # Application configuration
/// ├── secret.json              # API keys
/// ├── session.toml             # Persisted session token
/// └── logs/                    # Application logs
///     └── sentilytics.log.YYYY-MM-DD
///
/// ~/.local/share/sentilytics/  # Data directory
/// └── store.toml               # Local persistence backend
/// ```
///
/// With a base path (or `SENTILYTICS_HOME`), both directories collapse into
/// that single directory.
#[derive(Debug, Clone, Default)]
pub struct SentilyticsPaths {
    base: Option<PathBuf>,
}

impl SentilyticsPaths {
    /// Creates a resolver rooted at `base_path`, or at the platform
    /// directories when `None`.
    pub fn new(base_path: Option<&Path>) -> Self {
        Self {
            base: base_path.map(Path::to_path_buf),
        }
    }

    /// Like [`SentilyticsPaths::new`], honouring `SENTILYTICS_HOME` when no
    /// explicit base path is given.
    pub fn from_env(base_path: Option<&Path>) -> Self {
        match base_path {
            Some(path) => Self::new(Some(path)),
            None => {
                let env_base = std::env::var_os(HOME_ENV_VAR).map(PathBuf::from);
                Self { base: env_base }
            }
        }
    }

    /// Returns the configuration directory (e.g., `~/.config/sentilytics/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the data directory (e.g., `~/.local/share/sentilytics/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Returns the path of the durable session token slot.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.toml"))
    }

    /// Returns the path of the local persistence backend document.
    pub fn store_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("store.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Ensures the secret file exists, creating it with a template if it doesn't.
    ///
    /// The template holds an empty Gemini API key to be filled in by the user.
    /// On Unix the file is created with mode 600.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self
            .secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;

        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template_config = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: None,
            }),
        };

        let template_json = serde_json::to_string_pretty(&template_config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}
