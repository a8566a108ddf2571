//! Error types for the Sentilytics application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::Operation;

/// A shared error type for the entire Sentilytics application.
///
/// Each variant corresponds to one failure kind the orchestration layer
/// reports to its caller. Conversions from common error types are provided
/// via `From`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SentilyticsError {
    /// Bad credentials, or an operation that needs a signed-in user.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Account creation failed (e.g. duplicate email).
    #[error("Registration failed: {0}")]
    Registration(String),

    /// Reading, decoding or persisting an uploaded file failed.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// The requested dataset does not exist.
    #[error("Dataset not found: '{id}'")]
    DatasetNotFound { id: String },

    /// The external analysis service failed. Which of its calls failed is
    /// deliberately not reported.
    #[error("Analysis failed: {0}")]
    AnalysisService(String),

    /// Another upload or analysis is in flight.
    #[error("Another operation is in progress: {operation}")]
    Busy { operation: Operation },

    /// Persistence service failure outside of an upload.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Local storage (token slot, data files) failure.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SentilyticsError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Creates a Registration error
    pub fn registration(message: impl Into<String>) -> Self {
        Self::Registration(message.into())
    }

    /// Creates an Upload error
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload(message.into())
    }

    /// Creates a DatasetNotFound error
    pub fn dataset_not_found(id: impl Into<String>) -> Self {
        Self::DatasetNotFound { id: id.into() }
    }

    /// Creates an AnalysisService error
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::AnalysisService(message.into())
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    pub fn is_registration(&self) -> bool {
        matches!(self, Self::Registration(_))
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, Self::Upload(_))
    }

    pub fn is_dataset_not_found(&self) -> bool {
        matches!(self, Self::DatasetNotFound { .. })
    }

    pub fn is_analysis(&self) -> bool {
        matches!(self, Self::AnalysisService(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }

    /// Re-labels a failure as an upload failure, keeping the original message.
    ///
    /// Errors that already describe the upload (or a busy rejection) are
    /// returned unchanged.
    pub fn into_upload(self) -> Self {
        match self {
            Self::Upload(_) | Self::Busy { .. } => self,
            other => Self::Upload(other.to_string()),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SentilyticsError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SentilyticsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SentilyticsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SentilyticsError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, SentilyticsError>`.
pub type Result<T> = std::result::Result<T, SentilyticsError>;
