//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or checking [`SurveySettings`](crate::SurveySettings).
///
/// File failures carry the path of the layer that failed; validation
/// failures carry the camelCase key that was rejected.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The user settings file exists but could not be read.
    #[error("cannot read settings file {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The user settings file is not valid JSON.
    #[error("settings file {} is not valid JSON: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The merged layers do not fit the settings shape (e.g. a string where
    /// a number belongs).
    #[error("merged settings do not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
    /// A value passed every layer but cannot be used.
    #[error("invalid {key}: {reason}")]
    InvalidValue {
        /// Dotted camelCase key, e.g. `gateway.endpointUrl`.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl SettingsError {
    /// Rejected value for `key`.
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }

    /// Short category string for structured logs.
    pub const fn error_kind(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Parse { .. } => "parse",
            Self::Shape(_) => "shape",
            Self::InvalidValue { .. } => "invalid_value",
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
