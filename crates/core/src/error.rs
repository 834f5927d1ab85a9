//! Error types for the plugin engine.

use thiserror::Error;

use crate::manifest::PluginCategory;

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

/// Main error type for plugin registration, lookup and invocation.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Plugin '{0}' is already installed")]
    DuplicateId(String),

    #[error("Plugin '{0}' not found")]
    NotFound(String),

    #[error("Cannot resolve {expected} plugin '{id}': {reason}")]
    PluginResolution {
        id: String,
        expected: PluginCategory,
        reason: String,
    },

    #[error("Effect plugin '{id}' failed: {reason}")]
    Effect { id: String, reason: String },

    #[error("Audio graph error: {0}")]
    Graph(String),

    #[error("Failed to parse plugin manifest: {0}")]
    Manifest(String),

    #[error("Unknown plugin implementation '{0}'")]
    UnknownImplementation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Creates a validation error for the given field.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        PluginError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a resolution error for the given id.
    pub fn unresolved(
        id: impl Into<String>,
        expected: PluginCategory,
        reason: impl Into<String>,
    ) -> Self {
        PluginError::PluginResolution {
            id: id.into(),
            expected,
            reason: reason.into(),
        }
    }
}
