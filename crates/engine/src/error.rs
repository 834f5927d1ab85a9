//! Engine error types.

use rapgen_core::PluginError;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error type for graph building, playback and lyric transforms.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("Audio graph was stopped and its resources released")]
    Released,
}

impl EngineError {
    /// The plugin error behind this failure, if any.
    pub fn as_plugin(&self) -> Option<&PluginError> {
        match self {
            EngineError::Plugin(err) => Some(err),
            EngineError::Released => None,
        }
    }
}
