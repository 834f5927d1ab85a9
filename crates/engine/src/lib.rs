//! RapGen Engine - Graph composition, playback and lyric pipelines.
//!
//! Builds audio graphs from installed beat and effect plugins, drives
//! their playback, and runs lyrics through chains of flow plugins.

mod composer;
mod error;
mod invoke;
mod pipeline;
mod playback;
mod session;

pub use composer::{AudioGraphSpec, GraphComposer};
pub use error::{EngineError, Result};
pub use invoke::DEFAULT_SLOW_PLUGIN;
pub use pipeline::FlowPipeline;
pub use playback::{GraphHandle, PlaybackState};
pub use session::{Session, SessionConfig};
