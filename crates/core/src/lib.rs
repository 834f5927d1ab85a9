//! RapGen Core - Core types and traits for the RapGen plugin engine.

mod audio;
mod error;
mod graph;
mod manifest;
mod plugin;

pub use audio::{AudioBuffer, AudioContext, DEFAULT_SAMPLE_RATE, MAX_BPM, MIN_BPM};
pub use error::{PluginError, Result};
pub use graph::{AudioGraph, AudioNode, FilterResponse, NodeId, NodeKind};
pub use manifest::{PluginCategory, PluginManifest};
pub use plugin::{
    AudioEffect, BeatGenerator, BeatPlugin, EffectPlugin, FlowPlugin, LyricTransform, Plugin,
    VisualPlugin,
};
