//! Lyric transform pipeline.

use std::time::Duration;

use rapgen_core::FlowPlugin;
use rapgen_plugin::PluginRegistry;
use tracing::debug;

use crate::error::Result;
use crate::invoke::{DEFAULT_SLOW_PLUGIN, invoke};

/// Runs lyrics through an ordered list of flow plugins.
pub struct FlowPipeline<'a> {
    registry: &'a PluginRegistry,
    slow_plugin: Duration,
}

impl<'a> FlowPipeline<'a> {
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self {
            registry,
            slow_plugin: DEFAULT_SLOW_PLUGIN,
        }
    }

    /// Sets the slow-plugin warning threshold.
    pub fn with_slow_plugin_threshold(mut self, threshold: Duration) -> Self {
        self.slow_plugin = threshold;
        self
    }

    /// Applies each flow in `ids` to the output of the previous one.
    ///
    /// Every id is resolved before any transform runs, so a bad id fails
    /// the call without partial work. An empty list returns the input.
    pub fn run<S: AsRef<str>>(&self, lyrics: &str, ids: &[S]) -> Result<String> {
        let flows = ids
            .iter()
            .map(|id| self.registry.resolve_flow(id.as_ref()))
            .collect::<rapgen_core::Result<Vec<&FlowPlugin>>>()?;

        let output = flows.iter().fold(lyrics.to_string(), |text, flow| {
            invoke(&flow.manifest.id, "transform_lyrics", self.slow_plugin, || {
                flow.transform.transform_lyrics(&text)
            })
        });

        debug!(
            flows = flows.len(),
            input_len = lyrics.len(),
            output_len = output.len(),
            "transformed lyrics"
        );
        Ok(output)
    }
}
