//! A plugin session: one registry, one catalog, one audio context.

use std::time::Duration;

use rapgen_core::{AudioContext, DEFAULT_SAMPLE_RATE, Plugin, PluginCategory, PluginManifest};
use rapgen_plugin::{Catalog, Marketplace, PluginRegistry};
use tracing::info;

use crate::composer::{AudioGraphSpec, GraphComposer};
use crate::error::Result;
use crate::invoke::DEFAULT_SLOW_PLUGIN;
use crate::pipeline::FlowPipeline;
use crate::playback::GraphHandle;

/// Settings for a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sample rate of the host audio context.
    pub sample_rate: u32,

    /// Plugin calls slower than this are logged as warnings.
    pub slow_plugin_threshold: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            slow_plugin_threshold: DEFAULT_SLOW_PLUGIN,
        }
    }
}

/// Entry point for hosts.
///
/// Owns the registry for its lifetime. Graphs built from a session own
/// their nodes and keep working after the plugins they came from are
/// uninstalled.
#[derive(Debug)]
pub struct Session {
    registry: PluginRegistry,
    catalog: Catalog,
    context: AudioContext,
    slow_plugin: Duration,
}

impl Session {
    /// Creates a session with an empty registry over `catalog`.
    pub fn new(config: SessionConfig, catalog: Catalog) -> Result<Self> {
        Ok(Self {
            registry: PluginRegistry::new(),
            catalog,
            context: AudioContext::new(config.sample_rate)?,
            slow_plugin: config.slow_plugin_threshold,
        })
    }

    /// Creates a session over the built-in catalog with the boot plugins
    /// installed.
    pub fn with_builtins(config: SessionConfig) -> Result<Self> {
        let mut session = Self::new(config, Catalog::builtin()?)?;
        for plugin in session.catalog.boot_plugins()? {
            session.registry.register(plugin)?;
        }
        info!(plugins = session.registry.len(), "session ready");
        Ok(session)
    }

    /// Installed manifests, optionally filtered by category.
    pub fn list_plugins(&self, category: Option<PluginCategory>) -> Vec<&PluginManifest> {
        self.registry.manifests(category)
    }

    /// Installs a plugin instance.
    pub fn install_plugin(&mut self, plugin: Plugin) -> Result<()> {
        Ok(self.registry.register(plugin)?)
    }

    /// Installs a catalog entry by id.
    pub fn install_from_catalog(&mut self, id: &str) -> Result<()> {
        Ok(self.marketplace().install_from_catalog(id)?)
    }

    /// Uninstalls a plugin. Graphs already built are unaffected.
    pub fn uninstall_plugin(&mut self, id: &str) -> Result<Plugin> {
        Ok(self.registry.unregister(id)?)
    }

    /// Builds a graph for a beat and effect chain.
    pub fn build_audio_graph(&self, spec: &AudioGraphSpec) -> Result<GraphHandle> {
        GraphComposer::new(&self.registry, self.context)
            .with_slow_plugin_threshold(self.slow_plugin)
            .build(spec)
    }

    /// Runs lyrics through the given flows in order.
    pub fn transform_lyrics<S: AsRef<str>>(&self, lyrics: &str, flow_ids: &[S]) -> Result<String> {
        FlowPipeline::new(&self.registry)
            .with_slow_plugin_threshold(self.slow_plugin)
            .run(lyrics, flow_ids)
    }

    /// Marketplace view over this session's registry and catalog.
    pub fn marketplace(&mut self) -> Marketplace<'_> {
        Marketplace::new(&mut self.registry, &self.catalog)
    }

    /// Adds entries from another catalog.
    pub fn merge_catalog(&mut self, other: Catalog) -> Result<()> {
        Ok(self.catalog.merge(other)?)
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn context(&self) -> &AudioContext {
        &self.context
    }
}
