//! Installed-plugin registry.

use std::collections::HashMap;

use rapgen_core::{
    BeatPlugin, EffectPlugin, FlowPlugin, Plugin, PluginCategory, PluginError, PluginManifest,
    Result,
};
use tracing::{debug, info};

/// Stores installed plugins in registration order.
///
/// The registry is an ordinary value: create one per session and pass it
/// where it is needed. Mutation requires `&mut`, so there is only ever a
/// single writer.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    /// Plugins in registration order.
    plugins: Vec<Plugin>,

    /// Mapping from plugin id to position in `plugins`.
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin after validating its manifest.
    pub fn register(&mut self, plugin: Plugin) -> Result<()> {
        plugin.validate()?;

        let id = plugin.id().to_string();
        if self.index.contains_key(&id) {
            return Err(PluginError::DuplicateId(id));
        }

        info!(id = %id, category = %plugin.category(), "registered plugin");
        self.index.insert(id, self.plugins.len());
        self.plugins.push(plugin);
        Ok(())
    }

    /// Removes a plugin and returns it.
    pub fn unregister(&mut self, id: &str) -> Result<Plugin> {
        let position = self
            .index
            .remove(id)
            .ok_or_else(|| PluginError::NotFound(id.to_string()))?;

        let plugin = self.plugins.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }

        info!(id = %id, "unregistered plugin");
        Ok(plugin)
    }

    /// Gets a plugin by id.
    pub fn get(&self, id: &str) -> Result<&Plugin> {
        self.index
            .get(id)
            .map(|&position| &self.plugins[position])
            .ok_or_else(|| PluginError::NotFound(id.to_string()))
    }

    /// Returns true if a plugin with this id is installed.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Plugins of one category, in registration order.
    pub fn list_by_category(&self, category: PluginCategory) -> Vec<&Plugin> {
        self.plugins
            .iter()
            .filter(|p| p.category() == category)
            .collect()
    }

    /// All plugins in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter()
    }

    /// Manifests in registration order, optionally filtered by category.
    pub fn manifests(&self, category: Option<PluginCategory>) -> Vec<&PluginManifest> {
        self.plugins
            .iter()
            .filter(|p| category.is_none_or(|c| p.category() == c))
            .map(Plugin::manifest)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Resolves an id that must name a beat plugin.
    pub fn resolve_beat(&self, id: &str) -> Result<&BeatPlugin> {
        match self.resolve(id, PluginCategory::Beat)? {
            Plugin::Beat(beat) => Ok(beat),
            other => Err(mismatch(id, PluginCategory::Beat, other)),
        }
    }

    /// Resolves an id that must name a flow plugin.
    pub fn resolve_flow(&self, id: &str) -> Result<&FlowPlugin> {
        match self.resolve(id, PluginCategory::Flow)? {
            Plugin::Flow(flow) => Ok(flow),
            other => Err(mismatch(id, PluginCategory::Flow, other)),
        }
    }

    /// Resolves an id that must name an effect plugin.
    pub fn resolve_effect(&self, id: &str) -> Result<&EffectPlugin> {
        match self.resolve(id, PluginCategory::Effect)? {
            Plugin::Effect(effect) => Ok(effect),
            other => Err(mismatch(id, PluginCategory::Effect, other)),
        }
    }

    fn resolve(&self, id: &str, expected: PluginCategory) -> Result<&Plugin> {
        debug!(id = %id, expected = %expected, "resolving plugin");
        self.get(id)
            .map_err(|_| PluginError::unresolved(id, expected, "no such plugin is installed"))
    }
}

fn mismatch(id: &str, expected: PluginCategory, found: &Plugin) -> PluginError {
    PluginError::unresolved(
        id,
        expected,
        format!("it is a {} plugin", found.category()),
    )
}
