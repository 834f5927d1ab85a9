//! Marketplace catalog of installable plugins.

use std::collections::HashSet;
use std::path::Path;

use rapgen_core::{Plugin, PluginError, PluginManifest, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builtin;

/// Catalog shipped with the binary.
const BUILTIN_CATALOG: &str = include_str!("../catalog.json");

/// One installable plugin: its manifest and the implementation to bind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Plugin manifest.
    pub manifest: PluginManifest,

    /// Key of the implementation to instantiate.
    pub implementation: String,
}

/// The list of plugins available for installation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "plugins")]
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// The catalog embedded in this build.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Loads a catalog from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a catalog and checks ids and implementation keys.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|e| PluginError::Manifest(e.to_string()))?;

        let mut seen = HashSet::new();
        for entry in &catalog.entries {
            if !seen.insert(entry.manifest.id.as_str()) {
                return Err(PluginError::DuplicateId(entry.manifest.id.clone()));
            }
            if !builtin::is_known(&entry.implementation) {
                return Err(PluginError::UnknownImplementation(
                    entry.implementation.clone(),
                ));
            }
        }

        debug!(entries = catalog.entries.len(), "loaded plugin catalog");
        Ok(catalog)
    }

    /// Appends another catalog's entries. Ids must stay unique.
    pub fn merge(&mut self, other: Catalog) -> Result<()> {
        if let Some(dup) = other.entries.iter().find(|e| self.get(&e.manifest.id).is_some()) {
            return Err(PluginError::DuplicateId(dup.manifest.id.clone()));
        }
        self.entries.extend(other.entries);
        Ok(())
    }

    /// Entries in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Looks up an entry by plugin id.
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.manifest.id == id)
    }

    /// Creates a fresh plugin instance for a catalog id.
    pub fn instantiate(&self, id: &str) -> Result<Plugin> {
        let entry = self
            .get(id)
            .ok_or_else(|| PluginError::NotFound(id.to_string()))?;
        builtin::instantiate(&entry.implementation, entry.manifest.clone())
    }

    /// Instances of the plugins every session starts with.
    pub fn boot_plugins(&self) -> Result<Vec<Plugin>> {
        builtin::BOOT_PLUGINS
            .iter()
            .map(|id| self.instantiate(id))
            .collect()
    }
}
