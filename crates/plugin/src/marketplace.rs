//! Marketplace view over the registry and catalog.

use rapgen_core::{Plugin, PluginCategory, PluginManifest, Result};

use crate::catalog::Catalog;
use crate::registry::PluginRegistry;

/// A catalog entry as shown in the marketplace.
#[derive(Debug, Clone, Copy)]
pub struct Listing<'a> {
    pub manifest: &'a PluginManifest,
    pub installed: bool,
}

/// Installed plugins of one category.
#[derive(Debug, Clone)]
pub struct CategoryGroup<'a> {
    pub category: PluginCategory,
    pub plugins: Vec<&'a PluginManifest>,
}

/// Listing and installation surface for the UI.
///
/// Holds no state of its own; every listing is computed from the registry
/// and every mutation goes through it.
pub struct Marketplace<'a> {
    registry: &'a mut PluginRegistry,
    catalog: &'a Catalog,
}

impl<'a> Marketplace<'a> {
    pub fn new(registry: &'a mut PluginRegistry, catalog: &'a Catalog) -> Self {
        Self { registry, catalog }
    }

    /// Installed manifests in registration order.
    pub fn installed(&self, category: Option<PluginCategory>) -> Vec<&PluginManifest> {
        self.registry.manifests(category)
    }

    /// Installed manifests grouped by category, empty groups omitted.
    pub fn grouped(&self) -> Vec<CategoryGroup<'_>> {
        PluginCategory::ALL
            .into_iter()
            .map(|category| CategoryGroup {
                category,
                plugins: self.registry.manifests(Some(category)),
            })
            .filter(|group| !group.plugins.is_empty())
            .collect()
    }

    /// Catalog entries with their install state.
    pub fn available(&self, category: Option<PluginCategory>) -> Vec<Listing<'_>> {
        self.catalog
            .entries()
            .iter()
            .filter(|e| category.is_none_or(|c| e.manifest.category == c))
            .map(|e| Listing {
                manifest: &e.manifest,
                installed: self.registry.contains(&e.manifest.id),
            })
            .collect()
    }

    /// Installs a plugin.
    pub fn install(&mut self, plugin: Plugin) -> Result<()> {
        self.registry.register(plugin)
    }

    /// Installs a catalog entry by id.
    pub fn install_from_catalog(&mut self, id: &str) -> Result<()> {
        let plugin = self.catalog.instantiate(id)?;
        self.registry.register(plugin)
    }

    /// Uninstalls a plugin.
    pub fn uninstall(&mut self, id: &str) -> Result<Plugin> {
        self.registry.unregister(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapgen_core::PluginError;

    #[test]
    fn test_install_from_catalog() {
        let catalog = Catalog::builtin().unwrap();
        let mut registry = PluginRegistry::new();
        let mut market = Marketplace::new(&mut registry, &catalog);

        market.install_from_catalog("trap").unwrap();
        market.install_from_catalog("echo").unwrap();

        assert!(matches!(
            market.install_from_catalog("trap"),
            Err(PluginError::DuplicateId(_))
        ));
        assert!(matches!(
            market.install_from_catalog("nope"),
            Err(PluginError::NotFound(_))
        ));

        let installed = market.installed(None);
        let ids: Vec<_> = installed.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["trap", "echo"]);
    }

    #[test]
    fn test_available_marks_installed() {
        let catalog = Catalog::builtin().unwrap();
        let mut registry = PluginRegistry::new();
        let mut market = Marketplace::new(&mut registry, &catalog);
        market.install_from_catalog("lofi").unwrap();

        let effects = market.available(Some(PluginCategory::Effect));
        assert!(effects.iter().all(|l| l.manifest.category == PluginCategory::Effect));
        assert!(effects.iter().any(|l| l.manifest.id == "lofi" && l.installed));
        assert!(effects.iter().any(|l| l.manifest.id == "echo" && !l.installed));
    }

    #[test]
    fn test_grouped_projection() {
        let catalog = Catalog::builtin().unwrap();
        let mut registry = PluginRegistry::new();
        let mut market = Marketplace::new(&mut registry, &catalog);
        for id in ["echo", "trap", "shout", "boom-bap"] {
            market.install_from_catalog(id).unwrap();
        }

        let groups = market.grouped();
        let shape: Vec<_> = groups
            .iter()
            .map(|g| (g.category, g.plugins.iter().map(|m| m.id.as_str()).collect::<Vec<_>>()))
            .collect();

        assert_eq!(
            shape,
            vec![
                (PluginCategory::Beat, vec!["trap", "boom-bap"]),
                (PluginCategory::Flow, vec!["shout"]),
                (PluginCategory::Effect, vec!["echo"]),
            ]
        );
    }

    #[test]
    fn test_uninstall_passes_through() {
        let catalog = Catalog::builtin().unwrap();
        let mut registry = PluginRegistry::new();
        {
            let mut market = Marketplace::new(&mut registry, &catalog);
            market.install_from_catalog("drill").unwrap();
            assert_eq!(market.uninstall("drill").unwrap().id(), "drill");
            assert!(matches!(market.uninstall("drill"), Err(PluginError::NotFound(_))));
        }
        assert!(registry.is_empty());
    }
}
