//! CLI command implementations.

pub mod graph;
pub mod init;
pub mod install;
pub mod list;
pub mod render;
pub mod transform;
pub mod validate;

use miette::{Result, miette};
use rapgen_engine::Session;
use rapgen_plugin::Catalog;
use tracing::debug;

use crate::config::LoadedConfig;

/// Opens a session with the boot plugins, the configured extra catalog and
/// the configured install list.
pub fn open_session(loaded: &LoadedConfig) -> Result<Session> {
    let mut session = Session::with_builtins(loaded.config.session())
        .map_err(|e| miette!("Failed to start session: {}", e))?;

    if let Some(path) = loaded.catalog_path() {
        let extra = Catalog::from_file(&path)
            .map_err(|e| miette!("Failed to load catalog {}: {}", path.display(), e))?;
        session
            .merge_catalog(extra)
            .map_err(|e| miette!("Failed to merge catalog {}: {}", path.display(), e))?;
    }

    for id in &loaded.config.plugins.install {
        if session.registry().contains(id) {
            debug!(plugin = %id, "already installed at boot");
            continue;
        }
        session
            .install_from_catalog(id)
            .map_err(|e| miette!("Failed to install '{}' from config: {}", id, e))?;
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    use crate::config::Config;

    #[test]
    fn test_session_installs_configured_plugins() {
        let mut loaded = LoadedConfig::default();
        loaded.config.plugins.install = vec!["trap".to_string(), "gain".to_string()];

        let session = open_session(&loaded).unwrap();
        assert!(session.registry().contains("trap"));
        assert_eq!(session.registry().len(), 4);
    }

    #[test]
    fn test_session_merges_extra_catalog() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("extra.json"),
            r#"{"plugins": [{
                "implementation": "shout",
                "manifest": {"id": "yell", "name": "Yell", "version": "1.0.0", "category": "flow"}
            }]}"#,
        )
        .unwrap();
        let config_path = dir.path().join("rapgen.toml");
        fs::write(&config_path, "[plugins]\ncatalog = \"extra.json\"\ninstall = [\"yell\"]\n").unwrap();

        let loaded = LoadedConfig {
            config: Config::load(&config_path).unwrap(),
            path: Some(config_path),
        };
        let session = open_session(&loaded).unwrap();
        assert_eq!(session.transform_lyrics("yo", &["yell"]).unwrap(), "YO");
    }

    #[test]
    fn test_unknown_install_fails() {
        let mut loaded = LoadedConfig::default();
        loaded.config.plugins.install = vec!["vaporwave".to_string()];
        assert!(open_session(&loaded).is_err());
    }
}
