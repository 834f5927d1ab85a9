//! Install command implementation.

use std::fs;

use miette::{Result, miette};

use crate::commands::open_session;
use crate::config::LoadedConfig;
use crate::output;

/// Installs catalog ids into a session and optionally records them in the
/// config file.
pub fn execute(loaded: &LoadedConfig, ids: &[String], save: bool) -> Result<()> {
    let mut session = open_session(loaded)?;

    for id in ids {
        session
            .install_from_catalog(id)
            .map_err(|e| miette!("Failed to install '{}': {}", id, e))?;
        let name = session
            .registry()
            .get(id)
            .map(|p| p.manifest().name.clone())
            .unwrap_or_default();
        output::success(&format!("Installed {} ({})", id, name));
    }

    if save {
        save_install_list(loaded, ids)?;
    }

    let installed: Vec<_> = session
        .list_plugins(None)
        .iter()
        .map(|m| m.id.as_str())
        .collect();
    output::info(&format!("Installed plugins: {}", installed.join(", ")));
    Ok(())
}

fn save_install_list(loaded: &LoadedConfig, ids: &[String]) -> Result<()> {
    let path = loaded
        .path
        .as_ref()
        .ok_or_else(|| miette!("No rapgen.toml found. Run 'rapgen init' first"))?;

    let mut config = loaded.config.clone();
    for id in ids {
        if !config.plugins.install.contains(id) {
            config.plugins.install.push(id.clone());
        }
    }

    fs::write(path, config.to_toml()?)
        .map_err(|e| miette!("Failed to write {}: {}", path.display(), e))?;
    output::success(&format!("Saved install list to {}", path.display()));
    Ok(())
}
