//! Init command implementation.

use std::fs;
use std::path::Path;

use miette::{Result, miette};

use crate::discovery::CONFIG_NAME;
use crate::output;

const TEMPLATE: &str = r#"# RapGen configuration

[audio]
sample_rate = 44100
default_bpm = 90

[plugins]
# Catalog ids installed on top of boom-bap, shout and gain
install = ["trap", "echo", "echo-last-word"]
# Extra catalog, relative to this file
# catalog = "catalog.json"
slow_plugin_ms = 50

[log]
# Overridden by RUST_LOG
filter = "warn"
"#;

/// Writes a starter `rapgen.toml` in the current directory.
pub fn execute(force: bool) -> Result<()> {
    write_template(Path::new(CONFIG_NAME), force)?;

    output::success(&format!("Created {}", CONFIG_NAME));
    output::info("Run 'rapgen list --available' to browse plugins");
    Ok(())
}

fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(miette!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        ));
    }

    fs::write(path, TEMPLATE).map_err(|e| miette!("Failed to write {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::config::Config;

    #[test]
    fn test_template_is_valid_config() {
        let config = Config::from_toml(TEMPLATE, CONFIG_NAME).unwrap();
        assert_eq!(config.plugins.install, vec!["trap", "echo", "echo-last-word"]);
    }

    #[test]
    fn test_refuses_overwrite_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_NAME);
        fs::write(&path, "# mine").unwrap();

        assert!(write_template(&path, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        write_template(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), TEMPLATE);
    }
}
