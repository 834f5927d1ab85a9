//! Config file discovery.

use std::path::{Path, PathBuf};

/// Project config file name.
pub const CONFIG_NAME: &str = "rapgen.toml";

/// Finds the project config, searching from the current directory upwards
/// and then the user config directory.
pub fn find_config() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_from(&cwd))
        .or_else(|| user_config_path().filter(|p| p.is_file()))
}

/// Finds `rapgen.toml` in `start` or any of its parents.
pub fn find_config_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_NAME))
        .find(|candidate| candidate.is_file())
}

/// Per-user config: `<config dir>/rapgen/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rapgen").join("config.toml"))
}

/// Directory relative paths in a config file are resolved against.
pub fn base_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_config_in_current() {
        let dir = tempdir().unwrap();
        let config = dir.path().join(CONFIG_NAME);
        fs::write(&config, "").unwrap();

        assert_eq!(find_config_from(dir.path()), Some(config));
    }

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempdir().unwrap();
        let config = dir.path().join(CONFIG_NAME);
        fs::write(&config, "").unwrap();

        let nested = dir.path().join("verses").join("drafts");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_from(&nested), Some(config));
    }

    #[test]
    fn test_directory_named_like_config_is_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(CONFIG_NAME)).unwrap();

        let found = find_config_from(dir.path());
        assert_ne!(found, Some(dir.path().join(CONFIG_NAME)));
    }

    #[test]
    fn test_base_dir() {
        assert_eq!(
            base_dir(Path::new("/studio/album/rapgen.toml")),
            Path::new("/studio/album")
        );
    }
}
