//! `rapgen.toml` configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::{Diagnostic, NamedSource, SourceSpan};
use rapgen_core::{DEFAULT_SAMPLE_RATE, MAX_BPM, MIN_BPM};
use rapgen_engine::SessionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::discovery;

/// Errors raised while loading a config file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    #[diagnostic(code(rapgen::config::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {message}")]
    #[diagnostic(code(rapgen::config::parse))]
    Parse {
        message: String,

        #[source_code]
        src: NamedSource<String>,

        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid config value for {field}: {reason}")]
    #[diagnostic(code(rapgen::config::value))]
    Value { field: &'static str, reason: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub audio: AudioSettings,
    pub plugins: PluginSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioSettings {
    /// Host sample rate in Hz.
    pub sample_rate: u32,

    /// Tempo used when `--bpm` is not given.
    pub default_bpm: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            default_bpm: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginSettings {
    /// Catalog ids installed on top of the boot plugins.
    pub install: Vec<String>,

    /// Extra catalog file, relative to the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Plugin calls slower than this many milliseconds are logged.
    pub slow_plugin_ms: u64,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            install: Vec::new(),
            catalog: None,
            slow_plugin_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Parses and validates config text. `name` labels diagnostics.
    pub fn from_toml(src: &str, name: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(src).map_err(|e| ConfigError::Parse {
            message: e.message().to_string(),
            src: NamedSource::new(name, src.to_string()),
            span: e.span().map(SourceSpan::from),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&src, &path.display().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.sample_rate == 0 {
            return Err(ConfigError::Value {
                field: "audio.sample_rate",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(MIN_BPM..=MAX_BPM).contains(&self.audio.default_bpm) {
            return Err(ConfigError::Value {
                field: "audio.default_bpm",
                reason: format!("must be within {}..={}", MIN_BPM, MAX_BPM),
            });
        }
        Ok(())
    }

    /// Session settings derived from this config.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            sample_rate: self.audio.sample_rate,
            slow_plugin_threshold: Duration::from_millis(self.plugins.slow_plugin_ms),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Value {
            field: "config",
            reason: e.to_string(),
        })
    }
}

/// A config together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Loads `explicit` if given, otherwise the discovered config, otherwise
    /// defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discovery::find_config(),
        };

        match path {
            Some(path) => {
                let config = Config::load(&path)?;
                debug!(path = %path.display(), "loaded config");
                Ok(Self {
                    config,
                    path: Some(path),
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Extra catalog path resolved against the config file's directory.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        let catalog = self.config.plugins.catalog.as_ref()?;
        if catalog.is_absolute() {
            return Some(catalog.clone());
        }
        let base = self
            .path
            .as_deref()
            .map(discovery::base_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Some(base.join(catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("", "rapgen.toml").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.audio.sample_rate, 44_100);
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn test_full_config() {
        let src = r#"
[audio]
sample_rate = 48000
default_bpm = 140

[plugins]
install = ["trap", "echo"]
catalog = "extra.json"
slow_plugin_ms = 10

[log]
filter = "rapgen_engine=debug"
"#;
        let config = Config::from_toml(src, "rapgen.toml").unwrap();
        assert_eq!(config.audio.sample_rate, 48_000);
        assert_eq!(config.audio.default_bpm, 140.0);
        assert_eq!(config.plugins.install, vec!["trap", "echo"]);
        assert_eq!(
            config.session().slow_plugin_threshold,
            Duration::from_millis(10)
        );
    }

    #[test]
    fn test_parse_error_has_span() {
        let err = Config::from_toml("[audio]\nsample_rate = \"fast\"\n", "rapgen.toml").unwrap_err();
        match err {
            ConfigError::Parse { span, .. } => assert!(span.is_some()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            Config::from_toml("[audio]\ntempo = 90\n", "rapgen.toml"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_toml("[audio]\nsample_rate = 0\n", "rapgen.toml"),
            Err(ConfigError::Value { field: "audio.sample_rate", .. })
        ));
        assert!(matches!(
            Config::from_toml("[audio]\ndefault_bpm = -1.0\n", "rapgen.toml"),
            Err(ConfigError::Value { field: "audio.default_bpm", .. })
        ));
        assert!(matches!(
            Config::from_toml("[audio]\ndefault_bpm = 1e-9\n", "rapgen.toml"),
            Err(ConfigError::Value { field: "audio.default_bpm", .. })
        ));
    }

    #[test]
    fn test_toml_roundtrip_keeps_install_list() {
        let mut config = Config::default();
        config.plugins.install.push("drill".to_string());

        let back = Config::from_toml(&config.to_toml().unwrap(), "rapgen.toml").unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_resolve_explicit_and_catalog_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[plugins]\ncatalog = \"more/catalog.json\"\n").unwrap();

        let loaded = LoadedConfig::resolve(Some(&path)).unwrap();
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert_eq!(
            loaded.catalog_path(),
            Some(dir.path().join("more").join("catalog.json"))
        );
    }

    #[test]
    fn test_resolve_missing_explicit_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            LoadedConfig::resolve(Some(&dir.path().join("nope.toml"))),
            Err(ConfigError::Io { .. })
        ));
    }
}
