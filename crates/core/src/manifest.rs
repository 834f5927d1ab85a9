//! Plugin manifest and category model.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, Result};

/// The closed set of plugin categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginCategory {
    Beat,
    Flow,
    Effect,
    Visual,
}

impl PluginCategory {
    /// All categories in display order.
    pub const ALL: [PluginCategory; 4] = [
        PluginCategory::Beat,
        PluginCategory::Flow,
        PluginCategory::Effect,
        PluginCategory::Visual,
    ];

    /// Returns the lower-case name used in manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginCategory::Beat => "beat",
            PluginCategory::Flow => "flow",
            PluginCategory::Effect => "effect",
            PluginCategory::Visual => "visual",
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginCategory {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "beat" => Ok(PluginCategory::Beat),
            "flow" => Ok(PluginCategory::Flow),
            "effect" => Ok(PluginCategory::Effect),
            "visual" => Ok(PluginCategory::Visual),
            other => Err(PluginError::validation(
                "category",
                format!("'{}' is not one of beat, flow, effect, visual", other),
            )),
        }
    }
}

/// Identity and metadata record describing a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ManifestRecord")]
pub struct PluginManifest {
    /// Unique plugin id.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Version string (dot-separated segments).
    pub version: String,

    /// Plugin author.
    pub author: String,

    /// Short description shown in the marketplace.
    pub description: String,

    /// Plugin category.
    pub category: PluginCategory,

    /// Optional icon reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Manifest as read from JSON, before the category has been checked.
#[derive(Debug, Deserialize)]
struct ManifestRecord {
    id: String,
    name: String,
    version: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    description: String,
    category: String,
    #[serde(default)]
    icon: Option<String>,
}

impl TryFrom<ManifestRecord> for PluginManifest {
    type Error = PluginError;

    fn try_from(record: ManifestRecord) -> Result<Self> {
        let manifest = PluginManifest {
            id: record.id,
            name: record.name,
            version: record.version,
            author: record.author,
            description: record.description,
            category: record.category.parse()?,
            icon: record.icon,
        };
        manifest.validate()?;
        Ok(manifest)
    }
}

impl PluginManifest {
    /// Creates a manifest with empty author and description.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        category: PluginCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            author: String::new(),
            description: String::new(),
            category,
            icon: None,
        }
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the icon reference.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Checks the id and version fields.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PluginError::validation("id", "plugin id must not be empty"));
        }

        validate_version(&self.version)
    }

    /// Loads a manifest from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses and validates a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: ManifestRecord =
            serde_json::from_str(json).map_err(|e| PluginError::Manifest(e.to_string()))?;
        Self::try_from(record)
    }

    /// Converts the manifest to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PluginError::Manifest(e.to_string()))
    }
}

/// A version is one or more dot-separated segments of `[A-Za-z0-9-]`.
fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        return Err(PluginError::validation(
            "version",
            "version must not be empty",
        ));
    }

    for segment in version.split('.') {
        if segment.is_empty() {
            return Err(PluginError::validation(
                "version",
                format!("'{}' has an empty segment", version),
            ));
        }

        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(PluginError::validation(
                "version",
                format!("'{}' has a malformed segment '{}'", version, segment),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: PluginError) -> &'static str {
        match err {
            PluginError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "id": "trap",
            "name": "Trap Kit",
            "version": "1.2.0",
            "author": "RapGen",
            "description": "Rolling hats and 808s",
            "category": "beat",
            "icon": "drum"
        }"#;

        let manifest = PluginManifest::from_json(json).unwrap();
        assert_eq!(manifest.id, "trap");
        assert_eq!(manifest.category, PluginCategory::Beat);
        assert_eq!(manifest.icon.as_deref(), Some("drum"));
    }

    #[test]
    fn test_unknown_category_names_field() {
        let json = r#"{"id": "x", "name": "X", "version": "1.0", "category": "lyrics"}"#;
        let err = PluginManifest::from_json(json).unwrap_err();
        assert_eq!(field_of(err), "category");
    }

    #[test]
    fn test_empty_id_rejected() {
        let manifest = PluginManifest::new("  ", "Nameless", "1.0.0", PluginCategory::Flow);
        assert_eq!(field_of(manifest.validate().unwrap_err()), "id");
    }

    #[test]
    fn test_version_validation() {
        for good in ["1", "1.0.0", "2.1.0-beta", "0.3.rc1"] {
            let m = PluginManifest::new("p", "P", good, PluginCategory::Effect);
            assert!(m.validate().is_ok(), "{good} should be valid");
        }

        for bad in ["", "1..0", ".1", "1.", "1.0 beta", "v1.0+build"] {
            let m = PluginManifest::new("p", "P", bad, PluginCategory::Effect);
            assert_eq!(field_of(m.validate().unwrap_err()), "version", "{bad:?}");
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = PluginManifest::from_json("{ not json").unwrap_err();
        assert!(matches!(err, PluginError::Manifest(_)));
    }

    #[test]
    fn test_roundtrip_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let manifest = PluginManifest::new("echo", "Echo", "1.0.0", PluginCategory::Effect)
            .with_author("RapGen")
            .with_description("Slap-back delay");
        std::fs::write(&path, manifest.to_json().unwrap()).unwrap();

        let loaded = PluginManifest::from_file(&path).unwrap();
        assert_eq!(loaded, manifest);
        assert!(!manifest.to_json().unwrap().contains("icon"));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("visual".parse::<PluginCategory>().unwrap(), PluginCategory::Visual);
        assert!("Beat".parse::<PluginCategory>().is_err());
    }
}
