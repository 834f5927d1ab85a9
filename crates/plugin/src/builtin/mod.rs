//! Plugins that ship with RapGen.
//!
//! Implementations are looked up by key; manifests live in the catalog so
//! the marketplace can list them before they are installed.

pub mod beats;
pub mod effects;
pub mod flows;

use rapgen_core::{Plugin, PluginError, PluginManifest, Result};

use beats::DrumMachine;

/// Plugins installed into every new session.
pub const BOOT_PLUGINS: [&str; 3] = ["boom-bap", "shout", "gain"];

/// Every implementation key this build knows about.
pub const IMPLEMENTATIONS: [&str; 13] = [
    "boom-bap",
    "trap",
    "drill",
    "shout",
    "echo-last-word",
    "stanza-break",
    "ad-lib",
    "gain",
    "echo",
    "lofi",
    "distortion",
    "telephone",
    "visual",
];

/// Returns true if `key` names a built-in implementation.
pub fn is_known(key: &str) -> bool {
    IMPLEMENTATIONS.contains(&key)
}

/// Binds a manifest to the built-in implementation named by `key`.
pub fn instantiate(key: &str, manifest: PluginManifest) -> Result<Plugin> {
    let plugin = match key {
        "boom-bap" => Plugin::beat(manifest, DrumMachine::new(beats::BOOM_BAP, 0xB00B)),
        "trap" => Plugin::beat(manifest, DrumMachine::new(beats::TRAP, 0x808)),
        "drill" => Plugin::beat(manifest, DrumMachine::new(beats::DRILL, 0xD1)),

        "shout" => Plugin::flow(manifest, flows::Shout),
        "echo-last-word" => Plugin::flow(manifest, flows::EchoLastWord),
        "stanza-break" => Plugin::flow(manifest, flows::StanzaBreak::default()),
        "ad-lib" => Plugin::flow(manifest, flows::AdLib::default()),

        "gain" => Plugin::effect(manifest, effects::Gain { level: 0.8 }),
        "echo" => Plugin::effect(manifest, effects::Echo::default()),
        "lofi" => Plugin::effect(manifest, effects::LoFi::default()),
        "distortion" => Plugin::effect(manifest, effects::Distortion::default()),
        "telephone" => Plugin::effect(manifest, effects::Telephone),

        "visual" => Plugin::visual(manifest),

        other => return Err(PluginError::UnknownImplementation(other.to_string())),
    };

    Ok(plugin)
}
