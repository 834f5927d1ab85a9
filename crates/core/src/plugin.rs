//! The plugin sum type and the behavior each category provides.

use std::fmt;

use crate::audio::{AudioBuffer, AudioContext};
use crate::error::{PluginError, Result};
use crate::graph::{AudioGraph, NodeId};
use crate::manifest::{PluginCategory, PluginManifest};

/// Produces one rhythmic buffer for a tempo.
pub trait BeatGenerator: Send + Sync {
    /// Generates a finite buffer at `bpm`. May allocate on every call.
    fn generate_buffer(&self, ctx: &AudioContext, bpm: f64) -> AudioBuffer;
}

/// Pure text-to-text transform applied to lyrics.
pub trait LyricTransform: Send + Sync {
    fn transform_lyrics(&self, lyrics: &str) -> String;
}

/// Inserts an effect after `upstream` and returns the effect's output node.
///
/// The effect creates whatever internal nodes it needs inside `graph` and
/// wires `upstream` into them. It must not disconnect `upstream` from
/// anything else.
pub trait AudioEffect: Send + Sync {
    fn apply_effect(&self, graph: &mut AudioGraph, upstream: NodeId) -> Result<NodeId>;
}

impl<F> LyricTransform for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn transform_lyrics(&self, lyrics: &str) -> String {
        self(lyrics)
    }
}

/// A beat plugin: manifest plus generator.
pub struct BeatPlugin {
    pub manifest: PluginManifest,
    pub generator: Box<dyn BeatGenerator>,
}

/// A flow plugin: manifest plus lyric transform.
pub struct FlowPlugin {
    pub manifest: PluginManifest,
    pub transform: Box<dyn LyricTransform>,
}

/// An effect plugin: manifest plus graph transform.
pub struct EffectPlugin {
    pub manifest: PluginManifest,
    pub effect: Box<dyn AudioEffect>,
}

/// A visual plugin. Consumed by the UI; the engine never invokes it.
#[derive(Debug, Clone)]
pub struct VisualPlugin {
    pub manifest: PluginManifest,
}

/// A plugin of any category.
pub enum Plugin {
    Beat(BeatPlugin),
    Flow(FlowPlugin),
    Effect(EffectPlugin),
    Visual(VisualPlugin),
}

impl Plugin {
    pub fn beat(manifest: PluginManifest, generator: impl BeatGenerator + 'static) -> Self {
        Plugin::Beat(BeatPlugin {
            manifest,
            generator: Box::new(generator),
        })
    }

    pub fn flow(manifest: PluginManifest, transform: impl LyricTransform + 'static) -> Self {
        Plugin::Flow(FlowPlugin {
            manifest,
            transform: Box::new(transform),
        })
    }

    pub fn effect(manifest: PluginManifest, effect: impl AudioEffect + 'static) -> Self {
        Plugin::Effect(EffectPlugin {
            manifest,
            effect: Box::new(effect),
        })
    }

    pub fn visual(manifest: PluginManifest) -> Self {
        Plugin::Visual(VisualPlugin { manifest })
    }

    pub fn manifest(&self) -> &PluginManifest {
        match self {
            Plugin::Beat(p) => &p.manifest,
            Plugin::Flow(p) => &p.manifest,
            Plugin::Effect(p) => &p.manifest,
            Plugin::Visual(p) => &p.manifest,
        }
    }

    pub fn id(&self) -> &str {
        &self.manifest().id
    }

    /// The category implied by the variant.
    pub fn category(&self) -> PluginCategory {
        match self {
            Plugin::Beat(_) => PluginCategory::Beat,
            Plugin::Flow(_) => PluginCategory::Flow,
            Plugin::Effect(_) => PluginCategory::Effect,
            Plugin::Visual(_) => PluginCategory::Visual,
        }
    }

    /// Validates the manifest and checks it agrees with the variant.
    pub fn validate(&self) -> Result<()> {
        let manifest = self.manifest();
        manifest.validate()?;

        if manifest.category != self.category() {
            return Err(PluginError::validation(
                "category",
                format!(
                    "manifest of '{}' declares {} but the plugin is a {} plugin",
                    manifest.id,
                    manifest.category,
                    self.category()
                ),
            ));
        }

        Ok(())
    }
}

macro_rules! manifest_debug {
    ($($ty:ident),*) => {$(
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("manifest", &self.manifest)
                    .finish_non_exhaustive()
            }
        }
    )*};
}

manifest_debug!(BeatPlugin, FlowPlugin, EffectPlugin);

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("category", &self.category())
            .field("manifest", self.manifest())
            .finish()
    }
}
