//! Builds audio graphs from a beat and an ordered effect chain.

use std::time::Duration;

use rapgen_core::{AudioContext, AudioGraph, MAX_BPM, MIN_BPM, PluginError};
use rapgen_plugin::PluginRegistry;
use tracing::{debug, info};

use crate::error::Result;
use crate::invoke::{DEFAULT_SLOW_PLUGIN, invoke};
use crate::playback::GraphHandle;

/// What to build: a beat at a tempo followed by effects in order.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioGraphSpec {
    /// Id of the beat plugin.
    pub beat_id: String,

    /// Tempo in beats per minute, within `MIN_BPM..=MAX_BPM`.
    pub bpm: f64,

    /// Effect plugin ids, applied left to right.
    pub effect_ids: Vec<String>,

    /// Whether the beat loops until stopped.
    pub looping: bool,
}

impl AudioGraphSpec {
    /// Creates a looping spec with no effects.
    pub fn new(beat_id: impl Into<String>, bpm: f64) -> Self {
        Self {
            beat_id: beat_id.into(),
            bpm,
            effect_ids: Vec::new(),
            looping: true,
        }
    }

    /// Appends an effect to the chain.
    pub fn with_effect(mut self, id: impl Into<String>) -> Self {
        self.effect_ids.push(id.into());
        self
    }

    /// Replaces the effect chain.
    pub fn with_effects<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.effect_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets looping.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    fn validate(&self) -> rapgen_core::Result<()> {
        if !(MIN_BPM..=MAX_BPM).contains(&self.bpm) {
            return Err(PluginError::validation(
                "bpm",
                format!("{} is outside {}..={}", self.bpm, MIN_BPM, MAX_BPM),
            ));
        }
        Ok(())
    }
}

/// Resolves plugins through a registry and wires them into a graph.
pub struct GraphComposer<'a> {
    /// Registry plugins are resolved from.
    registry: &'a PluginRegistry,

    /// Host audio context handed to plugins.
    context: AudioContext,

    /// Plugin calls slower than this are logged.
    slow_plugin: Duration,
}

impl<'a> GraphComposer<'a> {
    /// Creates a composer for the given registry and context.
    pub fn new(registry: &'a PluginRegistry, context: AudioContext) -> Self {
        Self {
            registry,
            context,
            slow_plugin: DEFAULT_SLOW_PLUGIN,
        }
    }

    /// Sets the slow-plugin warning threshold.
    pub fn with_slow_plugin_threshold(mut self, threshold: Duration) -> Self {
        self.slow_plugin = threshold;
        self
    }

    /// Builds a graph for `spec`.
    ///
    /// Nothing is connected to the destination until every plugin has
    /// resolved and applied; any failure drops the partial graph.
    pub fn build(&self, spec: &AudioGraphSpec) -> Result<GraphHandle> {
        spec.validate()?;

        let beat = self.registry.resolve_beat(&spec.beat_id)?;
        let buffer = invoke(&spec.beat_id, "generate_buffer", self.slow_plugin, || {
            beat.generator.generate_buffer(&self.context, spec.bpm)
        });
        debug!(
            beat = %spec.beat_id,
            bpm = spec.bpm,
            frames = buffer.len(),
            "generated beat buffer"
        );

        let mut graph = AudioGraph::new(self.context);
        let source = graph.scoped(&spec.beat_id, |g| g.add_source(buffer, spec.looping));

        let mut tail = source;
        for id in &spec.effect_ids {
            let effect = self.registry.resolve_effect(id)?;

            let output = invoke(id, "apply_effect", self.slow_plugin, || {
                graph.scoped(id, |g| effect.effect.apply_effect(g, tail))
            })
            .map_err(|e| match e {
                PluginError::Effect { .. } => e,
                other => PluginError::Effect {
                    id: id.clone(),
                    reason: other.to_string(),
                },
            })?;

            if !graph.contains(output) {
                return Err(PluginError::Effect {
                    id: id.clone(),
                    reason: "returned a node from another graph".to_string(),
                }
                .into());
            }

            tail = output;
        }

        let destination = graph.destination();
        graph.connect(tail, destination)?;

        info!(
            beat = %spec.beat_id,
            bpm = spec.bpm,
            effects = ?spec.effect_ids,
            nodes = graph.node_count(),
            "built audio graph"
        );

        Ok(GraphHandle::new(graph, source, tail, spec.looping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rapgen_core::{
        AudioBuffer, AudioEffect, BeatGenerator, NodeId, Plugin, PluginCategory, PluginManifest,
    };

    use crate::error::EngineError;

    /// Beat that returns `bpm` samples of 1.0 and counts its calls.
    struct Counter {
        calls: Arc<AtomicUsize>,
        bpm_seen: Arc<std::sync::Mutex<Vec<f64>>>,
    }

    impl BeatGenerator for Counter {
        fn generate_buffer(&self, ctx: &AudioContext, bpm: f64) -> AudioBuffer {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bpm_seen.lock().unwrap().push(bpm);
            AudioBuffer::new(ctx.sample_rate(), vec![1.0; bpm as usize])
        }
    }

    struct Scale(f32);

    impl AudioEffect for Scale {
        fn apply_effect(&self, graph: &mut AudioGraph, upstream: NodeId) -> rapgen_core::Result<NodeId> {
            let gain = graph.add_gain(self.0);
            graph.connect(upstream, gain)?;
            Ok(gain)
        }
    }

    struct Broken;

    impl AudioEffect for Broken {
        fn apply_effect(&self, graph: &mut AudioGraph, upstream: NodeId) -> rapgen_core::Result<NodeId> {
            // Feeding the destination directly is not allowed to leak out.
            graph.connect(upstream, graph.destination())?;
            Err(PluginError::Graph("boom".to_string()))
        }
    }

    struct Foreign;

    impl AudioEffect for Foreign {
        fn apply_effect(&self, _graph: &mut AudioGraph, _upstream: NodeId) -> rapgen_core::Result<NodeId> {
            let mut other = AudioGraph::new(AudioContext::default());
            for _ in 0..16 {
                other.add_gain(1.0);
            }
            Ok(other.add_gain(1.0))
        }
    }

    /// Mutes the signal, then hands back a node from a throwaway graph
    /// whose index matches the beat source.
    struct Impostor;

    impl AudioEffect for Impostor {
        fn apply_effect(&self, graph: &mut AudioGraph, upstream: NodeId) -> rapgen_core::Result<NodeId> {
            let mute = graph.add_gain(0.0);
            graph.connect(upstream, mute)?;
            let mut other = AudioGraph::new(AudioContext::default());
            Ok(other.add_gain(1.0))
        }
    }

    fn manifest(id: &str, category: PluginCategory) -> PluginManifest {
        PluginManifest::new(id, id, "1.0.0", category)
    }

    struct Fixture {
        registry: PluginRegistry,
        calls: Arc<AtomicUsize>,
        bpm_seen: Arc<std::sync::Mutex<Vec<f64>>>,
    }

    fn fixture() -> Fixture {
        let calls = Arc::new(AtomicUsize::new(0));
        let bpm_seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = PluginRegistry::new();

        registry
            .register(Plugin::beat(
                manifest("count", PluginCategory::Beat),
                Counter {
                    calls: calls.clone(),
                    bpm_seen: bpm_seen.clone(),
                },
            ))
            .unwrap();
        registry
            .register(Plugin::effect(manifest("half", PluginCategory::Effect), Scale(0.5)))
            .unwrap();
        registry
            .register(Plugin::effect(manifest("triple", PluginCategory::Effect), Scale(3.0)))
            .unwrap();
        registry
            .register(Plugin::effect(manifest("broken", PluginCategory::Effect), Broken))
            .unwrap();
        registry
            .register(Plugin::effect(manifest("foreign", PluginCategory::Effect), Foreign))
            .unwrap();
        registry
            .register(Plugin::effect(manifest("impostor", PluginCategory::Effect), Impostor))
            .unwrap();
        registry
            .register(Plugin::flow(manifest("words", PluginCategory::Flow), |s: &str| {
                s.to_string()
            }))
            .unwrap();

        Fixture {
            registry,
            calls,
            bpm_seen,
        }
    }

    fn ctx() -> AudioContext {
        AudioContext::new(1000).unwrap()
    }

    fn unresolved_id(err: EngineError) -> String {
        match err {
            EngineError::Plugin(PluginError::PluginResolution { id, .. }) => id,
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_beat_fails_naming_id() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let err = composer.build(&AudioGraphSpec::new("ghost", 90.0)).unwrap_err();
        assert_eq!(unresolved_id(err), "ghost");
        assert_eq!(fx.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_effect_fails_naming_id() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());
        let spec = AudioGraphSpec::new("count", 90.0).with_effects(["half", "missing", "triple"]);

        assert_eq!(unresolved_id(composer.build(&spec).unwrap_err()), "missing");
    }

    #[test]
    fn test_wrong_category_is_resolution_error() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let beat_is_flow = AudioGraphSpec::new("words", 90.0);
        assert_eq!(unresolved_id(composer.build(&beat_is_flow).unwrap_err()), "words");

        let effect_is_beat = AudioGraphSpec::new("count", 90.0).with_effect("count");
        assert_eq!(unresolved_id(composer.build(&effect_is_beat).unwrap_err()), "count");
    }

    #[test]
    fn test_bpm_forwarded_unmodified() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let handle = composer.build(&AudioGraphSpec::new("count", 97.5)).unwrap();
        assert_eq!(*fx.bpm_seen.lock().unwrap(), vec![97.5]);
        assert_eq!(handle.graph().frames(), 97);
    }

    #[test]
    fn test_invalid_bpm() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        for bpm in [0.0, -120.0, 1e-9, 0.5, 999.5, 1e12, f64::NAN, f64::INFINITY] {
            let err = composer.build(&AudioGraphSpec::new("count", bpm)).unwrap_err();
            assert!(matches!(
                err,
                EngineError::Plugin(PluginError::Validation { field: "bpm", .. })
            ));
        }
        assert_eq!(fx.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_bpm_range_is_inclusive() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        assert!(composer.build(&AudioGraphSpec::new("count", MIN_BPM)).is_ok());
        assert!(composer.build(&AudioGraphSpec::new("count", MAX_BPM)).is_ok());
        assert_eq!(*fx.bpm_seen.lock().unwrap(), vec![MIN_BPM, MAX_BPM]);
    }

    #[test]
    fn test_effects_wired_in_order() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let handle = composer
            .build(&AudioGraphSpec::new("count", 60.0).with_effects(["half", "triple"]))
            .unwrap();
        let graph = handle.graph();

        let after_source = graph.successors(handle.source());
        assert_eq!(after_source.len(), 1);
        assert_eq!(graph.node(after_source[0]).unwrap().owner(), Some("half"));

        let after_half = graph.successors(after_source[0]);
        assert_eq!(graph.node(after_half[0]).unwrap().owner(), Some("triple"));
        assert_eq!(after_half[0], handle.tail());
        assert_eq!(graph.successors(handle.tail()), vec![graph.destination()]);

        assert_eq!(
            handle.signal_chain(),
            vec!["count", "half", "triple", "destination"]
        );
    }

    #[test]
    fn test_reversed_effects_change_neighbor() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let forward = composer
            .build(&AudioGraphSpec::new("count", 60.0).with_effects(["half", "triple"]))
            .unwrap();
        let reversed = composer
            .build(&AudioGraphSpec::new("count", 60.0).with_effects(["triple", "half"]))
            .unwrap();

        let neighbor = |h: &GraphHandle| {
            let next = h.graph().successors(h.source())[0];
            h.graph().node(next).unwrap().owner().map(str::to_string)
        };

        assert_eq!(neighbor(&forward).as_deref(), Some("half"));
        assert_eq!(neighbor(&reversed).as_deref(), Some("triple"));
    }

    #[test]
    fn test_duplicate_effects_are_kept() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let mut handle = composer
            .build(&AudioGraphSpec::new("count", 4.0).with_effects(["half", "half"]))
            .unwrap();
        handle.play().unwrap();
        assert_eq!(handle.pull(4), vec![0.25; 4]);
    }

    #[test]
    fn test_failing_effect_aborts_build() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let err = composer
            .build(&AudioGraphSpec::new("count", 60.0).with_effect("broken"))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Plugin(PluginError::Effect { ref id, .. }) if id == "broken"
        ));
    }

    #[test]
    fn test_foreign_node_rejected() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let err = composer
            .build(&AudioGraphSpec::new("count", 60.0).with_effect("foreign"))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Plugin(PluginError::Effect { ref id, .. }) if id == "foreign"
        ));
    }

    #[test]
    fn test_foreign_node_with_source_index_rejected() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let err = composer
            .build(&AudioGraphSpec::new("count", 4.0).with_effect("impostor"))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Plugin(PluginError::Effect { ref id, .. }) if id == "impostor"
        ));
    }

    #[test]
    fn test_graphs_are_independent() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let mut first = composer.build(&AudioGraphSpec::new("count", 8.0)).unwrap();
        first.play().unwrap();
        let mut second = composer
            .build(&AudioGraphSpec::new("count", 8.0).with_effect("half"))
            .unwrap();
        second.play().unwrap();

        first.stop();
        assert!(!first.is_playing());
        assert!(second.is_playing());
        assert_eq!(second.pull(2), vec![0.5, 0.5]);
        assert_eq!(fx.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stop_twice() {
        let fx = fixture();
        let composer = GraphComposer::new(&fx.registry, ctx());

        let mut handle = composer.build(&AudioGraphSpec::new("count", 8.0)).unwrap();
        handle.play().unwrap();
        handle.stop();
        handle.stop();
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_graph_survives_unregister() {
        let mut fx = fixture();
        let mut handle = {
            let composer = GraphComposer::new(&fx.registry, ctx());
            composer
                .build(&AudioGraphSpec::new("count", 4.0).with_effect("half"))
                .unwrap()
        };

        fx.registry.unregister("half").unwrap();
        fx.registry.unregister("count").unwrap();

        handle.play().unwrap();
        assert_eq!(handle.pull(4), vec![0.5; 4]);
    }
}
