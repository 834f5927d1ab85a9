//! Playback control for a built audio graph.

use rapgen_core::{AudioBuffer, AudioGraph, NodeId, NodeKind};
use tracing::debug;

use crate::error::{EngineError, Result};

/// Lifecycle of a graph handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Built and connected, not yet started.
    Ready,
    /// Producing audio.
    Playing,
    /// A non-looping source ran out.
    Finished,
    /// Stopped; the destination is disconnected and audio released.
    Stopped,
}

/// Opaque playback handle returned by a successful graph build.
///
/// The handle owns every node of its graph. The host's audio clock drives
/// it by calling [`GraphHandle::pull`] for each block.
#[derive(Debug)]
pub struct GraphHandle {
    graph: AudioGraph,
    source: NodeId,
    tail: NodeId,
    looping: bool,
    state: PlaybackState,
    rendered: Option<AudioBuffer>,
    cursor: usize,
}

impl GraphHandle {
    pub(crate) fn new(graph: AudioGraph, source: NodeId, tail: NodeId, looping: bool) -> Self {
        Self {
            graph,
            source,
            tail,
            looping,
            state: PlaybackState::Ready,
            rendered: None,
            cursor: 0,
        }
    }

    /// Starts playback from the beginning of the bar.
    ///
    /// Playing an already-playing graph does nothing. A stopped graph has
    /// released its audio and cannot be restarted.
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing => return Ok(()),
            PlaybackState::Stopped => return Err(EngineError::Released),
            PlaybackState::Ready | PlaybackState::Finished => {}
        }

        if self.rendered.is_none() {
            let rendered = self.graph.render()?;
            debug!(
                frames = rendered.len(),
                peak = rendered.peak(),
                "rendered audio graph"
            );
            self.rendered = Some(rendered);
        }

        self.cursor = 0;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Stops playback and disconnects the graph from the destination.
    ///
    /// Safe to call any number of times, including after playback has
    /// finished on its own.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Stopped {
            return;
        }

        let detached = self.graph.disconnect_destination();
        self.rendered = None;
        self.cursor = 0;
        self.state = PlaybackState::Stopped;
        debug!(detached, "stopped audio graph");
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Produces the next `frames` samples. Silence when not playing.
    pub fn pull(&mut self, frames: usize) -> Vec<f32> {
        let mut block = vec![0.0_f32; frames];

        if self.state != PlaybackState::Playing {
            return block;
        }

        let Some(rendered) = self.rendered.as_ref() else {
            return block;
        };
        let samples = rendered.samples();

        let mut written = 0;
        while written < frames {
            if self.cursor >= samples.len() {
                if self.looping && !samples.is_empty() {
                    self.cursor = 0;
                } else {
                    self.state = PlaybackState::Finished;
                    break;
                }
            }

            let n = (frames - written).min(samples.len() - self.cursor);
            block[written..written + n].copy_from_slice(&samples[self.cursor..self.cursor + n]);
            written += n;
            self.cursor += n;
        }

        if !self.looping && self.cursor >= samples.len() {
            self.state = PlaybackState::Finished;
        }

        block
    }

    /// The underlying graph, for inspection.
    pub fn graph(&self) -> &AudioGraph {
        &self.graph
    }

    /// The node wrapping the beat buffer.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// The last node before the destination.
    pub fn tail(&self) -> NodeId {
        self.tail
    }

    /// Plugins along the signal path, from beat to destination.
    ///
    /// Walks from the source to the tail, so the chain is still reported
    /// after [`GraphHandle::stop`] has detached the destination.
    pub fn signal_chain(&self) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        let path = self.graph.longest_path_between(self.source, self.tail);

        for id in path.into_iter().chain([self.graph.destination()]) {
            let Some(node) = self.graph.node(id) else {
                continue;
            };
            let label = match (node.owner(), node.kind()) {
                (Some(owner), _) => owner.to_string(),
                (None, NodeKind::Destination) => "destination".to_string(),
                (None, _) => node.to_string(),
            };
            if chain.last() != Some(&label) {
                chain.push(label);
            }
        }

        chain
    }

    /// Graphviz rendering of the graph.
    pub fn to_dot(&self) -> String {
        self.graph.to_dot()
    }
}

impl Drop for GraphHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
