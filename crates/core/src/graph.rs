//! Audio node graph that beat and effect plugins build into.
//!
//! The graph is an arena of nodes owned by whoever built it. Nodes are
//! referenced by [`NodeId`] and wired with [`AudioGraph::connect`]. Every
//! graph has exactly one destination node; audio is only heard once
//! something is connected to it.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};
use petgraph::Direction;
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::audio::{AudioBuffer, AudioContext};
use crate::error::{PluginError, Result};

/// Source of per-graph ids stamped into every [`NodeId`].
static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Handle to a node inside an [`AudioGraph`].
///
/// Carries the id of the graph that created it, so a handle is never
/// valid in another graph even when the indices coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    graph: u64,
    index: NodeIndex,
}

impl NodeId {
    /// Position of the node in creation order.
    pub fn index(&self) -> usize {
        self.index.index()
    }
}

/// Frequency response of a filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResponse {
    LowPass,
    HighPass,
    BandPass,
}

impl FilterResponse {
    fn biquad_type(self) -> Type<f32> {
        match self {
            FilterResponse::LowPass => Type::LowPass,
            FilterResponse::HighPass => Type::HighPass,
            FilterResponse::BandPass => Type::BandPass,
        }
    }
}

/// What a node does to the signal reaching it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Plays a buffer; takes no inputs.
    Source { buffer: AudioBuffer, looping: bool },

    /// Multiplies the summed input.
    Gain { gain: f32 },

    /// Delays the input, feeding `feedback` of the output back in.
    Delay { delay_secs: f32, feedback: f32 },

    /// Second-order IIR filter.
    Filter {
        response: FilterResponse,
        cutoff_hz: f32,
        q: f32,
    },

    /// Soft clipper; higher drive means more saturation.
    Shaper { drive: f32 },

    /// The playback destination.
    Destination,
}

/// A node plus the plugin that created it.
#[derive(Debug, Clone)]
pub struct AudioNode {
    kind: NodeKind,
    owner: Option<String>,
}

impl AudioNode {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Id of the plugin that created this node, if any.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

impl fmt::Display for AudioNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Source { buffer, looping } => write!(
                f,
                "source({:.2}s{})",
                buffer.duration_secs(),
                if *looping { ", loop" } else { "" }
            ),
            NodeKind::Gain { gain } => write!(f, "gain({:.2})", gain),
            NodeKind::Delay {
                delay_secs,
                feedback,
            } => write!(f, "delay({:.3}s, fb {:.2})", delay_secs, feedback),
            NodeKind::Filter {
                response,
                cutoff_hz,
                q,
            } => write!(f, "{:?}({:.0}Hz, q {:.2})", response, cutoff_hz, q),
            NodeKind::Shaper { drive } => write!(f, "shaper({:.1})", drive),
            NodeKind::Destination => f.write_str("destination"),
        }
    }
}

/// An acyclic graph of audio nodes ending in a single destination.
#[derive(Debug)]
pub struct AudioGraph {
    id: u64,
    context: AudioContext,
    graph: DiGraph<AudioNode, ()>,
    destination: NodeIndex,
    owner: Option<String>,
}

impl AudioGraph {
    /// Creates an empty graph containing only the destination.
    pub fn new(context: AudioContext) -> Self {
        let mut graph = DiGraph::new();
        let destination = graph.add_node(AudioNode {
            kind: NodeKind::Destination,
            owner: None,
        });

        Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            context,
            graph,
            destination,
            owner: None,
        }
    }

    /// The context this graph renders in.
    pub fn context(&self) -> &AudioContext {
        &self.context
    }

    /// The playback destination node.
    pub fn destination(&self) -> NodeId {
        self.node_id(self.destination)
    }

    fn node_id(&self, index: NodeIndex) -> NodeId {
        NodeId {
            graph: self.id,
            index,
        }
    }

    /// Runs `f` with every node it creates attributed to `owner`.
    pub fn scoped<T>(&mut self, owner: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.owner.replace(owner.to_string());
        let result = f(self);
        self.owner = previous;
        result
    }

    /// Adds a node. The destination cannot be added twice.
    pub fn add_node(&mut self, kind: NodeKind) -> Result<NodeId> {
        if kind == NodeKind::Destination {
            return Err(PluginError::Graph(
                "a graph has exactly one destination".to_string(),
            ));
        }
        Ok(self.insert(kind))
    }

    pub fn add_source(&mut self, buffer: AudioBuffer, looping: bool) -> NodeId {
        self.insert(NodeKind::Source { buffer, looping })
    }

    pub fn add_gain(&mut self, gain: f32) -> NodeId {
        self.insert(NodeKind::Gain { gain })
    }

    pub fn add_delay(&mut self, delay_secs: f32, feedback: f32) -> NodeId {
        self.insert(NodeKind::Delay {
            delay_secs: delay_secs.max(0.0),
            feedback: feedback.clamp(0.0, 0.95),
        })
    }

    pub fn add_filter(&mut self, response: FilterResponse, cutoff_hz: f32, q: f32) -> NodeId {
        self.insert(NodeKind::Filter {
            response,
            cutoff_hz,
            q,
        })
    }

    pub fn add_shaper(&mut self, drive: f32) -> NodeId {
        self.insert(NodeKind::Shaper {
            drive: drive.max(0.0),
        })
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let node = AudioNode {
            kind,
            owner: self.owner.clone(),
        };
        debug!(node = %node, owner = ?node.owner, "adding audio node");
        let index = self.graph.add_node(node);
        self.node_id(index)
    }

    /// Returns true if the node belongs to this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        id.graph == self.id && self.graph.node_weight(id.index).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&AudioNode> {
        if id.graph != self.id {
            return None;
        }
        self.graph.node_weight(id.index)
    }

    /// Number of nodes, destination included.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Connects `from`'s output to `to`'s input.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        for id in [from, to] {
            if !self.contains(id) {
                return Err(PluginError::Graph(format!(
                    "node #{} does not belong to this graph",
                    id.index()
                )));
            }
        }

        if from.index == self.destination {
            return Err(PluginError::Graph(
                "the destination has no output".to_string(),
            ));
        }

        if matches!(self.graph[to.index].kind, NodeKind::Source { .. }) {
            return Err(PluginError::Graph(format!(
                "source node #{} takes no input",
                to.index()
            )));
        }

        if self.graph.find_edge(from.index, to.index).is_some() {
            return Ok(());
        }

        if from == to || has_path_connecting(&self.graph, to.index, from.index, None) {
            return Err(PluginError::Graph(format!(
                "connecting #{} -> #{} would create a cycle",
                from.index(),
                to.index()
            )));
        }

        self.graph.add_edge(from.index, to.index, ());
        Ok(())
    }

    /// Removes the edge between two nodes. Returns false if there was none.
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        match self.graph.find_edge(from.index, to.index) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                true
            }
            None => false,
        }
    }

    /// Removes every edge into the destination.
    pub fn disconnect_destination(&mut self) -> usize {
        let mut removed = 0;
        loop {
            let edge = self
                .graph
                .edges_directed(self.destination, Direction::Incoming)
                .next()
                .map(|e| e.id());

            match edge {
                Some(edge) => {
                    self.graph.remove_edge(edge);
                    removed += 1;
                }
                None => return removed,
            }
        }
    }

    /// Returns true if anything feeds the destination.
    pub fn is_connected_to_destination(&self) -> bool {
        self.graph
            .neighbors_directed(self.destination, Direction::Incoming)
            .next()
            .is_some()
    }

    /// Nodes fed by `id`, in creation order.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.sorted_neighbors(id, Direction::Outgoing)
    }

    /// Nodes feeding `id`, in creation order.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.sorted_neighbors(id, Direction::Incoming)
    }

    fn sorted_neighbors(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut ids: Vec<NodeId> = self
            .graph
            .neighbors_directed(id.index, direction)
            .map(|index| self.node_id(index))
            .collect();
        ids.sort_by_key(|n| n.index());
        ids
    }

    /// All source nodes, in creation order.
    pub fn sources(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|idx| matches!(self.graph[*idx].kind, NodeKind::Source { .. }))
            .map(|index| self.node_id(index))
            .collect()
    }

    /// The longest source-to-destination path, as node ids.
    pub fn longest_path(&self) -> Vec<NodeId> {
        let mut best: Vec<NodeIndex> = Vec::new();
        for source in self.sources() {
            let mut path = vec![source.index];
            self.extend_path(&mut path, self.destination, &mut best);
        }
        best.into_iter().map(|index| self.node_id(index)).collect()
    }

    /// The longest path from `from` to `to`, both included. Empty when `to`
    /// is unreachable.
    pub fn longest_path_between(&self, from: NodeId, to: NodeId) -> Vec<NodeId> {
        if !self.contains(from) || !self.contains(to) {
            return Vec::new();
        }
        let mut best: Vec<NodeIndex> = Vec::new();
        let mut path = vec![from.index];
        self.extend_path(&mut path, to.index, &mut best);
        best.into_iter().map(|index| self.node_id(index)).collect()
    }

    fn extend_path(&self, path: &mut Vec<NodeIndex>, target: NodeIndex, best: &mut Vec<NodeIndex>) {
        let Some(&last) = path.last() else {
            return;
        };

        if last == target {
            if path.len() > best.len() {
                *best = path.clone();
            }
            return;
        }

        for next in self.successors(self.node_id(last)) {
            path.push(next.index);
            self.extend_path(path, target, best);
            path.pop();
        }
    }

    /// Length in frames of one pass through the graph.
    pub fn frames(&self) -> usize {
        self.graph
            .node_weights()
            .filter_map(|node| match &node.kind {
                NodeKind::Source { buffer, .. } => Some(buffer.len()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Renders one pass of the graph into the destination.
    ///
    /// Nodes are processed in topological order; a node's input is the sum
    /// of its predecessors' outputs.
    pub fn render(&self) -> Result<AudioBuffer> {
        let frames = self.frames();
        let order = toposort(&self.graph, None)
            .map_err(|_| PluginError::Graph("cycle detected while rendering".to_string()))?;

        let mut outputs: HashMap<NodeIndex, Vec<f32>> = HashMap::new();

        for idx in order {
            let mut input = vec![0.0_f32; frames];
            for pred in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if let Some(signal) = outputs.get(&pred) {
                    for (acc, s) in input.iter_mut().zip(signal) {
                        *acc += s;
                    }
                }
            }

            let output = self.process(&self.graph[idx].kind, input)?;
            outputs.insert(idx, output);
        }

        let mixed = outputs.remove(&self.destination).unwrap_or_default();
        Ok(AudioBuffer::new(self.context.sample_rate(), mixed))
    }

    fn process(&self, kind: &NodeKind, mut signal: Vec<f32>) -> Result<Vec<f32>> {
        match kind {
            NodeKind::Source { buffer, .. } => {
                signal.fill(0.0);
                buffer.mix_into(&mut signal);
            }
            NodeKind::Gain { gain } => {
                signal.iter_mut().for_each(|s| *s *= gain);
            }
            NodeKind::Delay {
                delay_secs,
                feedback,
            } => {
                let offset = self.context.frames_for(*delay_secs as f64);
                if offset > 0 {
                    let mut delayed = vec![0.0_f32; signal.len()];
                    for i in offset..signal.len() {
                        delayed[i] = signal[i - offset] + feedback * delayed[i - offset];
                    }
                    signal = delayed;
                }
            }
            NodeKind::Filter {
                response,
                cutoff_hz,
                q,
            } => {
                let fs = self.context.sample_rate() as f32;
                let cutoff = cutoff_hz.clamp(1.0, fs * 0.49);
                let coeffs = Coefficients::<f32>::from_params(
                    response.biquad_type(),
                    fs.hz(),
                    cutoff.hz(),
                    q.max(0.01),
                )
                .map_err(|e| PluginError::Graph(format!("invalid filter: {:?}", e)))?;
                let mut filter = DirectForm2Transposed::<f32>::new(coeffs);
                signal.iter_mut().for_each(|s| *s = filter.run(*s));
            }
            NodeKind::Shaper { drive } => {
                if *drive > 0.0 {
                    let norm = drive.tanh();
                    signal
                        .iter_mut()
                        .for_each(|s| *s = (*s * drive).tanh() / norm);
                }
            }
            NodeKind::Destination => {}
        }
        Ok(signal)
    }

    /// Renders the graph in Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph audio {\n  rankdir=LR;\n  node [shape=box];\n\n");

        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            let label = match &node.owner {
                Some(owner) => format!("{}\\n{}", owner, node),
                None => node.to_string(),
            };
            out.push_str(&format!("  n{} [label=\"{}\"];\n", idx.index(), label));
        }

        for edge in self.graph.edge_references() {
            out.push_str(&format!(
                "  n{} -> n{};\n",
                edge.source().index(),
                edge.target().index()
            ));
        }

        out.push_str("}\n");
        out
    }
}
