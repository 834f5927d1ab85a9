//! Audio effects built from graph nodes.

use rapgen_core::{AudioEffect, AudioGraph, FilterResponse, NodeId, Result};

const Q_BUTTERWORTH: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Volume control.
#[derive(Debug, Clone, Copy)]
pub struct Gain {
    pub level: f32,
}

impl AudioEffect for Gain {
    fn apply_effect(&self, graph: &mut AudioGraph, upstream: NodeId) -> Result<NodeId> {
        let gain = graph.add_gain(self.level);
        graph.connect(upstream, gain)?;
        Ok(gain)
    }
}

/// Feedback delay mixed with the dry signal.
#[derive(Debug, Clone, Copy)]
pub struct Echo {
    pub delay_secs: f32,
    pub feedback: f32,
    pub wet: f32,
}

impl Default for Echo {
    fn default() -> Self {
        Self {
            delay_secs: 0.18,
            feedback: 0.35,
            wet: 0.45,
        }
    }
}

impl AudioEffect for Echo {
    fn apply_effect(&self, graph: &mut AudioGraph, upstream: NodeId) -> Result<NodeId> {
        let delay = graph.add_delay(self.delay_secs, self.feedback);
        let wet = graph.add_gain(self.wet);
        let mix = graph.add_gain(1.0);

        graph.connect(upstream, mix)?;
        graph.connect(upstream, delay)?;
        graph.connect(delay, wet)?;
        graph.connect(wet, mix)?;
        Ok(mix)
    }
}

/// Dark low-passed tone with a little saturation.
#[derive(Debug, Clone, Copy)]
pub struct LoFi {
    pub cutoff_hz: f32,
}

impl Default for LoFi {
    fn default() -> Self {
        Self { cutoff_hz: 3200.0 }
    }
}

impl AudioEffect for LoFi {
    fn apply_effect(&self, graph: &mut AudioGraph, upstream: NodeId) -> Result<NodeId> {
        let filter = graph.add_filter(FilterResponse::LowPass, self.cutoff_hz, Q_BUTTERWORTH);
        let warmth = graph.add_shaper(1.5);

        graph.connect(upstream, filter)?;
        graph.connect(filter, warmth)?;
        Ok(warmth)
    }
}

/// Hard saturation followed by make-down gain.
#[derive(Debug, Clone, Copy)]
pub struct Distortion {
    pub drive: f32,
}

impl Default for Distortion {
    fn default() -> Self {
        Self { drive: 6.0 }
    }
}

impl AudioEffect for Distortion {
    fn apply_effect(&self, graph: &mut AudioGraph, upstream: NodeId) -> Result<NodeId> {
        let shaper = graph.add_shaper(self.drive);
        let trim = graph.add_gain(0.6);

        graph.connect(upstream, shaper)?;
        graph.connect(shaper, trim)?;
        Ok(trim)
    }
}

/// Narrow band-limited "phone line" sound.
#[derive(Debug, Clone, Copy, Default)]
pub struct Telephone;

impl AudioEffect for Telephone {
    fn apply_effect(&self, graph: &mut AudioGraph, upstream: NodeId) -> Result<NodeId> {
        let low_cut = graph.add_filter(FilterResponse::HighPass, 400.0, Q_BUTTERWORTH);
        let high_cut = graph.add_filter(FilterResponse::LowPass, 3000.0, Q_BUTTERWORTH);
        let grit = graph.add_shaper(2.0);

        graph.connect(upstream, low_cut)?;
        graph.connect(low_cut, high_cut)?;
        graph.connect(high_cut, grit)?;
        Ok(grit)
    }
}
