//! Host audio context and sample buffers.

use crate::error::{PluginError, Result};

/// Default sample rate used when the host does not specify one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Slowest tempo a graph may be built at, in beats per minute.
pub const MIN_BPM: f64 = 1.0;

/// Fastest tempo a graph may be built at, in beats per minute.
pub const MAX_BPM: f64 = 999.0;

/// The host audio context handed to plugins.
///
/// Plugins read the sample rate from it; the context owns no nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioContext {
    sample_rate: u32,
}

impl AudioContext {
    /// Creates a context running at the given sample rate.
    pub fn new(sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(PluginError::validation(
                "sample_rate",
                "sample rate must be greater than zero",
            ));
        }
        Ok(Self { sample_rate })
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames covering `secs` seconds.
    pub fn frames_for(&self, secs: f64) -> usize {
        (secs * self.sample_rate as f64).round().max(0.0) as usize
    }

    /// Allocates a silent buffer of the given length.
    pub fn create_buffer(&self, frames: usize) -> AudioBuffer {
        AudioBuffer::silence(self.sample_rate, frames)
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// A finite mono buffer of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    samples: Vec<f32>,
}

impl AudioBuffer {
    /// Creates a buffer from raw samples.
    pub fn new(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    /// Creates a silent buffer.
    pub fn silence(sample_rate: u32, frames: usize) -> Self {
        Self::new(sample_rate, vec![0.0; frames])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()))
    }

    /// Adds this buffer into `target`, sample by sample.
    ///
    /// Extra samples on either side are ignored.
    pub fn mix_into(&self, target: &mut [f32]) {
        for (out, s) in target.iter_mut().zip(&self.samples) {
            *out += s;
        }
    }
}
