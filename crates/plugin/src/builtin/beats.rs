//! Drum-machine beat generators.
//!
//! Each beat is one bar of 4/4 on a 16-step grid. Voices are synthesized
//! directly into the bar buffer; noise comes from a seeded RNG so the same
//! bpm always yields the same samples.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rapgen_core::{AudioBuffer, AudioContext, BeatGenerator, MAX_BPM, MIN_BPM};

/// Steps per bar.
const STEPS: usize = 16;

/// Output is scaled down if the mix peaks above this.
const HEADROOM: f32 = 0.9;

/// A 16-step pattern per voice; `x` marks a hit.
#[derive(Debug, Clone, Copy)]
pub struct DrumPattern {
    pub kick: &'static str,
    pub snare: &'static str,
    pub hat: &'static str,
    pub sub: &'static str,
}

pub const BOOM_BAP: DrumPattern = DrumPattern {
    kick: "x......x..x.....",
    snare: "....x.......x...",
    hat: "x.x.x.x.x.x.x.x.",
    sub: "................",
};

pub const TRAP: DrumPattern = DrumPattern {
    kick: "x.....x....x....",
    snare: "........x.......",
    hat: "xxxxxxxxxxxxxxxx",
    sub: "x.....x....x....",
};

pub const DRILL: DrumPattern = DrumPattern {
    kick: "x..x......x.....",
    snare: "......x.......x.",
    hat: "x.xx.xx.x.xx.xx.",
    sub: "x..x......x...x.",
};

/// Renders a [`DrumPattern`] at any tempo.
#[derive(Debug, Clone)]
pub struct DrumMachine {
    pattern: DrumPattern,
    seed: u64,
}

impl DrumMachine {
    pub fn new(pattern: DrumPattern, seed: u64) -> Self {
        Self { pattern, seed }
    }
}

impl BeatGenerator for DrumMachine {
    fn generate_buffer(&self, ctx: &AudioContext, bpm: f64) -> AudioBuffer {
        // Out-of-range tempos would size the bar without bound.
        let beat_secs = 60.0 / bpm.clamp(MIN_BPM, MAX_BPM);
        let frames = ctx.frames_for(4.0 * beat_secs);
        let step_secs = beat_secs / 4.0;
        let sample_rate = ctx.sample_rate() as f32;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut bar = vec![0.0_f32; frames];

        let voices: [(&str, Voice); 4] = [
            (self.pattern.kick, Voice::Kick),
            (self.pattern.snare, Voice::Snare),
            (self.pattern.hat, Voice::Hat),
            (self.pattern.sub, Voice::Sub),
        ];

        for (steps, voice) in voices {
            for (step, _) in steps.chars().take(STEPS).enumerate().filter(|(_, c)| *c == 'x') {
                let start = ctx.frames_for(step as f64 * step_secs);
                voice.strike(&mut bar[start.min(frames)..], sample_rate, &mut rng);
            }
        }

        let peak = bar.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        if peak > HEADROOM {
            let scale = HEADROOM / peak;
            bar.iter_mut().for_each(|s| *s *= scale);
        }

        AudioBuffer::new(ctx.sample_rate(), bar)
    }
}

#[derive(Debug, Clone, Copy)]
enum Voice {
    Kick,
    Snare,
    Hat,
    Sub,
}

impl Voice {
    /// Adds one hit to the start of `out`, truncated at the bar end.
    fn strike(self, out: &mut [f32], sample_rate: f32, rng: &mut StdRng) {
        let (length_secs, decay_secs) = match self {
            Voice::Kick => (0.35, 0.08),
            Voice::Snare => (0.2, 0.05),
            Voice::Hat => (0.05, 0.012),
            Voice::Sub => (0.7, 0.25),
        };

        let length = ((length_secs * sample_rate) as usize).min(out.len());
        let mut phase = 0.0_f32;
        let mut last_noise = 0.0_f32;

        for (i, slot) in out.iter_mut().take(length).enumerate() {
            let t = i as f32 / sample_rate;
            let envelope = (-t / decay_secs).exp();

            let sample = match self {
                Voice::Kick => {
                    let freq = 45.0 + 75.0 * (-t / 0.03).exp();
                    phase += TAU * freq / sample_rate;
                    phase.sin() * 0.9
                }
                Voice::Snare => {
                    phase += TAU * 180.0 / sample_rate;
                    rng.gen_range(-1.0_f32..1.0) * 0.5 + phase.sin() * 0.25
                }
                Voice::Hat => {
                    let noise = rng.gen_range(-1.0_f32..1.0);
                    let bright = noise - last_noise;
                    last_noise = noise;
                    bright * 0.2
                }
                Voice::Sub => {
                    phase += TAU * 55.0 / sample_rate;
                    phase.sin() * 0.6
                }
            };

            *slot += sample * envelope;
        }
    }
}
