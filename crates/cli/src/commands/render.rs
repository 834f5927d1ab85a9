//! Render command implementation.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use miette::{Result, miette};
use rapgen_engine::{AudioGraphSpec, GraphHandle};
use tracing::debug;

use crate::commands::open_session;
use crate::config::LoadedConfig;
use crate::output;

/// Frames pulled from the graph per block.
const BLOCK_FRAMES: usize = 4096;

/// What a render produced.
#[derive(Debug)]
struct Rendered {
    frames: usize,
    sample_rate: u32,
    chain: Vec<String>,
}

/// Renders `loops` bars of a beat through `effects` into a WAV file.
pub fn execute(
    loaded: &LoadedConfig,
    beat: &str,
    bpm: f64,
    effects: &[String],
    loops: usize,
    out: &Path,
) -> Result<()> {
    let rendered = render(loaded, beat, bpm, effects, loops, out)?;

    output::success(&format!(
        "Rendered {} ({:.2}s, {})",
        out.display(),
        rendered.frames as f64 / f64::from(rendered.sample_rate),
        rendered.chain.join(" → ")
    ));
    Ok(())
}

fn render(
    loaded: &LoadedConfig,
    beat: &str,
    bpm: f64,
    effects: &[String],
    loops: usize,
    out: &Path,
) -> Result<Rendered> {
    if loops == 0 {
        return Err(miette!("--loops must be at least 1"));
    }

    let session = open_session(loaded)?;
    let spec = AudioGraphSpec::new(beat, bpm).with_effects(effects.iter().cloned());
    let mut handle = session
        .build_audio_graph(&spec)
        .map_err(|e| miette!("Failed to build audio graph: {}", e))?;

    let sample_rate = session.context().sample_rate();
    let frames = handle
        .graph()
        .frames()
        .checked_mul(loops)
        .ok_or_else(|| miette!("--loops {} is too long to render", loops))?;

    let chain = handle.signal_chain();
    write_wav(&mut handle, sample_rate, frames, out)?;
    handle.stop();

    Ok(Rendered {
        frames,
        sample_rate,
        chain,
    })
}

/// Pulls `frames` samples from a playing handle into a mono float WAV.
fn write_wav(handle: &mut GraphHandle, sample_rate: u32, frames: usize, out: &Path) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(out, spec)
        .map_err(|e| miette!("Failed to create {}: {}", out.display(), e))?;

    handle
        .play()
        .map_err(|e| miette!("Failed to start playback: {}", e))?;

    let mut remaining = frames;
    while remaining > 0 {
        let n = remaining.min(BLOCK_FRAMES);
        for sample in handle.pull(n) {
            writer
                .write_sample(sample)
                .map_err(|e| miette!("Failed to write {}: {}", out.display(), e))?;
        }
        remaining -= n;
    }

    writer
        .finalize()
        .map_err(|e| miette!("Failed to finalize {}: {}", out.display(), e))?;
    debug!(frames, path = %out.display(), "wrote wav");
    Ok(())
}
