//! Offline runner - drive the pipeline from a WAV file
//!
//! Feeds a WAV file through the identical history/analysis pipeline, one
//! analysis cycle per block, with a synthetic clock advancing by the block
//! duration. Deterministic end-to-end runs without audio hardware.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::analysis::AnalysisWorker;
use crate::config::AnalyzerConfig;
use crate::spectrum::SpectrumHistory;

/// Read a WAV file as mono f32 blocks of exactly `samples_per_block`
/// samples. Multi-channel files keep channel 0; a trailing partial block is
/// dropped.
pub fn read_blocks(path: &Path, samples_per_block: usize) -> Result<Vec<Vec<f32>>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("opening WAV file {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        bail!("WAV file {} declares zero channels", path.display());
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("reading float samples")?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()
                .context("reading integer samples")?
        }
    };

    let mono: Vec<f32> = samples.iter().step_by(channels).copied().collect();
    Ok(mono
        .chunks_exact(samples_per_block)
        .map(|block| block.to_vec())
        .collect())
}

/// Run the full pipeline over a WAV file.
///
/// Each block is written to the history and immediately followed by one
/// analysis cycle, so detections appear as soon as the history window
/// supports them. Returns the number of processed blocks.
pub fn run_wav(
    path: &Path,
    history: &Arc<Mutex<SpectrumHistory>>,
    worker: &mut AnalysisWorker,
    config: &AnalyzerConfig,
    started: Instant,
) -> Result<usize> {
    let blocks = read_blocks(path, config.samples_per_block)?;
    if blocks.is_empty() {
        bail!(
            "WAV file {} is shorter than one block ({} samples)",
            path.display(),
            config.samples_per_block
        );
    }

    let step = Duration::from_secs_f64(config.block_duration_secs());
    let mut clock = started;
    for block in &blocks {
        {
            let mut history = history
                .lock()
                .map_err(|_| anyhow::anyhow!("spectrum history lock poisoned"))?;
            history.write(block);
        }
        worker.run_cycle(clock).context("analysis cycle failed")?;
        clock += step;
    }

    log::info!("processed {} blocks from {}", blocks.len(), path.display());
    Ok(blocks.len())
}
