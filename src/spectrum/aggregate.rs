//! MagnitudeAggregator - per-bin reduction of the spectrum history
//!
//! Each analysis cycle reduces every frequency bin across all history slots
//! into one real-valued magnitude spectrum. The reduction is a configuration
//! choice: `min` keeps only energy present in every recent block and so acts
//! as a noise-floor estimate that suppresses single-block transients; `avg`
//! and `max` trade stability for responsiveness.

use serde::{Deserialize, Serialize};

use crate::spectrum::SpectrumHistory;

/// Per-bin reduction applied across the history window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    /// Minimum magnitude across slots (noise-spike suppression, default)
    Min,
    /// Mean magnitude across slots
    Avg,
    /// Maximum magnitude across slots
    Max,
}

pub struct MagnitudeAggregator {
    reduction: Reduction,
}

impl MagnitudeAggregator {
    pub fn new(reduction: Reduction) -> Self {
        Self { reduction }
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// Compute the magnitude spectrum for the current history contents.
    ///
    /// The caller must hold the history mutex for the duration of this call
    /// so the pass observes a consistent snapshot relative to any in-flight
    /// write. Pure function of that snapshot: calling it twice with no
    /// intervening write yields identical results.
    ///
    /// Magnitude is the Euclidean norm `sqrt(re*re + im*im)`. Slots that
    /// have not been written yet hold all-zero spectra and reduce to zero,
    /// which produces no peaks downstream.
    pub fn compute(&self, history: &SpectrumHistory) -> Vec<f32> {
        let slots = history.slots();
        let mut spectrum = Vec::with_capacity(history.bins());

        for bin in 0..history.bins() {
            let magnitudes = slots.iter().map(|slot| slot[bin].norm());
            let value = match self.reduction {
                Reduction::Min => magnitudes.fold(f32::INFINITY, f32::min),
                Reduction::Avg => magnitudes.sum::<f32>() / slots.len() as f32,
                Reduction::Max => magnitudes.fold(0.0_f32, f32::max),
            };
            spectrum.push(value);
        }

        spectrum
    }
}
