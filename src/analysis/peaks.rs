// PeakExtractor - local-maximum detection with adaptive thresholding
//
// Per cycle, replacing all prior results:
// 1. Threshold = mean of the analyzed bins (DC excluded) x 5
// 2. Scan bins 1..=len-2; a peak is >= threshold and strictly greater than
//    both neighbors (bin 0 is the DC term, the last bin has no next
//    neighbor, so neither can be a candidate)
// 3. Collect every peak in ascending bin order
// 4. Maintain the top-K strongest peaks as an insertion-sorted bounded list
//
// The adaptive threshold intentionally supersedes the statically configured
// minimum peak value on every cycle; the configured value only seeds the
// extractor until the first update.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Adaptive threshold = mean of analyzed bins x this multiplier
const THRESHOLD_MULTIPLIER: f32 = 5.0;

/// One detected local maximum of the magnitude spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Frequency bin index
    pub bin: usize,
    /// Magnitude at that bin
    pub value: f32,
}

pub struct PeakExtractor {
    /// Current peak threshold; overwritten with the adaptive value on every
    /// update
    min_peak_value: f32,
    top_capacity: usize,
    /// All peaks of the current cycle, ascending bin order
    peaks: Vec<Peak>,
    /// Top-K peaks of the current cycle, ascending value order
    top: Vec<Peak>,
}

impl PeakExtractor {
    /// Create an extractor retaining at most `top_peaks` strongest peaks.
    ///
    /// `min_peak_value` seeds the threshold; the per-cycle adaptive value
    /// always replaces it.
    pub fn new(min_peak_value: f32, top_peaks: usize) -> Result<Self, ConfigError> {
        if top_peaks == 0 {
            return Err(ConfigError::ZeroTopPeaks);
        }
        Ok(Self {
            min_peak_value,
            top_capacity: top_peaks,
            peaks: Vec::new(),
            top: Vec::with_capacity(top_peaks),
        })
    }

    /// Scan one magnitude spectrum, replacing the previous cycle's results.
    pub fn update(&mut self, spectrum: &[f32]) {
        self.peaks.clear();
        self.top.clear();

        if spectrum.len() < 2 {
            return;
        }

        // DC is excluded from the mean as well as from the scan.
        let analyzed = &spectrum[1..];
        let mean = analyzed.iter().sum::<f32>() / analyzed.len() as f32;
        self.min_peak_value = mean * THRESHOLD_MULTIPLIER;

        for bin in 1..spectrum.len() - 1 {
            let value = spectrum[bin];
            if value >= self.min_peak_value
                && value > spectrum[bin - 1]
                && value > spectrum[bin + 1]
            {
                self.peaks.push(Peak { bin, value });
                self.offer_top(Peak { bin, value });
            }
        }
    }

    /// Insert a peak into the bounded top list, keeping ascending value
    /// order. When full, a new peak only enters by beating the current
    /// smallest retained value, which is dropped.
    fn offer_top(&mut self, peak: Peak) {
        if self.top.len() == self.top_capacity {
            if peak.value <= self.top[0].value {
                return;
            }
            self.top.remove(0);
        }
        let position = self
            .top
            .iter()
            .position(|retained| retained.value > peak.value)
            .unwrap_or(self.top.len());
        self.top.insert(position, peak);
    }

    /// All peaks of the current cycle in ascending bin order.
    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    /// Top-K peaks of the current cycle in ascending value order.
    pub fn top_peaks(&self) -> &[Peak] {
        &self.top
    }

    /// Highest-value retained peak, `None` when the cycle found no peaks.
    pub fn max_peak(&self) -> Option<Peak> {
        self.top.last().copied()
    }

    /// Threshold applied during the most recent update.
    pub fn threshold(&self) -> f32 {
        self.min_peak_value
    }
}
