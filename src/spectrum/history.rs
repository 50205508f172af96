// SpectrumHistory - fixed-capacity ring of transformed audio blocks
//
// One slot per recent capture block, each holding the complex forward FFT
// of that block. The ring is the only state shared between the capture
// callback and the analysis loop; callers wrap it in Arc<Mutex<...>> and
// hold the lock for the whole write (copy + in-place transform), so a
// reader never observes a partially transformed slot.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::ConfigError;

pub struct SpectrumHistory {
    /// Ring slots, allocated once at construction; never reallocated
    slots: Vec<Vec<Complex<f32>>>,
    /// Monotonically increasing write counter; slot = counter % capacity
    counter: u64,
    samples_per_block: usize,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumHistory {
    /// Create a history ring holding `history_size` spectra of
    /// `samples_per_block` bins each.
    ///
    /// The forward FFT is planned here and applied in place on every write.
    /// Degenerate capacities are rejected up front so the aggregator never
    /// has to reason about an empty or single-bin spectrum.
    pub fn new(history_size: usize, samples_per_block: usize) -> Result<Self, ConfigError> {
        if history_size == 0 {
            return Err(ConfigError::ZeroHistorySize);
        }
        if samples_per_block < 2 {
            return Err(ConfigError::BlockTooShort {
                samples: samples_per_block,
            });
        }

        let fft = FftPlanner::new().plan_fft_forward(samples_per_block);
        let scratch = vec![Complex::default(); fft.get_inplace_scratch_len()];

        Ok(Self {
            slots: vec![vec![Complex::default(); samples_per_block]; history_size],
            counter: 0,
            samples_per_block,
            fft,
            scratch,
        })
    }

    /// Write one captured block into the next ring slot.
    ///
    /// Copies the real samples into the slot (imaginary part zero), runs the
    /// forward FFT in place on that slot, then advances the counter. Block
    /// length is fixed at startup; a mismatch here is a programming error,
    /// not a runtime condition.
    pub fn write(&mut self, block: &[f32]) {
        debug_assert_eq!(block.len(), self.samples_per_block, "block length mismatch");

        let slot = (self.counter % self.slots.len() as u64) as usize;
        for (bin, &sample) in self.slots[slot].iter_mut().zip(block.iter()) {
            *bin = Complex::new(sample, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.slots[slot], &mut self.scratch);
        self.counter += 1;
    }

    /// Configured ring capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots that have been written at least once.
    pub fn len(&self) -> usize {
        self.counter.min(self.slots.len() as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }

    /// Number of frequency bins per spectrum (= block length).
    pub fn bins(&self) -> usize {
        self.samples_per_block
    }

    /// Slot index of the most recent write, if any.
    pub fn last_written_slot(&self) -> Option<usize> {
        if self.counter == 0 {
            None
        } else {
            Some(((self.counter - 1) % self.slots.len() as u64) as usize)
        }
    }

    /// All ring slots, including not-yet-written (all-zero) ones.
    pub fn slots(&self) -> &[Vec<Complex<f32>>] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_history_size() {
        assert!(matches!(
            SpectrumHistory::new(0, 8),
            Err(ConfigError::ZeroHistorySize)
        ));
    }

    #[test]
    fn test_rejects_single_sample_block() {
        assert!(matches!(
            SpectrumHistory::new(3, 1),
            Err(ConfigError::BlockTooShort { samples: 1 })
        ));
    }

    #[test]
    fn test_ring_invariant_after_wrapping() {
        // After N writes to a ring of capacity C, the last written slot is
        // (N-1) % C and exactly min(N, C) writes are represented.
        let mut history = SpectrumHistory::new(3, 8).unwrap();
        assert!(history.is_empty());
        assert_eq!(history.last_written_slot(), None);

        for n in 1..=5u64 {
            let block = vec![n as f32; 8];
            history.write(&block);
            assert_eq!(history.last_written_slot(), Some(((n - 1) % 3) as usize));
            assert_eq!(history.len(), n.min(3) as usize);
        }
        assert_eq!(history.capacity(), 3);
    }

    #[test]
    fn test_write_transforms_in_place() {
        // A constant block concentrates all energy in the DC bin: the
        // transform of [c; N] has magnitude N*c at bin 0 and ~0 elsewhere.
        let mut history = SpectrumHistory::new(1, 8).unwrap();
        history.write(&[0.5; 8]);

        let slot = &history.slots()[0];
        assert!((slot[0].norm() - 4.0).abs() < 1e-4);
        for bin in slot.iter().skip(1) {
            assert!(bin.norm() < 1e-4);
        }
    }

    #[test]
    fn test_old_slots_survive_until_overwritten() {
        // Writes land in distinct slots until the ring wraps; the 4th write
        // overwrites the 1st.
        let mut history = SpectrumHistory::new(3, 8).unwrap();
        for n in 1..=4 {
            history.write(&[n as f32; 8]);
        }

        // DC magnitudes identify which block occupies which slot.
        let dc: Vec<f32> = history.slots().iter().map(|s| s[0].norm()).collect();
        assert!((dc[0] - 32.0).abs() < 1e-3); // block 4 replaced block 1
        assert!((dc[1] - 16.0).abs() < 1e-3); // block 2
        assert!((dc[2] - 24.0).abs() < 1e-3); // block 3
    }
}
