// BlockAssembler - fixed-size block staging for the capture callback
//
// cpal makes no promise about callback buffer sizes, but the spectrum ring
// only accepts exact samples_per_block blocks. The assembler accumulates
// incoming samples (channel 0 of interleaved frames) and emits a callback
// per completed block. The staging buffer is allocated once; nothing
// allocates on the audio thread after construction.

pub struct BlockAssembler {
    staging: Vec<f32>,
    samples_per_block: usize,
}

impl BlockAssembler {
    pub fn new(samples_per_block: usize) -> Self {
        Self {
            staging: Vec::with_capacity(samples_per_block),
            samples_per_block,
        }
    }

    /// Feed interleaved frames, invoking `on_block` for every completed
    /// block. Only channel 0 is kept; the remainder stays staged for the
    /// next call.
    pub fn push_interleaved<F>(&mut self, data: &[f32], channels: usize, mut on_block: F)
    where
        F: FnMut(&[f32]),
    {
        debug_assert!(channels > 0);
        for frame in data.chunks(channels) {
            self.staging.push(frame[0]);
            if self.staging.len() == self.samples_per_block {
                on_block(&self.staging);
                self.staging.clear();
            }
        }
    }

    /// Samples currently staged for the next block.
    pub fn pending(&self) -> usize {
        self.staging.len()
    }
}
