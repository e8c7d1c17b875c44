use crate::codec::Encoder;
use crate::core::{WamError, WamResult};

/// Encoder for interleaved PCM arriving in chunks of any length.
///
/// Samples are de-interleaved and held until a full block of
/// `frequency_range` per channel is available; `finish` encodes whatever is
/// left as a final short frame.
pub struct StreamingEncoder {
    encoder: Encoder,
    pending: Vec<Vec<f32>>,
    block_size: usize,
    total_samples: u64,
    expected_samples: u64,
}

impl StreamingEncoder {
    /// Create a new streaming encoder
    pub fn new(
        sample_rate: u32,
        channels: u32,
        frequency_range: u32,
        frequency_table_size: u32,
    ) -> WamResult<Self> {
        Self::with_expected_samples(sample_rate, channels, frequency_range, frequency_table_size, 0)
    }

    /// Like `new`, sizing the output for `expected_samples` per channel and
    /// reporting progress against it
    pub fn with_expected_samples(
        sample_rate: u32,
        channels: u32,
        frequency_range: u32,
        frequency_table_size: u32,
        expected_samples: usize,
    ) -> WamResult<Self> {
        let encoder = Encoder::new(
            sample_rate,
            channels,
            frequency_range,
            frequency_table_size,
            expected_samples,
        )?;
        let block_size = frequency_range as usize;

        Ok(Self {
            encoder,
            pending: vec![Vec::with_capacity(block_size); channels as usize],
            block_size,
            total_samples: 0,
            expected_samples: expected_samples as u64,
        })
    }

    /// Push interleaved samples; returns the number of frames encoded by this call.
    pub fn push_interleaved(&mut self, samples: &[f32]) -> WamResult<usize> {
        let channels = self.pending.len();
        if samples.len() % channels != 0 {
            return Err(WamError::parameter(format!(
                "{} samples do not split into {} channels",
                samples.len(),
                channels
            )));
        }

        let mut frames = 0;
        for chunk in samples.chunks_exact(channels) {
            for (pending, &sample) in self.pending.iter_mut().zip(chunk) {
                pending.push(sample);
            }
            if self.pending[0].len() == self.block_size {
                self.encoder
                    .write_frame(&self.pending, 0, self.block_size)?;
                for pending in &mut self.pending {
                    pending.clear();
                }
                frames += 1;
            }
        }
        self.total_samples += (samples.len() / channels) as u64;
        Ok(frames)
    }

    /// Get number of pending samples per channel
    pub fn pending_samples(&self) -> usize {
        self.pending[0].len()
    }

    pub fn frames_written(&self) -> u32 {
        self.encoder.frame_count()
    }

    /// samples per channel pushed so far
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// fraction of the expected samples pushed, 0 when nothing was expected
    pub fn progress(&self) -> f32 {
        if self.expected_samples == 0 {
            return 0.0;
        }
        (self.total_samples as f64 / self.expected_samples as f64).min(1.0) as f32
    }

    /// encode the pending tail and return the finished stream
    pub fn finish(mut self) -> WamResult<Vec<u8>> {
        let tail = self.pending_samples();
        if tail > 0 {
            self.encoder.write_frame(&self.pending, 0, tail)?;
        }
        Ok(self.encoder.finish())
    }
}

/// encode interleaved samples in one call
pub fn encode_interleaved(
    samples: &[f32],
    sample_rate: u32,
    channels: u32,
    frequency_range: u32,
    frequency_table_size: u32,
) -> WamResult<Vec<u8>> {
    if channels == 0 {
        return Err(WamError::parameter("channel count must be greater than 0"));
    }
    let mut encoder = StreamingEncoder::with_expected_samples(
        sample_rate,
        channels,
        frequency_range,
        frequency_table_size,
        samples.len() / channels as usize,
    )?;
    encoder.push_interleaved(samples)?;
    encoder.finish()
}
