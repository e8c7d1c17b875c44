use crate::codec::Decoder;
use crate::core::{WamError, WamResult};

/// Pulls interleaved PCM of any length out of a stream, e.g. to fill an
/// audio device buffer. Loops like [`Decoder`].
pub struct StreamingDecoder<B = Vec<u8>> {
    decoder: Decoder<B>,
    planar: Vec<Vec<f32>>,
}

impl<B: AsRef<[u8]>> StreamingDecoder<B> {
    pub fn new(data: B) -> WamResult<Self> {
        let decoder = Decoder::new(data)?;
        let channels = decoder.channel_count() as usize;
        Ok(Self {
            decoder,
            planar: vec![Vec::new(); channels],
        })
    }

    /// Fill `output` with interleaved samples.
    pub fn read_interleaved(&mut self, output: &mut [f32]) -> WamResult<()> {
        let channels = self.planar.len();
        if output.len() % channels != 0 {
            return Err(WamError::parameter(format!(
                "output of {} samples does not split into {} channels",
                output.len(),
                channels
            )));
        }

        let frames = output.len() / channels;
        for channel in &mut self.planar {
            channel.resize(frames, 0.0);
        }
        self.decoder.read(&mut self.planar, 0, frames)?;

        for (i, chunk) in output.chunks_exact_mut(channels).enumerate() {
            for (dst, channel) in chunk.iter_mut().zip(&self.planar) {
                *dst = channel[i];
            }
        }
        Ok(())
    }

    pub fn decoder(&self) -> &Decoder<B> {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut Decoder<B> {
        &mut self.decoder
    }
}
