use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::encoder::{check_channels, check_span};
use super::quantize::dequantize;
use crate::core::nibble::{is_flagged, packed_nibble, read_u32_be};
use crate::core::{pcm_to_f32, FrameLayout, Header, StreamInfo, WamError, WamResult};
use crate::reader::{self, Reader};
use crate::transform::Mdct;

/// decoded view of one (frame, channel) slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub master_scale: u32,
    pub sub_scales: Vec<u8>,
    /// indices flagged in the bitmap, ascending
    pub selected: Vec<usize>,
    /// 4-bit code of each selected coefficient (at most `frequency_table_size`)
    pub codes: Vec<u8>,
}

/// SMD0 decoder
///
/// Output runs one frame behind the input: the first `frequency_range`
/// samples are lead-in, and sample `i` of the encoder input comes out at
/// position `frequency_range + i`. Reading past the last frame wraps to the
/// first one, which always starts from cleared overlap, so every pass over
/// the stream is identical.
pub struct Decoder<B = Vec<u8>> {
    data: B,
    header: Header,
    layout: FrameLayout,
    mdct: Mdct,
    /// synthesized second half of the previous block per channel, in PCM range
    overlap: Vec<Vec<f64>>,
    coefficients: Vec<f64>,
    /// selection bitmap of the slot being synthesized
    flags: Vec<u32>,
    /// synthesis block (2N)
    block: Vec<f64>,
    current_frame: usize,
    /// decoded frame that `read` has only partly handed out
    remainder: Vec<Vec<f32>>,
    remainder_pos: usize,
    remainder_len: usize,
}

impl<B: AsRef<[u8]>> Decoder<B> {
    /// Parse the header of `data` and get ready to decode from frame 0.
    pub fn new(data: B) -> WamResult<Self> {
        let header = Reader::new().read_header(data.as_ref())?;
        let layout = FrameLayout::from_header(&header)?;
        let n = layout.frequency_range;

        debug!(
            "SMD0 stream: {} Hz, {} ch, N={}, table={}, {} frames",
            header.sampling_rate,
            header.channel_count,
            n,
            header.frequency_table_size,
            header.frame_count
        );

        Ok(Decoder {
            data,
            header,
            layout,
            mdct: Mdct::new(n),
            overlap: vec![vec![0.0; n]; layout.channel_count],
            coefficients: vec![0.0; n],
            flags: vec![0; layout.flag_words()],
            block: vec![0.0; 2 * n],
            current_frame: 0,
            remainder: vec![vec![0.0; n]; layout.channel_count],
            remainder_pos: 0,
            remainder_len: 0,
        })
    }

    /// cheap magic check, no validation
    pub fn is_wam_data(data: &[u8]) -> bool {
        reader::is_wam_data(data)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn sample_rate(&self) -> u32 {
        self.header.sampling_rate
    }

    pub fn channel_count(&self) -> u32 {
        self.header.channel_count
    }

    pub fn frequency_range(&self) -> u32 {
        self.header.frequency_range
    }

    pub fn frequency_table_size(&self) -> u32 {
        self.header.frequency_table_size
    }

    pub fn frame_count(&self) -> u32 {
        self.header.frame_count
    }

    pub fn sample_count(&self) -> u32 {
        self.header.sample_count
    }

    /// index of the frame the next `read_frame` decodes
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn info(&self) -> StreamInfo {
        StreamInfo::from(&self.header)
    }

    pub fn into_inner(self) -> B {
        self.data
    }

    /// Decode one frame into `output[ch][start..start + length]` for every channel.
    ///
    /// Samples past `length` in the frame are dropped; the overlap carried
    /// into the next frame is the same either way. An empty stream yields
    /// silence.
    pub fn read_frame<C: AsMut<[f32]>>(
        &mut self,
        output: &mut [C],
        start: usize,
        length: usize,
    ) -> WamResult<()> {
        let n = self.layout.frequency_range;
        if length > n {
            return Err(WamError::parameter(format!(
                "frame length {} exceeds frequency range {}",
                length, n
            )));
        }
        self.check_output(output, start, length)?;

        if self.header.frame_count == 0 {
            for out in output.iter_mut().take(self.layout.channel_count) {
                out.as_mut()[start..start + length].fill(0.0);
            }
            return Ok(());
        }

        let frame = self.current_frame;
        if frame == 0 {
            // every pass starts from silence
            self.clear_overlap();
        }
        for (ch, out) in output
            .iter_mut()
            .take(self.layout.channel_count)
            .enumerate()
        {
            self.synthesize(frame, ch);

            let out = &mut out.as_mut()[start..start + length];
            for ((dst, &prev), &cur) in out.iter_mut().zip(&self.overlap[ch]).zip(&self.block) {
                *dst = pcm_to_f32(prev + cur);
            }
            self.overlap[ch].copy_from_slice(&self.block[n..]);
        }

        self.current_frame += 1;
        if self.current_frame >= self.header.frame_count as usize {
            trace!("SMD0 stream wrapped after {} frames", self.current_frame);
            self.current_frame = 0;
        }
        Ok(())
    }

    /// Decode `length` samples per channel into `output[ch][start..]`.
    ///
    /// Unlike [`Decoder::read_frame`] the length is free; whole frames are
    /// decoded as needed and any leftover samples are kept for the next call.
    pub fn read<C: AsMut<[f32]>>(
        &mut self,
        output: &mut [C],
        start: usize,
        length: usize,
    ) -> WamResult<()> {
        self.check_output(output, start, length)?;
        let n = self.layout.frequency_range;
        let channels = self.layout.channel_count;
        let mut done = 0;

        if self.remainder_len > 0 {
            let take = self.remainder_len.min(length);
            let from = self.remainder_pos;
            for (out, rest) in output.iter_mut().zip(&self.remainder).take(channels) {
                out.as_mut()[start..start + take].copy_from_slice(&rest[from..from + take]);
            }
            self.remainder_pos += take;
            self.remainder_len -= take;
            done = take;
        }

        while length - done >= n {
            self.read_frame(output, start + done, n)?;
            done += n;
        }

        let rest = length - done;
        if rest > 0 {
            let mut remainder = std::mem::take(&mut self.remainder);
            let decoded = self.read_frame(&mut remainder, 0, n);
            self.remainder = remainder;
            decoded?;

            for (out, buffered) in output.iter_mut().zip(&self.remainder).take(channels) {
                out.as_mut()[start + done..start + length].copy_from_slice(&buffered[..rest]);
            }
            self.remainder_pos = rest;
            self.remainder_len = n - rest;
        }
        Ok(())
    }

    /// Jump to frame `index` (taken modulo the frame count).
    ///
    /// Overlap state and any samples buffered by `read` are discarded, so
    /// the next frame comes out as it does at the start of the stream.
    pub fn seek_frame(&mut self, index: usize) {
        let frames = self.header.frame_count as usize;
        self.current_frame = if frames == 0 { 0 } else { index % frames };
        self.clear_overlap();
        self.remainder_len = 0;
        self.remainder_pos = 0;
    }

    /// Decode the side information of one slot without touching playback state.
    pub fn frame_info(&self, frame: usize, channel: usize) -> WamResult<FrameInfo> {
        if frame >= self.header.frame_count as usize || channel >= self.layout.channel_count {
            return Err(WamError::parameter(format!(
                "no slot for frame {} channel {} ({} frames, {} channels)",
                frame, channel, self.header.frame_count, self.layout.channel_count
            )));
        }

        let slot = self.slot(frame, channel);
        let layout = &self.layout;
        let sub_scales: Vec<u8> = (0..layout.sub_scale_count())
            .map(|band| packed_nibble(slot, layout.sub_scales_offset(), band))
            .collect();
        let mut flags = vec![0; layout.flag_words()];
        read_flags(layout, slot, &mut flags);

        let selected: Vec<usize> = (0..layout.frequency_range)
            .filter(|&k| is_flagged(&flags, k))
            .collect();
        let codes = (0..selected.len().min(layout.frequency_table_size))
            .map(|i| packed_nibble(slot, layout.coefficients_offset(), i))
            .collect();

        Ok(FrameInfo {
            master_scale: read_u32_be(slot, 0),
            sub_scales,
            selected,
            codes,
        })
    }

    fn slot(&self, frame: usize, channel: usize) -> &[u8] {
        let offset = self.layout.frame_offset(frame, channel);
        &self.data.as_ref()[offset..offset + self.layout.stride()]
    }

    /// rebuild the coefficients of (frame, channel) and synthesize `self.block`
    fn synthesize(&mut self, frame: usize, channel: usize) {
        let layout = self.layout;
        let offset = layout.frame_offset(frame, channel);
        let slot = &self.data.as_ref()[offset..offset + layout.stride()];

        let master = read_u32_be(slot, 0) as f64;
        let sub_base = layout.sub_scales_offset();
        read_flags(&layout, slot, &mut self.flags);
        let coef_base = layout.coefficients_offset();

        self.coefficients.fill(0.0);
        let mut index = 0;
        for band in 0..layout.sub_scale_count() {
            let sub_scale = packed_nibble(slot, sub_base, band);
            for k in layout.band_range(band) {
                // a bitmap with more bits than table slots is malformed; ignore the extras
                if index >= layout.frequency_table_size {
                    break;
                }
                if is_flagged(&self.flags, k) {
                    let code = packed_nibble(slot, coef_base, index);
                    self.coefficients[k] = dequantize(code, sub_scale, master);
                    index += 1;
                }
            }
        }

        self.mdct.synthesize(&self.coefficients, &mut self.block);
    }

    fn check_output<C: AsMut<[f32]>>(
        &self,
        output: &mut [C],
        start: usize,
        length: usize,
    ) -> WamResult<()> {
        check_channels(output.len(), self.layout.channel_count)?;
        for out in output.iter_mut().take(self.layout.channel_count) {
            check_span(out.as_mut().len(), start, length)?;
        }
        Ok(())
    }

    fn clear_overlap(&mut self) {
        for overlap in &mut self.overlap {
            overlap.fill(0.0);
        }
    }
}

/// unpack the big-endian bitmap words of `slot`
fn read_flags(layout: &FrameLayout, slot: &[u8], flags: &mut [u32]) {
    let base = layout.flags_offset();
    for (w, word) in flags.iter_mut().enumerate() {
        *word = read_u32_be(slot, base + 4 * w);
    }
}

/// Decode one pass of a stream to interleaved samples.
///
/// The result holds `sample_count` samples per channel, exactly what
/// `frame_count` calls to [`Decoder::read_frame`] produce, lead-in frame
/// included.
pub fn decode_interleaved(data: &[u8]) -> WamResult<Vec<f32>> {
    let mut decoder = Decoder::new(data)?;
    let n = decoder.layout.frequency_range;
    let channels = decoder.layout.channel_count;
    let frames = decoder.header.frame_count as usize;

    let total = frames * n;
    let mut planar = vec![vec![0.0f32; total]; channels];
    for frame in 0..frames {
        decoder.read_frame(&mut planar, frame * n, n)?;
    }

    let mut interleaved = Vec::with_capacity(total * channels);
    for i in 0..total {
        for channel in &planar {
            interleaved.push(channel[i]);
        }
    }
    Ok(interleaved)
}
