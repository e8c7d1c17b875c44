use log::debug;

use super::quantize::{coefficient_power, quantize, sub_scale_code};
use super::selection::select_coefficients;
use crate::core::nibble::{is_flagged, set_packed_nibble, write_u32_be};
use crate::core::{f32_to_pcm, FrameLayout, Header, WamError, WamResult, HEADER_SIZE};
use crate::transform::Mdct;
use crate::writer::Writer;

/// SMD0 encoder
///
/// Feed planar PCM with [`Encoder::write_frame`], one block of up to
/// `frequency_range` samples per channel at a time, then take the stream
/// with [`Encoder::finish`].
pub struct Encoder {
    header: Header,
    layout: FrameLayout,
    writer: Writer,
    mdct: Mdct,
    /// previous input half-block per channel, in PCM range
    history: Vec<Vec<f64>>,
    /// analysis block (2N)
    block: Vec<f64>,
    frame: FrameScratch,
}

impl Encoder {
    /// Create an encoder.
    ///
    /// `expected_sample_count` (per channel) only sizes the initial buffer;
    /// the stream grows past it as needed.
    pub fn new(
        sample_rate: u32,
        channel_count: u32,
        frequency_range: u32,
        frequency_table_size: u32,
        expected_sample_count: usize,
    ) -> WamResult<Self> {
        if sample_rate == 0 {
            return Err(WamError::parameter("sample rate must be greater than 0"));
        }
        let layout = FrameLayout::new(channel_count, frequency_range, frequency_table_size)?;
        let header = Header::new(
            sample_rate,
            channel_count,
            frequency_range,
            frequency_table_size,
        );

        let n = layout.frequency_range;
        let expected_frames = expected_sample_count.div_ceil(n);
        let capacity = layout.stream_size(expected_frames).unwrap_or(HEADER_SIZE);
        let mut writer = Writer::with_capacity(capacity);
        writer.write_header(&header);

        debug!(
            "SMD0 encoder: {} Hz, {} ch, N={}, table={}, stride={} bytes",
            sample_rate,
            channel_count,
            n,
            frequency_table_size,
            layout.stride()
        );

        Ok(Encoder {
            header,
            layout,
            writer,
            mdct: Mdct::new(n),
            history: vec![vec![0.0; n]; layout.channel_count],
            block: vec![0.0; 2 * n],
            frame: FrameScratch::new(&layout),
        })
    }

    /// Encode one frame from `input[ch][start..start + length]` of every channel.
    ///
    /// `length` may be anything in `0..=frequency_range`; short blocks are
    /// padded with silence. Samples are expected in `[-1, 1]` and are clamped.
    pub fn write_frame<C: AsRef<[f32]>>(
        &mut self,
        input: &[C],
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
        check_channels(input.len(), self.layout.channel_count)?;
        for samples in &input[..self.layout.channel_count] {
            check_span(samples.as_ref().len(), start, length)?;
        }

        let frame = self.header.frame_count as usize;
        check_capacity(&self.layout, frame + 1)?;
        let stride = self.layout.stride();

        for (ch, samples) in input.iter().take(self.layout.channel_count).enumerate() {
            let samples = &samples.as_ref()[start..start + length];

            let (past, current) = self.block.split_at_mut(n);
            past.copy_from_slice(&self.history[ch]);
            for (dst, &s) in current.iter_mut().zip(samples) {
                *dst = f32_to_pcm(s);
            }
            current[length..].fill(0.0);
            self.history[ch].copy_from_slice(current);

            self.mdct.analyze(&self.block, &mut self.frame.coefficients);

            let offset = self.layout.frame_offset(frame, ch);
            let slot = self.writer.slot_mut(offset, stride);
            self.frame.encode(&self.layout, slot);
        }

        self.header.frame_count += 1;
        Ok(())
    }

    /// frames written so far
    pub fn frame_count(&self) -> u32 {
        self.header.frame_count
    }

    /// current header, with `frame_count` live and the totals filled in by
    /// [`Encoder::data_buffer`] or [`Encoder::finish`]
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Patch the header totals and return the stream so far.
    ///
    /// Encoding may continue afterwards.
    pub fn data_buffer(&mut self) -> &[u8] {
        self.patch_header();
        self.writer.as_bytes()
    }

    /// patch the header and return the finished stream
    pub fn finish(mut self) -> Vec<u8> {
        self.patch_header();
        debug!(
            "SMD0 encoder finished: {} frames, {} bytes",
            self.header.frame_count, self.header.data_size
        );
        self.writer.finish()
    }

    fn patch_header(&mut self) {
        let frames = self.header.frame_count;
        // both totals fit, write_frame refuses frames that would not
        self.header.sample_count = self.header.frequency_range * frames;
        self.header.data_size = self.writer.len() as u32;
        self.writer.write_header(&self.header);
    }
}

/// per-frame working buffers, reused for every channel
struct FrameScratch {
    coefficients: Vec<f64>,
    powers: Vec<f64>,
    flags: Vec<u32>,
    sub_scales: Vec<u8>,
}

impl FrameScratch {
    fn new(layout: &FrameLayout) -> Self {
        FrameScratch {
            coefficients: vec![0.0; layout.frequency_range],
            powers: vec![0.0; layout.frequency_range],
            flags: vec![0; layout.flag_words()],
            sub_scales: vec![0; layout.sub_scale_count()],
        }
    }

    /// quantize `self.coefficients` into a zeroed frame slot
    fn encode(&mut self, layout: &FrameLayout, slot: &mut [u8]) {
        let peak = self
            .coefficients
            .iter()
            .fold(0.0f64, |acc, c| acc.max(c.abs()));
        // stored rounded up so it bounds every coefficient
        let master_scale = peak.ceil() as u32;
        let master = master_scale as f64;

        for (band, code) in self.sub_scales.iter_mut().enumerate() {
            let band_peak = self.coefficients[layout.band_range(band)]
                .iter()
                .fold(0.0f64, |acc, c| acc.max(c.abs()));
            *code = sub_scale_code(band_peak, master);
        }

        for (band, &code) in self.sub_scales.iter().enumerate() {
            for k in layout.band_range(band) {
                self.powers[k] = coefficient_power(self.coefficients[k], master, code);
            }
        }

        select_coefficients(
            &mut self.powers,
            layout.frequency_table_size,
            &mut self.flags,
        );

        write_u32_be(slot, 0, master_scale);

        let sub_base = layout.sub_scales_offset();
        for (band, &code) in self.sub_scales.iter().enumerate() {
            set_packed_nibble(slot, sub_base, band, code);
        }

        let flags_base = layout.flags_offset();
        for (w, &word) in self.flags.iter().enumerate() {
            write_u32_be(slot, flags_base + 4 * w, word);
        }

        let coef_base = layout.coefficients_offset();
        let mut index = 0;
        for (band, &code) in self.sub_scales.iter().enumerate() {
            for k in layout.band_range(band) {
                if is_flagged(&self.flags, k) {
                    let value = quantize(self.coefficients[k], master, code);
                    set_packed_nibble(slot, coef_base, index, value);
                    index += 1;
                }
            }
        }
    }
}

/// Refuse a frame count whose stream size or sample count would not fit the
/// 32-bit header fields.
pub(crate) fn check_capacity(layout: &FrameLayout, frame_count: usize) -> WamResult<()> {
    let size_fits = layout
        .stream_size(frame_count)
        .is_some_and(|size| size <= u32::MAX as usize);
    let samples_fit = layout
        .frequency_range
        .checked_mul(frame_count)
        .is_some_and(|samples| samples <= u32::MAX as usize);
    if !size_fits || !samples_fit {
        return Err(WamError::parameter(format!(
            "{} frames of {} channels at N={} exceed the 32-bit stream limits",
            frame_count, layout.channel_count, layout.frequency_range
        )));
    }
    Ok(())
}

pub(crate) fn check_channels(given: usize, expected: usize) -> WamResult<()> {
    if given < expected {
        return Err(WamError::parameter(format!(
            "expected {} channel buffers, got {}",
            expected, given
        )));
    }
    Ok(())
}

pub(crate) fn check_span(len: usize, start: usize, length: usize) -> WamResult<()> {
    match start.checked_add(length) {
        Some(end) if end <= len => Ok(()),
        _ => Err(WamError::parameter(format!(
            "span {}..{}+{} is outside a buffer of {} samples",
            start, start, length, len
        ))),
    }
}

/// Encode whole planar channels in one go.
///
/// Emits `ceil(samples / frequency_range)` frames and calls `progress` with
/// the fraction of samples consumed after each one, ending at 1.0.
pub fn encode_planar<C, F>(
    sample_rate: u32,
    frequency_range: u32,
    frequency_table_size: u32,
    channels: &[C],
    mut progress: F,
) -> WamResult<Vec<u8>>
where
    C: AsRef<[f32]>,
    F: FnMut(f32),
{
    let sample_count = channels.first().map_or(0, |c| c.as_ref().len());
    if channels.iter().any(|c| c.as_ref().len() != sample_count) {
        return Err(WamError::parameter("channels differ in length"));
    }

    let mut encoder = Encoder::new(
        sample_rate,
        channels.len() as u32,
        frequency_range,
        frequency_table_size,
        sample_count,
    )?;

    let n = frequency_range as usize;
    let mut start = 0;
    while start < sample_count {
        let length = n.min(sample_count - start);
        encoder.write_frame(channels, start, length)?;
        start += length;
        progress(start as f32 / sample_count as f32);
    }
    if sample_count == 0 {
        progress(1.0);
    }

    Ok(encoder.finish())
}
