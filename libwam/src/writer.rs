use log::debug;

use crate::core::nibble::write_u32_be;
use crate::core::{offsets, Header, HEADER_SIZE, MAGIC};

/// Growable output buffer for an encoded stream.
///
/// The backing vector is zero-filled up to its current capacity and doubles
/// whenever a write would run past the end. `finish` cuts it back to the
/// bytes actually used.
pub struct Writer {
    buffer: Vec<u8>,
    used: usize,
}

impl Writer {
    /// writer with room for at least `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Writer {
            buffer: vec![0; capacity.max(HEADER_SIZE)],
            used: 0,
        }
    }

    /// write every header field, big-endian
    pub fn write_header(&mut self, header: &Header) {
        self.ensure(HEADER_SIZE);
        let fields = [
            (offsets::MAGIC, MAGIC),
            (offsets::DATA_SIZE, header.data_size),
            (offsets::FILE_TYPE, header.file_type),
            (offsets::VERSION, header.version),
            (offsets::SAMPLING_RATE, header.sampling_rate),
            (offsets::CHANNEL_COUNT, header.channel_count),
            (offsets::SAMPLE_COUNT, header.sample_count),
            (offsets::FREQUENCY_RANGE, header.frequency_range),
            (offsets::FREQUENCY_TABLE_SIZE, header.frequency_table_size),
            (offsets::FRAME_COUNT, header.frame_count),
        ];
        for (offset, value) in fields {
            write_u32_be(&mut self.buffer, offset, value);
        }
        self.used = self.used.max(HEADER_SIZE);
    }

    /// zeroed, writable slot of `len` bytes at `offset`
    pub fn slot_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        let end = offset + len;
        self.ensure(end);
        self.used = self.used.max(end);
        let slot = &mut self.buffer[offset..end];
        slot.fill(0);
        slot
    }

    /// bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.used]
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// allocated size, including room not yet written
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// hand back exactly the used bytes
    pub fn finish(mut self) -> Vec<u8> {
        self.buffer.truncate(self.used);
        self.buffer
    }

    fn ensure(&mut self, end: usize) {
        if end <= self.buffer.len() {
            return;
        }
        let grown = (self.buffer.len() * 2).max(end);
        debug!("growing output buffer {} -> {} bytes", self.buffer.len(), grown);
        self.buffer.resize(grown, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::nibble::read_u32_be;

    #[test]
    fn test_header_fields_land_at_offsets() {
        let mut writer = Writer::with_capacity(0);
        let mut header = Header::new(44100, 2, 1024, 256);
        header.frame_count = 7;
        writer.write_header(&header);
        let bytes = writer.finish();

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[0..4], b"WAM0");
        assert_eq!(&bytes[8..12], b"SMD0");
        assert_eq!(read_u32_be(&bytes, offsets::SAMPLING_RATE), 44100);
        assert_eq!(read_u32_be(&bytes, offsets::FRAME_COUNT), 7);
    }

    #[test]
    fn test_growth_doubles_and_finish_truncates() {
        let mut writer = Writer::with_capacity(64);
        writer.slot_mut(60, 10)[9] = 0xab;
        assert_eq!(writer.capacity(), 128);
        writer.slot_mut(100, 200);
        assert_eq!(writer.capacity(), 300);

        let bytes = writer.finish();
        assert_eq!(bytes.len(), 300);
        assert_eq!(bytes[69], 0xab);
    }
}
