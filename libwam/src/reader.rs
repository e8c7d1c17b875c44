use crate::core::{
    offsets, FrameLayout, Header, WamError, WamResult, FILE_TYPE_SMD0, HEADER_SIZE, MAGIC,
    VERSION,
};

/// binary reader for the WAM header
pub struct Reader;

impl Reader {
    /// new reader
    pub fn new() -> Self {
        Reader
    }

    /// Parse and validate the header at the start of `data`.
    ///
    /// Checks the magic, payload type and version, the non-zero fields, and
    /// that every frame slot the header announces fits inside both
    /// `dataSize` and `data`.
    pub fn read_header(&self, data: &[u8]) -> WamResult<Header> {
        if data.len() < HEADER_SIZE {
            return Err(WamError::format(format!(
                "buffer of {} bytes is shorter than the {} byte header",
                data.len(),
                HEADER_SIZE
            )));
        }

        let mut cursor = Cursor::new(data);
        if cursor.read_u32_be()? != MAGIC {
            return Err(WamError::format("Invalid WAM data: bad magic"));
        }

        let header = Header {
            data_size: cursor.read_u32_be()?,
            file_type: cursor.read_u32_be()?,
            version: cursor.read_u32_be()?,
            sampling_rate: cursor.read_u32_be()?,
            channel_count: cursor.read_u32_be()?,
            sample_count: cursor.read_u32_be()?,
            frequency_range: cursor.read_u32_be()?,
            frequency_table_size: cursor.read_u32_be()?,
            frame_count: cursor.read_u32_be()?,
        };
        debug_assert_eq!(cursor.position(), HEADER_SIZE);

        self.validate(&header, data.len())?;
        Ok(header)
    }

    fn validate(&self, header: &Header, buffer_len: usize) -> WamResult<()> {
        if header.file_type != FILE_TYPE_SMD0 {
            return Err(WamError::format(format!(
                "unsupported payload type 0x{:08x}",
                header.file_type
            )));
        }
        if header.version != VERSION {
            return Err(WamError::format(format!(
                "unsupported version {}",
                header.version
            )));
        }
        if header.data_size as usize > buffer_len {
            return Err(WamError::format(format!(
                "data size {} exceeds buffer length {}",
                header.data_size, buffer_len
            )));
        }
        if header.sampling_rate == 0 {
            return Err(WamError::format("sampling rate is 0"));
        }

        let layout = FrameLayout::from_header(header)?;

        let decodable = header.frequency_range as u64 * header.frame_count as u64;
        if header.sample_count as u64 > decodable {
            return Err(WamError::format(format!(
                "sample count {} exceeds {} frames of {}",
                header.sample_count, header.frame_count, header.frequency_range
            )));
        }

        match layout.stream_size(header.frame_count as usize) {
            Some(size) if size <= header.data_size as usize => Ok(()),
            _ => Err(WamError::format(format!(
                "{} frames do not fit in {} bytes of data",
                header.frame_count, header.data_size
            ))),
        }
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

/// cheap magic check, no validation
pub fn is_wam_data(data: &[u8]) -> bool {
    data.len() >= 4
        && data[offsets::MAGIC..offsets::MAGIC + 4] == MAGIC.to_be_bytes()
}

// cursor

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn read_u32_be(&mut self) -> WamResult<u32> {
        let bytes = self
            .data
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| WamError::format("Unexpected end of data"))?;
        self.pos += 4;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
