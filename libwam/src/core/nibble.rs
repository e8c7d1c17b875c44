//! Half-byte and bitmap accessors for frame slots.
//!
//! Nibble `which == 0` is the high half of the byte, `which == 1` the low
//! half. Packed sequences put element `i` at byte `i / 2`, nibble `i % 2`.
//! Selection bitmaps store coefficient `k` at bit `k % 32` of word `k / 32`.

/// read one nibble
#[inline]
pub fn read_nibble(buf: &[u8], byte_offset: usize, which: usize) -> u8 {
    let byte = buf[byte_offset];
    if which == 0 {
        byte >> 4
    } else {
        byte & 0x0f
    }
}

/// write one nibble, leaving the other half of the byte alone
#[inline]
pub fn write_nibble(buf: &mut [u8], byte_offset: usize, which: usize, value: u8) {
    let byte = &mut buf[byte_offset];
    if which == 0 {
        *byte = (*byte & 0x0f) | ((value & 0x0f) << 4);
    } else {
        *byte = (*byte & 0xf0) | (value & 0x0f);
    }
}

/// read element `index` of a packed nibble sequence starting at `base`
#[inline]
pub fn packed_nibble(buf: &[u8], base: usize, index: usize) -> u8 {
    read_nibble(buf, base + index / 2, index % 2)
}

/// write element `index` of a packed nibble sequence starting at `base`
#[inline]
pub fn set_packed_nibble(buf: &mut [u8], base: usize, index: usize, value: u8) {
    write_nibble(buf, base + index / 2, index % 2, value)
}

#[inline]
pub fn is_flagged(words: &[u32], k: usize) -> bool {
    words[k / 32] & (1 << (k % 32)) != 0
}

#[inline]
pub fn set_flag(words: &mut [u32], k: usize) {
    words[k / 32] |= 1 << (k % 32);
}

#[inline]
pub fn read_u32_be(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

#[inline]
pub fn write_u32_be(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}
