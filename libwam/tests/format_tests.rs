//! Header layout, parsing and rejection of malformed streams
use libwam_audio::core::offsets;
use libwam_audio::{
    encode_planar, is_wam_data, Decoder, FrameLayout, Reader, WamError, FILE_TYPE_SMD0,
    HEADER_SIZE,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn sine(len: usize, step: f32) -> Vec<f32> {
    (0..len).map(|i| (i as f32 * step).sin() * 0.5).collect()
}

fn encode_stereo(len: usize) -> Vec<u8> {
    let channels = vec![sine(len, 0.03), sine(len, 0.07)];
    encode_planar(44100, 512, 128, &channels, |_| {}).expect("encoding failed")
}

fn patch_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

fn assert_format_error(bytes: &[u8]) {
    match Decoder::new(bytes) {
        Err(WamError::Format(_)) => {}
        Err(other) => panic!("expected a format error, got {:?}", other),
        Ok(_) => panic!("expected a format error, stream was accepted"),
    }
}

// ============================================================================
// Header round-trip
// ============================================================================

#[test]
fn test_header_roundtrip() {
    let bytes = encode_stereo(2000);
    let header = Reader::new().read_header(&bytes).unwrap();

    assert_eq!(header.sampling_rate, 44100);
    assert_eq!(header.channel_count, 2);
    assert_eq!(header.frequency_range, 512);
    assert_eq!(header.frequency_table_size, 128);
    assert_eq!(header.frame_count, 4); // ceil(2000 / 512)
    assert_eq!(header.sample_count, 4 * 512);
    assert_eq!(header.file_type, FILE_TYPE_SMD0);
    assert_eq!(header.version, 0);
    assert_eq!(header.data_size as usize, bytes.len());

    let layout = FrameLayout::from_header(&header).unwrap();
    assert_eq!(layout.stream_size(4), Some(bytes.len()));
}

#[test]
fn test_header_roundtrip_random_inputs() {
    let mut rng = StdRng::seed_from_u64(40);

    for round in 0..40 {
        let n = 1u32 << rng.gen_range(5..=11);
        let table = 2 * rng.gen_range(1..=n / 2);
        let channel_count = rng.gen_range(1..=4u32);
        let sample_rate = rng.gen_range(1..=192_000u32);
        // first round always covers the empty input
        let len = if round == 0 {
            0
        } else {
            rng.gen_range(0..5 * n as usize)
        };
        let channels: Vec<Vec<f32>> = (0..channel_count)
            .map(|_| (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect();

        let bytes = encode_planar(sample_rate, n, table, &channels, |_| {}).unwrap();
        let header = Reader::new().read_header(&bytes).unwrap();

        let frames = len.div_ceil(n as usize) as u32;
        assert_eq!(header.sampling_rate, sample_rate, "round {}", round);
        assert_eq!(header.channel_count, channel_count, "round {}", round);
        assert_eq!(header.frequency_range, n, "round {}", round);
        assert_eq!(header.frequency_table_size, table, "round {}", round);
        assert_eq!(header.frame_count, frames, "round {}", round);
        assert_eq!(header.sample_count, frames * n, "round {}", round);
        assert_eq!(header.data_size as usize, bytes.len(), "round {}", round);

        let layout = FrameLayout::from_header(&header).unwrap();
        assert_eq!(layout.stream_size(frames as usize), Some(bytes.len()));
    }
}

#[test]
fn test_frame_count_for_exact_multiple() {
    let channels = vec![sine(1024, 0.1)];
    let bytes = encode_planar(8000, 256, 64, &channels, |_| {}).unwrap();
    let header = Reader::new().read_header(&bytes).unwrap();
    assert_eq!(header.frame_count, 4);
}

#[test]
fn test_header_is_big_endian_ascii_tags() {
    let bytes = encode_stereo(100);
    assert_eq!(&bytes[0..4], b"WAM0");
    assert_eq!(&bytes[8..12], b"SMD0");
    assert_eq!(&bytes[16..20], &44100u32.to_be_bytes());
    assert_eq!(bytes[HEADER_SIZE - 1], 1); // one frame, low byte of frameCount
}

#[test]
fn test_is_wam_data() {
    let bytes = encode_stereo(100);
    assert!(is_wam_data(&bytes));
    assert!(Decoder::<Vec<u8>>::is_wam_data(&bytes));
    assert!(is_wam_data(b"WAM0"));
    assert!(!is_wam_data(b"WAM"));
    assert!(!is_wam_data(b"RIFF....WAVE"));
    assert!(!is_wam_data(&[]));
}

// ============================================================================
// Rejection
// ============================================================================

#[test]
fn test_corrupted_magic_is_rejected() {
    let original = encode_stereo(1000);
    for i in 0..4 {
        let mut bytes = original.clone();
        bytes[i] ^= 0x20;
        assert!(!is_wam_data(&bytes));
        assert_format_error(&bytes);
    }
}

#[test]
fn test_short_buffers_are_rejected() {
    let bytes = encode_stereo(1000);
    for len in [0, 3, 4, 39] {
        assert_format_error(&bytes[..len]);
    }
}

#[test]
fn test_truncated_stream_is_rejected() {
    let bytes = encode_stereo(1000);
    for cut in [1, 10, 100, bytes.len() - HEADER_SIZE] {
        assert_format_error(&bytes[..bytes.len() - cut]);
    }
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let mut bytes = encode_stereo(1000);
    bytes.extend_from_slice(&[0xee; 17]);
    let decoder = Decoder::new(bytes).unwrap();
    assert_eq!(decoder.frame_count(), 2);
}

#[test]
fn test_wrong_file_type_and_version() {
    let original = encode_stereo(1000);

    let mut bytes = original.clone();
    bytes[offsets::FILE_TYPE..offsets::FILE_TYPE + 4].copy_from_slice(b"SMD1");
    assert_format_error(&bytes);

    let mut bytes = original;
    patch_u32(&mut bytes, offsets::VERSION, 1);
    assert_format_error(&bytes);
}

#[test]
fn test_invalid_header_fields() {
    let original = encode_stereo(1000);
    let cases = [
        (offsets::SAMPLING_RATE, 0),
        (offsets::CHANNEL_COUNT, 0),
        (offsets::FREQUENCY_RANGE, 0),
        (offsets::FREQUENCY_RANGE, 500),
        (offsets::FREQUENCY_TABLE_SIZE, 0),
        (offsets::FREQUENCY_TABLE_SIZE, 1024),
        // more samples than the frames can hold
        (offsets::SAMPLE_COUNT, 2 * 512 + 1),
        // more frames than the data holds
        (offsets::FRAME_COUNT, 3),
        (offsets::CHANNEL_COUNT, 3),
        (offsets::DATA_SIZE, 0),
        (offsets::DATA_SIZE, u32::MAX),
    ];

    for (offset, value) in cases {
        let mut bytes = original.clone();
        patch_u32(&mut bytes, offset, value);
        assert_format_error(&bytes);
    }
}

#[test]
fn test_huge_frame_count_does_not_overflow() {
    let mut bytes = encode_stereo(1000);
    patch_u32(&mut bytes, offsets::FRAME_COUNT, u32::MAX);
    patch_u32(&mut bytes, offsets::SAMPLE_COUNT, 0);
    assert_format_error(&bytes);
}

#[test]
fn test_sample_count_below_capacity_is_accepted() {
    let mut bytes = encode_stereo(1000);
    patch_u32(&mut bytes, offsets::SAMPLE_COUNT, 1000);
    let decoder = Decoder::new(bytes).unwrap();
    assert_eq!(decoder.sample_count(), 1000);
}
