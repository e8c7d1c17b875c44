use rewam::{
    decode_to_samples, decode_to_wav, encode_from_samples, get_audio_info, get_wam_info,
    inspect_frame, validate_wam, EncodeOptions,
};

const SAMPLE_RATE: u32 = 44100;

fn sine(frequency: f32, amplitude: f32, frames: usize, channels: usize) -> Vec<f32> {
    let mut samples = Vec::with_capacity(frames * channels);
    for i in 0..frames {
        let t = i as f32 / SAMPLE_RATE as f32;
        let sample = (t * frequency * 2.0 * std::f32::consts::PI).sin() * amplitude;
        for _ in 0..channels {
            samples.push(sample);
        }
    }
    samples
}

#[test]
fn test_encode_decode_round_trip() {
    let channels = 2;
    let frames = SAMPLE_RATE as usize / 4;
    let samples = sine(440.0, 0.5, frames, channels);

    let wam_bytes =
        encode_from_samples(&samples, SAMPLE_RATE, channels, EncodeOptions::default()).unwrap();

    let (decoded, decoded_sr, decoded_ch) = decode_to_samples(&wam_bytes).unwrap();

    assert_eq!(decoded_sr, SAMPLE_RATE);
    assert_eq!(decoded_ch, channels);
    // 12 frames of 1024, minus the lead-in block
    assert_eq!(decoded.len(), 11 * 1024 * channels);
    assert!(decoded.len() >= samples.len());

    let error: f32 = samples
        .iter()
        .zip(&decoded)
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    let energy: f32 = samples.iter().map(|s| s * s).sum();
    assert!(error / energy < 0.1, "relative error {}", error / energy);

    // both channels carried the same signal
    for pair in decoded.chunks(2) {
        assert_eq!(pair[0], pair[1]);
    }
}

#[test]
fn test_silence_decodes_to_zero() {
    let samples = vec![0.0f32; 3000];
    let options = EncodeOptions::new().with_frequency_range(256);
    let wam_bytes = encode_from_samples(&samples, 8000, 1, options).unwrap();

    let (decoded, _, _) = decode_to_samples(&wam_bytes).unwrap();
    assert!(decoded.len() >= samples.len());
    assert!(decoded.iter().all(|&s| s == 0.0));
}

#[test]
fn test_stream_info() {
    let samples = sine(1000.0, 0.3, 2000, 1);
    let options = EncodeOptions::new()
        .with_frequency_range(512)
        .with_table_size(64);
    let wam_bytes = encode_from_samples(&samples, SAMPLE_RATE, 1, options).unwrap();

    let info = get_wam_info(&wam_bytes).unwrap();
    assert_eq!(info.version, 0);
    assert_eq!(info.sample_rate, SAMPLE_RATE);
    assert_eq!(info.channels, 1);
    assert_eq!(info.frequency_range, 512);
    assert_eq!(info.frequency_table_size, 64);
    // 2000 samples plus one padding block
    assert_eq!(info.frame_count, 5);
    assert_eq!(info.file_size, wam_bytes.len());
    assert!(info.compression_ratio > 1.0);
}

#[test]
fn test_default_options() {
    let options = EncodeOptions::default();
    assert_eq!(options.frequency_range, 1024);
    assert_eq!(options.table_size(), 256);
    assert_eq!(options.with_frequency_range(4096).table_size(), 1024);
    assert_eq!(options.with_table_size(10).table_size(), 10);
}

#[test]
fn test_invalid_parameters_rejected() {
    let samples = sine(440.0, 0.5, 4096, 1);

    let odd_range = EncodeOptions::new().with_frequency_range(1000);
    assert!(encode_from_samples(&samples, SAMPLE_RATE, 1, odd_range).is_err());

    let odd_table = EncodeOptions::new().with_table_size(7);
    assert!(encode_from_samples(&samples, SAMPLE_RATE, 1, odd_table).is_err());

    assert!(encode_from_samples(&samples, SAMPLE_RATE, 0, EncodeOptions::default()).is_err());
    assert!(encode_from_samples(&samples, 0, 1, EncodeOptions::default()).is_err());
}

#[test]
fn test_validate() {
    let samples = sine(440.0, 0.5, 4096, 2);
    let wam_bytes =
        encode_from_samples(&samples, SAMPLE_RATE, 2, EncodeOptions::default()).unwrap();

    assert!(validate_wam(&wam_bytes).unwrap());
    assert!(!validate_wam(b"RIFF0000WAVE").unwrap());
    assert!(!validate_wam(&wam_bytes[..wam_bytes.len() / 2]).unwrap());
    assert!(get_wam_info(&wam_bytes[..20]).is_err());
}

#[test]
fn test_inspect_frame() {
    let samples = sine(440.0, 0.5, 4096, 1);
    let wam_bytes =
        encode_from_samples(&samples, SAMPLE_RATE, 1, EncodeOptions::default()).unwrap();

    let frame = inspect_frame(&wam_bytes, 1, 0).unwrap();
    assert!(frame.master_scale > 0);
    assert_eq!(frame.sub_scales.len(), 8);
    assert!(!frame.selected.is_empty());
    assert!(frame.selected.len() <= 256);
    assert_eq!(frame.codes.len(), frame.selected.len());

    assert!(inspect_frame(&wam_bytes, 0, 1).is_err());
    assert!(inspect_frame(&wam_bytes, 1000, 0).is_err());
}

#[test]
fn test_wav_output() {
    let samples = sine(440.0, 0.5, 2048, 2);
    let wam_bytes =
        encode_from_samples(&samples, SAMPLE_RATE, 2, EncodeOptions::default()).unwrap();

    let wav = decode_to_wav(&wam_bytes).unwrap();
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");

    // 3 frames of 1024 minus lead-in, stereo, 4 bytes each
    let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
    assert_eq!(data_size as usize, 2 * 1024 * 2 * 4);
    assert_eq!(wav.len(), 44 + data_size as usize);

    let info = get_audio_info(&wav).unwrap();
    assert_eq!(info.sample_rate, SAMPLE_RATE);
    assert_eq!(info.channels, 2);
}
