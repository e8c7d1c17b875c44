//! Example: Convert an audio file to a WAM stream and back
//!
//! Run with: cargo run --example convert_audio input.mp3 output.wam

use rewam::{decode_to_wav, encode_from_audio, get_wam_info, EncodeOptions};
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <input-audio> <output-wam>", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];

    println!("Reading {}...", input_path);
    let audio_bytes = fs::read(input_path)?;

    let info = rewam::get_audio_info(&audio_bytes)?;
    println!("  Sample rate: {} Hz", info.sample_rate);
    println!("  Channels: {}", info.channels);
    println!("  Duration: {:.2}s", info.duration_secs);

    // 2048-sample blocks, keep an eighth of the coefficients
    println!("\nEncoding to WAM...");
    let options = EncodeOptions::new()
        .with_frequency_range(2048)
        .with_table_size(256);

    let wam_bytes = encode_from_audio(&audio_bytes, options)?;

    let original_size = audio_bytes.len();
    let compressed_size = wam_bytes.len();
    let ratio = original_size as f32 / compressed_size as f32;

    println!("  Original: {} bytes", original_size);
    println!("  Compressed: {} bytes", compressed_size);
    println!("  Ratio: {:.1}x", ratio);

    fs::write(output_path, &wam_bytes)?;
    println!("\nWrote WAM stream to {}", output_path);

    let wam_info = get_wam_info(&wam_bytes)?;
    println!("\nWAM Stream Info:");
    println!("  Sample rate: {} Hz", wam_info.sample_rate);
    println!("  Channels: {}", wam_info.channels);
    println!("  Frames: {}", wam_info.frame_count);
    println!("  Duration: {:.2}s", wam_info.duration_secs);

    println!("\nDecoding back to WAV for verification...");
    let wav_bytes = decode_to_wav(&wam_bytes)?;
    let wav_path = output_path.replace(".wam", "_decoded.wav");
    fs::write(&wav_path, wav_bytes)?;
    println!("Wrote decoded WAV to {}", wav_path);

    Ok(())
}
