use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rewam::{audio, EncodeOptions};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rewam")]
#[command(version)]
#[command(about = "WAM/SMD0 audio converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode audio file to a WAM stream
    Encode {
        /// Input audio file (mp3, wav, flac, ogg, etc.)
        input: PathBuf,
        /// Output WAM file
        output: PathBuf,
        /// Block size N, a power of two
        #[arg(short = 'n', long, default_value_t = libwam_audio::DEFAULT_FREQUENCY_RANGE)]
        frequency_range: u32,
        /// Coefficients kept per frame (default N/4)
        #[arg(short = 't', long)]
        table_size: Option<u32>,
    },
    /// Decode a WAM stream to WAV
    Decode {
        /// Input WAM file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
    },
    /// Show information about a WAM stream
    Info {
        /// Input WAM file
        input: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Dump the decoded contents of one frame
    Inspect {
        /// Input WAM file
        input: PathBuf,
        /// Frame index
        #[arg(short, long, default_value_t = 0)]
        frame: usize,
        /// Channel index
        #[arg(short, long, default_value_t = 0)]
        channel: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a WAM stream
    Validate {
        /// Input WAM file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            frequency_range,
            table_size,
        } => {
            let mut options = EncodeOptions::new().with_frequency_range(frequency_range);
            if let Some(t) = table_size {
                options = options.with_table_size(t);
            }
            encode(&input, &output, options)?;
        }
        Commands::Decode { input, output } => {
            decode(&input, &output)?;
        }
        Commands::Info { input, json } => {
            show_info(&input, json)?;
        }
        Commands::Inspect {
            input,
            frame,
            channel,
            json,
        } => {
            inspect(&input, frame, channel, json)?;
        }
        Commands::Validate { input } => {
            validate(&input)?;
        }
    }

    Ok(())
}

fn encode(input: &PathBuf, output: &PathBuf, options: EncodeOptions) -> Result<()> {
    println!("Reading {}...", input.display());

    let source = audio::read_audio_file(input).context("Failed to read audio file")?;

    println!("  Sample rate: {} Hz", source.sample_rate);
    println!("  Channels: {}", source.channels);
    println!("  Duration: {:.2}s", source.duration_secs());
    println!(
        "Encoding to WAM (N={}, T={})...",
        options.frequency_range,
        options.table_size()
    );

    let wam_data =
        rewam::encode_from_samples(&source.samples, source.sample_rate, source.channels, options)
            .context("Failed to encode audio")?;

    fs::write(output, &wam_data).context("Failed to write output file")?;

    // 16-bit PCM reference
    let original_size = source.samples.len() * 2;
    let ratio = original_size as f32 / wam_data.len() as f32;

    println!("Done!");
    println!("  Output: {}", output.display());
    println!("  Size: {} bytes ({:.1}x compression)", wam_data.len(), ratio);

    Ok(())
}

fn decode(input: &PathBuf, output: &PathBuf) -> Result<()> {
    println!("Reading {}...", input.display());

    let wam_data = fs::read(input).context("Failed to read WAM file")?;
    let file_info = rewam::get_wam_info(&wam_data)?;

    println!("  Sample rate: {} Hz", file_info.sample_rate);
    println!("  Channels: {}", file_info.channels);
    println!("  Frames: {}", file_info.frame_count);

    println!("Decoding...");

    let (samples, sample_rate, channels) =
        rewam::decode_to_samples(&wam_data).context("Failed to decode WAM stream")?;
    info!("decoded {} interleaved samples", samples.len());

    audio::write_wav(output, &samples, sample_rate, channels)?;

    println!("Done!");
    println!("  Output: {}", output.display());

    Ok(())
}

fn show_info(input: &PathBuf, json: bool) -> Result<()> {
    let wam_data = fs::read(input).context("Failed to read WAM file")?;
    let file_info = rewam::get_wam_info(&wam_data)?;

    if json {
        let json_str =
            serde_json::to_string_pretty(&file_info).context("Failed to serialize info")?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("WAM/SMD0 Stream");
    println!("───────────────────────────────");
    println!("  Version:     {}", file_info.version);
    println!("  Sample rate: {} Hz", file_info.sample_rate);
    println!("  Channels:    {}", file_info.channels);
    println!("  Block size:  {}", file_info.frequency_range);
    println!("  Table size:  {}", file_info.frequency_table_size);
    println!("  Frames:      {}", file_info.frame_count);
    println!("  Samples:     {}", file_info.sample_count);
    println!("  Duration:    {:.2}s", file_info.duration_secs);
    println!("  File size:   {} bytes", file_info.file_size);
    println!("  Compression: {:.1}x", file_info.compression_ratio);

    Ok(())
}

fn inspect(input: &PathBuf, frame: usize, channel: usize, json: bool) -> Result<()> {
    let wam_data = fs::read(input).context("Failed to read WAM file")?;
    let frame_info = rewam::inspect_frame(&wam_data, frame, channel)?;

    if json {
        let json_str =
            serde_json::to_string_pretty(&frame_info).context("Failed to serialize frame")?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("Frame {} / channel {}", frame, channel);
    println!("───────────────────────────────");
    println!("  Master scale: {}", frame_info.master_scale);
    println!("  Sub-scales:   {:?}", frame_info.sub_scales);
    println!("  Selected:     {}", frame_info.selected.len());
    for (index, code) in frame_info.selected.iter().zip(&frame_info.codes) {
        let sign = if code & 0x8 != 0 { '-' } else { '+' };
        println!("    [{:5}] {}2^-{}", index, sign, code & 0x7);
    }

    Ok(())
}

fn validate(input: &PathBuf) -> Result<()> {
    let wam_data = fs::read(input).context("Failed to read WAM file")?;

    if rewam::validate_wam(&wam_data)? {
        println!("✓ {} is a valid WAM stream", input.display());
        Ok(())
    } else {
        bail!("✗ {} is not a valid WAM stream", input.display())
    }
}
