//! CAN Signal Codec CLI Application
//!
//! Command-line front end for the can-signal-codec library:
//! - `check`: validate a signal table and show statistics
//! - `decode`: decode a candump log into typed signal values
//! - `encode`: pack signal values into output frames and print them

use anyhow::{Context, Result};
use can_signal_codec::{sendable_as, SignalDecoder, SignalEncoder, SignalTable};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

mod assign;
mod candump;
mod config;
mod output;

use output::{CandumpTransmitter, ConsoleSink, OutputFormat};

/// CAN Signal Codec - Decode and encode bit-packed CAN signals
#[derive(Parser, Debug)]
#[command(name = "can-signal-cli")]
#[command(about = "Decode and encode bit-packed CAN signals from a signal table", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the signal configuration file (TOML)
    #[arg(short, long, value_name = "FILE", global = true, default_value = "signals.toml")]
    config: PathBuf,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the signal table and print statistics
    Check,

    /// Decode candump lines (from a file or stdin)
    Decode {
        /// candump log file (default: stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output format for decoded signals
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Maximum number of frames to decode
        #[arg(long, value_name = "COUNT")]
        max_frames: Option<usize>,
    },

    /// Encode NAME=VALUE assignments and print the transmitted frames
    Encode {
        /// Signal assignments, applied in order
        #[arg(value_name = "NAME=VALUE", required = true)]
        assignments: Vec<String>,

        /// Interface name written in front of each frame
        #[arg(long, default_value = "vcan0")]
        interface: String,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Signal CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using codec library v{}", can_signal_codec::VERSION);

    let config = config::load_config(&args.config)?;
    let table = config.build_table()?;

    match &args.command {
        Command::Check => check_mode(&args.config, &config, &table),
        Command::Decode {
            input,
            format,
            max_frames,
        } => decode_mode(&config, &table, input.as_ref(), *format, *max_frames),
        Command::Encode {
            assignments,
            interface,
        } => encode_mode(&config, &table, assignments, interface),
    }
}

/// Print table statistics and which signals the encoder can send
fn check_mode(path: &Path, config: &config::AppConfig, table: &SignalTable) -> Result<()> {
    let stats = table.stats();
    println!("Signal table: {:?}", path);
    println!("  Signals: {}", stats.num_signals);
    println!("  Frames:  {}", stats.num_frames);
    println!("  Output buffers: {}", config.frames.len());
    println!("  Type check: {:?}", config.codec.type_check);

    let buffers = config.build_buffers();
    if let Err(e) = &buffers {
        println!("  Output buffers invalid: {:#}", e);
    }
    for signal in table.signals() {
        let has_buffer = buffers
            .as_ref()
            .is_ok_and(|b| b.get(signal.frame_id).is_some());
        let entry = sendable_as(config.codec.type_check, signal.signal_type);
        let sendable = match (has_buffer, entry) {
            (true, Some(ty)) => format!("send as {}", ty),
            (false, _) => "no output buffer".to_string(),
            (true, None) => "not sendable".to_string(),
        };
        println!(
            "  0x{:03X} {:<24} bits {:>2}..={:<2} [{}, {}] {:<6} {}",
            signal.frame_id,
            signal.name,
            signal.start_bit,
            signal.end_bit,
            signal.min,
            signal.max,
            signal.signal_type,
            sendable
        );
    }

    Ok(())
}

/// Decode every frame of a candump log
fn decode_mode(
    config: &config::AppConfig,
    table: &SignalTable,
    input: Option<&PathBuf>,
    format: OutputFormat,
    max_frames: Option<usize>,
) -> Result<()> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open log file: {:?}", path))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut decoder =
        SignalDecoder::with_config(table, ConsoleSink::new(format), config.codec.clone());
    let mut stats = DecodeStats::default();

    for (line_no, line) in reader.lines().enumerate() {
        if max_frames.is_some_and(|max| stats.frames >= max) {
            break;
        }

        let line = line.context("Failed to read input")?;
        let frame = match candump::parse_line(&line) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Line {}: {:#}", line_no + 1, e);
                stats.parse_errors += 1;
                continue;
            }
        };

        stats.frames += 1;
        let report = decoder.process_frame(&frame);
        if report.matched() > 0 {
            stats.matched_frames += 1;
        }
        stats.skipped += report.skipped.len();
    }

    stats.decoded = decoder.sink().printed();
    if format == OutputFormat::Text {
        stats.print_summary();
    } else {
        log::info!("{:?}", stats);
    }

    Ok(())
}

/// Apply assignments through the encoder, printing each transmitted frame
fn encode_mode(
    config: &config::AppConfig,
    table: &SignalTable,
    assignments: &[String],
    interface: &str,
) -> Result<()> {
    let buffers = config.build_buffers()?;
    let mut encoder = SignalEncoder::with_config(
        table,
        buffers,
        CandumpTransmitter::new(interface),
        config.codec.clone(),
    )?;

    let mut failures = 0;
    for assignment in assignments {
        let (name, value) = assign::parse_assignment(table, assignment)?;
        if let Err(e) = encoder.send(&name, value) {
            eprintln!("{}: {}", assignment, e);
            failures += 1;
        }
    }

    log::info!(
        "{} frames transmitted, {} assignments rejected",
        encoder.transmitter().sent(),
        failures
    );

    if failures > 0 {
        anyhow::bail!("{} of {} assignments rejected", failures, assignments.len());
    }
    Ok(())
}

#[derive(Debug, Default)]
struct DecodeStats {
    frames: usize,
    matched_frames: usize,
    decoded: usize,
    skipped: usize,
    parse_errors: usize,
}

impl DecodeStats {
    fn print_summary(&self) {
        println!("\n=== DECODING SUMMARY ===");
        println!("Frames read: {}", self.frames);
        println!("Frames with known signals: {}", self.matched_frames);
        println!("Signals decoded: {}", self.decoded);
        println!("Signals skipped: {}", self.skipped);
        println!("Unparsable lines: {}", self.parse_errors);
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
