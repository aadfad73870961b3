//! `respb`: converts RESP-style text frames (TP) into the compact binary
//! re-encoding (BP).
//!
//! # Usage
//!
//! ```bash
//! # Self-test: convert a handful of built-in sample frames and print
//! # size-comparison measurements to stdout.
//! respb
//!
//! # Stream-convert a file.
//! respb --input commands.tp --output commands.bp --measurements sizes.jsonl
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::fs::File;
use tokio::io::{self, AsyncWriteExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use respb_protocol::{parse_frame, serialize, Converter, Measurement, Outcome};

/// RESP-to-RESPB frame converter
#[derive(Parser, Debug)]
#[command(name = "respb")]
#[command(about = "Converts TP (RESP-style text) frames into BP (binary) frames")]
#[command(version)]
struct Args {
    /// Path to a TP input file. Omit together with `--output` to run the
    /// built-in self-test instead.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to write the BP output to.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Path to append one JSON-Lines `Measurement` record per converted frame.
    #[arg(long)]
    measurements: Option<PathBuf>,

    /// Multiplexing id stamped into every BP frame header.
    #[arg(long, default_value_t = 0)]
    mux_id: u16,

    /// Read chunk size in bytes.
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

const SELF_TEST_FRAMES: &[&[u8]] = &[
    b"*2\r\n$3\r\nGET\r\n$5\r\nmykey\r\n",
    b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$5\r\nhello\r\n",
    b"*5\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n$2\r\nEX\r\n$2\r\n60\r\n",
    b"*4\r\n$4\r\nMGET\r\n$2\r\nk1\r\n$2\r\nk2\r\n$2\r\nk3\r\n",
    b"*3\r\n$7\r\nPUBLISH\r\n$4\r\nnews\r\n$5\r\nhello\r\n",
    b"*4\r\n$8\r\nJSON.SET\r\n$2\r\nk1\r\n$5\r\n$.foo\r\n$3\r\n\"x\"\r\n",
    b"*2\r\n$7\r\nUNKNOWN\r\n$3\r\narg\r\n",
];

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    match (&args.input, &args.output) {
        (None, None) => {
            run_self_test();
            ExitCode::SUCCESS
        }
        (Some(input), Some(output)) => match run_conversion(&args, input, output).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!(error = %err, "conversion failed");
                ExitCode::from(1)
            }
        },
        _ => {
            eprintln!("--input and --output must be given together");
            ExitCode::from(2)
        }
    }
}

/// Run the conversion over built-in sample frames, printing measurements.
fn run_self_test() {
    tracing::info!("running built-in self-test");
    for tp in SELF_TEST_FRAMES {
        let record = match parse_frame(tp) {
            Outcome::Ready { record, .. } => record,
            other => {
                tracing::warn!(outcome = ?other, "self-test frame did not parse cleanly");
                continue;
            }
        };
        match serialize(&record, 0) {
            Ok(bp) => {
                let measurement = respb_protocol::compare(record.verb(), tp, &bp);
                println!(
                    "{:<10} tp={:<4} bp={:<4} delta={:<5} delta_pct={:.1}%",
                    measurement.verb_preview,
                    measurement.tp_size,
                    measurement.bp_size,
                    measurement.delta,
                    measurement.delta_pct
                );
            }
            Err(err) => tracing::warn!(verb = record.verb(), error = %err, "serialize failed"),
        }
    }
}

async fn run_conversion(
    args: &Args,
    input: &PathBuf,
    output: &PathBuf,
) -> anyhow::Result<()> {
    let reader = File::open(input).await?;
    let writer = File::create(output).await?;

    let mut measurements_file = match &args.measurements {
        Some(path) => Some(File::create(path).await?),
        None => None,
    };
    let mut line_buf: Vec<Measurement> = Vec::new();

    let mut converter = Converter::new(args.mux_id);
    if let Some(size) = args.buffer_size {
        converter = converter.with_chunk_size(size);
    }

    let tally = {
        let mut record_measurement = |m: Measurement| line_buf.push(m);
        let callback: Option<&mut dyn FnMut(Measurement)> = if args.measurements.is_some() {
            Some(&mut record_measurement)
        } else {
            None
        };
        converter.convert(reader, writer, callback).await?
    };

    if let Some(file) = measurements_file.as_mut() {
        for m in &line_buf {
            let mut line = serde_json::to_string(m)?;
            line.push('\n');
            file.write_all(line.as_bytes()).await?;
        }
        file.flush().await?;
    }

    print_summary(&tally).await?;
    Ok(())
}

async fn print_summary(tally: &respb_protocol::Tally) -> io::Result<()> {
    println!(
        "frames_in={} frames_out={} malformed={} serialize_errors={} incomplete_at_eof={} tp_bytes={} bp_bytes={} elapsed_ms={}",
        tally.frames_in,
        tally.frames_out,
        tally.malformed,
        tally.serialize_errors,
        tally.incomplete_at_eof,
        tally.tp_bytes,
        tally.bp_bytes,
        tally.elapsed.as_millis(),
    );
    Ok(())
}
