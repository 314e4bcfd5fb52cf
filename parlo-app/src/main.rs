//! Command-line host for the utterance segmentation engine.
//!
//! Reads 16-bit little-endian mono PCM from a file (or stdin), drives a
//! segmentation session with the stub decoder, and prints one JSON
//! record per recognized utterance on stdout. Diagnostics go to stderr
//! so stdout stays machine-readable.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use parlo_core::decode::stub::StubDecoder;
use parlo_core::{
    DecoderHandle, JsonLineSink, ParloError, Result, Segmenter, SessionConfig,
};

/// Leading bytes discarded from every input. The header itself is not
/// validated; an input that ends inside it reads as an empty stream.
const WAV_HEADER_BYTES: u64 = 44;

#[derive(Debug, Parser)]
#[command(
    name = "parlo",
    version,
    about = "Segment a PCM audio stream into recognized utterances"
)]
struct Args {
    /// Input audio file (16-bit LE mono 16 kHz PCM, WAV-headed).
    /// Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Sample buffer capacity — the maximum utterance window.
    #[arg(long, default_value_t = 65_536)]
    capacity: usize,

    /// Acoustic model directory for the decoding backend. Must exist
    /// when given. The current backend is a stub and ignores the
    /// contents, but the path is validated up front.
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlo=info".parse().unwrap()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "session failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = session_config(&args)?;
    let decoder = build_decoder(args.model_dir.as_deref())?;

    let mut input = open_input(args.input.as_deref())?;
    skip_header(&mut input)?;

    let stdout = io::stdout();
    let mut sink = JsonLineSink::new(stdout.lock());

    let mut segmenter = Segmenter::new(config, decoder);
    segmenter.run(input, &mut sink)?;
    Ok(())
}

fn session_config(args: &Args) -> Result<SessionConfig> {
    if args.capacity == 0 {
        return Err(ParloError::Configuration(
            "capacity must be at least one sample".into(),
        ));
    }
    Ok(SessionConfig {
        capacity: args.capacity,
        ..SessionConfig::default()
    })
}

fn build_decoder(model_dir: Option<&std::path::Path>) -> Result<DecoderHandle> {
    if let Some(dir) = model_dir {
        if !dir.is_dir() {
            return Err(ParloError::Configuration(format!(
                "model directory not found: {}",
                dir.display()
            )));
        }
        info!(model_dir = %dir.display(), "model directory validated (stub backend)");
    }
    Ok(DecoderHandle::new(StubDecoder::new()))
}

fn open_input(path: Option<&std::path::Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            info!(input = %path.display(), "reading from file");
            Ok(Box::new(File::open(path)?))
        }
        None => {
            info!("reading from stdin");
            Ok(Box::new(io::stdin()))
        }
    }
}

/// Discard the assumed WAV header. A partial header is not an error
/// here; the session reports `NoAudioData` when no samples follow.
fn skip_header(input: &mut dyn Read) -> Result<()> {
    io::copy(&mut input.take(WAV_HEADER_BYTES), &mut io::sink())?;
    Ok(())
}
