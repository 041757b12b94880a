//! vqpress command line.
//!
//! ```bash
//! vqpress image.rgb 4 16 --seed 7 --report
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vqpress::codebook::{TrainParams, TrainReport};
use vqpress::pipeline::{self, Settings};
use vqpress::{compose, quality, raw, Channels};

const DEFAULT_LOG_FILTER: &str = "vqpress=info";

#[derive(Parser)]
#[command(name = "vqpress")]
#[command(about = "Compress a raw image by vector quantization and write a before/after composite")]
struct Args {
    /// Raw input: W*H grayscale bytes, or three W*H planes (R, G, B)
    input: PathBuf,

    /// Vector shape: 2 for pixel pairs, or a perfect square (4, 9, 16, ...) for blocks
    m: usize,

    /// Number of codewords (a power of two is expected)
    n: usize,

    /// Frame width in pixels
    #[arg(long, default_value_t = raw::DEFAULT_WIDTH)]
    width: usize,

    /// Frame height in pixels
    #[arg(long, default_value_t = raw::DEFAULT_HEIGHT)]
    height: usize,

    /// Seed for codebook seeding (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum Lloyd iterations
    #[arg(long, default_value_t = TrainParams::default().max_iterations)]
    max_iterations: usize,

    /// Composite PNG path (defaults to `<input stem>_vq.png` next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the training report and PSNR as JSON
    #[arg(long)]
    report: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .init();

    let args = Args::parse();

    let mut params = TrainParams::default().with_max_iterations(args.max_iterations);
    if let Some(seed) = args.seed {
        params = params.with_seed(seed);
    }
    let settings = Settings::from_selectors(args.m, args.n)?.with_params(params);

    let image = raw::read(&args.input, args.width, args.height)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let out = pipeline::compress(&image, &settings)?;

    let psnr = quality::psnr(&image, &out.reconstructed)?;
    tracing::info!(psnr_db = psnr, "reconstruction quality");

    let composite = compose::side_by_side(&image, &out.reconstructed)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input));
    compose::save_png(&composite, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    if args.report {
        let summary = report_json(&settings, image.channels(), &out.report, psnr, &output);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

/// `RUST_LOG` when it parses, `vqpress=info` otherwise.
fn log_filter(rust_log: Option<String>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn report_json(
    settings: &Settings,
    channels: Channels,
    report: &TrainReport,
    psnr: f64,
    output: &Path,
) -> serde_json::Value {
    serde_json::json!({
        "settings": settings,
        "channels": channels,
        "training": report,
        // JSON has no infinity; identical images report null.
        "psnr_db": psnr.is_finite().then_some(psnr),
        "output": output,
    })
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{stem}_vq.png"))
}
