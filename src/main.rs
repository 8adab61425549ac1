//! cardlens - trading card identity and condition analysis engine
//!
//! Command-line front end: decodes card photos into pixel buffers, reads
//! OCR line files, and prints analysis reports as JSON. All decoding
//! happens here at the boundary; the engine itself only sees buffers and
//! text lines.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cardlens::config::{load_or_default, EngineConfig};
use cardlens::identity::{merge::merge, CardIdentity, FieldSource};
use cardlens::ocr::OcrLine;
use cardlens::vision::content_hash_with;
use cardlens::{analyze_card, build_report, resolve, CancelToken, PixelBuffer};

/// cardlens - card identity and condition analysis
#[derive(Parser, Debug)]
#[command(name = "cardlens")]
#[command(about = "Analyze trading card photos and OCR text into a listing-ready record")]
struct Args {
    /// Path to a config file (defaults to the user config location)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a photo pair and optional OCR line files, print a report
    Analyze {
        /// Front photo (PNG/JPEG)
        #[arg(long)]
        front: PathBuf,

        /// Back photo
        #[arg(long)]
        back: Option<PathBuf>,

        /// Front OCR lines, one per row
        #[arg(long)]
        ocr_front: Option<PathBuf>,

        /// Back OCR lines
        #[arg(long)]
        ocr_back: Option<PathBuf>,

        /// Slab label OCR lines
        #[arg(long)]
        ocr_slab: Option<PathBuf>,

        /// Embed corner crop PNGs in the report
        #[arg(long)]
        include_images: bool,
    },

    /// Resolve identity facts from OCR line files only
    Resolve {
        #[arg(long)]
        ocr_front: Option<PathBuf>,

        #[arg(long)]
        ocr_back: Option<PathBuf>,

        #[arg(long)]
        ocr_slab: Option<PathBuf>,
    },

    /// Print the content hash for a photo pair
    Hash {
        front: PathBuf,
        back: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref());

    // Initialize logging
    let filter = EnvFilter::try_new(&config.general.log_filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match args.command {
        Command::Analyze {
            front,
            back,
            ocr_front,
            ocr_back,
            ocr_slab,
            include_images,
        } => analyze(
            &config,
            &front,
            back.as_deref(),
            ocr_front.as_deref(),
            ocr_back.as_deref(),
            ocr_slab.as_deref(),
            include_images,
        ),
        Command::Resolve {
            ocr_front,
            ocr_back,
            ocr_slab,
        } => {
            let front = load_ocr_lines(ocr_front.as_deref())?;
            let back = load_ocr_lines(ocr_back.as_deref())?;
            let slab = load_ocr_lines(ocr_slab.as_deref())?;
            let promotions = resolve(&front, &back, &slab);
            println!("{}", serde_json::to_string_pretty(&promotions)?);
            Ok(())
        }
        Command::Hash { front, back } => {
            let front_bytes = std::fs::read(&front)
                .with_context(|| format!("failed to read {}", front.display()))?;
            let back_bytes = match &back {
                Some(path) => Some(
                    std::fs::read(path)
                        .with_context(|| format!("failed to read {}", path.display()))?,
                ),
                None => None,
            };
            let hash = content_hash_with(
                &front_bytes,
                back_bytes.as_deref(),
                config.hashing.backend(),
            );
            println!("{}", hash);
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn analyze(
    _config: &EngineConfig,
    front: &Path,
    back: Option<&Path>,
    ocr_front: Option<&Path>,
    ocr_back: Option<&Path>,
    ocr_slab: Option<&Path>,
    include_images: bool,
) -> Result<()> {
    let front_buffer = load_photo(front)?;
    let back_buffer = match back {
        Some(path) => Some(load_photo(path)?),
        None => None,
    };

    let cancel = CancelToken::new();
    let analysis = analyze_card(&front_buffer, back_buffer.as_ref(), &cancel)
        .context("analysis cancelled")?;

    let front_lines = load_ocr_lines(ocr_front)?;
    let back_lines = load_ocr_lines(ocr_back)?;
    let slab_lines = load_ocr_lines(ocr_slab)?;

    let identity = if front_lines.is_empty() && back_lines.is_empty() && slab_lines.is_empty() {
        None
    } else {
        let promotions = resolve(&front_lines, &back_lines, &slab_lines);
        Some(merge(
            &CardIdentity::default(),
            &promotions,
            FieldSource::Front,
        ))
    };

    let report = build_report(&analysis, identity.as_ref(), include_images);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Decode a photo into the engine's pixel buffer abstraction
fn load_photo(path: &Path) -> Result<PixelBuffer> {
    let image = image::open(path)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    PixelBuffer::from_rgba(image.into_raw(), width, height)
        .with_context(|| format!("invalid pixel data in {}", path.display()))
}

/// Read an OCR line file: one line of text per row, blanks skipped
fn load_ocr_lines(path: Option<&Path>) -> Result<Vec<OcrLine>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(OcrLine::plain)
        .collect())
}
