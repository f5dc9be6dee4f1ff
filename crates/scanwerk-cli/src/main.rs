// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — photographed document to black-and-white PDF.
//
// Entry point. Initialises logging, validates the input photo, runs it through
// the scan pipeline (orientation, optional corner correction, optional crop,
// adaptive threshold) and writes a single-page PDF.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::Parser;
use image::ImageFormat;
use tracing::{debug, error, info, warn};

use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::{PaperSize, Point, Quadrilateral, Rect, ScanConfig};
use scanwerk_document::{
    CornerChoice, ExifMetadataExtractor, ExifOrientation, ImageProcessor, ImageprocWarp,
    PdfWriter, ScanPipeline,
};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "scanwerk", version)]
#[command(about = "Turn a photographed page into a black-and-white PDF")]
struct Cli {
    /// Photo of the page (JPEG or PNG).
    input: PathBuf,

    /// Output PDF path. Defaults to `document_<UTC timestamp>.pdf`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Paper size: a4, a5, letter, legal, or WxH in millimetres.
    #[arg(long)]
    paper: Option<PaperSize>,

    /// Threshold window edge in pixels (made odd, at least 3).
    #[arg(long)]
    block_size: Option<u32>,

    /// Bias subtracted from the local mean.
    #[arg(long, allow_hyphen_values = true)]
    constant_c: Option<i32>,

    /// Page corners as `x,y;x,y;x,y;x,y` (top-left, top-right,
    /// bottom-right, bottom-left), in upright image pixels.
    #[arg(long, value_parser = parse_corners)]
    corners: Option<Quadrilateral>,

    /// Keep the bounding-box crop of the corners instead of the perspective warp.
    #[arg(long, requires = "corners")]
    bounding_box: bool,

    /// Crop rectangle as `x,y,width,height`.
    #[arg(long, value_parser = parse_rect, conflicts_with = "default_crop")]
    crop: Option<Rect>,

    /// Crop to the default inset rectangle.
    #[arg(long)]
    default_crop: bool,

    /// Override the EXIF orientation code (1-8).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=8))]
    orientation: Option<u32>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    debug!(?cli, "Arguments parsed");

    match run(cli) {
        Ok(path) => {
            info!(path = %path.display(), "Scanwerk finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "Scan failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

/// Run the whole capture and return the written PDF path.
fn run(cli: Cli) -> Result<PathBuf> {
    let config = resolve_config(&cli);
    let bytes = read_input(&cli.input, config.max_input_bytes)?;

    let mut pipeline = match cli.orientation {
        Some(code) => {
            let image = ImageProcessor::from_bytes(&bytes)?.into_dynamic();
            ScanPipeline::from_image(image, ExifOrientation::from_code(code), config.clone())
        }
        None => ScanPipeline::from_bytes(&bytes, &ExifMetadataExtractor, config.clone())?,
    };

    match cli.corners {
        Some(corners) => {
            let preview = pipeline.preview_corners(&corners, &ImageprocWarp::default());
            info!(method = ?preview.corrected.method, "Corners applied");
            let choice = if cli.bounding_box {
                CornerChoice::Cropped
            } else {
                CornerChoice::Corrected
            };
            pipeline.select_corner_result(choice)?;
        }
        None => {
            pipeline.skip_corners();
        }
    }

    let editor = pipeline.crop_editor()?;
    let crop = match (cli.crop, cli.default_crop) {
        (Some(rect), _) => {
            let (min_w, min_h) = editor.min_size();
            if rect.width < min_w || rect.height < min_h {
                return Err(ScanwerkError::InvalidInput(format!(
                    "crop {}x{} is below the minimum {}x{}",
                    rect.width, rect.height, min_w, min_h
                )));
            }
            Some(rect)
        }
        (None, true) => Some(editor.rectangle()),
        (None, false) => None,
    };
    match crop {
        Some(rect) => pipeline.confirm_crop(&rect)?,
        None => pipeline.skip_crop()?,
    };

    pipeline.threshold(pipeline.default_params())?;

    let mut writer = PdfWriter::new(config.paper_size);
    if let Some(stem) = cli.input.file_stem().and_then(|s| s.to_str()) {
        writer.set_title(stem);
    }
    let pdf = pipeline.export_pdf(&writer)?;

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(default_output_name(Utc::now())));
    std::fs::write(&output, &pdf)?;
    info!(path = %output.display(), bytes = pdf.len(), "PDF written");
    Ok(output)
}

/// Load the settings file (if any) and apply command-line overrides.
fn resolve_config(cli: &Cli) -> ScanConfig {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::load_or_default(path),
        None => ScanConfig::default(),
    };
    if let Some(paper) = cli.paper {
        config.paper_size = paper;
    }
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }
    if let Some(constant_c) = cli.constant_c {
        config.constant_c = constant_c;
    }
    config
}

// -- Input validation ---------------------------------------------------------

/// Read the input photo, rejecting anything that is not a JPEG or PNG or is
/// larger than `max_bytes`.
fn read_input(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(ScanwerkError::InputTooLarge {
            size,
            limit: max_bytes,
        });
    }
    let bytes = std::fs::read(path)?;
    match image::guess_format(&bytes) {
        Ok(ImageFormat::Jpeg) | Ok(ImageFormat::Png) => Ok(bytes),
        Ok(other) => {
            warn!(format = ?other, "Rejected input format");
            Err(ScanwerkError::InvalidInput(format!(
                "unsupported image format {other:?}; expected JPEG or PNG"
            )))
        }
        Err(_) => Err(ScanwerkError::InvalidInput(
            "unrecognised file type; expected JPEG or PNG".into(),
        )),
    }
}

fn default_output_name(now: DateTime<Utc>) -> String {
    format!("document_{}.pdf", now.format("%Y%m%dT%H%M%SZ"))
}

// -- Argument parsers ---------------------------------------------------------

fn parse_number(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    if !value.is_finite() {
        return Err(format!("`{s}` is not finite"));
    }
    Ok(value)
}

fn parse_corners(s: &str) -> std::result::Result<Quadrilateral, String> {
    let points = s
        .split(';')
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| format!("corner `{pair}` is not `x,y`"))?;
            Ok(Point::new(parse_number(x)?, parse_number(y)?))
        })
        .collect::<std::result::Result<Vec<Point>, String>>()?;
    match points.as_slice() {
        [tl, tr, br, bl] => Ok(Quadrilateral::new(*tl, *tr, *br, *bl)),
        _ => Err(format!("expected 4 corners, got {}", points.len())),
    }
}

fn parse_rect(s: &str) -> std::result::Result<Rect, String> {
    let values = s
        .split(',')
        .map(parse_number)
        .collect::<std::result::Result<Vec<f64>, String>>()?;
    match values.as_slice() {
        [x, y, width, height] if *width > 0.0 && *height > 0.0 => {
            Ok(Rect::new(*x, *y, *width, *height))
        }
        [_, _, _, _] => Err("crop width and height must be positive".into()),
        _ => Err(format!("expected x,y,width,height, got {} values", values.len())),
    }
}
