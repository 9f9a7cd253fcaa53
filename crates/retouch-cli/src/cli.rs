//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use retouch_core::session::parse_crop_box;
use retouch_core::{CropBox, FilterKind};

/// Retouch image editor.
///
/// Edit a single image with a script of steps, or apply one set of edits to
/// every image in a folder.
#[derive(Parser, Debug)]
#[command(
    name = "retouch",
    version,
    about = "Retouch command-line image editor",
    long_about = "Edit a single image with a sequence of steps, or batch-process a\n\
                  folder of images.\n\n\
                  Examples:\n  \
                  retouch edit photo.jpg -o out.jpg resize=800 rotate=90 filter=sharpen\n  \
                  retouch edit photo.jpg -o out.png drag=420,260,700,500 enhance\n  \
                  retouch batch shots/ done/ --all"
)]
pub struct Cli {
    /// Log debug output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append log output to this file instead of stderr.
    #[arg(long, global = true, value_name = "FILE", env = "RETOUCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a script of editing steps on one image and save the result.
    Edit(EditArgs),
    /// Apply the same edits to every image in a folder.
    Batch(BatchArgs),
    /// Print image dimensions, preview layout and a histogram summary.
    Info(InfoArgs),
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Image to edit.
    pub input: PathBuf,

    /// Where to save the result. The extension picks the format.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Preview area used to interpret drag and probe coordinates.
    #[arg(long, value_name = "WxH", default_value = "900x600", value_parser = parse_size, env = "RETOUCH_DISPLAY")]
    pub display: (u32, u32),

    /// Number of undo steps kept.
    #[arg(long, value_name = "N", default_value_t = 10, env = "RETOUCH_MAX_UNDO")]
    pub max_undo: usize,

    /// Font file for watermarks.
    #[arg(long, value_name = "FILE", env = "RETOUCH_FONT")]
    pub font: Option<PathBuf>,

    /// JPEG quality (1-100).
    #[arg(short, long, default_value_t = 95, value_parser = clap::value_parser!(u8).range(1..=100), env = "RETOUCH_JPEG_QUALITY")]
    pub quality: u8,

    /// Steps, run in order:
    /// resize=W, rotate=DEG, crop=L,U,R,D, drag=X0,Y0,X1,Y1,
    /// filter=blur|sharpen|edge|bw, bc=B,C, watermark=TEXT[@SIZE],
    /// enhance, equalize, undo, reset, probe=X,Y
    #[arg(value_name = "STEP")]
    pub steps: Vec<String>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Folder with the source images.
    pub input_dir: PathBuf,

    /// Folder for the results. Created if missing.
    pub output_dir: PathBuf,

    /// Resize every image to this width.
    #[arg(long, value_name = "W", value_parser = clap::value_parser!(u32).range(1..))]
    pub resize: Option<u32>,

    /// Rotate counter-clockwise by this many degrees.
    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    pub rotate: Option<f64>,

    /// Crop box; areas outside the image are filled black.
    #[arg(long, value_name = "L,U,R,D", value_parser = parse_box, allow_hyphen_values = true)]
    pub crop: Option<CropBox>,

    /// Filter: blur, sharpen, edge or bw.
    #[arg(long, value_name = "FILTER")]
    pub filter: Option<FilterKind>,

    /// Watermark text, drawn in the top-left corner.
    #[arg(long, value_name = "TEXT")]
    pub watermark: Option<String>,

    /// Font file for watermarks.
    #[arg(long, value_name = "FILE", env = "RETOUCH_FONT")]
    pub font: Option<PathBuf>,

    /// JPEG quality (1-100).
    #[arg(short, long, default_value_t = 95, value_parser = clap::value_parser!(u8).range(1..=100), env = "RETOUCH_JPEG_QUALITY")]
    pub quality: u8,

    /// Resize to 800, rotate 90, sharpen and watermark. Other flags
    /// override the individual settings.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Image to inspect.
    pub input: PathBuf,

    /// Preview area to lay the image out in.
    #[arg(long, value_name = "WxH", default_value = "900x600", value_parser = parse_size, env = "RETOUCH_DISPLAY")]
    pub display: (u32, u32),
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("bad height '{}': {}", h, e))?;
    Ok((w, h))
}

fn parse_box(s: &str) -> Result<CropBox, String> {
    parse_crop_box(s).map_err(|e| e.to_string())
}
