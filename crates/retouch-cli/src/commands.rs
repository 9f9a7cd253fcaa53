//! Subcommand implementations.

use anyhow::{Context, Result};
use retouch_core::decode::open_image;
use retouch_core::histogram::compute_histogram;
use retouch_core::{process_folder, BatchOptions, EditSession, PreviewMapping, SessionConfig};

use crate::cli::{BatchArgs, EditArgs, InfoArgs};
use crate::steps::Step;

/// Summary of a scripted edit.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EditSummary {
    pub applied: usize,
    pub notices: usize,
}

pub fn edit(args: &EditArgs) -> Result<EditSummary> {
    let config = SessionConfig {
        max_undo: args.max_undo,
        display_area: args.display,
        jpeg_quality: args.quality,
        font_path: args.font.clone(),
        ..SessionConfig::default()
    };
    let mut session = EditSession::new(config);
    session
        .open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    println!("{}", session.status());

    let mut summary = EditSummary::default();
    for raw in &args.steps {
        let result = raw.parse::<Step>().and_then(|step| step.apply(&mut session));
        match result {
            Ok(()) => {
                summary.applied += 1;
                println!("{}", session.status());
            }
            Err(e) if e.is_notice() => {
                summary.notices += 1;
                log::warn!("Step '{}': {}", raw, e);
                eprintln!("notice: {}: {}", raw, e);
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("Step '{}' failed", raw)));
            }
        }
    }

    session
        .save_as(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    println!("{}", session.status());
    Ok(summary)
}

/// Batch options from the command line, starting from the "everything"
/// preset when `--all` is given.
pub fn batch_options(args: &BatchArgs) -> BatchOptions {
    let mut options = if args.all {
        BatchOptions::everything()
    } else {
        BatchOptions::default()
    };
    if let Some(width) = args.resize {
        options.resize_width = Some(width);
    }
    if let Some(angle) = args.rotate {
        options.rotate_angle = angle;
    }
    if let Some(crop) = args.crop {
        options.crop_box = Some(crop);
    }
    if let Some(filter) = args.filter {
        options.filter = Some(filter);
    }
    if let Some(text) = &args.watermark {
        options.watermark_text = Some(text.clone());
    }
    options.font_path = args.font.clone();
    options.jpeg_quality = args.quality;
    options
}

/// Returns `false` when any file failed.
pub fn batch(args: &BatchArgs) -> Result<bool> {
    let options = batch_options(args);
    log::debug!("Batch options: {:?}", options);

    let report = process_folder(&args.input_dir, &args.output_dir, &options)
        .with_context(|| format!("Batch run on {} failed", args.input_dir.display()))?;

    for path in &report.processed {
        println!("OK: {}", path.display());
    }
    for (name, error) in &report.failed {
        eprintln!("FAILED: {}: {}", name, error);
    }
    println!(
        "Done: {} processed, {} failed",
        report.processed.len(),
        report.failed.len()
    );
    Ok(report.is_success())
}

pub fn info(args: &InfoArgs) -> Result<()> {
    let image = open_image(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let (w, h) = image.dimensions();
    let mapping = PreviewMapping::compute(w, h, args.display.0, args.display.1);
    let hist = compute_histogram(&image);

    println!("{}: {}x{}", args.input.display(), w, h);
    let (dw, dh) = mapping.display_size();
    let (ox, oy) = mapping.offset();
    let (aw, ah) = mapping.area();
    println!(
        "preview: ratio {:.3}, {}x{} at ({}, {}) in {}x{}",
        mapping.ratio(),
        dw,
        dh,
        ox,
        oy,
        aw,
        ah
    );
    if let (Some(mean), Some((lo, hi))) = (hist.mean_luma(), hist.luma_range()) {
        println!("luma: mean {:.1}, range {}..{}", mean, lo, hi);
    }
    println!(
        "clipping: shadows {}, highlights {}",
        yes_no(hist.has_shadow_clipping()),
        yes_no(hist.has_highlight_clipping())
    );
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}
