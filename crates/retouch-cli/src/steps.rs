//! Editing steps given on the command line.
//!
//! Each step is `name` or `name=value`. Steps map one-to-one onto
//! [`EditSession`] operations; `drag` replays a full pointer gesture.

use std::fmt;
use std::str::FromStr;

use retouch_core::session::{parse_angle, parse_crop_box, parse_width};
use retouch_core::watermark::DEFAULT_FONT_SIZE;
use retouch_core::{CropBox, EditError, EditSession, FilterKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Resize(u32),
    Rotate(f64),
    Crop(CropBox),
    Drag { from: (f64, f64), to: (f64, f64) },
    Filter(FilterKind),
    BrightnessContrast(f32, f32),
    Watermark { text: String, size: u32 },
    Enhance,
    Equalize,
    Undo,
    Reset,
    Probe(f64, f64),
}

fn invalid(msg: impl Into<String>) -> EditError {
    EditError::InvalidInput(msg.into())
}

fn parse_numbers<T: FromStr>(value: &str, count: usize, what: &str) -> Result<Vec<T>, EditError> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != count {
        return Err(invalid(format!("{} needs {} comma-separated numbers", what, count)));
    }
    parts
        .iter()
        .map(|p| {
            p.parse::<T>()
                .map_err(|_| invalid(format!("invalid number '{}' in {}", p, what)))
        })
        .collect()
}

fn parse_coords(value: &str, count: usize, what: &str) -> Result<Vec<f64>, EditError> {
    let n = parse_numbers::<f64>(value, count, what)?;
    if let Some(bad) = n.iter().find(|v| !v.is_finite()) {
        return Err(invalid(format!("invalid coordinate '{}' in {}", bad, what)));
    }
    Ok(n)
}

fn need<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, EditError> {
    value.ok_or_else(|| invalid(format!("step '{}' needs a value", name)))
}

fn parse_watermark(value: &str) -> (String, u32) {
    if let Some((text, size)) = value.rsplit_once('@') {
        if let Ok(size) = size.trim().parse::<u32>() {
            return (text.to_string(), size);
        }
    }
    (value.to_string(), DEFAULT_FONT_SIZE as u32)
}

impl FromStr for Step {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once('=') {
            Some((n, v)) => (n.trim(), Some(v)),
            None => (s.trim(), None),
        };
        let arg = || need(name, value);

        let step = match name.to_ascii_lowercase().as_str() {
            "resize" => Step::Resize(parse_width(arg()?)?),
            "rotate" => Step::Rotate(parse_angle(arg()?)?),
            "crop" => Step::Crop(parse_crop_box(arg()?)?),
            "drag" => {
                let n = parse_coords(arg()?, 4, "drag")?;
                Step::Drag {
                    from: (n[0], n[1]),
                    to: (n[2], n[3]),
                }
            }
            "filter" => Step::Filter(
                arg()?
                    .parse()
                    .map_err(|e: retouch_core::filters::UnknownFilter| invalid(e.to_string()))?,
            ),
            "bc" => {
                let n = parse_numbers::<f32>(arg()?, 2, "bc")?;
                Step::BrightnessContrast(n[0], n[1])
            }
            "watermark" => {
                let (text, size) = parse_watermark(arg()?);
                Step::Watermark { text, size }
            }
            "probe" => {
                let n = parse_coords(arg()?, 2, "probe")?;
                Step::Probe(n[0], n[1])
            }
            "enhance" => Step::Enhance,
            "equalize" => Step::Equalize,
            "undo" => Step::Undo,
            "reset" => Step::Reset,
            other => return Err(invalid(format!("unknown step '{}'", other))),
        };
        Ok(step)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Resize(w) => write!(f, "resize={}", w),
            Step::Rotate(a) => write!(f, "rotate={}", a),
            Step::Crop(b) => write!(f, "crop={},{},{},{}", b.left, b.top, b.right, b.bottom),
            Step::Drag { from, to } => write!(f, "drag={},{},{},{}", from.0, from.1, to.0, to.1),
            Step::Filter(k) => write!(f, "filter={}", k),
            Step::BrightnessContrast(b, c) => write!(f, "bc={},{}", b, c),
            Step::Watermark { text, size } => write!(f, "watermark={}@{}", text, size),
            Step::Enhance => write!(f, "enhance"),
            Step::Equalize => write!(f, "equalize"),
            Step::Undo => write!(f, "undo"),
            Step::Reset => write!(f, "reset"),
            Step::Probe(x, y) => write!(f, "probe={},{}", x, y),
        }
    }
}

impl Step {
    /// Run the step against a session.
    pub fn apply(&self, session: &mut EditSession) -> Result<(), EditError> {
        match self {
            Step::Resize(w) => session.resize_to_width(*w),
            Step::Rotate(a) => session.rotate(*a),
            Step::Crop(b) => session.crop(*b),
            Step::Drag { from, to } => {
                session.begin_crop_drag(from.0, from.1)?;
                let mid = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
                session.update_crop_drag(mid.0, mid.1);
                session.update_crop_drag(to.0, to.1);
                session.finish_crop_drag(to.0, to.1).map(|_| ())
            }
            Step::Filter(k) => session.apply_filter(*k),
            Step::BrightnessContrast(b, c) => session.brightness_contrast(*b, *c),
            Step::Watermark { text, size } => session.watermark(text, *size),
            Step::Enhance => session.auto_enhance(),
            Step::Equalize => session.equalize(),
            Step::Undo => session.undo(),
            Step::Reset => session.reset(),
            Step::Probe(x, y) => session.probe(*x, *y).map(|_| ()),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_resize_parses_positive_widths(w in 1u32..100_000) {
            prop_assert_eq!(format!("resize={}", w).parse::<Step>().ok(), Some(Step::Resize(w)));
        }

        #[test]
        fn prop_garbage_never_panics(s in "\\PC{0,24}") {
            let _ = s.parse::<Step>();
        }
    }
}
