//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the preset configuration (which names the transforms)
//! and the [`backend`](super::backend) (which does the pixel work). Keeping
//! them free of I/O lets a mock backend stand in for the real one.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 75). Clamped on construction.
//! - [`Anchor`]: Normalized crop anchor, `(0.5, 0.5)` by default.
//! - [`Step`]: One resolved transform: fit, resize or greyscale.
//! - [`OutputFormat`]: Encoding used for every written output file.
//! - [`EncodeParams`]: Output path, format and quality for one write.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// Normalized point in `[0, 1] × [0, 1]` deciding which region survives a crop.
///
/// `(0, 0)` keeps the top-left corner, `(1, 1)` the bottom-right. Serialized as
/// a two-element array (`from = [0.5, 0.5]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub const CENTER: Anchor = Anchor { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates lie within `[0, 1]`.
    pub fn is_normalized(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Clamp both coordinates into `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::CENTER
    }
}

impl From<[f64; 2]> for Anchor {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Anchor> for [f64; 2] {
    fn from(anchor: Anchor) -> Self {
        [anchor.x, anchor.y]
    }
}

/// A single resolved transform, with all defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Scale to cover `width × height`, then crop around `anchor`.
    Fit {
        width: u32,
        height: u32,
        anchor: Anchor,
    },
    /// Shrink to fit within `width × height`, preserving aspect ratio.
    Resize { width: u32, height: u32 },
    /// Convert to 8-bit single-channel luminance.
    Greyscale,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Fit {
                width,
                height,
                anchor,
            } => write!(f, "fit {width}x{height} @ ({}, {})", anchor.x, anchor.y),
            Step::Resize { width, height } => write!(f, "resize {width}x{height}"),
            Step::Greyscale => write!(f, "greyscale"),
        }
    }
}

/// Encoding for generated files. The output filename always keeps the
/// source filename, whatever the encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
    Avif,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Avif => "avif",
        };
        f.write_str(name)
    }
}

/// Parameters for writing one output image.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub output: PathBuf,
    pub format: OutputFormat,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_always_fits_encoder_byte() {
        for raw in [0, 101, 300, u32::MAX] {
            let q = Quality::new(raw).value();
            assert!((1..=100).contains(&q), "{raw} -> {q}");
            assert_eq!(u32::from(q as u8), q);
        }
    }

    #[test]
    fn quality_default_is_75() {
        assert_eq!(Quality::default().value(), 75);
    }

    #[test]
    fn anchor_defaults_to_center() {
        assert_eq!(Anchor::default(), Anchor::new(0.5, 0.5));
    }

    #[test]
    fn anchor_normalized_bounds() {
        assert!(Anchor::new(0.0, 1.0).is_normalized());
        assert!(!Anchor::new(-0.1, 0.5).is_normalized());
        assert!(!Anchor::new(0.5, 1.5).is_normalized());
        assert_eq!(Anchor::new(-1.0, 2.0).clamped(), Anchor::new(0.0, 1.0));
    }

    #[test]
    fn anchor_parses_from_array() {
        let anchor: Anchor = serde_json::from_str("[0.25, 0.75]").unwrap();
        assert_eq!(anchor, Anchor::new(0.25, 0.75));
        assert_eq!(serde_json::to_string(&anchor).unwrap(), "[0.25,0.75]");
    }

    #[test]
    fn output_format_parses_lowercase() {
        let format: OutputFormat = serde_json::from_str("\"webp\"").unwrap();
        assert_eq!(format, OutputFormat::Webp);
        assert_eq!(OutputFormat::default(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::Avif.to_string(), "avif");
    }

    #[test]
    fn step_display() {
        let fit = Step::Fit {
            width: 100,
            height: 50,
            anchor: Anchor::CENTER,
        };
        assert_eq!(fit.to_string(), "fit 100x50 @ (0.5, 0.5)");
        assert_eq!(Step::Greyscale.to_string(), "greyscale");
    }
}
