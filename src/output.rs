//! Progress output for gallery builds.
//!
//! Output leads with what was built, not with file paths:
//!
//! ```text
//! trip (2 photos, 2 presets)
//!     001 a.png
//!         thumb: encoded
//!         large: cached
//!     002 z.png
//!         thumb: failed (Failed to decode ...)
//!         large: cached
//! ```
//!
//! [`format_gallery_event`] is pure and returns lines for testability;
//! [`print_gallery_event`] writes them to stdout.

use crate::gallery::GalleryEvent;
use crate::process::VariantStatus;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

pub fn format_gallery_event(event: &GalleryEvent) -> Vec<String> {
    match event {
        GalleryEvent::GalleryStarted {
            gallery,
            photo_count,
            preset_count,
        } => vec![format!(
            "{} ({}, {})",
            gallery,
            plural(*photo_count, "photo"),
            plural(*preset_count, "preset")
        )],
        GalleryEvent::PhotoProcessed {
            index,
            filename,
            variants,
        } => {
            let mut lines = vec![format!("    {} {}", format_index(*index), filename)];
            for variant in variants {
                let status = match &variant.status {
                    VariantStatus::Cached => "cached".to_string(),
                    VariantStatus::Encoded => "encoded".to_string(),
                    VariantStatus::Failed(reason) => format!("failed ({reason})"),
                };
                lines.push(format!("        {}: {}", variant.preset, status));
            }
            lines
        }
    }
}

pub fn print_gallery_event(event: &GalleryEvent) {
    for line in format_gallery_event(event) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::VariantInfo;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn format_gallery_started() {
        let event = GalleryEvent::GalleryStarted {
            gallery: "trip".to_string(),
            photo_count: 2,
            preset_count: 1,
        };
        assert_eq!(format_gallery_event(&event), vec!["trip (2 photos, 1 preset)"]);
    }

    #[test]
    fn format_photo_processed() {
        let event = GalleryEvent::PhotoProcessed {
            index: 3,
            filename: "a.png".to_string(),
            variants: vec![
                VariantInfo {
                    preset: "thumb".to_string(),
                    status: VariantStatus::Encoded,
                },
                VariantInfo {
                    preset: "large".to_string(),
                    status: VariantStatus::Cached,
                },
                VariantInfo {
                    preset: "odd".to_string(),
                    status: VariantStatus::Failed("unknown action `sepia`".to_string()),
                },
            ],
        };
        let lines = format_gallery_event(&event);
        assert_eq!(
            lines,
            vec![
                "    003 a.png",
                "        thumb: encoded",
                "        large: cached",
                "        odd: failed (unknown action `sepia`)",
            ]
        );
    }
}
