//! Shared test utilities for the preset-gal test suite.
//!
//! Synthetic images are written with the `image` crate's own encoders, so no
//! binary fixtures live in the repo.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fx = GalleryFixture::new("trip", &["b.jpg", "a.jpg"]);
//! let config = fx.config(vec![Preset::new("thumb", vec![Action::fit(100, 100)])]);
//! let gallery = GalleryBuilder::new(&config, &MockBackend::new()).build("trip").unwrap();
//! assert!(fx.output_dir("trip").join("thumb/a.jpg").is_file());
//! ```

use crate::config::GalleryConfig;
use crate::preset::Preset;
use image::{ImageEncoder, RgbImage, RgbaImage};
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a gradient RGB JPEG.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let writer = BufWriter::new(fs::File::create(path).unwrap());
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a gradient RGBA PNG.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 64, 255])
    });
    let writer = BufWriter::new(fs::File::create(path).unwrap());
    image::codecs::png::PngEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
}

/// Create an empty file, and its parent folders.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"").unwrap();
}

// =========================================================================
// Gallery fixture
// =========================================================================

/// A temp site root with `gallery_src/{name}/` populated with empty files.
///
/// Empty files are enough for the mock backend; tests against the real
/// backend write images with [`create_test_jpeg`] instead.
pub struct GalleryFixture {
    tmp: TempDir,
}

impl GalleryFixture {
    pub fn new(gallery: &str, files: &[&str]) -> Self {
        let fx = Self {
            tmp: TempDir::new().unwrap(),
        };
        let dir = fx.source_dir(gallery);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            touch(&dir.join(file));
        }
        fx
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn source_dir(&self, gallery: &str) -> PathBuf {
        self.root().join("gallery_src").join(gallery)
    }

    pub fn output_dir(&self, gallery: &str) -> PathBuf {
        self.root().join("output").join(gallery)
    }

    /// Default config rooted in this fixture.
    pub fn config(&self, presets: Vec<Preset>) -> GalleryConfig {
        GalleryConfig {
            src_path: self.root().join("gallery_src"),
            output_path: self.root().join("output"),
            presets,
            ..GalleryConfig::default()
        }
    }
}

// =========================================================================
// Log capture
// =========================================================================

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a plain-text subscriber installed on this thread and return
/// its result with everything logged meanwhile.
///
/// Events from rayon worker threads are not captured.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let sink = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}
