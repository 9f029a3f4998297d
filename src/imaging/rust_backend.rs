//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only, format sniffed from content) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `ImageReader::decode` |
//! | Fit | `crop_imm` around the anchor, then `resize_exact` with `Lanczos3` |
//! | Resize | `resize_exact` with `Nearest`, never upscaling |
//! | Greyscale | `to_luma8` |
//! | Encode | `JpegEncoder` / `PngEncoder` / `WebPEncoder` (lossless) / `AvifEncoder` (rav1e, speed 6) |
//!
//! Formats are sniffed from file content rather than extensions because
//! outputs keep their source filename while being re-encoded: `a.png` in an
//! output folder usually holds JPEG data.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{calculate_fit_crop, calculate_fit_within};
use super::params::{EncodeParams, OutputFormat, Step};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageReader};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<File>>, BackendError> {
    let decode_err = |e: std::io::Error| BackendError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    ImageReader::open(path)
        .map_err(decode_err)?
        .with_guessed_format()
        .map_err(decode_err)
}

/// Convert an image into a pixel layout the target encoder accepts.
///
/// JPEG has no alpha channel, so alpha is dropped. High bit-depth and float
/// buffers are narrowed to 8 bits for the lossy encoders.
fn prepare_for(format: OutputFormat, img: &DynamicImage) -> Cow<'_, DynamicImage> {
    let color = img.color();
    match format {
        OutputFormat::Jpeg => match color {
            ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(img),
            ColorType::La8 | ColorType::L16 | ColorType::La16 => {
                Cow::Owned(DynamicImage::ImageLuma8(img.to_luma8()))
            }
            _ => Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8())),
        },
        OutputFormat::Webp => match color {
            ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => {
                Cow::Borrowed(img)
            }
            _ => Cow::Owned(narrow_to_rgb(img)),
        },
        OutputFormat::Avif => match color {
            ColorType::Rgb8 | ColorType::Rgba8 => Cow::Borrowed(img),
            _ => Cow::Owned(narrow_to_rgb(img)),
        },
        OutputFormat::Png => match color {
            ColorType::Rgb32F | ColorType::Rgba32F => Cow::Owned(narrow_to_rgb(img)),
            _ => Cow::Borrowed(img),
        },
    }
}

fn narrow_to_rgb(img: &DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

/// Sibling path the encoder writes to before the result is moved into place.
fn temp_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!(".{name}.tmp"))
}

fn write_encoded<W: Write>(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
    writer: W,
) -> image::ImageResult<()> {
    match format {
        OutputFormat::Jpeg => img.write_with_encoder(
            image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality),
        ),
        OutputFormat::Png => img.write_with_encoder(image::codecs::png::PngEncoder::new(writer)),
        OutputFormat::Webp => {
            img.write_with_encoder(image::codecs::webp::WebPEncoder::new_lossless(writer))
        }
        OutputFormat::Avif => img.write_with_encoder(
            image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, 6, quality),
        ),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) =
            open_reader(path)?
                .into_dimensions()
                .map_err(|e| BackendError::Decode {
                    path: path.to_path_buf(),
                    reason: format!("Failed to read dimensions: {e}"),
                })?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        open_reader(path)?.decode().map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn apply(&self, image: DynamicImage, step: &Step) -> Result<DynamicImage, BackendError> {
        let out = match *step {
            Step::Fit {
                width,
                height,
                anchor,
            } => {
                let rect =
                    calculate_fit_crop((image.width(), image.height()), (width, height), anchor);
                image
                    .crop_imm(rect.x, rect.y, rect.width, rect.height)
                    .resize_exact(width, height, FilterType::Lanczos3)
            }
            Step::Resize { width, height } => {
                let source = (image.width(), image.height());
                let (w, h) = calculate_fit_within(source, (width, height));
                if (w, h) == source {
                    image
                } else {
                    image.resize_exact(w, h, FilterType::Nearest)
                }
            }
            Step::Greyscale => DynamicImage::ImageLuma8(image.to_luma8()),
        };
        Ok(out)
    }

    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<(), BackendError> {
        let tmp = temp_path(&params.output);
        let io_err = |source: std::io::Error| BackendError::Io {
            path: params.output.clone(),
            source,
        };

        let prepared = prepare_for(params.format, image);
        let quality = params.quality.value() as u8;

        let result = File::create(&tmp).map_err(io_err).and_then(|file| {
            let mut writer = BufWriter::new(file);
            write_encoded(&prepared, params.format, quality, &mut writer).map_err(|e| {
                BackendError::Encode {
                    path: params.output.clone(),
                    reason: format!("{} encode failed: {e}", params.format),
                }
            })?;
            writer.flush().map_err(io_err)
        });

        match result {
            Ok(()) => std::fs::rename(&tmp, &params.output).map_err(io_err),
            Err(e) => {
                let _ = std::fs::remove_file(&tmp);
                Err(e)
            }
        }
    }
}
