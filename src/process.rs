//! Photo processing: one source image through one preset.
//!
//! [`process_photo`] is the unit of work the gallery builder schedules for
//! every (file, preset) pair:
//!
//! 1. Resolve the preset's actions into steps (unknown actions follow the
//!    configured [`UnknownActionPolicy`]).
//! 2. If the output is [cached](crate::cache::is_cached), do nothing else.
//!    Otherwise decode the source, apply each step in listed order, and encode
//!    the result to `{output_dir}/{filename}`.
//! 3. Read the final dimensions back from the output file, regenerated or not.
//!
//! The output keeps the source filename; only the encoding changes.

use crate::cache::is_cached;
use crate::config::GalleryConfig;
use crate::imaging::{
    BackendError, EncodeParams, ImageBackend, OutputFormat, Quality, get_dimensions, run_pipeline,
};
use crate::preset::{Preset, UnknownAction, UnknownActionPolicy};
use crate::types::PhotoResult;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    UnknownAction(#[from] UnknownAction),
}

/// Settings that shape every unit of work in a gallery build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessOptions {
    pub regenerate_existing: bool,
    pub format: OutputFormat,
    pub quality: Quality,
    pub unknown_actions: UnknownActionPolicy,
}

impl ProcessOptions {
    pub fn from_config(config: &GalleryConfig) -> Self {
        Self {
            regenerate_existing: config.regenerate_existing,
            format: config.output_format,
            quality: config.quality(),
            unknown_actions: config.unknown_actions,
        }
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self::from_config(&GalleryConfig::default())
    }
}

/// One (file, preset) unit.
#[derive(Debug, Clone)]
pub struct PhotoJob<'a> {
    pub source: &'a Path,
    pub preset: &'a Preset,
    /// The preset's folder inside the gallery output directory.
    pub output_dir: &'a Path,
    /// Source filename, reused for the output.
    pub filename: &'a str,
    pub public_path: String,
}

/// How a variant was produced in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantStatus {
    /// Existing output reused.
    Cached,
    /// Output rendered and written.
    Encoded,
    /// The unit failed; only reported under the `continue` failure policy.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ProcessedPhoto {
    pub result: PhotoResult,
    pub status: VariantStatus,
}

pub fn process_photo(
    backend: &impl ImageBackend,
    job: &PhotoJob<'_>,
    options: &ProcessOptions,
) -> Result<ProcessedPhoto, ProcessError> {
    let steps = job.preset.plan(options.unknown_actions)?;
    let output_path = job.output_dir.join(job.filename);

    let status = if is_cached(&output_path, options.regenerate_existing) {
        tracing::debug!(output = %output_path.display(), "reusing existing output");
        VariantStatus::Cached
    } else {
        run_pipeline(
            backend,
            job.source,
            &steps,
            &EncodeParams {
                output: output_path.clone(),
                format: options.format,
                quality: options.quality,
            },
        )?;
        VariantStatus::Encoded
    };

    let (width, height) = get_dimensions(backend, &output_path)?;

    Ok(ProcessedPhoto {
        result: PhotoResult {
            source_path: job.source.to_path_buf(),
            output_path,
            public_path: job.public_path.clone(),
            width,
            height,
        },
        status,
    })
}
