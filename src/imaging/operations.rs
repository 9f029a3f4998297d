//! High-level image operations.
//!
//! These functions combine resolved steps with backend execution.

use super::backend::{BackendError, ImageBackend};
use super::params::{EncodeParams, Step};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Run a transform pipeline: decode `source`, apply every step in order,
/// then encode the final image.
///
/// Each step consumes the previous step's output. An empty step list
/// re-encodes the source unchanged.
pub fn run_pipeline(
    backend: &impl ImageBackend,
    source: &Path,
    steps: &[Step],
    encode: &EncodeParams,
) -> Result<()> {
    let mut image = backend.decode(source)?;
    for step in steps {
        image = backend.apply(image, step)?;
    }
    backend.encode(&image, encode)
}
