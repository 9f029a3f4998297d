//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: identify, decode, apply and encode. A preset pipeline is a decode,
//! one `apply` per step in listed order, and an encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording mock in [`tests`].

use super::params::{EncodeParams, Step};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Images are opened and released within each call; nothing holds a file
/// handle between operations.
pub trait ImageBackend: Sync {
    /// Read the pixel dimensions of an image on disk.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Open and fully decode an image.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Apply one transform step, consuming the previous image.
    fn apply(&self, image: DynamicImage, step: &Step) -> Result<DynamicImage, BackendError>;

    /// Persist an image with the given encoding.
    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<(), BackendError>;
}
