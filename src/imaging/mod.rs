//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Fit** | anchored `crop_imm` + `resize_exact` (Lanczos3) |
//! | **Resize** | `resize_exact` (Nearest), shrink only |
//! | **Greyscale** | `to_luma8` |
//! | **Encode** | JPEG, PNG, WebP or AVIF |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop and bounding-box math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining steps + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{CropRect, calculate_fit_crop, calculate_fit_within};
pub use operations::{get_dimensions, run_pipeline};
pub use params::{Anchor, EncodeParams, OutputFormat, Quality, Step};
pub use rust_backend::RustBackend;
