//! # Preset Gal
//!
//! Preset-driven gallery image generation for static site builds.
//! A gallery is a folder of photos; a preset is a named, ordered list of
//! transform actions. Every photo goes through every preset, and the results
//! are attached to the content item that asked for the gallery so templates
//! can render it.
//!
//! # Pipeline
//!
//! ```text
//! content item        "gallery": "trip"
//!     │
//!     ▼
//! GalleryBuilder      gallery_src/trip/*  →  output/galleries/trip/{preset}/*
//!     │                 (one PhotoProcessor run per file × preset)
//!     ▼
//! content item        "gallery": {galleryName, photos: [{thumb: {src, width, height}}, ...]}
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `gallery.toml` loading over stock defaults, validation, host-settings adapter |
//! | [`preset`] | Presets and actions, and their resolution into executable steps |
//! | [`gallery`] | GalleryBuilder: output folders, photo discovery, failure policy, progress events |
//! | [`process`] | PhotoProcessor: one source image through one preset, honoring the cache |
//! | [`cache`] | Regeneration policy and cache statistics |
//! | [`types`] | Results and the template-facing gallery context |
//! | [`hook`] | Replaces a content item's `gallery` field with the built gallery |
//! | [`imaging`] | Pure-Rust image operations: fit, resize, greyscale, encode |
//! | [`output`] | Progress output formatting |
//!
//! # Design Decisions
//!
//! ## The Output Folder Is the Cache
//!
//! An output that already exists is reused unless `regenerate_existing` is
//! set. Dimensions are always read back from the file on disk, so templates
//! describe the artifact that is actually there. See [`cache`].
//!
//! ## Actions Are an Enum
//!
//! Configured actions parse into [`preset::Action`]. Types this crate does not
//! implement become [`preset::Action::Unknown`] and are rejected by default;
//! sites that relied on them being skipped can set `unknown_actions = "ignore"`.
//!
//! ## One Output Format
//!
//! Every output is re-encoded to a single configured format (JPEG by default)
//! while keeping the source filename, so `a.png` under `thumb/` may hold JPEG
//! data. Images are always identified by content, never by extension.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate only: no ImageMagick, no
//! system libraries.

pub mod cache;
pub mod config;
pub mod gallery;
pub mod hook;
pub mod imaging;
pub mod output;
pub mod preset;
pub mod process;
pub mod types;

pub use config::{GalleryConfig, load_config};
pub use gallery::{GalleryBuilder, GalleryError, GalleryEvent, build_gallery};
pub use hook::{attach_all, attach_gallery};
pub use preset::{Action, Preset};
pub use types::{Gallery, GalleryContext, PhotoResult, PhotoResultSet};

#[cfg(test)]
pub(crate) mod test_helpers;
