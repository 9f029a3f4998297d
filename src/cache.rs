//! Regeneration policy for generated images.
//!
//! Rendering a preset means decoding the source, running every action and
//! encoding the result. This module decides when that work can be skipped.
//!
//! # Policy
//!
//! The cache is the output directory itself. An output is reused when:
//! 1. a file already exists at `{output}/{gallery}/{preset}/{filename}`, and
//! 2. `regenerate_existing` is off.
//!
//! Reuse skips decoding, transforms and encoding entirely. Reporting does
//! not change: every result's width and height are read back from the file
//! on disk, reused or freshly written, so what templates see always matches
//! the actual artifact.
//!
//! There is no content hashing: editing a source photo or a preset does not
//! invalidate existing outputs. Turn on `regenerate_existing` (or delete the
//! output folder) after such changes.
//!
//! Writes go through a temporary sibling file that is renamed into place,
//! so an interrupted encode never leaves a partial file behind to be
//! mistaken for a finished one.

use std::fmt;
use std::path::Path;

/// Whether an existing output can be reused instead of regenerated.
pub fn is_cached(output_path: &Path, regenerate_existing: bool) -> bool {
    !regenerate_existing && output_path.is_file()
}

/// Summary of cache performance for a gallery build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }

    /// Fold another run's counts into this one.
    pub fn absorb(&mut self, other: CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} encoded ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} encoded", self.misses)
        }
    }
}
