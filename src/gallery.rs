//! Gallery building: folders, discovery, and one processor run per
//! (file, preset) pair.
//!
//! ## Layout
//!
//! ```text
//! {src_path}/{gallery}/            source photos (flat, no recursion)
//! {output_path}/{gallery}/{preset}/{filename}
//! ```
//!
//! ## Discovery
//!
//! Only regular files directly inside the gallery's source folder count.
//! Dotfiles (`.DS_Store`, AppleDouble `._*`) and the `Thumbs.db` /
//! `desktop.ini` artifacts Windows drops into photo folders are skipped.
//! Symlinked files are followed. Files are sorted by name; templates index
//! `photos[0]`, `photos[1]`, ... positionally, so that order is stable
//! across runs.
//!
//! ## Failures
//!
//! Under [`FailurePolicy::Abort`] the first failed unit (in file order) fails
//! the gallery. Under [`FailurePolicy::Continue`] failures are collected in
//! [`Gallery::errors`] and a file missing any preset is left out of
//! [`Gallery::photos`], so every published result set has every preset key.

use crate::cache::CacheStats;
use crate::config::{ConfigError, FailurePolicy, GalleryConfig};
use crate::imaging::{BackendError, ImageBackend, RustBackend};
use crate::process::{PhotoJob, ProcessError, ProcessOptions, VariantStatus, process_photo};
use crate::types::{Gallery, PhotoResultSet, public_path};
use rayon::prelude::*;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Files operating systems leave in photo folders.
const OS_ARTIFACTS: &[&str] = &["Thumbs.db", "desktop.ini"];

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid gallery name `{0}`")]
    InvalidName(String),
    #[error("gallery `{gallery}`: source folder not found: {path}")]
    SourceNotFound { gallery: String, path: PathBuf },
    #[error("gallery `{gallery}`: filesystem error at {path}: {source}")]
    Filesystem {
        gallery: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("gallery `{gallery}`, file `{file}`, preset `{preset}`: {source}")]
    Photo {
        gallery: String,
        file: String,
        preset: String,
        #[source]
        source: ProcessError,
    },
}

/// Coarse failure categories, for callers that branch on what went wrong
/// rather than where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration failed validation; nothing was processed.
    Config,
    SourceNotFound,
    Decode,
    Encode,
    UnknownAction,
    Filesystem,
}

impl GalleryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GalleryError::Config(_) => ErrorKind::Config,
            // A name that cannot address a folder has no source either
            GalleryError::InvalidName(_) | GalleryError::SourceNotFound { .. } => {
                ErrorKind::SourceNotFound
            }
            GalleryError::Filesystem { .. } => ErrorKind::Filesystem,
            GalleryError::Photo { source, .. } => match source {
                ProcessError::UnknownAction(_) => ErrorKind::UnknownAction,
                ProcessError::Backend(BackendError::Decode { .. }) => ErrorKind::Decode,
                ProcessError::Backend(BackendError::Encode { .. }) => ErrorKind::Encode,
                ProcessError::Backend(BackendError::Io { .. }) => ErrorKind::Filesystem,
            },
        }
    }
}

/// Progress events emitted while a gallery builds.
#[derive(Debug, Clone)]
pub enum GalleryEvent {
    GalleryStarted {
        gallery: String,
        photo_count: usize,
        preset_count: usize,
    },
    /// One source file went through every preset. Files are processed in
    /// parallel, so these may arrive out of `index` order.
    PhotoProcessed {
        /// 1-based position in sorted file order.
        index: usize,
        filename: String,
        variants: Vec<VariantInfo>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    pub preset: String,
    pub status: VariantStatus,
}

/// A discovered source photo.
#[derive(Debug, Clone)]
struct SourceFile {
    path: PathBuf,
    name: String,
}

struct FileOutcome {
    results: PhotoResultSet,
    errors: Vec<GalleryError>,
    stats: CacheStats,
}

/// Builds galleries from one immutable configuration.
pub struct GalleryBuilder<'a, B: ImageBackend> {
    config: &'a GalleryConfig,
    backend: &'a B,
    events: Option<Sender<GalleryEvent>>,
}

impl<'a, B: ImageBackend> GalleryBuilder<'a, B> {
    pub fn new(config: &'a GalleryConfig, backend: &'a B) -> Self {
        Self {
            config,
            backend,
            events: None,
        }
    }

    /// Report progress on `sender` as the gallery builds.
    pub fn with_events(mut self, sender: Sender<GalleryEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn config(&self) -> &'a GalleryConfig {
        self.config
    }

    /// Build one gallery. The configuration is validated first, so preset
    /// names can never address folders outside the output root.
    pub fn build(&self, name: &str) -> Result<Gallery, GalleryError> {
        self.config.validate()?;
        validate_gallery_name(name)?;

        let source_dir = self.config.src_path.join(name);
        if !source_dir.is_dir() {
            return Err(GalleryError::SourceNotFound {
                gallery: name.to_string(),
                path: source_dir,
            });
        }

        let output_dir = self.config.output_path.join(name);
        self.create_output_dirs(name, &output_dir)?;

        let files = discover_photos(&source_dir).map_err(|source| GalleryError::Filesystem {
            gallery: name.to_string(),
            path: source_dir.clone(),
            source,
        })?;

        self.emit(GalleryEvent::GalleryStarted {
            gallery: name.to_string(),
            photo_count: files.len(),
            preset_count: self.config.presets.len(),
        });

        let options = ProcessOptions::from_config(self.config);
        let outcomes: Vec<FileOutcome> = files
            .par_iter()
            .enumerate()
            .map(|(i, file)| self.process_file(name, &output_dir, i + 1, file, &options))
            .collect();

        let mut photos = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();
        let mut cache_stats = CacheStats::default();
        for outcome in outcomes {
            cache_stats.absorb(outcome.stats);
            if outcome.errors.is_empty() {
                photos.push(outcome.results);
            } else {
                errors.extend(outcome.errors);
            }
        }

        if self.config.on_error == FailurePolicy::Abort && !errors.is_empty() {
            return Err(errors.swap_remove(0));
        }

        tracing::info!(
            gallery = name,
            photos = photos.len(),
            failed = errors.len(),
            cache = %cache_stats,
            "gallery built"
        );

        Ok(Gallery {
            name: name.to_string(),
            source_dir,
            output_dir,
            presets: self.config.presets.clone(),
            photos,
            errors,
            cache_stats,
        })
    }

    fn create_output_dirs(&self, gallery: &str, output_dir: &Path) -> Result<(), GalleryError> {
        let create = |path: PathBuf| {
            fs::create_dir_all(&path).map_err(|source| GalleryError::Filesystem {
                gallery: gallery.to_string(),
                path,
                source,
            })
        };

        create(output_dir.to_path_buf())?;
        if self.config.presets.is_empty() {
            tracing::warn!(gallery, "no presets configured; gallery will have no images");
        }
        for preset in &self.config.presets {
            create(output_dir.join(&preset.name))?;
        }
        Ok(())
    }

    /// Run every preset over one file, in configured order.
    fn process_file(
        &self,
        gallery: &str,
        output_dir: &Path,
        index: usize,
        file: &SourceFile,
        options: &ProcessOptions,
    ) -> FileOutcome {
        let mut outcome = FileOutcome {
            results: PhotoResultSet::new(),
            errors: Vec::new(),
            stats: CacheStats::default(),
        };
        let mut variants = Vec::with_capacity(self.config.presets.len());

        for preset in &self.config.presets {
            let preset_dir = output_dir.join(&preset.name);
            let job = PhotoJob {
                source: &file.path,
                preset,
                output_dir: &preset_dir,
                filename: &file.name,
                public_path: public_path(&self.config.folder, gallery, &preset.name, &file.name),
            };

            match process_photo(self.backend, &job, options) {
                Ok(processed) => {
                    match processed.status {
                        VariantStatus::Cached => outcome.stats.hit(),
                        _ => outcome.stats.miss(),
                    }
                    variants.push(VariantInfo {
                        preset: preset.name.clone(),
                        status: processed.status,
                    });
                    outcome.results.insert(preset.name.clone(), processed.result);
                }
                Err(source) => {
                    variants.push(VariantInfo {
                        preset: preset.name.clone(),
                        status: VariantStatus::Failed(source.to_string()),
                    });
                    outcome.errors.push(GalleryError::Photo {
                        gallery: gallery.to_string(),
                        file: file.name.clone(),
                        preset: preset.name.clone(),
                        source,
                    });
                    if self.config.on_error == FailurePolicy::Abort {
                        break;
                    }
                }
            }
        }

        self.emit(GalleryEvent::PhotoProcessed {
            index,
            filename: file.name.clone(),
            variants,
        });
        outcome
    }

    fn emit(&self, event: GalleryEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver just means nobody is listening
            tx.send(event).ok();
        }
    }
}

/// Build a gallery with the default image backend.
pub fn build_gallery(config: &GalleryConfig, name: &str) -> Result<Gallery, GalleryError> {
    GalleryBuilder::new(config, &RustBackend::new()).build(name)
}

/// Gallery names are relative folder paths: `trip` or `2020/trip`.
fn validate_gallery_name(name: &str) -> Result<(), GalleryError> {
    let path = Path::new(name);
    let valid = !name.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if valid {
        Ok(())
    } else {
        Err(GalleryError::InvalidName(name.to_string()))
    }
}

fn is_os_artifact(name: &str) -> bool {
    name.starts_with('.') || OS_ARTIFACTS.contains(&name)
}

fn discover_photos(dir: &Path) -> Result<Vec<SourceFile>, std::io::Error> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // Broken symlinks and unreadable entries inside the folder
            Err(err) if err.depth() > 0 => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 filename");
            continue;
        };
        if is_os_artifact(name) {
            continue;
        }
        files.push(SourceFile {
            path: entry.path().to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(files)
}
