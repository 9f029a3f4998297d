//! Gallery configuration module.
//!
//! Handles loading, validating, and adapting gallery settings. A
//! [`GalleryConfig`] is built once, validated, and then passed by reference to
//! everything that needs it; nothing reads settings from global state.
//!
//! ## Sources
//!
//! - `gallery.toml` in a site directory, merged over the stock defaults
//!   ([`load_config`]).
//! - The host build system's settings map, keyed by the upper-case
//!   `GALLERY_*` names ([`GalleryConfig::from_host_settings`]).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! folder = "galleries"              # Public path segment for generated images
//! src_path = "gallery_src"          # Root holding one folder per gallery
//! output_path = "output/galleries"  # Root receiving generated images
//! regenerate_existing = false       # Re-render outputs that already exist
//! output_format = "jpeg"            # jpeg | png | webp | avif
//! quality = 75                      # Lossy encoding quality (1-100)
//! unknown_actions = "reject"        # reject | ignore
//! on_error = "abort"                # abort | continue
//!
//! [[presets]]
//! name = "thumb"
//! actions = [{ type = "fit", width = 100, height = 100, from = [0.5, 0.5] }]
//!
//! [processing]
//! max_processes = 4                 # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early. Arrays such as `presets`
//! replace the default list wholesale rather than being merged.

use crate::imaging::{OutputFormat, Quality};
use crate::preset::{Action, Preset, UnknownActionPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILENAME: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Host settings error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How a gallery build reacts to a failed (file, preset) unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The first failure fails the whole gallery.
    #[default]
    Abort,
    /// Record the failure, leave that file out of the gallery, keep going.
    Continue,
}

/// Gallery configuration.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Public path segment prefixed to every generated image's `src`.
    pub folder: String,
    /// Root directory holding one source folder per gallery.
    pub src_path: PathBuf,
    /// Root directory receiving `{gallery}/{preset}/{file}` outputs.
    pub output_path: PathBuf,
    /// Re-render outputs even when the file already exists.
    pub regenerate_existing: bool,
    /// Encoding for every output file (filenames are kept as-is).
    pub output_format: OutputFormat,
    /// Lossy encoding quality (1-100).
    pub quality: u32,
    /// Treatment of action types this crate does not implement.
    pub unknown_actions: UnknownActionPolicy,
    /// Behavior when a single (file, preset) unit fails.
    pub on_error: FailurePolicy,
    /// CSS class hint passed through to templates; not used for processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_gallery_class: Option<String>,
    /// Presets applied to every image, in order.
    pub presets: Vec<Preset>,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            folder: "galleries".to_string(),
            src_path: PathBuf::from("gallery_src"),
            output_path: PathBuf::from("output/galleries"),
            regenerate_existing: false,
            output_format: OutputFormat::default(),
            quality: Quality::default().value(),
            unknown_actions: UnknownActionPolicy::default(),
            on_error: FailurePolicy::default(),
            thumbnail_gallery_class: None,
            presets: default_presets(),
            processing: ProcessingConfig::default(),
        }
    }
}

/// The stock preset set: a square thumbnail, a wide slider crop, a large
/// bounded view and a greyscale thumbnail.
pub fn default_presets() -> Vec<Preset> {
    vec![
        Preset::new("thumb", vec![Action::fit(100, 100)]),
        Preset::new("slider", vec![Action::fit(900, 300)]),
        Preset::new(
            "large",
            vec![Action::Resize {
                width: 850,
                height: 640,
            }],
        ),
        Preset::new(
            "thumb_greyscale",
            vec![Action::fit(100, 100), Action::Greyscale],
        ),
    ]
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }

        let mut seen = HashSet::new();
        for preset in &self.presets {
            validate_preset_name(&preset.name)?;
            if !seen.insert(preset.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate preset name `{}`",
                    preset.name
                )));
            }
            for action in &preset.actions {
                validate_action(&preset.name, action)?;
            }
            if self.unknown_actions == UnknownActionPolicy::Reject
                && let Some(kind) = preset.unknown_kinds().first()
            {
                return Err(ConfigError::Validation(format!(
                    "preset `{}` uses unknown action `{kind}`",
                    preset.name
                )));
            }
        }
        Ok(())
    }

    /// Encoding quality as the imaging layer expects it.
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    /// Build a config from the host build system's settings map.
    ///
    /// Reads `GALLERY_FOLDER`, `GALLERY_SRC_PATH`, `GALLERY_OUTPUT_PATH`,
    /// `GALLERY_REGENERATE_EXISTING`, `GALLERY_PRESETS`,
    /// `GALLERY_OUTPUT_FORMAT`, `GALLERY_QUALITY`, `GALLERY_UNKNOWN_ACTIONS`,
    /// `GALLERY_ON_ERROR` and `THUMBNAIL_GALLERY_CLASS`; every other key is
    /// ignored. Absent keys keep
    /// their defaults, except `GALLERY_PRESETS`: a site that defines none gets
    /// an empty preset list.
    pub fn from_host_settings(settings: &serde_json::Value) -> Result<Self, ConfigError> {
        let host = HostSettings::deserialize(settings)?;
        let defaults = Self::default();

        let config = Self {
            folder: host.folder.unwrap_or(defaults.folder),
            src_path: host.src_path.unwrap_or(defaults.src_path),
            output_path: host.output_path.unwrap_or(defaults.output_path),
            regenerate_existing: host
                .regenerate_existing
                .unwrap_or(defaults.regenerate_existing),
            output_format: host.output_format.unwrap_or(defaults.output_format),
            quality: host.quality.unwrap_or(defaults.quality),
            unknown_actions: host.unknown_actions.unwrap_or(defaults.unknown_actions),
            on_error: host.on_error.unwrap_or(defaults.on_error),
            thumbnail_gallery_class: host.thumbnail_gallery_class,
            presets: host.presets.unwrap_or_default(),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }
}

fn validate_preset_name(name: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if name.is_empty() || !single_normal || name.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "preset name `{name}` must be a single, non-empty folder name"
        )));
    }
    Ok(())
}

fn validate_action(preset: &str, action: &Action) -> Result<(), ConfigError> {
    match action {
        Action::Fit {
            width,
            height,
            anchor,
        } => {
            if *width == 0 || *height == 0 {
                return Err(ConfigError::Validation(format!(
                    "preset `{preset}`: fit dimensions must be non-zero"
                )));
            }
            if anchor.is_some_and(|a| !a.is_normalized()) {
                return Err(ConfigError::Validation(format!(
                    "preset `{preset}`: fit anchor must lie within [0, 1]"
                )));
            }
        }
        Action::Resize { width, height } => {
            if *width == 0 || *height == 0 {
                return Err(ConfigError::Validation(format!(
                    "preset `{preset}`: resize dimensions must be non-zero"
                )));
            }
        }
        Action::Greyscale | Action::Unknown(_) => {}
    }
    Ok(())
}

/// Host build-system settings, keyed the way site settings files spell them.
#[derive(Debug, Deserialize)]
struct HostSettings {
    #[serde(rename = "GALLERY_FOLDER")]
    folder: Option<String>,
    #[serde(rename = "GALLERY_SRC_PATH")]
    src_path: Option<PathBuf>,
    #[serde(rename = "GALLERY_OUTPUT_PATH")]
    output_path: Option<PathBuf>,
    #[serde(rename = "GALLERY_REGENERATE_EXISTING")]
    regenerate_existing: Option<bool>,
    #[serde(rename = "GALLERY_OUTPUT_FORMAT")]
    output_format: Option<OutputFormat>,
    #[serde(rename = "GALLERY_QUALITY")]
    quality: Option<u32>,
    #[serde(rename = "GALLERY_UNKNOWN_ACTIONS")]
    unknown_actions: Option<UnknownActionPolicy>,
    #[serde(rename = "GALLERY_ON_ERROR")]
    on_error: Option<FailurePolicy>,
    #[serde(rename = "GALLERY_PRESETS")]
    presets: Option<Vec<Preset>>,
    #[serde(rename = "THUMBNAIL_GALLERY_CLASS")]
    thumbnail_gallery_class: Option<String>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Only the first call in a process takes effect; later calls are no-ops.
pub fn init_thread_pool(processing: &ProcessingConfig) {
    let threads = effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `gallery.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `gallery.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `gallery.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
pub fn stock_config_toml() -> &'static str {
    r##"# Gallery Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# Public path segment prefixed to every generated image. Templates reference
# images as {folder}/{gallery}/{preset}/{filename}.
folder = "galleries"

# Root directory holding one folder of source photos per gallery.
src_path = "gallery_src"

# Root directory receiving generated images.
output_path = "output/galleries"

# Re-render images whose output file already exists.
# When false, existing outputs are reused and only their size is read back.
regenerate_existing = false

# Encoding for every generated file: "jpeg", "png", "webp" or "avif".
# Output files keep the source filename whatever the encoding.
output_format = "jpeg"

# Lossy encoding quality (1 = worst, 100 = best).
quality = 75

# What to do with an action type that is not fit, resize or greyscale:
# "reject" fails the configuration, "ignore" skips the action with a warning.
unknown_actions = "reject"

# What to do when one image fails to process:
# "abort" fails the whole gallery, "continue" records the error and leaves
# that image out.
on_error = "abort"

# CSS class hint for thumbnail markup, passed through to templates.
# thumbnail_gallery_class = "span2"

# ---------------------------------------------------------------------------
# Presets
# ---------------------------------------------------------------------------
# Each preset becomes an output folder and a key in every photo's result set.
# Actions run in the order listed:
#   { type = "fit", width, height, from = [x, y] }  crop-and-scale to exactly
#       width x height; `from` is the crop anchor, [0.5, 0.5] = center
#   { type = "resize", width, height }  shrink to fit within width x height
#   { type = "greyscale" }  convert to single-channel luminance

[[presets]]
name = "thumb"
actions = [{ type = "fit", width = 100, height = 100 }]

[[presets]]
name = "slider"
actions = [{ type = "fit", width = 900, height = 300 }]

[[presets]]
name = "large"
actions = [{ type = "resize", width = 850, height = 640 }]

[[presets]]
name = "thumb_greyscale"
actions = [
    { type = "fit", width = 100, height = 100 },
    { type = "greyscale" },
]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
