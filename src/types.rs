//! Shared types produced by a gallery build and handed to templates.
//!
//! [`Gallery`] is the full in-memory result. [`GalleryContext`] is the
//! slimmer view serialized into a content item's metadata, shaped the way
//! templates index it: `gallery.photos[0]["thumb"].src`.

use crate::cache::CacheStats;
use crate::gallery::GalleryError;
use crate::preset::Preset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One generated image: where it came from, where it lives, how big it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoResult {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    /// `{folder}/{gallery}/{preset}/{filename}`, always `/`-separated.
    pub public_path: String,
    /// Dimensions read back from the file on disk after processing.
    pub width: u32,
    pub height: u32,
}

/// Results for one source file, keyed by preset name.
pub type PhotoResultSet = BTreeMap<String, PhotoResult>;

/// A fully built gallery.
///
/// Constructed once per content item that names a gallery and never mutated
/// afterwards. Generated files on disk outlive it.
#[derive(Debug)]
pub struct Gallery {
    pub name: String,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub presets: Vec<Preset>,
    /// One entry per source file, in sorted filename order.
    pub photos: Vec<PhotoResultSet>,
    /// Failures recorded under the `continue` failure policy.
    pub errors: Vec<GalleryError>,
    pub cache_stats: CacheStats,
}

impl Gallery {
    /// Template-facing view of this gallery.
    pub fn context(&self, thumbnail_gallery_class: Option<&str>) -> GalleryContext {
        GalleryContext {
            gallery_name: self.name.clone(),
            photos: self
                .photos
                .iter()
                .map(|set| {
                    set.iter()
                        .map(|(preset, result)| (preset.clone(), TemplatePhoto::from(result)))
                        .collect()
                })
                .collect(),
            thumbnail_gallery_class: thumbnail_gallery_class.map(str::to_string),
        }
    }
}

/// What templates see for a gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryContext {
    pub gallery_name: String,
    pub photos: Vec<BTreeMap<String, TemplatePhoto>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_gallery_class: Option<String>,
}

/// What templates see for one generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePhoto {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

impl From<&PhotoResult> for TemplatePhoto {
    fn from(result: &PhotoResult) -> Self {
        Self {
            src: result.public_path.clone(),
            width: result.width,
            height: result.height,
        }
    }
}

/// Build the URL-shaped path templates use to reference a generated image.
///
/// Segments are joined with `/` regardless of platform; an empty `folder`
/// is left out and stray slashes at the joins are trimmed.
pub fn public_path(folder: &str, gallery: &str, preset: &str, filename: &str) -> String {
    [folder, gallery, preset, filename]
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(public: &str, w: u32, h: u32) -> PhotoResult {
        PhotoResult {
            source_path: PathBuf::from("/src/x.jpg"),
            output_path: PathBuf::from("/out/x.jpg"),
            public_path: public.to_string(),
            width: w,
            height: h,
        }
    }

    #[test]
    fn public_path_joins_with_slashes() {
        assert_eq!(
            public_path("galleries", "trip", "thumb", "a.png"),
            "galleries/trip/thumb/a.png"
        );
    }

    #[test]
    fn public_path_trims_and_skips_empty_folder() {
        assert_eq!(
            public_path("/galleries/", "trip", "thumb", "a.png"),
            "galleries/trip/thumb/a.png"
        );
        assert_eq!(public_path("", "trip", "thumb", "a.png"), "trip/thumb/a.png");
    }

    #[test]
    fn public_path_keeps_nested_gallery() {
        assert_eq!(
            public_path("galleries", "2020/trip", "large", "b.jpg"),
            "galleries/2020/trip/large/b.jpg"
        );
    }

    #[test]
    fn context_serializes_for_templates() {
        let mut set = PhotoResultSet::new();
        set.insert(
            "thumb".to_string(),
            result("galleries/trip/thumb/a.png", 100, 100),
        );
        let gallery = Gallery {
            name: "trip".to_string(),
            source_dir: PathBuf::from("/src/trip"),
            output_dir: PathBuf::from("/out/trip"),
            presets: Vec::new(),
            photos: vec![set],
            errors: Vec::new(),
            cache_stats: CacheStats::default(),
        };

        let json = serde_json::to_value(gallery.context(None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "galleryName": "trip",
                "photos": [
                    {"thumb": {"src": "galleries/trip/thumb/a.png", "width": 100, "height": 100}}
                ]
            })
        );

        let json = serde_json::to_value(gallery.context(Some("span2"))).unwrap();
        assert_eq!(json["thumbnailGalleryClass"], "span2");
    }
}
