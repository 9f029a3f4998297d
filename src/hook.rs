//! Attaching galleries to content items.
//!
//! The host build system hands over each content item's metadata as a JSON
//! object. An item that names a gallery carries `"gallery": "trip"`; after
//! the hook runs that string is replaced with the gallery's
//! [`GalleryContext`](crate::types::GalleryContext):
//!
//! ```json
//! {"gallery": {"galleryName": "trip", "photos": [{"thumb": {"src": "...", "width": 100, "height": 100}}]}}
//! ```
//!
//! Items without the field are left alone.

use crate::config::{GalleryConfig, init_thread_pool};
use crate::gallery::{GalleryBuilder, GalleryError};
use crate::imaging::{ImageBackend, RustBackend};
use crate::types::Gallery;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Metadata key naming an item's gallery.
pub const GALLERY_FIELD: &str = "gallery";

/// A content item's metadata.
pub type Metadata = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("`gallery` must be a gallery name string, found {0}")]
    InvalidField(Value),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    #[error("failed to serialize gallery context: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The gallery name an item asks for, if any.
pub fn gallery_name(metadata: &Metadata) -> Result<Option<&str>, HookError> {
    match metadata.get(GALLERY_FIELD) {
        None => Ok(None),
        Some(Value::String(name)) => Ok(Some(name)),
        Some(other) => Err(HookError::InvalidField(other.clone())),
    }
}

/// Build the item's gallery and replace its `gallery` field with the
/// template context. Returns the built gallery, or `None` when the item
/// names none.
pub fn attach_gallery(
    metadata: &mut Metadata,
    config: &GalleryConfig,
) -> Result<Option<Gallery>, HookError> {
    attach_with(&GalleryBuilder::new(config, &RustBackend::new()), metadata)
}

pub fn attach_with<B: ImageBackend>(
    builder: &GalleryBuilder<'_, B>,
    metadata: &mut Metadata,
) -> Result<Option<Gallery>, HookError> {
    let Some(name) = gallery_name(metadata)?.map(str::to_string) else {
        return Ok(None);
    };
    let gallery = builder.build(&name)?;
    let context = context_value(builder, &gallery)?;
    metadata.insert(GALLERY_FIELD.to_string(), context);
    Ok(Some(gallery))
}

/// Attach galleries to every item, articles and pages alike.
///
/// Each distinct gallery is built once, however many items share it.
/// Returns the galleries built, in first-seen order. Sizes the worker pool
/// from `[processing]` on first use.
pub fn attach_all(
    items: &mut [Metadata],
    config: &GalleryConfig,
) -> Result<Vec<Gallery>, HookError> {
    init_thread_pool(&config.processing);
    attach_all_with(&GalleryBuilder::new(config, &RustBackend::new()), items)
}

pub fn attach_all_with<B: ImageBackend>(
    builder: &GalleryBuilder<'_, B>,
    items: &mut [Metadata],
) -> Result<Vec<Gallery>, HookError> {
    let mut contexts: HashMap<String, Value> = HashMap::new();
    let mut built = Vec::new();

    for metadata in items.iter_mut() {
        let Some(name) = gallery_name(metadata)?.map(str::to_string) else {
            continue;
        };
        let context = match contexts.get(&name) {
            Some(context) => context.clone(),
            None => {
                let gallery = builder.build(&name)?;
                let context = context_value(builder, &gallery)?;
                contexts.insert(name, context.clone());
                built.push(gallery);
                context
            }
        };
        metadata.insert(GALLERY_FIELD.to_string(), context);
    }
    Ok(built)
}

fn context_value<B: ImageBackend>(
    builder: &GalleryBuilder<'_, B>,
    gallery: &Gallery,
) -> Result<Value, HookError> {
    let class = builder.config().thumbnail_gallery_class.as_deref();
    Ok(serde_json::to_value(gallery.context(class))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::preset::{Action, Preset};
    use crate::test_helpers::GalleryFixture;
    use serde_json::json;

    fn metadata(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn thumb_only() -> Vec<Preset> {
        vec![Preset::new("thumb", vec![Action::fit(100, 100)])]
    }

    #[test]
    fn item_without_gallery_untouched() {
        let fx = GalleryFixture::new("trip", &["a.jpg"]);
        let config = fx.config(thumb_only());
        let backend = MockBackend::new();
        let builder = GalleryBuilder::new(&config, &backend);
        let mut item = metadata(json!({"title": "Hello"}));

        let result = attach_with(&builder, &mut item).unwrap();

        assert!(result.is_none());
        assert_eq!(Value::Object(item), json!({"title": "Hello"}));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn gallery_field_replaced_with_context() {
        let fx = GalleryFixture::new("trip", &["a.jpg"]);
        let mut config = fx.config(thumb_only());
        config.thumbnail_gallery_class = Some("span2".into());
        let backend = MockBackend::new();
        let builder = GalleryBuilder::new(&config, &backend);
        let mut item = metadata(json!({"title": "Trip", "gallery": "trip"}));

        let gallery = attach_with(&builder, &mut item).unwrap().unwrap();

        assert_eq!(gallery.name, "trip");
        assert_eq!(item["title"], "Trip");
        assert_eq!(
            item["gallery"],
            json!({
                "galleryName": "trip",
                "photos": [
                    {"thumb": {"src": "galleries/trip/thumb/a.jpg", "width": 100, "height": 100}}
                ],
                "thumbnailGalleryClass": "span2"
            })
        );
    }

    #[test]
    fn non_string_field_rejected() {
        let fx = GalleryFixture::new("trip", &["a.jpg"]);
        let config = fx.config(thumb_only());
        let backend = MockBackend::new();
        let builder = GalleryBuilder::new(&config, &backend);
        let mut item = metadata(json!({"gallery": 42}));

        let err = attach_with(&builder, &mut item).unwrap_err();
        assert!(matches!(err, HookError::InvalidField(Value::Number(_))));
    }

    #[test]
    fn missing_gallery_surfaces_gallery_error() {
        let fx = GalleryFixture::new("trip", &["a.jpg"]);
        let config = fx.config(thumb_only());
        let backend = MockBackend::new();
        let builder = GalleryBuilder::new(&config, &backend);
        let mut item = metadata(json!({"gallery": "elsewhere"}));

        let err = attach_with(&builder, &mut item).unwrap_err();
        assert!(matches!(
            err,
            HookError::Gallery(GalleryError::SourceNotFound { .. })
        ));
        // Field left as it was
        assert_eq!(item["gallery"], "elsewhere");
    }

    #[test]
    fn attach_all_builds_each_gallery_once() {
        let fx = GalleryFixture::new("trip", &["a.jpg", "b.jpg"]);
        let config = fx.config(thumb_only());
        let backend = MockBackend::new();
        let builder = GalleryBuilder::new(&config, &backend);
        let mut items = vec![
            metadata(json!({"title": "article", "gallery": "trip"})),
            metadata(json!({"title": "plain"})),
            metadata(json!({"title": "page", "gallery": "trip"})),
        ];

        let built = attach_all_with(&builder, &mut items).unwrap();

        assert_eq!(built.len(), 1);
        assert_eq!(items[0]["gallery"], items[2]["gallery"]);
        assert_eq!(items[0]["gallery"]["photos"].as_array().unwrap().len(), 2);
        assert!(items[1].get("gallery").is_none());
        // Two files, one preset, one build
        assert_eq!(backend.count(|op| matches!(op, RecordedOp::Identify(_))), 2);
    }
}
