//! Depth-first replacement of image URLs inside arbitrary JSON.
//!
//! Strings that look like image URLs, and objects whose `url` property looks
//! like one, are downloaded, uploaded, and replaced by a
//! [`MediaReference`](crate::types::MediaReference). Everything else is copied
//! through. A failed image never fails the walk: the original value is kept
//! and a warning is logged.

use crate::classifier::is_image_url;
use crate::media::MediaUploader;
use crate::retriever::ImageRetriever;
use crate::types::MediaReference;
use futures::future::{BoxFuture, FutureExt, join_all};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Properties consulted, in order, for an upload caption on `{url, ...}` objects
const CAPTION_KEYS: [&str; 3] = ["caption", "alt", "name"];

/// Outcome of resolving one value
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The value with every resolvable image replaced
    pub value: Value,
    /// Image leaves replaced by a media reference
    pub images_resolved: usize,
    /// Image leaves left unchanged because download or upload failed
    pub images_failed: usize,
}

#[derive(Default)]
struct ResolveStats {
    resolved: AtomicUsize,
    failed: AtomicUsize,
}

/// Walks JSON values and materializes image URLs into media references
#[derive(Clone)]
pub struct ObjectImageResolver {
    retriever: ImageRetriever,
    uploader: MediaUploader,
}

impl ObjectImageResolver {
    /// Create a resolver from its retrieval and upload stages
    pub fn new(retriever: ImageRetriever, uploader: MediaUploader) -> Self {
        Self {
            retriever,
            uploader,
        }
    }

    /// Return a copy of `value` with image leaves replaced by media references
    ///
    /// Sibling images are resolved concurrently; this returns once every
    /// reachable leaf has completed.
    pub async fn process_object_for_images(&self, value: &Value) -> Value {
        self.resolve(value).await.value
    }

    /// Like [`process_object_for_images`](Self::process_object_for_images), with image counts
    pub async fn resolve(&self, value: &Value) -> Resolution {
        let stats = ResolveStats::default();
        let value = self.resolve_value(value, &stats).await;
        Resolution {
            value,
            images_resolved: stats.resolved.load(Ordering::Relaxed),
            images_failed: stats.failed.load(Ordering::Relaxed),
        }
    }

    fn resolve_value<'a>(&'a self, value: &'a Value, stats: &'a ResolveStats) -> BoxFuture<'a, Value> {
        async move {
            match value {
                Value::String(url) if is_image_url(url) => self
                    .resolve_image(url, None, stats)
                    .await
                    .unwrap_or_else(|| value.clone()),
                Value::Array(items) => Value::Array(
                    join_all(items.iter().map(|item| self.resolve_value(item, stats))).await,
                ),
                Value::Object(map) => Value::Object(self.resolve_object(map, stats).await),
                other => other.clone(),
            }
        }
        .boxed()
    }

    async fn resolve_object(&self, map: &Map<String, Value>, stats: &ResolveStats) -> Map<String, Value> {
        let properties = map.iter().map(|(key, value)| async move {
            (key.clone(), self.resolve_property(value, stats).await)
        });
        join_all(properties).await.into_iter().collect()
    }

    async fn resolve_property(&self, value: &Value, stats: &ResolveStats) -> Value {
        match value {
            Value::String(url) if is_image_url(url) => self
                .resolve_image(url, None, stats)
                .await
                .unwrap_or_else(|| value.clone()),
            Value::Object(object) => match image_object_url(object) {
                // The whole `{url, caption, ...}` object becomes the reference
                Some(url) => self
                    .resolve_image(url, caption_hint(object), stats)
                    .await
                    .unwrap_or_else(|| value.clone()),
                None => self.resolve_value(value, stats).await,
            },
            Value::Array(_) => self.resolve_value(value, stats).await,
            other => other.clone(),
        }
    }

    /// Download and upload one image; `None` means keep the original value
    async fn resolve_image(
        &self,
        url: &str,
        caption: Option<&str>,
        stats: &ResolveStats,
    ) -> Option<Value> {
        let uploaded = match self.retriever.download_image(url).await {
            Ok(asset) => self.uploader.upload(&asset, caption).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match uploaded {
            Ok(record) => {
                stats.resolved.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(url = %url, media_id = %record.id, "image replaced by media reference");
                Some(MediaReference::to_media(record.id).to_value())
            }
            Err(error) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(url = %url, error = %error, "keeping original value for unresolved image");
                None
            }
        }
    }
}

fn image_object_url(object: &Map<String, Value>) -> Option<&str> {
    object
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| is_image_url(url))
}

fn caption_hint(object: &Map<String, Value>) -> Option<&str> {
    CAPTION_KEYS.iter().find_map(|key| {
        object
            .get(*key)
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
    })
}
