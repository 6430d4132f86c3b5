use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::FormState;
use crate::error::{StarMapError, StarMapResult};

pub const SVG_MIME_TYPE: &str = "image/svg+xml;charset=utf-8";

/// Reference to a registered blob, usable as a download href.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exported image of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub generation: u64,
    pub markup: String,
    pub mime_type: &'static str,
    pub url: ObjectUrl,
}

impl RenderedArtifact {
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.markup.as_bytes()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markup.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }
}

/// Issues and releases object URLs for artifact bytes.
pub trait ObjectUrlRegistry {
    fn create_object_url(&mut self, bytes: &[u8], mime_type: &str) -> StarMapResult<ObjectUrl>;

    fn revoke_object_url(&mut self, url: &ObjectUrl);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Process-local blob registry issuing `blob:night-sky/<n>` URLs.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    next_id: u64,
    blobs: IndexMap<ObjectUrl, StoredBlob>,
}

impl InMemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn resolve(&self, url: &ObjectUrl) -> Option<&StoredBlob> {
        self.blobs.get(url)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.blobs.len()
    }
}

impl ObjectUrlRegistry for InMemoryBlobStore {
    fn create_object_url(&mut self, bytes: &[u8], mime_type: &str) -> StarMapResult<ObjectUrl> {
        if mime_type.is_empty() {
            return Err(StarMapError::Capture(
                "blob mime type must not be empty".to_owned(),
            ));
        }
        self.next_id += 1;
        let url = ObjectUrl::new(format!("blob:night-sky/{}", self.next_id));
        self.blobs.insert(
            url.clone(),
            StoredBlob {
                bytes: bytes.to_vec(),
                mime_type: mime_type.to_owned(),
            },
        );
        Ok(url)
    }

    fn revoke_object_url(&mut self, url: &ObjectUrl) {
        self.blobs.shift_remove(url);
    }
}

/// Download name: `{prefix}-{date}-{longitude}-{latitude}.svg`.
///
/// Form text is used verbatim, so a negative longitude produces a doubled
/// hyphen (`star-map-2024-03-01--0.1278-51.5074.svg`).
#[must_use]
pub fn artifact_filename(prefix: &str, form: &FormState) -> String {
    format!(
        "{prefix}-{}-{}-{}.svg",
        form.date, form.longitude, form.latitude
    )
}
