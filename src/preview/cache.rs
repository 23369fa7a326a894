use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    assets::{PreparedImage, decode::decode_image},
    foundation::error::{ReelError, ReelResult},
    foundation::math::Fnv1a64,
    timeline::project::Project,
};

/// Source identity of an image: a hash of its encoded bytes.
///
/// Within an [`ImageCache`], different bytes that hash alike are moved to the next free key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageKey(pub u64);

impl ImageKey {
    /// Hash `bytes` into a key.
    pub fn of(bytes: &[u8]) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(bytes);
        Self(h.finish())
    }
}

/// Read-only decoded images, filled once before playback starts.
///
/// Library entries with identical bytes share one decoded image.
#[derive(Clone, Debug, Default)]
pub struct ImageCache {
    by_name: HashMap<String, ImageKey>,
    images: HashMap<ImageKey, PreparedImage>,
    sources: HashMap<ImageKey, Arc<Vec<u8>>>,
}

impl ImageCache {
    /// Decode every image referenced by the project's timeline.
    #[tracing::instrument(skip(project), fields(clips = project.timeline.len()))]
    pub fn prepare(project: &Project) -> ReelResult<Self> {
        let mut cache = Self::default();
        for clip in project.timeline.clips() {
            if cache.by_name.contains_key(&clip.image) {
                continue;
            }
            let bytes = project.images.require(&clip.image)?;
            let key = cache
                .intern(ImageKey::of(bytes), bytes)
                .map_err(|e| {
                    ReelError::validation(format!(
                        "clip '{}' image '{}' cannot be decoded: {e}",
                        clip.id, clip.image
                    ))
                })?;
            cache.by_name.insert(clip.image.clone(), key);
        }
        tracing::debug!(
            names = cache.by_name.len(),
            decoded = cache.images.len(),
            "image cache ready"
        );
        Ok(cache)
    }

    // Hash hits are confirmed byte-for-byte; a collision probes the following keys.
    fn intern(&mut self, mut key: ImageKey, bytes: &Arc<Vec<u8>>) -> ReelResult<ImageKey> {
        loop {
            match self.sources.get(&key) {
                Some(existing) if existing.as_slice() == bytes.as_slice() => return Ok(key),
                Some(_) => {
                    tracing::debug!(key = key.0, "image key collision, probing next key");
                    key = ImageKey(key.0.wrapping_add(1));
                }
                None => break,
            }
        }
        let prepared = decode_image(bytes)?;
        self.images.insert(key, prepared);
        self.sources.insert(key, Arc::clone(bytes));
        Ok(key)
    }

    /// Decoded image for a library name.
    pub fn get(&self, name: &str) -> Option<&PreparedImage> {
        self.by_name.get(name).and_then(|k| self.images.get(k))
    }

    /// Source identity for a library name.
    pub fn key_of(&self, name: &str) -> Option<ImageKey> {
        self.by_name.get(name).copied()
    }

    /// Number of distinct decoded images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Return `true` when nothing has been decoded.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/cache.rs"]
mod tests;
