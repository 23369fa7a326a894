use std::{collections::BTreeMap, sync::Arc};

use crate::{
    foundation::error::{ReelError, ReelResult},
    timeline::model::Timeline,
};

/// Encoded image bytes keyed by the filename clips reference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageLibrary {
    images: BTreeMap<String, Arc<Vec<u8>>>,
}

impl ImageLibrary {
    /// Empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an image.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Arc<Vec<u8>>>) {
        self.images.insert(name.into(), bytes.into());
    }

    /// Encoded bytes for `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<Vec<u8>>> {
        self.images.get(name)
    }

    /// Encoded bytes for `name`, or a validation error naming the missing reference.
    pub fn require(&self, name: &str) -> ReelResult<&Arc<Vec<u8>>> {
        self.get(name).ok_or_else(|| {
            ReelError::validation(format!("image '{name}' is not present in the library"))
        })
    }

    /// Iterate `(name, bytes)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Vec<u8>>)> {
        self.images.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of stored images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Return `true` when no image is stored.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Drop images no clip in `timeline` references.
    pub fn retain_referenced(&mut self, timeline: &Timeline) {
        self.images
            .retain(|name, _| timeline.clips().iter().any(|c| &c.image == name));
    }
}

/// A timeline together with the images it references.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Project {
    /// Clip sequence.
    pub timeline: Timeline,
    /// Encoded images keyed by clip image reference.
    pub images: ImageLibrary,
}

impl Project {
    /// Check that every clip's image is present.
    pub fn validate(&self) -> ReelResult<()> {
        for clip in self.timeline.clips() {
            self.images.require(&clip.image).map_err(|_| {
                ReelError::validation(format!(
                    "clip '{}' references missing image '{}'",
                    clip.id, clip.image
                ))
            })?;
        }
        Ok(())
    }
}
