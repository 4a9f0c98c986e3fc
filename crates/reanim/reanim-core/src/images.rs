//! Image lookup seam.
//!
//! Image refs in a document are plain string keys. The host owns the actual
//! textures and implements `ImageResolver`; the engine only needs a handle
//! and the image size to build destination quads.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Host-side image handle plus its pixel size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

/// Resolves authored image refs to host handles.
/// A `None` means the part is skipped for this frame.
pub trait ImageResolver {
    fn resolve(&self, image_ref: &str) -> Option<ImageHandle>;
}

/// Simple in-memory image table keyed by image ref.
#[derive(Debug, Clone)]
pub struct ImageTable {
    images: HashMap<String, ImageHandle>,
    /// `None` once every `u32` id has been handed out.
    next_id: Option<u32>,
}

impl Default for ImageTable {
    fn default() -> Self {
        Self {
            images: HashMap::new(),
            next_id: Some(0),
        }
    }
}

impl ImageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image ref, allocating the next handle id. Re-registering a
    /// ref returns its existing handle. `None` when the id space is exhausted.
    pub fn register(
        &mut self,
        image_ref: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Option<ImageHandle> {
        let image_ref = image_ref.into();
        if let Some(existing) = self.images.get(&image_ref) {
            return Some(*existing);
        }
        let id = self.next_id?;
        self.next_id = id.checked_add(1);
        let handle = ImageHandle { id, width, height };
        self.images.insert(image_ref, handle);
        Some(handle)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageResolver for ImageTable {
    fn resolve(&self, image_ref: &str) -> Option<ImageHandle> {
        self.images.get(image_ref).copied()
    }
}

impl<F> ImageResolver for F
where
    F: Fn(&str) -> Option<ImageHandle>,
{
    fn resolve(&self, image_ref: &str) -> Option<ImageHandle> {
        self(image_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent_per_ref() {
        let mut t = ImageTable::new();
        let a = t.register("IMAGE_HEAD", 32, 40).unwrap();
        let b = t.register("IMAGE_BODY", 50, 60).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(t.register("IMAGE_HEAD", 1, 1), Some(a));
        assert_eq!(t.resolve("IMAGE_BODY"), Some(b));
        assert_eq!(t.resolve(""), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn ids_never_wrap() {
        let mut t = ImageTable {
            next_id: Some(u32::MAX),
            ..ImageTable::default()
        };
        let last = t.register("IMAGE_LAST", 1, 1).unwrap();
        assert_eq!(last.id, u32::MAX);
        assert_eq!(t.register("IMAGE_MORE", 1, 1), None);
        assert!(t.resolve("IMAGE_MORE").is_none());
        // existing refs still resolve and re-register
        assert_eq!(t.register("IMAGE_LAST", 1, 1), Some(last));
    }

    #[test]
    fn closures_resolve() {
        let r = |name: &str| {
            (name == "IMAGE_X").then_some(ImageHandle {
                id: 7,
                width: 1,
                height: 1,
            })
        };
        assert_eq!(r.resolve("IMAGE_X").map(|h| h.id), Some(7));
        assert!(r.resolve("IMAGE_Y").is_none());
    }
}
