//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Handle to a compiled document in the library.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DocId(pub u32);

/// Handle to an animated entity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Monotonic allocator for DocId and EntityId. Ids are never reused.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_doc: u32,
    next_entity: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_doc(&mut self) -> DocId {
        let id = DocId(self.next_doc);
        self.next_doc = self.next_doc.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity = self.next_entity.wrapping_add(1);
        id
    }
}
