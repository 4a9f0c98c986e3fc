//! Typed per-entity component storage.
//!
//! One `ComponentTable<T>` per component type; no type-erased lookups.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::data::Vec2;
use crate::ids::{DocId, EntityId};
use crate::overlay::OverlayLayer;
use crate::state::AnimState;
use crate::visibility::VisibilityFilter;

/// Map from entity to one component type.
#[derive(Debug, Clone)]
pub struct ComponentTable<T> {
    rows: HashMap<EntityId, T>,
}

impl<T> Default for ComponentTable<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<T> ComponentTable<T> {
    #[inline]
    pub fn get(&self, e: EntityId) -> Option<&T> {
        self.rows.get(&e)
    }

    #[inline]
    pub fn get_mut(&mut self, e: EntityId) -> Option<&mut T> {
        self.rows.get_mut(&e)
    }

    pub fn insert(&mut self, e: EntityId, value: T) -> Option<T> {
        self.rows.insert(e, value)
    }

    pub fn remove(&mut self, e: EntityId) -> Option<T> {
        self.rows.remove(&e)
    }

    pub fn contains(&self, e: EntityId) -> bool {
        self.rows.contains_key(&e)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.rows.iter_mut().map(|(e, v)| (*e, v))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: Default> ComponentTable<T> {
    /// Fetch or create the component.
    pub fn entry(&mut self, e: EntityId) -> &mut T {
        self.rows.entry(e).or_default()
    }
}

/// Playback layers of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animator {
    pub doc: DocId,
    /// `None` is the idle state.
    pub primary: Option<AnimState>,
    pub overlays: Vec<OverlayLayer>,
}

impl Animator {
    pub fn new(doc: DocId) -> Self {
        Self {
            doc,
            primary: None,
            overlays: Vec::new(),
        }
    }
}

/// All entity components known to the engine.
#[derive(Debug, Default)]
pub struct World {
    entities: Vec<EntityId>,
    pub positions: ComponentTable<Vec2>,
    pub animators: ComponentTable<Animator>,
    pub visibility: ComponentTable<VisibilityFilter>,
    pub highlights: ComponentTable<f32>,
    pub image_overrides: ComponentTable<HashMap<String, String>>,
}

impl World {
    pub fn spawn(&mut self, e: EntityId, doc: DocId, position: Vec2) {
        self.entities.push(e);
        self.positions.insert(e, position);
        self.animators.insert(e, Animator::new(doc));
    }

    /// Drop every component of `e`. Returns false if it did not exist.
    pub fn despawn(&mut self, e: EntityId) -> bool {
        let Some(idx) = self.entities.iter().position(|x| *x == e) else {
            return false;
        };
        self.entities.remove(idx);
        self.positions.remove(e);
        self.animators.remove(e);
        self.visibility.remove(e);
        self.highlights.remove(e);
        self.image_overrides.remove(e);
        true
    }

    pub fn contains(&self, e: EntityId) -> bool {
        self.animators.contains(e)
    }

    /// Live entities in spawn (ascending id) order.
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn despawn_removes_every_component() {
        let mut w = World::default();
        let e = EntityId(3);
        w.spawn(e, DocId(0), Vec2::new(1.0, 2.0));
        w.visibility.entry(e).set_override("arm", true);
        w.highlights.insert(e, 0.5);
        assert!(w.contains(e));
        assert!(w.despawn(e));
        assert!(!w.contains(e));
        assert!(w.positions.get(e).is_none());
        assert!(w.visibility.get(e).is_none());
        assert!(w.highlights.is_empty());
        assert!(!w.despawn(e));
        assert!(w.entities().is_empty());
    }
}
