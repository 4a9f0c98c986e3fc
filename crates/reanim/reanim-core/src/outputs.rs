//! Output contracts from the core engine.
//!
//! `Engine::update()` reports discrete playback events. Poses are not pushed;
//! callers pull draw parts with `Engine::render()` after updating.

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;
use crate::overlay::LayerRef;

/// Discrete signals emitted while applying inputs and stepping.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum CoreEvent {
    ClipStarted {
        entity: EntityId,
        layer: LayerRef,
        clip: String,
    },
    /// Wrapped from the last logical frame back to 0.
    ClipLooped {
        entity: EntityId,
        layer: LayerRef,
        clip: String,
    },
    /// Sent once, on the tick the latch sets. `AnimState::is_finished`
    /// stays true until the next play.
    ClipFinished {
        entity: EntityId,
        layer: LayerRef,
        clip: String,
    },
    /// Play requested a clip the document does not define. Playback still
    /// starts but draws nothing.
    UnknownClip {
        entity: EntityId,
        clip: String,
    },
    UnknownEntity {
        entity: EntityId,
    },
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<CoreEvent>,
    /// Events discarded because of `Config::max_events_per_tick`.
    #[serde(default)]
    pub dropped_events: usize,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped_events = 0;
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent, cap: usize) {
        if self.events.len() < cap {
            self.events.push(event);
        } else {
            self.dropped_events += 1;
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Entities whose primary clip finished this tick.
    pub fn finished(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.events.iter().filter_map(|e| match e {
            CoreEvent::ClipFinished {
                entity,
                layer: LayerRef::Primary,
                ..
            } => Some(*entity),
            _ => None,
        })
    }
}
