//! Overlay compositor: decides which playback layer drives each track.
//!
//! Overlay layers own the track names they declare; every other track follows
//! the primary layer. Each layer maps its own clip/logical frame to a physical
//! index, so layers can sit on unrelated parts of the timeline.

use serde::{Deserialize, Serialize};

use crate::segments::ClipTable;
use crate::state::AnimState;

/// Secondary cursor plus the tracks it may supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLayer {
    pub state: AnimState,
    pub tracks: Vec<String>,
}

impl OverlayLayer {
    pub fn new(state: AnimState, tracks: Vec<String>) -> Self {
        Self { state, tracks }
    }

    #[inline]
    pub fn supplies(&self, track: &str) -> bool {
        self.tracks.iter().any(|t| t == track)
    }
}

/// Which layer of an entity supplied a track (or raised an event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerRef {
    Primary,
    Overlay(usize),
}

/// One layer resolved for the current tick.
#[derive(Debug, Clone, Copy)]
struct ResolvedLayer<'a> {
    state: &'a AnimState,
    /// `None` when the clip is unknown, empty, or the frame is out of range.
    physical: Option<usize>,
}

impl<'a> ResolvedLayer<'a> {
    fn new(state: &'a AnimState, clips: &ClipTable) -> Self {
        Self {
            state,
            physical: clips.map_logical_to_physical(&state.clip, state.logical_frame),
        }
    }
}

/// Per-render view over an entity's layers.
#[derive(Debug)]
pub struct Compositor<'a> {
    primary: Option<ResolvedLayer<'a>>,
    overlays: Vec<ResolvedLayer<'a>>,
    declared: Vec<&'a [String]>,
}

impl<'a> Compositor<'a> {
    pub fn new(
        primary: Option<&'a AnimState>,
        overlays: &'a [OverlayLayer],
        clips: &ClipTable,
    ) -> Self {
        Self {
            primary: primary.map(|s| ResolvedLayer::new(s, clips)),
            overlays: overlays
                .iter()
                .map(|o| ResolvedLayer::new(&o.state, clips))
                .collect(),
            declared: overlays.iter().map(|o| o.tracks.as_slice()).collect(),
        }
    }

    /// Layer authoritative for `track`. The most recently added overlay that
    /// declares the track wins; otherwise the primary layer, if any.
    pub fn layer_for(&self, track: &str) -> Option<LayerRef> {
        let overlay = self
            .declared
            .iter()
            .rposition(|names| names.iter().any(|n| n == track));
        match overlay {
            Some(i) => Some(LayerRef::Overlay(i)),
            None => self.primary.as_ref().map(|_| LayerRef::Primary),
        }
    }

    fn layer(&self, layer: LayerRef) -> Option<&ResolvedLayer<'a>> {
        match layer {
            LayerRef::Primary => self.primary.as_ref(),
            LayerRef::Overlay(i) => self.overlays.get(i),
        }
    }

    /// Physical frame index `track` should be posed from this tick.
    pub fn physical_for(&self, track: &str) -> Option<usize> {
        self.layer(self.layer_for(track)?)?.physical
    }

    /// Playback state of the layer driving `track`.
    pub fn state_for(&self, track: &str) -> Option<&'a AnimState> {
        self.layer(self.layer_for(track)?).map(|l| l.state)
    }
}
