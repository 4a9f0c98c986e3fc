//! Input contracts for the core engine.
//!
//! Behavior code (or an adapter) queues per-entity commands and hands them to
//! `Engine::update()` once per tick. Commands apply before any state advances.

use serde::{Deserialize, Serialize};

use crate::data::Vec2;
use crate::ids::EntityId;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    #[serde(default)]
    pub commands: Vec<EntityCommand>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style push.
    pub fn with(mut self, cmd: EntityCommand) -> Self {
        self.commands.push(cmd);
        self
    }

    pub fn push(&mut self, cmd: EntityCommand) {
        self.commands.push(cmd);
    }
}

/// Request to (re)start a clip.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlayRequest {
    pub clip: String,
    #[serde(default)]
    pub looping: bool,
    /// Overrides the document rate for this playback.
    #[serde(default)]
    pub fps: Option<f32>,
}

impl PlayRequest {
    pub fn new(clip: impl Into<String>, looping: bool) -> Self {
        Self {
            clip: clip.into(),
            looping,
            fps: None,
        }
    }

    pub fn at_fps(mut self, fps: f32) -> Self {
        self.fps = Some(fps);
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum EntityCommand {
    /// Replace the primary layer and restart it.
    Play {
        entity: EntityId,
        request: PlayRequest,
    },
    /// Add an overlay supplying `tracks`, or restart the existing overlay
    /// for exactly the same track set.
    PlayOverlay {
        entity: EntityId,
        request: PlayRequest,
        tracks: Vec<String>,
    },
    /// Remove one overlay by the index reported in its `ClipStarted` event.
    /// Later overlays shift down by one.
    StopOverlay {
        entity: EntityId,
        layer: usize,
    },
    ClearOverlays {
        entity: EntityId,
    },
    /// Pause the primary layer and every overlay.
    Pause {
        entity: EntityId,
    },
    Resume {
        entity: EntityId,
    },
    /// Jump the primary layer to a logical frame (clamped) and clear its finish latch.
    Seek {
        entity: EntityId,
        frame: usize,
    },
    SetPosition {
        entity: EntityId,
        position: Vec2,
    },
    /// `Some(true)` forces visible, `Some(false)` forces hidden, `None` clears.
    SetOverride {
        entity: EntityId,
        track: String,
        visible: Option<bool>,
    },
    ClearOverrides {
        entity: EntityId,
    },
    /// `None` removes the allow-list.
    SetAllowList {
        entity: EntityId,
        tracks: Option<Vec<String>>,
    },
    SetHighlight {
        entity: EntityId,
        intensity: f32,
    },
    /// `None` restores the authored image.
    SetImageOverride {
        entity: EntityId,
        track: String,
        image: Option<String>,
    },
    Despawn {
        entity: EntityId,
    },
}

impl EntityCommand {
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Play { entity, .. }
            | Self::PlayOverlay { entity, .. }
            | Self::StopOverlay { entity, .. }
            | Self::ClearOverlays { entity }
            | Self::Pause { entity }
            | Self::Resume { entity }
            | Self::Seek { entity, .. }
            | Self::SetPosition { entity, .. }
            | Self::SetOverride { entity, .. }
            | Self::ClearOverrides { entity }
            | Self::SetAllowList { entity, .. }
            | Self::SetHighlight { entity, .. }
            | Self::SetImageOverride { entity, .. }
            | Self::Despawn { entity } => *entity,
        }
    }
}
