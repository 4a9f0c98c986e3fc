//! Canonical reanim document model, exactly as authored.
//!
//! Frames are sparse: an absent field means "unchanged from the previous
//! physical frame of the same track". Resolution happens in `merge`.

use serde::{Deserialize, Serialize};

/// `frameNum` sentinel marking a part hidden at a physical frame.
pub const HIDDEN_FRAME: i32 = -1;

/// 2D vector in document/screen space.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// One physical timeline entry of a track. Every field is optional.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct Frame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(rename = "sx", skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f32>,
    #[serde(rename = "sy", skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f32>,
    /// Degrees.
    #[serde(rename = "kx", skip_serializing_if = "Option::is_none")]
    pub skew_x: Option<f32>,
    /// Degrees.
    #[serde(rename = "ky", skip_serializing_if = "Option::is_none")]
    pub skew_y: Option<f32>,
    /// `-1` hides the part at this frame.
    #[serde(rename = "f", skip_serializing_if = "Option::is_none")]
    pub frame_num: Option<i32>,
    /// Key into the host's image table. Never `Some("")`; empty means inherit.
    #[serde(rename = "i", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Frame {
    /// True when the frame changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Frame::default()
    }
}

/// A named per-part (or marker) channel.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Track {
    pub name: String,
    pub frames: Vec<Frame>,
}

impl Track {
    pub fn new(name: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }
}

/// Loaded reanim document. Immutable once produced by the loader.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct Document {
    /// Authored playback rate; `None` falls back to `Config::default_fps`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    /// Subtracted from an entity's world position to get its screen origin.
    pub center: Vec2,
    /// Clip names in timeline order, used by the single-marker segment rule.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clips: Vec<String>,
    /// Declaration order is draw order.
    pub tracks: Vec<Track>,
}

impl Document {
    /// Standard (physical) frame count: the longest track.
    pub fn frame_count(&self) -> usize {
        self.tracks.iter().map(|t| t.frames.len()).max().unwrap_or(0)
    }

    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }

    pub fn track_index(&self, name: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_is_longest_track() {
        let doc = Document {
            tracks: vec![
                Track::new("a", vec![Frame::default(); 3]),
                Track::new("b", vec![Frame::default(); 7]),
                Track::new("c", Vec::new()),
            ],
            ..Document::default()
        };
        assert_eq!(doc.frame_count(), 7);
        assert_eq!(doc.track_index("c"), Some(2));
        assert!(doc.track("missing").is_none());
    }

    #[test]
    fn sparse_frames_serialize_short_keys_only() {
        let frame = Frame {
            x: Some(2.0),
            skew_y: Some(15.0),
            image: Some("IMAGE_HEAD".into()),
            ..Frame::default()
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "x": 2.0, "ky": 15.0, "i": "IMAGE_HEAD" })
        );
        assert!(Frame::default().is_empty());
    }
}
