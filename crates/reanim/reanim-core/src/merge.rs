//! Track merger: sparse frames → dense per-track `MergedFrame` arrays.
//!
//! Each field is carried forward independently, per track, in physical order.
//! Tracks shorter than the document keep their last values to the end.

use serde::Serialize;

use crate::data::{Document, Frame, Track, Vec2, HIDDEN_FRAME};

/// Fully resolved frame: every field concrete.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MergedFrame {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Degrees.
    pub skew_x: f32,
    /// Degrees.
    pub skew_y: f32,
    pub frame_num: i32,
    /// Empty when no image has been authored yet.
    pub image: String,
}

impl Default for MergedFrame {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            frame_num: 0,
            image: String::new(),
        }
    }
}

impl MergedFrame {
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.frame_num == HIDDEN_FRAME
    }

    /// Overwrite the fields `frame` sets; keep the rest.
    fn apply(&mut self, frame: &Frame) {
        if let Some(v) = frame.x {
            self.x = v;
        }
        if let Some(v) = frame.y {
            self.y = v;
        }
        if let Some(v) = frame.scale_x {
            self.scale_x = v;
        }
        if let Some(v) = frame.scale_y {
            self.scale_y = v;
        }
        if let Some(v) = frame.skew_x {
            self.skew_x = v;
        }
        if let Some(v) = frame.skew_y {
            self.skew_y = v;
        }
        if let Some(v) = frame.frame_num {
            self.frame_num = v;
        }
        if let Some(img) = &frame.image {
            self.image.clone_from(img);
        }
    }
}

/// Dense frames of one track; `frames.len()` is the document frame count.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MergedTrack {
    pub name: String,
    pub frames: Vec<MergedFrame>,
}

impl MergedTrack {
    #[inline]
    pub fn frame(&self, physical: usize) -> Option<&MergedFrame> {
        self.frames.get(physical)
    }
}

/// Merged tracks in document declaration order.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct MergedTracks {
    pub frame_count: usize,
    pub tracks: Vec<MergedTrack>,
}

impl MergedTracks {
    pub fn get(&self, name: &str) -> Option<&MergedTrack> {
        self.tracks.iter().find(|t| t.name == name)
    }

    #[inline]
    pub fn by_index(&self, index: usize) -> Option<&MergedTrack> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Merge one track over `frame_count` physical frames.
pub fn merge_track(track: &Track, frame_count: usize) -> MergedTrack {
    let mut current = MergedFrame::default();
    let mut frames = Vec::with_capacity(frame_count);
    for physical in 0..frame_count {
        if let Some(src) = track.frames.get(physical) {
            current.apply(src);
        }
        frames.push(current.clone());
    }
    MergedTrack {
        name: track.name.clone(),
        frames,
    }
}

/// Resolve every track of `doc`. Pure: same document, same output.
pub fn build_merged_tracks(doc: &Document) -> MergedTracks {
    let frame_count = doc.frame_count();
    MergedTracks {
        frame_count,
        tracks: doc
            .tracks
            .iter()
            .map(|t| merge_track(t, frame_count))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xs(t: &MergedTrack) -> Vec<f32> {
        t.frames.iter().map(|f| f.x).collect()
    }

    #[test]
    fn carries_fields_forward_independently() {
        let track = Track::new(
            "t",
            vec![
                Frame {
                    x: Some(0.0),
                    scale_y: Some(2.0),
                    ..Frame::default()
                },
                Frame::default(),
                Frame {
                    x: Some(5.0),
                    ..Frame::default()
                },
                Frame {
                    scale_y: Some(0.5),
                    ..Frame::default()
                },
            ],
        );
        let merged = merge_track(&track, 4);
        assert_eq!(xs(&merged), vec![0.0, 0.0, 5.0, 5.0]);
        let sy: Vec<f32> = merged.frames.iter().map(|f| f.scale_y).collect();
        assert_eq!(sy, vec![2.0, 2.0, 2.0, 0.5]);
        // untouched fields stay at neutral defaults
        assert!(merged.frames.iter().all(|f| f.scale_x == 1.0 && f.skew_x == 0.0));
    }

    #[test]
    fn short_tracks_hold_last_values() {
        let doc = Document {
            tracks: vec![
                Track::new(
                    "short",
                    vec![Frame {
                        frame_num: Some(-1),
                        image: Some("IMAGE_A".into()),
                        ..Frame::default()
                    }],
                ),
                Track::new("long", vec![Frame::default(); 3]),
            ],
            ..Document::default()
        };
        let merged = build_merged_tracks(&doc);
        assert_eq!(merged.frame_count, 3);
        let short = merged.get("short").unwrap();
        assert_eq!(short.frames.len(), 3);
        assert!(short.frames.iter().all(|f| f.is_hidden() && f.image == "IMAGE_A"));
    }

    #[test]
    fn merge_is_deterministic() {
        let doc = Document {
            tracks: vec![Track::new(
                "t",
                vec![
                    Frame {
                        skew_x: Some(10.0),
                        ..Frame::default()
                    },
                    Frame {
                        image: Some("IMAGE_B".into()),
                        ..Frame::default()
                    },
                ],
            )],
            ..Document::default()
        };
        assert_eq!(build_merged_tracks(&doc), build_merged_tracks(&doc));
    }
}
