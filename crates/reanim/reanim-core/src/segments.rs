//! Segment mapper: splits the shared physical timeline into named clips.
//!
//! A clip's visibility array has one entry per physical frame: `0` where the
//! frame belongs to the clip, non-zero elsewhere. Logical frame N is the Nth
//! zero entry, so clips may be scattered or interleaved.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::data::HIDDEN_FRAME;
use crate::merge::MergedTracks;

/// How clip boundaries are read from a document.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentRule {
    /// Every track named `<prefix><clip>` is the marker for `<clip>`; its
    /// resolved `frameNum` array is the clip's visibility array.
    MarkerTracks { prefix: String },
    /// One marker track (first track when `None`). Each maximal run of
    /// `frameNum == 0` is one clip, named from the document's `clips` list
    /// in order.
    SingleMarker {
        #[serde(default)]
        track: Option<String>,
    },
}

impl Default for SegmentRule {
    fn default() -> Self {
        SegmentRule::MarkerTracks {
            prefix: "anim_".into(),
        }
    }
}

/// Per-clip visibility over the physical timeline.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Visibility {
    pub values: Vec<i32>,
    visible_count: usize,
}

impl Visibility {
    pub fn new(values: Vec<i32>) -> Self {
        let visible_count = values.iter().filter(|v| **v == 0).count();
        Self {
            values,
            visible_count,
        }
    }

    /// Number of logical frames.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.visible_count
    }

    /// Physical index of logical frame `logical`, `None` when out of range.
    pub fn to_physical(&self, logical: usize) -> Option<usize> {
        if logical >= self.visible_count {
            return None;
        }
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 0)
            .nth(logical)
            .map(|(physical, _)| physical)
    }

    /// Physical indices of the clip, in order.
    pub fn physical_frames(&self) -> impl Iterator<Item = usize> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| (*v == 0).then_some(i))
    }
}

/// Clip name → visibility. Declaration order is kept for `names()`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ClipTable {
    order: Vec<String>,
    clips: HashMap<String, Visibility>,
}

impl ClipTable {
    pub fn insert(&mut self, name: String, visibility: Visibility) {
        if self.clips.insert(name.clone(), visibility).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, clip: &str) -> Option<&Visibility> {
        self.clips.get(clip)
    }

    pub fn contains(&self, clip: &str) -> bool {
        self.clips.contains_key(clip)
    }

    /// Logical frame count of `clip`; `None` for an unknown clip.
    pub fn frame_count(&self, clip: &str) -> Option<usize> {
        self.clips.get(clip).map(Visibility::frame_count)
    }

    /// Clip names in the order they were found.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Map a clip-relative logical frame onto the physical timeline.
    /// Unknown clips, empty clips and out of range frames all give `None`.
    pub fn map_logical_to_physical(&self, clip: &str, logical: usize) -> Option<usize> {
        self.clips.get(clip)?.to_physical(logical)
    }
}

impl PartialEq for ClipTable {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.clips == other.clips
    }
}

/// Build the clip table for a merged document.
pub fn build_clip_table(
    merged: &MergedTracks,
    declared_clips: &[String],
    rule: &SegmentRule,
) -> ClipTable {
    let mut table = ClipTable::default();
    match rule {
        SegmentRule::MarkerTracks { prefix } => {
            for track in &merged.tracks {
                let Some(clip) = track.name.strip_prefix(prefix.as_str()) else {
                    continue;
                };
                let values = track.frames.iter().map(|f| f.frame_num).collect();
                table.insert(clip.to_string(), Visibility::new(values));
            }
        }
        SegmentRule::SingleMarker { track } => {
            let marker = match track {
                Some(name) => merged.get(name),
                None => merged.by_index(0),
            };
            let Some(marker) = marker else {
                log::warn!("segment marker track {track:?} not found; document has no clips");
                return table;
            };
            let runs = visible_runs(marker.frames.iter().map(|f| f.frame_num));
            for (n, run) in runs.into_iter().enumerate() {
                let name = declared_clips
                    .get(n)
                    .cloned()
                    .unwrap_or_else(|| format!("segment_{n}"));
                let mut values = vec![HIDDEN_FRAME; merged.frame_count];
                for v in &mut values[run] {
                    *v = 0;
                }
                table.insert(name, Visibility::new(values));
            }
            let missing: Vec<&String> = declared_clips
                .iter()
                .filter(|c| !table.contains(c.as_str()))
                .collect();
            for missing in missing {
                // declared but never marked: legal placeholder with no frames
                table.insert(
                    missing.clone(),
                    Visibility::new(vec![HIDDEN_FRAME; merged.frame_count]),
                );
            }
        }
    }
    table
}

/// Maximal runs of zero-valued entries.
fn visible_runs(values: impl Iterator<Item = i32>) -> Vec<std::ops::Range<usize>> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    let mut len = 0;
    for (i, v) in values.enumerate() {
        len = i + 1;
        match (v == 0, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..len);
    }
    runs
}
