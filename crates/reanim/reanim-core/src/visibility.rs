//! Runtime part visibility, independent of clip data.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::data::HIDDEN_FRAME;

/// Per-entity overrides and optional allow-list.
///
/// An override of `true` shows a track even where the clip hides it
/// (`frameNum == -1`); `false` hides it even where the clip shows it.
/// With an allow-list set, tracks missing from it are never drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityFilter {
    #[serde(default)]
    pub overrides: HashMap<String, bool>,
    #[serde(default)]
    pub allow_list: Option<HashSet<String>>,
}

impl VisibilityFilter {
    pub fn set_override(&mut self, track: impl Into<String>, visible: bool) {
        self.overrides.insert(track.into(), visible);
    }

    pub fn clear_override(&mut self, track: &str) {
        self.overrides.remove(track);
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn set_allow_list<I, S>(&mut self, tracks: Option<I>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_list = tracks.map(|t| t.into_iter().map(Into::into).collect());
    }

    /// Whether `track`, resolved to `frame_num` this tick, should be drawn.
    pub fn is_visible(&self, track: &str, frame_num: i32) -> bool {
        if let Some(allow) = &self.allow_list {
            if !allow.contains(track) {
                return false;
            }
        }
        match self.overrides.get(track) {
            Some(forced) => *forced,
            None => frame_num != HIDDEN_FRAME,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.allow_list.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_hides_without_override() {
        let f = VisibilityFilter::default();
        assert!(f.is_visible("arm", 0));
        assert!(f.is_visible("arm", 3));
        assert!(!f.is_visible("arm", HIDDEN_FRAME));
    }

    #[test]
    fn overrides_beat_the_sentinel_both_ways() {
        let mut f = VisibilityFilter::default();
        f.set_override("arm", true);
        f.set_override("hat", false);
        assert!(f.is_visible("arm", HIDDEN_FRAME));
        assert!(!f.is_visible("hat", 0));
        f.clear_override("arm");
        assert!(!f.is_visible("arm", HIDDEN_FRAME));
        f.clear_overrides();
        assert!(f.is_empty());
    }

    #[test]
    fn allow_list_filters_everything_else() {
        let mut f = VisibilityFilter::default();
        f.set_override("tail", true);
        f.set_allow_list(Some(["head", "body"]));
        assert!(f.is_visible("head", 0));
        assert!(!f.is_visible("tail", HIDDEN_FRAME));
        f.set_allow_list(None::<Vec<String>>);
        assert!(f.is_visible("tail", HIDDEN_FRAME));
    }
}
