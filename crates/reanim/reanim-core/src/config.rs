//! Core configuration for reanim-core.

use serde::{Deserialize, Serialize};

use crate::segments::SegmentRule;

/// Engine-wide defaults. Per-document overrides go through `LoadOptions`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Playback rate for documents that do not author one.
    pub default_fps: f32,

    /// Clip boundary rule for documents loaded without an explicit one.
    pub segment_rule: SegmentRule,

    /// Upper bound on logical frames a single `tick` may advance. Guards
    /// against a huge `dt` (e.g. after a debugger pause) spinning the loop.
    pub max_steps_per_tick: u32,

    /// Maximum events to retain per update; the rest are dropped.
    pub max_events_per_tick: usize,
}

/// Playback rate used when neither the document nor the config supplies a usable one.
pub const FALLBACK_FPS: f32 = 12.0;

impl Default for Config {
    fn default() -> Self {
        Self {
            default_fps: FALLBACK_FPS,
            segment_rule: SegmentRule::default(),
            max_steps_per_tick: 1024,
            max_events_per_tick: 1024,
        }
    }
}

impl Config {
    /// `default_fps` if it is positive and finite, else [`FALLBACK_FPS`].
    pub fn fallback_fps(&self) -> f32 {
        if self.default_fps.is_finite() && self.default_fps > 0.0 {
            self.default_fps
        } else {
            FALLBACK_FPS
        }
    }

    /// Replace values that would stall playback. Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        let fps = self.fallback_fps();
        if fps != self.default_fps {
            log::warn!(
                "config default_fps {} is not a positive rate; using {fps}",
                self.default_fps
            );
            self.default_fps = fps;
            changed = true;
        }
        if self.max_steps_per_tick == 0 {
            log::warn!("config max_steps_per_tick of 0 would never advance; using 1");
            self.max_steps_per_tick = 1;
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: Config = serde_json::from_str(
            r#"{ "default_fps": 30, "segment_rule": { "kind": "single_marker" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.default_fps, 30.0);
        assert_eq!(cfg.segment_rule, SegmentRule::SingleMarker { track: None });
        assert_eq!(cfg.max_steps_per_tick, 1024);
    }

    #[test]
    fn normalize_replaces_stalling_values() {
        let mut cfg: Config =
            serde_json::from_str(r#"{ "default_fps": 0, "max_steps_per_tick": 0 }"#).unwrap();
        assert_eq!(cfg.fallback_fps(), FALLBACK_FPS);
        assert!(cfg.normalize());
        assert_eq!(cfg.default_fps, FALLBACK_FPS);
        assert_eq!(cfg.max_steps_per_tick, 1);
        assert!(!cfg.normalize());

        let mut nan = Config {
            default_fps: f32::NAN,
            ..Config::default()
        };
        assert!(nan.normalize());
        assert_eq!(nan.default_fps, FALLBACK_FPS);
    }
}
