//! Per-entity playback cursor (frame-stepped, no tweening).

use serde::{Deserialize, Serialize};

/// Coarse playback state. `Idle` means no `AnimState` is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Finished,
}

impl PlaybackState {
    pub fn of(state: Option<&AnimState>) -> Self {
        match state {
            None => Self::Idle,
            Some(s) if s.is_finished => Self::Finished,
            Some(s) if s.is_paused => Self::Paused,
            Some(_) => Self::Playing,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Finished => "finished",
        }
    }
}

/// What a single `tick` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Logical frame steps taken (wraps count as steps).
    pub steps: u32,
    /// Wrapped from the last frame back to 0 at least once.
    pub looped: bool,
    /// The finish latch was set by this tick.
    pub finished: bool,
}

/// Playback cursor for one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimState {
    pub clip: String,
    pub logical_frame: usize,
    /// Seconds not yet consumed by a frame step.
    pub time_accumulator: f32,
    pub is_looping: bool,
    pub is_paused: bool,
    /// Level-triggered: stays set until the next `play`.
    pub is_finished: bool,
    /// Logical frames in the clip, captured at `play`.
    pub frame_count: usize,
    /// Seconds per logical frame, captured at `play`.
    pub frame_duration: f32,
}

impl AnimState {
    /// Start `clip` from logical frame 0.
    pub fn new(clip: impl Into<String>, looping: bool, frame_count: usize, fps: f32) -> Self {
        let mut state = Self {
            clip: String::new(),
            logical_frame: 0,
            time_accumulator: 0.0,
            is_looping: looping,
            is_paused: false,
            is_finished: false,
            frame_count: 0,
            frame_duration: 0.0,
        };
        state.play(clip, looping, frame_count, fps);
        state
    }

    /// Restart unconditionally, whatever the prior state.
    pub fn play(&mut self, clip: impl Into<String>, looping: bool, frame_count: usize, fps: f32) {
        self.clip = clip.into();
        self.is_looping = looping;
        self.frame_count = frame_count;
        self.frame_duration = if fps.is_finite() && fps > 0.0 {
            1.0 / fps
        } else {
            0.0
        };
        self.logical_frame = 0;
        self.time_accumulator = 0.0;
        self.is_finished = false;
        self.is_paused = false;
    }

    pub fn pause(&mut self) {
        self.is_paused = true;
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
    }

    /// Jump to `logical` (clamped to the clip) and clear the finish latch.
    pub fn seek(&mut self, logical: usize) {
        self.logical_frame = logical.min(self.frame_count.saturating_sub(1));
        self.time_accumulator = 0.0;
        self.is_finished = false;
    }

    #[inline]
    pub fn last_frame(&self) -> usize {
        self.frame_count.saturating_sub(1)
    }

    /// Advance by `dt` seconds, taking at most `max_steps` frame steps.
    pub fn tick(&mut self, dt: f32, max_steps: u32) -> TickReport {
        let mut report = TickReport::default();
        if self.is_paused || self.is_finished {
            return report;
        }
        if self.frame_count == 0 {
            // placeholder clip: nothing to show, but one-shots must still finish
            if !self.is_looping {
                self.is_finished = true;
                report.finished = true;
            }
            return report;
        }
        if self.frame_duration <= 0.0 || !dt.is_finite() || dt <= 0.0 {
            return report;
        }

        self.time_accumulator += dt;
        while self.time_accumulator >= self.frame_duration {
            if report.steps >= max_steps {
                // drop the backlog instead of replaying it next tick
                self.time_accumulator %= self.frame_duration;
                break;
            }
            self.time_accumulator -= self.frame_duration;
            report.steps += 1;
            if self.logical_frame + 1 < self.frame_count {
                self.logical_frame += 1;
            } else if self.is_looping {
                self.logical_frame = 0;
                report.looped = true;
            } else {
                self.logical_frame = self.last_frame();
                self.is_finished = true;
                self.time_accumulator = 0.0;
                report.finished = true;
                break;
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_wraps_to_zero() {
        let mut s = AnimState::new("idle", true, 3, 10.0);
        let r = s.tick(0.35, 1024);
        assert_eq!(r.steps, 3);
        assert!(r.looped);
        assert_eq!(s.logical_frame, 0);
        assert!(!s.is_finished);
    }

    #[test]
    fn finish_latches_on_last_frame() {
        let mut s = AnimState::new("die", false, 3, 10.0);
        let r = s.tick(0.5, 1024);
        assert!(r.finished);
        assert!(s.is_finished);
        assert_eq!(s.logical_frame, 2);
        for _ in 0..5 {
            let r = s.tick(1.0, 1024);
            assert_eq!(r, TickReport::default());
            assert_eq!(s.logical_frame, 2);
            assert!(s.is_finished);
        }
        assert_eq!(PlaybackState::of(Some(&s)), PlaybackState::Finished);
        s.play("die", false, 3, 10.0);
        assert!(!s.is_finished);
        assert_eq!(s.logical_frame, 0);
    }

    #[test]
    fn pause_holds_frame() {
        let mut s = AnimState::new("walk", true, 4, 8.0);
        s.tick(0.125, 1024);
        assert_eq!(s.logical_frame, 1);
        s.pause();
        assert_eq!(PlaybackState::of(Some(&s)), PlaybackState::Paused);
        s.tick(1.0, 1024);
        assert_eq!(s.logical_frame, 1);
        s.resume();
        s.tick(0.125, 1024);
        assert_eq!(s.logical_frame, 2);
    }

    #[test]
    fn play_resets_everything() {
        let mut s = AnimState::new("walk", true, 4, 8.0);
        s.tick(0.3, 1024);
        s.pause();
        s.play("walk", false, 4, 8.0);
        assert_eq!(s.logical_frame, 0);
        assert_eq!(s.time_accumulator, 0.0);
        assert!(!s.is_paused && !s.is_finished && !s.is_looping);
    }

    #[test]
    fn empty_clip_finishes_one_shots_only() {
        let mut once = AnimState::new("placeholder", false, 0, 12.0);
        assert!(once.tick(0.01, 1024).finished);
        let mut looping = AnimState::new("placeholder", true, 0, 12.0);
        looping.tick(5.0, 1024);
        assert!(!looping.is_finished);
        assert_eq!(looping.logical_frame, 0);
    }

    #[test]
    fn step_cap_drops_backlog() {
        let mut s = AnimState::new("walk", true, 5, 10.0);
        let r = s.tick(1000.0, 4);
        assert_eq!(r.steps, 4);
        assert_eq!(s.logical_frame, 4);
        assert!(s.time_accumulator < s.frame_duration);
    }

    #[test]
    fn seek_clamps_and_clears_latch() {
        let mut s = AnimState::new("die", false, 3, 10.0);
        s.tick(1.0, 1024);
        s.seek(10);
        assert_eq!(s.logical_frame, 2);
        assert!(!s.is_finished);
        assert_eq!(PlaybackState::of(None).name(), "idle");
    }
}
