// SPDX-License-Identifier: MPL-2.0
//! Per-instance playback clock.
//!
//! The clock owns the playback position of one video and its
//! `Stopped → Playing ⇄ Paused` state machine:
//!
//! - `play`/`pause`/`stop`/`seek` are explicit transitions and never fail
//! - `tick` is the only automatic transition (end-of-stream)
//! - position is always inside `[0, duration]`

use super::time_units::{bucket_window, frame_bucket};
use crate::config::END_OF_STREAM_EPSILON_SECS;
use crate::domain::video::{PlaybackRate, PlaybackStatus};

/// What a [`PlaybackClock::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clock was not playing; nothing changed.
    Idle,
    /// Position moved forward.
    Advanced,
    /// End-of-stream reached with looping enabled; position wrapped to 0.
    Looped,
    /// End-of-stream reached; the clock is now stopped at `duration`.
    Finished,
}

/// Playback position and status of a single video.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    position_secs: f64,
    duration_secs: f64,
    fps: f64,
    status: PlaybackStatus,
    rate: PlaybackRate,
    looping: bool,
}

impl PlaybackClock {
    /// Creates a stopped clock for a stream of `duration_secs` at `fps`.
    ///
    /// An unknown frame rate (0, negative or non-finite) steps on the
    /// fallback frame grid.
    #[must_use]
    pub fn new(duration_secs: f64, fps: f64) -> Self {
        let mut clock = Self::default();
        clock.reset(duration_secs, fps);
        clock
    }

    /// Hard reset after a source (re)load: position 0, `Stopped`.
    ///
    /// Rate and looping are preferences of the owner and survive the reset.
    pub fn reset(&mut self, duration_secs: f64, fps: f64) {
        self.duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        self.fps = fps;
        self.position_secs = 0.0;
        self.status = PlaybackStatus::Stopped;
    }

    #[must_use]
    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    #[must_use]
    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Returns true when the position sits on the last instant of the stream.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.position_secs >= self.duration_secs - END_OF_STREAM_EPSILON_SECS
    }

    /// Starts or resumes playback. No-op when already playing.
    ///
    /// Playing a clock that was stopped at end-of-stream restarts from 0.
    pub fn play(&mut self) {
        match self.status {
            PlaybackStatus::Playing => {}
            PlaybackStatus::Stopped => {
                if self.duration_secs > 0.0 && self.is_at_end() {
                    self.position_secs = 0.0;
                }
                self.status = PlaybackStatus::Playing;
            }
            PlaybackStatus::Paused => self.status = PlaybackStatus::Playing,
        }
    }

    /// Pauses playback, freezing the position. No-op unless playing.
    pub fn pause(&mut self) {
        if self.status.is_playing() {
            self.status = PlaybackStatus::Paused;
        }
    }

    /// Stops playback and rewinds to 0.
    pub fn stop(&mut self) {
        self.status = PlaybackStatus::Stopped;
        self.position_secs = 0.0;
    }

    /// Pauses when playing, plays otherwise.
    pub fn toggle_pause(&mut self) {
        if self.status.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Moves the position to `target_secs` clamped to `[0, duration]`.
    ///
    /// NaN maps to 0. Status is unchanged. Returns the applied position.
    pub fn seek(&mut self, target_secs: f64) -> f64 {
        self.position_secs = if target_secs.is_nan() {
            0.0
        } else {
            target_secs.clamp(0.0, self.duration_secs)
        };
        self.position_secs
    }

    /// Advances a playing clock by `dt_secs * rate`.
    ///
    /// Non-finite or negative deltas are ignored.
    pub fn tick(&mut self, dt_secs: f64) -> TickOutcome {
        if !self.status.is_playing() || !dt_secs.is_finite() || dt_secs < 0.0 {
            return TickOutcome::Idle;
        }

        self.position_secs += dt_secs * self.rate.value();

        if !self.is_at_end() {
            return TickOutcome::Advanced;
        }

        if self.looping && self.duration_secs > 0.0 {
            self.position_secs = 0.0;
            TickOutcome::Looped
        } else {
            self.position_secs = self.duration_secs;
            self.status = PlaybackStatus::Stopped;
            TickOutcome::Finished
        }
    }

    /// Moves to the start of the next frame and leaves the clock paused.
    ///
    /// The target is taken from the frame grid rather than added to the
    /// position, so repeated steps never drift onto the same frame twice.
    /// The position is capped at `duration`; the status stays `Paused`
    /// even on the last frame so the caller can keep stepping backwards
    /// with `seek`.
    pub fn step_frame(&mut self) -> f64 {
        self.status = PlaybackStatus::Paused;
        let bucket = frame_bucket(self.position_secs, self.fps);
        let (next_frame_secs, _) = bucket_window(bucket + 1, self.fps);
        self.position_secs = next_frame_secs.min(self.duration_secs);
        self.position_secs
    }

    /// Sets the playback rate, clamped to the valid range.
    pub fn set_rate(&mut self, rate: PlaybackRate) {
        self.rate = rate;
    }

    /// Enables or disables looping at end-of-stream.
    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }
}
