// SPDX-License-Identifier: MPL-2.0
//! Video playback state machine.
//!
//! This module defines the playback status of a clock.

/// Represents the current playback status of a video.
///
/// Transitions: `Stopped → Playing ⇄ Paused`, and back to `Stopped` through
/// an explicit stop, a reload, or end-of-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Video is stopped (initial state, after a reload, or at end-of-stream).
    #[default]
    Stopped,
    /// Video is currently playing and advances on every tick.
    Playing,
    /// Video is paused at its current position.
    Paused,
}

impl PlaybackStatus {
    /// Returns true if the video is currently playing.
    #[must_use]
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Returns true if the video is paused.
    #[must_use]
    pub fn is_paused(self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Returns true if the video is stopped.
    #[must_use]
    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_stopped() {
        assert_eq!(PlaybackStatus::default(), PlaybackStatus::Stopped);
    }

    #[test]
    fn test_status_checks() {
        assert!(PlaybackStatus::Playing.is_playing());
        assert!(!PlaybackStatus::Paused.is_playing());

        assert!(PlaybackStatus::Paused.is_paused());
        assert!(!PlaybackStatus::Playing.is_paused());

        assert!(PlaybackStatus::Stopped.is_stopped());
        assert!(!PlaybackStatus::Playing.is_stopped());
    }
}
