// SPDX-License-Identifier: MPL-2.0
//! Video playback newtypes.
//!
//! This module provides type-safe wrappers for video playback values,
//! ensuring they are always within valid ranges.

// =============================================================================
// PlaybackRate
// =============================================================================

/// Playback rate bounds (0.1x to 8.0x).
pub mod rate_bounds {
    /// Minimum playback rate (0.1x = ten times slower).
    pub const MIN: f64 = 0.1;
    /// Maximum playback rate (8x = eight times faster).
    pub const MAX: f64 = 8.0;
    /// Default playback rate (1.0 = normal speed).
    pub const DEFAULT: f64 = 1.0;
}

/// Playback rate multiplier, guaranteed to be within valid range (0.1x - 8.0x).
///
/// A tick of `dt` seconds advances the clock by `dt * rate`.
/// NaN falls back to the default rate; infinities clamp to the nearest bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    /// Creates a new playback rate, clamping to valid range.
    #[must_use]
    pub fn new(rate: f64) -> Self {
        if rate.is_nan() {
            return Self::default();
        }
        Self(rate.clamp(rate_bounds::MIN, rate_bounds::MAX))
    }

    /// Returns the rate value as f64.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self(rate_bounds::DEFAULT)
    }
}
