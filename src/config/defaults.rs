// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Scheduler**: Global tick rate
//! - **Playback**: Rate bounds and end-of-stream tolerance
//! - **Frame Cache**: Recent-frame history size
//! - **Decoder**: Worker wait bounds

use crate::domain::video::newtypes::rate_bounds;

// ==========================================================================
// Scheduler Defaults
// ==========================================================================

/// Default scheduler tick rate in Hz (one `tick()` every ~11.1ms).
pub const DEFAULT_TICK_RATE_HZ: f64 = 90.0;

/// Minimum scheduler tick rate in Hz.
pub const MIN_TICK_RATE_HZ: f64 = 1.0;

/// Maximum scheduler tick rate in Hz.
pub const MAX_TICK_RATE_HZ: f64 = 1000.0;

// ==========================================================================
// Playback Defaults
// ==========================================================================

/// Default playback rate (1.0 = normal speed).
pub const DEFAULT_PLAYBACK_RATE: f64 = rate_bounds::DEFAULT;

/// Minimum playback rate. Lower `default_rate` values are clamped.
pub const MIN_PLAYBACK_RATE: f64 = rate_bounds::MIN;

/// Maximum playback rate. Higher `default_rate` values are clamped.
pub const MAX_PLAYBACK_RATE: f64 = rate_bounds::MAX;

/// Distance to the end of the stream under which a playing clock is
/// considered finished. Absorbs the error of summing many float deltas.
pub const END_OF_STREAM_EPSILON_SECS: f64 = 1e-9;

/// Frame rate assumed for cache windows when the container reports none.
pub const FALLBACK_FRAME_RATE: f64 = 30.0;

// ==========================================================================
// Frame Cache Defaults
// ==========================================================================

/// Default number of recently decoded frames kept besides the current one.
pub const DEFAULT_RECENT_FRAMES: usize = 8;

/// Maximum number of recently decoded frames.
pub const MAX_RECENT_FRAMES: usize = 256;

// ==========================================================================
// Decoder Defaults
// ==========================================================================

/// Default bounded wait for a threaded decode, in milliseconds.
pub const DEFAULT_DECODE_TIMEOUT_MS: u64 = 2_000;

/// Minimum decode wait in milliseconds.
pub const MIN_DECODE_TIMEOUT_MS: u64 = 10;

/// Maximum decode wait in milliseconds.
pub const MAX_DECODE_TIMEOUT_MS: u64 = 60_000;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Tick rate validation
    assert!(MIN_TICK_RATE_HZ > 0.0);
    assert!(DEFAULT_TICK_RATE_HZ >= MIN_TICK_RATE_HZ);
    assert!(DEFAULT_TICK_RATE_HZ <= MAX_TICK_RATE_HZ);

    // Playback rate validation
    assert!(MIN_PLAYBACK_RATE > 0.0);
    assert!(DEFAULT_PLAYBACK_RATE >= MIN_PLAYBACK_RATE);
    assert!(DEFAULT_PLAYBACK_RATE <= MAX_PLAYBACK_RATE);
    assert!(END_OF_STREAM_EPSILON_SECS > 0.0);
    assert!(FALLBACK_FRAME_RATE > 0.0);

    // Frame cache validation
    assert!(DEFAULT_RECENT_FRAMES <= MAX_RECENT_FRAMES);

    // Decoder validation
    assert!(MIN_DECODE_TIMEOUT_MS > 0);
    assert!(DEFAULT_DECODE_TIMEOUT_MS >= MIN_DECODE_TIMEOUT_MS);
    assert!(DEFAULT_DECODE_TIMEOUT_MS <= MAX_DECODE_TIMEOUT_MS);
};
