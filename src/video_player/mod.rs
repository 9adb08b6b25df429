// SPDX-License-Identifier: MPL-2.0
//! Video playback engine.
//!
//! This module turns encoded bytes into frames on demand and advances every
//! live video in lockstep from one global tick.
//!
//! - [`source`]: encoded buffer plus container metadata
//! - [`clock`]: per-instance position and play/pause state machine
//! - [`frame_cache`]: lazy, bucket-keyed decoded-frame cache
//! - [`video`]: the [`Video`] facade composing the three
//! - [`scheduler`]: weak registry of instances and `update_all`

pub mod clock;
pub mod frame_cache;
pub mod scheduler;
pub mod source;
pub mod time_units;
mod video;

pub use clock::{PlaybackClock, TickOutcome};
pub use frame_cache::{CacheConfig, CacheStats, FrameCache, FrameError, FrameRef};
pub use scheduler::{InstanceId, Scheduler, Tickable, UpdateReport};
pub use source::EncodedSource;
pub use video::Video;

/// Advances every instance on the global scheduler by `dt_secs`.
pub fn update_all(dt_secs: f64) -> UpdateReport {
    Scheduler::global().update_all(dt_secs)
}
