// SPDX-License-Identifier: MPL-2.0
//! The `Video` facade: one playable instance.
//!
//! A [`Video`] composes an [`EncodedSource`], a [`PlaybackClock`] and a
//! [`FrameCache`] behind a single mutex, so a tick and a frame read never
//! overlap and readers never see a half-updated clock or frame.
//!
//! # Lifecycle
//!
//! 1. Construct with an adapter (and optionally a scheduler and config)
//! 2. `load()` the encoded bytes; the first load registers the instance
//! 3. Drive it with `play()` plus `Scheduler::update_all` / `update()`
//! 4. Drop it (reaped on the next pass) or `destroy()` it (unregistered now)

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use bytes::Bytes;

use super::clock::{PlaybackClock, TickOutcome};
use super::frame_cache::{CacheConfig, CacheStats, FrameCache, FrameError, FrameRef};
use super::scheduler::{InstanceId, Scheduler, Tickable, UpdateReport};
use super::source::EncodedSource;
use crate::application::port::DecodeAdapter;
use crate::config::Config;
use crate::domain::error::DecodeError;
use crate::domain::media::{CodecId, ContainerMetadata};
use crate::domain::video::{PlaybackRate, PlaybackStatus};

/// Everything one instance owns, guarded by one lock.
struct VideoState {
    source: EncodedSource,
    clock: PlaybackClock,
    cache: FrameCache,
    adapter: Box<dyn DecodeAdapter>,
}

/// The per-instance step shared by `update()` and `update_all`.
///
/// Only the clock moves. The cached frame is matched against the new
/// position on the next read.
impl Tickable for Mutex<VideoState> {
    fn advance(&self, dt_secs: f64) -> TickOutcome {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clock
            .tick(dt_secs)
    }
}

/// A video instance: encoded source, playback clock and frame cache.
///
/// Not `Clone`: the handle owns the instance. Dropping it releases the
/// instance and its scheduler slot is reaped on the next pass.
///
/// [`data`](Self::data) decodes inline while holding the instance lock, so
/// a slow adapter also delays this instance's step in
/// [`Scheduler::update_all`], and every instance after it in that pass.
/// Wrap slow adapters in a
/// [`ThreadedDecoder`](crate::infrastructure::ThreadedDecoder) to bound
/// the wait.
pub struct Video {
    state: Arc<Mutex<VideoState>>,
    scheduler: Scheduler,
    registration: OnceLock<InstanceId>,
}

impl fmt::Debug for Video {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Video")
            .field("id", &self.registration.get())
            .field("metadata", state.source.metadata())
            .field("clock", &state.clock)
            .finish_non_exhaustive()
    }
}

impl Video {
    /// Creates an empty instance on the global scheduler.
    pub fn new<A>(adapter: A) -> Self
    where
        A: DecodeAdapter + 'static,
    {
        Self::with_scheduler(adapter, Scheduler::global())
    }

    /// Creates an empty instance on `scheduler` with default settings.
    pub fn with_scheduler<A>(adapter: A, scheduler: &Scheduler) -> Self
    where
        A: DecodeAdapter + 'static,
    {
        Self::with_config(adapter, scheduler, &Config::default())
    }

    /// Creates an empty instance on `scheduler`.
    ///
    /// Applies the default rate and looping from `[playback]` and the frame
    /// cache settings from `[cache]`.
    pub fn with_config<A>(adapter: A, scheduler: &Scheduler, config: &Config) -> Self
    where
        A: DecodeAdapter + 'static,
    {
        let mut clock = PlaybackClock::default();
        if let Some(rate) = config.playback.default_rate {
            clock.set_rate(PlaybackRate::new(rate));
        }
        clock.set_loop(config.playback.loop_enabled.unwrap_or(false));

        let state = VideoState {
            source: EncodedSource::empty(),
            clock,
            cache: FrameCache::new(CacheConfig::from(&config.cache), 0.0),
            adapter: Box::new(adapter),
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            scheduler: scheduler.clone(),
            registration: OnceLock::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VideoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_registered(&self) -> InstanceId {
        *self
            .registration
            .get_or_init(|| self.scheduler.register(&self.state))
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads an encoded stream, replacing the current one.
    ///
    /// Only headers are parsed. On success the clock is rewound to 0 and
    /// stopped and the frame cache is cleared. The first successful call
    /// registers the instance with its scheduler.
    ///
    /// # Errors
    ///
    /// Returns `MalformedContainer` or `UnsupportedCodec`. On error the
    /// instance is left exactly as it was.
    pub fn load(&self, bytes: impl Into<Bytes>) -> Result<ContainerMetadata, DecodeError> {
        let bytes = bytes.into();

        let mut guard = self.lock();
        let state = &mut *guard;
        let source = match state.source.replace_with(state.adapter.as_mut(), bytes) {
            Ok(source) => source,
            Err(err) => {
                log::debug!("video load rejected: {err}");
                return Err(err);
            }
        };

        let metadata = source.metadata().clone();
        state.clock.reset(metadata.duration_secs, metadata.fps);
        state.cache.reset(metadata.fps);
        state.source = source;
        drop(guard);

        let id = self.ensure_registered();
        log::debug!(
            "video {id}: loaded {}x{} {} ({:.3}s @ {:.3} fps)",
            metadata.width,
            metadata.height,
            metadata.codec,
            metadata.duration_secs,
            metadata.fps
        );
        Ok(metadata)
    }

    /// Returns true once a load has succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.lock().source.is_loaded()
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Width in pixels (0 before a successful load).
    #[must_use]
    pub fn width(&self) -> u32 {
        self.lock().source.width()
    }

    /// Height in pixels (0 before a successful load).
    #[must_use]
    pub fn height(&self) -> u32 {
        self.lock().source.height()
    }

    /// Duration in seconds (0 before a successful load).
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.lock().source.duration_secs()
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.lock().source.fps()
    }

    #[must_use]
    pub fn codec(&self) -> CodecId {
        self.lock().source.codec().clone()
    }

    #[must_use]
    pub fn metadata(&self) -> ContainerMetadata {
        self.lock().source.metadata().clone()
    }

    // =========================================================================
    // Position
    // =========================================================================

    /// Current playback position in seconds.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.lock().clock.position_secs()
    }

    /// Sets the playback position. Same as [`seek`](Self::seek).
    pub fn set_current_time(&self, target_secs: f64) {
        self.seek(target_secs);
    }

    /// Moves to `target_secs`, clamped to `[0, duration]`.
    ///
    /// Returns the applied position. Status is unchanged.
    pub fn seek(&self, target_secs: f64) -> f64 {
        self.lock().clock.seek(target_secs)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        self.lock().clock.status()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.status().is_playing()
    }

    pub fn play(&self) {
        self.lock().clock.play();
    }

    pub fn pause(&self) {
        self.lock().clock.pause();
    }

    /// Stops and rewinds to 0.
    pub fn stop(&self) {
        self.lock().clock.stop();
    }

    pub fn toggle_pause(&self) {
        self.lock().clock.toggle_pause();
    }

    /// Moves to the start of the next frame and pauses. Returns the new
    /// position.
    pub fn step_frame(&self) -> f64 {
        self.lock().clock.step_frame()
    }

    #[must_use]
    pub fn rate(&self) -> PlaybackRate {
        self.lock().clock.rate()
    }

    pub fn set_rate(&self, rate: PlaybackRate) {
        self.lock().clock.set_rate(rate);
    }

    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.lock().clock.is_looping()
    }

    pub fn set_loop(&self, looping: bool) {
        self.lock().clock.set_loop(looping);
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Advances this instance alone by its scheduler's tick interval.
    ///
    /// Runs the same per-instance step as `update_all`.
    pub fn update(&self) -> TickOutcome {
        self.update_by(self.scheduler.tick_interval_secs())
    }

    /// Advances this instance alone by `dt_secs`.
    pub fn update_by(&self, dt_secs: f64) -> TickOutcome {
        Tickable::advance(&*self.state, dt_secs)
    }

    /// Advances every instance on the global scheduler by `dt_secs`.
    pub fn update_all(dt_secs: f64) -> UpdateReport {
        Scheduler::global().update_all(dt_secs)
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Returns the frame at the current position, decoding it if needed.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] if nothing is loaded or the adapter fails.
    /// The clock is never affected, and the last good frame (if any) is
    /// carried in [`FrameError::fallback`].
    pub fn data(&self) -> Result<FrameRef, FrameError> {
        let mut guard = self.lock();
        let VideoState {
            source,
            clock,
            cache,
            adapter,
        } = &mut *guard;

        if !source.is_loaded() {
            return Err(DecodeError::DecodeFailed("no stream loaded".into()).into());
        }
        cache.frame_at(clock.position_secs(), adapter.as_mut())
    }

    /// Returns the last successfully decoded frame without decoding.
    #[must_use]
    pub fn cached_frame(&self) -> Option<FrameRef> {
        self.lock().cache.last_good().cloned()
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.lock().cache.stats()
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Registry id, once a load has succeeded.
    #[must_use]
    pub fn id(&self) -> Option<InstanceId> {
        self.registration.get().copied()
    }

    /// The scheduler this instance registers with.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Unregisters immediately and drops the instance.
    pub fn destroy(self) {
        if let Some(id) = self.registration.get() {
            self.scheduler.unregister(*id);
        }
    }
}
