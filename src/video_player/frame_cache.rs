// SPDX-License-Identifier: MPL-2.0
//! Lazy decoded-frame cache for one video instance.
//!
//! The cache turns a playback position into decoded frame bytes without
//! redundant work.
//!
//! # Design
//!
//! - **Bucket-keyed**: positions map to frame buckets through
//!   [`frame_bucket`]; a bucket's window `[start, valid_until)` is one frame
//!   long and always contains the position it was looked up with
//! - **One current entry**: repeated reads inside the window never re-decode
//! - **Recent history**: an LRU of recently decoded buckets makes scrubbing
//!   back and forth cheap (can be disabled)
//! - **Stale-but-valid**: a failed decode keeps the previous entry and hands
//!   it back as a fallback alongside the error
//!
//! # Usage
//!
//! ```ignore
//! let mut cache = FrameCache::new(CacheConfig::default(), 30.0);
//! let frame = cache.frame_at(1.0, &mut adapter)?;
//! let header = frame.slice(..16);
//! ```

use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::RangeBounds;

use bytes::Bytes;

use super::time_units::{bucket_window, frame_bucket};
use crate::application::port::{DecodeAdapter, RawFrame};
use crate::config::{CacheSettings, DEFAULT_RECENT_FRAMES, MAX_RECENT_FRAMES};
use crate::domain::error::DecodeError;

/// Configuration for the frame cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether the recent-frames history is kept.
    pub enabled: bool,

    /// Number of recently decoded frames kept besides the current one.
    pub recent_frames: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recent_frames: DEFAULT_RECENT_FRAMES,
        }
    }
}

impl CacheConfig {
    /// Creates an enabled configuration with a clamped history size.
    #[must_use]
    pub fn new(recent_frames: usize) -> Self {
        Self {
            enabled: true,
            recent_frames: recent_frames.min(MAX_RECENT_FRAMES),
        }
    }

    /// Creates a configuration with no recent-frames history.
    ///
    /// The current entry is still cached.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        let mut config = Self::new(settings.recent_frames.unwrap_or(DEFAULT_RECENT_FRAMES));
        config.enabled = settings.enabled.unwrap_or(true);
        config
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served without decoding.
    pub hits: u64,

    /// Reads that had to go to the adapter.
    pub misses: u64,

    /// Successful decodes.
    pub decodes: u64,

    /// Failed decodes.
    pub failures: u64,

    /// Frames dropped from the recent history.
    pub evictions: u64,
}

impl CacheStats {
    /// Returns the cache hit rate as a percentage (0.0 - 100.0).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// A decoded frame together with the window it is valid for.
///
/// Cloning is cheap: the pixel buffer is reference counted.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRef {
    data: Bytes,
    width: u32,
    height: u32,
    timestamp_secs: f64,
    bucket: i64,
    window_start: f64,
    valid_until: f64,
}

impl FrameRef {
    fn from_raw(raw: RawFrame, bucket: i64, fps: f64) -> Self {
        let (window_start, valid_until) = bucket_window(bucket, fps);
        Self {
            data: raw.data,
            width: raw.width,
            height: raw.height,
            timestamp_secs: raw.timestamp_secs,
            bucket,
            window_start,
            valid_until,
        }
    }

    /// Returns the frame bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consumes the frame and returns its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Returns a view of a sub-range of the frame bytes without copying.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds, like [`Bytes::slice`].
    #[must_use]
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Bytes {
        self.data.slice(range)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Presentation timestamp reported by the adapter.
    #[must_use]
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_secs
    }

    /// Frame bucket this entry is keyed by.
    #[must_use]
    pub fn bucket(&self) -> i64 {
        self.bucket
    }

    /// Returns the half-open validity window `[start, valid_until)`.
    #[must_use]
    pub fn window(&self) -> (f64, f64) {
        (self.window_start, self.valid_until)
    }

    /// Returns the end of the validity window (next frame boundary).
    #[must_use]
    pub fn valid_until(&self) -> f64 {
        self.valid_until
    }

    /// Returns true if `position_secs` falls inside the validity window.
    #[must_use]
    pub fn contains(&self, position_secs: f64) -> bool {
        position_secs >= self.window_start && position_secs < self.valid_until
    }
}

/// A failed frame read.
///
/// Carries the adapter error and, when one exists, the last good frame so
/// callers can keep showing something.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameError {
    pub error: DecodeError,
    pub fallback: Option<FrameRef>,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fallback {
            Some(frame) => write!(
                f,
                "{} (holding frame at {:.3}s)",
                self.error,
                frame.timestamp_secs()
            ),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<DecodeError> for FrameError {
    fn from(error: DecodeError) -> Self {
        Self {
            error,
            fallback: None,
        }
    }
}

/// Decoded-frame cache owned by one video instance.
pub struct FrameCache {
    /// Last successfully decoded frame. Served as a hit only while the
    /// position stays in its bucket.
    current: Option<FrameRef>,

    /// Recently decoded frames by bucket. `None` when history is disabled.
    recent: Option<LruCache<i64, FrameRef>>,

    config: CacheConfig,
    fps: f64,
    stats: CacheStats,
}

impl fmt::Debug for FrameCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameCache")
            .field("current", &self.current.as_ref().map(FrameRef::bucket))
            .field("recent", &self.recent.as_ref().map(LruCache::len))
            .field("fps", &self.fps)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new(CacheConfig::default(), 0.0)
    }
}

impl FrameCache {
    /// Creates an empty cache for a stream at `fps` frames per second.
    ///
    /// An unknown frame rate (0 or non-finite) falls back to the default
    /// bucket size.
    #[must_use]
    pub fn new(config: CacheConfig, fps: f64) -> Self {
        let recent = if config.enabled {
            NonZeroUsize::new(config.recent_frames.min(MAX_RECENT_FRAMES)).map(LruCache::new)
        } else {
            None
        };

        Self {
            current: None,
            recent,
            config,
            fps,
            stats: CacheStats::default(),
        }
    }

    /// Returns the cache configuration.
    #[must_use]
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Forgets every frame and statistic and rebinds to a new frame rate.
    pub fn reset(&mut self, fps: f64) {
        self.current = None;
        if let Some(recent) = self.recent.as_mut() {
            recent.clear();
        }
        self.fps = fps;
        self.stats = CacheStats::default();
    }

    /// Returns the frame for `position_secs`, decoding it if needed.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] when the adapter fails. The previous entry
    /// is left untouched and returned as the error's fallback.
    pub fn frame_at<A>(
        &mut self,
        position_secs: f64,
        adapter: &mut A,
    ) -> Result<FrameRef, FrameError>
    where
        A: DecodeAdapter + ?Sized,
    {
        let bucket = frame_bucket(position_secs, self.fps);

        if let Some(frame) = self.current.as_ref() {
            if frame.bucket() == bucket {
                self.stats.hits += 1;
                return Ok(frame.clone());
            }
        }

        let remembered = self
            .recent
            .as_mut()
            .and_then(|recent| recent.get(&bucket))
            .cloned();
        if let Some(frame) = remembered {
            log::trace!("frame cache: bucket {bucket} served from history");
            self.stats.hits += 1;
            self.current = Some(frame.clone());
            return Ok(frame);
        }

        self.stats.misses += 1;
        match adapter.decode_at(position_secs) {
            Ok(raw) => {
                let frame = FrameRef::from_raw(raw, bucket, self.fps);
                self.stats.decodes += 1;
                self.remember(&frame);
                self.current = Some(frame.clone());
                Ok(frame)
            }
            Err(error) => {
                self.stats.failures += 1;
                log::warn!("decode failed at {position_secs:.3}s: {error}");
                Err(FrameError {
                    error,
                    fallback: self.current.clone(),
                })
            }
        }
    }

    fn remember(&mut self, frame: &FrameRef) {
        let Some(recent) = self.recent.as_mut() else {
            return;
        };
        if let Some((evicted, _)) = recent.push(frame.bucket(), frame.clone()) {
            if evicted != frame.bucket() {
                self.stats.evictions += 1;
            }
        }
    }

    /// Returns the last successfully decoded frame, valid or stale.
    #[must_use]
    pub fn last_good(&self) -> Option<&FrameRef> {
        self.current.as_ref()
    }

    /// Returns the number of frames in the recent history.
    #[must_use]
    pub fn recent_len(&self) -> usize {
        self.recent.as_ref().map_or(0, LruCache::len)
    }

    /// Returns a snapshot of the cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_abs_diff_eq, FakeDecoder};

    fn fake() -> FakeDecoder {
        FakeDecoder::new(4, 2, 2.0, 30.0)
    }

    #[test]
    fn first_read_decodes_then_hits() {
        let mut adapter = fake();
        let mut cache = FrameCache::new(CacheConfig::default(), 30.0);

        let first = cache.frame_at(1.0, &mut adapter).unwrap();
        let second = cache.frame_at(1.0, &mut adapter).unwrap();

        assert_eq!(adapter.decode_count(), 1);
        assert_eq!(first, second);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn positions_inside_window_share_one_decode() {
        let mut adapter = fake();
        let mut cache = FrameCache::new(CacheConfig::disabled(), 30.0);

        let frame = cache.frame_at(1.0, &mut adapter).unwrap();
        let (start, end) = frame.window();
        assert_abs_diff_eq!(start, 1.0);
        assert_abs_diff_eq!(end, 1.0 + 1.0 / 30.0, epsilon = 1e-12);

        cache.frame_at(1.02, &mut adapter).unwrap();
        assert_eq!(adapter.decode_count(), 1);

        cache.frame_at(1.04, &mut adapter).unwrap();
        assert_eq!(adapter.decode_count(), 2);
    }

    #[test]
    fn frame_window_contains_query_position() {
        let mut adapter = fake();
        let mut cache = FrameCache::default();
        for position in [0.0, 0.4, 1.0, 1.5, 1.99] {
            let frame = cache.frame_at(position, &mut adapter).unwrap();
            assert!(frame.contains(position), "{position}");
        }
    }

    #[test]
    fn failure_keeps_previous_entry_as_fallback() {
        let mut adapter = fake();
        adapter.fail_between(1.5, 1.6);
        let mut cache = FrameCache::new(CacheConfig::default(), 30.0);

        let good = cache.frame_at(1.0, &mut adapter).unwrap();
        let err = cache.frame_at(1.5, &mut adapter).unwrap_err();

        assert!(matches!(err.error, DecodeError::DecodeFailed(_)));
        assert_eq!(err.fallback.as_ref(), Some(&good));
        assert_eq!(cache.last_good(), Some(&good));
        assert_eq!(cache.stats().failures, 1);
    }

    #[test]
    fn failure_without_previous_frame_has_no_fallback() {
        let mut adapter = fake();
        adapter.fail_between(0.0, 10.0);
        let mut cache = FrameCache::default();

        let err = cache.frame_at(0.0, &mut adapter).unwrap_err();
        assert!(err.fallback.is_none());
        assert!(err.to_string().starts_with("Decoding failed"));
    }

    #[test]
    fn failed_bucket_is_retried_on_next_read() {
        let mut adapter = fake();
        adapter.fail_between(1.5, 1.6);
        let mut cache = FrameCache::default();

        assert!(cache.frame_at(1.5, &mut adapter).is_err());
        adapter.clear_failures();
        assert!(cache.frame_at(1.5, &mut adapter).is_ok());
        assert_eq!(adapter.decode_count(), 2);
    }

    #[test]
    fn exact_frame_boundaries_select_the_frame_starting_there() {
        let mut adapter = FakeDecoder::new(4, 2, 10.0, 30.0);
        let mut cache = FrameCache::new(CacheConfig::disabled(), 30.0);

        let frame = cache.frame_at(4.1, &mut adapter).unwrap();
        assert_eq!(frame.bucket(), 123);
        assert!(frame.contains(4.1));
        assert_eq!(frame.data()[0], 123);
    }

    #[test]
    fn moving_out_of_the_bucket_keeps_last_good_frame() {
        let mut adapter = fake();
        adapter.fail_between(1.5, 1.6);
        let mut cache = FrameCache::default();
        let good = cache.frame_at(1.0, &mut adapter).unwrap();

        assert!(cache.frame_at(1.5, &mut adapter).is_err());
        assert_eq!(cache.last_good(), Some(&good));
        assert_eq!(cache.frame_at(1.01, &mut adapter).unwrap(), good);
        assert_eq!(adapter.decode_count(), 2, "one decode plus the failed attempt");
    }

    #[test]
    fn history_serves_recent_buckets() {
        let mut adapter = fake();
        let mut cache = FrameCache::new(CacheConfig::new(4), 30.0);

        cache.frame_at(0.5, &mut adapter).unwrap();
        cache.frame_at(1.0, &mut adapter).unwrap();
        let again = cache.frame_at(0.5, &mut adapter).unwrap();

        assert_eq!(adapter.decode_count(), 2);
        assert_eq!(again.bucket(), 15);
        assert_eq!(cache.recent_len(), 2);
    }

    #[test]
    fn history_evicts_least_recent() {
        let mut adapter = fake();
        let mut cache = FrameCache::new(CacheConfig::new(2), 30.0);

        cache.frame_at(0.0, &mut adapter).unwrap();
        cache.frame_at(0.5, &mut adapter).unwrap();
        cache.frame_at(1.0, &mut adapter).unwrap();

        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.recent_len(), 2);

        cache.frame_at(0.0, &mut adapter).unwrap();
        assert_eq!(adapter.decode_count(), 4);
    }

    #[test]
    fn disabled_history_only_keeps_current() {
        let mut adapter = fake();
        let mut cache = FrameCache::new(CacheConfig::disabled(), 30.0);

        cache.frame_at(0.5, &mut adapter).unwrap();
        cache.frame_at(1.0, &mut adapter).unwrap();
        cache.frame_at(0.5, &mut adapter).unwrap();

        assert_eq!(adapter.decode_count(), 3);
        assert_eq!(cache.recent_len(), 0);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut adapter = fake();
        let mut cache = FrameCache::default();
        cache.frame_at(0.5, &mut adapter).unwrap();

        cache.reset(25.0);
        assert!(cache.last_good().is_none());
        assert_eq!(cache.recent_len(), 0);
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn slice_is_a_view_of_frame_bytes() {
        let mut adapter = fake();
        let mut cache = FrameCache::default();
        let frame = cache.frame_at(1.0, &mut adapter).unwrap();

        let head = frame.slice(..3);
        assert_eq!(head.len(), 3);
        assert_eq!(&head[..], &frame.data()[..3]);
        assert_eq!(frame.len(), 8);
    }

    #[test]
    fn config_from_settings_clamps_history() {
        let settings = CacheSettings {
            enabled: Some(false),
            recent_frames: Some(10_000),
        };
        let config = CacheConfig::from(&settings);
        assert!(!config.enabled);
        assert_eq!(config.recent_frames, MAX_RECENT_FRAMES);
    }

    #[test]
    fn hit_rate_is_a_percentage() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_abs_diff_eq!(stats.hit_rate(), 75.0);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
