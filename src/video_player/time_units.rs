// SPDX-License-Identifier: MPL-2.0
//! Time unit conversion utilities for video playback.
//!
//! Frame buckets key the frame cache and pick the frame a decoder returns.
//! Bucket `n` covers the half-open window `[n / fps, (n + 1) / fps)`, and
//! [`frame_bucket`] always agrees with [`bucket_window`].

use crate::config::FALLBACK_FRAME_RATE;

/// Returns `fps` if it is usable, otherwise the fallback frame rate.
#[inline]
#[must_use]
pub fn effective_fps(fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        fps
    } else {
        FALLBACK_FRAME_RATE
    }
}

/// Returns the index of the frame bucket containing `position_secs`.
///
/// Bucket `n` covers `[n / fps, (n + 1) / fps)`. The product
/// `position * fps` can land just below an integer at an exact frame
/// boundary (`4.1 * 30.0 == 122.999..`), so the floored index is nudged
/// until the window computed by [`bucket_window`] contains the position.
/// Non-finite and negative positions map to bucket 0.
///
/// # Examples
///
/// ```
/// use playback_core::video_player::time_units::frame_bucket;
///
/// assert_eq!(frame_bucket(0.0, 30.0), 0);
/// assert_eq!(frame_bucket(1.0, 30.0), 30);
/// assert_eq!(frame_bucket(1.02, 30.0), 30);
/// assert_eq!(frame_bucket(4.1, 30.0), 123);
/// ```
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn frame_bucket(position_secs: f64, fps: f64) -> i64 {
    if !position_secs.is_finite() || position_secs <= 0.0 {
        return 0;
    }
    let fps = effective_fps(fps);
    let mut bucket = (position_secs * fps).floor() as i64;
    let (start, end) = bucket_window(bucket, fps);
    if start > position_secs {
        bucket -= 1;
    } else if end <= position_secs {
        bucket += 1;
    }
    bucket.max(0)
}

/// Returns the half-open window `[start, end)` in seconds covered by `bucket`.
#[inline]
#[allow(clippy::cast_precision_loss)]
pub fn bucket_window(bucket: i64, fps: f64) -> (f64, f64) {
    let fps = effective_fps(fps);
    (bucket as f64 / fps, (bucket + 1) as f64 / fps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn effective_fps_falls_back_for_unknown_rates() {
        assert_eq!(effective_fps(25.0), 25.0);
        assert_eq!(effective_fps(0.0), FALLBACK_FRAME_RATE);
        assert_eq!(effective_fps(-1.0), FALLBACK_FRAME_RATE);
        assert_eq!(effective_fps(f64::NAN), FALLBACK_FRAME_RATE);
    }

    #[test]
    fn frame_bucket_floors_to_frame_index() {
        assert_eq!(frame_bucket(0.0, 30.0), 0);
        assert_eq!(frame_bucket(0.033, 30.0), 0);
        assert_eq!(frame_bucket(0.034, 30.0), 1);
        assert_eq!(frame_bucket(2.0, 30.0), 60);
    }

    #[test]
    fn frame_bucket_clamps_invalid_positions() {
        assert_eq!(frame_bucket(-3.0, 30.0), 0);
        assert_eq!(frame_bucket(f64::NAN, 30.0), 0);
        assert_eq!(frame_bucket(f64::INFINITY, 30.0), 0);
    }

    #[test]
    fn bucket_window_is_one_frame_long() {
        let (start, end) = bucket_window(30, 30.0);
        assert_abs_diff_eq!(start, 1.0);
        assert_abs_diff_eq!(end - start, 1.0 / 30.0, epsilon = 1e-12);
    }

    #[test]
    fn window_contains_positions_of_its_bucket() {
        for position in [0.0, 0.5, 1.0, 1.49, 1.999] {
            let bucket = frame_bucket(position, 24.0);
            let (start, end) = bucket_window(bucket, 24.0);
            assert!(start <= position + 1e-12 && position < end, "{position}");
        }
    }

    #[test]
    fn frame_bucket_agrees_with_window_at_exact_boundaries() {
        for fps in [30.0, 25.0, 30_000.0 / 1001.0, 24.0, 60.0] {
            for k in 0..2_000_i64 {
                #[allow(clippy::cast_precision_loss)]
                let position = k as f64 / fps;
                let bucket = frame_bucket(position, fps);
                assert_eq!(bucket, k, "fps {fps}, frame {k}");
                let (start, end) = bucket_window(bucket, fps);
                assert!(start <= position && position < end, "fps {fps}, frame {k}");
            }
        }
    }

    #[test]
    fn frame_bucket_handles_products_just_below_an_integer() {
        assert_eq!(frame_bucket(4.1, 30.0), 123);
        assert_eq!(frame_bucket(123.0 / 30.0, 30.0), 123);
    }
}
