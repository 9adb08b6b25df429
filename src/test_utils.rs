// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and a scriptable decode adapter.
//!
//! This module re-exports the `approx` crate's assertion macros for float comparison,
//! which properly handle floating-point precision issues that `assert_eq!` cannot.

// Re-export approx macros for convenient use in tests
pub use approx::assert_abs_diff_eq;

use crate::application::port::{DecodeAdapter, RawFrame};
use crate::domain::error::DecodeError;
use crate::domain::media::{CodecId, ContainerMetadata};
use crate::video_player::time_units::{bucket_window, frame_bucket};
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct FakeControl {
    opens: AtomicUsize,
    decodes: AtomicUsize,
    failing: Mutex<Vec<(f64, f64)>>,
}

/// Deterministic adapter for unit tests.
///
/// - `open` fails with `MalformedContainer` for bytes starting with `bad`
///   and with `UnsupportedCodec` for bytes starting with `codec?`
/// - every frame is filled with its bucket index (mod 256)
/// - clones share counters and injected failures, so a test can keep a
///   handle after moving the adapter into a `Video`
#[derive(Debug, Clone)]
pub struct FakeDecoder {
    metadata: ContainerMetadata,
    control: Arc<FakeControl>,
}

impl FakeDecoder {
    pub fn new(width: u32, height: u32, duration_secs: f64, fps: f64) -> Self {
        Self {
            metadata: ContainerMetadata::new(
                width,
                height,
                duration_secs,
                fps,
                CodecId::new("fake"),
            ),
            control: Arc::default(),
        }
    }

    /// Makes every decode at a position in `[start, end)` fail.
    pub fn fail_between(&self, start: f64, end: f64) {
        self.control
            .failing
            .lock()
            .expect("fake control poisoned")
            .push((start, end));
    }

    pub fn clear_failures(&self) {
        self.control
            .failing
            .lock()
            .expect("fake control poisoned")
            .clear();
    }

    pub fn decode_count(&self) -> usize {
        self.control.decodes.load(Ordering::SeqCst)
    }

    pub fn open_count(&self) -> usize {
        self.control.opens.load(Ordering::SeqCst)
    }

    fn is_failing(&self, position: f64) -> bool {
        self.control
            .failing
            .lock()
            .expect("fake control poisoned")
            .iter()
            .any(|&(start, end)| position >= start && position < end)
    }
}

impl DecodeAdapter for FakeDecoder {
    fn open(&mut self, bytes: &Bytes) -> Result<ContainerMetadata, DecodeError> {
        if bytes.starts_with(b"bad") {
            return Err(DecodeError::MalformedContainer("bad magic".into()));
        }
        if bytes.starts_with(b"codec?") {
            return Err(DecodeError::UnsupportedCodec("unknown".into()));
        }
        self.control.opens.fetch_add(1, Ordering::SeqCst);
        Ok(self.metadata.clone())
    }

    fn decode_at(&mut self, position_secs: f64) -> Result<RawFrame, DecodeError> {
        self.control.decodes.fetch_add(1, Ordering::SeqCst);
        if self.is_failing(position_secs) {
            return Err(DecodeError::DecodeFailed(format!(
                "injected failure at {position_secs}"
            )));
        }

        let bucket = frame_bucket(position_secs, self.metadata.fps);
        let (timestamp_secs, _) = bucket_window(bucket, self.metadata.fps);
        let size = (self.metadata.width as usize) * (self.metadata.height as usize);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let fill = (bucket % 256) as u8;

        Ok(RawFrame {
            data: Bytes::from(vec![fill; size]),
            width: self.metadata.width,
            height: self.metadata.height,
            timestamp_secs,
        })
    }
}
