// SPDX-License-Identifier: MPL-2.0
//! Core media types for the domain layer.
//!
//! These types describe an encoded stream without touching its bytes.

use std::fmt;

/// Codec identifier reported by a decode adapter.
///
/// The playback core never interprets it; it is carried through so callers
/// can display it or make policy decisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CodecId(String);

impl CodecId {
    /// Creates a codec identifier from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if no codec has been set (nothing loaded yet).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Container-level metadata parsed from stream headers.
///
/// The default value is the "nothing loaded" state: zero dimensions,
/// zero duration and an empty codec.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContainerMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Frames per second. Zero when the container does not say.
    pub fps: f64,
    /// Codec identifier.
    pub codec: CodecId,
    /// Number of frames, when the container indexes them.
    pub frame_count: Option<u64>,
}

impl ContainerMetadata {
    /// Creates metadata without a frame index.
    #[must_use]
    pub fn new(width: u32, height: u32, duration_secs: f64, fps: f64, codec: CodecId) -> Self {
        Self {
            width,
            height,
            duration_secs,
            fps,
            codec,
            frame_count: None,
        }
    }

    /// Attaches a frame count.
    #[must_use]
    pub fn with_frame_count(mut self, frame_count: u64) -> Self {
        self.frame_count = Some(frame_count);
        self
    }

    /// Checks the invariants every loaded stream must satisfy.
    ///
    /// Returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("invalid dimensions {}x{}", self.width, self.height));
        }
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(format!("invalid duration {}", self.duration_secs));
        }
        if !self.fps.is_finite() || self.fps < 0.0 {
            return Err(format!("invalid frame rate {}", self.fps));
        }
        Ok(())
    }
}
