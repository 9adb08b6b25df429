// SPDX-License-Identifier: MPL-2.0
//! YUV4MPEG2 adapter implementing the [`DecodeAdapter`] port trait.
//!
//! `.y4m` is an uncompressed planar container, which makes it a reference
//! adapter: the playback core can be driven end to end without a codec
//! library.
//!
//! # Design Notes
//!
//! - `open` parses the header and indexes every frame offset; no payload
//!   is copied
//! - `decode_at` returns the planar payload of the frame whose window
//!   `[n / fps, (n + 1) / fps)` contains the position, as a zero-copy slice
//!   of the source buffer
//! - A truncated trailing frame is ignored, as most players do
//!
//! [`DecodeAdapter`]: crate::application::port::DecodeAdapter

mod builder;
mod header;

pub use builder::Y4mBuilder;
pub use header::{Colourspace, Y4mHeader};

use bytes::Bytes;

use crate::application::port::{DecodeAdapter, RawFrame};
use crate::domain::error::DecodeError;
use crate::domain::media::{CodecId, ContainerMetadata};
use crate::video_player::time_units::frame_bucket;
use header::FRAME_MARKER;

/// One indexed stream.
#[derive(Debug, Clone)]
struct Stream {
    bytes: Bytes,
    header: Y4mHeader,
    frame_size: usize,
    /// Payload offset of every complete frame.
    frame_offsets: Vec<usize>,
}

impl Stream {
    fn index(bytes: &Bytes) -> Result<Self, DecodeError> {
        let (header, mut pos) = Y4mHeader::parse(bytes)?;
        let frame_size = header.frame_size().ok_or_else(|| {
            DecodeError::MalformedContainer(format!(
                "y4m: frame size overflows for {}x{}",
                header.width, header.height
            ))
        })?;

        let mut frame_offsets = Vec::new();
        while pos < bytes.len() {
            let rest = &bytes[pos..];
            if !rest.starts_with(FRAME_MARKER) {
                return Err(DecodeError::MalformedContainer(format!(
                    "y4m: expected FRAME marker at offset {pos}"
                )));
            }
            let Some(line_end) = rest.iter().position(|&b| b == b'\n') else {
                log::debug!("y4m: ignoring unterminated frame header at offset {pos}");
                break;
            };
            let payload = pos + line_end + 1;
            if bytes.len() - payload < frame_size {
                log::debug!(
                    "y4m: ignoring truncated frame {} ({} of {} bytes)",
                    frame_offsets.len(),
                    bytes.len() - payload,
                    frame_size
                );
                break;
            }
            frame_offsets.push(payload);
            pos = payload + frame_size;
        }

        Ok(Self {
            bytes: bytes.clone(),
            header,
            frame_size,
            frame_offsets,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn metadata(&self) -> ContainerMetadata {
        let fps = self.header.fps();
        let count = self.frame_offsets.len();
        ContainerMetadata::new(
            self.header.width,
            self.header.height,
            count as f64 / fps,
            fps,
            CodecId::new(format!("yuv4mpeg2/{}", self.header.colourspace)),
        )
        .with_frame_count(count as u64)
    }
}

/// `.y4m` decoder implementing the [`DecodeAdapter`] trait.
///
/// # Example
///
/// ```
/// use playback_core::application::port::DecodeAdapter;
/// use playback_core::infrastructure::y4m::{Y4mBuilder, Y4mDecoder};
///
/// let stream = Y4mBuilder::new(64, 48).frame_rate(30, 1).frames(60).build();
/// let mut decoder = Y4mDecoder::new();
/// let metadata = decoder.open(&stream).unwrap();
/// assert_eq!(metadata.duration_secs, 2.0);
///
/// let frame = decoder.decode_at(1.0).unwrap();
/// assert_eq!(frame.data[0], 30);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Y4mDecoder {
    stream: Option<Stream>,
}

impl Y4mDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Header of the currently opened stream.
    #[must_use]
    pub fn header(&self) -> Option<&Y4mHeader> {
        self.stream.as_ref().map(|stream| &stream.header)
    }

    /// Number of complete frames in the currently opened stream.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.stream
            .as_ref()
            .map_or(0, |stream| stream.frame_offsets.len())
    }
}

impl DecodeAdapter for Y4mDecoder {
    fn open(&mut self, bytes: &Bytes) -> Result<ContainerMetadata, DecodeError> {
        // Index fully before replacing, so a bad stream keeps the old one.
        let stream = Stream::index(bytes)?;
        let metadata = stream.metadata();
        log::debug!(
            "y4m: opened {}x{} {} with {} frame(s)",
            stream.header.width,
            stream.header.height,
            stream.header.colourspace,
            stream.frame_offsets.len()
        );
        self.stream = Some(stream);
        Ok(metadata)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn decode_at(&mut self, position_secs: f64) -> Result<RawFrame, DecodeError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| DecodeError::DecodeFailed("y4m: no stream opened".into()))?;
        let last = stream
            .frame_offsets
            .len()
            .checked_sub(1)
            .ok_or_else(|| DecodeError::DecodeFailed("y4m: stream has no frames".into()))?;

        let fps = stream.header.fps();
        let index = (frame_bucket(position_secs, fps).max(0) as usize).min(last);
        let offset = stream.frame_offsets[index];

        Ok(RawFrame {
            data: stream.bytes.slice(offset..offset + stream.frame_size),
            width: stream.header.width,
            height: stream.header.height,
            timestamp_secs: index as f64 / fps,
        })
    }
}
