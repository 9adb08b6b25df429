// SPDX-License-Identifier: MPL-2.0
//! Synthesizes YUV4MPEG2 streams.
//!
//! Used by the demo binary's `--synthetic` mode, the benchmarks and tests.
//! Frame `n` has every luma sample set to `n % 256` and neutral chroma, so
//! the first byte of a decoded frame identifies it.

use bytes::{BufMut, Bytes, BytesMut};

use super::header::{Colourspace, FRAME_MARKER, SIGNATURE};

/// Builder for an in-memory `.y4m` stream.
#[derive(Debug, Clone)]
pub struct Y4mBuilder {
    width: u32,
    height: u32,
    rate: (u32, u32),
    colourspace: Option<Colourspace>,
    frames: u32,
}

impl Y4mBuilder {
    /// Starts a 25 fps stream of `width` x `height` with no frames.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rate: (25, 1),
            colourspace: None,
            frames: 0,
        }
    }

    /// Sets the frame rate to `num / den` frames per second.
    #[must_use]
    pub fn frame_rate(mut self, num: u32, den: u32) -> Self {
        self.rate = (num, den);
        self
    }

    /// Writes an explicit `C` tag.
    #[must_use]
    pub fn colourspace(mut self, colourspace: Colourspace) -> Self {
        self.colourspace = Some(colourspace);
        self
    }

    /// Sets the number of frames.
    #[must_use]
    pub fn frames(mut self, frames: u32) -> Self {
        self.frames = frames;
        self
    }

    /// Sets the frame count so the stream lasts `secs` seconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn duration_secs(mut self, secs: f64) -> Self {
        let fps = f64::from(self.rate.0) / f64::from(self.rate.1.max(1));
        self.frames = (secs * fps).round().max(0.0) as u32;
        self
    }

    /// Renders the header line, including its newline.
    #[must_use]
    pub fn header(&self) -> String {
        let mut header = format!(
            "{SIGNATURE} W{} H{} F{}:{} Ip A1:1",
            self.width, self.height, self.rate.0, self.rate.1
        );
        if let Some(colourspace) = self.colourspace {
            header.push_str(" C");
            header.push_str(colourspace.tag());
        }
        header.push('\n');
        header
    }

    /// Renders the stream.
    #[must_use]
    pub fn build(&self) -> Bytes {
        let colourspace = self.colourspace.unwrap_or_default();
        let frame_size = colourspace
            .frame_size(self.width, self.height)
            .unwrap_or_default();
        let luma_size = colourspace
            .luma_size(self.width, self.height)
            .unwrap_or_default()
            .min(frame_size);

        let header = self.header();
        let per_frame = FRAME_MARKER.len() + 1 + frame_size;
        let mut out = BytesMut::with_capacity(header.len() + per_frame * self.frames as usize);
        out.put_slice(header.as_bytes());

        for index in 0..self.frames {
            out.put_slice(FRAME_MARKER);
            out.put_u8(b'\n');
            #[allow(clippy::cast_possible_truncation)]
            out.put_bytes((index % 256) as u8, luma_size);
            out.put_bytes(128, frame_size - luma_size);
        }

        out.freeze()
    }
}
