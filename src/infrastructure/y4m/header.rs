// SPDX-License-Identifier: MPL-2.0
//! YUV4MPEG2 stream header parsing.
//!
//! A stream starts with one ASCII line:
//!
//! ```text
//! YUV4MPEG2 W<width> H<height> F<num>:<den> [I<i>] [A<a>] [C<colourspace>] [X<ext>]
//! ```

use std::fmt;

use crate::domain::error::DecodeError;

/// Stream signature.
pub const SIGNATURE: &str = "YUV4MPEG2";

/// Per-frame marker.
pub const FRAME_MARKER: &[u8] = b"FRAME";

/// Planar layout of a frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colourspace {
    /// 4:2:0, JPEG chroma siting. Default when no `C` tag is present.
    #[default]
    Yuv420Jpeg,
    Yuv420Paldv,
    Yuv420Mpeg2,
    Yuv420,
    Yuv422,
    Yuv411,
    Yuv444,
    /// 4:4:4 plus an alpha plane.
    Yuv444Alpha,
    /// Luma only.
    Mono,
}

impl Colourspace {
    /// Parses the value of a `C` tag. Returns `None` for unknown layouts.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "420jpeg" => Self::Yuv420Jpeg,
            "420paldv" => Self::Yuv420Paldv,
            "420mpeg2" => Self::Yuv420Mpeg2,
            "420" => Self::Yuv420,
            "422" => Self::Yuv422,
            "411" => Self::Yuv411,
            "444" => Self::Yuv444,
            "444alpha" => Self::Yuv444Alpha,
            "mono" => Self::Mono,
            _ => return None,
        })
    }

    /// Returns the `C` tag value.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Yuv420Jpeg => "420jpeg",
            Self::Yuv420Paldv => "420paldv",
            Self::Yuv420Mpeg2 => "420mpeg2",
            Self::Yuv420 => "420",
            Self::Yuv422 => "422",
            Self::Yuv411 => "411",
            Self::Yuv444 => "444",
            Self::Yuv444Alpha => "444alpha",
            Self::Mono => "mono",
        }
    }

    /// Returns the payload size of one frame, or `None` on overflow.
    #[must_use]
    pub fn frame_size(self, width: u32, height: u32) -> Option<usize> {
        let w = usize::try_from(width).ok()?;
        let h = usize::try_from(height).ok()?;
        let luma = w.checked_mul(h)?;

        let chroma_planes = |cw: usize, ch: usize| cw.checked_mul(ch)?.checked_mul(2);

        match self {
            Self::Yuv420Jpeg | Self::Yuv420Paldv | Self::Yuv420Mpeg2 | Self::Yuv420 => {
                luma.checked_add(chroma_planes(w.div_ceil(2), h.div_ceil(2))?)
            }
            Self::Yuv422 => luma.checked_add(chroma_planes(w.div_ceil(2), h)?),
            Self::Yuv411 => luma.checked_add(chroma_planes(w.div_ceil(4), h)?),
            Self::Yuv444 => luma.checked_mul(3),
            Self::Yuv444Alpha => luma.checked_mul(4),
            Self::Mono => Some(luma),
        }
    }

    /// Returns the size of the leading luma plane.
    #[must_use]
    pub fn luma_size(self, width: u32, height: u32) -> Option<usize> {
        usize::try_from(width)
            .ok()?
            .checked_mul(usize::try_from(height).ok()?)
    }
}

impl fmt::Display for Colourspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Parsed stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Y4mHeader {
    pub width: u32,
    pub height: u32,
    pub rate_num: u32,
    pub rate_den: u32,
    pub colourspace: Colourspace,
}

impl Y4mHeader {
    /// Frame rate in frames per second.
    #[must_use]
    pub fn fps(&self) -> f64 {
        f64::from(self.rate_num) / f64::from(self.rate_den)
    }

    /// Payload size of one frame, or `None` on overflow.
    #[must_use]
    pub fn frame_size(&self) -> Option<usize> {
        self.colourspace.frame_size(self.width, self.height)
    }

    /// Parses the header at the start of `bytes`.
    ///
    /// Returns the header and the offset of the first byte after its newline.
    ///
    /// # Errors
    ///
    /// - `MalformedContainer` for a missing signature, newline or required
    ///   tag, or an unparsable number
    /// - `UnsupportedCodec` for an unknown colourspace
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), DecodeError> {
        let end = bytes
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| malformed("header is not terminated"))?;
        let line = &bytes[..end];
        if !line.is_ascii() {
            return Err(malformed("header is not ASCII"));
        }
        let line = std::str::from_utf8(line).map_err(|_| malformed("header is not ASCII"))?;

        let mut tokens = line.split(' ').filter(|token| !token.is_empty());
        if tokens.next() != Some(SIGNATURE) {
            return Err(malformed("missing YUV4MPEG2 signature"));
        }

        let mut width = None;
        let mut height = None;
        let mut rate = None;
        let mut colourspace = Colourspace::default();

        for token in tokens {
            let (tag, value) = token.split_at(1);
            match tag {
                "W" => width = Some(parse_dimension("width", value)?),
                "H" => height = Some(parse_dimension("height", value)?),
                "F" => rate = Some(parse_ratio(value)?),
                "C" => {
                    colourspace = Colourspace::from_tag(value).ok_or_else(|| {
                        DecodeError::UnsupportedCodec(format!("y4m colourspace {value}"))
                    })?;
                }
                // Interlacing, pixel aspect and extensions do not change the layout.
                "I" | "A" | "X" => {}
                _ => return Err(malformed(&format!("unknown header tag {token}"))),
            }
        }

        let width = width.ok_or_else(|| malformed("missing W tag"))?;
        let height = height.ok_or_else(|| malformed("missing H tag"))?;
        let (rate_num, rate_den) = rate.ok_or_else(|| malformed("missing F tag"))?;

        Ok((
            Self {
                width,
                height,
                rate_num,
                rate_den,
                colourspace,
            },
            end + 1,
        ))
    }
}

fn malformed(reason: &str) -> DecodeError {
    DecodeError::MalformedContainer(format!("y4m: {reason}"))
}

fn parse_dimension(name: &str, value: &str) -> Result<u32, DecodeError> {
    match value.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(malformed(&format!("invalid {name} {value:?}"))),
    }
}

fn parse_ratio(value: &str) -> Result<(u32, u32), DecodeError> {
    let parsed = value
        .split_once(':')
        .and_then(|(num, den)| Some((num.parse::<u32>().ok()?, den.parse::<u32>().ok()?)));
    match parsed {
        Some((num, den)) if num > 0 && den > 0 => Ok((num, den)),
        _ => Err(malformed(&format!("invalid frame rate {value:?}"))),
    }
}
