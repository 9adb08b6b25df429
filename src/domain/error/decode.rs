// SPDX-License-Identifier: MPL-2.0
//! Decode error taxonomy shared by the adapter port and the playback core.

use std::fmt;

/// Failure reported while opening or decoding an encoded stream.
///
/// Seek targets outside the stream are never an error: they are clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Container headers could not be parsed.
    /// Fatal for the `load` call that produced it; prior state is preserved.
    MalformedContainer(String),

    /// Container was recognised but its codec is not.
    UnsupportedCodec(String),

    /// The adapter could not produce a frame for a position.
    /// Recoverable: the previously cached frame stays valid.
    DecodeFailed(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MalformedContainer(msg) => write!(f, "Malformed container: {}", msg),
            DecodeError::UnsupportedCodec(codec) => write!(f, "Unsupported codec: {}", codec),
            DecodeError::DecodeFailed(msg) => write!(f, "Decoding failed: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = DecodeError::UnsupportedCodec("420p10".to_string());
        assert_eq!(format!("{}", err), "Unsupported codec: 420p10");

        let err = DecodeError::DecodeFailed("short read".to_string());
        assert!(err.to_string().contains("short read"));
    }
}
