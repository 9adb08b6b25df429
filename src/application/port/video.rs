// SPDX-License-Identifier: MPL-2.0
//! Video decoding port definition.
//!
//! This module defines the [`DecodeAdapter`] trait the playback core uses to
//! turn encoded bytes into frames. Infrastructure adapters implement it.
//!
//! # Design Notes
//!
//! - The adapter is **stateful**: `open` binds it to one encoded stream
//! - Methods are synchronous; offloading to a worker is the adapter's business
//!   (see [`ThreadedDecoder`](crate::infrastructure::ThreadedDecoder))
//! - Uses domain types plus [`Bytes`] for zero-copy buffers

use crate::domain::error::DecodeError;
use crate::domain::media::ContainerMetadata;
use bytes::Bytes;

/// A decoded frame as returned by an adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Raw pixel or sample bytes. Layout is codec specific.
    pub data: Bytes,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Presentation timestamp of this frame in seconds.
    pub timestamp_secs: f64,
}

impl RawFrame {
    /// Returns the payload size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Port for decoding an encoded stream at arbitrary positions.
///
/// # Thread Safety
///
/// Implementations must be `Send` so a `Video` can move between threads.
/// They are **not** required to be `Sync`; every call goes through `&mut self`.
///
/// # Lifecycle
///
/// 1. Call `open()` with the encoded bytes; only headers are parsed
/// 2. Call `decode_at()` for any position inside `[0, duration]`
/// 3. A later `open()` replaces the stream
///
/// A failed `open()` must leave any previously opened stream usable, so the
/// owning `Video` can keep playing what it had.
pub trait DecodeAdapter: Send {
    /// Parses container headers and binds the adapter to `bytes`.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::MalformedContainer`] if the headers cannot be parsed
    /// - [`DecodeError::UnsupportedCodec`] if the codec is not recognised
    fn open(&mut self, bytes: &Bytes) -> Result<ContainerMetadata, DecodeError>;

    /// Decodes the frame presented at `position_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::DecodeFailed`] if no frame can be produced.
    fn decode_at(&mut self, position_secs: f64) -> Result<RawFrame, DecodeError>;
}

impl<A: DecodeAdapter + ?Sized> DecodeAdapter for Box<A> {
    fn open(&mut self, bytes: &Bytes) -> Result<ContainerMetadata, DecodeError> {
        (**self).open(bytes)
    }

    fn decode_at(&mut self, position_secs: f64) -> Result<RawFrame, DecodeError> {
        (**self).decode_at(position_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::CodecId;

    // Test that the trait is object-safe
    fn _assert_object_safe(_: &dyn DecodeAdapter) {}

    struct ConstantDecoder {
        open: bool,
    }

    impl DecodeAdapter for ConstantDecoder {
        fn open(&mut self, bytes: &Bytes) -> Result<ContainerMetadata, DecodeError> {
            if bytes.is_empty() {
                return Err(DecodeError::MalformedContainer("empty".into()));
            }
            self.open = true;
            Ok(ContainerMetadata::new(2, 2, 1.0, 10.0, CodecId::new("const")))
        }

        fn decode_at(&mut self, position_secs: f64) -> Result<RawFrame, DecodeError> {
            if !self.open {
                return Err(DecodeError::DecodeFailed("not open".into()));
            }
            Ok(RawFrame {
                data: Bytes::from_static(&[7; 16]),
                width: 2,
                height: 2,
                timestamp_secs: position_secs,
            })
        }
    }

    #[test]
    fn boxed_adapter_forwards_calls() {
        let mut decoder: Box<dyn DecodeAdapter> = Box::new(ConstantDecoder { open: false });

        assert!(decoder.decode_at(0.0).is_err());
        assert!(decoder.open(&Bytes::new()).is_err());

        let meta = decoder.open(&Bytes::from_static(b"x")).unwrap();
        assert_eq!(meta.width, 2);

        let frame = decoder.decode_at(0.5).unwrap();
        assert_eq!(frame.size_bytes(), 16);
        assert_eq!(frame.timestamp_secs, 0.5);
    }
}
