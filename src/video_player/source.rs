// SPDX-License-Identifier: MPL-2.0
//! Encoded source buffer and its container metadata.
//!
//! An [`EncodedSource`] is immutable once loaded. Loading builds a complete
//! new source before anything is swapped, so a failed load never leaves a
//! half-updated buffer behind.

use crate::application::port::DecodeAdapter;
use crate::domain::error::DecodeError;
use crate::domain::media::{CodecId, ContainerMetadata};
use bytes::Bytes;

/// Raw encoded bytes plus the metadata parsed from their headers.
#[derive(Debug, Clone, Default)]
pub struct EncodedSource {
    bytes: Bytes,
    metadata: ContainerMetadata,
    loaded: bool,
}

impl EncodedSource {
    /// Creates an empty source (nothing loaded, zeroed metadata).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Opens `bytes` with `adapter` and returns the resulting source.
    ///
    /// Only container headers are parsed; no frame is decoded.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's `MalformedContainer` / `UnsupportedCodec`.
    /// Metadata that violates the stream invariants (zero dimensions,
    /// negative or non-finite duration) is reported as `MalformedContainer`.
    pub fn open<A>(adapter: &mut A, bytes: Bytes) -> Result<Self, DecodeError>
    where
        A: DecodeAdapter + ?Sized,
    {
        Self::empty().replace_with(adapter, bytes)
    }

    /// Opens `bytes` as the successor of this source.
    ///
    /// Behaves like [`open`](Self::open). When the adapter accepts the new
    /// bytes but their metadata is rejected, the adapter is rebound to this
    /// source's bytes so it keeps decoding the stream it had.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn replace_with<A>(&self, adapter: &mut A, bytes: Bytes) -> Result<Self, DecodeError>
    where
        A: DecodeAdapter + ?Sized,
    {
        let metadata = adapter.open(&bytes)?;

        if let Err(reason) = metadata.validate() {
            if self.loaded {
                if let Err(err) = adapter.open(&self.bytes) {
                    log::warn!("could not rebind decoder to previous stream: {err}");
                }
            }
            return Err(DecodeError::MalformedContainer(reason));
        }

        Ok(Self {
            bytes,
            metadata,
            loaded: true,
        })
    }

    /// Returns true once a load has succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns the encoded bytes (cheap clone of the shared buffer).
    #[must_use]
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Returns the encoded size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if no bytes are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the container metadata.
    #[must_use]
    pub fn metadata(&self) -> &ContainerMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.metadata.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.metadata.height
    }

    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.metadata.duration_secs
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.metadata.fps
    }

    #[must_use]
    pub fn codec(&self) -> &CodecId {
        &self.metadata.codec
    }
}
