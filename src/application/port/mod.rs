// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//! These traits use domain types, ensuring the playback core remains
//! independent of concrete decoders.
//!
//! # Available Ports
//!
//! - [`video`]: Stream opening and positional frame decoding
//!
//! # Example
//!
//! ```ignore
//! use playback_core::application::port::DecodeAdapter;
//! use bytes::Bytes;
//!
//! fn first_frame_size(decoder: &mut impl DecodeAdapter, bytes: &Bytes) -> Option<usize> {
//!     decoder.open(bytes).ok()?;
//!     decoder.decode_at(0.0).ok().map(|frame| frame.size_bytes())
//! }
//! ```

pub mod video;

// Re-export main types for convenience
pub use video::{DecodeAdapter, RawFrame};
