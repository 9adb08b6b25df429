// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! This module contains concrete implementations of the [`DecodeAdapter`]
//! port defined in `application::port`.
//!
//! # Available Adapters
//!
//! - [`y4m`]: Uncompressed YUV4MPEG2 streams (reference adapter)
//! - [`worker`]: Runs any adapter on a worker thread with a bounded wait
//!
//! # Design Notes
//!
//! - Adapters implement traits from `application::port`
//! - Composition happens here: [`build_adapter`] applies the `[decoder]`
//!   settings to a concrete adapter
//!
//! [`DecodeAdapter`]: crate::application::port::DecodeAdapter

pub mod worker;
pub mod y4m;

// Re-export main types for convenience
pub use worker::ThreadedDecoder;
pub use y4m::{Y4mBuilder, Y4mDecoder};

use crate::application::port::DecodeAdapter;
use crate::config::DecoderConfig;
use crate::error::Result;

/// Wraps `adapter` according to the `[decoder]` settings.
///
/// With `threaded = true` the adapter moves onto a worker thread.
///
/// # Errors
///
/// Returns an I/O error if the worker thread cannot be spawned.
pub fn build_adapter<A>(adapter: A, config: &DecoderConfig) -> Result<Box<dyn DecodeAdapter>>
where
    A: DecodeAdapter + 'static,
{
    if config.threaded.unwrap_or(false) {
        log::debug!(
            "decoding on a worker thread ({}ms bound)",
            config.decode_timeout().as_millis()
        );
        Ok(Box::new(ThreadedDecoder::from_config(adapter, config)?))
    } else {
        Ok(Box::new(adapter))
    }
}
