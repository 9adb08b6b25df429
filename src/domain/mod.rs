// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core playback types with ZERO external dependencies.
//!
//! This module contains pure domain types, value objects, and business rules.
//! It has no dependencies on external crates (except `std`) to ensure
//! testability and architectural purity.
//!
//! # Modules
//!
//! - [`error`]: Domain error types ([`DecodeError`](error::DecodeError))
//! - [`media`]: Stream metadata ([`ContainerMetadata`](media::ContainerMetadata),
//!   [`CodecId`](media::CodecId))
//! - [`video`]: Video playback types ([`PlaybackStatus`](video::PlaybackStatus),
//!   [`PlaybackRate`](video::PlaybackRate))

pub mod error;
pub mod media;
pub mod video;
