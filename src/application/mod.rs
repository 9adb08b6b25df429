// SPDX-License-Identifier: MPL-2.0
//! Application layer - ports between the playback core and its decoders.
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - `video_player` drives the ports and never names a concrete adapter

pub mod port;
