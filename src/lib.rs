// SPDX-License-Identifier: MPL-2.0
//! `playback_core` is a video playback engine for embedding.
//!
//! It ingests encoded byte streams, exposes a seekable playback clock per
//! video, decodes frames lazily through a pluggable adapter and advances
//! every live video in lockstep from a single global tick.
//!
//! # Example
//!
//! ```
//! use playback_core::infrastructure::y4m::{Y4mBuilder, Y4mDecoder};
//! use playback_core::video_player::{Scheduler, Video};
//!
//! let scheduler = Scheduler::new();
//! let video = Video::with_scheduler(Y4mDecoder::new(), &scheduler);
//! video.load(Y4mBuilder::new(64, 48).frame_rate(30, 1).frames(60).build()).unwrap();
//! assert_eq!((video.width(), video.height()), (64, 48));
//!
//! video.play();
//! for _ in 0..180 {
//!     scheduler.update_all(1.0 / 90.0);
//! }
//! assert!(video.status().is_stopped());
//! assert_eq!(video.current_time(), 2.0);
//!
//! let frame = video.data().unwrap();
//! let head = frame.slice(..16);
//! assert_eq!(head.len(), 16);
//! ```

#![doc(html_root_url = "https://docs.rs/playback_core/0.3.0")]

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod video_player;

#[cfg(test)]
pub(crate) mod test_utils;
