// SPDX-License-Identifier: MPL-2.0
//! Worker-thread decoding behind a synchronous adapter.
//!
//! [`ThreadedDecoder`] owns any [`DecodeAdapter`] on a dedicated thread and
//! forwards calls over a channel. Callers keep the synchronous contract:
//! each call blocks until the worker answers, with a bounded wait on
//! `decode_at`.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐  Request + reply tx   ┌──────────────┐
//! │  Video    │ ────────────────────▶ │ decode worker│── adapter.decode_at()
//! │ (caller)  │ ◀──────────────────── │   thread     │
//! └───────────┘   bounded(1) reply    └──────────────┘
//! ```
//!
//! Every request carries its own reply channel, so a reply that arrives
//! after its caller timed out is dropped with that channel and can never
//! be mistaken for the answer to a later request.

use std::thread;
use std::time::Duration;

use bytes::Bytes;
use crossbeam_channel::{bounded, unbounded, RecvTimeoutError, Sender};

use crate::application::port::{DecodeAdapter, RawFrame};
use crate::config::DecoderConfig;
use crate::domain::error::DecodeError;
use crate::domain::media::ContainerMetadata;
use crate::error::{Error, Result};

type Reply<T> = Sender<std::result::Result<T, DecodeError>>;

enum Request {
    Open(Bytes, Reply<ContainerMetadata>),
    DecodeAt(f64, Reply<RawFrame>),
}

/// Adapter wrapper that runs the inner adapter on a worker thread.
///
/// Dropping the wrapper closes the request channel; the worker finishes its
/// current request and exits on its own.
#[derive(Debug)]
pub struct ThreadedDecoder {
    requests: Sender<Request>,
    timeout: Duration,
}

impl ThreadedDecoder {
    /// Moves `adapter` onto a new worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the thread cannot be spawned.
    pub fn spawn<A>(mut adapter: A, timeout: Duration) -> Result<Self>
    where
        A: DecodeAdapter + 'static,
    {
        let (requests, inbox) = unbounded::<Request>();

        thread::Builder::new()
            .name("playback-decode".into())
            .spawn(move || {
                log::trace!("decode worker started");
                for request in inbox {
                    // A send error means the caller gave up waiting.
                    match request {
                        Request::Open(bytes, reply) => {
                            let _ = reply.send(adapter.open(&bytes));
                        }
                        Request::DecodeAt(position, reply) => {
                            let _ = reply.send(adapter.decode_at(position));
                        }
                    }
                }
                log::trace!("decode worker stopped");
            })
            .map_err(|err| Error::Io(format!("failed to spawn decode worker: {err}")))?;

        Ok(Self { requests, timeout })
    }

    /// Moves `adapter` onto a worker thread using the `[decoder]` wait bound.
    ///
    /// # Errors
    ///
    /// Same as [`spawn`](Self::spawn).
    pub fn from_config<A>(adapter: A, config: &DecoderConfig) -> Result<Self>
    where
        A: DecodeAdapter + 'static,
    {
        Self::spawn(adapter, config.decode_timeout())
    }

    /// Returns the bounded wait applied to `decode_at`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn worker_gone() -> DecodeError {
        DecodeError::DecodeFailed("decode worker is gone".into())
    }
}

impl DecodeAdapter for ThreadedDecoder {
    /// Header parsing is cheap and must not be abandoned half way, so
    /// `open` waits without a bound.
    fn open(&mut self, bytes: &Bytes) -> std::result::Result<ContainerMetadata, DecodeError> {
        let (reply, answer) = bounded(1);
        self.requests
            .send(Request::Open(bytes.clone(), reply))
            .map_err(|_| Self::worker_gone())?;
        answer.recv().map_err(|_| Self::worker_gone())?
    }

    fn decode_at(&mut self, position_secs: f64) -> std::result::Result<RawFrame, DecodeError> {
        let (reply, answer) = bounded(1);
        self.requests
            .send(Request::DecodeAt(position_secs, reply))
            .map_err(|_| Self::worker_gone())?;

        match answer.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "decode at {position_secs:.3}s exceeded {}ms",
                    self.timeout.as_millis()
                );
                Err(DecodeError::DecodeFailed(format!(
                    "decode timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => Err(Self::worker_gone()),
        }
    }
}
