//! Timed, multi-chunk responder
//!
//! Each request gets its own [`ChunkEmission`], a small state machine
//!
//! ```text
//! Idle --(delay_first_chunk)--> Emitting(n) --(delay_between_chunks)--> ... --> Done
//! ```
//!
//! driven by a spawned task that sleeps between chunks and writes each one
//! into the streamed response body. The body ends when the task closes its
//! sender after the last chunk.
//!
//! In patterned mode chunk bytes come from [`pattern`] at the chunk's
//! absolute offset, clipped to the requested range; chunks entirely outside
//! the range contribute no bytes. Constant-fill chunks are always written
//! whole, whatever the range.

use std::sync::Arc;
use std::time::Duration;

use futures::SinkExt;
use hyper::body::{Bytes, Frame};
use hyper::header::{HeaderValue, CONTENT_RANGE, RANGE};
use hyper::{HeaderMap, Response, StatusCode};

use crate::config::ResourceConfig;
use crate::error::TransportFailure;
use crate::http::pattern;
use crate::http::range::{parse_range_value, ByteRange};
use crate::http::response::{empty_body, streaming_body, with_headers, BodySender, OriginBody};
use crate::logger;

/// Chunk layout shared by every emission of one resource
#[derive(Debug)]
struct ChunkShape {
    num_chunks: u64,
    chunk_size: u64,
    /// Constant chunk, or `None` in patterned mode
    fill: Option<Bytes>,
    delay_first: Duration,
    delay_between: Duration,
}

#[derive(Debug, Clone)]
pub struct ChunkedResponder {
    status: StatusCode,
    headers: HeaderMap,
    shape: Arc<ChunkShape>,
}

impl ChunkedResponder {
    pub fn new(conf: &ResourceConfig) -> Self {
        let fill = (!conf.patterned).then(|| {
            let size = usize::try_from(conf.chunk_size_bytes).unwrap_or(usize::MAX);
            Bytes::from(vec![conf.chunk_byte_value; size])
        });

        Self {
            status: conf.status,
            headers: conf.headers.clone(),
            shape: Arc::new(ChunkShape {
                num_chunks: conf.num_chunks,
                chunk_size: conf.chunk_size_bytes,
                fill,
                delay_first: conf.delay_first_chunk,
                delay_between: conf.delay_between_chunks,
            }),
        }
    }

    /// Length of the body if every chunk is sent in full
    pub fn total_len(&self) -> u64 {
        self.shape.num_chunks * self.shape.chunk_size
    }

    pub fn is_patterned(&self) -> bool {
        self.shape.fill.is_none()
    }

    /// Start a response. Headers and status are decided here; the body is
    /// produced by a spawned task once the first-chunk delay has elapsed.
    pub fn handle(&self, request_headers: &HeaderMap) -> Response<OriginBody> {
        let range = request_headers.get(RANGE).and_then(|value| {
            match parse_range_value(value).and_then(|spec| spec.resolve(self.total_len())) {
                Ok(range) => Some(range),
                Err(e) => {
                    logger::log_range_ignored(&e);
                    None
                }
            }
        });
        let status = if range.is_some() {
            StatusCode::PARTIAL_CONTENT
        } else {
            self.status
        };

        if self.shape.num_chunks == 0 {
            return with_headers(status, &self.headers, empty_body());
        }

        let (sender, body) = streaming_body();
        let emission = ChunkEmission::new(Arc::clone(&self.shape), range);
        tokio::spawn(async move {
            if let Err(e) = emission.run(sender).await {
                logger::log_client_gone(&e);
            }
        });

        let mut response = with_headers(status, &self.headers, body);
        if let Some(range) = range {
            if self.is_patterned() && !self.headers.contains_key(CONTENT_RANGE) {
                if let Ok(value) = HeaderValue::from_str(&range.content_range(self.total_len())) {
                    response.headers_mut().insert(CONTENT_RANGE, value);
                }
            }
        }
        response
    }
}

/// Where a single response is in its chunk schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionState {
    /// Nothing sent yet; the first-chunk delay applies next
    Idle,
    /// `chunks_left` chunks still to send
    Emitting { chunks_left: u64 },
    Done,
}

/// One scheduled chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkStep {
    /// Pause before writing
    pub delay: Duration,
    /// Bytes to write, `None` when the chunk falls outside the range
    pub payload: Option<Bytes>,
    pub last: bool,
}

/// Per-request chunk schedule
#[derive(Debug)]
pub struct ChunkEmission {
    shape: Arc<ChunkShape>,
    /// Inclusive byte window; the whole body when no range was requested
    window: (u64, u64),
    state: EmissionState,
}

impl ChunkEmission {
    fn new(shape: Arc<ChunkShape>, range: Option<ByteRange>) -> Self {
        let window = range.map_or((0, u64::MAX), |r| (r.start, r.end));
        Self {
            shape,
            window,
            state: EmissionState::Idle,
        }
    }

    pub const fn state(&self) -> EmissionState {
        self.state
    }

    /// Advance the schedule by one chunk
    pub fn next_chunk(&mut self) -> Option<ChunkStep> {
        let (delay, chunks_left) = match self.state {
            EmissionState::Idle => (self.shape.delay_first, self.shape.num_chunks),
            EmissionState::Emitting { chunks_left } => (self.shape.delay_between, chunks_left),
            EmissionState::Done => return None,
        };
        if chunks_left == 0 {
            self.state = EmissionState::Done;
            return None;
        }

        let payload = self.payload(chunks_left);
        let last = chunks_left == 1;
        self.state = if last {
            EmissionState::Done
        } else {
            EmissionState::Emitting {
                chunks_left: chunks_left - 1,
            }
        };

        Some(ChunkStep {
            delay,
            payload,
            last,
        })
    }

    fn payload(&self, chunks_left: u64) -> Option<Bytes> {
        if let Some(fill) = &self.shape.fill {
            return Some(fill.clone());
        }

        let first_byte = self.shape.chunk_size * (self.shape.num_chunks - chunks_left);
        let last_byte = first_byte + self.shape.chunk_size - 1;
        let (range_start, range_end) = self.window;
        if last_byte < range_start || first_byte > range_end {
            return None;
        }

        pattern::generate(range_start.max(first_byte), range_end.min(last_byte))
            .ok()
            .map(Bytes::from)
    }

    /// Drive the schedule to completion, writing into `sender`.
    ///
    /// A failed write means the body was dropped (client gone): the schedule
    /// stops there and no further chunks are produced.
    pub async fn run(mut self, mut sender: BodySender) -> Result<(), TransportFailure> {
        while let Some(step) = self.next_chunk() {
            if !step.delay.is_zero() {
                tokio::time::sleep(step.delay).await;
            }

            let delivered = match step.payload {
                Some(payload) => sender.send(Ok(Frame::data(payload))).await.is_ok(),
                None => !sender.is_closed(),
            };
            if !delivered {
                return Err(TransportFailure);
            }
        }

        sender.close_channel();
        Ok(())
    }
}
