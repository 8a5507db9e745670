// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;
use alloc::vec::Vec;

/// Splits a passively captured RTU byte stream into frames and noise.
///
/// Bytes are fed in arbitrary chunks with [`Reassembler::ingest`]. Every call
/// extracts as many complete frames as possible; incomplete trailing bytes
/// stay buffered for the next call. Bytes that fit no known frame shape are
/// dropped one at a time into a [`NoiseRun`] that is emitted right before the
/// next valid frame.
///
/// Emitted events are independent of how the stream was chunked.
#[derive(Debug, Clone)]
pub struct Reassembler {
    buf: Vec<u8>,
    noise: Option<NoiseRun>,
    /// Stream offset of `buf[0]`.
    position: usize,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

/// What to do with the front of the buffer.
#[derive(Debug)]
enum Step {
    Frame { len: usize, frame: DecodedFrame },
    Noise,
    NeedMore,
}

/// Result of probing one frame shape.
#[derive(Debug)]
enum Attempt {
    Frame(usize, DecodedFrame),
    /// The buffer does not hold the whole shape yet.
    Insufficient,
    /// Wrong checksum or undecodable content.
    Mismatch,
}

impl Reassembler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(MAX_FRAME_LEN),
            noise: None,
            position: 0,
        }
    }

    /// Append `chunk` and collect all events it completes.
    ///
    /// An empty chunk signals an elapsed silence interval. It triggers another
    /// decoding attempt in which a complete response is accepted even though
    /// the longer request shape of the same function code is still incomplete.
    pub fn ingest(&mut self, chunk: &[u8]) -> Vec<Event> {
        let mut events = Vec::new();
        self.ingest_with(chunk, |event| events.push(event));
        events
    }

    /// Like [`Self::ingest`], but hands each event to `on_event` as soon as
    /// it is complete.
    pub fn ingest_with<F>(&mut self, chunk: &[u8], mut on_event: F)
    where
        F: FnMut(Event),
    {
        let silence = chunk.is_empty();
        self.buf.extend_from_slice(chunk);
        let mut consumed = 0;
        loop {
            match next_step(&self.buf[consumed..], silence) {
                Step::NeedMore => break,
                Step::Noise => {
                    let byte = self.buf[consumed];
                    self.push_noise(byte);
                    consumed += 1;
                }
                Step::Frame { len, frame } => {
                    if let Some(noise) = self.noise.take() {
                        #[cfg(feature = "log")]
                        log::debug!(
                            "Resynchronized after {} noise byte(s) at offset {}",
                            noise.bytes.len(),
                            noise.start
                        );
                        on_event(Event::Noise(noise));
                    }
                    let location = FrameLocation {
                        start: self.position,
                        size: len,
                    };
                    consumed += len;
                    self.position += len;
                    on_event(Event::Frame { location, frame });
                }
            }
        }
        self.buf.drain(..consumed);
    }

    fn push_noise(&mut self, byte: u8) {
        #[cfg(feature = "log")]
        log::trace!("Dropping noise byte 0x{byte:02X} at offset {}", self.position);
        match &mut self.noise {
            Some(noise) => noise.push(byte),
            None => self.noise = Some(NoiseRun::open(self.position, byte)),
        }
        self.position += 1;
    }

    /// Bytes received but not yet attributed to a frame or noise.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Number of [pending](Self::pending) bytes.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// The noise run that has not been closed by a valid frame yet.
    #[must_use]
    pub const fn open_noise(&self) -> Option<&NoiseRun> {
        self.noise.as_ref()
    }

    /// Stream offset of the first pending byte.
    ///
    /// This equals the number of bytes already attributed to frames or noise.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// End of the stream: everything not yet attributed is noise.
    ///
    /// Closes the open noise run (extended by the pending bytes) and leaves
    /// the reassembler empty, ready for a new stream segment.
    pub fn finish(&mut self) -> Option<NoiseRun> {
        for byte in core::mem::take(&mut self.buf) {
            self.push_noise(byte);
        }
        self.noise.take()
    }
}

/// Decide how to consume the front of `buf`.
///
/// The request shape is probed first. While it is incomplete no decision is
/// made, so the outcome does not depend on how the stream was chunked. Only
/// after `silence` a complete response is accepted in that situation.
fn next_step(buf: &[u8], silence: bool) -> Step {
    if buf.len() < MIN_PROBE_LEN {
        return Step::NeedMore;
    }
    let fn_code = buf[1];

    if is_exception(fn_code) {
        return match attempt(buf, EXCEPTION_SHAPE, decode_exception) {
            Attempt::Frame(len, frame) => Step::Frame { len, frame },
            Attempt::Insufficient => Step::NeedMore,
            Attempt::Mismatch => Step::Noise,
        };
    }

    let Some(pair) = shapes(FunctionCode::new(fn_code)) else {
        return Step::Noise;
    };

    let response = pair.get(DecoderType::Response);
    match attempt(buf, pair.get(DecoderType::Request), decode_request) {
        Attempt::Frame(len, frame) => Step::Frame { len, frame },
        Attempt::Insufficient if !silence => Step::NeedMore,
        Attempt::Insufficient => match attempt(buf, response, decode_response) {
            Attempt::Frame(len, frame) => Step::Frame { len, frame },
            Attempt::Insufficient | Attempt::Mismatch => Step::NeedMore,
        },
        Attempt::Mismatch => match attempt(buf, response, decode_response) {
            Attempt::Frame(len, frame) => Step::Frame { len, frame },
            Attempt::Insufficient => Step::NeedMore,
            Attempt::Mismatch => Step::Noise,
        },
    }
}

fn attempt(
    buf: &[u8],
    shape: FrameShape,
    decode: fn(UnitId, &[u8]) -> Result<DecodedFrame>,
) -> Attempt {
    let Some(len) = shape.frame_len(buf) else {
        return Attempt::Insufficient;
    };
    let Some(raw_frame) = buf.get(..len) else {
        return Attempt::Insufficient;
    };
    verify_crc(raw_frame)
        .and_then(|adu_buf| decode(adu_buf[0], &adu_buf[1..]))
        .map_or_else(
            |_err| {
                #[cfg(feature = "log")]
                log::debug!("No {len} byte frame at buffer front: {_err}");
                Attempt::Mismatch
            },
            |frame| Attempt::Frame(len, frame),
        )
}

fn decode_request(unit_id: UnitId, pdu: &[u8]) -> Result<DecodedFrame> {
    let request = Request::try_from(pdu)?;
    Ok(DecodedFrame::Request { unit_id, request })
}

fn decode_response(unit_id: UnitId, pdu: &[u8]) -> Result<DecodedFrame> {
    let response = Response::try_from(pdu)?;
    Ok(DecodedFrame::Response { unit_id, response })
}

fn decode_exception(unit_id: UnitId, pdu: &[u8]) -> Result<DecodedFrame> {
    let exception = ExceptionResponse::try_from(pdu)?;
    Ok(DecodedFrame::Exception { unit_id, exception })
}
