//! The streaming driver around [`crate::parser::parse_frame`]: owns a
//! growing buffer, repeatedly extracts complete frames, and implements the
//! byte-level resynchronization policy on malformed input.
//!
//! Callers that read bytes off a socket or file in arbitrary-sized chunks
//! feed each chunk to [`StreamParser::feed`] and drain completed frames
//! with [`StreamParser::next_frame`] or [`StreamParser::drain_frames`].
//! Malformed input never aborts the stream: the parser discards the
//! offending bytes and keeps scanning for the next frame boundary, so one
//! corrupted frame costs exactly one malformed-frame count, not the rest
//! of the connection.
//!
//! # Examples
//!
//! ```
//! use respb_protocol::StreamParser;
//!
//! let mut parser = StreamParser::new();
//! parser.feed(b"*1\r\n$4\r\nPING\r\n*1\r\n$4\r\nQUIT\r\n");
//! assert_eq!(parser.frames_available(), 2);
//! assert_eq!(parser.next_frame().unwrap().verb(), "PING");
//! ```

use std::collections::VecDeque;

use bytes::BytesMut;

use crate::command::CommandRecord;
use crate::parser::{parse_frame, Outcome};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const INITIAL_FRAME_QUEUE_CAPACITY: usize = 4;

/// Buffers TP bytes, extracts complete frames, and resynchronizes past
/// malformed input by scanning forward for the next `'*'` sentinel.
pub struct StreamParser {
    buffer: BytesMut,
    frames: VecDeque<CommandRecord>,
    malformed_count: usize,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            frames: VecDeque::with_capacity(INITIAL_FRAME_QUEUE_CAPACITY),
            malformed_count: 0,
        }
    }

    /// Append `bytes` to the internal buffer and extract every complete
    /// frame now available.
    ///
    /// `bytes` may be an arbitrary chunk boundary — a single byte, a whole
    /// file, or anything in between — since the underlying buffer persists
    /// across calls. Newly completed frames are queued for
    /// [`StreamParser::next_frame`]; malformed input is silently
    /// resynchronized past, not surfaced as an error.
    ///
    /// # Arguments
    ///
    /// * `bytes` - the next chunk of TP bytes read from the wire.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        self.drain_ready_frames();
    }

    /// Repeatedly parse frames off the front of the buffer until it holds
    /// only an incomplete prefix, queuing each [`Ready`](Outcome::Ready)
    /// frame and resynchronizing past each
    /// [`Malformed`](Outcome::Malformed) one.
    fn drain_ready_frames(&mut self) {
        loop {
            match parse_frame(&self.buffer) {
                Outcome::Ready { record, consumed } => {
                    self.frames.push_back(record);
                    let _ = self.buffer.split_to(consumed);
                }
                Outcome::NeedMore => break,
                Outcome::Malformed { at_offset } => {
                    self.malformed_count += 1;
                    self.resynchronize(at_offset);
                }
            }
        }
    }

    /// Recover from a malformed frame by discarding bytes until the next
    /// plausible frame start.
    ///
    /// The policy is deliberately conservative: advance one byte past
    /// `at_offset` (so a corrupted leading `'*'` itself is skipped), then
    /// discard everything up to, but not including, the next `'*'` byte.
    /// This never skips over a frame that might still be valid, at the
    /// cost of occasionally treating a `'*'` inside binary argument data
    /// as a frame boundary — a tradeoff the format accepts since frame
    /// starts are always expected at known offsets in well-formed input.
    ///
    /// # Arguments
    ///
    /// * `at_offset` - the offset [`parse_frame`] reported as the first
    ///   byte it could not make sense of.
    fn resynchronize(&mut self, at_offset: usize) {
        let scan_from = (at_offset + 1).min(self.buffer.len());
        match self.buffer[scan_from..].iter().position(|&b| b == b'*') {
            Some(rel) => {
                let _ = self.buffer.split_to(scan_from + rel);
            }
            None => self.buffer.clear(),
        }
    }

    /// Pop the next completed frame, if any.
    pub fn next_frame(&mut self) -> Option<CommandRecord> {
        self.frames.pop_front()
    }

    #[must_use]
    pub fn frames_available(&self) -> usize {
        self.frames.len()
    }

    /// Number of malformed frames observed since construction (or the last
    /// [`StreamParser::clear`]).
    #[must_use]
    pub fn malformed_count(&self) -> usize {
        self.malformed_count
    }

    /// Whether the internal buffer holds unconsumed bytes that never
    /// became `Ready` (used by the converter to detect incomplete-at-EOF).
    #[must_use]
    pub fn has_pending_bytes(&self) -> bool {
        !self.buffer.is_empty()
    }

    #[must_use]
    pub fn pending_byte_count(&self) -> usize {
        self.buffer.len()
    }

    /// Discard all buffered bytes and queued frames; resets the malformed
    /// counter.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.frames.clear();
        self.malformed_count = 0;
    }

    /// Drain every currently queued frame as an [`ExactSizeIterator`],
    /// useful for converting a full batch at once instead of polling
    /// [`StreamParser::next_frame`] in a `while let` loop.
    ///
    /// # Returns
    ///
    /// An iterator yielding frames in the order they completed, emptying
    /// the internal queue as it is consumed (frames left undrained remain
    /// queued for a later call).
    pub fn drain_frames(&mut self) -> DrainFrames<'_> {
        DrainFrames { inner: &mut self.frames }
    }
}

/// Iterator returned by [`StreamParser::drain_frames`], yielding queued
/// frames in completion order.
pub struct DrainFrames<'a> {
    inner: &'a mut VecDeque<CommandRecord>,
}

impl Iterator for DrainFrames<'_> {
    type Item = CommandRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.len(), Some(self.inner.len()))
    }
}

impl ExactSizeIterator for DrainFrames<'_> {}
