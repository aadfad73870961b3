//! An async `tokio_util` [`Decoder`]/[`Encoder`] pair wrapping the TP
//! parser and BP serializer, for callers embedding the codec directly in a
//! `tokio` I/O pipeline (e.g. `Framed<TcpStream, FrameCodec>`) rather than
//! driving it through the file-oriented [`crate::converter::Converter`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//! use respb_protocol::FrameCodec;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = TcpStream::connect("127.0.0.1:6380").await?;
//! let mut framed = Framed::new(stream, FrameCodec::new());
//!
//! while let Some(result) = framed.next().await {
//!     match result {
//!         Ok(record) => println!("received: {}", record.verb()),
//!         Err(err) => eprintln!("decode error: {err}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use bytes::{Buf, BufMut, BytesMut};
use respb_core::Error;
use tokio_util::codec::{Decoder, Encoder};

use crate::command::CommandRecord;
use crate::parser::{parse_frame, Outcome};
use crate::serializer;

const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Codec decoding TP frames into [`CommandRecord`]s and encoding
/// `(CommandRecord, mux_id)` pairs into BP frames.
///
/// Wraps the same [`parse_frame`]/[`serializer::serialize`] functions the
/// file-oriented [`crate::converter::Converter`] uses, so behavior is
/// identical whether frames arrive over a socket via `Framed` or from a
/// file via the converter. Malformed TP input is resynchronized past
/// exactly like [`crate::stream_parser::StreamParser`] does; it is never
/// surfaced as a decode error.
pub struct FrameCodec {
    max_frame_size: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec {
    /// Create a codec with the default 64 KiB maximum frame size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Override the maximum buffered frame size before `decode` reports
    /// [`Error::FrameTooLarge`].
    ///
    /// # Arguments
    ///
    /// * `max_frame_size` - the new ceiling, in bytes, on how much
    ///   unconsumed buffer `decode` will accumulate while waiting for a
    ///   frame to complete.
    #[must_use]
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }
}

impl Decoder for FrameCodec {
    type Item = CommandRecord;
    type Error = Error;

    /// Attempt to decode one complete [`CommandRecord`] from `src`.
    ///
    /// Loops internally past any number of malformed frames, so a single
    /// call can both resynchronize past corrupted bytes and return the
    /// next good frame. `src` is only advanced past bytes that were either
    /// consumed into a returned record or discarded as malformed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameTooLarge`] if `src` grows past
    /// `max_frame_size` bytes while still waiting for a frame to
    /// complete — a guard against unbounded buffering from a peer that
    /// never sends the rest of a frame.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match parse_frame(src) {
                Outcome::Ready { record, consumed } => {
                    src.advance(consumed);
                    return Ok(Some(record));
                }
                Outcome::NeedMore => {
                    if src.len() > self.max_frame_size {
                        return Err(Error::FrameTooLarge {
                            size: src.len(),
                            max_size: self.max_frame_size,
                        });
                    }
                    return Ok(None);
                }
                Outcome::Malformed { at_offset } => {
                    let scan_from = (at_offset + 1).min(src.len());
                    match src[scan_from..].iter().position(|&b| b == b'*') {
                        Some(rel) => src.advance(scan_from + rel),
                        None => src.advance(src.len()),
                    }
                }
            }
        }
    }
}

impl Encoder<(CommandRecord, u16)> for FrameCodec {
    type Error = Error;

    /// Serialize `record` to its BP frame and append it to `dst`.
    ///
    /// # Arguments
    ///
    /// * `record` - the parsed command to encode.
    /// * `mux_id` - the multiplexing id stamped into the BP frame header.
    ///
    /// # Errors
    ///
    /// Propagates any [`serializer::serialize`] error — arity mismatches,
    /// unparseable integer/float fields, or an argument too large for its
    /// length-prefix width.
    fn encode(
        &mut self,
        (record, mux_id): (CommandRecord, u16),
        dst: &mut BytesMut,
    ) -> Result<(), Self::Error> {
        let bytes = serializer::serialize(&record, mux_id)?;
        dst.reserve(bytes.len());
        dst.put_slice(&bytes);
        Ok(())
    }
}
