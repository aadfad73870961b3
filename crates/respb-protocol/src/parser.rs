//! The TP (textual protocol) frame parser.
//!
//! A frame is `'*' <count> CRLF ( '$' <len> CRLF <len bytes> CRLF ){count}`
//! — a RESP-style array of bulk strings. `parse_frame` is a pure function
//! over a byte slice: it never retains state between calls and never
//! allocates beyond the [`CommandRecord`] it produces. The streaming,
//! resynchronizing driver that owns a growing buffer across multiple reads
//! lives in [`crate::stream_parser`].
//!
//! # Grammar
//!
//! ```text
//! frame      := '*' count CRLF bulk-string{count}
//! bulk-string:= '$' len CRLF bytes{len} CRLF
//!             | '$' '-1' CRLF          ; nil
//! ```
//!
//! `count` must be a positive integer; a frame with `count <= 0` is
//! malformed. A nil bulk string (`len == -1`) is only legal for
//! non-verb elements — a nil verb (the first element) is malformed,
//! but a nil later argument decodes to an empty byte string.
//!
//! # Examples
//!
//! ```
//! use respb_protocol::{parse_frame, Outcome};
//!
//! let buf = b"*2\r\n$3\r\nGET\r\n$5\r\nmykey\r\n";
//! match parse_frame(buf) {
//!     Outcome::Ready { record, consumed } => {
//!         assert_eq!(consumed, buf.len());
//!         assert_eq!(record.verb(), "GET");
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

use crate::command::CommandRecord;

const STAR: u8 = b'*';
const DOLLAR: u8 = b'$';
const CRLF: &[u8] = b"\r\n";

/// Outcome of attempting to parse one frame starting at the front of a
/// buffer.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A complete frame was parsed; `consumed` is the number of bytes of
    /// `buf` it occupied.
    Ready { record: CommandRecord, consumed: usize },
    /// `buf` holds a valid but incomplete frame prefix; the caller should
    /// append more bytes and retry.
    NeedMore,
    /// The bytes at or before `at_offset` cannot form a valid frame. The
    /// caller is expected to resynchronize by scanning forward for the
    /// next `'*'` byte; the parser itself never skips bytes on its own.
    Malformed { at_offset: usize },
}

/// Attempt to parse exactly one frame from the front of `buf`.
///
/// Only the prefix of `buf` needed to determine the outcome is inspected;
/// trailing bytes beyond a `Ready` frame's `consumed` count are left
/// untouched for the caller to resubmit on the next call.
///
/// # Arguments
///
/// * `buf` - the candidate frame, and possibly more data after it.
///
/// # Returns
///
/// * [`Outcome::Ready`] with the parsed record and the byte count it
///   occupied, if `buf` starts with one complete, well-formed frame.
/// * [`Outcome::NeedMore`] if every byte seen so far is consistent with a
///   valid frame prefix, but the frame is not yet complete.
/// * [`Outcome::Malformed`] if `buf` can never become a valid frame
///   starting at byte `0`, naming the offset the corruption was detected
///   at.
#[must_use]
pub fn parse_frame(buf: &[u8]) -> Outcome {
    if buf.is_empty() {
        return Outcome::NeedMore;
    }
    if buf[0] != STAR {
        return Outcome::Malformed { at_offset: 0 };
    }

    let Some(count_end) = find_crlf(buf, 1) else {
        return Outcome::NeedMore;
    };
    let count_str = &buf[1..count_end];
    let Ok(count) = std::str::from_utf8(count_str).unwrap_or("").parse::<i64>() else {
        return Outcome::Malformed { at_offset: count_end };
    };
    if count <= 0 {
        return Outcome::Malformed { at_offset: count_end };
    }
    let count = count as usize;

    let mut pos = count_end + CRLF.len();
    let mut elements: Vec<Vec<u8>> = Vec::with_capacity(count);

    for i in 0..count {
        match parse_bulk_string(buf, pos) {
            BulkOutcome::Value { bytes, next } => {
                elements.push(bytes);
                pos = next;
            }
            BulkOutcome::Nil { next } => {
                if i == 0 {
                    return Outcome::Malformed { at_offset: pos };
                }
                elements.push(Vec::new());
                pos = next;
            }
            BulkOutcome::NeedMore => return Outcome::NeedMore,
            BulkOutcome::Malformed { at_offset } => return Outcome::Malformed { at_offset },
        }
    }

    let verb = elements.remove(0);
    let record = CommandRecord::new(verb, elements);
    Outcome::Ready { record, consumed: pos }
}

/// Outcome of parsing one `$`-prefixed bulk string element starting at a
/// given position, mirroring [`Outcome`] one level down the grammar.
enum BulkOutcome {
    /// A complete, non-nil bulk string; `next` is the offset just past its
    /// trailing CRLF.
    Value { bytes: Vec<u8>, next: usize },
    /// A nil bulk string (`$-1\r\n`); `next` is the offset just past it.
    Nil { next: usize },
    NeedMore,
    Malformed { at_offset: usize },
}

/// Parse one `$<len>\r\n<bytes>\r\n` (or `$-1\r\n` nil) element at `pos`.
///
/// # Arguments
///
/// * `buf` - the full frame buffer.
/// * `pos` - the offset of the leading `$` to parse from.
fn parse_bulk_string(buf: &[u8], pos: usize) -> BulkOutcome {
    if pos >= buf.len() {
        return BulkOutcome::NeedMore;
    }
    if buf[pos] != DOLLAR {
        return BulkOutcome::Malformed { at_offset: pos };
    }
    let len_start = pos + 1;
    let Some(len_end) = find_crlf(buf, len_start) else {
        return BulkOutcome::NeedMore;
    };
    let Ok(len_str) = std::str::from_utf8(&buf[len_start..len_end]) else {
        return BulkOutcome::Malformed { at_offset: len_end };
    };
    let Ok(len) = len_str.parse::<i64>() else {
        return BulkOutcome::Malformed { at_offset: len_end };
    };

    let data_start = len_end + CRLF.len();
    if len == -1 {
        return BulkOutcome::Nil { next: data_start };
    }
    if len < -1 {
        return BulkOutcome::Malformed { at_offset: len_end };
    }
    let len = len as usize;
    let data_end = data_start + len;
    let trailer_end = data_end + CRLF.len();
    if buf.len() < trailer_end {
        return BulkOutcome::NeedMore;
    }
    if &buf[data_end..trailer_end] != CRLF {
        return BulkOutcome::Malformed { at_offset: data_end };
    }
    BulkOutcome::Value {
        bytes: buf[data_start..data_end].to_vec(),
        next: trailer_end,
    }
}

/// Find the offset of the next `\r\n` at or after `from`, returning the
/// offset of the `\r` byte. Returns `None` if no CRLF is present yet,
/// which the caller treats as "need more bytes", not malformed.
fn find_crlf(buf: &[u8], from: usize) -> Option<usize> {
    if from > buf.len() {
        return None;
    }
    buf[from..]
        .windows(2)
        .position(|w| w == CRLF)
        .map(|p| from + p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_get() {
        let buf = b"*2\r\n$3\r\nGET\r\n$5\r\nmykey\r\n";
        match parse_frame(buf) {
            Outcome::Ready { record, consumed } => {
                assert_eq!(consumed, buf.len());
                assert_eq!(record.verb(), "GET");
                assert_eq!(record.arg(0), Some(b"mykey".as_slice()));
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn need_more_on_truncated_header() {
        assert_eq!(parse_frame(b"*2\r\n$3\r\nGET"), Outcome::NeedMore);
        assert_eq!(parse_frame(b""), Outcome::NeedMore);
        assert_eq!(parse_frame(b"*2\r\n"), Outcome::NeedMore);
    }

    #[test]
    fn malformed_without_leading_star() {
        assert_eq!(parse_frame(b"GET mykey"), Outcome::Malformed { at_offset: 0 });
    }

    #[test]
    fn zero_count_is_malformed() {
        match parse_frame(b"*0\r\n") {
            Outcome::Malformed { .. } => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn negative_count_is_malformed() {
        match parse_frame(b"*-1\r\n") {
            Outcome::Malformed { .. } => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn nil_first_element_is_malformed() {
        match parse_frame(b"*1\r\n$-1\r\n") {
            Outcome::Malformed { .. } => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn nil_later_element_becomes_empty_string() {
        let buf = b"*2\r\n$3\r\nGET\r\n$-1\r\n";
        match parse_frame(buf) {
            Outcome::Ready { record, consumed } => {
                assert_eq!(consumed, buf.len());
                assert_eq!(record.arg(0), Some(b"".as_slice()));
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn zero_length_argument_is_valid() {
        let buf = b"*2\r\n$3\r\nGET\r\n$0\r\n\r\n";
        match parse_frame(buf) {
            Outcome::Ready { record, consumed } => {
                assert_eq!(consumed, buf.len());
                assert_eq!(record.arg(0), Some(b"".as_slice()));
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn missing_trailer_crlf_is_malformed() {
        match parse_frame(b"*1\r\n$3\r\nGETxx") {
            Outcome::Malformed { .. } => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn incomplete_payload_is_need_more() {
        assert_eq!(parse_frame(b"*1\r\n$5\r\nGET"), Outcome::NeedMore);
    }

    #[test]
    fn round_trip_exact_byte_count() {
        let buf = b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$5\r\nhello\r\n";
        let first = match parse_frame(buf) {
            Outcome::Ready { record, consumed } => {
                assert_eq!(consumed, buf.len());
                record
            }
            other => panic!("expected Ready, got {other:?}"),
        };
        let second = match parse_frame(&buf[..first.to_tp_bytes().len()]) {
            Outcome::Ready { record, .. } => record,
            other => panic!("expected Ready, got {other:?}"),
        };
        assert_eq!(first, second);
    }
}
