//! The passthrough envelope: wraps verbatim TP bytes for a verb absent
//! from both the core and module opcode tables.

use respb_core::PASSTHROUGH_OPCODE;

use crate::command::CommandRecord;
use crate::parser::{parse_frame, Outcome};

/// Encode `record` as `u16(0xFFFF) u16(mux_id) u32(resp_len) <resp_bytes>`,
/// where `resp_bytes` is the canonical TP re-encoding of `record`.
#[must_use]
pub fn encode(record: &CommandRecord, mux_id: u16) -> Vec<u8> {
    let resp_bytes = record.to_tp_bytes();
    let mut out = Vec::with_capacity(8 + resp_bytes.len());
    out.extend_from_slice(&PASSTHROUGH_OPCODE.to_be_bytes());
    out.extend_from_slice(&mux_id.to_be_bytes());
    out.extend_from_slice(&(resp_bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(&resp_bytes);
    out
}

/// Decode a passthrough frame back into its `(mux_id, CommandRecord)`.
/// Returns `None` if `buf` does not start with the passthrough opcode, is
/// too short for its declared length, or the embedded TP bytes do not
/// parse as a complete frame.
#[must_use]
pub fn decode(buf: &[u8]) -> Option<(u16, CommandRecord)> {
    if buf.len() < 8 {
        return None;
    }
    let opcode = u16::from_be_bytes([buf[0], buf[1]]);
    if opcode != PASSTHROUGH_OPCODE {
        return None;
    }
    let mux_id = u16::from_be_bytes([buf[2], buf[3]]);
    let resp_len = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
    let body = buf.get(8..8 + resp_len)?;
    match parse_frame(body) {
        Outcome::Ready { record, consumed } if consumed == body.len() => Some((mux_id, record)),
        _ => None,
    }
}
