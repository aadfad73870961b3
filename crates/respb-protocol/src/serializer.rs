//! The BP (binary protocol) serializer: per-verb schema dispatch producing
//! a binary frame from a [`CommandRecord`].
//!
//! Every BP frame begins with a 4-byte header (`u16` opcode, `u16` mux id,
//! both big-endian) produced by [`encode_header`], followed by a
//! verb-family-specific payload. Which family a verb uses, and which
//! opcode it gets, comes from [`respb_core::classify`] — this module only
//! knows how to lay out bytes once that answer is known, never how to
//! derive it.
//!
//! # Examples
//!
//! ```
//! use respb_protocol::{serialize, CommandRecord};
//!
//! let record = CommandRecord::new(b"GET", vec![b"mykey".to_vec()]);
//! let frame = serialize(&record, 0).unwrap();
//! assert_eq!(frame, b"\x00\x00\x00\x00\x00\x05mykey");
//! ```

use respb_core::{classify, set_flags, Error, Family, Result, VerbKind, WITHSCORES_FLAG};

use crate::command::CommandRecord;
use crate::module;
use crate::passthrough;

/// Serialize `record` to its BP frame, routing through the module
/// dispatcher or the passthrough envelope as the opcode registry dictates.
///
/// # Arguments
///
/// * `record` - the parsed command to encode.
/// * `mux_id` - the multiplexing id stamped into the frame header, letting
///   a caller demultiplex replies on a shared connection.
///
/// # Errors
///
/// Returns [`Error::ArityMismatch`] if `record` has fewer arguments than
/// its family requires, [`Error::IntegerParse`]/[`Error::FloatParse`] if a
/// numeric field does not parse, or [`Error::PrefixOverflow`] if an
/// argument is too large for its length-prefix width. Unrecognized verbs
/// never error — they fall through to [`passthrough::encode`].
pub fn serialize(record: &CommandRecord, mux_id: u16) -> Result<Vec<u8>> {
    match classify(record.verb()) {
        VerbKind::Module { sub_opcode } => module::serialize(record, mux_id, sub_opcode),
        VerbKind::Core { opcode, family } => serialize_core(record, mux_id, opcode, family),
        VerbKind::Unknown => Ok(passthrough::encode(record, mux_id)),
    }
}

/// Build the fixed 4-byte BP header: big-endian `opcode` then `mux_id`.
pub(crate) fn encode_header(opcode: u16, mux_id: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(4);
    out.extend_from_slice(&opcode.to_be_bytes());
    out.extend_from_slice(&mux_id.to_be_bytes());
    out
}

/// Encode `data` with a 2-byte big-endian length prefix (the `str2` slot
/// used for keys, members, and other short fields).
///
/// # Errors
///
/// Returns [`Error::PrefixOverflow`] if `data` is longer than
/// [`u16::MAX`] bytes — a 2-byte prefix cannot address it.
pub(crate) fn encode_str2(verb: &str, data: &[u8]) -> Result<Vec<u8>> {
    let len: u16 = data.len().try_into().map_err(|_| Error::PrefixOverflow {
        verb: verb.to_string(),
        len: data.len(),
        limit: 16,
    })?;
    let mut out = Vec::with_capacity(2 + data.len());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(data);
    Ok(out)
}

/// Encode `data` with a 4-byte big-endian length prefix (the `str4` slot
/// used for values, which may be arbitrarily large).
///
/// # Errors
///
/// Returns [`Error::PrefixOverflow`] if `data` is longer than
/// [`u32::MAX`] bytes.
pub(crate) fn encode_str4(verb: &str, data: &[u8]) -> Result<Vec<u8>> {
    let len: u32 = data.len().try_into().map_err(|_| Error::PrefixOverflow {
        verb: verb.to_string(),
        len: data.len(),
        limit: 32,
    })?;
    let mut out = Vec::with_capacity(4 + data.len());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(data);
    Ok(out)
}

/// Parse `raw` as a base-10 signed 64-bit integer TP argument.
///
/// # Errors
///
/// Returns [`Error::IntegerParse`] if `raw` is not valid UTF-8 or does not
/// parse as an `i64`.
pub(crate) fn parse_i64(verb: &str, raw: &[u8]) -> Result<i64> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| Error::IntegerParse {
            verb: verb.to_string(),
            value: raw.to_vec(),
        })
}

/// Parse `raw` as a base-10 unsigned 16-bit integer TP argument (used for
/// counts and database indices that the registry never expects to exceed
/// `u16::MAX`).
///
/// # Errors
///
/// Returns [`Error::IntegerParse`] if `raw` is not valid UTF-8 or does not
/// parse as a `u16`.
pub(crate) fn parse_u16(verb: &str, raw: &[u8]) -> Result<u16> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| Error::IntegerParse {
            verb: verb.to_string(),
            value: raw.to_vec(),
        })
}

/// Parse `raw` as an IEEE-754 double TP argument.
///
/// Accepts the case-insensitive literals `"inf"`/`"+inf"`, `"-inf"`, and
/// `"nan"` in addition to ordinary decimal notation, matching the
/// sentinel values sorted-set scores are allowed to carry.
///
/// # Errors
///
/// Returns [`Error::FloatParse`] if `raw` is not valid UTF-8 or does not
/// parse as an `f64`.
pub(crate) fn parse_f64(verb: &str, raw: &[u8]) -> Result<f64> {
    let s = std::str::from_utf8(raw).map_err(|_| Error::FloatParse {
        verb: verb.to_string(),
        value: raw.to_vec(),
    })?;
    match s.to_ascii_lowercase().as_str() {
        "inf" | "+inf" => return Ok(f64::INFINITY),
        "-inf" => return Ok(f64::NEG_INFINITY),
        "nan" => return Ok(f64::NAN),
        _ => {}
    }
    s.parse::<f64>().map_err(|_| Error::FloatParse {
        verb: verb.to_string(),
        value: raw.to_vec(),
    })
}

/// Reject `record` if it has fewer than `expected` arguments.
///
/// # Errors
///
/// Returns [`Error::ArityMismatch`] naming `record`'s verb and the
/// expected-vs-actual argument counts.
fn require_arity(record: &CommandRecord, expected: usize) -> Result<()> {
    if record.args().len() < expected {
        return Err(Error::ArityMismatch {
            verb: record.verb().to_string(),
            expected,
            got: record.args().len(),
        });
    }
    Ok(())
}

/// Encode a core (non-module) verb's payload per its [`Family`], appended
/// to a freshly built header.
///
/// `SET` is special-cased out to [`serialize_set`] since its NX/XX/EX/PX
/// flag handling doesn't fit the uniform per-family shape every other
/// verb follows.
///
/// # Errors
///
/// See [`serialize`] — the same error set applies, scoped to this verb's
/// family layout.
fn serialize_core(record: &CommandRecord, mux_id: u16, opcode: u16, family: Family) -> Result<Vec<u8>> {
    let verb = record.verb();
    let mut frame = encode_header(opcode, mux_id);

    match family {
        Family::SingleKey => {
            if let Some(arg) = record.arg(0) {
                frame.extend(encode_str2(verb, arg)?);
            }
        }
        Family::PingLike => {
            if let Some(arg) = record.arg(0) {
                frame.extend(encode_str2(verb, arg)?);
            }
        }
        Family::KeyValue => {
            require_arity(record, 2)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            frame.extend(encode_str4(verb, record.arg(1).unwrap())?);
        }
        Family::SetCommand => return serialize_set(record, mux_id, opcode),
        Family::KeyI64 => {
            require_arity(record, 2)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            frame.extend(parse_i64(verb, record.arg(1).unwrap())?.to_be_bytes());
        }
        Family::MultiKey => {
            let n: u16 = record.args().len().try_into().map_err(|_| Error::PrefixOverflow {
                verb: verb.to_string(),
                len: record.args().len(),
                limit: 16,
            })?;
            frame.extend_from_slice(&n.to_be_bytes());
            for arg in record.args() {
                frame.extend(encode_str2(verb, arg)?);
            }
        }
        Family::KvPairs => {
            let pairs = record.args().len() / 2;
            let n: u16 = pairs.try_into().map_err(|_| Error::PrefixOverflow {
                verb: verb.to_string(),
                len: pairs,
                limit: 16,
            })?;
            frame.extend_from_slice(&n.to_be_bytes());
            let mut i = 0;
            while i + 1 < record.args().len() {
                frame.extend(encode_str2(verb, record.arg(i).unwrap())?);
                frame.extend(encode_str4(verb, record.arg(i + 1).unwrap())?);
                i += 2;
            }
        }
        Family::KeyElements => {
            require_arity(record, 2)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            let rest = &record.args()[1..];
            let n: u16 = rest.len().try_into().map_err(|_| Error::PrefixOverflow {
                verb: verb.to_string(),
                len: rest.len(),
                limit: 16,
            })?;
            frame.extend_from_slice(&n.to_be_bytes());
            for arg in rest {
                frame.extend(encode_str2(verb, arg)?);
            }
        }
        Family::KeyCountOpt => {
            require_arity(record, 1)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            if let Some(count_arg) = record.arg(1) {
                frame.extend_from_slice(&parse_u16(verb, count_arg)?.to_be_bytes());
            }
        }
        Family::KeyRange => {
            require_arity(record, 3)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            frame.extend(parse_i64(verb, record.arg(1).unwrap())?.to_be_bytes());
            frame.extend(parse_i64(verb, record.arg(2).unwrap())?.to_be_bytes());
        }
        Family::KeyRangeFlags => {
            require_arity(record, 3)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            frame.extend(parse_i64(verb, record.arg(1).unwrap())?.to_be_bytes());
            frame.extend(parse_i64(verb, record.arg(2).unwrap())?.to_be_bytes());
            let flags = match record.arg(3) {
                Some(opt) if opt.eq_ignore_ascii_case(b"WITHSCORES") => WITHSCORES_FLAG,
                _ => 0x00,
            };
            frame.push(flags);
        }
        Family::SortedSetAdd => {
            require_arity(record, 3)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            frame.push(0x00); // flags reserved, see open-question decision
            let rest = &record.args()[1..];
            let pairs = rest.len() / 2;
            let n: u16 = pairs.try_into().map_err(|_| Error::PrefixOverflow {
                verb: verb.to_string(),
                len: pairs,
                limit: 16,
            })?;
            frame.extend_from_slice(&n.to_be_bytes());
            let mut i = 0;
            while i + 1 < rest.len() {
                let score = parse_f64(verb, &rest[i])?;
                frame.extend(score.to_be_bytes());
                frame.extend(encode_str2(verb, &rest[i + 1])?);
                i += 2;
            }
        }
        Family::KeyMember => {
            require_arity(record, 2)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            frame.extend(encode_str2(verb, record.arg(1).unwrap())?);
        }
        Family::KeyMemberFlag => {
            require_arity(record, 2)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            frame.extend(encode_str2(verb, record.arg(1).unwrap())?);
            frame.push(0x00); // withscore flag, reserved
        }
        Family::HashSet => {
            require_arity(record, 3)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            let rest = &record.args()[1..];
            let pairs = rest.len() / 2;
            let n: u16 = pairs.try_into().map_err(|_| Error::PrefixOverflow {
                verb: verb.to_string(),
                len: pairs,
                limit: 16,
            })?;
            frame.extend_from_slice(&n.to_be_bytes());
            let mut i = 0;
            while i + 1 < rest.len() {
                frame.extend(encode_str2(verb, &rest[i])?);
                frame.extend(encode_str4(verb, &rest[i + 1])?);
                i += 2;
            }
        }
        Family::Publish => {
            require_arity(record, 2)?;
            frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
            frame.extend(encode_str4(verb, record.arg(1).unwrap())?);
        }
        Family::Subscribe => {
            let n: u16 = record.args().len().try_into().map_err(|_| Error::PrefixOverflow {
                verb: verb.to_string(),
                len: record.args().len(),
                limit: 16,
            })?;
            frame.extend_from_slice(&n.to_be_bytes());
            for arg in record.args() {
                frame.extend(encode_str2(verb, arg)?);
            }
        }
        Family::Select => {
            require_arity(record, 1)?;
            frame.extend_from_slice(&parse_u16(verb, record.arg(0).unwrap())?.to_be_bytes());
        }
    }

    Ok(frame)
}

/// Encode `SET`'s payload: key, value, then a flags byte and an 8-byte
/// expiry, derived from any trailing `NX`/`XX`/`EX <seconds>`/
/// `PX <millis>` options.
///
/// If both `EX` and `PX` are given, whichever appears later in the
/// argument list wins — its bit is set and the other's is cleared — and
/// its value becomes the encoded expiry.
///
/// # Errors
///
/// Returns [`Error::ArityMismatch`] if fewer than the key and value are
/// given, or [`Error::IntegerParse`] if an `EX`/`PX` value doesn't parse.
fn serialize_set(record: &CommandRecord, mux_id: u16, opcode: u16) -> Result<Vec<u8>> {
    let verb = record.verb();
    require_arity(record, 2)?;
    let mut frame = encode_header(opcode, mux_id);
    frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
    frame.extend(encode_str4(verb, record.arg(1).unwrap())?);

    let mut flags: u8 = 0x00;
    let mut expiry: i64 = 0;
    let mut i = 2;
    while i < record.args().len() {
        let opt = record.arg(i).unwrap();
        if opt.eq_ignore_ascii_case(b"NX") {
            flags |= set_flags::NX;
        } else if opt.eq_ignore_ascii_case(b"XX") {
            flags |= set_flags::XX;
        } else if opt.eq_ignore_ascii_case(b"EX") && i + 1 < record.args().len() {
            flags |= set_flags::EX;
            flags &= !set_flags::PX;
            expiry = parse_i64(verb, record.arg(i + 1).unwrap())?;
            i += 1;
        } else if opt.eq_ignore_ascii_case(b"PX") && i + 1 < record.args().len() {
            flags |= set_flags::PX;
            flags &= !set_flags::EX;
            expiry = parse_i64(verb, record.arg(i + 1).unwrap())?;
            i += 1;
        }
        i += 1;
    }

    frame.push(flags);
    frame.extend(expiry.to_be_bytes());
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_get() {
        let record = CommandRecord::new(b"GET", vec![b"mykey".to_vec()]);
        let frame = serialize(&record, 0).unwrap();
        assert_eq!(frame, b"\x00\x00\x00\x00\x00\x05mykey");
    }

    #[test]
    fn s2_set_no_flags() {
        let record = CommandRecord::new(b"SET", vec![b"foo".to_vec(), b"hello".to_vec()]);
        let frame = serialize(&record, 0).unwrap();
        let mut expected = vec![0x00, 0x01, 0x00, 0x00];
        expected.extend(b"\x00\x03foo");
        expected.extend(b"\x00\x00\x00\x05hello");
        expected.push(0x00);
        expected.extend(0i64.to_be_bytes());
        assert_eq!(frame, expected);
        assert_eq!(frame.len(), 27);
    }

    #[test]
    fn s3_set_with_ex() {
        let record = CommandRecord::new(
            b"SET",
            vec![b"k".to_vec(), b"v".to_vec(), b"EX".to_vec(), b"60".to_vec()],
        );
        let frame = serialize(&record, 0).unwrap();
        assert_eq!(frame.len(), 23);
        assert_eq!(&frame[0..4], &[0x00, 0x01, 0x00, 0x00]);
        assert_eq!(&frame[4..6], &[0x00, 0x01]);
        assert_eq!(&frame[6..7], b"k");
        assert_eq!(&frame[7..11], &[0x00, 0x00, 0x00, 0x01]);
        assert_eq!(&frame[11..12], b"v");
        assert_eq!(frame[12], 0x04);
        assert_eq!(&frame[13..21], &60i64.to_be_bytes());
    }

    #[test]
    fn s4_mget() {
        let record = CommandRecord::new(
            b"MGET",
            vec![b"k1".to_vec(), b"k2".to_vec(), b"k3".to_vec()],
        );
        let frame = serialize(&record, 0).unwrap();
        assert_eq!(frame.len(), 18);
        assert_eq!(&frame[0..4], &[0x00, 0x0C, 0x00, 0x00]);
        assert_eq!(&frame[4..6], &[0x00, 0x03]);
    }

    #[test]
    fn s5_publish() {
        let record = CommandRecord::new(b"PUBLISH", vec![b"news".to_vec(), b"hello".to_vec()]);
        let frame = serialize(&record, 0).unwrap();
        assert_eq!(frame.len(), 19);
        assert_eq!(&frame[0..4], &[0x02, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn set_nx_ex_flags_combine() {
        let record = CommandRecord::new(
            b"SET",
            vec![
                b"key".to_vec(),
                b"value".to_vec(),
                b"NX".to_vec(),
                b"EX".to_vec(),
                b"60".to_vec(),
            ],
        );
        let frame = serialize(&record, 0).unwrap();
        let flags_offset = 4 + 2 + 3 + 4 + 5;
        assert_eq!(frame[flags_offset], 0x05);
    }

    #[test]
    fn set_later_expiry_flag_wins() {
        let record = CommandRecord::new(
            b"SET",
            vec![
                b"key".to_vec(),
                b"value".to_vec(),
                b"EX".to_vec(),
                b"10".to_vec(),
                b"PX".to_vec(),
                b"500".to_vec(),
            ],
        );
        let frame = serialize(&record, 0).unwrap();
        let flags_offset = 4 + 2 + 3 + 4 + 5;
        assert_eq!(frame[flags_offset], 0x09);
        let expiry_offset = flags_offset + 1;
        let expiry = i64::from_be_bytes(frame[expiry_offset..expiry_offset + 8].try_into().unwrap());
        assert_eq!(expiry, 500);
    }

    #[test]
    fn arity_mismatch_on_short_set() {
        let record = CommandRecord::new(b"SET", vec![b"onlykey".to_vec()]);
        assert!(matches!(
            serialize(&record, 0),
            Err(Error::ArityMismatch { .. })
        ));
    }

    #[test]
    fn integer_min_max_round_trip() {
        let record = CommandRecord::new(
            b"INCRBY",
            vec![b"k".to_vec(), i64::MAX.to_string().into_bytes()],
        );
        let frame = serialize(&record, 0).unwrap();
        let tail = &frame[frame.len() - 8..];
        assert_eq!(i64::from_be_bytes(tail.try_into().unwrap()), i64::MAX);

        let record = CommandRecord::new(
            b"INCRBY",
            vec![b"k".to_vec(), i64::MIN.to_string().into_bytes()],
        );
        let frame = serialize(&record, 0).unwrap();
        let tail = &frame[frame.len() - 8..];
        assert_eq!(i64::from_be_bytes(tail.try_into().unwrap()), i64::MIN);
    }

    #[test]
    fn prefix_overflow_on_oversized_str2_slot() {
        let oversized = vec![0u8; u16::MAX as usize + 1];
        let record = CommandRecord::new(b"GET", vec![oversized]);
        assert!(matches!(
            serialize(&record, 0),
            Err(Error::PrefixOverflow { .. })
        ));
    }

    #[test]
    fn unknown_verb_routes_to_passthrough() {
        let record = CommandRecord::new(b"UNKNOWN", vec![b"arg".to_vec()]);
        let frame = serialize(&record, 0).unwrap();
        assert_eq!(&frame[0..2], &[0xFF, 0xFF]);
    }

    #[test]
    fn serialization_is_deterministic() {
        let record = CommandRecord::new(b"ZADD", vec![b"z".to_vec(), b"1.5".to_vec(), b"m".to_vec()]);
        assert_eq!(serialize(&record, 7).unwrap(), serialize(&record, 7).unwrap());
    }
}
