//! The module dispatcher: verbs of the shape `NS.VERB` where `NS` is a
//! registered module namespace route through an 8-byte extended header
//! carrying a 32-bit sub-opcode.

use respb_core::{json_set_flags, Error, Result, MODULE_OPCODE};

use crate::command::CommandRecord;
use crate::serializer::{encode_str2, encode_str4};

/// Serialize a module verb's payload, given its already-resolved
/// `sub_opcode` from the registry.
pub fn serialize(record: &CommandRecord, mux_id: u16, sub_opcode: u32) -> Result<Vec<u8>> {
    let verb = record.verb();
    let mut frame = Vec::with_capacity(8);
    frame.extend_from_slice(&MODULE_OPCODE.to_be_bytes());
    frame.extend_from_slice(&mux_id.to_be_bytes());
    frame.extend_from_slice(&sub_opcode.to_be_bytes());

    match verb {
        "JSON.SET" => {
            if record.args().len() >= 3 {
                frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
                frame.extend(encode_str2(verb, record.arg(1).unwrap())?);
                frame.extend(encode_str4(verb, record.arg(2).unwrap())?);
                let mut flags = 0x00;
                for opt in &record.args()[3..] {
                    if opt.eq_ignore_ascii_case(b"NX") {
                        flags |= json_set_flags::NX;
                    } else if opt.eq_ignore_ascii_case(b"XX") {
                        flags |= json_set_flags::XX;
                    }
                }
                frame.push(flags);
            }
        }
        "JSON.GET" => {
            if let Some(key) = record.arg(0) {
                frame.extend(encode_str2(verb, key)?);
                let paths = &record.args()[1..];
                let n: u16 = paths.len().try_into().map_err(|_| Error::PrefixOverflow {
                    verb: verb.to_string(),
                    len: paths.len(),
                    limit: 16,
                })?;
                frame.extend_from_slice(&n.to_be_bytes());
                for path in paths {
                    frame.extend(encode_str2(verb, path)?);
                }
            }
        }
        "JSON.DEL" => {
            if let Some(key) = record.arg(0) {
                frame.extend(encode_str2(verb, key)?);
                if let Some(path) = record.arg(1) {
                    frame.extend(encode_str2(verb, path)?);
                }
            }
        }
        "BF.ADD" | "BF.EXISTS" => {
            if record.args().len() >= 2 {
                frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
                frame.extend(encode_str2(verb, record.arg(1).unwrap())?);
            }
        }
        "BF.MADD" => {
            if let Some(key) = record.arg(0) {
                frame.extend(encode_str2(verb, key)?);
                let items = &record.args()[1..];
                let n: u16 = items.len().try_into().map_err(|_| Error::PrefixOverflow {
                    verb: verb.to_string(),
                    len: items.len(),
                    limit: 16,
                })?;
                frame.extend_from_slice(&n.to_be_bytes());
                for item in items {
                    frame.extend(encode_str2(verb, item)?);
                }
            }
        }
        "FT.SEARCH" => {
            if record.args().len() >= 2 {
                frame.extend(encode_str2(verb, record.arg(0).unwrap())?);
                frame.extend(encode_str2(verb, record.arg(1).unwrap())?);
            }
        }
        "FT.INFO" => {
            if let Some(index) = record.arg(0) {
                frame.extend(encode_str2(verb, index)?);
            }
        }
        _ => {
            for arg in record.args() {
                frame.extend(encode_str2(verb, arg)?);
            }
        }
    }

    Ok(frame)
}
