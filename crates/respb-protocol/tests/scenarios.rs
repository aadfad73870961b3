//! Literal end-to-end TP-to-BP scenarios, byte-exact.

use respb_protocol::{parse_frame, serialize, Outcome};

fn parse_one(tp: &[u8]) -> respb_protocol::CommandRecord {
    match parse_frame(tp) {
        Outcome::Ready { record, consumed } => {
            assert_eq!(consumed, tp.len(), "parser did not consume the whole frame");
            record
        }
        other => panic!("expected Ready, got {other:?}"),
    }
}

#[test]
fn s1_get() {
    let record = parse_one(b"*2\r\n$3\r\nGET\r\n$5\r\nmykey\r\n");
    let bp = serialize(&record, 0).unwrap();
    assert_eq!(bp, b"\x00\x00\x00\x00\x00\x05mykey");
}

#[test]
fn s2_set_foo_hello() {
    let record = parse_one(b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$5\r\nhello\r\n");
    let bp = serialize(&record, 0).unwrap();
    assert_eq!(bp.len(), 27);
    assert_eq!(&bp[0..4], &[0x00, 0x01, 0x00, 0x00]);
}

#[test]
fn s3_set_with_ex() {
    let record = parse_one(b"*5\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n$2\r\nEX\r\n$2\r\n60\r\n");
    let bp = serialize(&record, 0).unwrap();
    assert_eq!(bp.len(), 23);
}

#[test]
fn s4_mget() {
    let record = parse_one(b"*4\r\n$4\r\nMGET\r\n$2\r\nk1\r\n$2\r\nk2\r\n$2\r\nk3\r\n");
    let bp = serialize(&record, 0).unwrap();
    assert_eq!(bp.len(), 18);
}

#[test]
fn s5_publish() {
    let record = parse_one(b"*3\r\n$7\r\nPUBLISH\r\n$4\r\nnews\r\n$5\r\nhello\r\n");
    let bp = serialize(&record, 0).unwrap();
    assert_eq!(bp.len(), 19);
}

#[test]
fn s6_json_set() {
    let record = parse_one(b"*4\r\n$8\r\nJSON.SET\r\n$2\r\nk1\r\n$5\r\n$.foo\r\n$3\r\n\"x\"\r\n");
    let bp = serialize(&record, 0).unwrap();
    assert_eq!(bp.len(), 25);
    assert_eq!(&bp[0..4], &[0xF0, 0x00, 0x00, 0x00]);
}

#[test]
fn s7_unknown_verb_passthrough() {
    let record = parse_one(b"*2\r\n$7\r\nUNKNOWN\r\n$3\r\narg\r\n");
    let bp = serialize(&record, 0).unwrap();
    assert_eq!(bp.len(), 36);
    assert_eq!(&bp[0..4], &[0xFF, 0xFF, 0x00, 0x00]);
}
