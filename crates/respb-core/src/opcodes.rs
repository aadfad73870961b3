//! The opcode registry: an immutable mapping from verb name to 16-bit
//! core opcode or 32-bit module sub-opcode, plus the family each core verb
//! belongs to for payload-schema dispatch.
//!
//! Construction is data-driven from the static schedule below; there is no
//! runtime mutation and no lazy population. Lookup is a plain `match` over
//! `&str`, which the compiler lowers to a jump table / string-length
//! dispatch — no hashing, no locking, safe to call from any number of
//! threads concurrently.

/// Reserved opcode signaling an 8-byte extended header carrying a module
/// sub-opcode.
pub const MODULE_OPCODE: u16 = 0xF000;

/// Reserved opcode signaling a passthrough envelope wrapping verbatim TP
/// bytes for an unrecognized verb.
pub const PASSTHROUGH_OPCODE: u16 = 0xFFFF;

pub const JSON_MODULE_ID: u32 = 0x0000;
pub const BF_MODULE_ID: u32 = 0x0001;
pub const FT_MODULE_ID: u32 = 0x0002;

/// Bit flags for the `SET` family's flags byte.
pub mod set_flags {
    pub const NX: u8 = 0x01;
    pub const XX: u8 = 0x02;
    pub const EX: u8 = 0x04;
    pub const PX: u8 = 0x08;
}

/// Bit flags for `JSON.SET`'s flags byte.
pub mod json_set_flags {
    pub const NX: u8 = 0x01;
    pub const XX: u8 = 0x02;
}

/// Bit flag for `ZRANGE`/`ZREVRANGE`'s flags byte.
pub const WITHSCORES_FLAG: u8 = 0x01;

/// The BP payload schema a core verb's arguments are encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    SingleKey,
    KeyValue,
    SetCommand,
    KeyI64,
    MultiKey,
    KvPairs,
    KeyElements,
    KeyCountOpt,
    KeyRange,
    KeyRangeFlags,
    SortedSetAdd,
    KeyMember,
    KeyMemberFlag,
    HashSet,
    Publish,
    Subscribe,
    PingLike,
    Select,
}

/// Result of classifying a canonicalized (uppercase) verb against the
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbKind {
    Core { opcode: u16, family: Family },
    Module { sub_opcode: u32 },
    Unknown,
}

/// Classify a verb, already uppercased, into its registry entry.
///
/// A module-shaped verb (`NS.VERB`) whose namespace is not one of the
/// recognized module IDs is reported `Unknown`, not `Module` — unknown
/// namespaces fall through to the passthrough envelope.
#[must_use]
pub fn classify(verb: &str) -> VerbKind {
    if let Some(sub_opcode) = module_sub_opcode(verb) {
        return VerbKind::Module { sub_opcode };
    }
    if let Some(opcode) = core_opcode(verb) {
        let family = family_for_verb(verb).expect("every core opcode has an assigned family");
        return VerbKind::Core { opcode, family };
    }
    VerbKind::Unknown
}

/// Core verb → 16-bit opcode, densely assigned by command family. Values
/// are taken verbatim from the source schedule and must never change.
#[must_use]
pub fn core_opcode(verb: &str) -> Option<u16> {
    let opcode = match verb {
        // String ops 0x0000-0x003F
        "GET" => 0x0000,
        "SET" => 0x0001,
        "APPEND" => 0x0002,
        "DECR" => 0x0003,
        "DECRBY" => 0x0004,
        "GETDEL" => 0x0005,
        "GETEX" => 0x0006,
        "GETRANGE" => 0x0007,
        "GETSET" => 0x0008,
        "INCR" => 0x0009,
        "INCRBY" => 0x000A,
        "INCRBYFLOAT" => 0x000B,
        "MGET" => 0x000C,
        "MSET" => 0x000D,
        "MSETNX" => 0x000E,
        "PSETEX" => 0x000F,
        "SETEX" => 0x0010,
        "SETNX" => 0x0011,
        "SETRANGE" => 0x0012,
        "STRLEN" => 0x0013,
        "SUBSTR" => 0x0014,
        "LCS" => 0x0015,
        "DELIFEQ" => 0x0016,
        // List ops 0x0040-0x007F
        "LPUSH" => 0x0040,
        "RPUSH" => 0x0041,
        "LPOP" => 0x0042,
        "RPOP" => 0x0043,
        "LLEN" => 0x0044,
        "LRANGE" => 0x0045,
        "LINDEX" => 0x0046,
        "LSET" => 0x0047,
        "LREM" => 0x0048,
        "LTRIM" => 0x0049,
        "LINSERT" => 0x004A,
        "LPUSHX" => 0x004B,
        "RPUSHX" => 0x004C,
        "RPOPLPUSH" => 0x004D,
        "LMOVE" => 0x004E,
        "LMPOP" => 0x004F,
        "LPOS" => 0x0050,
        "BLPOP" => 0x0051,
        "BRPOP" => 0x0052,
        "BRPOPLPUSH" => 0x0053,
        "BLMOVE" => 0x0054,
        "BLMPOP" => 0x0055,
        // Set ops 0x0080-0x00BF
        "SADD" => 0x0080,
        "SREM" => 0x0081,
        "SMEMBERS" => 0x0082,
        "SISMEMBER" => 0x0083,
        "SCARD" => 0x0084,
        "SPOP" => 0x0085,
        "SRANDMEMBER" => 0x0086,
        "SINTER" => 0x0087,
        "SINTERSTORE" => 0x0088,
        "SUNION" => 0x0089,
        "SUNIONSTORE" => 0x008A,
        "SDIFF" => 0x008B,
        "SDIFFSTORE" => 0x008C,
        "SMOVE" => 0x008D,
        "SSCAN" => 0x008E,
        "SINTERCARD" => 0x008F,
        "SMISMEMBER" => 0x0090,
        // Sorted set ops 0x00C0-0x00FF
        "ZADD" => 0x00C0,
        "ZREM" => 0x00C1,
        "ZCARD" => 0x00C2,
        "ZCOUNT" => 0x00C3,
        "ZINCRBY" => 0x00C4,
        "ZRANGE" => 0x00C5,
        "ZRANGEBYSCORE" => 0x00C6,
        "ZRANGEBYLEX" => 0x00C7,
        "ZREVRANGE" => 0x00C8,
        "ZREVRANGEBYSCORE" => 0x00C9,
        "ZREVRANGEBYLEX" => 0x00CA,
        "ZRANK" => 0x00CB,
        "ZREVRANK" => 0x00CC,
        "ZSCORE" => 0x00CD,
        "ZMSCORE" => 0x00CE,
        "ZREMRANGEBYRANK" => 0x00CF,
        "ZREMRANGEBYSCORE" => 0x00D0,
        "ZREMRANGEBYLEX" => 0x00D1,
        "ZLEXCOUNT" => 0x00D2,
        "ZPOPMIN" => 0x00D3,
        "ZPOPMAX" => 0x00D4,
        "BZPOPMIN" => 0x00D5,
        "BZPOPMAX" => 0x00D6,
        "ZRANDMEMBER" => 0x00D7,
        "ZDIFF" => 0x00D8,
        "ZDIFFSTORE" => 0x00D9,
        "ZINTER" => 0x00DA,
        "ZINTERSTORE" => 0x00DB,
        "ZINTERCARD" => 0x00DC,
        "ZUNION" => 0x00DD,
        "ZUNIONSTORE" => 0x00DE,
        "ZSCAN" => 0x00DF,
        "ZMPOP" => 0x00E0,
        "BZMPOP" => 0x00E1,
        "ZRANGESTORE" => 0x00E2,
        // Hash ops 0x0100-0x013F
        "HSET" => 0x0100,
        "HGET" => 0x0101,
        "HMSET" => 0x0102,
        "HMGET" => 0x0103,
        "HGETALL" => 0x0104,
        "HDEL" => 0x0105,
        "HEXISTS" => 0x0106,
        "HINCRBY" => 0x0107,
        "HINCRBYFLOAT" => 0x0108,
        "HKEYS" => 0x0109,
        "HVALS" => 0x010A,
        "HLEN" => 0x010B,
        "HSETNX" => 0x010C,
        "HSTRLEN" => 0x010D,
        "HSCAN" => 0x010E,
        "HRANDFIELD" => 0x010F,
        // Bitmap ops 0x0140-0x015F
        "SETBIT" => 0x0140,
        "GETBIT" => 0x0141,
        "BITCOUNT" => 0x0142,
        "BITPOS" => 0x0143,
        "BITOP" => 0x0144,
        "BITFIELD" => 0x0145,
        "BITFIELD_RO" => 0x0146,
        // HyperLogLog 0x0160-0x017F
        "PFADD" => 0x0160,
        "PFCOUNT" => 0x0161,
        "PFMERGE" => 0x0162,
        // Pub/Sub 0x0200-0x023F
        "PUBLISH" => 0x0200,
        "SUBSCRIBE" => 0x0201,
        "UNSUBSCRIBE" => 0x0202,
        // Transaction 0x0240-0x025F
        "MULTI" => 0x0240,
        "EXEC" => 0x0241,
        "DISCARD" => 0x0242,
        "WATCH" => 0x0243,
        "UNWATCH" => 0x0244,
        // Generic-key 0x02C0-0x02FF
        "DEL" => 0x02C0,
        "UNLINK" => 0x02C1,
        "EXISTS" => 0x02C2,
        "EXPIRE" => 0x02C3,
        "EXPIREAT" => 0x02C4,
        "TTL" => 0x02C9,
        "PTTL" => 0x02CA,
        "PERSIST" => 0x02CB,
        "KEYS" => 0x02CC,
        "SCAN" => 0x02CD,
        "RANDOMKEY" => 0x02CE,
        "RENAME" => 0x02CF,
        "RENAMENX" => 0x02D0,
        "TYPE" => 0x02D1,
        // Connection 0x0300-0x033F
        "PING" => 0x0300,
        "ECHO" => 0x0301,
        "AUTH" => 0x0302,
        "SELECT" => 0x0303,
        "QUIT" => 0x0304,
        // Server 0x03C0-0x04FF
        "DBSIZE" => 0x03C0,
        "FLUSHDB" => 0x03C1,
        "FLUSHALL" => 0x03C2,
        "SAVE" => 0x03C3,
        "BGSAVE" => 0x03C4,
        "INFO" => 0x03C8,
        "CONFIG" => 0x03C9,
        "TIME" => 0x03CB,
        _ => return None,
    };
    Some(opcode)
}

/// Family assignment for each verb `core_opcode` recognizes. The generic
/// `single-key` family covers every verb that takes at most one key and no
/// other structured argument.
#[must_use]
pub fn family_for_verb(verb: &str) -> Option<Family> {
    use Family::*;
    let family = match verb {
        "GET" | "STRLEN" | "TYPE" | "TTL" | "PTTL" | "PERSIST" | "INCR" | "DECR" | "GETDEL"
        | "LLEN" | "SCARD" | "ZCARD" | "HGETALL" | "HKEYS" | "HVALS" | "HLEN" | "RANDOMKEY"
        | "SMEMBERS" | "DBSIZE" | "QUIT" | "MULTI" | "EXEC" | "DISCARD" | "UNWATCH" | "TIME"
        | "SAVE" | "BGSAVE" | "ECHO" => SingleKey,
        "PING" => PingLike,
        "APPEND" | "GETSET" | "SETNX" => KeyValue,
        "SET" => SetCommand,
        "INCRBY" | "DECRBY" | "EXPIRE" | "EXPIREAT" => KeyI64,
        "MGET" | "DEL" | "UNLINK" | "EXISTS" | "KEYS" => MultiKey,
        "MSET" | "MSETNX" => KvPairs,
        "LPUSH" | "RPUSH" | "LPUSHX" | "RPUSHX" | "SADD" | "HDEL" => KeyElements,
        "LPOP" | "RPOP" => KeyCountOpt,
        "LRANGE" => KeyRange,
        "SISMEMBER" | "HGET" | "ZSCORE" => KeyMember,
        "ZADD" => SortedSetAdd,
        "ZRANK" | "ZREVRANK" => KeyMemberFlag,
        "ZRANGE" | "ZREVRANGE" => KeyRangeFlags,
        "HSET" => HashSet,
        "PUBLISH" => Publish,
        "SUBSCRIBE" | "UNSUBSCRIBE" => Subscribe,
        "SELECT" => Select,
        _ => return None,
    };
    Some(family)
}

/// Module verb → 32-bit sub-opcode, `(module_id << 16) | command_id`.
#[must_use]
pub fn module_sub_opcode(verb: &str) -> Option<u32> {
    let sub = match verb {
        "JSON.SET" => 0x00000000,
        "JSON.GET" => 0x00000001,
        "JSON.MGET" => 0x00000002,
        "JSON.MSET" => 0x00000003,
        "JSON.DEL" => 0x00000004,
        "JSON.FORGET" => 0x00000005,
        "JSON.TYPE" => 0x00000006,
        "JSON.CLEAR" => 0x00000007,
        "JSON.ARRAPPEND" => 0x00000008,
        "JSON.ARRINDEX" => 0x00000009,
        "JSON.ARRINSERT" => 0x0000000A,
        "JSON.ARRLEN" => 0x0000000B,
        "JSON.ARRPOP" => 0x0000000C,
        "JSON.ARRTRIM" => 0x0000000D,
        "JSON.OBJKEYS" => 0x0000000E,
        "JSON.OBJLEN" => 0x0000000F,
        "JSON.STRLEN" => 0x00000010,
        "JSON.STRAPPEND" => 0x00000011,
        "JSON.NUMINCRBY" => 0x00000012,
        "JSON.NUMMULTBY" => 0x00000013,
        "JSON.TOGGLE" => 0x00000014,
        "JSON.DEBUG" => 0x00000015,
        "JSON.RESP" => 0x00000016,
        "BF.ADD" => 0x00010000,
        "BF.MADD" => 0x00010001,
        "BF.EXISTS" => 0x00010002,
        "BF.MEXISTS" => 0x00010003,
        "BF.RESERVE" => 0x00010004,
        "BF.INSERT" => 0x00010005,
        "BF.CARD" => 0x00010006,
        "BF.INFO" => 0x00010007,
        "BF.LOAD" => 0x00010008,
        "FT.CREATE" => 0x00020000,
        "FT.SEARCH" => 0x00020001,
        "FT.DROPINDEX" => 0x00020002,
        "FT.INFO" => 0x00020003,
        "FT._LIST" => 0x00020004,
        _ => return None,
    };
    Some(sub)
}
