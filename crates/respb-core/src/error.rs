use thiserror::Error;

/// Errors produced anywhere in the codec: TP parsing, BP serialization, and
/// the streaming converter's driver loop.
#[derive(Error, Debug)]
pub enum Error {
    #[error("verb {verb} requires at least {expected} argument(s), got {got}")]
    ArityMismatch {
        verb: String,
        expected: usize,
        got: usize,
    },

    #[error("failed to parse integer field for {verb}: {value:?}")]
    IntegerParse { verb: String, value: Vec<u8> },

    #[error("failed to parse float field for {verb}: {value:?}")]
    FloatParse { verb: String, value: Vec<u8> },

    #[error("argument for {verb} is {len} bytes, exceeds {limit}-bit length prefix")]
    PrefixOverflow { verb: String, len: usize, limit: u8 },

    #[error("buffered frame size {size} exceeds max_frame_size {max_size}")]
    FrameTooLarge { size: usize, max_size: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
