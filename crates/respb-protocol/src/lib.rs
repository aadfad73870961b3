pub mod codec;
pub mod command;
pub mod comparator;
pub mod converter;
pub mod module;
pub mod parser;
pub mod passthrough;
pub mod serializer;
pub mod stream_parser;

pub use codec::FrameCodec;
pub use command::CommandRecord;
pub use comparator::{compare, Measurement};
pub use converter::{Converter, Tally};
pub use parser::{parse_frame, Outcome};
pub use serializer::serialize;
pub use stream_parser::{DrainFrames, StreamParser};
