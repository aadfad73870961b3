pub mod error;
pub mod opcodes;

pub use error::{Error, Result};
pub use opcodes::{classify, core_opcode, family_for_verb, module_sub_opcode, Family, VerbKind};
pub use opcodes::{
    json_set_flags, set_flags, BF_MODULE_ID, FT_MODULE_ID, JSON_MODULE_ID, MODULE_OPCODE,
    PASSTHROUGH_OPCODE, WITHSCORES_FLAG,
};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
