/// Bitcoin Vault SDK - Script encoding, addresses and vault script generation.
///
/// Provides the Bitcoin Script type, opcode definitions, script chunk parsing,
/// P2SH address generation, and the multi-key generators that build redeem
/// scripts and script-sigs for the alert / instant / recovery spending paths.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod address;
pub mod multikey;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use address::{Address, Network};
pub use chunk::ScriptChunk;
pub use multikey::{
    MultiKeyScriptGenerator, SpendingPolicy, CompressedPublicKey, TwoKeys, ThreeKeys,
    TwoKeysScriptGenerator, TwoKeysHWScriptGenerator,
    ThreeKeysScriptGenerator, ThreeKeysHWScriptGenerator,
};
