/// Bitcoin Vault SDK - Hashing, chain hashes and binary encoding.
///
/// This crate provides the foundational building blocks shared by the
/// script, transaction and SPV crates:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
/// - Chain hash type for transaction, block and Merkle node identification
/// - Variable-length integer encoding with a cursor reader and writer
/// - Base58Check encoding for addresses

pub mod hash;
pub mod chainhash;
pub mod util;
pub mod base58;

mod error;
pub use error::PrimitivesError;
