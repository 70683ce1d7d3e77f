#![deny(missing_docs)]

//! Bitcoin Vault SDK - Complete SDK.
//!
//! Re-exports the vault SDK components for convenient single-crate usage:
//! hashing and encoding primitives, scripts and the alert/instant/recovery
//! script generators, transaction parsing with vault type tags, and the SPV
//! verifier.

pub use btcv_primitives as primitives;
pub use btcv_script as script;
pub use btcv_transaction as transaction;
pub use btcv_spv as spv;
