//! Bitcoin Vault SDK - SPV verification.
//!
//! Proves that wallet transactions are included in blocks of the locally
//! validated header chain, either by recomputing a Merkle branch served by
//! an untrusted server or by looking the transaction up in the block. The
//! verifier runs as a long-lived tokio task and talks to its collaborators
//! through the [`HeaderChain`], [`SpvNetwork`] and [`SpvWallet`] traits.

pub mod error;
pub mod header;
pub mod chain;
pub mod merkle;
pub mod network;
pub mod wallet;
pub mod config;
pub mod verifier;

pub use error::{MerkleVerificationFailure, SpvError};
pub use header::BlockHeader;
pub use chain::HeaderChain;
pub use merkle::{hash_merkle_root, merkle_tree_parent};
pub use network::{MerkleProof, SpvNetwork, VerboseBlock, VerboseTransaction};
pub use wallet::{SpvWallet, TxMinedInfo, UnverifiedTx};
pub use config::{ProofSource, SpvConfig};
pub use verifier::SpvVerifier;
