//! Wallet collaborator.

use std::collections::HashMap;

use btcv_primitives::chainhash::Hash;
use btcv_transaction::TxType;
use serde::{Deserialize, Serialize};

use crate::chain::HeaderChain;

/// A wallet transaction waiting for an inclusion proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnverifiedTx {
    /// Claimed block height; zero or negative while in the mempool.
    pub height: i64,
    #[serde(default)]
    pub tx_type: TxType,
}

impl UnverifiedTx {
    pub fn new(height: i64) -> Self {
        UnverifiedTx {
            height,
            tx_type: TxType::NonVault,
        }
    }

    pub fn with_type(height: i64, tx_type: TxType) -> Self {
        UnverifiedTx { height, tx_type }
    }
}

/// Where and when a verified transaction was mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxMinedInfo {
    pub height: u32,
    pub timestamp: u32,
    /// Index in the block; `None` when the proof check was skipped.
    pub txpos: Option<u64>,
    pub header_hash: Hash,
    pub tx_type: TxType,
}

/// Wallet storage the verifier reads work from and reports results to.
pub trait SpvWallet: Send + Sync + 'static {
    /// Name used to tag this wallet's log lines.
    fn diagnostic_name(&self) -> String;

    fn get_unverified_txs(&self) -> HashMap<Hash, UnverifiedTx>;

    /// Record a proven transaction. It should stop being reported by
    /// `get_unverified_txs`.
    fn add_verified_tx(&self, tx_hash: &Hash, info: TxMinedInfo);

    /// Forget verifications above `above_height` after a switch to `chain`,
    /// returning the affected txids.
    fn undo_verifications(&self, chain: &dyn HeaderChain, above_height: u32) -> Vec<Hash>;
}
