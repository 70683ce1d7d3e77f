use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the verifier obtains inclusion evidence for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofSource {
    /// Fetch a Merkle branch and recompute the header's Merkle root.
    #[default]
    MerkleBranch,
    /// Look the transaction up, then look up its block and find the txid in
    /// the block's transaction list.
    BlockLookup,
}

/// Configuration for [`SpvVerifier`](crate::SpvVerifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpvConfig {
    /// Delay between polls of the wallet's unverified transactions.
    pub poll_interval_ms: u64,
    /// Accept transactions whose proof fails. Debugging only.
    pub skip_merkle_check: bool,
    /// Heights below this are in the checkpoint region, where headers are
    /// downloaded in chunks on demand.
    pub max_checkpoint: u32,
    pub proof_source: ProofSource,
}

impl SpvConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SpvConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            skip_merkle_check: false,
            max_checkpoint: 0,
            proof_source: ProofSource::MerkleBranch,
        }
    }
}
