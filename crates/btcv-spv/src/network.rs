//! Network collaborator and the server response types it returns.

use std::sync::Arc;

use async_trait::async_trait;
use btcv_primitives::chainhash::Hash;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::chain::HeaderChain;
use crate::error::SpvError;

/// A Merkle branch as returned by `blockchain.transaction.get_merkle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Height the server claims the transaction was mined at.
    pub block_height: u32,
    /// Sibling hashes, leaf level first, display hex.
    #[serde(rename = "merkle")]
    pub merkle_branch: Vec<String>,
    /// Index of the transaction in the block.
    #[serde(rename = "pos")]
    pub leaf_pos_in_tree: i64,
}

/// The part of a verbose transaction lookup the verifier needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerboseTransaction {
    pub txid: Hash,
    /// Block the server says the transaction is in.
    pub blockhash: Hash,
}

/// The part of a verbose block lookup the verifier needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerboseBlock {
    pub hash: Hash,
    pub height: u32,
    /// Transaction ids in block order.
    pub tx: Vec<Hash>,
}

/// Server session used by the verifier.
///
/// Calls may fail at any time; return `SpvError::Network` and the verifier
/// asks its owner to drop the session.
#[async_trait]
pub trait SpvNetwork: Send + Sync + 'static {
    /// The chain the network layer currently follows.
    fn blockchain(&self) -> Arc<dyn HeaderChain>;

    /// Held for writing while headers are synced or a reorg is applied.
    fn header_lock(&self) -> &RwLock<()>;

    async fn get_merkle_for_transaction(
        &self,
        tx_hash: &Hash,
        height: u32,
    ) -> Result<MerkleProof, SpvError>;

    async fn get_transaction(&self, tx_hash: &Hash) -> Result<VerboseTransaction, SpvError>;

    async fn get_block(&self, block_hash: &Hash) -> Result<VerboseBlock, SpvError>;

    /// Ask for the checkpoint chunk covering `height` to be downloaded.
    async fn request_chunk(&self, height: u32) -> Result<(), SpvError>;
}
