use btcv_primitives::chainhash::Hash;

/// Reasons a transaction could not be proven to be in its block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MerkleVerificationFailure {
    /// The proof itself is unusable: bad hex, negative position, a branch
    /// item that is not 32 bytes, or a position too large for the branch.
    #[error("malformed merkle proof: {0}")]
    Malformed(String),
    /// The local chain has no header at the claimed height (yet).
    #[error("tx verification failed for {tx_hash} (missing header {height})")]
    MissingBlockHeader { tx_hash: Hash, height: u32 },
    #[error("merkle root mismatch for {tx_hash}: header has {expected}, proof gives {computed}")]
    MerkleRootMismatch {
        tx_hash: Hash,
        expected: Hash,
        computed: Hash,
    },
    /// An intermediate node of the branch deserializes as a transaction,
    /// which is the signature of a forged 64-byte-transaction proof.
    #[error("inner node of SPV proof is a valid transaction")]
    InnerNodeOfSpvProofIsValidTx,
    #[error("tx {tx_hash} is not in block at height {height}")]
    TxNotInBlock { tx_hash: Hash, height: u32 },
}

impl MerkleVerificationFailure {
    /// Failures that clear up once header sync catches up.
    pub fn is_transient(&self) -> bool {
        matches!(self, MerkleVerificationFailure::MissingBlockHeader { .. })
    }
}

/// Error types for the SPV verifier and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum SpvError {
    /// The server served a proof that does not verify. The owner should
    /// drop the session and restart verification against another server.
    #[error("graceful disconnect: {0}")]
    GracefulDisconnect(#[from] MerkleVerificationFailure),
    /// A network collaborator failed to answer. Retried on the next poll.
    #[error("network error: {0}")]
    Network(String),
    /// A verification subtask panicked or was cancelled.
    #[error("verification task failed: {0}")]
    Task(String),
    #[error("invalid block header: {0}")]
    InvalidHeader(String),
    #[error("primitives error: {0}")]
    Primitives(#[from] btcv_primitives::PrimitivesError),
}

impl SpvError {
    /// Errors that leave the transaction unverified for a later retry
    /// instead of ending the job.
    pub fn is_transient(&self) -> bool {
        match self {
            SpvError::GracefulDisconnect(failure) => failure.is_transient(),
            SpvError::Network(_) => true,
            _ => false,
        }
    }
}
