//! Background SPV verification job.
//!
//! The verifier polls the wallet for unverified transactions, fetches
//! inclusion evidence for each one from the server, and checks it against
//! the header the local chain holds at the claimed height. Each txid moves
//! through Unverified -> RequestPending -> Verified, or Failed, in which
//! case the whole job stops and the owner is expected to drop the server
//! session. A request that fails on the network or on a missing header
//! goes back to Unverified and is retried on the next poll.
//!
//! Proof requests run as tasks in a `JoinSet` owned by the verifier. Their
//! results are applied by the loop itself, so the verification state needs
//! no lock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use btcv_primitives::chainhash::Hash;
use btcv_transaction::TxType;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument, Span};

use crate::chain::HeaderChain;
use crate::config::{ProofSource, SpvConfig};
use crate::error::{MerkleVerificationFailure, SpvError};
use crate::header::BlockHeader;
use crate::merkle::hash_merkle_root;
use crate::network::SpvNetwork;
use crate::wallet::{SpvWallet, TxMinedInfo};

#[derive(Debug, Clone, Copy)]
struct VerifiedRoot {
    merkle_root: Hash,
    height: u32,
}

/// Evidence returned by a successful proof subtask.
#[derive(Debug)]
struct Proven {
    height: u32,
    /// Header snapshot the proof was checked against.
    header: BlockHeader,
    txpos: Option<u64>,
    tx_type: TxType,
}

#[derive(Debug)]
enum TaskOutcome {
    Proof {
        tx_hash: Hash,
        result: Result<Proven, SpvError>,
    },
    Chunk {
        height: u32,
        result: Result<(), SpvError>,
    },
}

/// Simple payment verification job for one wallet on one server session.
pub struct SpvVerifier<N: SpvNetwork, W: SpvWallet> {
    network: Arc<N>,
    wallet: Arc<W>,
    config: SpvConfig,
    span: Span,
    /// Chain seen on the previous poll, to detect fork switches.
    blockchain: Option<Arc<dyn HeaderChain>>,
    merkle_roots: HashMap<Hash, VerifiedRoot>,
    requested_merkle: HashSet<Hash>,
    requested_chunks: HashSet<u32>,
    tasks: JoinSet<TaskOutcome>,
}

impl<N: SpvNetwork, W: SpvWallet> SpvVerifier<N, W> {
    /// Create a verifier for `wallet`.
    ///
    /// # Arguments
    /// * `network` - Source of headers and proofs for the current session.
    /// * `wallet` - Owner of the unverified and verified transaction sets.
    /// * `config` - Poll interval, proof source and checkpoint settings.
    ///
    /// # Returns
    /// An idle verifier; nothing is requested until `poll_once` or `run`.
    pub fn new(network: Arc<N>, wallet: Arc<W>, config: SpvConfig) -> Self {
        let span = info_span!("spv", wallet = %wallet.diagnostic_name());
        SpvVerifier {
            network,
            wallet,
            config,
            span,
            blockchain: None,
            merkle_roots: HashMap::new(),
            requested_merkle: HashSet::new(),
            requested_chunks: HashSet::new(),
            tasks: JoinSet::new(),
        }
    }

    /// The settings this verifier was created with.
    pub fn config(&self) -> &SpvConfig {
        &self.config
    }

    /// Run until a server serves a proof that does not verify.
    ///
    /// Each cycle undoes verifications invalidated by a fork switch,
    /// requests proofs for newly confirmed transactions, then applies
    /// finished proofs until the poll interval has elapsed. Returns
    /// `SpvError::GracefulDisconnect` when the server served a bad proof.
    pub async fn run(&mut self) -> Result<(), SpvError> {
        let span = self.span.clone();
        self.run_loop().instrument(span).await
    }

    async fn run_loop(&mut self) -> Result<(), SpvError> {
        info!("starting SPV verifier");
        self.blockchain = Some(self.network.blockchain());
        loop {
            self.poll_once();
            let deadline = Instant::now() + self.config.poll_interval();
            self.collect_until(deadline).await?;
        }
    }

    /// One poll without waiting: undo stale verifications, then request
    /// proofs. Must be called from within a tokio runtime.
    pub fn poll_once(&mut self) {
        let _entered = self.span.clone().entered();
        self.maybe_undo_verifications();
        self.request_proofs();
    }

    /// Wait for every in-flight request and apply its result.
    pub async fn join_pending(&mut self) -> Result<(), SpvError> {
        while let Some(joined) = self.tasks.join_next().await {
            self.handle_joined(joined)?;
        }
        Ok(())
    }

    async fn collect_until(&mut self, deadline: Instant) -> Result<(), SpvError> {
        loop {
            match tokio::time::timeout_at(deadline, self.tasks.join_next()).await {
                Ok(Some(joined)) => self.handle_joined(joined)?,
                Ok(None) => {
                    tokio::time::sleep_until(deadline).await;
                    return Ok(());
                }
                Err(_elapsed) => return Ok(()),
            }
        }
    }

    fn request_proofs(&mut self) {
        let chain = self.network.blockchain();
        let local_height = chain.height();
        let unverified = self.wallet.get_unverified_txs();

        for (tx_hash, utx) in unverified {
            if self.requested_merkle.contains(&tx_hash) || self.merkle_roots.contains_key(&tx_hash) {
                continue;
            }
            // mempool, or above what the local chain has synced
            let height = match u32::try_from(utx.height) {
                Ok(h) if h > 0 && h <= local_height => h,
                _ => continue,
            };

            let Some(header) = chain.read_header(height) else {
                if height < self.config.max_checkpoint && self.requested_chunks.insert(height) {
                    debug!(height, "requesting header chunk");
                    let network = Arc::clone(&self.network);
                    self.tasks.spawn(
                        async move {
                            let result = network.request_chunk(height).await;
                            TaskOutcome::Chunk { height, result }
                        }
                        .instrument(self.span.clone()),
                    );
                }
                continue;
            };

            if utx.tx_type.is_pending_alert() {
                self.mark_as_verified(tx_hash, height, &header, utx.tx_type);
                continue;
            }

            info!(%tx_hash, height, "requested merkle");
            self.requested_merkle.insert(tx_hash);
            let network = Arc::clone(&self.network);
            let config = self.config.clone();
            self.tasks.spawn(
                request_and_verify_single_proof(network, config, tx_hash, height, utx.tx_type)
                    .instrument(self.span.clone()),
            );
        }
    }

    /// Alerts can still be reverted by the recovery key, so they are
    /// recorded against the local header without a proof.
    fn mark_as_verified(&mut self, tx_hash: Hash, height: u32, header: &BlockHeader, tx_type: TxType) {
        info!(%tx_hash, %tx_type, "verified without merkle proof");
        let info = TxMinedInfo {
            height,
            timestamp: header.timestamp,
            txpos: Some(0),
            header_hash: header.hash(),
            tx_type,
        };
        self.wallet.add_verified_tx(&tx_hash, info);
    }

    fn handle_joined(&mut self, joined: Result<TaskOutcome, JoinError>) -> Result<(), SpvError> {
        let _entered = self.span.clone().entered();
        match joined.map_err(|e| SpvError::Task(e.to_string()))? {
            TaskOutcome::Chunk { height, result } => {
                self.requested_chunks.remove(&height);
                match result {
                    Err(e) if e.is_transient() => {
                        info!(height, error = %e, "chunk request failed, will retry");
                        Ok(())
                    }
                    other => other,
                }
            }
            TaskOutcome::Proof { tx_hash, result } => self.apply_proof_result(tx_hash, result),
        }
    }

    fn apply_proof_result(
        &mut self,
        tx_hash: Hash,
        result: Result<Proven, SpvError>,
    ) -> Result<(), SpvError> {
        if !self.requested_merkle.remove(&tx_hash) {
            debug!(%tx_hash, "dropping result of a cancelled request");
            return Ok(());
        }

        let proven = match result {
            Ok(proven) => proven,
            Err(e) if e.is_transient() => {
                info!(%tx_hash, error = %e, "will retry");
                return Ok(());
            }
            Err(e) => {
                warn!(%tx_hash, error = %e, "verification failed");
                return Err(e);
            }
        };

        let current = self.network.blockchain().read_header(proven.height);
        if current.map(|h| h.hash()) != Some(proven.header.hash()) {
            info!(%tx_hash, height = proven.height, "header changed while verifying, will retry");
            return Ok(());
        }

        self.merkle_roots.insert(
            tx_hash,
            VerifiedRoot {
                merkle_root: proven.header.merkle_root,
                height: proven.height,
            },
        );
        info!(%tx_hash, "verified");
        let info = TxMinedInfo {
            height: proven.height,
            timestamp: proven.header.timestamp,
            txpos: proven.txpos,
            header_hash: proven.header.hash(),
            tx_type: proven.tx_type,
        };
        self.wallet.add_verified_tx(&tx_hash, info);
        Ok(())
    }

    fn maybe_undo_verifications(&mut self) {
        let current = self.network.blockchain();
        let Some(old) = self.blockchain.replace(Arc::clone(&current)) else {
            return;
        };
        if old.id() == current.id() {
            return;
        }

        let above_height = current.last_common_height(old.as_ref());
        info!(above_height, "undoing verifications");
        let undone = self.wallet.undo_verifications(current.as_ref(), above_height);
        for tx_hash in undone {
            info!(%tx_hash, "redoing");
            self.remove_spv_proof_for_tx(&tx_hash);
        }
        self.merkle_roots.retain(|_, root| root.height <= above_height);
    }

    /// Forget the proof for `tx_hash`, and any request in flight for it.
    pub fn remove_spv_proof_for_tx(&mut self, tx_hash: &Hash) {
        self.merkle_roots.remove(tx_hash);
        self.requested_merkle.remove(tx_hash);
    }

    /// True when no proof requests are in flight.
    pub fn is_up_to_date(&self) -> bool {
        self.requested_merkle.is_empty()
    }

    /// True while a proof request for `tx_hash` is in flight.
    pub fn is_requested(&self, tx_hash: &Hash) -> bool {
        self.requested_merkle.contains(tx_hash)
    }

    /// Merkle root `tx_hash` was proven against.
    ///
    /// # Returns
    /// `None` until the transaction verifies, and again after a reorg
    /// undoes it. Alerts recorded without a proof never have a root.
    pub fn merkle_root_for(&self, tx_hash: &Hash) -> Option<Hash> {
        self.merkle_roots.get(tx_hash).map(|root| root.merkle_root)
    }

    /// Drop all verification state and abort in-flight requests, as when
    /// the job restarts on a new server session.
    pub fn reset(&mut self) {
        self.tasks = JoinSet::new();
        self.blockchain = None;
        self.merkle_roots.clear();
        self.requested_merkle.clear();
        self.requested_chunks.clear();
    }
}

async fn request_and_verify_single_proof<N: SpvNetwork>(
    network: Arc<N>,
    config: SpvConfig,
    tx_hash: Hash,
    height: u32,
    tx_type: TxType,
) -> TaskOutcome {
    let result = verify_single_proof(network.as_ref(), &config, &tx_hash, height, tx_type).await;
    TaskOutcome::Proof { tx_hash, result }
}

async fn verify_single_proof<N: SpvNetwork>(
    network: &N,
    config: &SpvConfig,
    tx_hash: &Hash,
    height: u32,
    tx_type: TxType,
) -> Result<Proven, SpvError> {
    // wait out header sync or a reorg in progress
    let header = {
        let _guard = network.header_lock().read().await;
        network.blockchain().read_header(height)
    };
    let header = header.ok_or(MerkleVerificationFailure::MissingBlockHeader {
        tx_hash: *tx_hash,
        height,
    })?;

    let txpos = match verify_tx_is_in_block(network, config.proof_source, tx_hash, height, &header).await {
        Ok(pos) => Some(pos),
        Err(SpvError::GracefulDisconnect(failure)) if config.skip_merkle_check => {
            info!(%tx_hash, %failure, "skipping merkle proof check");
            None
        }
        Err(e) => {
            info!(%tx_hash, error = %e, "merkle proof rejected");
            return Err(e);
        }
    };

    Ok(Proven {
        height,
        header,
        txpos,
        tx_type,
    })
}

/// Check that `tx_hash` is in the block `header` describes and return its
/// position in the block.
async fn verify_tx_is_in_block<N: SpvNetwork>(
    network: &N,
    source: ProofSource,
    tx_hash: &Hash,
    height: u32,
    header: &BlockHeader,
) -> Result<u64, SpvError> {
    match source {
        ProofSource::MerkleBranch => {
            let proof = network.get_merkle_for_transaction(tx_hash, height).await?;
            let computed = hash_merkle_root(
                &proof.merkle_branch,
                &tx_hash.to_string(),
                proof.leaf_pos_in_tree,
            )?;
            if computed != header.merkle_root {
                return Err(MerkleVerificationFailure::MerkleRootMismatch {
                    tx_hash: *tx_hash,
                    expected: header.merkle_root,
                    computed,
                }
                .into());
            }
            u64::try_from(proof.leaf_pos_in_tree).map_err(|_| {
                MerkleVerificationFailure::Malformed("negative leaf position".to_string()).into()
            })
        }
        ProofSource::BlockLookup => {
            let not_in_block = || MerkleVerificationFailure::TxNotInBlock {
                tx_hash: *tx_hash,
                height,
            };
            let tx = network.get_transaction(tx_hash).await?;
            let block = network.get_block(&tx.blockhash).await?;
            if block.height != height || block.hash != header.hash() {
                return Err(not_in_block().into());
            }
            let pos = block
                .tx
                .iter()
                .position(|t| t == tx_hash)
                .ok_or_else(not_in_block)?;
            Ok(pos as u64)
        }
    }
}
