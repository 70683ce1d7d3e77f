//! In-memory collaborators for driving `SpvVerifier` in tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use btcv_primitives::chainhash::Hash;
use btcv_spv::{
    BlockHeader, HeaderChain, MerkleProof, SpvError, SpvNetwork, SpvWallet, TxMinedInfo,
    UnverifiedTx, VerboseBlock, VerboseTransaction,
};
use tokio::sync::{Notify, RwLock};

// Block 100000.
pub const TXIDS: [&str; 4] = [
    "8c14f0db3df150123e6f3dbbf30f8b955a8249b62ac1d1ff16284aefa3d06d87",
    "fff2525b8931402dd09222c50775608f75787bd2b87e56995a7bdd30f79702c4",
    "6359f0868171b1d194cbee1af2f16ea598ae8fad666d9b012c8ed2b79a236ec4",
    "e9a66845e05d5abc0ad04ec80f774a7e585c6e8db975962d069a522137b80c1d",
];
pub const PARENT_01: &str = "ccdafb73d8dcd0173d5d5c3c9a0770d0b3953db889dab99ef05b1907518cb815";
pub const PARENT_23: &str = "8e30899078ca1813be036a073bbf80b86cdddde1c96e9e9c99e9e3782df4ae49";
pub const ROOT: &str = "f3e94742aca4b5ef85488dc37c06c3282295ffec960994b2c0d5ac2a25a95766";

/// Height at which the test chains carry the block 100000 Merkle root.
pub const PROOF_HEIGHT: u32 = 5;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn hash(s: &str) -> Hash {
    s.parse().expect("valid hash")
}

pub fn tx_hash() -> Hash {
    hash(TXIDS[2])
}

/// Proof of `TXIDS[2]` against `ROOT`.
pub fn golden_proof() -> MerkleProof {
    MerkleProof {
        block_height: PROOF_HEIGHT,
        merkle_branch: vec![TXIDS[3].to_string(), PARENT_01.to_string()],
        leaf_pos_in_tree: 2,
    }
}

pub fn header(height: u32, merkle_root: Hash, fork: u32) -> BlockHeader {
    BlockHeader {
        version: 1,
        prev_block_hash: Hash::default(),
        merkle_root,
        timestamp: 1_600_000_000 + height,
        bits: 0x207fffff,
        nonce: fork,
        height,
    }
}

pub struct MemoryChain {
    id: Hash,
    headers: BTreeMap<u32, BlockHeader>,
}

impl MemoryChain {
    /// Headers 1..=tip; the one at `PROOF_HEIGHT` commits to `ROOT`.
    /// Chains with different `fork` values share heights below `fork_height`.
    pub fn new(id: u8, tip: u32, fork: u32, fork_height: u32) -> Self {
        let mut headers = BTreeMap::new();
        for height in 1..=tip {
            let root = if height == PROOF_HEIGHT {
                hash(ROOT)
            } else {
                Hash::new([height as u8; 32])
            };
            let nonce = if height >= fork_height { fork } else { 0 };
            headers.insert(height, header(height, root, nonce));
        }
        MemoryChain {
            id: Hash::new([id; 32]),
            headers,
        }
    }

    pub fn main() -> Self {
        Self::new(1, 10, 0, u32::MAX)
    }

    pub fn without(mut self, height: u32) -> Self {
        self.headers.remove(&height);
        self
    }

    pub fn header_at(&self, height: u32) -> BlockHeader {
        self.headers[&height]
    }
}

impl HeaderChain for MemoryChain {
    fn id(&self) -> Hash {
        self.id
    }

    fn height(&self) -> u32 {
        self.headers.keys().next_back().copied().unwrap_or(0)
    }

    fn read_header(&self, height: u32) -> Option<BlockHeader> {
        self.headers.get(&height).copied()
    }
}

#[derive(Default)]
pub struct MockNetwork {
    chain: Mutex<Option<Arc<MemoryChain>>>,
    lock: RwLock<()>,
    proofs: Mutex<HashMap<Hash, MerkleProof>>,
    txs: Mutex<HashMap<Hash, VerboseTransaction>>,
    blocks: Mutex<HashMap<Hash, VerboseBlock>>,
    chunks: Mutex<Vec<u32>>,
    gate: Mutex<Option<Arc<Notify>>>,
    merkle_calls: AtomicUsize,
    fail_chunks: AtomicBool,
}

impl MockNetwork {
    pub fn new(chain: MemoryChain) -> Arc<Self> {
        let network = MockNetwork::default();
        network.set_chain(chain);
        Arc::new(network)
    }

    pub fn set_chain(&self, chain: MemoryChain) {
        *self.chain.lock().unwrap() = Some(Arc::new(chain));
    }

    pub fn add_proof(&self, tx_hash: Hash, proof: MerkleProof) {
        self.proofs.lock().unwrap().insert(tx_hash, proof);
    }

    pub fn add_block(&self, block: VerboseBlock) {
        for txid in &block.tx {
            self.txs.lock().unwrap().insert(
                *txid,
                VerboseTransaction {
                    txid: *txid,
                    blockhash: block.hash,
                },
            );
        }
        self.blocks.lock().unwrap().insert(block.hash, block);
    }

    /// Make merkle requests wait until the returned `Notify` fires.
    pub fn hold_merkle_requests(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn merkle_calls(&self) -> usize {
        self.merkle_calls.load(Ordering::SeqCst)
    }

    pub fn fail_chunks(&self, fail: bool) {
        self.fail_chunks.store(fail, Ordering::SeqCst);
    }

    pub fn chunks(&self) -> Vec<u32> {
        self.chunks.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpvNetwork for MockNetwork {
    fn blockchain(&self) -> Arc<dyn HeaderChain> {
        let chain = self.chain.lock().unwrap().clone().expect("chain set");
        chain
    }

    fn header_lock(&self) -> &RwLock<()> {
        &self.lock
    }

    async fn get_merkle_for_transaction(
        &self,
        tx_hash: &Hash,
        _height: u32,
    ) -> Result<MerkleProof, SpvError> {
        self.merkle_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.proofs
            .lock()
            .unwrap()
            .get(tx_hash)
            .cloned()
            .ok_or_else(|| SpvError::Network(format!("no proof for {}", tx_hash)))
    }

    async fn get_transaction(&self, tx_hash: &Hash) -> Result<VerboseTransaction, SpvError> {
        self.txs
            .lock()
            .unwrap()
            .get(tx_hash)
            .cloned()
            .ok_or_else(|| SpvError::Network(format!("unknown tx {}", tx_hash)))
    }

    async fn get_block(&self, block_hash: &Hash) -> Result<VerboseBlock, SpvError> {
        self.blocks
            .lock()
            .unwrap()
            .get(block_hash)
            .cloned()
            .ok_or_else(|| SpvError::Network(format!("unknown block {}", block_hash)))
    }

    async fn request_chunk(&self, height: u32) -> Result<(), SpvError> {
        self.chunks.lock().unwrap().push(height);
        if self.fail_chunks.load(Ordering::SeqCst) {
            return Err(SpvError::Network(format!("chunk {} unavailable", height)));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockWallet {
    unverified: Mutex<HashMap<Hash, UnverifiedTx>>,
    verified: Mutex<HashMap<Hash, (UnverifiedTx, TxMinedInfo)>>,
    undo_calls: Mutex<Vec<u32>>,
}

impl MockWallet {
    pub fn with_tx(tx_hash: Hash, utx: UnverifiedTx) -> Arc<Self> {
        let wallet = MockWallet::default();
        wallet.add_unverified(tx_hash, utx);
        Arc::new(wallet)
    }

    pub fn add_unverified(&self, tx_hash: Hash, utx: UnverifiedTx) {
        self.unverified.lock().unwrap().insert(tx_hash, utx);
    }

    pub fn verified(&self, tx_hash: &Hash) -> Option<TxMinedInfo> {
        self.verified.lock().unwrap().get(tx_hash).map(|(_, info)| *info)
    }

    pub fn is_unverified(&self, tx_hash: &Hash) -> bool {
        self.unverified.lock().unwrap().contains_key(tx_hash)
    }

    pub fn undo_calls(&self) -> Vec<u32> {
        self.undo_calls.lock().unwrap().clone()
    }
}

impl SpvWallet for MockWallet {
    fn diagnostic_name(&self) -> String {
        "test_wallet".to_string()
    }

    fn get_unverified_txs(&self) -> HashMap<Hash, UnverifiedTx> {
        self.unverified.lock().unwrap().clone()
    }

    fn add_verified_tx(&self, tx_hash: &Hash, info: TxMinedInfo) {
        let utx = self
            .unverified
            .lock()
            .unwrap()
            .remove(tx_hash)
            .unwrap_or_else(|| UnverifiedTx::with_type(i64::from(info.height), info.tx_type));
        self.verified.lock().unwrap().insert(*tx_hash, (utx, info));
    }

    fn undo_verifications(&self, _chain: &dyn HeaderChain, above_height: u32) -> Vec<Hash> {
        self.undo_calls.lock().unwrap().push(above_height);
        let mut verified = self.verified.lock().unwrap();
        let undone: Vec<Hash> = verified
            .iter()
            .filter(|(_, (_, info))| info.height > above_height)
            .map(|(txid, _)| *txid)
            .collect();
        for txid in &undone {
            if let Some((utx, _)) = verified.remove(txid) {
                self.unverified.lock().unwrap().insert(*txid, utx);
            }
        }
        undone
    }
}
