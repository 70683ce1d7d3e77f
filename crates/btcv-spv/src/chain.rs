//! Header chain collaborator.

use btcv_primitives::chainhash::Hash;

use crate::header::BlockHeader;

/// Read access to a locally validated header chain.
///
/// The wallet's network layer owns the chains and may switch between forks;
/// the verifier only reads. Implementors must be cheap to query, since the
/// verifier reads headers on every poll.
pub trait HeaderChain: Send + Sync {
    /// Identity of this fork, e.g. the hash of the block it forks from.
    /// Two chains with equal ids are the same chain.
    fn id(&self) -> Hash;

    /// Height of the chain tip.
    fn height(&self) -> u32;

    /// Header at `height`, if this chain has it.
    fn read_header(&self, height: u32) -> Option<BlockHeader>;

    /// Height of the last block shared with `other`.
    ///
    /// The default walks down from the lower of the two tips comparing block
    /// hashes, and returns 0 when nothing above genesis matches.
    fn last_common_height(&self, other: &dyn HeaderChain) -> u32 {
        let mut height = self.height().min(other.height());
        loop {
            if let (Some(ours), Some(theirs)) = (self.read_header(height), other.read_header(height)) {
                if ours.hash() == theirs.hash() {
                    return height;
                }
            }
            if height == 0 {
                return 0;
            }
            height -= 1;
        }
    }
}
