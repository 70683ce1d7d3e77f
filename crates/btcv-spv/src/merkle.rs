//! Merkle branch recomputation.
//!
//! A branch lists one sibling per tree level, leaf to root, in display
//! (reversed hex) byte order as served by Electrum-protocol servers. The
//! running hash starts at the txid and is combined with each sibling on the
//! side given by the low bit of the leaf position.

use btcv_primitives::chainhash::Hash;
use btcv_primitives::hash::sha256d;
use btcv_transaction::Transaction;

use crate::error::MerkleVerificationFailure;

/// Compute the Merkle tree parent of two `Hash` values in internal byte order.
pub fn merkle_tree_parent(left: &Hash, right: &Hash) -> Hash {
    let mut concatenated = [0u8; 64];
    concatenated[..32].copy_from_slice(left.as_bytes());
    concatenated[32..].copy_from_slice(right.as_bytes());
    Hash::new(sha256d(&concatenated))
}

fn decode_display_hex(item: &str) -> Result<Vec<u8>, MerkleVerificationFailure> {
    let mut bytes = hex::decode(item)
        .map_err(|e| MerkleVerificationFailure::Malformed(format!("{}: {:?}", e, item)))?;
    bytes.reverse();
    Ok(bytes)
}

/// Fail if a 32-byte inner node deserializes as a transaction.
///
/// A 64-byte transaction can masquerade as an inner node of the tree, so a
/// node that parses is treated as an attack on the proof. A transaction
/// needs at least one input; a parse with none does not count.
pub(crate) fn ensure_not_a_transaction(node: &[u8]) -> Result<(), MerkleVerificationFailure> {
    match Transaction::from_bytes(node) {
        Ok(tx) if !tx.inputs.is_empty() => {
            Err(MerkleVerificationFailure::InnerNodeOfSpvProofIsValidTx)
        }
        _ => Ok(()),
    }
}

/// Recompute the Merkle root from a branch.
///
/// # Arguments
/// * `merkle_branch` - Sibling hashes, leaf level first, display hex.
/// * `tx_hash` - The txid being proven, display hex.
/// * `leaf_pos_in_tree` - Index of the transaction in the block.
///
/// # Returns
/// The root in internal byte order, ready to compare with a header's
/// `merkle_root`. Fails with `Malformed` when the inputs are not hex, the
/// position is negative, an item is not 32 bytes, or the position is too
/// large for the branch; fails with `InnerNodeOfSpvProofIsValidTx` when an
/// intermediate node parses as a transaction.
pub fn hash_merkle_root<S: AsRef<str>>(
    merkle_branch: &[S],
    tx_hash: &str,
    leaf_pos_in_tree: i64,
) -> Result<Hash, MerkleVerificationFailure> {
    let leaf = decode_display_hex(tx_hash)?;
    let mut running = Hash::from_bytes(&leaf).map_err(|_| {
        MerkleVerificationFailure::Malformed(format!("tx hash is {} bytes, want 32", leaf.len()))
    })?;
    let branch = merkle_branch
        .iter()
        .map(|item| decode_display_hex(item.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    if leaf_pos_in_tree < 0 {
        return Err(MerkleVerificationFailure::Malformed(
            "leaf_pos_in_tree must be non-negative".to_string(),
        ));
    }
    let mut index = leaf_pos_in_tree as u64;

    for item in &branch {
        let sibling = Hash::from_bytes(item).map_err(|_| {
            MerkleVerificationFailure::Malformed(
                "all merkle branch items have to be 32 bytes long".to_string(),
            )
        })?;
        running = if index & 1 == 1 {
            merkle_tree_parent(&sibling, &running)
        } else {
            merkle_tree_parent(&running, &sibling)
        };
        index >>= 1;
        ensure_not_a_transaction(running.as_bytes())?;
    }

    if index != 0 {
        return Err(MerkleVerificationFailure::Malformed(
            "leaf_pos_in_tree too large for branch".to_string(),
        ));
    }
    Ok(running)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Block 100000: four transactions.
    const TXIDS: [&str; 4] = [
        "8c14f0db3df150123e6f3dbbf30f8b955a8249b62ac1d1ff16284aefa3d06d87",
        "fff2525b8931402dd09222c50775608f75787bd2b87e56995a7bdd30f79702c4",
        "6359f0868171b1d194cbee1af2f16ea598ae8fad666d9b012c8ed2b79a236ec4",
        "e9a66845e05d5abc0ad04ec80f774a7e585c6e8db975962d069a522137b80c1d",
    ];
    const PARENT_01: &str = "ccdafb73d8dcd0173d5d5c3c9a0770d0b3953db889dab99ef05b1907518cb815";
    const PARENT_23: &str = "8e30899078ca1813be036a073bbf80b86cdddde1c96e9e9c99e9e3782df4ae49";
    const ROOT: &str = "f3e94742aca4b5ef85488dc37c06c3282295ffec960994b2c0d5ac2a25a95766";

    #[test]
    fn test_merkle_tree_parent() {
        let left: Hash = TXIDS[0].parse().unwrap();
        let right: Hash = TXIDS[1].parse().unwrap();
        assert_eq!(merkle_tree_parent(&left, &right).to_string(), PARENT_01);
    }

    #[test]
    fn test_every_leaf_of_block_100000() {
        let branches = [
            [TXIDS[1], PARENT_23],
            [TXIDS[0], PARENT_23],
            [TXIDS[3], PARENT_01],
            [TXIDS[2], PARENT_01],
        ];
        for (pos, branch) in branches.iter().enumerate() {
            let root = hash_merkle_root(branch, TXIDS[pos], pos as i64).unwrap();
            assert_eq!(root.to_string(), ROOT, "leaf {}", pos);
        }
    }

    #[test]
    fn test_single_tx_block_root_is_txid() {
        let empty: [&str; 0] = [];
        let root = hash_merkle_root(&empty, TXIDS[0], 0).unwrap();
        assert_eq!(root.to_string(), TXIDS[0]);
    }

    #[test]
    fn test_wrong_position_changes_root() {
        let root = hash_merkle_root(&[TXIDS[3], PARENT_01], TXIDS[2], 1).unwrap();
        assert_ne!(root.to_string(), ROOT);
    }

    #[test]
    fn test_negative_position() {
        let err = hash_merkle_root(&[TXIDS[3], PARENT_01], TXIDS[2], -1).unwrap_err();
        assert!(matches!(err, MerkleVerificationFailure::Malformed(_)));
    }

    #[test]
    fn test_position_too_large() {
        let err = hash_merkle_root(&[TXIDS[3], PARENT_01], TXIDS[2], 6).unwrap_err();
        assert_eq!(
            err,
            MerkleVerificationFailure::Malformed("leaf_pos_in_tree too large for branch".into())
        );
    }

    #[test]
    fn test_short_branch_item() {
        let short = &PARENT_01[..62];
        let err = hash_merkle_root(&[TXIDS[3], short], TXIDS[2], 2).unwrap_err();
        assert_eq!(
            err,
            MerkleVerificationFailure::Malformed(
                "all merkle branch items have to be 32 bytes long".into()
            )
        );
    }

    #[test]
    fn test_bad_hex() {
        assert!(matches!(
            hash_merkle_root(&["zz"], TXIDS[0], 0),
            Err(MerkleVerificationFailure::Malformed(_))
        ));
        assert!(matches!(
            hash_merkle_root(&[TXIDS[1]], "not hex", 0),
            Err(MerkleVerificationFailure::Malformed(_))
        ));
        assert!(matches!(
            hash_merkle_root(&[TXIDS[1]], "abcd", 0),
            Err(MerkleVerificationFailure::Malformed(_))
        ));
    }

    #[test]
    fn test_inner_node_without_inputs_is_accepted() {
        // version | 00 01 | no inputs | one output with an 11-byte script | locktime
        let mut node = vec![0x02, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01];
        node.extend_from_slice(&[0x22; 8]);
        node.push(0x0b);
        node.extend_from_slice(&[0x6a; 11]);
        node.extend_from_slice(&[0x00; 4]);
        assert_eq!(node.len(), 32);

        let tx = Transaction::from_bytes(&node).unwrap();
        assert!(tx.inputs.is_empty());
        assert!(ensure_not_a_transaction(&node).is_ok());
        let root: Hash = ROOT.parse().unwrap();
        assert!(ensure_not_a_transaction(root.as_bytes()).is_ok());
    }

    #[test]
    fn test_inner_node_that_parses_as_tx() {
        // version | one input with empty script | one output with a 4-byte script | locktime
        let mut node = vec![0x01, 0x00, 0x00, 0x00, 0x01];
        node.extend_from_slice(&[0x33; 32]);
        node.extend_from_slice(&[0x00; 4]);
        node.push(0x00);
        node.extend_from_slice(&[0xff; 4]);
        node.push(0x01);
        node.extend_from_slice(&[0x00; 8]);
        node.push(0x04);
        node.extend_from_slice(&[0x6a; 4]);
        node.extend_from_slice(&[0x00; 4]);
        assert_eq!(node.len(), 64);

        assert_eq!(
            ensure_not_a_transaction(&node),
            Err(MerkleVerificationFailure::InnerNodeOfSpvProofIsValidTx)
        );
    }
}
