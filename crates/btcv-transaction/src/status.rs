//! Wallet-facing helpers for vault transactions: status icon indexing and
//! coin selection filtering.

use btcv_primitives::chainhash::Hash;

use crate::TxType;

/// First status index reserved for vault transactions. Indices below it are
/// the ordinary confirmation icons.
pub const TX_STATUS_INDEX_SHIFT: u32 = 10;

/// Status string used for transactions whose state is not known yet.
pub const STATUS_UNKNOWN: &str = "unknown";

/// Map a transaction's generic status to the index used to pick its icon.
///
/// Standard-like transactions keep their status, except confirmed alerts
/// which use the last ordinary icon. Unconfirmed alerts map to
/// `TX_STATUS_INDEX_SHIFT`, an unconfirmed recovery to the slot after the
/// confirmed vault types, and any confirmed vault transaction to
/// `TX_STATUS_INDEX_SHIFT + tx_type`.
///
/// # Arguments
/// * `tx_type` - Vault type of the transaction.
/// * `confirmations` - Number of confirmations, zero when unmined.
/// * `status` - Ordinary status index computed by the wallet.
/// * `status_str` - Human-readable status; `"unknown"` short-circuits.
pub fn vault_tx_status(
    tx_type: TxType,
    confirmations: u32,
    status: u32,
    status_str: &str,
) -> (u32, String) {
    if status_str == STATUS_UNKNOWN {
        return (status, status_str.to_string());
    }

    if tx_type.is_like_standard() {
        let status = if tx_type == TxType::AlertConfirmed {
            TX_STATUS_INDEX_SHIFT - 1
        } else {
            status
        };
        return (status, status_str.to_string());
    }

    let index = if confirmations == 0 {
        if tx_type == TxType::Recovery {
            TX_STATUS_INDEX_SHIFT + u32::from(tx_type.value()) + 1
        } else {
            TX_STATUS_INDEX_SHIFT
        }
    } else {
        TX_STATUS_INDEX_SHIFT + u32::from(tx_type.value())
    };
    (index, status_str.to_string())
}

/// Check whether outputs of a transaction with this type may be spent.
pub fn is_spendable_type(tx_type: TxType) -> bool {
    tx_type.is_like_standard() || tx_type == TxType::Recovery
}

/// Keep only coins funded by a spendable transaction type.
///
/// `funding_txid` extracts the txid a coin was created by; `lookup` returns
/// that transaction's type. Coins whose funding transaction is unknown are
/// dropped.
pub fn filter_spendable_coins<C, F, L>(coins: Vec<C>, funding_txid: F, lookup: L) -> Vec<C>
where
    F: Fn(&C) -> Hash,
    L: Fn(&Hash) -> Option<TxType>,
{
    coins
        .into_iter()
        .filter(|coin| {
            lookup(&funding_txid(coin))
                .map(is_spendable_type)
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_unknown_passes_through() {
        for t in TxType::ALL {
            assert_eq!(vault_tx_status(t, 0, 3, "unknown"), (3, "unknown".to_string()));
        }
    }

    #[test]
    fn test_standard_like_keep_status() {
        assert_eq!(vault_tx_status(TxType::NonVault, 2, 4, "2 conf").0, 4);
        assert_eq!(vault_tx_status(TxType::Instant, 0, 1, "unconfirmed").0, 1);
        assert_eq!(
            vault_tx_status(TxType::AlertConfirmed, 144, 7, "done").0,
            TX_STATUS_INDEX_SHIFT - 1
        );
    }

    #[test]
    fn test_vault_types() {
        assert_eq!(vault_tx_status(TxType::AlertPending, 0, 0, "pending").0, 10);
        assert_eq!(vault_tx_status(TxType::AlertRecovered, 0, 0, "pending").0, 10);
        assert_eq!(vault_tx_status(TxType::Recovery, 0, 0, "pending").0, 14);
        assert_eq!(vault_tx_status(TxType::AlertPending, 3, 0, "3 conf").0, 11);
        assert_eq!(vault_tx_status(TxType::AlertRecovered, 3, 0, "3 conf").0, 12);
        let (idx, s) = vault_tx_status(TxType::Recovery, 1, 0, "1 conf");
        assert_eq!(idx, 13);
        assert_eq!(s, "1 conf");
    }

    #[test]
    fn test_filter_spendable_coins() {
        let txids: Vec<Hash> = (0u8..7).map(|i| Hash::new([i; 32])).collect();
        let mut types = HashMap::new();
        for (txid, t) in txids.iter().zip(TxType::ALL) {
            types.insert(*txid, t);
        }
        // txids[6] is not in the store.
        let coins: Vec<(Hash, u64)> = txids.iter().map(|h| (*h, 1000)).collect();

        let kept = filter_spendable_coins(coins, |c| c.0, |h| types.get(h).copied());
        let kept_types: Vec<TxType> = kept.iter().map(|c| types[&c.0]).collect();
        assert_eq!(
            kept_types,
            vec![
                TxType::NonVault,
                TxType::Recovery,
                TxType::Instant,
                TxType::AlertConfirmed
            ]
        );
    }
}
