//! Vault transaction type tags.
//!
//! Every wallet transaction is tagged with the vault flow it belongs to.
//! Tags are stored by name, and parsed from either the name or the decimal
//! value so that older records written as integers still load.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TransactionError;

/// Vault transaction type. Discriminants are stable and used for status
/// icon indexing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum TxType {
    #[default]
    NonVault = 0,
    AlertPending = 1,
    AlertRecovered = 2,
    Recovery = 3,
    Instant = 4,
    AlertConfirmed = 5,
}

impl TxType {
    pub const ALL: [TxType; 6] = [
        TxType::NonVault,
        TxType::AlertPending,
        TxType::AlertRecovered,
        TxType::Recovery,
        TxType::Instant,
        TxType::AlertConfirmed,
    ];

    /// The stored name, e.g. `"ALERT_PENDING"`.
    pub fn name(self) -> &'static str {
        match self {
            TxType::NonVault => "NONVAULT",
            TxType::AlertPending => "ALERT_PENDING",
            TxType::AlertRecovered => "ALERT_RECOVERED",
            TxType::Recovery => "RECOVERY",
            TxType::Instant => "INSTANT",
            TxType::AlertConfirmed => "ALERT_CONFIRMED",
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Types whose outputs behave like ordinary, final payments.
    pub fn is_like_standard(self) -> bool {
        matches!(
            self,
            TxType::NonVault | TxType::Instant | TxType::AlertConfirmed
        )
    }

    /// Check whether this is an alert that is still reversible.
    pub fn is_pending_alert(self) -> bool {
        matches!(self, TxType::AlertPending | TxType::AlertRecovered)
    }
}

impl FromStr for TxType {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s || t.value().to_string() == s)
            .ok_or_else(|| TransactionError::InvalidTxType(s.to_string()))
    }
}

impl TryFrom<u8> for TxType {
    type Error = TransactionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TxType::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| TransactionError::InvalidTxType(value.to_string()))
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TxType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TxType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Value(u8),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Name(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Value(v) => TxType::try_from(v).map_err(serde::de::Error::custom),
        }
    }
}
