/// Pay-to-script-hash address handling.
///
/// Vault funds live in P2SH outputs, so the only address form this crate
/// produces is Base58Check(version || Hash160(redeem_script)). The version
/// byte selects the network.

use std::fmt;

use btcv_primitives::base58;

use crate::Script;

/// Mainnet P2SH address version byte.
const MAINNET_P2SH: u8 = 0x3c;
/// Testnet and regtest P2SH address version byte.
const TESTNET_P2SH: u8 = 0xc4;

/// Network type for address prefix selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Bitcoin Vault mainnet (P2SH prefix 0x3c).
    Mainnet,
    /// Public testnet (P2SH prefix 0xc4).
    Testnet,
    /// Local regression-test network, shares testnet's prefix.
    Regtest,
}

impl Network {
    /// Return the P2SH version byte for this network.
    pub fn p2sh_version(self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2SH,
            Network::Testnet | Network::Regtest => TESTNET_P2SH,
        }
    }
}

/// A P2SH address.
///
/// Holds the Base58Check string, the 20-byte script hash it encodes and the
/// network it was built for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The human-readable Base58Check address string.
    pub address_string: String,
    /// Hash160 of the redeem script.
    pub script_hash: [u8; 20],
    /// The network this address belongs to.
    pub network: Network,
}

impl Address {
    /// Create an address from a 20-byte script hash.
    pub fn from_script_hash(hash: &[u8; 20], network: Network) -> Self {
        let mut payload = Vec::with_capacity(21);
        payload.push(network.p2sh_version());
        payload.extend_from_slice(hash);

        Address {
            address_string: base58::check_encode(&payload),
            script_hash: *hash,
            network,
        }
    }

    /// Create the address that pays to `redeem_script`.
    pub fn from_redeem_script(redeem_script: &Script, network: Network) -> Self {
        Self::from_script_hash(&redeem_script.script_hash(), network)
    }

    /// Return the P2SH locking script for this address.
    pub fn locking_script(&self) -> Script {
        Script::p2sh_from_hash(&self.script_hash)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}
