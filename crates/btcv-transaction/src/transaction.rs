//! Core transaction type.
//!
//! Represents a complete transaction with version, inputs, outputs, optional
//! segwit witnesses and lock time. Parsing is strict: the byte slice must hold
//! exactly one transaction. The SPV verifier relies on that strictness when it
//! checks whether an inner Merkle node could be mistaken for a transaction.

use btcv_primitives::chainhash::{double_hash_h, Hash};
use btcv_primitives::util::{ByteReader, ByteWriter, VarInt};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::tx_type::TxType;
use crate::TransactionError;

/// Segwit flag byte that follows the zero marker.
const SEGWIT_FLAG: u8 = 0x01;

/// A transaction consisting of a version, inputs, outputs and a lock time.
///
/// # Wire format
///
/// | Field          | Size                                 |
/// |----------------|--------------------------------------|
/// | version        | 4 bytes (LE)                         |
/// | marker, flag   | `00 01`, segwit serialization only   |
/// | input count    | VarInt                               |
/// | inputs         | variable (per input)                 |
/// | output count   | VarInt                               |
/// | outputs        | variable (per output)                |
/// | witnesses      | one stack per input, segwit only     |
/// | lock_time      | 4 bytes (LE)                         |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Create a new empty transaction with version 2 and lock time 0.
    pub fn new() -> Self {
        Transaction {
            version: 2,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from a hex-encoded string.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str).map_err(|e| {
            TransactionError::SerializationError(format!("invalid hex: {}", e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - The raw transaction bytes, legacy or segwit serialization.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `SerializationError` if the data
    /// is truncated, malformed, or has trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(
                format!("trailing {} bytes after transaction", reader.remaining()),
            ));
        }
        Ok(tx)
    }

    /// Deserialize a transaction from a `ByteReader`.
    ///
    /// A zero input count directly after the version is read as the segwit
    /// marker and must be followed by the `01` flag byte.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading version: {}", e))
        })?;

        let segwit = reader.peek_u8() == Some(0x00);
        if segwit {
            let marker_and_flag: [u8; 2] = reader.read_array().map_err(|e| {
                TransactionError::SerializationError(format!("reading segwit marker: {}", e))
            })?;
            if marker_and_flag[1] != SEGWIT_FLAG {
                return Err(TransactionError::SerializationError(format!(
                    "invalid segwit flag byte {:02x}",
                    marker_and_flag[1]
                )));
            }
        }

        let input_count = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading input count: {}", e))
        })?;
        let mut inputs = Vec::new();
        for _ in 0..input_count.value() {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading output count: {}", e))
        })?;
        let mut outputs = Vec::new();
        for _ in 0..output_count.value() {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        if segwit {
            for input in inputs.iter_mut() {
                input.read_witness(reader)?;
            }
        }

        let lock_time = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading lock time: {}", e))
        })?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Check whether any input carries witness data.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|i| !i.witness.is_empty())
    }

    fn write_to(&self, writer: &mut ByteWriter, with_witness: bool) {
        writer.write_u32_le(self.version);
        if with_witness {
            writer.write_u8(0x00);
            writer.write_u8(SEGWIT_FLAG);
        }

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(writer);
        }

        if with_witness {
            for input in &self.inputs {
                input.write_witness(writer);
            }
        }

        writer.write_u32_le(self.lock_time);
    }

    /// Serialize to wire bytes, using the segwit form when any input has a
    /// witness.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        self.write_to(&mut writer, self.has_witness());
        writer.into_bytes()
    }

    /// Serialize without marker, flag and witnesses (the txid preimage).
    pub fn to_legacy_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        self.write_to(&mut writer, false);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    // -----------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------

    /// Compute the transaction ID: double SHA-256 of the legacy serialization.
    pub fn tx_id(&self) -> Hash {
        double_hash_h(&self.to_legacy_bytes())
    }

    /// Check whether this is a coinbase transaction.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_null_outpoint()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A wallet transaction tagged with its vault transaction type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiKeyTransaction {
    pub tx: Transaction,
    pub tx_type: TxType,
}

impl MultiKeyTransaction {
    pub fn new(tx: Transaction, tx_type: TxType) -> Self {
        MultiKeyTransaction { tx, tx_type }
    }

    /// Wrap a plain transaction as `TxType::NonVault`.
    pub fn from_tx(tx: Transaction) -> Self {
        Self::new(tx, TxType::NonVault)
    }

    pub fn tx_id(&self) -> Hash {
        self.tx.tx_id()
    }
}

impl From<Transaction> for MultiKeyTransaction {
    fn from(tx: Transaction) -> Self {
        Self::from_tx(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Legacy two-output transaction paying two P2SH addresses.
    const LEGACY_TX: &str = "0200000001eaa85f4446a8d48b345592b7bc540678ef1e0f4a80b4893e9bedbf9aae636d9400000000280000255121023765a77db702ab87d5cf6431d81a4734d9a636eb95446ffe01fa06ac190ce56c51aefdffffff02008c86470000000017a9142664929e5ed5356477dad1404f51bb507e89f9aa87b0398ecb0300000017a914a2703755a1b5e5aa06e742f3db127628d6ed40cd876c030000";
    const LEGACY_TXID: &str = "d0068203d86bed14577f6d8a101db553ba3f7dde45f51eedef7d622962b52924";

    const SEGWIT_TX: &str = "0200000000010111111111111111111111111111111111111111111111111111111111111111110100000000feffffff0150c3000000000000160014abababababababababababababababababababab0203aabbcc02dd0100000000";
    const SEGWIT_TXID: &str = "ff10bfb53f6314e0f29ff762a7ddd425a60614d8655ba0b1d1123e503658c4ee";

    // ---- legacy ----

    #[test]
    fn test_parse_legacy_roundtrip() {
        let tx = Transaction::from_hex(LEGACY_TX).expect("valid tx");
        assert_eq!(tx.version, 2);
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.lock_time, 0x36c);
        assert!(tx.outputs.iter().all(TransactionOutput::is_p2sh));
        assert_eq!(tx.inputs[0].sequence_number, 0xffff_fffd);
        assert_eq!(tx.inputs[0].unlocking_script.len(), 40);
        assert!(!tx.has_witness());
        assert_eq!(tx.to_hex(), LEGACY_TX);
        assert_eq!(tx.tx_id().to_string(), LEGACY_TXID);
    }

    // ---- segwit ----

    #[test]
    fn test_parse_segwit_roundtrip() {
        let tx = Transaction::from_hex(SEGWIT_TX).expect("valid tx");
        assert!(tx.has_witness());
        assert_eq!(tx.inputs[0].witness, vec![vec![0xaa, 0xbb, 0xcc], vec![0xdd, 0x01]]);
        assert_eq!(tx.outputs[0].value, 50_000);
        assert_eq!(tx.to_hex(), SEGWIT_TX);
        assert_eq!(tx.tx_id().to_string(), SEGWIT_TXID);
    }

    #[test]
    fn test_segwit_bad_flag() {
        let bad = SEGWIT_TX.replacen("0200000000010111", "0200000000020111", 1);
        assert!(Transaction::from_hex(&bad).is_err());
    }

    #[test]
    fn test_zero_inputs_with_segwit_marker() {
        // version | 00 01 | 0 inputs | 1 output (value, 11-byte script) | locktime
        let mut raw = vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01];
        raw.extend_from_slice(&[0x10; 8]);
        raw.push(0x0b);
        raw.extend_from_slice(&[0x51; 11]);
        raw.extend_from_slice(&[0x00; 4]);
        assert_eq!(raw.len(), 32);

        let tx = Transaction::from_bytes(&raw).expect("parses");
        assert!(tx.inputs.is_empty());
        assert_eq!(tx.outputs.len(), 1);
    }

    // ---- malformed ----

    #[test]
    fn test_trailing_bytes_rejected() {
        let padded = format!("{}00", LEGACY_TX);
        assert!(matches!(
            Transaction::from_hex(&padded),
            Err(TransactionError::SerializationError(_))
        ));
    }

    #[test]
    fn test_truncated_rejected() {
        assert!(Transaction::from_hex(&LEGACY_TX[..LEGACY_TX.len() - 2]).is_err());
        assert!(Transaction::from_bytes(&[]).is_err());
        assert!(Transaction::from_hex("zz").is_err());
    }

    #[test]
    fn test_random_32_bytes_are_not_a_transaction() {
        let node = [0x5au8; 32];
        assert!(Transaction::from_bytes(&node).is_err());
    }

    // ---- builders ----

    #[test]
    fn test_built_transaction_and_coinbase() {
        let mut tx = Transaction::new();
        let mut coinbase_in = TransactionInput::new(Hash::default(), u32::MAX);
        coinbase_in.unlocking_script = btcv_script::Script::from_hex("03a08601").expect("hex");
        tx.inputs.push(coinbase_in);
        tx.outputs.push(TransactionOutput::new(50, btcv_script::Script::new()));
        assert!(tx.is_coinbase());

        let parsed = Transaction::from_bytes(&tx.to_bytes()).expect("roundtrip");
        assert_eq!(parsed, tx);
    }

    #[test]
    fn test_multikey_from_tx_defaults_to_nonvault() {
        let tx = Transaction::from_hex(LEGACY_TX).expect("valid tx");
        let wrapped = MultiKeyTransaction::from_tx(tx.clone());
        assert_eq!(wrapped.tx_type, TxType::NonVault);
        assert_eq!(wrapped.tx.to_hex(), LEGACY_TX);
        assert_eq!(wrapped.tx_id(), tx.tx_id());

        let alert = MultiKeyTransaction::new(tx, TxType::AlertPending);
        assert_eq!(alert.tx_type, TxType::AlertPending);
    }
}
