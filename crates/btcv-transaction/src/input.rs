//! Transaction input referencing a previous output.
//!
//! Holds the spent outpoint, the script-sig, the sequence number and the
//! segwit witness stack. The witness is serialized separately from the
//! rest of the input, after all outputs.

use btcv_primitives::chainhash::Hash;
use btcv_primitives::util::{ByteReader, ByteWriter, VarInt};
use btcv_script::Script;

use crate::TransactionError;

/// Sequence number that disables relative lock-time and RBF signalling.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single transaction input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// Transaction ID of the output being spent.
    pub source_txid: Hash,
    /// Index of the output being spent.
    pub source_tx_out_index: u32,
    /// Script-sig; empty for native segwit spends.
    pub unlocking_script: Script,
    pub sequence_number: u32,
    /// Segwit witness items, empty for legacy inputs.
    pub witness: Vec<Vec<u8>>,
}

fn ser_err(what: &str) -> impl FnOnce(btcv_primitives::PrimitivesError) -> TransactionError + '_ {
    move |e| TransactionError::SerializationError(format!("reading {}: {}", what, e))
}

impl TransactionInput {
    /// Create an input spending `source_txid:index` with an empty script-sig.
    pub fn new(source_txid: Hash, source_tx_out_index: u32) -> Self {
        TransactionInput {
            source_txid,
            source_tx_out_index,
            unlocking_script: Script::new(),
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            witness: Vec::new(),
        }
    }

    /// Deserialize the non-witness part of an input.
    ///
    /// # Returns
    /// The input with an empty witness, or a `SerializationError` naming
    /// the field that could not be read.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let txid_bytes: [u8; 32] = reader.read_array().map_err(ser_err("source txid"))?;
        let source_tx_out_index = reader.read_u32_le().map_err(ser_err("output index"))?;
        let script_bytes = reader.read_var_bytes().map_err(ser_err("unlocking script"))?;
        let sequence_number = reader.read_u32_le().map_err(ser_err("sequence number"))?;

        Ok(TransactionInput {
            source_txid: Hash::new(txid_bytes),
            source_tx_out_index,
            unlocking_script: Script::from_bytes(script_bytes),
            sequence_number,
            witness: Vec::new(),
        })
    }

    /// Read this input's witness stack, which follows the outputs on the wire.
    pub fn read_witness(&mut self, reader: &mut ByteReader) -> Result<(), TransactionError> {
        let count = reader.read_varint().map_err(ser_err("witness count"))?;
        let mut witness = Vec::new();
        for _ in 0..count.value() {
            let item = reader.read_var_bytes().map_err(ser_err("witness item"))?;
            witness.push(item.to_vec());
        }
        self.witness = witness;
        Ok(())
    }

    /// Serialize the non-witness part of this input.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(self.source_txid.as_bytes());
        writer.write_u32_le(self.source_tx_out_index);
        writer.write_var_bytes(self.unlocking_script.to_bytes());
        writer.write_u32_le(self.sequence_number);
    }

    /// Serialize this input's witness stack.
    pub fn write_witness(&self, writer: &mut ByteWriter) {
        writer.write_varint(VarInt::from(self.witness.len()));
        for item in &self.witness {
            writer.write_var_bytes(item);
        }
    }

    /// Check whether this input spends the null outpoint of a coinbase.
    pub fn is_null_outpoint(&self) -> bool {
        self.source_txid == Hash::default() && self.source_tx_out_index == u32::MAX
    }
}
