//! Transaction output with value and locking script.

use btcv_primitives::util::{ByteReader, ByteWriter};
use btcv_script::Script;

use crate::TransactionError;

/// A single transaction output.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TransactionOutput {
    /// Value in satoshis.
    pub value: u64,
    pub locking_script: Script,
}

impl TransactionOutput {
    pub fn new(value: u64, locking_script: Script) -> Self {
        TransactionOutput { value, locking_script }
    }

    /// Deserialize an output: 8-byte value followed by a length-prefixed script.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let value = reader.read_u64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading value: {}", e))
        })?;
        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading locking script: {}", e))
        })?;

        Ok(TransactionOutput {
            value,
            locking_script: Script::from_bytes(script_bytes),
        })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64_le(self.value);
        writer.write_var_bytes(self.locking_script.to_bytes());
    }

    /// Check whether the output pays to a script hash, as vault outputs do.
    pub fn is_p2sh(&self) -> bool {
        self.locking_script.is_p2sh()
    }
}
