//! Script chunk parsing and encoding.
//!
//! A script chunk is either an opcode or a data push with its associated bytes.
//! This module decodes raw script bytes into structured chunks and encodes
//! push data with the minimal OP_PUSHDATA prefix.

use btcv_primitives::util::ByteReader;
use btcv_primitives::PrimitivesError;

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a Bitcoin script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The data payload, if this chunk is a push operation.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// Convert this chunk to its ASM string representation.
    ///
    /// Data pushes render as hex; every other opcode uses its OP_xxx name.
    pub fn to_asm_string(&self) -> String {
        match &self.data {
            Some(data) => hex::encode(data),
            None => opcode_to_string(self.op),
        }
    }

    /// Check whether this chunk carries pushed data.
    pub fn is_push(&self) -> bool {
        self.data.is_some()
    }
}

fn truncated(_: PrimitivesError) -> ScriptError {
    ScriptError::DataTooSmall
}

/// Decode raw script bytes into a vector of `ScriptChunk` values.
///
/// Handles OP_DATA_1..OP_DATA_75 (direct push) and OP_PUSHDATA1/2/4
/// (length-prefixed push). Everything else is a bare opcode.
///
/// # Arguments
/// * `bytes` - The raw script bytes to decode.
///
/// # Returns
/// A vector of parsed chunks, or `DataTooSmall` if a push runs past the
/// end of the script.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut reader = ByteReader::new(bytes);
    let mut chunks = Vec::new();

    while reader.remaining() > 0 {
        let op = reader.read_u8().map_err(truncated)?;
        let length = match op {
            OP_DATA_1..=OP_DATA_75 => Some(op as usize),
            OP_PUSHDATA1 => Some(reader.read_u8().map_err(truncated)? as usize),
            OP_PUSHDATA2 => Some(reader.read_u16_le().map_err(truncated)? as usize),
            OP_PUSHDATA4 => Some(reader.read_u32_le().map_err(truncated)? as usize),
            _ => None,
        };
        let data = match length {
            Some(n) => Some(reader.read_bytes(n).map_err(truncated)?.to_vec()),
            None => None,
        };
        chunks.push(ScriptChunk { op, data });
    }

    Ok(chunks)
}

/// Compute the minimal push prefix for a data payload of the given length.
///
/// Payloads of up to 75 bytes use a single length byte; longer payloads
/// use OP_PUSHDATA1, OP_PUSHDATA2 or OP_PUSHDATA4.
///
/// # Returns
/// The prefix bytes, or `DataTooBig` past the 32-bit length limit.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= OP_DATA_75 as usize {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xFF {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xFFFF {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xFFFF_FFFF {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}

/// Encode multiple data payloads into a single byte vector with push prefixes.
///
/// # Returns
/// All pushes concatenated, or `PartTooBig(i)` naming the first part that
/// cannot be encoded.
pub fn encode_push_datas(parts: &[&[u8]]) -> Result<Vec<u8>, ScriptError> {
    let mut result = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let prefix = push_data_prefix(part.len())
            .map_err(|_| ScriptError::PartTooBig(i))?;
        result.extend_from_slice(&prefix);
        result.extend_from_slice(part);
    }
    Ok(result)
}
