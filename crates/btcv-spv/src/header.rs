//! Block header as stored by the local header chain.

use btcv_primitives::chainhash::{double_hash_h, Hash};
use btcv_primitives::util::{ByteReader, ByteWriter};
use serde::{Deserialize, Serialize};

use crate::error::SpvError;

/// Size of a serialized block header.
pub const HEADER_SIZE: usize = 80;

/// A validated block header together with its height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
    /// Height in the chain; not part of the serialized header.
    pub height: u32,
}

impl BlockHeader {
    /// Parse the 80-byte wire header found at `height`.
    pub fn from_bytes(bytes: &[u8], height: u32) -> Result<Self, SpvError> {
        if bytes.len() != HEADER_SIZE {
            return Err(SpvError::InvalidHeader(format!(
                "header is {} bytes, want {}",
                bytes.len(),
                HEADER_SIZE
            )));
        }
        let mut reader = ByteReader::new(bytes);
        Ok(BlockHeader {
            version: reader.read_u32_le()?,
            prev_block_hash: Hash::new(reader.read_array()?),
            merkle_root: Hash::new(reader.read_array()?),
            timestamp: reader.read_u32_le()?,
            bits: reader.read_u32_le()?,
            nonce: reader.read_u32_le()?,
            height,
        })
    }

    pub fn from_hex(hex_str: &str, height: u32) -> Result<Self, SpvError> {
        let bytes = hex::decode(hex_str).map_err(btcv_primitives::PrimitivesError::from)?;
        Self::from_bytes(&bytes, height)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(HEADER_SIZE);
        writer.write_u32_le(self.version);
        writer.write_bytes(self.prev_block_hash.as_bytes());
        writer.write_bytes(self.merkle_root.as_bytes());
        writer.write_u32_le(self.timestamp);
        writer.write_u32_le(self.bits);
        writer.write_u32_le(self.nonce);
        writer.into_bytes()
    }

    /// Block hash: double SHA-256 of the serialized header.
    pub fn hash(&self) -> Hash {
        double_hash_h(&self.to_bytes())
    }
}
