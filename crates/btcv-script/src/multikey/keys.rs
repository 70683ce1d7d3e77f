use std::fmt;

use crate::opcodes::*;
use crate::{Script, ScriptError};

/// Length of a compressed SEC1 public key.
pub const COMPRESSED_PUBLIC_KEY_LEN: usize = 33;

/// A 33-byte compressed SEC1 public key (prefix 0x02 or 0x03).
///
/// Only the encoding is checked; the point is not decompressed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressedPublicKey([u8; COMPRESSED_PUBLIC_KEY_LEN]);

impl CompressedPublicKey {
    /// Parse a compressed key from its hex encoding.
    ///
    /// # Returns
    /// The key, or `InvalidPublicKey` for bad hex, a wrong length or a
    /// prefix other than 02/03.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| ScriptError::InvalidPublicKey(format!("'{}': {}", hex_str, e)))?;
        Self::from_bytes(&bytes)
    }

    /// Parse a compressed key from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScriptError> {
        if bytes.len() != COMPRESSED_PUBLIC_KEY_LEN {
            return Err(ScriptError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                COMPRESSED_PUBLIC_KEY_LEN,
                bytes.len()
            )));
        }
        if bytes[0] != 0x02 && bytes[0] != 0x03 {
            return Err(ScriptError::InvalidPublicKey(format!(
                "unexpected prefix {:02x}",
                bytes[0]
            )));
        }
        let mut key = [0u8; COMPRESSED_PUBLIC_KEY_LEN];
        key.copy_from_slice(bytes);
        Ok(CompressedPublicKey(key))
    }

    pub fn as_bytes(&self) -> &[u8; COMPRESSED_PUBLIC_KEY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CompressedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for CompressedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompressedPublicKey({})", self.to_hex())
    }
}

/// Keys of a two-key vault, tagged by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TwoKeys {
    pub alert: CompressedPublicKey,
    pub recovery: CompressedPublicKey,
}

impl TwoKeys {
    /// Build `OP_IF OP_1 OP_ELSE OP_2 OP_ENDIF <alert> <recovery> OP_2 OP_CHECKMULTISIG`.
    pub fn redeem_script(&self) -> Result<Script, ScriptError> {
        let mut script = Script::new();
        script.append_opcodes(&[OP_IF, OP_1, OP_ELSE, OP_2, OP_ENDIF])?;
        script.append_push_data(self.alert.as_bytes())?;
        script.append_push_data(self.recovery.as_bytes())?;
        script.append_opcodes(&[OP_2, OP_CHECKMULTISIG])?;
        Ok(script)
    }
}

/// Keys of a three-key vault, tagged by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreeKeys {
    pub alert: CompressedPublicKey,
    pub instant: CompressedPublicKey,
    pub recovery: CompressedPublicKey,
}

impl ThreeKeys {
    /// Build `OP_IF OP_1 OP_ELSE OP_IF OP_2 OP_ELSE OP_3 OP_ENDIF OP_ENDIF
    /// <alert> <instant> <recovery> OP_3 OP_CHECKMULTISIG`.
    pub fn redeem_script(&self) -> Result<Script, ScriptError> {
        let mut script = Script::new();
        script.append_opcodes(&[
            OP_IF, OP_1, OP_ELSE, OP_IF, OP_2, OP_ELSE, OP_3, OP_ENDIF, OP_ENDIF,
        ])?;
        script.append_push_data(self.alert.as_bytes())?;
        script.append_push_data(self.instant.as_bytes())?;
        script.append_push_data(self.recovery.as_bytes())?;
        script.append_opcodes(&[OP_3, OP_CHECKMULTISIG])?;
        Ok(script)
    }
}

/// Pick the alert key out of `public_keys` by removing every key in `known`.
///
/// Exactly one key must remain; duplicates of the alert key count twice.
pub(crate) fn deduce_alert_key(
    public_keys: &[&str],
    known: &[CompressedPublicKey],
) -> Result<CompressedPublicKey, ScriptError> {
    let mut remaining = Vec::with_capacity(public_keys.len());
    for key in public_keys {
        let parsed = CompressedPublicKey::from_hex(key)?;
        if !known.contains(&parsed) {
            remaining.push(parsed);
        }
    }
    match remaining.as_slice() {
        [alert] => Ok(*alert),
        _ => Err(ScriptError::CannotDeduceKey(
            public_keys.iter().map(|k| k.to_string()).collect(),
        )),
    }
}

/// Parse an exact, ordered key list of length `N`.
pub(crate) fn parse_exact<const N: usize>(
    public_keys: &[&str],
    expected: &'static str,
) -> Result<[CompressedPublicKey; N], ScriptError> {
    if public_keys.len() != N {
        return Err(ScriptError::WrongKeyCount { expected, got: public_keys.len() });
    }
    let mut parsed = Vec::with_capacity(N);
    for key in public_keys {
        parsed.push(CompressedPublicKey::from_hex(key)?);
    }
    parsed.try_into().map_err(|_| ScriptError::WrongKeyCount { expected, got: public_keys.len() })
}
