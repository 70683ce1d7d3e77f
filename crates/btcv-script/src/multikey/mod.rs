//! Multi-key vault script generation.
//!
//! A vault output commits to one redeem script that offers several spending
//! paths, chosen at spend time by truth values pushed ahead of the redeem
//! script:
//!
//! - **alert**: one signature, the fast but revocable path;
//! - **instant** (three-key vaults only): two signatures, alert plus instant;
//! - **recovery**: every key signs.
//!
//! Each generator knows some of the participant keys up front, builds the
//! redeem script from the rest, and produces the script-sig for the policy
//! selected with `set_alert` / `set_instant` / `set_recovery`.

mod branches;
mod keys;
mod three_keys;
mod two_keys;

pub use keys::{CompressedPublicKey, ThreeKeys, TwoKeys, COMPRESSED_PUBLIC_KEY_LEN};
pub use three_keys::{ThreeKeysHWScriptGenerator, ThreeKeysScriptGenerator};
pub use two_keys::{TwoKeysHWScriptGenerator, TwoKeysScriptGenerator};

use serde::{Deserialize, Serialize};

use crate::opcodes::{OP_0, OP_1};
use crate::{Script, ScriptError};

/// Spending path a generator produces script-sigs for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingPolicy {
    /// Single signature with the alert key.
    Alert,
    /// Alert and instant keys together.
    Instant,
    /// All keys, including the recovery key.
    Recovery,
}

/// Common capability set of the vault script generators.
///
/// Policy changes take `&mut self`; callers own serialization of policy
/// changes per generator instance.
pub trait MultiKeyScriptGenerator {
    /// Build the redeem script for the supplied public keys.
    ///
    /// How the list is interpreted depends on the generator: the software
    /// variants deduce the alert key by excluding the keys they already know,
    /// the hardware variants take an exact, ordered list.
    fn get_redeem_script(&self, public_keys: &[&str]) -> Result<Script, ScriptError>;

    /// The currently selected spending policy, if any.
    fn policy(&self) -> Option<SpendingPolicy>;

    /// Branch-selector values pushed by the script-sig for the current
    /// policy, in push order. Empty while no policy is set.
    fn witness_flags(&self) -> &'static [u8];

    /// Select the alert path.
    fn set_alert(&mut self);

    /// Select the recovery path.
    fn set_recovery(&mut self);

    /// Build `OP_0 <sig>... <flags> <redeem script>` for the current policy.
    ///
    /// # Arguments
    /// * `signatures` - Hex-encoded signatures, in the order CHECKMULTISIG
    ///   expects them.
    /// * `public_keys` - Public keys, interpreted as by `get_redeem_script`.
    ///
    /// # Returns
    /// The script-sig, or `PolicyNotSet` before a policy was selected.
    fn get_script_sig(
        &self,
        signatures: &[&str],
        public_keys: &[&str],
    ) -> Result<Script, ScriptError> {
        if self.policy().is_none() {
            return Err(ScriptError::PolicyNotSet);
        }
        let redeem_script = self.get_redeem_script(public_keys)?;
        build_script_sig(signatures, self.witness_flags(), &redeem_script)
    }

    fn is_alert_mode(&self) -> bool {
        self.policy() == Some(SpendingPolicy::Alert)
    }

    fn is_instant_mode(&self) -> bool {
        self.policy() == Some(SpendingPolicy::Instant)
    }

    fn is_recovery_mode(&self) -> bool {
        self.policy() == Some(SpendingPolicy::Recovery)
    }
}

/// Assemble a script-sig from hex signatures, selector flags and the
/// redeem script.
///
/// The leading `OP_0` is the dummy element CHECKMULTISIG pops in addition
/// to its signatures.
pub fn build_script_sig(
    signatures: &[&str],
    flags: &[u8],
    redeem_script: &Script,
) -> Result<Script, ScriptError> {
    let mut script = Script::new();
    script.append_opcodes(&[OP_0])?;
    for sig in signatures {
        let bytes = hex::decode(sig)
            .map_err(|e| ScriptError::InvalidHex(format!("signature '{}': {}", sig, e)))?;
        script.append_push_data(&bytes)?;
    }
    let flag_ops: Vec<u8> = flags
        .iter()
        .map(|&flag| if flag == 0 { OP_0 } else { OP_1 })
        .collect();
    script.append_opcodes(&flag_ops)?;
    script.append_push_data(redeem_script.to_bytes())?;
    Ok(script)
}
