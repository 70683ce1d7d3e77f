use super::keys::{deduce_alert_key, parse_exact, CompressedPublicKey, TwoKeys};
use super::{MultiKeyScriptGenerator, SpendingPolicy};
use crate::{Script, ScriptError};

fn two_key_flags(policy: Option<SpendingPolicy>) -> &'static [u8] {
    match policy {
        Some(SpendingPolicy::Alert) => &[1],
        Some(SpendingPolicy::Recovery) => &[0],
        // Instant is not selectable on two-key generators.
        Some(SpendingPolicy::Instant) | None => &[],
    }
}

/// Two-key vault generator for software wallets.
///
/// Knows the recovery key; the caller supplies the alert key, optionally
/// together with the recovery key, and the alert key is picked out by
/// exclusion.
#[derive(Clone, Debug)]
pub struct TwoKeysScriptGenerator {
    recovery: CompressedPublicKey,
    policy: Option<SpendingPolicy>,
}

impl TwoKeysScriptGenerator {
    /// # Arguments
    /// * `recovery_pubkey` - Hex of the compressed recovery public key.
    pub fn new(recovery_pubkey: &str) -> Result<Self, ScriptError> {
        Ok(TwoKeysScriptGenerator {
            recovery: CompressedPublicKey::from_hex(recovery_pubkey)?,
            policy: None,
        })
    }

    /// Build the redeem script from keys given by role.
    pub fn create_redeem_script(alert_pubkey: &str, recovery_pubkey: &str) -> Result<Script, ScriptError> {
        TwoKeys {
            alert: CompressedPublicKey::from_hex(alert_pubkey)?,
            recovery: CompressedPublicKey::from_hex(recovery_pubkey)?,
        }
        .redeem_script()
    }

    /// Resolve a 1- or 2-element key list into role-tagged keys.
    pub fn resolve_keys(&self, public_keys: &[&str]) -> Result<TwoKeys, ScriptError> {
        if !(1..=2).contains(&public_keys.len()) {
            return Err(ScriptError::WrongKeyCount { expected: "1 or 2", got: public_keys.len() });
        }
        let alert = deduce_alert_key(public_keys, &[self.recovery])?;
        Ok(TwoKeys { alert, recovery: self.recovery })
    }
}

impl MultiKeyScriptGenerator for TwoKeysScriptGenerator {
    fn get_redeem_script(&self, public_keys: &[&str]) -> Result<Script, ScriptError> {
        self.resolve_keys(public_keys)?.redeem_script()
    }

    fn policy(&self) -> Option<SpendingPolicy> {
        self.policy
    }

    fn witness_flags(&self) -> &'static [u8] {
        two_key_flags(self.policy)
    }

    fn set_alert(&mut self) {
        self.policy = Some(SpendingPolicy::Alert);
    }

    fn set_recovery(&mut self) {
        self.policy = Some(SpendingPolicy::Recovery);
    }
}

/// Two-key vault generator for hardware wallets.
///
/// Takes exactly `[alert, recovery]` in that order; nothing is inferred.
#[derive(Clone, Debug, Default)]
pub struct TwoKeysHWScriptGenerator {
    policy: Option<SpendingPolicy>,
}

impl TwoKeysHWScriptGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MultiKeyScriptGenerator for TwoKeysHWScriptGenerator {
    fn get_redeem_script(&self, public_keys: &[&str]) -> Result<Script, ScriptError> {
        let [alert, recovery] = parse_exact::<2>(public_keys, "exactly 2")?;
        TwoKeys { alert, recovery }.redeem_script()
    }

    fn policy(&self) -> Option<SpendingPolicy> {
        self.policy
    }

    fn witness_flags(&self) -> &'static [u8] {
        two_key_flags(self.policy)
    }

    fn set_alert(&mut self) {
        self.policy = Some(SpendingPolicy::Alert);
    }

    fn set_recovery(&mut self) {
        self.policy = Some(SpendingPolicy::Recovery);
    }
}
