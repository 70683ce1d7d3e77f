use super::keys::{deduce_alert_key, parse_exact, CompressedPublicKey, ThreeKeys};
use super::{MultiKeyScriptGenerator, SpendingPolicy};
use crate::{Script, ScriptError};

// Flags are pushed in order, so the last one is popped by the outer OP_IF.
fn three_key_flags(policy: Option<SpendingPolicy>) -> &'static [u8] {
    match policy {
        Some(SpendingPolicy::Alert) => &[1],
        Some(SpendingPolicy::Instant) => &[1, 0],
        Some(SpendingPolicy::Recovery) => &[0, 0],
        None => &[],
    }
}

/// Three-key vault generator for software wallets.
///
/// Knows the instant and recovery keys; the alert key is whatever remains
/// of the supplied list after removing those two.
#[derive(Clone, Debug)]
pub struct ThreeKeysScriptGenerator {
    instant: CompressedPublicKey,
    recovery: CompressedPublicKey,
    policy: Option<SpendingPolicy>,
}

impl ThreeKeysScriptGenerator {
    /// # Arguments
    /// * `recovery_pubkey` - Hex of the compressed recovery public key.
    /// * `instant_pubkey` - Hex of the compressed instant public key.
    pub fn new(recovery_pubkey: &str, instant_pubkey: &str) -> Result<Self, ScriptError> {
        Ok(ThreeKeysScriptGenerator {
            instant: CompressedPublicKey::from_hex(instant_pubkey)?,
            recovery: CompressedPublicKey::from_hex(recovery_pubkey)?,
            policy: None,
        })
    }

    /// Build the redeem script from keys given by role.
    pub fn create_redeem_script(
        alert_pubkey: &str,
        instant_pubkey: &str,
        recovery_pubkey: &str,
    ) -> Result<Script, ScriptError> {
        ThreeKeys {
            alert: CompressedPublicKey::from_hex(alert_pubkey)?,
            instant: CompressedPublicKey::from_hex(instant_pubkey)?,
            recovery: CompressedPublicKey::from_hex(recovery_pubkey)?,
        }
        .redeem_script()
    }

    /// Resolve a 1- to 3-element key list into role-tagged keys.
    pub fn resolve_keys(&self, public_keys: &[&str]) -> Result<ThreeKeys, ScriptError> {
        if !(1..=3).contains(&public_keys.len()) {
            return Err(ScriptError::WrongKeyCount { expected: "1 to 3", got: public_keys.len() });
        }
        let alert = deduce_alert_key(public_keys, &[self.instant, self.recovery])?;
        Ok(ThreeKeys { alert, instant: self.instant, recovery: self.recovery })
    }

    /// Select the instant path (alert and instant keys sign).
    pub fn set_instant(&mut self) {
        self.policy = Some(SpendingPolicy::Instant);
    }
}

impl MultiKeyScriptGenerator for ThreeKeysScriptGenerator {
    fn get_redeem_script(&self, public_keys: &[&str]) -> Result<Script, ScriptError> {
        self.resolve_keys(public_keys)?.redeem_script()
    }

    fn policy(&self) -> Option<SpendingPolicy> {
        self.policy
    }

    fn witness_flags(&self) -> &'static [u8] {
        three_key_flags(self.policy)
    }

    fn set_alert(&mut self) {
        self.policy = Some(SpendingPolicy::Alert);
    }

    fn set_recovery(&mut self) {
        self.policy = Some(SpendingPolicy::Recovery);
    }
}

/// Three-key vault generator for hardware wallets.
///
/// Takes exactly `[alert, instant, recovery]` in that order.
#[derive(Clone, Debug, Default)]
pub struct ThreeKeysHWScriptGenerator {
    policy: Option<SpendingPolicy>,
}

impl ThreeKeysHWScriptGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the instant path (alert and instant keys sign).
    pub fn set_instant(&mut self) {
        self.policy = Some(SpendingPolicy::Instant);
    }
}

impl MultiKeyScriptGenerator for ThreeKeysHWScriptGenerator {
    fn get_redeem_script(&self, public_keys: &[&str]) -> Result<Script, ScriptError> {
        let [alert, instant, recovery] = parse_exact::<3>(public_keys, "exactly 3")?;
        ThreeKeys { alert, instant, recovery }.redeem_script()
    }

    fn policy(&self) -> Option<SpendingPolicy> {
        self.policy
    }

    fn witness_flags(&self) -> &'static [u8] {
        three_key_flags(self.policy)
    }

    fn set_alert(&mut self) {
        self.policy = Some(SpendingPolicy::Alert);
    }

    fn set_recovery(&mut self) {
        self.policy = Some(SpendingPolicy::Recovery);
    }
}
