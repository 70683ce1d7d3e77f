//! Static evaluation of a vault redeem script's branch selector.
//!
//! Runs only the conditional prefix of the script (IF / ELSE / ENDIF and
//! small-int pushes) against the flags a script-sig would push, which is
//! enough to learn how many signatures OP_CHECKMULTISIG will demand.

use crate::opcodes::*;
use crate::{Script, ScriptError};

fn malformed(reason: &str) -> ScriptError {
    ScriptError::NotMultiKeyScript(reason.to_string())
}

impl Script {
    /// Return the signature count the redeem script selects for `flags`.
    ///
    /// # Arguments
    /// * `flags` - Selector values in push order, as returned by
    ///   `MultiKeyScriptGenerator::witness_flags`. The last flag is on top of
    ///   the stack and is consumed by the first OP_IF.
    ///
    /// # Returns
    /// The selected `m`, or `NotMultiKeyScript` when the script lacks the
    /// selector-keys-CHECKMULTISIG layout or `flags` do not match the
    /// selector's depth.
    pub fn multikey_policy_branches(&self, flags: &[u8]) -> Result<u8, ScriptError> {
        let chunks = self.chunks()?;
        let split = chunks
            .iter()
            .position(|c| c.is_push())
            .ok_or_else(|| malformed("no public keys"))?;
        let (selector, tail) = chunks.split_at(split);

        // Tail: <key>... OP_N OP_CHECKMULTISIG
        let key_count = tail.iter().take_while(|c| c.is_push()).count();
        match &tail[key_count..] {
            [n, last] if last.op == OP_CHECKMULTISIG
                && small_int_value(n.op) == Some(key_count as u8) => {}
            _ => return Err(malformed("expected <keys> OP_N OP_CHECKMULTISIG")),
        }

        let mut stack: Vec<bool> = flags.iter().map(|&f| f != 0).collect();
        let mut exec: Vec<bool> = Vec::new();
        let mut selected = None;

        for chunk in selector {
            let executing = exec.iter().all(|&b| b);
            match chunk.op {
                OP_IF | OP_NOTIF => {
                    let branch = if executing {
                        let top = stack.pop().ok_or_else(|| malformed("selector needs more flags"))?;
                        if chunk.op == OP_IF { top } else { !top }
                    } else {
                        false
                    };
                    exec.push(branch);
                }
                OP_ELSE => {
                    let top = exec.last_mut().ok_or_else(|| malformed("OP_ELSE without OP_IF"))?;
                    *top = !*top;
                }
                OP_ENDIF => {
                    exec.pop().ok_or_else(|| malformed("OP_ENDIF without OP_IF"))?;
                }
                op => match small_int_value(op) {
                    Some(m) if executing => {
                        if selected.replace(m).is_some() {
                            return Err(malformed("branch pushes more than one count"));
                        }
                    }
                    Some(_) => {}
                    None => return Err(malformed(&format!("unexpected {}", opcode_to_string(op)))),
                },
            }
        }

        if !exec.is_empty() {
            return Err(malformed("unbalanced conditional"));
        }
        if !stack.is_empty() {
            return Err(malformed("unused selector flags"));
        }
        match selected {
            Some(m) if m >= 1 && (m as usize) <= key_count => Ok(m),
            _ => Err(malformed("no signature count selected")),
        }
    }
}
