/// Error types for script operations.
///
/// Covers parsing and encoding failures, address validation, and the
/// policy-usage errors raised by the multi-key script generators. The
/// latter are caller mistakes: they are reported immediately and never
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Generic invalid script error.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Invalid opcode data encountered during ASM parsing.
    #[error("invalid opcode data")]
    InvalidOpcodeData,

    /// Attempted to use append_opcodes for a push data opcode.
    #[error("use append_push_data for push data funcs: {0}")]
    InvalidOpcodeType(String),

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds maximum allowed size.
    #[error("data too big")]
    DataTooBig,

    /// A push data part exceeds protocol limits.
    #[error("part too big '{0}'")]
    PartTooBig(usize),

    /// A public key is not a 33-byte compressed SEC1 key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// A script-sig was requested before a spending policy was chosen.
    #[error("spending policy not set, call set_alert, set_instant or set_recovery first")]
    PolicyNotSet,

    /// The public key list does not have an accepted length.
    #[error("wrong number of public keys: expected {expected}, got {got}")]
    WrongKeyCount {
        /// Human-readable accepted arity, e.g. "1 or 2".
        expected: &'static str,
        /// Number of keys supplied.
        got: usize,
    },

    /// The alert key could not be singled out from the supplied list.
    #[error("cannot deduce alert public key from {0:?}")]
    CannotDeduceKey(Vec<String>),

    /// The script does not have the multi-key IF/ELSE selector layout.
    #[error("not a multi-key vault script: {0}")]
    NotMultiKeyScript(String),

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] btcv_primitives::PrimitivesError),
}
