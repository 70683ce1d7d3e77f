/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Binary or hex data does not form exactly one well-formed transaction.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// A string names no vault transaction type.
    #[error("Cannot get TxType for '{0}'")]
    InvalidTxType(String),
    /// An underlying script error (forwarded from `btcv-script`).
    #[error("script error: {0}")]
    Script(#[from] btcv_script::ScriptError),
    /// An underlying primitives error (forwarded from `btcv-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] btcv_primitives::PrimitivesError),
}
