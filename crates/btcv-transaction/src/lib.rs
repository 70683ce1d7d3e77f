/// Bitcoin Vault SDK - Transaction parsing and vault transaction types.
///
/// Provides the Transaction type with inputs, outputs and segwit witnesses,
/// wire-format parsing and serialization, the vault transaction type tags,
/// and the status and spendability helpers built on them.

pub mod transaction;
pub mod input;
pub mod output;
pub mod tx_type;
pub mod status;

mod error;
pub use error::TransactionError;
pub use transaction::{MultiKeyTransaction, Transaction};
pub use input::TransactionInput;
pub use output::TransactionOutput;
pub use tx_type::TxType;
