//! extrato-core: transaction types, errors, and the collaborator seams shared by the workspace

pub mod collaborators;
pub mod dedup;
pub mod error;
pub mod transaction;

pub use collaborators::{CardDirectory, Classifier, TransactionStore};
pub use dedup::dedup_transaction_ids;
pub use error::{Error, Result};
pub use transaction::{Method, Transaction};
