//! extrato-finance: default category classifier and SQLite persistence

pub mod category_rules;
pub mod store;

pub use category_rules::{KeywordClassifier, categorize};
pub use store::SqliteStore;
