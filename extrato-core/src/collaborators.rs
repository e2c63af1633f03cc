//! Injected capabilities the extraction engine calls out to.

use crate::error::Result;
use crate::transaction::Transaction;

/// Baseline category prediction for a raw statement line.
///
/// Implementations are stateless per call; one instance is built per run and
/// passed by reference into the extractor.
pub trait Classifier {
    fn predict(&self, text: &str) -> String;
}

impl<F> Classifier for F
where
    F: Fn(&str) -> String,
{
    fn predict(&self, text: &str) -> String {
        self(text)
    }
}

/// Known cards, keyed by their numeric identifier.
pub trait CardDirectory {
    fn list_cards(&self) -> Result<Vec<i64>>;
}

impl CardDirectory for Vec<i64> {
    fn list_cards(&self) -> Result<Vec<i64>> {
        Ok(self.clone())
    }
}

/// Batch sink for accepted transactions. A batch commits entirely or not at all.
pub trait TransactionStore {
    /// Returns the number of rows written.
    fn insert(&mut self, transactions: &[Transaction]) -> Result<usize>;
}
