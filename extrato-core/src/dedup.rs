//! Make transaction ids unique across one statement.

use std::collections::{HashMap, HashSet};

use crate::transaction::Transaction;

/// Rewrite every id that occurs more than once to `id-1`, `id-2`, ... in
/// first-seen order. Unique ids and missing ids are left alone.
///
/// Extracted ids are purely numeric. An input id that already looks like
/// `id-N` is kept as is, and the numbering of its base id skips it.
pub fn dedup_transaction_ids(transactions: &mut [Transaction]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for txn in transactions.iter() {
        if let Some(id) = &txn.transaction_id {
            *counts.entry(id.clone()).or_insert(0) += 1;
        }
    }

    let mut taken: HashSet<String> = counts.keys().cloned().collect();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for txn in transactions.iter_mut() {
        let Some(id) = txn.transaction_id.take() else {
            continue;
        };
        if counts.get(&id).copied().unwrap_or(0) > 1 {
            let n = seen.entry(id.clone()).or_insert(0);
            let renamed = loop {
                *n += 1;
                let candidate = format!("{id}-{n}");
                if taken.insert(candidate.clone()) {
                    break candidate;
                }
            };
            txn.transaction_id = Some(renamed);
        } else {
            txn.transaction_id = Some(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(id: Option<&str>, value: f64) -> Transaction {
        let mut t = Transaction::new(5968138149, "Mercado Pago", value);
        t.transaction_id = id.map(str::to_string);
        t
    }

    fn ids(txns: &[Transaction]) -> Vec<Option<String>> {
        txns.iter().map(|t| t.transaction_id.clone()).collect()
    }

    #[test]
    fn test_duplicates_are_numbered_in_order() {
        let mut txns = vec![
            txn(Some("123456789"), -10.0),
            txn(Some("987654321"), 5.0),
            txn(Some("123456789"), -20.0),
        ];
        dedup_transaction_ids(&mut txns);

        assert_eq!(
            ids(&txns),
            vec![
                Some("123456789-1".to_string()),
                Some("987654321".to_string()),
                Some("123456789-2".to_string()),
            ]
        );
        // Order of records is untouched
        assert_eq!(txns[0].value, -10.0);
        assert_eq!(txns[2].value, -20.0);
    }

    #[test]
    fn test_missing_ids_untouched() {
        let mut txns = vec![txn(None, 1.0), txn(None, 2.0), txn(Some("111111111"), 3.0)];
        dedup_transaction_ids(&mut txns);
        assert_eq!(ids(&txns), vec![None, None, Some("111111111".to_string())]);
    }

    #[test]
    fn test_idempotent_on_unique_ids() {
        let mut txns = vec![txn(Some("1"), 1.0), txn(Some("1"), 2.0), txn(Some("2"), 3.0)];
        dedup_transaction_ids(&mut txns);
        let once = ids(&txns);
        dedup_transaction_ids(&mut txns);
        assert_eq!(ids(&txns), once);
    }

    #[test]
    fn test_all_ids_unique_after_dedup() {
        let mut txns: Vec<_> = ["5", "5", "5", "6", "6", "7"]
            .iter()
            .map(|id| txn(Some(id), 1.0))
            .collect();
        dedup_transaction_ids(&mut txns);
        let mut all: Vec<_> = ids(&txns).into_iter().flatten().collect();
        let before = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), before);
    }

    #[test]
    fn test_suffixed_input_id_is_not_reused() {
        let mut txns = vec![
            txn(Some("123456789-1"), 1.0),
            txn(Some("123456789"), 2.0),
            txn(Some("123456789"), 3.0),
        ];
        dedup_transaction_ids(&mut txns);
        assert_eq!(
            ids(&txns),
            vec![
                Some("123456789-1".to_string()),
                Some("123456789-2".to_string()),
                Some("123456789-3".to_string()),
            ]
        );
    }
}
