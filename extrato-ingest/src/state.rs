//! Cross-line extraction state and the acceptance/reset rules.

use chrono::NaiveDate;
use extrato_core::{Method, Transaction};
use tracing::trace;

/// Operating mode selected by format detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Itemized invoice: only rows inside the bill block are transactions
    Bill,
    /// Account statement
    Common,
}

impl Mode {
    pub fn requires_block(&self) -> bool {
        matches!(self, Mode::Bill)
    }
}

/// Transaction in progress plus the state carried between lines.
///
/// One instance lives for one statement run. `block_mode` only changes on
/// sentinel phrases; `date` and `card_id` survive [`finalize`](Self::finalize)
/// while inside the block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractorState {
    pub transaction_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub value: f64,
    pub counterparty: Option<String>,
    pub method: Method,
    pub card_id: Option<i64>,
    pub category_name: Option<String>,

    /// Inside a bill/invoice block
    pub block_mode: bool,
    /// Current line is a pure date heading, not a transaction
    pub date_heading: bool,
    /// Date announced by the last heading outside the block
    pub day_date: Option<NaiveDate>,
}

impl ExtractorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the block on any start sentinel; leave it on the end sentinel.
    pub fn update_block_mode(&mut self, line: &str, start: &[&str], end: &str) {
        if start.iter().any(|s| line.contains(s)) {
            self.block_mode = true;
        }
        if self.block_mode && line.contains(end) {
            self.block_mode = false;
        }
    }

    /// Turn the current fields into a transaction if they form an acceptable
    /// record, then reset for the next line.
    pub fn finalize(&mut self, mode: Mode, institution_id: i64, institution_name: &str) -> Option<Transaction> {
        let rejection = if self.date_heading {
            Some("date heading")
        } else if self.value == 0.0 {
            Some("no value")
        } else if mode.requires_block() && !self.block_mode {
            Some("outside bill block")
        } else if mode.requires_block() && self.date.is_none() {
            Some("no date")
        } else {
            None
        };

        let accepted = match rejection {
            Some(reason) => {
                trace!(reason, value = self.value, "candidate discarded");
                None
            }
            None => Some(Transaction {
                transaction_id: self.transaction_id.clone(),
                date: self.effective_date(),
                description: self.description.clone(),
                value: self.value,
                counterparty: self.counterparty.clone(),
                method: self.method,
                institution_id,
                institution_name: institution_name.to_string(),
                card_id: self.card_id,
                category_name: self.category_name.clone(),
            }),
        };

        self.reset();
        accepted
    }

    /// Block rows use their own (or block-scoped) date; account rows fall back
    /// to the last day heading.
    fn effective_date(&self) -> Option<NaiveDate> {
        if self.block_mode {
            self.date
        } else {
            self.date.or(self.day_date)
        }
    }

    fn reset(&mut self) {
        self.transaction_id = None;
        self.description = None;
        self.value = 0.0;
        self.counterparty = None;
        self.method = Method::Unset;
        self.category_name = None;
        self.date_heading = false;
        if !self.block_mode {
            self.date = None;
            self.card_id = None;
        }
    }
}
