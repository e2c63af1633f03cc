//! Transaction record types emitted by the statement extractors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One accepted statement movement, ready for storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Numeric operation id printed on the statement, made unique by dedup
    pub transaction_id: Option<String>,
    /// Date of the movement (serialized as YYYY-MM-DD)
    pub date: Option<NaiveDate>,
    /// Fixed label from the description override table
    pub description: Option<String>,
    /// Signed amount; zero is never emitted
    pub value: f64,
    /// Upper-cased name of the other party
    pub counterparty: Option<String>,
    pub method: Method,
    pub institution_id: i64,
    pub institution_name: String,
    /// Card resolved against the card directory
    pub card_id: Option<i64>,
    pub category_name: Option<String>,
}

/// Payment method of a movement
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Pix,
    Debit,
    Credit,
    Revenue,
    #[default]
    Unset,
}

impl Method {
    /// Storage label ("PIX", "DEBIT", ...). `Unset` stores as an empty string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Pix => "PIX",
            Method::Debit => "DEBIT",
            Method::Credit => "CREDIT",
            Method::Revenue => "REVENUE",
            Method::Unset => "",
        }
    }

    /// Parse a user supplied method name, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "PIX" => Some(Method::Pix),
            "DEBIT" => Some(Method::Debit),
            "CREDIT" => Some(Method::Credit),
            "REVENUE" => Some(Method::Revenue),
            "" | "UNSET" => Some(Method::Unset),
            _ => None,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Unset => f.write_str("UNSET"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl Transaction {
    /// Create a transaction for an institution with every optional field unset
    pub fn new(institution_id: i64, institution_name: impl Into<String>, value: f64) -> Self {
        Self {
            transaction_id: None,
            date: None,
            description: None,
            value,
            counterparty: None,
            method: Method::Unset,
            institution_id,
            institution_name: institution_name.into(),
            card_id: None,
            category_name: None,
        }
    }

    /// Returns true if money left the account
    pub fn is_expense(&self) -> bool {
        self.value < 0.0
    }

    /// ISO date string, empty when unresolved
    pub fn date_iso(&self) -> String {
        self.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_serializes_iso_date_and_upper_method() {
        let mut txn = Transaction::new(5968138149, "Mercado Pago", -45.9);
        txn.date = NaiveDate::from_ymd_opt(2024, 3, 5);
        txn.method = Method::Pix;

        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["date"], "2024-03-05");
        assert_eq!(json["method"], "PIX");
        assert_eq!(json["transaction_id"], serde_json::Value::Null);
        assert!(txn.is_expense());
    }

    #[test]
    fn test_method_labels() {
        assert_eq!(Method::from_label("credit"), Some(Method::Credit));
        assert_eq!(Method::from_label(""), Some(Method::Unset));
        assert_eq!(Method::from_label("boleto"), None);
        assert_eq!(Method::Unset.as_str(), "");
        assert_eq!(Method::Unset.to_string(), "UNSET");
    }

    #[test]
    fn test_date_iso_empty_when_unset() {
        let txn = Transaction::new(35555757, "Inter Brasil", 10.0);
        assert_eq!(txn.date_iso(), "");
    }
}
