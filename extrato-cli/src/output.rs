use anyhow::{Context, Result};
use clap::ValueEnum;
use extrato_core::Transaction;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Flat row used for CSV output
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    transaction_id: Option<&'a str>,
    date: String,
    description: Option<&'a str>,
    value: f64,
    counterparty: Option<&'a str>,
    method: &'a str,
    institution_id: i64,
    institution_name: &'a str,
    card_id: Option<i64>,
    category_name: Option<&'a str>,
}

impl<'a> From<&'a Transaction> for CsvRow<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            transaction_id: t.transaction_id.as_deref(),
            date: t.date_iso(),
            description: t.description.as_deref(),
            value: t.value,
            counterparty: t.counterparty.as_deref(),
            method: t.method.as_str(),
            institution_id: t.institution_id,
            institution_name: &t.institution_name,
            card_id: t.card_id,
            category_name: t.category_name.as_deref(),
        }
    }
}

pub fn write_transactions<W: Write>(out: W, txns: &[Transaction], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(out, txns),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(out, txns).context("serialize json")?;
            Ok(())
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            for t in txns {
                wtr.serialize(CsvRow::from(t)).context("write csv row")?;
            }
            wtr.flush().context("flush csv")?;
            Ok(())
        }
    }
}

fn write_table<W: Write>(mut out: W, txns: &[Transaction]) -> Result<()> {
    writeln!(
        out,
        "{:<10} {:>12} {:<8} {:<32} {:<14} {}",
        "DATE", "VALUE", "METHOD", "COUNTERPARTY", "CATEGORY", "ID"
    )?;
    for t in txns {
        let who = t
            .counterparty
            .as_deref()
            .or(t.description.as_deref())
            .unwrap_or("-");
        writeln!(
            out,
            "{:<10} {:>12.2} {:<8} {:<32} {:<14} {}",
            if t.date.is_some() { t.date_iso() } else { "-".to_string() },
            t.value,
            t.method.to_string(),
            truncate(who, 32),
            t.category_name.as_deref().unwrap_or("-"),
            t.transaction_id.as_deref().unwrap_or("-"),
        )?;
    }
    let total: f64 = txns.iter().map(|t| t.value).sum();
    let spent: f64 = txns.iter().filter(|t| t.is_expense()).map(|t| t.value).sum();
    writeln!(out, "\n{} transactions, spent {:.2}, net {:.2}", txns.len(), spent, total)?;
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 1).collect();
        format!("{cut}…")
    }
}
