//! Field grammars shared by the institution extractors.
//!
//! Every function here takes one lowercased statement line and either returns
//! the field or `None`/`0.0`; nothing raises. Unresolved fields are filtered
//! later by the acceptance policy.

use std::sync::OnceLock;

use chrono::NaiveDate;
use extrato_core::Method;
use regex::Regex;

/// Month number with its full and abbreviated Portuguese names.
const MONTHS: &[(u32, &str, &str)] = &[
    (1, "janeiro", "jan."),
    (2, "fevereiro", "fev."),
    (3, "março", "mar."),
    (4, "abril", "abr."),
    (5, "maio", "mai."),
    (6, "junho", "jun."),
    (7, "julho", "jul."),
    (8, "agosto", "ago."),
    (9, "setembro", "set."),
    (10, "outubro", "out."),
    (11, "novembro", "nov."),
    (12, "dezembro", "dez."),
];

/// Keyword bags per method. Declaration order is precedence: a later group
/// that also matches overrides an earlier one.
const METHOD_KEYWORDS: &[(Method, &[&str])] = &[
    (Method::Pix, &["pix", "transferencia", "transferência"]),
    (Method::Debit, &["debito", "estorno"]),
    (Method::Credit, &["pagamento"]),
    (Method::Revenue, &["rendimento", "rendimentos"]),
];

fn long_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2}) de (\w+\.?) de (\d{4})").expect("long date regex"))
}

fn long_date_no_de_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2}) de (\w+\.?) (\d{4})").expect("long date regex"))
}

fn numeric_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}-\d{2}-\d{4}").expect("numeric date regex"))
}

fn day_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{2})/(\d{2})").expect("day/month regex"))
}

fn value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?P<pre>-)?r\$ ?(?P<post>-)? ?(?P<num>[\d.,]+)").expect("value regex")
    })
}

fn bill_counterparty_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\d{2}/\d{2}\s+([^\d]+?)\s+(?:\d{9,}|r\$)").expect("bill counterparty regex")
    })
}

/// Resolve a Portuguese month name ("março", "mar.", "mar") to its number.
///
/// Comparison is case-sensitive; trailing periods are ignored on both sides.
pub fn month_number(name: &str) -> Option<u32> {
    let bare = name.trim_end_matches('.');
    MONTHS
        .iter()
        .find(|(_, full, abbr)| {
            [full, abbr]
                .iter()
                .any(|m| **m == name || m.trim_end_matches('.') == bare)
        })
        .map(|(n, _, _)| *n)
}

/// Parse a leading long-form date: "05 de março de 2024" or "5 de mar. 2024".
pub fn parse_long_date(line: &str) -> Option<NaiveDate> {
    let caps = long_date_re()
        .captures(line)
        .or_else(|| long_date_no_de_re().captures(line))?;

    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a leading "DD-MM-YYYY" date.
pub fn parse_numeric_date(line: &str) -> Option<NaiveDate> {
    let m = numeric_date_re().find(line)?;
    NaiveDate::parse_from_str(m.as_str(), "%d-%m-%Y").ok()
}

/// Parse a leading bare "DD/MM" and place it in `year`.
pub fn parse_day_month(line: &str, year: i32) -> Option<NaiveDate> {
    let caps = day_month_re().captures(line)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// First `r$` amount on the line as a signed number, `0.0` when absent.
///
/// Brazilian formatting: `.` groups thousands, `,` marks decimals. A minus
/// sign either before the marker (`-r$ 10,00`) or right after it
/// (`r$ -10,00`) negates the amount.
pub fn parse_value(line: &str) -> f64 {
    let Some(caps) = value_re().captures(line) else {
        return 0.0;
    };

    let normalized = caps["num"].replace('.', "").replace(',', ".");
    let amount: f64 = match normalized.parse() {
        Ok(v) => v,
        Err(_) => return 0.0,
    };

    if caps.name("pre").is_some() || caps.name("post").is_some() {
        -amount
    } else {
        amount
    }
}

/// Method from the keyword bags; the last matching group wins.
pub fn detect_method(line: &str) -> Method {
    let mut method = Method::Unset;
    for (candidate, words) in METHOD_KEYWORDS {
        if words.iter().any(|w| line.contains(w)) {
            method = *candidate;
        }
    }
    method
}

/// Counterparty of an itemized invoice row: "DD/MM <name> <id|r$>".
pub fn parse_bill_counterparty(line: &str) -> Option<String> {
    let caps = bill_counterparty_re().captures(line)?;
    let name = caps[1].trim();
    if name.is_empty() {
        return None;
    }
    Some(name.to_uppercase())
}

/// Label of the last `(needle, label)` entry whose needle occurs in the line.
pub fn override_description(line: &str, table: &[(&str, &'static str)]) -> Option<&'static str> {
    table
        .iter()
        .filter(|(needle, _)| line.contains(needle))
        .map(|(_, label)| *label)
        .last()
}
