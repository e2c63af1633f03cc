//! Mercado Pago statement extractor (account statement and card invoice)
//!
//! Account rows are rebuilt by [`reconstruct_records`] into
//!   DD-MM-YYYY <description> <operation id> r$ <value> r$ <balance>
//!
//! Invoice rows look like
//!   15/03 supermercado abc 123456789 r$ 120,00
//! and only count between "movimentacoes na fatura" and the holder's name.

use std::sync::OnceLock;

use extrato_core::Method;
use regex::Regex;
use tracing::debug;

use super::{ACCOUNT_HOLDER, ExtractContext, four_digit_groups};
use crate::fields::{
    detect_method, override_description, parse_bill_counterparty, parse_day_month, parse_numeric_date,
    parse_value,
};
use crate::reconstruct::reconstruct_records;
use crate::state::{ExtractorState, Mode};

pub const INSTITUTION_ID: i64 = 5968138149;

const BLOCK_START: &[&str] = &["movimentacoes na fatura", "na fatura"];

const DESCRIPTIONS: &[(&str, &str)] = &[("rendimentos", "MERCADO PAGO RETURN FROM CDB INVESTMENT")];

/// Position of the operation id counted from the end of a rebuilt row
const ID_TOKEN_FROM_END: usize = 5;

fn pix_transfer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"transferência pix (?:enviada|recebida) (.+?)\s+\d{9,}").expect("pix transfer regex")
    })
}

fn qr_payment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"pagamento com qr pix (.+?)\s+\d{9,}").expect("qr payment regex"))
}

fn card_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\[[“"»]*\*\d{4}\]"#).expect("card suffix regex"))
}

fn id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{9,}$").expect("id regex"))
}

/// Account statements are rebuilt from wrapped rows; invoices are read as is.
pub(crate) fn logical_lines(text: &str, mode: Mode) -> Vec<String> {
    let physical: Vec<&str> = text.split('\n').collect();
    if mode == Mode::Bill {
        return physical.into_iter().map(str::to_string).collect();
    }

    let rebuilt = reconstruct_records(&physical);
    if rebuilt.is_empty() {
        debug!("no wrapped rows recognized, reading physical lines");
        return physical.into_iter().map(str::to_string).collect();
    }
    rebuilt
}

pub(crate) fn extract_line(state: &mut ExtractorState, line: &str, ctx: &mut ExtractContext<'_>) {
    if ctx.mode == Mode::Bill {
        state.update_block_mode(line, BLOCK_START, ACCOUNT_HOLDER);
        fetch_card_id(state, line, ctx);
    }

    // Bill runs only read the invoice block; account runs only read outside it
    let active = match ctx.mode {
        Mode::Bill => state.block_mode,
        Mode::Common => !state.block_mode,
    };
    if !active {
        return;
    }

    state.transaction_id = fetch_transaction_id(line);
    fetch_date(state, line, ctx.current_year);
    state.value = parse_value(line);
    fetch_counterparty(state, line);
    if let Some(label) = override_description(line, DESCRIPTIONS) {
        state.description = Some(label.to_string());
    }
    state.method = if state.block_mode {
        Method::Credit
    } else {
        detect_method(line)
    };
    state.category_name = Some(ctx.resolver.resolve(line, state.counterparty.as_deref()));
}

fn fetch_transaction_id(line: &str) -> Option<String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let token = parts.len().checked_sub(ID_TOKEN_FROM_END).map(|i| parts[i])?;
    id_re().is_match(token).then(|| token.to_string())
}

fn fetch_date(state: &mut ExtractorState, line: &str, current_year: i32) {
    if let Some(date) = parse_numeric_date(line) {
        state.date = Some(date);
    }
    if state.block_mode {
        if let Some(date) = parse_day_month(line, current_year) {
            state.date = Some(date);
        }
    }
}

fn fetch_counterparty(state: &mut ExtractorState, line: &str) {
    if state.block_mode {
        if let Some(name) = parse_bill_counterparty(line) {
            state.counterparty = Some(name);
        }
        return;
    }

    if let Some(caps) = pix_transfer_re()
        .captures(line)
        .or_else(|| qr_payment_re().captures(line))
    {
        state.counterparty = Some(caps[1].trim().to_uppercase());
    }
}

fn fetch_card_id(state: &mut ExtractorState, line: &str, ctx: &mut ExtractContext<'_>) {
    if !card_suffix_re().is_match(line) {
        return;
    }
    let groups = four_digit_groups(line);
    let Some(last) = groups.last() else {
        return;
    };

    match ctx.cards.match_last_four(last) {
        Some(id) => state.card_id = Some(id),
        None if !state.block_mode => state.card_id = None,
        None => {}
    }
}
