//! Inter Brasil statement extractor (account statement and card invoice)
//!
//! Expected account rows after OCR, lowercased:
//!   05 de março de 2024 saldo do dia: r$ 1.250,00
//!   pix enviado: "cp:00416968-maria souza" -r$ 50,00
//!   compra no debito: "no estabelecimento padaria central" - r$ 12,40
//!
//! Long-form date lines are day headings; the rows under them inherit the date.
//! The invoice section starts at "despesas da fatura" and runs until the
//! holder's name. Invoice rows carry either a long-form date or a bare "DD/MM":
//!   15/03 supermercado abc 123456789 r$ 120,00

use std::sync::OnceLock;

use extrato_core::Method;
use regex::Regex;

use super::{ACCOUNT_HOLDER, ExtractContext, four_digit_groups};
use crate::fields::{
    detect_method, override_description, parse_bill_counterparty, parse_day_month, parse_long_date,
    parse_value,
};
use crate::state::{ExtractorState, Mode};

pub const INSTITUTION_ID: i64 = 35555757;

const BLOCK_START: &[&str] = &["despesas da fatura"];

/// Counterparty needle -> fixed description. Later entries win.
const DESCRIPTIONS: &[(&str, &str)] = &[
    ("urban tecnologia e inovacao ltda", "CLT SALARY"),
    ("otaviano alves da silva", "HAIR CUT"),
    ("google youtube", "YOUTUBE PREMIUM"),
    ("wellhub gympass", "GYMPASS"),
];

fn cp_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"cp\s*:\d{8,}-([A-Za-z\s.]+)").expect("cp code regex"))
}

fn establishment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"no estabelecimento\s+(.+?)(?:"|-)"#).expect("establishment regex"))
}

fn masked_card_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"cart[aã]o\s+\d{4}\*{4,}\d{4}").expect("masked card regex"))
}

pub(crate) fn extract_line(state: &mut ExtractorState, line: &str, ctx: &mut ExtractContext<'_>) {
    if ctx.mode == Mode::Bill {
        state.update_block_mode(line, BLOCK_START, ACCOUNT_HOLDER);
    }

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
    if ctx.mode == Mode::Bill && state.block_mode {
        fetch_card_id(state, line, ctx);
    }
    state.category_name = Some(ctx.resolver.resolve(line, state.counterparty.as_deref()));
}

fn fetch_date(state: &mut ExtractorState, line: &str, current_year: i32) {
    if let Some(date) = parse_long_date(line) {
        state.date = Some(date);
        if !state.block_mode {
            state.date_heading = true;
            state.day_date = Some(date);
        }
    } else if state.block_mode {
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

    let name = cp_code_re()
        .captures(line)
        .or_else(|| establishment_re().captures(line))
        .map(|caps| caps[1].trim().to_uppercase())
        .filter(|name| !name.is_empty());
    state.counterparty = name;
}

fn fetch_card_id(state: &mut ExtractorState, line: &str, ctx: &mut ExtractContext<'_>) {
    if !masked_card_re().is_match(line) {
        return;
    }
    let groups = four_digit_groups(line);
    let (Some(first), Some(last)) = (groups.first(), groups.last()) else {
        return;
    };
    if groups.len() < 2 {
        return;
    }

    // An unmatched card keeps the current id until the block closes
    if let Some(id) = ctx.cards.match_masked(first, last) {
        state.card_id = Some(id);
    }
}
