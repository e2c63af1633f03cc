//! Rebuild logical transaction lines from statements that wrap one row over
//! three physical lines.
//!
//! Expected Mercado Pago account layout after OCR (the description cell wraps
//! around the data row):
//!   transferência pix enviada
//!   12-03-2024 84522019376 r$ -50,00 r$ 1.200,00
//!   maria souza
//!
//! becomes
//!   12-03-2024 transferência pix enviada maria souza 84522019376 r$ -50,00 r$ 1.200,00

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

fn leading_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}-\d{2}-\d{4}").expect("leading date regex"))
}

fn data_row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?P<date>\d{2}-\d{2}-\d{4})\s+(?P<id>\d{9,})\s+r\$.*").expect("data row regex")
    })
}

/// Merge wrapped rows into one logical line each.
///
/// Lines that already start with a date pass through unchanged. Lines that
/// fit neither shape are dropped.
pub fn reconstruct_records(lines: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if leading_date_re().is_match(line) {
            out.push(line.to_string());
            i += 1;
            continue;
        }

        if i + 2 < lines.len() {
            let data_row = lines[i + 1].trim();
            if let Some(caps) = data_row_re().captures(data_row) {
                let date = &caps["date"];
                let id = &caps["id"];
                let rest = data_row.replace(date, "").replace(id, "");
                let tail = lines[i + 2].trim();

                out.push(format!("{date} {line} {tail} {id} {}", rest.trim()));
                i += 3;
                continue;
            }
        }

        trace!(line, "dropping line outside any transaction block");
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_wrapped_row() {
        let lines = [
            "transferência pix enviada",
            "12-03-2024 84522019376 r$ -50,00 r$ 1.200,00",
            "maria souza",
        ];
        let out = reconstruct_records(&lines);
        assert_eq!(
            out,
            vec!["12-03-2024 transferência pix enviada maria souza 84522019376 r$ -50,00 r$ 1.200,00"]
        );
    }

    #[test]
    fn test_single_line_rows_pass_through() {
        let lines = [
            "  01-03-2024 rendimentos 77410022951 r$ 0,35 r$ 1.250,35  ",
            "02-03-2024 pagamento com qr pix padaria 77410022952 r$ -8,00 r$ 1.242,35",
        ];
        let out = reconstruct_records(&lines);
        assert_eq!(out.len(), 2);
        assert!(out[0].starts_with("01-03-2024 rendimentos"));
        assert!(!out[0].ends_with(' '));
    }

    #[test]
    fn test_noise_is_dropped_and_scan_resyncs() {
        let lines = [
            "extrato de conta",
            "periodo: 01/03/2024 a 31/03/2024",
            "pagamento com qr pix",
            "05-03-2024 99887766554 r$ -20,00 r$ 980,00",
            "lanchonete central",
            "03-2024",
        ];
        let out = reconstruct_records(&lines);
        assert_eq!(
            out,
            vec!["05-03-2024 pagamento com qr pix lanchonete central 99887766554 r$ -20,00 r$ 980,00"]
        );
    }

    #[test]
    fn test_trailing_lines_without_room_are_dropped() {
        let lines = ["pix enviado", "05-03-2024 99887766554 r$ -20,00"];
        assert!(reconstruct_records(&lines).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(reconstruct_records(&[]).is_empty());
    }
}
