use chrono::NaiveDate;
use extrato_core::{Method, Transaction};
use extrato_ingest::{FormatRegistry, ManualEntry, StatementInput, StatementParser};
use std::collections::HashSet;
use std::path::PathBuf;

fn fixture(name: &str) -> Vec<String> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let text = std::fs::read_to_string(path).unwrap();
    vec![text]
}

fn classify(line: &str) -> String {
    if line.contains("supermercado") {
        "FOOD".to_string()
    } else {
        "OTHER".to_string()
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn assert_emitted_invariants(txns: &[Transaction]) {
    assert!(txns.iter().all(|t| t.value != 0.0));
    let ids: Vec<&str> = txns.iter().filter_map(|t| t.transaction_id.as_deref()).collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
}

#[test]
fn test_inter_invoice_block_only() {
    let registry = FormatRegistry::default();
    let cards: Vec<i64> = vec![4000000000001234, 5162000000001234];
    let parser = StatementParser::new(&registry, &classify)
        .with_card_directory(&cards)
        .with_current_year(2024);

    let pages = fixture("inter_invoice.txt");
    let detection = parser.detect(&pages).unwrap();
    assert_eq!(detection.institution_key, "inter_brasil");
    assert_eq!(detection.mode_key, "inter_bill");

    let txns = parser.parse(StatementInput::Pages(pages)).unwrap();
    assert_emitted_invariants(&txns);
    assert_eq!(txns.len(), 3);
    for t in &txns {
        assert_eq!(t.method, Method::Credit);
        assert!(t.date.is_some());
        assert_eq!(t.card_id, Some(5162000000001234));
        assert_eq!(t.institution_name, "Inter Brasil");
    }

    assert_eq!(txns[0].counterparty.as_deref(), Some("SUPERMERCADO ABC"));
    assert_eq!(txns[0].date, Some(ymd(2024, 3, 15)));
    assert_eq!(txns[0].value, 120.0);
    assert_eq!(txns[0].category_name.as_deref(), Some("FOOD"));

    assert_eq!(txns[1].description.as_deref(), Some("YOUTUBE PREMIUM"));
    assert_eq!(txns[1].date, Some(ymd(2024, 3, 16)));

    assert_eq!(txns[2].counterparty.as_deref(), Some("UBER TRIP"));
    assert_eq!(txns[2].value, 18.0);
}

#[test]
fn test_mercado_pago_account_dedups_ids() {
    let registry = FormatRegistry::default();
    let parser = StatementParser::new(&registry, &classify);

    let txns = parser
        .parse(StatementInput::Pages(fixture("mercado_pago_account.txt")))
        .unwrap();
    assert_emitted_invariants(&txns);
    assert_eq!(txns.len(), 4);

    let ids: Vec<&str> = txns.iter().filter_map(|t| t.transaction_id.as_deref()).collect();
    assert_eq!(
        ids,
        vec!["77410022951", "84522019376-1", "84522019376-2", "90011223344"]
    );

    assert_eq!(txns[0].method, Method::Revenue);
    assert_eq!(txns[1].counterparty.as_deref(), Some("MARIA SOUZA"));
    assert_eq!(txns[1].value, -50.0);
    assert_eq!(txns[2].date, Some(ymd(2024, 3, 2)));

    let wage = &txns[3];
    assert_eq!(wage.counterparty.as_deref(), Some("URBAN TECNOLOGIA E INOVACAO LTDA"));
    assert_eq!(wage.category_name.as_deref(), Some("WAGE"));
    assert_eq!(wage.value, 3000.0);
    assert_eq!(wage.method, Method::Pix);
}

#[test]
fn test_unreadable_card_directory_degrades() {
    struct Offline;
    impl extrato_core::CardDirectory for Offline {
        fn list_cards(&self) -> extrato_core::Result<Vec<i64>> {
            Err(extrato_core::Error::CardLookup("database offline".to_string()))
        }
    }

    let registry = FormatRegistry::default();
    let offline = Offline;
    let parser = StatementParser::new(&registry, &classify)
        .with_card_directory(&offline)
        .with_current_year(2024);
    let txns = parser
        .parse(StatementInput::Pages(fixture("inter_invoice.txt")))
        .unwrap();
    assert_eq!(txns.len(), 3);
    assert!(txns.iter().all(|t| t.card_id.is_none()));
}

#[test]
fn test_registry_from_toml_keeps_declaration_order() {
    let registry: FormatRegistry = toml::from_str(
        r#"
[[institution]]
key = "mercado_pago"
display_name = "Mercado Pago"

[[institution.mode]]
key = "mp_common"
triggers = ["pix"]

[[institution]]
key = "inter_brasil"
display_name = "Inter Brasil"

[[institution.mode]]
key = "inter_common"
triggers = ["banco inter"]
"#,
    )
    .unwrap();

    let parser = StatementParser::new(&registry, &classify);
    let detection = parser
        .detect(&["Banco Inter\npix enviado".to_string()])
        .unwrap();
    assert_eq!(detection.institution_key, "mercado_pago");
    assert_eq!(detection.mode_key, "mp_common");
}

#[test]
fn test_unrecognized_statement() {
    let registry = FormatRegistry::default();
    let parser = StatementParser::new(&registry, &classify);
    let err = parser
        .parse(StatementInput::Pages(vec!["Nubank\nFatura de março".to_string()]))
        .unwrap_err();
    assert!(matches!(err, extrato_core::Error::FormatNotRecognized));
}

#[test]
fn test_manual_entry_through_parser() {
    let registry = FormatRegistry::default();
    let parser = StatementParser::new(&registry, &classify);
    let entry = ManualEntry {
        institution_key: Some("inter_brasil".to_string()),
        date: "10-04-2024".to_string(),
        value: "r$ 35,00".to_string(),
        counterparty: Some("Rosana Lima".to_string()),
        ..ManualEntry::default()
    };
    let txns = parser.parse(StatementInput::Manual(entry)).unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].institution_id, 35555757);
    assert_eq!(txns[0].category_name.as_deref(), Some("FAMILY"));
    assert_eq!(txns[0].date, Some(ymd(2024, 4, 10)));
}
