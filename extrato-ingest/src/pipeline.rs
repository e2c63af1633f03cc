//! Statement parsing pipeline.
//!
//! pages -> joined, lowercased text -> format detection -> logical lines ->
//! per-line extraction -> id dedup. Manual entries skip detection and are
//! validated with the same acceptance rules.

use chrono::Datelike;
use extrato_core::{CardDirectory, Classifier, Error, Method, Result, Transaction, dedup_transaction_ids};
use tracing::{debug, info, warn};

use crate::cards::CardCache;
use crate::category::CategoryResolver;
use crate::fields::{parse_numeric_date, parse_value};
use crate::parsers::{ExtractContext, Institution};
use crate::registry::{Detection, FormatRegistry};
use crate::state::ExtractorState;

/// What a run is fed
#[derive(Debug, Clone, PartialEq)]
pub enum StatementInput {
    /// Extracted text, one string per page
    Pages(Vec<String>),
    /// A single transaction typed in by hand
    Manual(ManualEntry),
}

/// Hand-entered transaction, fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualEntry {
    /// Registry institution key; Mercado Pago when unset
    pub institution_key: Option<String>,
    pub transaction_id: Option<String>,
    /// `DD-MM-YYYY`
    pub date: String,
    /// `r$ 1.234,56`; the `r$` marker may be omitted
    pub value: String,
    pub counterparty: Option<String>,
    pub description: Option<String>,
    pub method: Option<String>,
    pub card_id: Option<i64>,
}

impl ManualEntry {
    /// Validate and convert into a transaction, categorized by `resolver`.
    pub fn into_transaction(self, resolver: &CategoryResolver<'_>) -> Result<Transaction> {
        let institution = match self.institution_key.as_deref() {
            Some(key) => Institution::from_key(key).ok_or_else(|| Error::UnknownInstitution(key.to_string()))?,
            None => Institution::MercadoPago,
        };

        let date = parse_numeric_date(self.date.trim())
            .ok_or_else(|| Error::ParseFailure(format!("invalid date '{}', expected DD-MM-YYYY", self.date)))?;

        let raw_value = self.value.trim().to_lowercase();
        let value = if raw_value.contains("r$") {
            parse_value(&raw_value)
        } else {
            parse_value(&format!("r$ {raw_value}"))
        };
        if value == 0.0 {
            return Err(Error::ParseFailure(format!("invalid or zero value '{}'", self.value)));
        }

        let method = match self.method.as_deref() {
            Some(label) => {
                Method::from_label(label).ok_or_else(|| Error::ParseFailure(format!("unknown method '{label}'")))?
            }
            None => Method::Unset,
        };

        let counterparty = self
            .counterparty
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());
        let description = self.description.filter(|d| !d.trim().is_empty());

        let text = [description.as_deref(), counterparty.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let category = resolver.resolve(&text, counterparty.as_deref());

        let mut txn = Transaction::new(institution.id(), institution.display_name(), value);
        txn.transaction_id = self.transaction_id.filter(|id| !id.trim().is_empty());
        txn.date = Some(date);
        txn.description = description;
        txn.counterparty = counterparty;
        txn.method = method;
        txn.card_id = self.card_id;
        txn.category_name = Some(category);
        Ok(txn)
    }
}

/// Parses statements against a format registry with injected collaborators.
pub struct StatementParser<'a> {
    registry: &'a FormatRegistry,
    classifier: &'a dyn Classifier,
    cards: Option<&'a dyn CardDirectory>,
    current_year: i32,
    forced: Option<Detection>,
}

impl<'a> StatementParser<'a> {
    pub fn new(registry: &'a FormatRegistry, classifier: &'a dyn Classifier) -> Self {
        Self {
            registry,
            classifier,
            cards: None,
            current_year: chrono::Local::now().year(),
            forced: None,
        }
    }

    pub fn with_card_directory(mut self, cards: &'a dyn CardDirectory) -> Self {
        self.cards = Some(cards);
        self
    }

    /// Year used for bare "DD/MM" invoice dates. Defaults to the local year.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Skip detection and use this registry entry.
    pub fn with_format(mut self, institution_key: &str, mode_key: &str) -> Result<Self> {
        self.forced = Some(self.registry.lookup(institution_key, mode_key)?);
        Ok(self)
    }

    /// Detect the statement format of `pages` without extracting anything.
    pub fn detect(&self, pages: &[String]) -> Result<Detection> {
        if let Some(forced) = &self.forced {
            return Ok(forced.clone());
        }
        self.registry.detect(&join_pages(pages))
    }

    pub fn parse(&self, input: StatementInput) -> Result<Vec<Transaction>> {
        match input {
            StatementInput::Pages(pages) => self.parse_pages(&pages),
            StatementInput::Manual(entry) => {
                let txn = entry.into_transaction(&CategoryResolver::new(self.classifier))?;
                info!(value = txn.value, institution = %txn.institution_name, "manual entry accepted");
                Ok(vec![txn])
            }
        }
    }

    fn parse_pages(&self, pages: &[String]) -> Result<Vec<Transaction>> {
        let text = join_pages(pages);
        let detection = match &self.forced {
            Some(forced) => forced.clone(),
            None => self.registry.detect(&text)?,
        };
        let (institution, mode) = Institution::resolve(&detection)?;
        info!(
            institution = %detection.display_name,
            mode = %detection.mode_key,
            "statement format detected"
        );

        let lines = institution.reconstruct(&text, mode);
        debug!(logical_lines = lines.len(), "statement reconstructed");

        let mut ctx = ExtractContext {
            mode,
            resolver: CategoryResolver::new(self.classifier),
            cards: CardCache::new(self.cards),
            current_year: self.current_year,
        };
        let mut state = ExtractorState::new();
        let mut transactions = Vec::new();
        for line in &lines {
            institution.extract_line(&mut state, line, &mut ctx);
            if let Some(txn) = institution.finalize(&mut state, mode) {
                transactions.push(txn);
            }
        }

        if let Some(err) = ctx.cards.error() {
            warn!(error = %err, "card directory unavailable, card ids left unset");
        }

        dedup_transaction_ids(&mut transactions);
        info!(
            lines = lines.len(),
            transactions = transactions.len(),
            "statement parsed"
        );
        Ok(transactions)
    }
}

fn join_pages(pages: &[String]) -> String {
    pages.join("\n").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn other(_: &str) -> String {
        "OTHER".to_string()
    }

    fn entry(date: &str, value: &str) -> ManualEntry {
        ManualEntry {
            date: date.to_string(),
            value: value.to_string(),
            ..ManualEntry::default()
        }
    }

    #[test]
    fn test_pages_are_joined_and_lowercased() {
        let registry = FormatRegistry::default();
        let parser = StatementParser::new(&registry, &other).with_current_year(2024);
        let pages = vec![
            "Movimentacoes na Fatura".to_string(),
            "15/03 Supermercado ABC 123456789 R$ 120,00\nGustavo Ribeiro Silva".to_string(),
        ];
        let txns = parser.parse(StatementInput::Pages(pages)).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].counterparty.as_deref(), Some("SUPERMERCADO ABC"));
        assert_eq!(txns[0].institution_name, "Mercado Pago");
    }

    #[test]
    fn test_day_month_defaults_to_local_year() {
        let registry = FormatRegistry::default();
        let parser = StatementParser::new(&registry, &other)
            .with_format("inter_brasil", "inter_bill")
            .unwrap();
        let pages = vec!["despesas da fatura\n15/03 padaria r$ 10,00\ngustavo ribeiro silva".to_string()];
        let txns = parser.parse(StatementInput::Pages(pages)).unwrap();
        assert_eq!(txns.len(), 1);
        let date = txns[0].date.unwrap();
        assert_eq!(date.year(), chrono::Local::now().year());
        assert_eq!((date.month(), date.day()), (3, 15));
    }

    #[test]
    fn test_unrecognized_format() {
        let registry = FormatRegistry::default();
        let parser = StatementParser::new(&registry, &other);
        let err = parser
            .parse(StatementInput::Pages(vec!["extrato nubank".to_string()]))
            .unwrap_err();
        assert!(matches!(err, Error::FormatNotRecognized));
    }

    #[test]
    fn test_forced_format_skips_detection() {
        let registry = FormatRegistry::default();
        let parser = StatementParser::new(&registry, &other)
            .with_format("inter_brasil", "inter_common")
            .unwrap();
        let pages = vec!["tarifa mensal r$ 9,90".to_string()];
        assert_eq!(parser.detect(&pages).unwrap().mode_key, "inter_common");
        let txns = parser.parse(StatementInput::Pages(pages)).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].institution_id, 35555757);
    }

    #[test]
    fn test_forced_format_must_exist() {
        let registry = FormatRegistry::default();
        let result = StatementParser::new(&registry, &other).with_format("inter_brasil", "mp_bill");
        assert!(matches!(result, Err(Error::UnknownMode { .. })));
    }

    #[test]
    fn test_registry_key_without_extractor() {
        let registry: FormatRegistry = FormatRegistry {
            institutions: vec![crate::registry::InstitutionFormat {
                key: "nubank".to_string(),
                display_name: "Nubank".to_string(),
                modes: vec![crate::registry::ModeTriggers {
                    key: "nu_common".to_string(),
                    triggers: vec!["nu pagamentos".to_string()],
                }],
            }],
        };
        let parser = StatementParser::new(&registry, &other);
        let err = parser
            .parse(StatementInput::Pages(vec!["nu pagamentos s.a.".to_string()]))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownInstitution(k) if k == "nubank"));
    }

    #[test]
    fn test_manual_entry() {
        let registry = FormatRegistry::default();
        let parser = StatementParser::new(&registry, &other);
        let mut manual = entry("05-03-2024", "r$ -45,90");
        manual.counterparty = Some("urban tecnologia e inovacao ltda".to_string());
        manual.method = Some("pix".to_string());
        let txns = parser.parse(StatementInput::Manual(manual)).unwrap();
        assert_eq!(txns.len(), 1);
        let t = &txns[0];
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(t.value, -45.9);
        assert_eq!(t.method, Method::Pix);
        assert_eq!(t.category_name.as_deref(), Some("WAGE"));
        assert_eq!(t.institution_name, "Mercado Pago");
        assert_eq!(t.institution_id, 5968138149);
    }

    #[test]
    fn test_manual_entry_value_without_marker() {
        let resolver = CategoryResolver::new(&other);
        let t = entry("01-01-2024", "1.234,56").into_transaction(&resolver).unwrap();
        assert_eq!(t.value, 1234.56);
        assert_eq!(t.category_name.as_deref(), Some("OTHER"));
    }

    #[test]
    fn test_manual_entry_rejections() {
        let resolver = CategoryResolver::new(&other);
        assert!(matches!(
            entry("2024-03-05", "r$ 1,00").into_transaction(&resolver),
            Err(Error::ParseFailure(_))
        ));
        assert!(matches!(
            entry("05-03-2024", "r$ 0,00").into_transaction(&resolver),
            Err(Error::ParseFailure(_))
        ));
        let mut bad_method = entry("05-03-2024", "r$ 1,00");
        bad_method.method = Some("boleto".to_string());
        assert!(matches!(bad_method.into_transaction(&resolver), Err(Error::ParseFailure(_))));
        let mut bad_bank = entry("05-03-2024", "r$ 1,00");
        bad_bank.institution_key = Some("nubank".to_string());
        assert!(matches!(bad_bank.into_transaction(&resolver), Err(Error::UnknownInstitution(_))));
    }
}
