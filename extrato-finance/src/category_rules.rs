//! Deterministic keyword rules mapping statement lines to spending categories.
//!
//! Stands in for a trained text classifier: same `predict(line) -> label`
//! contract, no model file needed.

use extrato_core::Classifier;

pub const FOOD: &str = "FOOD";
pub const TRANSPORT: &str = "TRANSPORT";
pub const SUBSCRIPTIONS: &str = "SUBSCRIPTIONS";
pub const HEALTH: &str = "HEALTH";
pub const HOUSING: &str = "HOUSING";
pub const SHOPPING: &str = "SHOPPING";
pub const INVESTMENT: &str = "INVESTMENT";
pub const FEES: &str = "FEES";
pub const TRANSFER: &str = "TRANSFER";
pub const OTHER: &str = "OTHER";

/// Keyword classifier over raw statement lines
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for KeywordClassifier {
    fn predict(&self, text: &str) -> String {
        categorize(text).to_string()
    }
}

/// Category label for one statement line.
/// Priority: merchant keywords > operation keywords > OTHER.
pub fn categorize(line: &str) -> &'static str {
    let desc = line.to_uppercase();

    // Subscriptions (known services)
    if desc.contains("NETFLIX") || desc.contains("SPOTIFY")
        || desc.contains("YOUTUBE") || desc.contains("GYMPASS")
        || desc.contains("WELLHUB") || desc.contains("AMAZON PRIME")
        || desc.contains("DISNEY") || desc.contains("APPLE.COM/BILL")
        || desc.contains("GOOGLE ONE") || desc.contains("HBO")
    {
        return SUBSCRIPTIONS;
    }

    // Food & groceries
    if desc.contains("SUPERMERCADO") || desc.contains("MERCADO ")
        || desc.contains("PADARIA") || desc.contains("RESTAURANTE")
        || desc.contains("LANCHONETE") || desc.contains("IFOOD")
        || desc.contains("ACOUGUE") || desc.contains("AÇOUGUE")
        || desc.contains("HORTIFRUTI") || desc.contains("PIZZARIA")
    {
        return FOOD;
    }

    // Transport
    if desc.contains("UBER") || desc.contains("99APP") || desc.contains("99 POP")
        || desc.contains("POSTO") || desc.contains("COMBUSTIVEL")
        || desc.contains("ESTACIONAMENTO") || desc.contains("PEDAGIO")
        || desc.contains("METRO") || desc.contains("ONIBUS")
    {
        return TRANSPORT;
    }

    // Health
    if desc.contains("FARMACIA") || desc.contains("FARMÁCIA")
        || desc.contains("DROGARIA") || desc.contains("DROGASIL")
        || desc.contains("HOSPITAL") || desc.contains("CLINICA")
        || desc.contains("LABORATORIO") || desc.contains("ODONTO")
    {
        return HEALTH;
    }

    // Housing / utilities
    if desc.contains("ALUGUEL") || desc.contains("CONDOMINIO")
        || desc.contains("ENERGIA") || desc.contains("SANEAMENTO")
        || desc.contains("INTERNET") || desc.contains("TELEFONIA")
    {
        return HOUSING;
    }

    if desc.contains("MAGAZINE") || desc.contains("SHOPEE")
        || desc.contains("MERCADOLIVRE") || desc.contains("MERCADO LIVRE")
        || desc.contains("AMAZON") || desc.contains("LOJA")
    {
        return SHOPPING;
    }

    // --- Operation keywords ---

    if desc.contains("RENDIMENTO") || desc.contains("CDB")
        || desc.contains("APLICACAO") || desc.contains("APLICAÇÃO")
        || desc.contains("RESGATE") || desc.contains("INVESTIMENTO")
    {
        return INVESTMENT;
    }

    if desc.contains("TARIFA") || desc.contains("ANUIDADE")
        || desc.contains("IOF") || desc.contains("JUROS") || desc.contains("MULTA")
    {
        return FEES;
    }

    if desc.contains("PIX") || desc.contains("TRANSFERENCIA") || desc.contains("TRANSFERÊNCIA")
        || desc.contains("TED") || desc.contains("DOC ")
    {
        return TRANSFER;
    }

    OTHER
}
