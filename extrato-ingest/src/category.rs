//! Category resolution: classifier baseline plus counterparty overrides.

use extrato_core::Classifier;

/// Counterparty that receives transfers between the holder's own accounts.
pub const REPASS_IDENTITY: &str = "GUSTAVO RIBEIRO SILVA";

/// Employers; exact counterparty match.
pub const WAGE_IDENTITIES: &[&str] = &["URBAN TECNOLOGIA E INOVACAO LTDA", "JUSCILEY BELEM DE OLIVEIRA"];

/// Family member name fragments; substring match.
pub const FAMILY_NAME_FRAGMENTS: &[&str] = &["SILVIA", "ROSANA", "CELIO", "SILVA", "CAROLINA"];

pub const REPASS: &str = "REPASS";
pub const WAGE: &str = "WAGE";
pub const FAMILY: &str = "FAMILY";

/// Override label for a counterparty, if the override table covers it.
///
/// Precedence: repass identity, then wage identities, then family fragments.
pub fn override_category(counterparty: &str) -> Option<&'static str> {
    if counterparty == REPASS_IDENTITY {
        return Some(REPASS);
    }
    if WAGE_IDENTITIES.contains(&counterparty) {
        return Some(WAGE);
    }
    if FAMILY_NAME_FRAGMENTS.iter().any(|f| counterparty.contains(f)) {
        return Some(FAMILY);
    }
    None
}

/// Combines an injected classifier with the fixed override table
#[derive(Clone, Copy)]
pub struct CategoryResolver<'a> {
    classifier: &'a dyn Classifier,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(classifier: &'a dyn Classifier) -> Self {
        Self { classifier }
    }

    /// Category for one statement line. The classifier always runs; an
    /// override only applies when a counterparty was extracted.
    pub fn resolve(&self, line: &str, counterparty: Option<&str>) -> String {
        let predicted = self.classifier.predict(line);
        counterparty
            .and_then(override_category)
            .map(str::to_string)
            .unwrap_or(predicted)
    }
}

impl std::fmt::Debug for CategoryResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryResolver").finish_non_exhaustive()
    }
}
