//! Statement format registry and keyword detection.
//!
//! The registry is an ordered list: institutions in declaration order, modes
//! in declaration order within an institution, triggers in order within a
//! mode. The first trigger found anywhere in the statement text wins.

use extrato_core::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatRegistry {
    #[serde(rename = "institution", default)]
    pub institutions: Vec<InstitutionFormat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionFormat {
    pub key: String,
    pub display_name: String,
    #[serde(rename = "mode", default)]
    pub modes: Vec<ModeTriggers>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeTriggers {
    pub key: String,
    pub triggers: Vec<String>,
}

/// Result of format detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub institution_key: String,
    pub display_name: String,
    pub mode_key: String,
}

impl FormatRegistry {
    /// Find the first `(institution, mode)` whose trigger occurs in `text`.
    ///
    /// `text` is expected lowercased; triggers are lowercased before matching.
    pub fn detect(&self, text: &str) -> Result<Detection> {
        for institution in &self.institutions {
            for mode in &institution.modes {
                let hit = mode
                    .triggers
                    .iter()
                    .filter(|t| !t.trim().is_empty())
                    .any(|t| text.contains(&t.to_lowercase()));
                if hit {
                    return Ok(Detection {
                        institution_key: institution.key.clone(),
                        display_name: institution.display_name.clone(),
                        mode_key: mode.key.clone(),
                    });
                }
            }
        }
        Err(Error::FormatNotRecognized)
    }

    /// Look up a `(institution, mode)` pair by key without scanning any text.
    pub fn lookup(&self, institution_key: &str, mode_key: &str) -> Result<Detection> {
        let institution = self
            .institutions
            .iter()
            .find(|i| i.key == institution_key)
            .ok_or_else(|| Error::UnknownInstitution(institution_key.to_string()))?;

        if !institution.modes.iter().any(|m| m.key == mode_key) {
            return Err(Error::UnknownMode {
                institution: institution_key.to_string(),
                mode: mode_key.to_string(),
            });
        }

        Ok(Detection {
            institution_key: institution.key.clone(),
            display_name: institution.display_name.clone(),
            mode_key: mode_key.to_string(),
        })
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        fn mode(key: &str, triggers: &[&str]) -> ModeTriggers {
            ModeTriggers {
                key: key.to_string(),
                triggers: triggers.iter().map(|t| t.to_string()).collect(),
            }
        }

        Self {
            institutions: vec![
                InstitutionFormat {
                    key: "inter_brasil".to_string(),
                    display_name: "Inter Brasil".to_string(),
                    modes: vec![
                        mode("inter_bill", &["despesas da fatura"]),
                        mode("inter_common", &["banco inter", "inter.co"]),
                    ],
                },
                InstitutionFormat {
                    key: "mercado_pago".to_string(),
                    display_name: "Mercado Pago".to_string(),
                    modes: vec![
                        mode("mp_bill", &["movimentacoes na fatura"]),
                        mode("mp_common", &["mercado pago", "detalhe dos movimentos"]),
                    ],
                },
            ],
        }
    }
}
