//! Institution-specific statement extractors.

pub mod inter_brasil;
pub mod mercado_pago;

use std::sync::OnceLock;

use extrato_core::{Error, Result, Transaction};
use regex::Regex;

use crate::cards::CardCache;
use crate::category::CategoryResolver;
use crate::registry::{Detection, FormatRegistry};
use crate::state::{ExtractorState, Mode};

/// Account holder's full name as printed on statements; it closes the bill block.
pub const ACCOUNT_HOLDER: &str = "gustavo ribeiro silva";

/// Collaborators and settings shared by every line of one run
pub struct ExtractContext<'a> {
    pub mode: Mode,
    pub resolver: CategoryResolver<'a>,
    pub cards: CardCache<'a>,
    /// Year given to bare "DD/MM" dates
    pub current_year: i32,
}

/// Institutions with a statement extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Institution {
    InterBrasil,
    MercadoPago,
}

const ALL_INSTITUTIONS: &[Institution] = &[Institution::InterBrasil, Institution::MercadoPago];

impl Institution {
    pub fn key(&self) -> &'static str {
        match self {
            Self::InterBrasil => "inter_brasil",
            Self::MercadoPago => "mercado_pago",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::InterBrasil => "Inter Brasil",
            Self::MercadoPago => "Mercado Pago",
        }
    }

    /// Fixed institution id written on every record
    pub fn id(&self) -> i64 {
        match self {
            Self::InterBrasil => inter_brasil::INSTITUTION_ID,
            Self::MercadoPago => mercado_pago::INSTITUTION_ID,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ALL_INSTITUTIONS.iter().find(|i| i.key() == key).copied()
    }

    /// Modes this extractor understands, by registry mode key
    pub fn modes(&self) -> &'static [(&'static str, Mode)] {
        match self {
            Self::InterBrasil => &[("inter_bill", Mode::Bill), ("inter_common", Mode::Common)],
            Self::MercadoPago => &[("mp_bill", Mode::Bill), ("mp_common", Mode::Common)],
        }
    }

    pub fn mode(&self, mode_key: &str) -> Option<Mode> {
        self.modes()
            .iter()
            .find(|(key, _)| *key == mode_key)
            .map(|(_, mode)| *mode)
    }

    /// Map a registry detection onto an extractor variant and mode.
    pub fn resolve(detection: &Detection) -> Result<(Self, Mode)> {
        let institution = Self::from_key(&detection.institution_key)
            .ok_or_else(|| Error::UnknownInstitution(detection.institution_key.clone()))?;
        let mode = institution.mode(&detection.mode_key).ok_or_else(|| Error::UnknownMode {
            institution: detection.institution_key.clone(),
            mode: detection.mode_key.clone(),
        })?;
        Ok((institution, mode))
    }

    /// Detect the format of `text` and resolve it to an extractor.
    pub fn detect(registry: &FormatRegistry, text: &str) -> Result<(Self, Mode)> {
        Self::resolve(&registry.detect(text)?)
    }

    /// Split the lowercased statement text into logical lines for `mode`.
    pub fn reconstruct(&self, text: &str, mode: Mode) -> Vec<String> {
        match self {
            Self::InterBrasil => text.split('\n').map(str::to_string).collect(),
            Self::MercadoPago => mercado_pago::logical_lines(text, mode),
        }
    }

    /// Run the per-line extraction steps, mutating `state`.
    pub fn extract_line(&self, state: &mut ExtractorState, line: &str, ctx: &mut ExtractContext<'_>) {
        match self {
            Self::InterBrasil => inter_brasil::extract_line(state, line, ctx),
            Self::MercadoPago => mercado_pago::extract_line(state, line, ctx),
        }
    }

    /// Emit the current candidate if acceptable and reset per-line fields.
    pub fn finalize(&self, state: &mut ExtractorState, mode: Mode) -> Option<Transaction> {
        state.finalize(mode, self.id(), self.display_name())
    }
}

fn four_digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}").expect("four digits regex"))
}

/// Non-overlapping 4-digit groups of a masked card line, left to right.
pub(crate) fn four_digit_groups(line: &str) -> Vec<&str> {
    four_digits_re().find_iter(line).map(|m| m.as_str()).collect()
}
