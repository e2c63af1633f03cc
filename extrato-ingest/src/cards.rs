//! Per-run cache over the optional card directory.

use extrato_core::CardDirectory;

/// Queries the directory at most once per statement; a failed lookup is
/// remembered so the pipeline can report it, and the run degrades to no
/// card ids.
pub struct CardCache<'a> {
    directory: Option<&'a dyn CardDirectory>,
    cards: Option<Vec<i64>>,
    error: Option<String>,
}

impl<'a> CardCache<'a> {
    pub fn new(directory: Option<&'a dyn CardDirectory>) -> Self {
        Self {
            directory,
            cards: None,
            error: None,
        }
    }

    /// Known card ids in directory order, loading them on first use.
    pub fn cards(&mut self) -> Option<&[i64]> {
        let directory = self.directory?;
        if self.error.is_some() {
            return None;
        }
        if self.cards.is_none() {
            match directory.list_cards() {
                Ok(cards) => self.cards = Some(cards),
                Err(e) => {
                    self.error = Some(e.to_string());
                    return None;
                }
            }
        }
        self.cards.as_deref()
    }

    /// First card whose number starts with `first_four` and ends with `last_four`.
    pub fn match_masked(&mut self, first_four: &str, last_four: &str) -> Option<i64> {
        self.cards()?
            .iter()
            .copied()
            .find(|id| {
                let number = id.to_string();
                number.starts_with(first_four) && number.ends_with(last_four)
            })
    }

    /// First card whose number ends with `last_four`.
    pub fn match_last_four(&mut self, last_four: &str) -> Option<i64> {
        self.cards()?
            .iter()
            .copied()
            .find(|id| id.to_string().ends_with(last_four))
    }

    /// Error from the directory, if the lookup failed during this run.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
