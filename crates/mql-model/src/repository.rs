//! The opaque synchronous card store the engine scans

use crate::Card;
use mql_diagnostics::Result;

/// Synchronous scan interface over a backing card store.
///
/// The engine performs one bulk `scan` per evaluation and reduces in
/// memory; it never retries, and a failure propagates to the caller
/// unchanged.
pub trait CardRepository {
    /// All cards, in one bulk fetch
    fn scan(&self) -> Result<Vec<&Card>>;

    /// Find a card by number
    fn find_by_number(&self, number: u64) -> Result<Option<&Card>> {
        Ok(self.scan()?.into_iter().find(|card| card.number == number))
    }

    /// Find cards by name (case-insensitive); may match more than one
    fn find_by_name(&self, name: &str) -> Result<Vec<&Card>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|card| card.name.eq_ignore_ascii_case(name))
            .collect())
    }
}

/// In-memory card store
#[derive(Debug, Clone, Default)]
pub struct InMemoryCards {
    cards: Vec<Card>,
}

impl InMemoryCards {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card
    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }

    /// Add a card in place
    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }
}

impl CardRepository for InMemoryCards {
    fn scan(&self) -> Result<Vec<&Card>> {
        Ok(self.cards.iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_run_over_a_scan() {
        let store = InMemoryCards::new()
            .with_card(Card::new(1, "First", "Story"))
            .with_card(Card::new(2, "Second", "Story"))
            .with_card(Card::new(3, "second", "Bug"));
        assert_eq!(store.find_by_number(2).unwrap().unwrap().name, "Second");
        assert!(store.find_by_number(9).unwrap().is_none());
        assert_eq!(store.find_by_name("SECOND").unwrap().len(), 2);
    }
}
