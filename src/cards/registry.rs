//! Card registry - the loaded card database.
//!
//! Definitions are keyed by name because deck lists and the rest of the
//! game data reference cards by name. Both the structured format and the
//! legacy text format load here; legacy cards pass through the
//! `cards::legacy` adapter so everything downstream is structured.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use super::definition::CardDefinition;
use super::legacy::{self, LegacyCard};
use crate::error::DataError;

/// One line of a deck list: a card name and how many copies.
#[derive(Clone, Debug, Deserialize)]
pub struct DeckEntry {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Name-keyed card definition store.
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<String, CardDefinition>,
}

impl CardRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any previous card with the name.
    pub fn register(&mut self, card: CardDefinition) {
        self.cards.insert(card.name.clone(), card);
    }

    /// Look up a card by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.get(name)
    }

    /// Number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Is the registry empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    /// Load a structured card database (a JSON array of definitions).
    pub fn load_json(&mut self, json: &str) -> Result<usize, DataError> {
        let cards: Vec<CardDefinition> = serde_json::from_str(json)?;
        let count = cards.len();
        for card in cards {
            self.register(card);
        }
        Ok(count)
    }

    /// Load a legacy card database (a JSON array in the old shape).
    pub fn load_legacy_json(&mut self, json: &str) -> Result<usize, DataError> {
        let cards: Vec<LegacyCard> = serde_json::from_str(json)?;
        let count = cards.len();
        for card in &cards {
            self.register(legacy::translate_card(card));
        }
        Ok(count)
    }

    /// Expand a deck list into a pile of card definitions.
    ///
    /// Fails on the first unknown name so a typo in a deck file surfaces
    /// at load time, not mid-game.
    pub fn build_deck(&self, entries: &[DeckEntry]) -> Result<Vec<CardDefinition>, DataError> {
        let mut deck = Vec::new();
        for entry in entries {
            let card = self
                .get(&entry.name)
                .ok_or_else(|| DataError::UnknownCard(entry.name.clone()))?;
            for _ in 0..entry.quantity {
                deck.push(card.clone());
            }
        }
        Ok(deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardKind, Element};

    #[test]
    fn test_register_and_get() {
        let mut registry = CardRegistry::new();
        registry.register(CardDefinition::new("Kaira", CardKind::Character, 5));

        assert_eq!(registry.len(), 1);
        assert!(registry.get("Kaira").is_some());
        assert!(registry.get("Vulkan").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = CardRegistry::new();
        registry.register(CardDefinition::new("Kaira", CardKind::Character, 5));
        registry.register(CardDefinition::new("Kaira", CardKind::Character, 4));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Kaira").unwrap().cost, 4);
    }

    #[test]
    fn test_load_json() {
        let mut registry = CardRegistry::new();
        let json = r#"[
            {"name": "Palla di Fuoco", "type": "Spell", "cost": 3},
            {"name": "Guardia", "type": "Character", "cost": 2,
             "stats": {"attack": 2, "defense": 3, "health": 4},
             "element": "Fire"}
        ]"#;

        assert_eq!(registry.load_json(json).unwrap(), 2);
        assert_eq!(registry.get("Guardia").unwrap().element, Some(Element::Fire));
    }

    #[test]
    fn test_load_json_malformed() {
        let mut registry = CardRegistry::new();
        assert!(registry.load_json("{not a list}").is_err());
    }

    #[test]
    fn test_load_legacy_json() {
        let mut registry = CardRegistry::new();
        let json = r#"[
            {"name": "Recluta di Emberhold", "type": "Personaggio", "cost": 1,
             "attack": 1, "defense": 1, "health": 2, "class": "Guerriero",
             "element": "Fuoco"}
        ]"#;

        assert_eq!(registry.load_legacy_json(json).unwrap(), 1);
        let card = registry.get("Recluta di Emberhold").unwrap();
        assert_eq!(card.kind, CardKind::Character);
        assert_eq!(card.stats.health, 2);
    }

    #[test]
    fn test_build_deck() {
        let mut registry = CardRegistry::new();
        registry.register(CardDefinition::new("Guardia", CardKind::Character, 2));

        let deck = registry
            .build_deck(&[DeckEntry { name: "Guardia".into(), quantity: 2 }])
            .unwrap();
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn test_build_deck_unknown_card() {
        let registry = CardRegistry::new();
        let err = registry
            .build_deck(&[DeckEntry { name: "Fantasma".into(), quantity: 1 }])
            .unwrap_err();

        assert!(matches!(err, DataError::UnknownCard(name) if name == "Fantasma"));
    }
}
