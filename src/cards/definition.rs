//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card template:
//! "Palla di Fuoco" costs 3 and deals 4 damage - that is part of the
//! definition. Runtime state (damage taken, granted abilities, zone) lives
//! in `Permanent`.

use serde::{Deserialize, Serialize};

use super::ability::AbilityDefinition;
use crate::core::Zone;

/// The four card kinds of Lirya.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Character,
    Spell,
    Structure,
    Equipment,
}

impl CardKind {
    /// Does this kind occupy a board slot when played?
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self, CardKind::Character | CardKind::Structure)
    }
}

/// Character classes. The class decides the line a character deploys to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardClass {
    Warrior,
    Mage,
    Ranger,
    Cleric,
}

impl CardClass {
    /// The line this class deploys to: warriors up front, everyone else behind.
    #[must_use]
    pub const fn home_zone(self) -> Zone {
        match self {
            CardClass::Warrior => Zone::FrontLine,
            CardClass::Mage | CardClass::Ranger | CardClass::Cleric => Zone::BackLine,
        }
    }
}

/// The six elements of Lirya.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Water,
    Earth,
    Air,
    Light,
    Shadow,
}

/// Card rarity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// Printed stats of a card.
///
/// Spells carry all zeroes; equipment stats are the bonuses it confers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub health: i32,
}

impl BaseStats {
    /// Create a stat block.
    #[must_use]
    pub const fn new(attack: i32, defense: i32, health: i32) -> Self {
        Self { attack, defense, health }
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use lirya_ccg::cards::{CardDefinition, CardKind, CardClass, Element};
///
/// let card = CardDefinition::new("Guardia della Fornace", CardKind::Character, 2)
///     .with_stats(2, 3, 4)
///     .with_class(CardClass::Warrior)
///     .with_element(Element::Fire);
///
/// assert_eq!(card.stats.health, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Card name. Decks and registries reference cards by name.
    pub name: String,

    /// Card kind.
    #[serde(rename = "type")]
    pub kind: CardKind,

    /// Energy cost to play.
    #[serde(default)]
    pub cost: i32,

    /// Printed stats.
    #[serde(default)]
    pub stats: BaseStats,

    /// Character class, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<CardClass>,

    /// Element, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,

    /// Rarity.
    #[serde(default)]
    pub rarity: Rarity,

    /// Declared abilities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<AbilityDefinition>,
}

impl CardDefinition {
    /// Create a new card definition.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CardKind, cost: i32) -> Self {
        Self {
            name: name.into(),
            kind,
            cost,
            stats: BaseStats::default(),
            class: None,
            element: None,
            rarity: Rarity::Common,
            abilities: Vec::new(),
        }
    }

    /// Set the printed stats (builder pattern).
    #[must_use]
    pub fn with_stats(mut self, attack: i32, defense: i32, health: i32) -> Self {
        self.stats = BaseStats::new(attack, defense, health);
        self
    }

    /// Set the class (builder pattern).
    #[must_use]
    pub fn with_class(mut self, class: CardClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Set the element (builder pattern).
    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    /// Set the rarity (builder pattern).
    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    /// Add an ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, ability: AbilityDefinition) -> Self {
        self.abilities.push(ability);
        self
    }

    /// The zone this card deploys to when played.
    ///
    /// Characters go to their class line (front when classless), structures
    /// to the structure row. Spells and equipment never occupy a slot.
    #[must_use]
    pub fn deploy_zone(&self) -> Option<Zone> {
        match self.kind {
            CardKind::Character => {
                Some(self.class.map_or(Zone::FrontLine, CardClass::home_zone))
            }
            CardKind::Structure => Some(Zone::Structures),
            CardKind::Spell | CardKind::Equipment => None,
        }
    }
}
