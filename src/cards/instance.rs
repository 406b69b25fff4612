//! Board permanents - runtime card state.
//!
//! A `Permanent` is a character or structure occupying a board slot. It
//! keeps the pristine definition alongside the mutable fields gameplay
//! touches: persistent stats (the fields permanent stat edits bake into),
//! current health, the recomputed aura bonus block, and granted abilities.

use serde::{Deserialize, Serialize};

use super::ability::Keyword;
use super::definition::CardDefinition;
use crate::effects::Duration;

/// An ability keyword granted to a permanent.
///
/// `value` only matters for scaling keywords (damage reduction); the rest
/// are presence flags. Printed keyword passives register self-grants here
/// too, so silence can strip everything in one place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrantedAbility {
    pub keyword: Keyword,
    pub value: i32,
    /// Name of the card that granted it.
    pub source: String,
    pub duration: Duration,
}

/// Aura contribution block, zeroed and rebuilt on every recomputation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuraBonus {
    pub attack: i32,
    pub defense: i32,
    pub health: i32,
}

impl AuraBonus {
    /// Reset all contributions to zero.
    pub fn clear(&mut self) {
        *self = AuraBonus::default();
    }
}

/// A permanent occupying a board slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Permanent {
    /// The pristine definition this permanent was played from.
    pub card: CardDefinition,

    /// Persistent attack. Permanent stat edits mutate this directly and
    /// are never revoked, even when their source leaves play.
    pub attack: i32,

    /// Persistent defense.
    pub defense: i32,

    /// Persistent maximum health (before modifiers, equipment and auras).
    pub health: i32,

    /// Remaining health. Only `heal` effects restore it; cap changes clamp
    /// it downward but never raise it.
    pub current_health: i32,

    /// Aura-derived bonuses, recomputed from scratch after board changes.
    #[serde(default)]
    pub aura: AuraBonus,

    /// Granted ability keywords.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub granted: Vec<GrantedAbility>,

    /// A silenced permanent has no abilities, printed or granted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub silenced: bool,

    /// Characters cannot attack the turn they enter play unless hasty.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub summoning_sickness: bool,
}

impl Permanent {
    /// Create a permanent entering play from its definition.
    #[must_use]
    pub fn enters(card: CardDefinition) -> Self {
        let stats = card.stats;
        Self {
            card,
            attack: stats.attack,
            defense: stats.defense,
            health: stats.health,
            current_health: stats.health,
            aura: AuraBonus::default(),
            granted: Vec::new(),
            silenced: false,
            summoning_sickness: true,
        }
    }

    /// The card's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.card.name
    }

    /// Does this permanent have the given granted keyword?
    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.granted.iter().any(|g| g.keyword == keyword)
    }

    /// Total damage reduction from granted keywords.
    #[must_use]
    pub fn damage_reduction(&self) -> i32 {
        self.granted
            .iter()
            .filter(|g| g.keyword == Keyword::DamageReduction)
            .map(|g| g.value)
            .sum()
    }

    /// Record a granted keyword and apply its immediate capability.
    pub fn grant(&mut self, granted: GrantedAbility) {
        if granted.keyword == Keyword::Haste {
            self.summoning_sickness = false;
        }
        self.granted.push(granted);
    }

    /// Drop granted keywords that expire at end of turn.
    pub fn sweep_temporary_grants(&mut self) {
        self.granted.retain(|g| g.duration == Duration::Permanent);
    }

    /// Strip every granted keyword (silence).
    pub fn clear_granted(&mut self) {
        self.granted.clear();
    }

    /// Is the permanent dead?
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current_health <= 0
    }
}
