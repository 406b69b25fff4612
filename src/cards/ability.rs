//! The structured ability model.
//!
//! Every ability is one of four kinds: passive (always on), triggered
//! (fires on a named game event), activated (the player invokes it, often
//! with a cost or a once-per-turn limit), or aura (a continuous area bonus
//! recomputed from board membership).
//!
//! Card data comes in two formats: the structured one declares `type`,
//! `trigger` and `effects` explicitly; legacy cards only carry free text in
//! `text`. Classification prefers the structured fields and falls back to
//! the legacy adapter (`cards::legacy`) otherwise.

use serde::{Deserialize, Serialize};

use crate::effects::EffectDef;

/// Explicit ability kind discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    Passive,
    Triggered,
    Activated,
    Aura,
}

/// The canonical trigger set.
///
/// One list entry per named game event the dispatcher knows. There is no
/// priority system; entries fire in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerName {
    OnEnterPlay,
    OnLeavePlay,
    OnAttack,
    OnDefend,
    OnDamageDealt,
    OnDamageTaken,
    OnTurnStart,
    OnTurnEnd,
    OnSpellPlayed,
    OnStructureBuilt,
    OnCardDrawn,
    OnDeath,
}

impl TriggerName {
    /// Map a raw trigger name to the canonical set.
    ///
    /// This is the fixed lookup table covering every spelling that has
    /// appeared in card data. Returns `None` for unrecognized names; the
    /// registry logs those and treats the ability as inert.
    #[must_use]
    pub fn from_name(name: &str) -> Option<TriggerName> {
        let trigger = match name {
            "on_play" | "on_enter_play" | "onEnterPlay" => TriggerName::OnEnterPlay,
            "on_leave_play" | "onLeavePlay" => TriggerName::OnLeavePlay,
            "on_attack" | "onAttack" => TriggerName::OnAttack,
            "on_defend" | "onDefend" => TriggerName::OnDefend,
            "on_damage_dealt" | "onDamageDealt" => TriggerName::OnDamageDealt,
            "on_damage_taken" | "onDamageTaken" => TriggerName::OnDamageTaken,
            "turn_start" | "start_of_turn" | "on_turn_start" | "onTurnStart" => {
                TriggerName::OnTurnStart
            }
            "turn_end" | "end_of_turn" | "on_turn_end" | "onTurnEnd" => TriggerName::OnTurnEnd,
            "on_spell_played" | "spell_played" | "onSpellPlayed" => TriggerName::OnSpellPlayed,
            "on_structure_built" | "structure_built" | "onStructureBuilt" => {
                TriggerName::OnStructureBuilt
            }
            "on_card_drawn" | "onCardDrawn" => TriggerName::OnCardDrawn,
            "on_death" | "death" | "onDeath" => TriggerName::OnDeath,
            _ => return None,
        };
        Some(trigger)
    }

    /// The canonical snake_case spelling, as written in card data.
    #[must_use]
    pub const fn canonical_name(self) -> &'static str {
        match self {
            TriggerName::OnEnterPlay => "on_enter_play",
            TriggerName::OnLeavePlay => "on_leave_play",
            TriggerName::OnAttack => "on_attack",
            TriggerName::OnDefend => "on_defend",
            TriggerName::OnDamageDealt => "on_damage_dealt",
            TriggerName::OnDamageTaken => "on_damage_taken",
            TriggerName::OnTurnStart => "on_turn_start",
            TriggerName::OnTurnEnd => "on_turn_end",
            TriggerName::OnSpellPlayed => "on_spell_played",
            TriggerName::OnStructureBuilt => "on_structure_built",
            TriggerName::OnCardDrawn => "on_card_drawn",
            TriggerName::OnDeath => "on_death",
        }
    }

    /// Is this raw name a continuous marker rather than an event?
    ///
    /// Abilities declared `triggered` with trigger `always` (or
    /// `while_in_zone`) are static: their effects apply once at
    /// registration and stay.
    #[must_use]
    pub fn is_continuous_marker(name: &str) -> bool {
        matches!(name, "always" | "while_in_zone" | "conditional")
    }
}

/// Grantable ability keywords.
///
/// Known grants set a capability consumed by movement/attack legality
/// checks: haste clears summoning sickness, stealth hides the creature,
/// flying and reach let it hit the back line, free movement waives the line
/// change cost, damage reduction shaves incoming damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Haste,
    Stealth,
    Flying,
    Reach,
    FreeMovement,
    DamageReduction,
}

/// Usage limits on activated abilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageLimit {
    OncePerTurn,
}

/// A declared ability on a card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Ability name (display/debugging).
    pub name: String,

    /// Explicit kind. Absent on legacy text-only cards.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AbilityKind>,

    /// Raw trigger name for triggered abilities. Kept as a string so an
    /// unknown name degrades to an inert ability instead of a load failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,

    /// Structured effect list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<EffectDef>,

    /// Energy cost for activated abilities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i32>,

    /// Usage limit for activated abilities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<UsageLimit>,

    /// Legacy free-text description (the old Italian card wording).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl AbilityDefinition {
    /// Create a structured ability of the given kind.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: AbilityKind) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind),
            trigger: None,
            effects: Vec::new(),
            cost: None,
            limit: None,
            text: None,
        }
    }

    /// Create a legacy text-only ability.
    #[must_use]
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            trigger: None,
            effects: Vec::new(),
            cost: None,
            limit: None,
            text: Some(text.into()),
        }
    }

    /// Set the trigger name (builder pattern).
    #[must_use]
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    /// Add an effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: EffectDef) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set the activation cost (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Limit to once per turn (builder pattern).
    #[must_use]
    pub fn once_per_turn(mut self) -> Self {
        self.limit = Some(UsageLimit::OncePerTurn);
        self
    }
}
