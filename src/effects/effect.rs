//! Effect definitions - the card effect DSL.
//!
//! Effects are the atomic instructions of card abilities. Each one names
//! what it does (`type` tag), what it aims at (a target specifier plus an
//! optional filter), how much (`value`), and how long (`duration`). The
//! interpreter in `abilities::engine` executes them against resolved
//! targets.
//!
//! The enum is internally serde-tagged, so the JSON wire format matches
//! card data written as `{"type": "damage", "value": 3, "target": "..."}`.

use serde::{Deserialize, Serialize};

use crate::cards::{CardClass, Element, Keyword};
use crate::core::{GameState, PlayerId, Zone};

use super::targeting::{TargetFilter, TargetSpec};

/// Which stat a modifier touches. `Both` is the +1/+1 style bonus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Attack,
    Defense,
    Health,
    Both,
}

/// How long an effect's contribution lasts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    #[default]
    Permanent,
    UntilEndOfTurn,
}

/// Countable board and hand quantities, always measured from the effect
/// controller's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountSubject {
    AlliedCreatures,
    EnemyCreatures,
    AlliedStructures,
    EnemyStructures,
    AlliedBackLine,
    EnemyBackLine,
    CardsInHand,
}

impl CountSubject {
    /// Evaluate the count for the given controller.
    #[must_use]
    pub fn count(self, state: &GameState, controller: PlayerId) -> i32 {
        let enemy = controller.opponent();
        let n = match self {
            CountSubject::AlliedCreatures => state.creatures_of(controller).len(),
            CountSubject::EnemyCreatures => state.creatures_of(enemy).len(),
            CountSubject::AlliedStructures => state.structures_of(controller).len(),
            CountSubject::EnemyStructures => state.structures_of(enemy).len(),
            CountSubject::AlliedBackLine => state.occupied_in(controller, Zone::BackLine).len(),
            CountSubject::EnemyBackLine => state.occupied_in(enemy, Zone::BackLine).len(),
            CountSubject::CardsInHand => state.player(controller).hand.len(),
        };
        n as i32
    }
}

/// Comparison operator for conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    AtLeast,
    AtMost,
    Exactly,
}

impl Comparator {
    fn holds(self, actual: i32, expected: i32) -> bool {
        match self {
            Comparator::AtLeast => actual >= expected,
            Comparator::AtMost => actual <= expected,
            Comparator::Exactly => actual == expected,
        }
    }
}

/// A comparator over board/hand counts, gating an effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectCondition {
    /// The count compares against a constant.
    Count {
        subject: CountSubject,
        cmp: Comparator,
        value: i32,
    },
    /// The controller's count exceeds the opponent's for the same subject,
    /// e.g. "if your opponent has more cards in hand".
    MoreThanOpponent { subject: CountSubject },
}

impl EffectCondition {
    /// Evaluate the condition for the given controller.
    #[must_use]
    pub fn is_met(&self, state: &GameState, controller: PlayerId) -> bool {
        match self {
            EffectCondition::Count { subject, cmp, value } => {
                cmp.holds(subject.count(state, controller), *value)
            }
            EffectCondition::MoreThanOpponent { subject } => {
                subject.count(state, controller) > subject.count(state, controller.opponent())
            }
        }
    }
}

/// Blueprint of a summoned token creature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    pub health: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<CardClass>,
}

fn one() -> i32 {
    1
}

/// An atomic card effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectDef {
    /// Change a creature's stats. Permanent modifiers bake into the
    /// permanent's persistent stats; temporary ones are swept at end of
    /// turn. `per` scales the value by a board count (e.g. "+1 per enemy
    /// structure").
    StatModifier {
        stat: StatKind,
        value: i32,
        target: TargetSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<TargetFilter>,
        #[serde(default)]
        duration: Duration,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<EffectCondition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        per: Option<CountSubject>,
    },

    /// Deal damage to creatures or players.
    Damage {
        value: i32,
        target: TargetSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<TargetFilter>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<EffectCondition>,
    },

    /// Restore health, capped at the effective maximum (20 for players).
    Heal {
        value: i32,
        target: TargetSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<TargetFilter>,
    },

    /// The controller draws cards. Drawing from an empty deck is a no-op.
    DrawCard {
        #[serde(default = "one")]
        value: i32,
    },

    /// The controller gains energy, capped at their energy maximum.
    GainEnergy {
        #[serde(default = "one")]
        value: i32,
    },

    /// Grant an ability keyword to creatures.
    AbilityGrant {
        ability: Keyword,
        target: TargetSpec,
        #[serde(default = "one")]
        value: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<TargetFilter>,
        #[serde(default)]
        duration: Duration,
    },

    /// Reduce the controller's card costs while the source remains in play.
    CostReduction {
        #[serde(default = "one")]
        value: i32,
        #[serde(default)]
        duration: Duration,
    },

    /// Summon a token creature onto the controller's side. Fails silently
    /// when the destination zone is full.
    SummonToken {
        token: TokenSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zone: Option<Zone>,
    },

    /// Strip a creature of its abilities, granted and printed alike.
    Silence {
        target: TargetSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<TargetFilter>,
    },

    /// Destroy permanents outright.
    Destroy {
        target: TargetSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<TargetFilter>,
    },

    /// Return a permanent to its owner's hand.
    ReturnToHand { target: TargetSpec },

    /// Move an allied permanent to another line.
    MoveCard { target: TargetSpec, zone: Zone },

    /// Reveal the top cards of the controller's deck.
    LookAtCards {
        #[serde(default = "one")]
        value: i32,
    },
}

impl EffectDef {
    /// Create a damage effect.
    #[must_use]
    pub fn damage(value: i32, target: TargetSpec) -> Self {
        Self::Damage { value, target, filter: None, condition: None }
    }

    /// Create a heal effect.
    #[must_use]
    pub fn heal(value: i32, target: TargetSpec) -> Self {
        Self::Heal { value, target, filter: None }
    }

    /// Create a draw effect.
    #[must_use]
    pub fn draw_card(value: i32) -> Self {
        Self::DrawCard { value }
    }

    /// Create a gain-energy effect.
    #[must_use]
    pub fn gain_energy(value: i32) -> Self {
        Self::GainEnergy { value }
    }

    /// Create a permanent stat modifier.
    #[must_use]
    pub fn stat_modifier(stat: StatKind, value: i32, target: TargetSpec) -> Self {
        Self::StatModifier {
            stat,
            value,
            target,
            filter: None,
            duration: Duration::Permanent,
            condition: None,
            per: None,
        }
    }

    /// Create an until-end-of-turn stat modifier.
    #[must_use]
    pub fn temporary_modifier(stat: StatKind, value: i32, target: TargetSpec) -> Self {
        Self::StatModifier {
            stat,
            value,
            target,
            filter: None,
            duration: Duration::UntilEndOfTurn,
            condition: None,
            per: None,
        }
    }

    /// Create a keyword grant.
    #[must_use]
    pub fn grant(ability: Keyword, target: TargetSpec) -> Self {
        Self::AbilityGrant {
            ability,
            target,
            value: 1,
            filter: None,
            duration: Duration::Permanent,
        }
    }

    /// Attach a target filter (builder pattern). No-op on effects that do
    /// not take a filter.
    #[must_use]
    pub fn with_filter(mut self, new: TargetFilter) -> Self {
        match &mut self {
            EffectDef::StatModifier { filter, .. }
            | EffectDef::Damage { filter, .. }
            | EffectDef::Heal { filter, .. }
            | EffectDef::AbilityGrant { filter, .. }
            | EffectDef::Silence { filter, .. }
            | EffectDef::Destroy { filter, .. } => *filter = Some(new),
            _ => {}
        }
        self
    }

    /// The target specifier, for effects that have one.
    #[must_use]
    pub fn target(&self) -> Option<TargetSpec> {
        match self {
            EffectDef::StatModifier { target, .. }
            | EffectDef::Damage { target, .. }
            | EffectDef::Heal { target, .. }
            | EffectDef::AbilityGrant { target, .. }
            | EffectDef::Silence { target, .. }
            | EffectDef::Destroy { target, .. }
            | EffectDef::ReturnToHand { target }
            | EffectDef::MoveCard { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Does resolving this effect require a player-chosen target?
    #[must_use]
    pub fn needs_choice(&self) -> bool {
        self.target().is_some_and(TargetSpec::needs_choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_deserialization() {
        let json = r#"{"type": "damage", "value": 4, "target": "random_enemy"}"#;
        let effect: EffectDef = serde_json::from_str(json).unwrap();

        assert_eq!(effect, EffectDef::damage(4, TargetSpec::RandomEnemy));
    }

    #[test]
    fn test_stat_modifier_defaults() {
        let json = r#"{"type": "stat_modifier", "stat": "both", "value": 1, "target": "all_allies"}"#;
        let effect: EffectDef = serde_json::from_str(json).unwrap();

        match effect {
            EffectDef::StatModifier { stat, value, duration, filter, .. } => {
                assert_eq!(stat, StatKind::Both);
                assert_eq!(value, 1);
                assert_eq!(duration, Duration::Permanent);
                assert!(filter.is_none());
            }
            other => panic!("unexpected effect: {other:?}"),
        }
    }

    #[test]
    fn test_draw_default_value() {
        let json = r#"{"type": "draw_card"}"#;
        let effect: EffectDef = serde_json::from_str(json).unwrap();
        assert_eq!(effect, EffectDef::draw_card(1));
    }

    #[test]
    fn test_needs_choice() {
        assert!(EffectDef::damage(2, TargetSpec::TargetEnemy).needs_choice());
        assert!(!EffectDef::damage(2, TargetSpec::AllEnemies).needs_choice());
        assert!(!EffectDef::draw_card(1).needs_choice());
    }

    #[test]
    fn test_serialization_round_trip() {
        let effect = EffectDef::temporary_modifier(StatKind::Attack, 2, TargetSpec::Self_);
        let json = serde_json::to_string(&effect).unwrap();
        let back: EffectDef = serde_json::from_str(&json).unwrap();
        assert_eq!(effect, back);
    }

    #[test]
    fn test_comparator() {
        assert!(Comparator::AtLeast.holds(3, 3));
        assert!(Comparator::AtMost.holds(2, 3));
        assert!(Comparator::Exactly.holds(3, 3));
        assert!(!Comparator::Exactly.holds(2, 3));
    }
}
