//! Effect targeting.
//!
//! A `TargetSpec` names who an effect aims at symbolically; `resolve`
//! expands it against the current board into concrete target references.
//! Player-chosen specifiers (`target`, `target_ally`, `target_enemy`) are
//! never guessed: with no explicit selection supplied the resolution
//! reports `NeedsChoice` and the effect is skipped or parked as pending.
//!
//! Random selection returns its candidate list instead of picking, so the
//! caller can draw from the game RNG once the state borrow is released.

use serde::{Deserialize, Serialize};

use crate::cards::{CardClass, Element};
use crate::core::{GameState, Location, PlayerId, Zone};

/// Symbolic target specifier.
///
/// Serde accepts both current and legacy spellings (`allied_creatures`,
/// `enemy_creatures`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    /// The effect's own source permanent.
    #[serde(rename = "self")]
    Self_,
    /// Every creature on the controller's side.
    #[serde(alias = "allied_creatures")]
    AllAllies,
    /// Every creature on the opposing side.
    #[serde(alias = "enemy_creatures")]
    AllEnemies,
    /// A player-chosen target, either side.
    Target,
    /// A player-chosen allied creature.
    TargetAlly,
    /// A player-chosen enemy creature.
    TargetEnemy,
    /// One uniformly-random enemy creature.
    RandomEnemy,
    /// Both players.
    Player,
}

impl TargetSpec {
    /// Does this specifier require an explicit player selection?
    #[must_use]
    pub const fn needs_choice(self) -> bool {
        matches!(self, TargetSpec::Target | TargetSpec::TargetAlly | TargetSpec::TargetEnemy)
    }
}

/// Conjunctive filter applied after target expansion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<CardClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclude_self: bool,
}

impl TargetFilter {
    /// Filter by element.
    #[must_use]
    pub fn element(element: Element) -> Self {
        Self { element: Some(element), ..Self::default() }
    }

    /// Filter by class.
    #[must_use]
    pub fn class(class: CardClass) -> Self {
        Self { class: Some(class), ..Self::default() }
    }

    /// Exclude the effect source itself.
    #[must_use]
    pub fn excluding_self(mut self) -> Self {
        self.exclude_self = true;
        self
    }

    /// Does the permanent at `location` pass every predicate?
    #[must_use]
    pub fn matches(&self, state: &GameState, location: Location, source: &EffectSource) -> bool {
        let Some(permanent) = state.permanent(location) else {
            return false;
        };

        if let Some(element) = self.element {
            if permanent.card.element != Some(element) {
                return false;
            }
        }
        if let Some(class) = self.class {
            if permanent.card.class != Some(class) {
                return false;
            }
        }
        if let Some(zone) = self.zone {
            if location.zone != zone {
                return false;
            }
        }
        if self.exclude_self && source.location == Some(location) {
            return false;
        }

        true
    }
}

/// A concrete, addressable target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TargetRef {
    Permanent { location: Location },
    Player { player: PlayerId },
}

impl TargetRef {
    /// Target a board slot.
    #[must_use]
    pub const fn permanent(location: Location) -> Self {
        Self::Permanent { location }
    }

    /// Target a player.
    #[must_use]
    pub const fn player(player: PlayerId) -> Self {
        Self::Player { player }
    }
}

/// The source an effect resolves from: the card's name, who controls it,
/// and its board slot when it has one (spells resolve from hand and have
/// none).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectSource {
    pub name: String,
    pub controller: PlayerId,
    pub location: Option<Location>,
}

impl EffectSource {
    /// Source for a permanent in play.
    #[must_use]
    pub fn permanent(name: impl Into<String>, location: Location) -> Self {
        Self { name: name.into(), controller: location.player, location: Some(location) }
    }

    /// Source for a spell or other off-board card.
    #[must_use]
    pub fn spell(name: impl Into<String>, controller: PlayerId) -> Self {
        Self { name: name.into(), controller, location: None }
    }
}

/// Outcome of target expansion.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// The concrete targets (possibly empty, which is a quiet no-op).
    Targets(Vec<TargetRef>),
    /// One of `candidates` should be picked at random by the caller.
    PickRandom(Vec<TargetRef>),
    /// A player-chosen specifier with no selection supplied.
    NeedsChoice,
}

/// Expand a target specifier into concrete targets.
pub fn resolve(
    spec: TargetSpec,
    filter: Option<&TargetFilter>,
    source: &EffectSource,
    state: &GameState,
    explicit: Option<&TargetRef>,
) -> Resolution {
    let controller = source.controller;

    match spec {
        TargetSpec::Self_ => {
            let targets = source
                .location
                .filter(|loc| state.permanent(*loc).is_some())
                .map(TargetRef::permanent)
                .into_iter()
                .collect();
            Resolution::Targets(targets)
        }

        TargetSpec::AllAllies => {
            Resolution::Targets(filtered_creatures(state, controller, filter, source))
        }

        TargetSpec::AllEnemies => {
            Resolution::Targets(filtered_creatures(state, controller.opponent(), filter, source))
        }

        TargetSpec::Target | TargetSpec::TargetAlly | TargetSpec::TargetEnemy => {
            let Some(chosen) = explicit else {
                return Resolution::NeedsChoice;
            };
            if chosen_is_valid(spec, chosen, filter, source, state) {
                Resolution::Targets(vec![*chosen])
            } else {
                // Target vanished or never qualified: skip, never guess.
                Resolution::Targets(Vec::new())
            }
        }

        TargetSpec::RandomEnemy => {
            let candidates = filtered_creatures(state, controller.opponent(), filter, source);
            if candidates.is_empty() {
                Resolution::Targets(Vec::new())
            } else {
                Resolution::PickRandom(candidates)
            }
        }

        TargetSpec::Player => Resolution::Targets(
            PlayerId::all().map(TargetRef::player).collect(),
        ),
    }
}

fn filtered_creatures(
    state: &GameState,
    side: PlayerId,
    filter: Option<&TargetFilter>,
    source: &EffectSource,
) -> Vec<TargetRef> {
    state
        .creatures_of(side)
        .into_iter()
        .filter(|loc| filter.is_none_or(|f| f.matches(state, *loc, source)))
        .map(TargetRef::permanent)
        .collect()
}

fn chosen_is_valid(
    spec: TargetSpec,
    chosen: &TargetRef,
    filter: Option<&TargetFilter>,
    source: &EffectSource,
    state: &GameState,
) -> bool {
    match chosen {
        TargetRef::Player { .. } => {
            // Players are only legal for the unconstrained specifier.
            spec == TargetSpec::Target
        }
        TargetRef::Permanent { location } => {
            if state.permanent(*location).is_none() {
                return false;
            }
            let side_ok = match spec {
                TargetSpec::TargetAlly => location.player == source.controller,
                TargetSpec::TargetEnemy => location.player != source.controller,
                _ => true,
            };
            side_ok && filter.is_none_or(|f| f.matches(state, *location, source))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardKind};
    use crate::core::GameState;

    fn creature(name: &str) -> CardDefinition {
        CardDefinition::new(name, CardKind::Character, 1).with_stats(2, 1, 3)
    }

    fn state_with_board() -> GameState {
        let mut state = GameState::new(42);
        state
            .place(PlayerId::ONE, Zone::FrontLine, creature("A1"))
            .unwrap();
        state
            .place(PlayerId::ONE, Zone::BackLine, creature("A2"))
            .unwrap();
        state
            .place(PlayerId::TWO, Zone::FrontLine, creature("B1"))
            .unwrap();
        state
    }

    fn source_at(player: PlayerId, zone: Zone, slot: u8) -> EffectSource {
        EffectSource::permanent("src", Location::new(player, zone, slot))
    }

    #[test]
    fn test_all_enemies_never_includes_own_side() {
        let state = state_with_board();
        let source = source_at(PlayerId::ONE, Zone::FrontLine, 0);

        for _ in 0..3 {
            let Resolution::Targets(targets) =
                resolve(TargetSpec::AllEnemies, None, &source, &state, None)
            else {
                panic!("expected fixed targets");
            };
            assert_eq!(targets.len(), 1);
            assert_eq!(
                targets[0],
                TargetRef::permanent(Location::new(PlayerId::TWO, Zone::FrontLine, 0))
            );
        }
    }

    #[test]
    fn test_all_allies() {
        let state = state_with_board();
        let source = source_at(PlayerId::ONE, Zone::FrontLine, 0);

        let Resolution::Targets(targets) =
            resolve(TargetSpec::AllAllies, None, &source, &state, None)
        else {
            panic!("expected fixed targets");
        };
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_self_resolves_to_source_slot() {
        let state = state_with_board();
        let source = source_at(PlayerId::ONE, Zone::BackLine, 0);

        let Resolution::Targets(targets) = resolve(TargetSpec::Self_, None, &source, &state, None)
        else {
            panic!("expected fixed targets");
        };
        assert_eq!(targets, vec![TargetRef::permanent(Location::new(PlayerId::ONE, Zone::BackLine, 0))]);
    }

    #[test]
    fn test_self_for_spell_source_is_empty() {
        let state = state_with_board();
        let source = EffectSource::spell("Palla di Fuoco", PlayerId::ONE);

        let Resolution::Targets(targets) = resolve(TargetSpec::Self_, None, &source, &state, None)
        else {
            panic!("expected fixed targets");
        };
        assert!(targets.is_empty());
    }

    #[test]
    fn test_chosen_target_required() {
        let state = state_with_board();
        let source = source_at(PlayerId::ONE, Zone::FrontLine, 0);

        let res = resolve(TargetSpec::TargetEnemy, None, &source, &state, None);
        assert_eq!(res, Resolution::NeedsChoice);
    }

    #[test]
    fn test_chosen_target_side_enforced() {
        let state = state_with_board();
        let source = source_at(PlayerId::ONE, Zone::FrontLine, 0);
        let own = TargetRef::permanent(Location::new(PlayerId::ONE, Zone::BackLine, 0));

        let res = resolve(TargetSpec::TargetEnemy, None, &source, &state, Some(&own));
        assert_eq!(res, Resolution::Targets(Vec::new()));

        let res = resolve(TargetSpec::TargetAlly, None, &source, &state, Some(&own));
        assert_eq!(res, Resolution::Targets(vec![own]));
    }

    #[test]
    fn test_chosen_target_gone_is_skipped() {
        let state = state_with_board();
        let source = source_at(PlayerId::ONE, Zone::FrontLine, 0);
        let empty_slot = TargetRef::permanent(Location::new(PlayerId::TWO, Zone::FrontLine, 3));

        let res = resolve(TargetSpec::Target, None, &source, &state, Some(&empty_slot));
        assert_eq!(res, Resolution::Targets(Vec::new()));
    }

    #[test]
    fn test_random_enemy_empty_board() {
        let mut state = GameState::new(42);
        state
            .place(PlayerId::ONE, Zone::FrontLine, creature("A1"))
            .unwrap();
        let source = source_at(PlayerId::ONE, Zone::FrontLine, 0);

        let res = resolve(TargetSpec::RandomEnemy, None, &source, &state, None);
        assert_eq!(res, Resolution::Targets(Vec::new()));
    }

    #[test]
    fn test_random_enemy_returns_candidates() {
        let state = state_with_board();
        let source = source_at(PlayerId::ONE, Zone::FrontLine, 0);

        let Resolution::PickRandom(candidates) =
            resolve(TargetSpec::RandomEnemy, None, &source, &state, None)
        else {
            panic!("expected candidates");
        };
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_player_spec_expands_to_both() {
        let state = state_with_board();
        let source = EffectSource::spell("x", PlayerId::ONE);

        let Resolution::Targets(targets) = resolve(TargetSpec::Player, None, &source, &state, None)
        else {
            panic!("expected fixed targets");
        };
        assert_eq!(
            targets,
            vec![TargetRef::player(PlayerId::ONE), TargetRef::player(PlayerId::TWO)]
        );
    }

    #[test]
    fn test_filter_by_class() {
        let mut state = GameState::new(42);
        state
            .place(
                PlayerId::ONE,
                Zone::FrontLine,
                creature("W").with_class(CardClass::Warrior),
            )
            .unwrap();
        state
            .place(PlayerId::ONE, Zone::BackLine, creature("M").with_class(CardClass::Mage))
            .unwrap();
        let source = EffectSource::spell("x", PlayerId::ONE);

        let filter = TargetFilter::class(CardClass::Warrior);
        let Resolution::Targets(targets) =
            resolve(TargetSpec::AllAllies, Some(&filter), &source, &state, None)
        else {
            panic!("expected fixed targets");
        };
        assert_eq!(targets.len(), 1);
        assert_eq!(
            targets[0],
            TargetRef::permanent(Location::new(PlayerId::ONE, Zone::FrontLine, 0))
        );
    }

    #[test]
    fn test_filter_exclude_self() {
        let state = state_with_board();
        let source = source_at(PlayerId::ONE, Zone::FrontLine, 0);

        let filter = TargetFilter::default().excluding_self();
        let Resolution::Targets(targets) =
            resolve(TargetSpec::AllAllies, Some(&filter), &source, &state, None)
        else {
            panic!("expected fixed targets");
        };
        assert_eq!(targets.len(), 1);
        assert_eq!(
            targets[0],
            TargetRef::permanent(Location::new(PlayerId::ONE, Zone::BackLine, 0))
        );
    }

    #[test]
    fn test_legacy_spec_aliases() {
        let spec: TargetSpec = serde_json::from_str("\"allied_creatures\"").unwrap();
        assert_eq!(spec, TargetSpec::AllAllies);
        let spec: TargetSpec = serde_json::from_str("\"enemy_creatures\"").unwrap();
        assert_eq!(spec, TargetSpec::AllEnemies);
        let spec: TargetSpec = serde_json::from_str("\"self\"").unwrap();
        assert_eq!(spec, TargetSpec::Self_);
    }
}
