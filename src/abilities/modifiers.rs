//! Active stat modifier bookkeeping.
//!
//! Temporary stat changes live here, keyed by the location of the creature
//! they affect. Permanent stat edits never enter the store - they bake
//! straight into the permanent's persistent fields. A modifier leaves the
//! store exactly once: temporary entries at the end-of-turn sweep,
//! permanent-duration entries when their source leaves play, and anything
//! keyed to a slot when that slot's occupant is purged.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Location;
use crate::effects::{Duration, StatKind};

/// A recorded stat change on a creature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveModifier {
    /// Name of the card that created the modifier.
    pub source_card: String,
    /// Board slot of the source, when it had one (spells have none).
    pub source: Option<Location>,
    pub stat: StatKind,
    pub value: i32,
    pub duration: Duration,
}

/// Summed stat contributions for one creature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub attack: i32,
    pub defense: i32,
    pub health: i32,
}

impl StatLine {
    /// Create a stat line.
    #[must_use]
    pub const fn new(attack: i32, defense: i32, health: i32) -> Self {
        Self { attack, defense, health }
    }
}

/// Location-keyed store of active modifiers.
#[derive(Clone, Debug, Default)]
pub struct ModifierStore {
    by_target: FxHashMap<Location, SmallVec<[ActiveModifier; 4]>>,
}

impl ModifierStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a modifier against a target slot.
    pub fn add(&mut self, target: Location, modifier: ActiveModifier) {
        self.by_target.entry(target).or_default().push(modifier);
    }

    /// Modifiers currently affecting a slot.
    #[must_use]
    pub fn for_target(&self, target: Location) -> &[ActiveModifier] {
        self.by_target.get(&target).map_or(&[], |v| v.as_slice())
    }

    /// Sum the contributions affecting a slot, `both` counting for attack
    /// and defense.
    #[must_use]
    pub fn sum_for(&self, target: Location) -> StatLine {
        let mut line = StatLine::default();
        for modifier in self.for_target(target) {
            match modifier.stat {
                StatKind::Attack => line.attack += modifier.value,
                StatKind::Defense => line.defense += modifier.value,
                StatKind::Health => line.health += modifier.value,
                StatKind::Both => {
                    line.attack += modifier.value;
                    line.defense += modifier.value;
                }
            }
        }
        line
    }

    /// Drop every modifier affecting a slot (its occupant left play).
    pub fn purge_target(&mut self, target: Location) {
        self.by_target.remove(&target);
    }

    /// Drop permanent-duration modifiers sourced from a slot (their source
    /// left play). Temporary ones stay for the sweep.
    pub fn remove_from_source(&mut self, source: Location) {
        for modifiers in self.by_target.values_mut() {
            modifiers
                .retain(|m| !(m.source == Some(source) && m.duration == Duration::Permanent));
        }
        self.by_target.retain(|_, v| !v.is_empty());
    }

    /// End-of-turn sweep: drop every temporary modifier. Returns the slots
    /// whose totals changed so callers can re-clamp health.
    pub fn sweep_temporary(&mut self) -> Vec<Location> {
        let mut affected = Vec::new();
        for (&target, modifiers) in &mut self.by_target {
            let before = modifiers.len();
            modifiers.retain(|m| m.duration == Duration::Permanent);
            if modifiers.len() != before {
                affected.push(target);
            }
        }
        self.by_target.retain(|_, v| !v.is_empty());
        affected
    }

    /// Re-key modifiers affecting `from` to `to` (the creature moved).
    pub fn rekey_target(&mut self, from: Location, to: Location) {
        if let Some(modifiers) = self.by_target.remove(&from) {
            self.by_target.entry(to).or_default().extend(modifiers);
        }
    }

    /// Update source slots after a source moved.
    pub fn rekey_source(&mut self, from: Location, to: Location) {
        for modifiers in self.by_target.values_mut() {
            for modifier in modifiers.iter_mut() {
                if modifier.source == Some(from) {
                    modifier.source = Some(to);
                }
            }
        }
    }

    /// Total number of recorded modifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_target.values().map(SmallVec::len).sum()
    }

    /// Is the store empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }

    /// Drop everything (new game).
    pub fn clear(&mut self) {
        self.by_target.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlayerId, Zone};

    fn loc(slot: u8) -> Location {
        Location::new(PlayerId::ONE, Zone::FrontLine, slot)
    }

    fn temp(stat: StatKind, value: i32, source: Option<Location>) -> ActiveModifier {
        ActiveModifier {
            source_card: "src".into(),
            source,
            stat,
            value,
            duration: Duration::UntilEndOfTurn,
        }
    }

    fn perm(stat: StatKind, value: i32, source: Location) -> ActiveModifier {
        ActiveModifier {
            source_card: "src".into(),
            source: Some(source),
            stat,
            value,
            duration: Duration::Permanent,
        }
    }

    #[test]
    fn test_sum_includes_both() {
        let mut store = ModifierStore::new();
        store.add(loc(0), temp(StatKind::Attack, 2, None));
        store.add(loc(0), temp(StatKind::Both, 1, None));
        store.add(loc(0), temp(StatKind::Health, 3, None));

        let line = store.sum_for(loc(0));
        assert_eq!(line, StatLine::new(3, 1, 3));
    }

    #[test]
    fn test_sum_for_untouched_slot_is_zero() {
        let store = ModifierStore::new();
        assert_eq!(store.sum_for(loc(1)), StatLine::default());
    }

    #[test]
    fn test_sweep_removes_only_temporary() {
        let mut store = ModifierStore::new();
        store.add(loc(0), temp(StatKind::Attack, 2, None));
        store.add(loc(0), perm(StatKind::Attack, 1, loc(1)));

        let affected = store.sweep_temporary();

        assert_eq!(affected, vec![loc(0)]);
        assert_eq!(store.sum_for(loc(0)).attack, 1);
    }

    #[test]
    fn test_sweep_twice_is_idempotent() {
        let mut store = ModifierStore::new();
        store.add(loc(0), temp(StatKind::Attack, 2, None));

        assert_eq!(store.sweep_temporary(), vec![loc(0)]);
        assert!(store.sweep_temporary().is_empty());
    }

    #[test]
    fn test_remove_from_source_spares_temporaries() {
        let mut store = ModifierStore::new();
        store.add(loc(0), perm(StatKind::Attack, 1, loc(1)));
        store.add(loc(0), temp(StatKind::Attack, 2, Some(loc(1))));

        store.remove_from_source(loc(1));

        // Permanent entry from that source gone, temporary survives until
        // the sweep.
        assert_eq!(store.sum_for(loc(0)).attack, 2);
    }

    #[test]
    fn test_purge_target() {
        let mut store = ModifierStore::new();
        store.add(loc(0), temp(StatKind::Attack, 2, None));
        store.add(loc(1), temp(StatKind::Attack, 1, None));

        store.purge_target(loc(0));

        assert!(store.for_target(loc(0)).is_empty());
        assert_eq!(store.for_target(loc(1)).len(), 1);
    }

    #[test]
    fn test_rekey_target() {
        let mut store = ModifierStore::new();
        store.add(loc(0), temp(StatKind::Defense, 2, None));

        store.rekey_target(loc(0), loc(2));

        assert!(store.for_target(loc(0)).is_empty());
        assert_eq!(store.sum_for(loc(2)).defense, 2);
    }

    #[test]
    fn test_rekey_source() {
        let mut store = ModifierStore::new();
        store.add(loc(0), perm(StatKind::Attack, 1, loc(1)));

        store.rekey_source(loc(1), loc(3));
        store.remove_from_source(loc(3));

        assert!(store.for_target(loc(0)).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = ModifierStore::new();
        store.add(loc(0), temp(StatKind::Attack, 2, None));
        store.clear();
        assert!(store.is_empty());
    }
}
