//! Aura registrations.
//!
//! An aura's effects are never stored. The store only remembers which
//! cards project auras and from where; the engine recomputes every bonus
//! from scratch after each board change. Membership predicates ("allied
//! Warriors") cannot be cheaply invalidated per-event, so a full recompute
//! is the intended strategy at this board size.

use crate::cards::AbilityDefinition;
use crate::core::Location;

/// A registered aura: the projecting card and its ability.
#[derive(Clone, Debug, PartialEq)]
pub struct AuraRegistration {
    /// Name of the projecting card, re-checked against the slot occupant
    /// before every recomputation.
    pub card_name: String,
    pub location: Location,
    pub ability: AbilityDefinition,
}

/// Ordered list of active aura registrations.
#[derive(Clone, Debug, Default)]
pub struct AuraStore {
    auras: Vec<AuraRegistration>,
}

impl AuraStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an aura.
    pub fn register(&mut self, aura: AuraRegistration) {
        self.auras.push(aura);
    }

    /// Remove every aura projected from a slot.
    pub fn remove_source(&mut self, location: Location) {
        self.auras.retain(|a| a.location != location);
    }

    /// Re-key auras after their source moved slots.
    pub fn rekey(&mut self, from: Location, to: Location) {
        for aura in &mut self.auras {
            if aura.location == from {
                aura.location = to;
            }
        }
    }

    /// Does any aura project from this slot?
    #[must_use]
    pub fn has_source(&self, location: Location) -> bool {
        self.auras.iter().any(|a| a.location == location)
    }

    /// Clone the registration list for iteration during recomputation.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AuraRegistration> {
        self.auras.clone()
    }

    /// Number of registered auras.
    #[must_use]
    pub fn len(&self) -> usize {
        self.auras.len()
    }

    /// Is the store empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.auras.is_empty()
    }

    /// Drop everything (new game).
    pub fn clear(&mut self) {
        self.auras.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::AbilityKind;
    use crate::core::{PlayerId, Zone};

    fn registration(name: &str, slot: u8) -> AuraRegistration {
        AuraRegistration {
            card_name: name.into(),
            location: Location::new(PlayerId::ONE, Zone::FrontLine, slot),
            ability: AbilityDefinition::new(name, AbilityKind::Aura),
        }
    }

    #[test]
    fn test_register_and_remove() {
        let mut store = AuraStore::new();
        store.register(registration("A", 0));
        store.register(registration("B", 1));

        store.remove_source(Location::new(PlayerId::ONE, Zone::FrontLine, 0));

        assert_eq!(store.len(), 1);
        assert!(!store.has_source(Location::new(PlayerId::ONE, Zone::FrontLine, 0)));
        assert!(store.has_source(Location::new(PlayerId::ONE, Zone::FrontLine, 1)));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = AuraStore::new();
        store.register(registration("A", 0));

        let snapshot = store.snapshot();
        store.clear();

        assert_eq!(snapshot.len(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_rekey() {
        let mut store = AuraStore::new();
        store.register(registration("A", 0));

        let from = Location::new(PlayerId::ONE, Zone::FrontLine, 0);
        let to = Location::new(PlayerId::ONE, Zone::BackLine, 1);
        store.rekey(from, to);

        assert!(store.has_source(to));
        assert!(!store.has_source(from));
    }
}
