//! Trigger dispatch.
//!
//! A fixed table of named triggers, each holding the registered entries in
//! insertion order. Firing snapshots the list first, so effects that
//! register or remove entries mid-resolution cannot invalidate the
//! iteration. There is no priority system.

use rustc_hash::FxHashMap;

use crate::cards::{AbilityDefinition, TriggerName};
use crate::core::{Location, PlayerId};
use crate::effects::TargetRef;

/// A registered triggered ability.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerEntry {
    /// Name of the owning card.
    pub card_name: String,
    /// Slot the owning card occupies.
    pub location: Location,
    pub ability: AbilityDefinition,
}

/// Context describing the event being fired.
///
/// When a field is set, only entries matching it fire: `player` narrows to
/// one side's cards, `location` to one specific card. `target` carries the
/// event's counterparty (for combat damage, the attacker) and doubles as
/// the implicit chosen target for the fired effects. `amount` is the event
/// magnitude (damage dealt, cards drawn).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerContext {
    pub player: Option<PlayerId>,
    pub location: Option<Location>,
    pub target: Option<TargetRef>,
    pub amount: Option<i32>,
}

impl TriggerContext {
    /// A context with no constraints: every registered entry fires.
    #[must_use]
    pub fn broadcast() -> Self {
        Self::default()
    }

    /// Constrain to one player's cards.
    #[must_use]
    pub fn for_player(player: PlayerId) -> Self {
        Self { player: Some(player), ..Self::default() }
    }

    /// Constrain to the card at one location.
    #[must_use]
    pub fn at(location: Location) -> Self {
        Self {
            player: Some(location.player),
            location: Some(location),
            ..Self::default()
        }
    }

    /// Attach the event counterparty (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: TargetRef) -> Self {
        self.target = Some(target);
        self
    }

    /// Attach the event magnitude (builder pattern).
    #[must_use]
    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// Fixed-table trigger dispatcher.
#[derive(Clone, Debug, Default)]
pub struct TriggerDispatcher {
    table: FxHashMap<TriggerName, Vec<TriggerEntry>>,
}

impl TriggerDispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry under a trigger. Entries fire in registration
    /// order.
    pub fn register(&mut self, trigger: TriggerName, entry: TriggerEntry) {
        self.table.entry(trigger).or_default().push(entry);
    }

    /// Remove every entry owned by a location, across all triggers.
    pub fn remove_location(&mut self, location: Location) {
        for entries in self.table.values_mut() {
            entries.retain(|e| e.location != location);
        }
        self.table.retain(|_, v| !v.is_empty());
    }

    /// Re-key entries after their owner moved slots.
    pub fn rekey(&mut self, from: Location, to: Location) {
        for entries in self.table.values_mut() {
            for entry in entries.iter_mut() {
                if entry.location == from {
                    entry.location = to;
                }
            }
        }
    }

    /// Snapshot the entries applicable to an event, in registration order.
    #[must_use]
    pub fn matching(&self, trigger: TriggerName, ctx: &TriggerContext) -> Vec<TriggerEntry> {
        let Some(entries) = self.table.get(&trigger) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter(|e| Self::applicable(e, ctx))
            .cloned()
            .collect()
    }

    fn applicable(entry: &TriggerEntry, ctx: &TriggerContext) -> bool {
        if ctx.player.is_some_and(|p| entry.location.player != p) {
            return false;
        }
        if ctx.location.is_some_and(|l| entry.location != l) {
            return false;
        }
        true
    }

    /// The raw entry list for a trigger (registration order).
    #[must_use]
    pub fn entries(&self, trigger: TriggerName) -> &[TriggerEntry] {
        self.table.get(&trigger).map_or(&[], |v| v.as_slice())
    }

    /// Total registered entries across all triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    /// Is the dispatcher empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Drop everything (new game).
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::AbilityKind;
    use crate::core::Zone;

    fn entry(name: &str, player: PlayerId, slot: u8) -> TriggerEntry {
        TriggerEntry {
            card_name: name.into(),
            location: Location::new(player, Zone::FrontLine, slot),
            ability: AbilityDefinition::new(name, AbilityKind::Triggered),
        }
    }

    #[test]
    fn test_register_and_match_broadcast() {
        let mut dispatcher = TriggerDispatcher::new();
        dispatcher.register(TriggerName::OnTurnStart, entry("A", PlayerId::ONE, 0));
        dispatcher.register(TriggerName::OnTurnStart, entry("B", PlayerId::TWO, 0));

        let hits = dispatcher.matching(TriggerName::OnTurnStart, &TriggerContext::broadcast());
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_matching_filters_by_player() {
        let mut dispatcher = TriggerDispatcher::new();
        dispatcher.register(TriggerName::OnTurnStart, entry("A", PlayerId::ONE, 0));
        dispatcher.register(TriggerName::OnTurnStart, entry("B", PlayerId::TWO, 0));

        let hits = dispatcher.matching(
            TriggerName::OnTurnStart,
            &TriggerContext::for_player(PlayerId::TWO),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].card_name, "B");
    }

    #[test]
    fn test_matching_filters_by_location() {
        let mut dispatcher = TriggerDispatcher::new();
        dispatcher.register(TriggerName::OnDamageTaken, entry("A", PlayerId::ONE, 0));
        dispatcher.register(TriggerName::OnDamageTaken, entry("B", PlayerId::ONE, 1));

        let ctx = TriggerContext::at(Location::new(PlayerId::ONE, Zone::FrontLine, 1));
        let hits = dispatcher.matching(TriggerName::OnDamageTaken, &ctx);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].card_name, "B");
    }

    #[test]
    fn test_matching_unknown_trigger_is_empty() {
        let dispatcher = TriggerDispatcher::new();
        let hits = dispatcher.matching(TriggerName::OnDeath, &TriggerContext::broadcast());
        assert!(hits.is_empty());
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut dispatcher = TriggerDispatcher::new();
        for i in 0..4 {
            dispatcher.register(TriggerName::OnTurnEnd, entry(&format!("E{i}"), PlayerId::ONE, i));
        }

        let hits = dispatcher.matching(TriggerName::OnTurnEnd, &TriggerContext::broadcast());
        let names: Vec<_> = hits.iter().map(|e| e.card_name.as_str()).collect();
        assert_eq!(names, vec!["E0", "E1", "E2", "E3"]);
    }

    #[test]
    fn test_remove_location_spans_triggers() {
        let mut dispatcher = TriggerDispatcher::new();
        dispatcher.register(TriggerName::OnTurnStart, entry("A", PlayerId::ONE, 0));
        dispatcher.register(TriggerName::OnDeath, entry("A", PlayerId::ONE, 0));
        dispatcher.register(TriggerName::OnTurnStart, entry("B", PlayerId::ONE, 1));

        dispatcher.remove_location(Location::new(PlayerId::ONE, Zone::FrontLine, 0));

        assert_eq!(dispatcher.len(), 1);
        assert!(dispatcher.entries(TriggerName::OnDeath).is_empty());
    }

    #[test]
    fn test_remove_unknown_location_is_noop() {
        let mut dispatcher = TriggerDispatcher::new();
        dispatcher.register(TriggerName::OnTurnStart, entry("A", PlayerId::ONE, 0));

        dispatcher.remove_location(Location::new(PlayerId::TWO, Zone::BackLine, 3));
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn test_rekey() {
        let mut dispatcher = TriggerDispatcher::new();
        dispatcher.register(TriggerName::OnTurnStart, entry("A", PlayerId::ONE, 0));

        let from = Location::new(PlayerId::ONE, Zone::FrontLine, 0);
        let to = Location::new(PlayerId::ONE, Zone::BackLine, 2);
        dispatcher.rekey(from, to);

        let ctx = TriggerContext::at(to);
        assert_eq!(dispatcher.matching(TriggerName::OnTurnStart, &ctx).len(), 1);
    }

    #[test]
    fn test_snapshot_tolerates_mutation() {
        let mut dispatcher = TriggerDispatcher::new();
        dispatcher.register(TriggerName::OnTurnStart, entry("A", PlayerId::ONE, 0));

        let snapshot = dispatcher.matching(TriggerName::OnTurnStart, &TriggerContext::broadcast());
        dispatcher.remove_location(Location::new(PlayerId::ONE, Zone::FrontLine, 0));

        // The snapshot is unaffected by the removal.
        assert_eq!(snapshot.len(), 1);
        assert!(dispatcher.is_empty());
    }
}
