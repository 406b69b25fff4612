//! The ability engine.
//!
//! One explicit context object owns every runtime registry: active
//! modifiers, auras, trigger entries, activated abilities, equipment
//! attachments, cost reductions, and the pending-target record. The game
//! engine registers cards as they enter and leave play and fires named
//! events at turn boundaries; everything else flows through here.
//!
//! Nothing in this module is fatal. Invalid input is logged and skipped,
//! illegal actions are rejected with `false`, and a missing target means
//! the effect silently does not happen.

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::cards::{
    legacy, AbilityDefinition, AbilityKind, CardDefinition, CardKind, GrantedAbility, Permanent,
    TriggerName, UsageLimit,
};
use crate::core::{GameState, Location, PlayerId, Zone, HAND_LIMIT};
use crate::effects::{
    targeting, Duration, EffectDef, EffectSource, Resolution, StatKind, TargetFilter, TargetRef,
    TargetSpec,
};
use crate::view::{BoardView, NullView};

use super::auras::{AuraRegistration, AuraStore};
use super::modifiers::{ActiveModifier, ModifierStore, StatLine};
use super::triggers::{TriggerContext, TriggerDispatcher, TriggerEntry};

/// What happened when one effect was resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectOutcome {
    /// The effect ran, touching this many targets (possibly zero).
    Applied { targets: usize },
    /// The effect did not run: condition unmet, no chosen target, or a
    /// full zone.
    Skipped,
    /// The effect could not run and the caller should know why.
    Failed(String),
}

/// A registered activated ability on a permanent.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivatedRegistration {
    pub card_name: String,
    pub ability: AbilityDefinition,
    /// Energy cost to activate.
    pub cost: i32,
    pub once_per_turn: bool,
    /// Activations since the owner's last turn start.
    pub uses_this_turn: u32,
}

/// An equipment card attached to a creature.
#[derive(Clone, Debug, PartialEq)]
pub struct EquipmentAttachment {
    pub card: CardDefinition,
}

/// An active card cost reduction.
#[derive(Clone, Debug, PartialEq)]
struct CostReduction {
    source: Option<Location>,
    player: PlayerId,
    value: i32,
    duration: Duration,
}

/// Effects parked while a human picks a target.
///
/// Nothing is paid or counted until the choice arrives; cancelling leaves
/// state untouched.
#[derive(Clone, Debug)]
pub struct PendingEffects {
    pub effects: Vec<EffectDef>,
    pub source: EffectSource,
    payment: Option<PendingPayment>,
    fire_after: Option<TriggerName>,
}

#[derive(Clone, Copy, Debug)]
struct PendingPayment {
    cost: i32,
    usage: Option<(Location, usize)>,
}

/// How an ability was classified for registration.
#[derive(Clone, Debug, PartialEq)]
enum Classification {
    /// Apply the effects once at registration, permanently.
    Static,
    Triggered(TriggerName),
    Activated { cost: Option<i32>, once_per_turn: bool },
    Aura,
    /// Unrecognized; registered nowhere.
    Inert,
}

/// The abilities/effects resolution engine.
pub struct AbilityEngine {
    modifiers: ModifierStore,
    auras: AuraStore,
    triggers: TriggerDispatcher,
    activated: FxHashMap<Location, Vec<ActivatedRegistration>>,
    equipment: FxHashMap<Location, Vec<EquipmentAttachment>>,
    cost_reductions: Vec<CostReduction>,
    pending: Option<PendingEffects>,
    view: Box<dyn BoardView>,
}

impl Default for AbilityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AbilityEngine {
    /// Create an engine with no render sink.
    #[must_use]
    pub fn new() -> Self {
        Self::with_view(Box::new(NullView))
    }

    /// Create an engine notifying the given view after mutations.
    #[must_use]
    pub fn with_view(view: Box<dyn BoardView>) -> Self {
        Self {
            modifiers: ModifierStore::new(),
            auras: AuraStore::new(),
            triggers: TriggerDispatcher::new(),
            activated: FxHashMap::default(),
            equipment: FxHashMap::default(),
            cost_reductions: Vec::new(),
            pending: None,
            view,
        }
    }

    /// Clear every registry for a new game.
    pub fn reset(&mut self) {
        self.modifiers.clear();
        self.auras.clear();
        self.triggers.clear();
        self.activated.clear();
        self.equipment.clear();
        self.cost_reductions.clear();
        self.pending = None;
    }

    // === Registration ===

    /// Register the abilities of the permanent occupying `location`.
    ///
    /// Static passives apply immediately; triggered, activated and aura
    /// abilities are filed in their registries. A no-op if the slot is
    /// empty or its occupant is silenced.
    pub fn register_card(&mut self, state: &mut GameState, location: Location) {
        self.register_internal(state, location, true);
    }

    fn register_internal(&mut self, state: &mut GameState, location: Location, apply_static: bool) {
        let Some(permanent) = state.permanent(location) else {
            warn!("register_card on empty slot {location}");
            return;
        };
        if permanent.silenced {
            return;
        }
        let card_name = permanent.name().to_string();
        let abilities = permanent.card.abilities.clone();

        self.register_abilities(state, location, &card_name, abilities, apply_static);
    }

    fn register_abilities(
        &mut self,
        state: &mut GameState,
        location: Location,
        card_name: &str,
        abilities: Vec<AbilityDefinition>,
        apply_static: bool,
    ) {
        let mut added_aura = false;

        for ability in abilities {
            match self.classify(&ability) {
                Classification::Static => {
                    if apply_static && !ability.effects.is_empty() {
                        let source = EffectSource::permanent(card_name, location);
                        self.resolve_effects_inner(state, &ability.effects, &source, None);
                    }
                }
                Classification::Triggered(trigger) => {
                    self.triggers.register(
                        trigger,
                        TriggerEntry { card_name: card_name.to_string(), location, ability },
                    );
                }
                Classification::Activated { cost, once_per_turn } => {
                    self.activated.entry(location).or_default().push(ActivatedRegistration {
                        card_name: card_name.to_string(),
                        cost: cost.unwrap_or(0),
                        once_per_turn,
                        uses_this_turn: 0,
                        ability,
                    });
                }
                Classification::Aura => {
                    self.auras.register(AuraRegistration {
                        card_name: card_name.to_string(),
                        location,
                        ability,
                    });
                    added_aura = true;
                }
                Classification::Inert => {}
            }
        }

        if added_aura {
            self.recalculate_auras(state);
        }
    }

    /// Classify an ability: the explicit kind wins, legacy text is the
    /// fallback, anything unrecognized is inert.
    fn classify(&self, ability: &AbilityDefinition) -> Classification {
        if let Some(kind) = ability.kind {
            return match kind {
                AbilityKind::Passive => Classification::Static,
                AbilityKind::Aura => Classification::Aura,
                AbilityKind::Activated => Classification::Activated {
                    cost: ability.cost,
                    once_per_turn: ability.limit == Some(UsageLimit::OncePerTurn),
                },
                AbilityKind::Triggered => match ability.trigger.as_deref() {
                    Some(raw) if TriggerName::is_continuous_marker(raw) => Classification::Static,
                    Some(raw) => match TriggerName::from_name(raw) {
                        Some(trigger) => Classification::Triggered(trigger),
                        None => {
                            warn!("unrecognized trigger '{raw}' on ability '{}'", ability.name);
                            Classification::Inert
                        }
                    },
                    None => {
                        warn!("triggered ability '{}' declares no trigger", ability.name);
                        Classification::Inert
                    }
                },
            };
        }

        if let Some(text) = &ability.text {
            let c = legacy::classify_text(text);
            return match c.kind {
                AbilityKind::Passive => Classification::Static,
                AbilityKind::Aura => Classification::Aura,
                AbilityKind::Activated => Classification::Activated {
                    cost: ability.cost.or(c.cost),
                    once_per_turn: c.once_per_turn
                        || ability.limit == Some(UsageLimit::OncePerTurn),
                },
                AbilityKind::Triggered => match c.trigger {
                    Some(trigger) => Classification::Triggered(trigger),
                    None => Classification::Inert,
                },
            };
        }

        warn!("ability '{}' has neither a kind nor text", ability.name);
        Classification::Inert
    }

    /// Remove every registration keyed to `location`, then recompute auras
    /// (membership of affected creatures may now be stale). A no-op on a
    /// location with no entries.
    pub fn unregister_card(&mut self, state: &mut GameState, location: Location) {
        self.purge_location(location);
        self.recalculate_auras(state);
    }

    fn purge_location(&mut self, location: Location) {
        self.modifiers.purge_target(location);
        self.modifiers.remove_from_source(location);
        self.triggers.remove_location(location);
        self.auras.remove_source(location);
        self.activated.remove(&location);
        self.equipment.remove(&location);
        self.cost_reductions.retain(|c| c.source != Some(location));
    }

    /// Rebuild every registry from a loaded state.
    ///
    /// Static passive effects are not re-applied: their output is already
    /// baked into the saved stats.
    pub fn rebuild(&mut self, state: &mut GameState) {
        self.reset();
        for location in state.occupied_locations() {
            self.register_internal(state, location, false);
        }
        self.recalculate_auras(state);
    }

    // === Play flow ===

    /// Place a permanent into its deploy zone, register it, and fire the
    /// enter-play events. `chosen` pre-answers any targeted on-play effect.
    ///
    /// Returns the occupied location, or `None` for non-permanents and
    /// full zones.
    pub fn play_permanent(
        &mut self,
        state: &mut GameState,
        player: PlayerId,
        card: CardDefinition,
        chosen: Option<TargetRef>,
    ) -> Option<Location> {
        let zone = card.deploy_zone()?;
        let is_structure = card.kind == CardKind::Structure;
        let location = state.place(player, zone, card)?;

        self.register_card(state, location);

        let mut ctx = TriggerContext::at(location);
        if let Some(target) = chosen {
            ctx = ctx.with_target(target);
        }
        self.trigger_event(state, TriggerName::OnEnterPlay, &ctx);

        if is_structure {
            self.trigger_event(
                state,
                TriggerName::OnStructureBuilt,
                &TriggerContext::for_player(player),
            );
        }

        self.recalculate_auras(state);
        Some(location)
    }

    /// Resolve a spell's effects and fire the spell-played event.
    ///
    /// When the spell needs a target and none is given, the effects are
    /// parked pending a choice and nothing mutates.
    pub fn cast_spell(
        &mut self,
        state: &mut GameState,
        player: PlayerId,
        card: &CardDefinition,
        chosen: Option<TargetRef>,
    ) -> Vec<EffectOutcome> {
        let effects: Vec<EffectDef> =
            card.abilities.iter().flat_map(|a| a.effects.iter().cloned()).collect();
        let source = EffectSource::spell(&card.name, player);

        if chosen.is_none() && effects.iter().any(EffectDef::needs_choice) {
            self.pending = Some(PendingEffects {
                effects,
                source,
                payment: None,
                fire_after: Some(TriggerName::OnSpellPlayed),
            });
            return Vec::new();
        }

        let outcomes = self.resolve_effects_inner(state, &effects, &source, chosen.as_ref());
        self.trigger_event(state, TriggerName::OnSpellPlayed, &TriggerContext::for_player(player));
        outcomes
    }

    // === Trigger dispatch ===

    /// Fire a named game event.
    ///
    /// Turn boundaries carry their bookkeeping: a player's turn start
    /// resets that player's usage counters and summoning sickness; turn
    /// end sweeps temporary modifiers, grants and cost reductions.
    pub fn trigger_event(&mut self, state: &mut GameState, trigger: TriggerName, ctx: &TriggerContext) {
        if trigger == TriggerName::OnTurnStart {
            if let Some(player) = ctx.player {
                self.start_of_turn(state, player);
            }
        }

        // Snapshot so registrations caused by these effects cannot
        // invalidate the iteration.
        let entries = self.triggers.matching(trigger, ctx);
        for entry in entries {
            let source = EffectSource::permanent(&entry.card_name, entry.location);
            self.resolve_effects_inner(state, &entry.ability.effects, &source, ctx.target.as_ref());
        }

        if trigger == TriggerName::OnTurnEnd {
            self.end_of_turn_sweep(state);
        }
    }

    fn start_of_turn(&mut self, state: &mut GameState, player: PlayerId) {
        for registrations in self.activated.iter_mut().filter_map(|(loc, regs)| {
            (loc.player == player).then_some(regs)
        }) {
            for registration in registrations {
                registration.uses_this_turn = 0;
            }
        }

        for location in state.creatures_of(player) {
            if let Some(permanent) = state.permanent_mut(location) {
                permanent.summoning_sickness = false;
            }
        }
    }

    fn end_of_turn_sweep(&mut self, state: &mut GameState) {
        let affected = self.modifiers.sweep_temporary();
        for location in affected {
            self.clamp_health_to_cap(state, location);
            self.view.update_card_display(location);
        }

        for location in state.occupied_locations() {
            if let Some(permanent) = state.permanent_mut(location) {
                permanent.sweep_temporary_grants();
            }
        }

        self.cost_reductions.retain(|c| c.duration == Duration::Permanent);
        self.recalculate_auras(state);
    }

    // === Effect resolution ===

    /// Resolve a list of effects from a source, with an optional explicit
    /// target answering any player-chosen specifier.
    pub fn resolve_effects(
        &mut self,
        state: &mut GameState,
        effects: &[EffectDef],
        source: &EffectSource,
        explicit: Option<TargetRef>,
    ) -> Vec<EffectOutcome> {
        self.resolve_effects_inner(state, effects, source, explicit.as_ref())
    }

    fn resolve_effects_inner(
        &mut self,
        state: &mut GameState,
        effects: &[EffectDef],
        source: &EffectSource,
        explicit: Option<&TargetRef>,
    ) -> Vec<EffectOutcome> {
        effects
            .iter()
            .map(|effect| self.resolve_effect(state, effect, source, explicit))
            .collect()
    }

    fn resolve_effect(
        &mut self,
        state: &mut GameState,
        effect: &EffectDef,
        source: &EffectSource,
        explicit: Option<&TargetRef>,
    ) -> EffectOutcome {
        match effect {
            EffectDef::StatModifier { stat, value, target, filter, duration, condition, per } => {
                if condition.as_ref().is_some_and(|c| !c.is_met(state, source.controller)) {
                    return EffectOutcome::Skipped;
                }
                let Some(targets) =
                    self.expand_targets(state, *target, filter.as_ref(), source, explicit)
                else {
                    return EffectOutcome::Skipped;
                };
                let amount = value * per.map_or(1, |p| p.count(state, source.controller));

                let mut touched = 0;
                for target_ref in &targets {
                    let TargetRef::Permanent { location } = target_ref else { continue };
                    match duration {
                        Duration::Permanent => {
                            let Some(permanent) = state.permanent_mut(*location) else {
                                continue;
                            };
                            apply_stat(permanent, *stat, amount);
                        }
                        Duration::UntilEndOfTurn => {
                            self.modifiers.add(
                                *location,
                                ActiveModifier {
                                    source_card: source.name.clone(),
                                    source: source.location,
                                    stat: *stat,
                                    value: amount,
                                    duration: *duration,
                                },
                            );
                        }
                    }
                    self.clamp_health_to_cap(state, *location);
                    self.view.update_card_display(*location);
                    touched += 1;
                }
                EffectOutcome::Applied { targets: touched }
            }

            EffectDef::Damage { value, target, filter, condition } => {
                if condition.as_ref().is_some_and(|c| !c.is_met(state, source.controller)) {
                    return EffectOutcome::Skipped;
                }
                let Some(targets) =
                    self.expand_targets(state, *target, filter.as_ref(), source, explicit)
                else {
                    return EffectOutcome::Skipped;
                };

                let attacker = source.location.map(TargetRef::permanent);
                let mut touched = 0;
                for target_ref in targets {
                    match target_ref {
                        TargetRef::Player { player } => {
                            state.deal_damage_to_player(player, *value);
                            self.view.show_damage_to_player(player, *value);
                            touched += 1;
                        }
                        TargetRef::Permanent { location } => {
                            if self.damage_permanent(state, location, *value, attacker) {
                                touched += 1;
                            }
                        }
                    }
                }
                EffectOutcome::Applied { targets: touched }
            }

            EffectDef::Heal { value, target, filter } => {
                let Some(targets) =
                    self.expand_targets(state, *target, filter.as_ref(), source, explicit)
                else {
                    return EffectOutcome::Skipped;
                };

                let mut touched = 0;
                for target_ref in targets {
                    match target_ref {
                        TargetRef::Player { player } => {
                            state.heal_player(player, *value);
                            touched += 1;
                        }
                        TargetRef::Permanent { location } => {
                            let Some(cap) =
                                self.get_modified_stats(state, location).map(|s| s.health)
                            else {
                                continue;
                            };
                            if let Some(permanent) = state.permanent_mut(location) {
                                permanent.current_health =
                                    (permanent.current_health + value).min(cap);
                                self.view.update_card_display(location);
                                touched += 1;
                            }
                        }
                    }
                }
                EffectOutcome::Applied { targets: touched }
            }

            EffectDef::DrawCard { value } => {
                let count = (*value).max(0) as usize;
                let drawn = state.draw_cards(source.controller, count);
                for _ in 0..drawn {
                    self.trigger_event(
                        state,
                        TriggerName::OnCardDrawn,
                        &TriggerContext::for_player(source.controller),
                    );
                }
                self.view.update_board(state);
                EffectOutcome::Applied { targets: drawn }
            }

            EffectDef::GainEnergy { value } => {
                state.add_energy(source.controller, *value);
                EffectOutcome::Applied { targets: 1 }
            }

            EffectDef::AbilityGrant { ability, target, value, filter, duration } => {
                let Some(targets) =
                    self.expand_targets(state, *target, filter.as_ref(), source, explicit)
                else {
                    return EffectOutcome::Skipped;
                };

                let mut touched = 0;
                for target_ref in targets {
                    let TargetRef::Permanent { location } = target_ref else { continue };
                    if let Some(permanent) = state.permanent_mut(location) {
                        permanent.grant(GrantedAbility {
                            keyword: *ability,
                            value: *value,
                            source: source.name.clone(),
                            duration: *duration,
                        });
                        self.view.update_card_display(location);
                        touched += 1;
                    }
                }
                EffectOutcome::Applied { targets: touched }
            }

            EffectDef::CostReduction { value, duration } => {
                self.cost_reductions.push(CostReduction {
                    source: source.location,
                    player: source.controller,
                    value: *value,
                    duration: *duration,
                });
                EffectOutcome::Applied { targets: 1 }
            }

            EffectDef::SummonToken { token, zone } => {
                let mut card = CardDefinition::new(&token.name, CardKind::Character, 0)
                    .with_stats(token.attack, token.defense, token.health);
                if let Some(element) = token.element {
                    card = card.with_element(element);
                }
                if let Some(class) = token.class {
                    card = card.with_class(class);
                }
                let zone = zone
                    .or_else(|| card.deploy_zone())
                    .unwrap_or(Zone::FrontLine);

                match state.place(source.controller, zone, card) {
                    Some(location) => {
                        self.register_internal(state, location, true);
                        self.recalculate_auras(state);
                        EffectOutcome::Applied { targets: 1 }
                    }
                    // Zone full: the summon quietly fizzles.
                    None => EffectOutcome::Skipped,
                }
            }

            EffectDef::Silence { target, filter } => {
                let Some(targets) =
                    self.expand_targets(state, *target, filter.as_ref(), source, explicit)
                else {
                    return EffectOutcome::Skipped;
                };

                let mut touched = 0;
                for target_ref in targets {
                    let TargetRef::Permanent { location } = target_ref else { continue };
                    let Some(permanent) = state.permanent_mut(location) else { continue };
                    permanent.silenced = true;
                    permanent.clear_granted();

                    // Strip its registrations but keep stat modifiers on it.
                    self.triggers.remove_location(location);
                    self.auras.remove_source(location);
                    self.activated.remove(&location);
                    self.view.update_card_display(location);
                    touched += 1;
                }
                if touched > 0 {
                    self.recalculate_auras(state);
                }
                EffectOutcome::Applied { targets: touched }
            }

            EffectDef::Destroy { target, filter } => {
                let Some(targets) =
                    self.expand_targets(state, *target, filter.as_ref(), source, explicit)
                else {
                    return EffectOutcome::Skipped;
                };

                let mut touched = 0;
                for target_ref in targets {
                    let TargetRef::Permanent { location } = target_ref else { continue };
                    if state.permanent(location).is_some() {
                        self.destroy_permanent(state, location);
                        touched += 1;
                    }
                }
                EffectOutcome::Applied { targets: touched }
            }

            EffectDef::ReturnToHand { target } => {
                let Some(targets) = self.expand_targets(state, *target, None, source, explicit)
                else {
                    return EffectOutcome::Skipped;
                };

                let mut touched = 0;
                for target_ref in targets {
                    let TargetRef::Permanent { location } = target_ref else { continue };
                    if self.return_to_hand(state, location) {
                        touched += 1;
                    }
                }
                EffectOutcome::Applied { targets: touched }
            }

            EffectDef::MoveCard { target, zone } => {
                let Some(targets) = self.expand_targets(state, *target, None, source, explicit)
                else {
                    return EffectOutcome::Skipped;
                };

                let mut touched = 0;
                for target_ref in targets {
                    let TargetRef::Permanent { location } = target_ref else { continue };
                    if self.move_permanent(state, location, *zone).is_some() {
                        touched += 1;
                    }
                }
                EffectOutcome::Applied { targets: touched }
            }

            EffectDef::LookAtCards { value } => {
                let count = (*value).max(0) as usize;
                let cards = state.peek_deck(source.controller, count);
                self.view.reveal_cards(source.controller, &cards);
                EffectOutcome::Applied { targets: cards.len() }
            }
        }
    }

    /// Expand a target specifier, drawing from the game RNG for random
    /// picks. `None` means a choice is required but none was supplied.
    fn expand_targets(
        &mut self,
        state: &mut GameState,
        spec: TargetSpec,
        filter: Option<&TargetFilter>,
        source: &EffectSource,
        explicit: Option<&TargetRef>,
    ) -> Option<Vec<TargetRef>> {
        match targeting::resolve(spec, filter, source, state, explicit) {
            Resolution::Targets(targets) => Some(targets),
            Resolution::NeedsChoice => None,
            Resolution::PickRandom(candidates) => {
                let index = state.rng.gen_range(0..candidates.len());
                Some(vec![candidates[index]])
            }
        }
    }

    /// Damage one permanent: subtract its damage reduction, floor at zero,
    /// fire the damage-taken trigger, and destroy it if it died.
    fn damage_permanent(
        &mut self,
        state: &mut GameState,
        location: Location,
        amount: i32,
        attacker: Option<TargetRef>,
    ) -> bool {
        let Some(permanent) = state.permanent(location) else {
            return false;
        };
        let dealt = (amount - permanent.damage_reduction()).max(0);

        if let Some(permanent) = state.permanent_mut(location) {
            permanent.current_health -= dealt;
        }
        self.view.update_card_display(location);

        if dealt > 0 {
            let mut ctx = TriggerContext::at(location).with_amount(dealt);
            if let Some(attacker) = attacker {
                ctx = ctx.with_target(attacker);
            }
            self.trigger_event(state, TriggerName::OnDamageTaken, &ctx);
        }

        // Re-check: the damage-taken handler may have removed or healed it.
        if state.permanent(location).is_some_and(Permanent::is_dead) {
            self.destroy_permanent(state, location);
        }
        true
    }

    // === Removal ===

    /// Destroy the permanent at `location`: graveyard it, purge every
    /// registry keyed to the slot, recompute auras, then run its
    /// leave-play and death effects. The only legal removal path.
    pub fn destroy_permanent(&mut self, state: &mut GameState, location: Location) {
        let Some(permanent) = state.remove(location) else {
            // Registry desync is a no-op, not an error.
            return;
        };

        // Snapshot the dying card's own leave/death entries before the
        // purge erases them.
        let ctx = TriggerContext::at(location);
        let mut postmortem = self.triggers.matching(TriggerName::OnLeavePlay, &ctx);
        postmortem.extend(self.triggers.matching(TriggerName::OnDeath, &ctx));

        state.player_mut(location.player).graveyard.push(permanent.card);
        self.purge_location(location);
        self.recalculate_auras(state);

        for entry in postmortem {
            let source = EffectSource {
                name: entry.card_name,
                controller: location.player,
                location: None,
            };
            self.resolve_effects_inner(state, &entry.ability.effects, &source, None);
        }

        self.view.update_board(state);
    }

    /// Return the permanent at `location` to its owner's hand (pristine
    /// definition; a full hand overflows to the graveyard). Purges its
    /// registries like destruction, but fires no death effects.
    pub fn return_to_hand(&mut self, state: &mut GameState, location: Location) -> bool {
        let Some(permanent) = state.remove(location) else {
            return false;
        };

        self.purge_location(location);

        let side = state.player_mut(location.player);
        if side.hand.len() < HAND_LIMIT {
            side.hand.push(permanent.card);
        } else {
            side.graveyard.push(permanent.card);
        }

        self.recalculate_auras(state);
        true
    }

    /// Move a permanent to the first free slot of another zone on the same
    /// side, re-keying every registration it owns. Returns the new
    /// location, `None` when the destination is full.
    pub fn move_permanent(
        &mut self,
        state: &mut GameState,
        from: Location,
        zone: Zone,
    ) -> Option<Location> {
        if from.zone == zone {
            return Some(from);
        }
        let slot = state.player(from.player).free_slot(zone)?;
        let to = Location::new(from.player, zone, slot);

        let permanent = state.remove(from)?;
        let placed = state.place_at(to, permanent);
        debug_assert!(placed, "destination slot was checked free");

        self.modifiers.rekey_target(from, to);
        self.modifiers.rekey_source(from, to);
        self.triggers.rekey(from, to);
        self.auras.rekey(from, to);
        if let Some(registrations) = self.activated.remove(&from) {
            self.activated.insert(to, registrations);
        }
        if let Some(attachments) = self.equipment.remove(&from) {
            self.equipment.insert(to, attachments);
        }
        for reduction in &mut self.cost_reductions {
            if reduction.source == Some(from) {
                reduction.source = Some(to);
            }
        }

        self.recalculate_auras(state);
        Some(to)
    }

    // === Stat resolution ===

    /// Effective stats of the permanent at `location`: persistent base
    /// (with baked edits) + active modifiers + equipment + aura bonuses,
    /// floored at zero.
    #[must_use]
    pub fn get_modified_stats(&self, state: &GameState, location: Location) -> Option<StatLine> {
        let permanent = state.permanent(location)?;
        let modifiers = self.modifiers.sum_for(location);

        let mut equipment = StatLine::default();
        if let Some(attachments) = self.equipment.get(&location) {
            for attachment in attachments {
                equipment.attack += attachment.card.stats.attack;
                equipment.defense += attachment.card.stats.defense;
                equipment.health += attachment.card.stats.health;
            }
        }

        Some(StatLine {
            attack: (permanent.attack + modifiers.attack + equipment.attack + permanent.aura.attack)
                .max(0),
            defense: (permanent.defense
                + modifiers.defense
                + equipment.defense
                + permanent.aura.defense)
                .max(0),
            health: (permanent.health + modifiers.health + equipment.health + permanent.aura.health)
                .max(0),
        })
    }

    /// Clamp current health into `[0, effective cap]` after a cap change.
    /// Lost health is never restored implicitly.
    fn clamp_health_to_cap(&self, state: &mut GameState, location: Location) {
        let Some(cap) = self.get_modified_stats(state, location).map(|s| s.health) else {
            return;
        };
        if let Some(permanent) = state.permanent_mut(location) {
            permanent.current_health = permanent.current_health.clamp(0, cap);
        }
    }

    // === Auras ===

    /// Recompute every aura bonus from scratch.
    ///
    /// Zeroes all aura blocks, then re-applies each registered aura whose
    /// source is confirmed in play. Intentionally O(auras x creatures);
    /// idempotent by construction.
    pub fn recalculate_auras(&mut self, state: &mut GameState) {
        for location in state.occupied_locations() {
            if let Some(permanent) = state.permanent_mut(location) {
                permanent.aura.clear();
            }
        }

        for aura in self.auras.snapshot() {
            let live = state
                .permanent(aura.location)
                .is_some_and(|p| p.name() == aura.card_name && !p.silenced);
            if !live {
                continue;
            }

            let source = EffectSource::permanent(&aura.card_name, aura.location);
            for effect in &aura.ability.effects {
                let EffectDef::StatModifier { stat, value, target, filter, condition, per, .. } =
                    effect
                else {
                    debug!("aura '{}' carries a non-stat effect, ignored", aura.card_name);
                    continue;
                };
                if condition.as_ref().is_some_and(|c| !c.is_met(state, source.controller)) {
                    continue;
                }
                let amount = value * per.map_or(1, |p| p.count(state, source.controller));

                let resolution = targeting::resolve(*target, filter.as_ref(), &source, state, None);
                let Resolution::Targets(targets) = resolution else {
                    // Chosen or random targets make recomputation
                    // nondeterministic; auras cannot use them.
                    debug!("aura '{}' has a non-recomputable target", aura.card_name);
                    continue;
                };

                for target_ref in targets {
                    let TargetRef::Permanent { location } = target_ref else { continue };
                    if let Some(permanent) = state.permanent_mut(location) {
                        match stat {
                            StatKind::Attack => permanent.aura.attack += amount,
                            StatKind::Defense => permanent.aura.defense += amount,
                            StatKind::Health => permanent.aura.health += amount,
                            StatKind::Both => {
                                permanent.aura.attack += amount;
                                permanent.aura.defense += amount;
                            }
                        }
                    }
                }
            }
        }

        for location in state.occupied_locations() {
            self.clamp_health_to_cap(state, location);
        }
        self.view.update_board(state);
    }

    // === Equipment ===

    /// Attach an equipment card to a creature. Its stats join the
    /// creature's effective stats and its abilities register at the
    /// creature's slot, living and dying with it.
    pub fn equip_creature(
        &mut self,
        state: &mut GameState,
        equipment: &CardDefinition,
        target: Location,
    ) -> bool {
        let Some(permanent) = state.permanent(target) else {
            return false;
        };
        if permanent.card.kind != CardKind::Character {
            return false;
        }

        self.equipment
            .entry(target)
            .or_default()
            .push(EquipmentAttachment { card: equipment.clone() });

        if !equipment.abilities.is_empty() {
            self.register_abilities(state, target, &equipment.name, equipment.abilities.clone(), true);
        }

        self.recalculate_auras(state);
        self.view.update_card_display(target);
        true
    }

    /// Equipment attached to a creature.
    #[must_use]
    pub fn equipment_at(&self, location: Location) -> &[EquipmentAttachment] {
        self.equipment.get(&location).map_or(&[], |v| v.as_slice())
    }

    // === Activated abilities ===

    /// The activated abilities registered at a slot.
    #[must_use]
    pub fn activated_abilities(&self, location: Location) -> &[ActivatedRegistration] {
        self.activated.get(&location).map_or(&[], |v| v.as_slice())
    }

    /// Can the ability be activated right now? Checks turn ownership, the
    /// once-per-turn limit, and the energy cost.
    #[must_use]
    pub fn can_activate(&self, state: &GameState, location: Location, index: usize) -> bool {
        let Some(registration) = self.activated.get(&location).and_then(|r| r.get(index)) else {
            return false;
        };
        if location.player != state.current_player {
            return false;
        }
        if registration.once_per_turn && registration.uses_this_turn >= 1 {
            return false;
        }
        state.player(location.player).energy >= registration.cost
    }

    /// Activate an ability. Pays its cost and counts the use, then
    /// resolves its effects. When a target choice is needed and missing,
    /// the activation parks as pending and nothing is paid yet.
    pub fn activate_ability(
        &mut self,
        state: &mut GameState,
        location: Location,
        index: usize,
        chosen: Option<TargetRef>,
    ) -> bool {
        if !self.can_activate(state, location, index) {
            return false;
        }
        let Some(registration) =
            self.activated.get(&location).and_then(|r| r.get(index)).cloned()
        else {
            return false;
        };
        let source = EffectSource::permanent(&registration.card_name, location);

        if chosen.is_none() && registration.ability.effects.iter().any(EffectDef::needs_choice) {
            self.pending = Some(PendingEffects {
                effects: registration.ability.effects,
                source,
                payment: Some(PendingPayment {
                    cost: registration.cost,
                    usage: Some((location, index)),
                }),
                fire_after: None,
            });
            return true;
        }

        self.pay_activation(state, location, index, registration.cost);
        self.resolve_effects_inner(state, &registration.ability.effects, &source, chosen.as_ref());
        true
    }

    fn pay_activation(&mut self, state: &mut GameState, location: Location, index: usize, cost: i32) {
        if cost > 0 {
            state.spend_energy(location.player, cost);
        }
        if let Some(registration) =
            self.activated.get_mut(&location).and_then(|r| r.get_mut(index))
        {
            registration.uses_this_turn += 1;
        }
    }

    // === Pending targeting ===

    /// Park effects until the player picks a target. No state changes.
    pub fn begin_targeting(&mut self, effects: Vec<EffectDef>, source: EffectSource) {
        self.pending = Some(PendingEffects { effects, source, payment: None, fire_after: None });
    }

    /// The effects currently awaiting a target, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingEffects> {
        self.pending.as_ref()
    }

    /// Supply the chosen target and resolve the parked effects, paying any
    /// deferred activation cost first.
    pub fn complete_targeting(
        &mut self,
        state: &mut GameState,
        target: TargetRef,
    ) -> Vec<EffectOutcome> {
        let Some(pending) = self.pending.take() else {
            return Vec::new();
        };

        if let Some(payment) = pending.payment {
            if let Some((location, index)) = payment.usage {
                // The ability may have left play or lost its legality
                // while the player was deciding.
                if !self.can_activate(state, location, index) {
                    return vec![EffectOutcome::Failed(
                        "pending ability is no longer activatable".to_string(),
                    )];
                }
                self.pay_activation(state, location, index, payment.cost);
            }
        }

        let outcomes =
            self.resolve_effects_inner(state, &pending.effects, &pending.source, Some(&target));

        if let Some(trigger) = pending.fire_after {
            self.trigger_event(
                state,
                trigger,
                &TriggerContext::for_player(pending.source.controller),
            );
        }
        outcomes
    }

    /// Abandon the pending effects without mutating anything.
    pub fn cancel_targeting(&mut self) -> bool {
        self.pending.take().is_some()
    }

    // === Costs ===

    /// A card's cost for a player after active cost reductions, floored at
    /// zero.
    #[must_use]
    pub fn effective_cost(&self, player: PlayerId, card: &CardDefinition) -> i32 {
        let reduction: i32 = self
            .cost_reductions
            .iter()
            .filter(|r| r.player == player)
            .map(|r| r.value)
            .sum();
        (card.cost - reduction).max(0)
    }

    // === Introspection (debugging and tests) ===

    /// Number of active modifiers affecting a slot.
    #[must_use]
    pub fn modifier_count(&self, location: Location) -> usize {
        self.modifiers.for_target(location).len()
    }

    /// Number of registered auras.
    #[must_use]
    pub fn aura_count(&self) -> usize {
        self.auras.len()
    }
}

fn apply_stat(permanent: &mut Permanent, stat: StatKind, amount: i32) {
    match stat {
        StatKind::Attack => permanent.attack += amount,
        StatKind::Defense => permanent.defense += amount,
        StatKind::Health => permanent.health += amount,
        StatKind::Both => {
            permanent.attack += amount;
            permanent.defense += amount;
        }
    }
}
