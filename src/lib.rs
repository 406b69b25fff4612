//! # lirya-ccg
//!
//! The abilities/effects resolution engine of the Lirya collectible card
//! game: card data, ability classification, an effect interpreter,
//! targeting, trigger dispatch, aura maintenance, and stat-modifier
//! bookkeeping.
//!
//! ## Design
//!
//! 1. **One context object**: every registry (modifiers, auras, triggers,
//!    activated abilities, equipment) is a field of [`AbilityEngine`],
//!    injected into the game loop. No globals, no parallel
//!    implementations.
//!
//! 2. **Structured effects only**: abilities resolve through a tagged
//!    effect DSL ([`EffectDef`]). Legacy free-text cards are translated
//!    into it at load time by the isolated `cards::legacy` adapter.
//!
//! 3. **Auras recompute, never accumulate**: continuous bonuses are
//!    rebuilt from scratch after every board change, so recomputation is
//!    idempotent and membership can never go stale.
//!
//! 4. **Nothing is fatal**: malformed input is logged and skipped,
//!    illegal actions are rejected with `false`, and a vanished target
//!    means the effect quietly does not happen.
//!
//! ## Modules
//!
//! - `core`: players, board addressing, RNG, game state, persistence
//! - `cards`: card/ability definitions, permanents, the legacy adapter,
//!   the card registry
//! - `effects`: the effect DSL and targeting resolution
//! - `abilities`: the engine and its registries
//! - `view`: render notification sink
//! - `error`: data-loading errors

pub mod abilities;
pub mod cards;
pub mod core;
pub mod effects;
pub mod error;
pub mod view;

// Re-export commonly used types
pub use crate::core::{
    GameRng, GameState, Location, Phase, PlayerId, PlayerMap, PlayerState, Zone,
};

pub use crate::cards::{
    AbilityDefinition, AbilityKind, BaseStats, CardClass, CardDefinition, CardKind, CardRegistry,
    DeckEntry, Element, GrantedAbility, Keyword, Permanent, Rarity, TriggerName, UsageLimit,
};

pub use crate::effects::{
    Comparator, CountSubject, Duration, EffectCondition, EffectDef, EffectSource, StatKind,
    TargetFilter, TargetRef, TargetSpec, TokenSpec,
};

pub use crate::abilities::{
    AbilityEngine, ActiveModifier, EffectOutcome, PendingEffects, StatLine, TriggerContext,
};

pub use crate::error::DataError;

pub use crate::view::{BoardView, NullView};
