//! The abilities/effects resolution engine.
//!
//! `AbilityEngine` is the single context object owning every runtime
//! registry; the submodules hold the registry types it composes.

pub mod auras;
pub mod engine;
pub mod modifiers;
pub mod triggers;

pub use auras::{AuraRegistration, AuraStore};
pub use engine::{
    AbilityEngine, ActivatedRegistration, EffectOutcome, EquipmentAttachment, PendingEffects,
};
pub use modifiers::{ActiveModifier, ModifierStore, StatLine};
pub use triggers::{TriggerContext, TriggerDispatcher, TriggerEntry};
