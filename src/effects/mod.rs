//! The effect DSL and targeting.

pub mod effect;
pub mod targeting;

pub use effect::{
    Comparator, CountSubject, Duration, EffectCondition, EffectDef, StatKind, TokenSpec,
};
pub use targeting::{EffectSource, Resolution, TargetFilter, TargetRef, TargetSpec};
