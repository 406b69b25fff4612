//! Card data: definitions, abilities, runtime instances, and loading.

pub mod ability;
pub mod definition;
pub mod instance;
pub mod legacy;
pub mod registry;

pub use ability::{AbilityDefinition, AbilityKind, Keyword, TriggerName, UsageLimit};
pub use definition::{BaseStats, CardClass, CardDefinition, CardKind, Element, Rarity};
pub use instance::{AuraBonus, GrantedAbility, Permanent};
pub use registry::{CardRegistry, DeckEntry};
