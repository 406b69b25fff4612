//! Render notification sink.
//!
//! The engine tells the presentation layer what changed and never reads
//! anything back. Implementations redraw the DOM, play animations, or do
//! nothing at all (`NullView`, the default and the test harness choice).

use crate::cards::CardDefinition;
use crate::core::{GameState, Location, PlayerId};

/// Notifications the engine emits after mutating state.
///
/// All methods default to no-ops so implementations only override what
/// they render.
pub trait BoardView {
    /// The board changed broadly: redraw everything.
    fn update_board(&mut self, _state: &GameState) {}

    /// One permanent's displayed stats changed.
    fn update_card_display(&mut self, _location: Location) {}

    /// A player took damage.
    fn show_damage_to_player(&mut self, _player: PlayerId, _amount: i32) {}

    /// Cards were revealed to a player (deck peeks).
    fn reveal_cards(&mut self, _player: PlayerId, _cards: &[CardDefinition]) {}
}

/// A view that renders nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullView;

impl BoardView for NullView {}
