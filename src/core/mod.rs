//! Core types: players, board addressing, RNG, and game state.

pub mod board;
pub mod player;
pub mod rng;
pub mod state;

pub use board::{Location, Zone};
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::GameRng;
pub use state::{GameState, Phase, PlayerState, ENERGY_CAP, HAND_LIMIT, LIFE_CAP};
