//! Game state: players, board slots, and persistence.
//!
//! `GameState` owns everything the rules mutate: both players' life,
//! energy, deck, hand, graveyard and board slots, plus turn tracking and
//! the RNG. The ability engine's registries are derived state and live
//! outside it (see `abilities::AbilityEngine::rebuild` for reloads).
//!
//! Persistence is a plain JSON serialization of the current shape; there
//! is no versioning scheme.

use serde::{Deserialize, Serialize};

use super::board::{Location, Zone};
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{CardDefinition, CardKind, Permanent};
use crate::error::DataError;

/// Life total players start with, and the cap healing cannot exceed.
pub const LIFE_CAP: i32 = 20;

/// Maximum energy a player can build up to.
pub const ENERGY_CAP: i32 = 10;

/// Maximum hand size; draws beyond it are lost.
pub const HAND_LIMIT: usize = 10;

/// Coarse turn phase, carried for save files and the UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Setup,
    Main,
    Combat,
    End,
}

/// One player's side of the game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub life: i32,
    pub energy: i32,
    pub max_energy: i32,
    pub deck: Vec<CardDefinition>,
    pub hand: Vec<CardDefinition>,
    pub graveyard: Vec<CardDefinition>,
    pub front_line: [Option<Permanent>; 4],
    pub back_line: [Option<Permanent>; 4],
    pub structures: [Option<Permanent>; 3],
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            life: LIFE_CAP,
            energy: 0,
            max_energy: 0,
            deck: Vec::new(),
            hand: Vec::new(),
            graveyard: Vec::new(),
            front_line: Default::default(),
            back_line: Default::default(),
            structures: Default::default(),
        }
    }
}

impl PlayerState {
    /// The slots of a zone.
    #[must_use]
    pub fn line(&self, zone: Zone) -> &[Option<Permanent>] {
        match zone {
            Zone::FrontLine => &self.front_line,
            Zone::BackLine => &self.back_line,
            Zone::Structures => &self.structures,
        }
    }

    fn line_mut(&mut self, zone: Zone) -> &mut [Option<Permanent>] {
        match zone {
            Zone::FrontLine => &mut self.front_line,
            Zone::BackLine => &mut self.back_line,
            Zone::Structures => &mut self.structures,
        }
    }

    /// Index of the first free slot in a zone, if any.
    #[must_use]
    pub fn free_slot(&self, zone: Zone) -> Option<u8> {
        self.line(zone).iter().position(Option::is_none).map(|i| i as u8)
    }
}

/// Complete game state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub players: PlayerMap<PlayerState>,
    pub current_player: PlayerId,
    pub turn_number: u32,
    pub phase: Phase,
    pub winner: Option<PlayerId>,
    pub rng: GameRng,
}

impl GameState {
    /// Create a fresh game state.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            players: PlayerMap::default(),
            current_player: PlayerId::ONE,
            turn_number: 1,
            phase: Phase::default(),
            winner: None,
            rng: GameRng::new(seed),
        }
    }

    /// A player's side.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    /// A player's side, mutably.
    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player]
    }

    // === Board slots ===

    /// The permanent at a location, if the slot is occupied.
    #[must_use]
    pub fn permanent(&self, location: Location) -> Option<&Permanent> {
        if !location.is_valid() {
            return None;
        }
        self.players[location.player].line(location.zone)[location.slot as usize].as_ref()
    }

    /// The permanent at a location, mutably.
    pub fn permanent_mut(&mut self, location: Location) -> Option<&mut Permanent> {
        if !location.is_valid() {
            return None;
        }
        self.players[location.player].line_mut(location.zone)[location.slot as usize].as_mut()
    }

    /// Play a card into the first free slot of a zone.
    ///
    /// Returns the occupied location, or `None` when the zone is full.
    pub fn place(&mut self, player: PlayerId, zone: Zone, card: CardDefinition) -> Option<Location> {
        self.place_permanent(player, zone, Permanent::enters(card))
    }

    /// Put an existing permanent into the first free slot of a zone.
    pub fn place_permanent(
        &mut self,
        player: PlayerId,
        zone: Zone,
        permanent: Permanent,
    ) -> Option<Location> {
        let slot = self.players[player].free_slot(zone)?;
        let location = Location::new(player, zone, slot);
        self.players[player].line_mut(zone)[slot as usize] = Some(permanent);
        Some(location)
    }

    /// Put a permanent into a specific slot. Fails if occupied or invalid.
    pub fn place_at(&mut self, location: Location, permanent: Permanent) -> bool {
        if !location.is_valid() || self.permanent(location).is_some() {
            return false;
        }
        self.players[location.player].line_mut(location.zone)[location.slot as usize] =
            Some(permanent);
        true
    }

    /// Empty a slot, returning its occupant.
    pub fn remove(&mut self, location: Location) -> Option<Permanent> {
        if !location.is_valid() {
            return None;
        }
        self.players[location.player].line_mut(location.zone)[location.slot as usize].take()
    }

    /// Every occupied location on the board.
    #[must_use]
    pub fn occupied_locations(&self) -> Vec<Location> {
        Location::all().filter(|loc| self.permanent(*loc).is_some()).collect()
    }

    /// Occupied locations in one zone of one side.
    #[must_use]
    pub fn occupied_in(&self, player: PlayerId, zone: Zone) -> Vec<Location> {
        (0..zone.capacity() as u8)
            .map(|slot| Location::new(player, zone, slot))
            .filter(|loc| self.permanent(*loc).is_some())
            .collect()
    }

    /// All characters on a player's lines, front line first.
    #[must_use]
    pub fn creatures_of(&self, player: PlayerId) -> Vec<Location> {
        [Zone::FrontLine, Zone::BackLine]
            .into_iter()
            .flat_map(|zone| self.occupied_in(player, zone))
            .filter(|loc| {
                self.permanent(*loc)
                    .is_some_and(|p| p.card.kind == CardKind::Character)
            })
            .collect()
    }

    /// All structures on a player's side.
    #[must_use]
    pub fn structures_of(&self, player: PlayerId) -> Vec<Location> {
        self.occupied_in(player, Zone::Structures)
    }

    // === Hand and deck ===

    /// Draw up to `count` cards. Stops quietly on an empty deck or a full
    /// hand; returns how many were actually drawn.
    pub fn draw_cards(&mut self, player: PlayerId, count: usize) -> usize {
        let side = &mut self.players[player];
        let mut drawn = 0;
        for _ in 0..count {
            if side.hand.len() >= HAND_LIMIT {
                break;
            }
            let Some(card) = side.deck.pop() else { break };
            side.hand.push(card);
            drawn += 1;
        }
        drawn
    }

    /// Peek at the top `count` cards of a deck without drawing.
    #[must_use]
    pub fn peek_deck(&self, player: PlayerId, count: usize) -> Vec<CardDefinition> {
        let deck = &self.players[player].deck;
        deck.iter().rev().take(count).cloned().collect()
    }

    /// Shuffle a player's deck.
    pub fn shuffle_deck(&mut self, player: PlayerId) {
        // Split borrows: the deck and the rng live in different fields.
        let GameState { players, rng, .. } = self;
        rng.shuffle(&mut players[player].deck);
    }

    // === Energy ===

    /// Gain energy, capped at the player's current maximum.
    pub fn add_energy(&mut self, player: PlayerId, amount: i32) {
        let side = &mut self.players[player];
        side.energy = (side.energy + amount).min(side.max_energy);
    }

    /// Spend energy if the player has enough.
    pub fn spend_energy(&mut self, player: PlayerId, amount: i32) -> bool {
        let side = &mut self.players[player];
        if side.energy < amount {
            return false;
        }
        side.energy -= amount;
        true
    }

    /// Raise the energy maximum by one (capped) and refill.
    pub fn increase_max_energy(&mut self, player: PlayerId) {
        let side = &mut self.players[player];
        if side.max_energy < ENERGY_CAP {
            side.max_energy += 1;
        }
        side.energy = side.max_energy;
    }

    // === Life ===

    /// Damage a player, clamped at zero. Reaching zero decides the game.
    pub fn deal_damage_to_player(&mut self, player: PlayerId, amount: i32) {
        let side = &mut self.players[player];
        side.life = (side.life - amount).max(0);
        if side.life == 0 && self.winner.is_none() {
            self.winner = Some(player.opponent());
        }
    }

    /// Heal a player, capped at the life maximum.
    pub fn heal_player(&mut self, player: PlayerId, amount: i32) {
        let side = &mut self.players[player];
        side.life = (side.life + amount).min(LIFE_CAP);
    }

    // === Turn tracking ===

    /// Hand the turn to the other player.
    pub fn switch_turn(&mut self) {
        self.current_player = self.current_player.opponent();
        if self.current_player == PlayerId::ONE {
            self.turn_number += 1;
        }
    }

    /// Is the game decided?
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    // === Persistence ===

    /// Serialize the full state to JSON.
    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a state saved by [`GameState::to_json`]. The ability engine
    /// must be rebuilt afterwards (`AbilityEngine::rebuild`).
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }
}
