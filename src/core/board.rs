//! Board slot addressing.
//!
//! Every permanent in play occupies exactly one board slot, addressed by a
//! `Location`: which player's side, which zone, which position. Locations
//! are stable keys - every registry in the ability engine is keyed by them,
//! and a slot's registrations must be purged before the slot is reused.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// A board zone on one player's side.
///
/// Front-line slots hold melee characters, back-line slots hold ranged and
/// support characters, structure slots hold structures. Serde accepts the
/// legacy `firstLine`/`secondLine` spellings from old save files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    #[serde(alias = "firstLine", alias = "first_line")]
    FrontLine,
    #[serde(alias = "secondLine", alias = "second_line")]
    BackLine,
    Structures,
}

impl Zone {
    /// Number of slots in this zone.
    #[must_use]
    pub const fn capacity(self) -> usize {
        match self {
            Zone::FrontLine | Zone::BackLine => 4,
            Zone::Structures => 3,
        }
    }

    /// Does this zone hold characters (as opposed to structures)?
    #[must_use]
    pub const fn is_line(self) -> bool {
        matches!(self, Zone::FrontLine | Zone::BackLine)
    }

    /// Iterate over all zones.
    pub fn all() -> impl Iterator<Item = Zone> {
        [Zone::FrontLine, Zone::BackLine, Zone::Structures].into_iter()
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Zone::FrontLine => "front_line",
            Zone::BackLine => "back_line",
            Zone::Structures => "structures",
        };
        f.write_str(name)
    }
}

/// The address of a board slot: (player, zone, position).
///
/// At most one permanent occupies a given location at a time. Displays as
/// `player-zone-position`, the key format of the original registries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub player: PlayerId,
    pub zone: Zone,
    pub slot: u8,
}

impl Location {
    /// Create a location.
    #[must_use]
    pub const fn new(player: PlayerId, zone: Zone, slot: u8) -> Self {
        Self { player, zone, slot }
    }

    /// Is the slot index within the zone's capacity?
    #[must_use]
    pub fn is_valid(self) -> bool {
        (self.slot as usize) < self.zone.capacity()
    }

    /// Iterate over every valid location on a player's side.
    pub fn all_for(player: PlayerId) -> impl Iterator<Item = Location> {
        Zone::all().flat_map(move |zone| {
            (0..zone.capacity() as u8).map(move |slot| Location::new(player, zone, slot))
        })
    }

    /// Iterate over every valid location on the board.
    pub fn all() -> impl Iterator<Item = Location> {
        PlayerId::all().flat_map(Location::all_for)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.player.0 + 1, self.zone, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_capacity() {
        assert_eq!(Zone::FrontLine.capacity(), 4);
        assert_eq!(Zone::BackLine.capacity(), 4);
        assert_eq!(Zone::Structures.capacity(), 3);
    }

    #[test]
    fn test_location_validity() {
        assert!(Location::new(PlayerId::ONE, Zone::FrontLine, 3).is_valid());
        assert!(!Location::new(PlayerId::ONE, Zone::FrontLine, 4).is_valid());
        assert!(!Location::new(PlayerId::TWO, Zone::Structures, 3).is_valid());
    }

    #[test]
    fn test_location_display() {
        let loc = Location::new(PlayerId::TWO, Zone::BackLine, 2);
        assert_eq!(format!("{}", loc), "2-back_line-2");
    }

    #[test]
    fn test_all_locations() {
        // 2 players x (4 + 4 + 3) slots
        assert_eq!(Location::all().count(), 22);
        assert_eq!(Location::all_for(PlayerId::ONE).count(), 11);
    }

    #[test]
    fn test_legacy_zone_alias() {
        let zone: Zone = serde_json::from_str("\"firstLine\"").unwrap();
        assert_eq!(zone, Zone::FrontLine);
        let zone: Zone = serde_json::from_str("\"secondLine\"").unwrap();
        assert_eq!(zone, Zone::BackLine);
        let zone: Zone = serde_json::from_str("\"structures\"").unwrap();
        assert_eq!(zone, Zone::Structures);
    }

    #[test]
    fn test_zone_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Zone::FrontLine).unwrap(), "\"front_line\"");
    }
}
