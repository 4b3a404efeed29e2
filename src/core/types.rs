//! Core type definitions used throughout the codebase

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Gold is always a whole amount
pub type Gold = u64;

/// Handle into the map grid (`y * width + x`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
pub struct TileRef(pub u32);

impl TileRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Player identifier. Raw value 0 is reserved for unowned tiles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
pub struct PlayerId(pub u16);

impl PlayerId {
    pub fn index(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }
}

/// Unit identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
pub struct UnitId(pub u32);

/// Attack identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
pub struct AttackId(pub u32);

/// Alliance identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
pub struct AllianceId(pub u32);

/// Who holds a tile, or who an attack is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Owner {
    TerraNullius,
    Player(PlayerId),
}

impl Owner {
    pub fn from_raw(raw: u16) -> Self {
        if raw == 0 {
            Owner::TerraNullius
        } else {
            Owner::Player(PlayerId(raw))
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            Owner::TerraNullius => 0,
            Owner::Player(id) => id.0,
        }
    }

    pub fn is_player(self) -> bool {
        matches!(self, Owner::Player(_))
    }

    pub fn player(self) -> Option<PlayerId> {
        match self {
            Owner::Player(id) => Some(id),
            Owner::TerraNullius => None,
        }
    }
}

impl From<PlayerId> for Owner {
    fn from(id: PlayerId) -> Self {
        Owner::Player(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerType {
    Human,
    Bot,
    FakeHuman,
}

/// Team tag used by team games
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
pub struct Team(pub u8);

/// Severity of an in-game message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSeverity {
    Success,
    Info,
    Warn,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_raw_round_trip() {
        assert_eq!(Owner::from_raw(0), Owner::TerraNullius);
        assert_eq!(Owner::from_raw(7), Owner::Player(PlayerId(7)));
        assert_eq!(Owner::Player(PlayerId(7)).raw(), 7);
        assert_eq!(Owner::TerraNullius.player(), None);
    }

    #[test]
    fn test_player_index_is_zero_based() {
        assert_eq!(PlayerId(1).index(), 0);
        assert_eq!(PlayerId(4).index(), 3);
    }

    #[test]
    fn test_ids_order_by_value() {
        let mut ids = vec![UnitId(3), UnitId(1), UnitId(2)];
        ids.sort();
        assert_eq!(ids, vec![UnitId(1), UnitId(2), UnitId(3)]);
        assert_eq!(TileRef(12).to_string(), "12");
    }
}
