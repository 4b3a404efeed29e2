//! Serializable view of the authoritative state

use serde::Serialize;

use crate::core::types::{Gold, PlayerId, Tick, TileRef};
use crate::game::{Attack, Game, Unit};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
    pub gold: Gold,
    pub troops: f64,
    pub workers: f64,
    pub tiles: Vec<TileRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub ticks: Tick,
    pub players: Vec<PlayerSnapshot>,
    pub units: Vec<Unit>,
    pub attacks: Vec<Attack>,
    /// Raw owner id per tile
    pub owners: Vec<u16>,
    pub fallout: Vec<TileRef>,
}

impl GameSnapshot {
    pub fn capture(game: &Game) -> Self {
        let map = game.map();
        let tiles = (0..map.num_tiles() as u32).map(TileRef);
        Self {
            ticks: game.ticks(),
            players: game
                .players()
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id(),
                    name: p.name().to_string(),
                    alive: p.is_alive(),
                    gold: p.gold(),
                    troops: p.troops(),
                    workers: p.workers(),
                    tiles: p.tiles().iter().copied().collect(),
                })
                .collect(),
            units: game.units().cloned().collect(),
            attacks: game
                .players()
                .iter()
                .flat_map(|p| game.outgoing_attacks(p.id()))
                .filter_map(|id| game.attack(id).cloned())
                .collect(),
            owners: tiles.clone().map(|t| map.owner(t).raw()).collect(),
            fallout: tiles.filter(|&t| map.has_fallout(t)).collect(),
        }
    }

    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
