//! Pathfinding over the tile grid
//!
//! - `SerialAStar`: bidirectional, time-sliced A*
//! - `MiniAStar`: the same search on the half-resolution map, upscaled
//! - `PathFinder`: caches a computed path and hands out one tile per call
//! - `AirPathFinder`: obstacle-free walk for missiles and shells

pub mod air;
pub mod astar;
pub mod mini;
pub mod path_finder;

use crate::core::types::TileRef;
use crate::map::GameMap;

pub use air::AirPathFinder;
pub use astar::SerialAStar;
pub use mini::{upscale_path, MiniAStar};
pub use path_finder::PathFinder;

/// Outcome of one `compute()` call of a time-sliced search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Completed,
    Pending,
    PathNotFound,
}

/// Outcome of asking a path finder where to go next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    NextTile(TileRef),
    Pending,
    /// Already at (or within range of) the destination; carries the current tile
    Completed(TileRef),
    PathNotFound,
}

/// Which tiles a search may pass through. Endpoints are always enterable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Ocean,
    Land,
}

impl Traversal {
    pub fn allows(self, map: &GameMap, tile: TileRef) -> bool {
        match self {
            Traversal::Ocean => map.is_ocean(tile),
            Traversal::Land => map.is_land(tile),
        }
    }
}
