//! Tile grid: terrain, ownership and fallout
//!
//! Tiles are addressed by `TileRef` handles. The map is the single owner of
//! per-tile state; players and units only hold handles.

pub mod generation;

use std::collections::VecDeque;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Owner, TileRef};

pub use generation::{generate_map, MapGenConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    Plains,
    Highland,
    Mountain,
    Lake,
    Ocean,
}

impl TerrainType {
    pub fn is_land(self) -> bool {
        matches!(self, TerrainType::Plains | TerrainType::Highland | TerrainType::Mountain)
    }

    pub fn is_water(self) -> bool {
        !self.is_land()
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(TerrainType::Plains),
            'h' => Some(TerrainType::Highland),
            'M' => Some(TerrainType::Mountain),
            'o' => Some(TerrainType::Lake),
            '~' => Some(TerrainType::Ocean),
            _ => None,
        }
    }
}

const CARDINAL: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const WITH_DIAGONALS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Clone)]
pub struct GameMap {
    width: u32,
    height: u32,
    terrain: Vec<TerrainType>,
    owners: Vec<u16>,
    fallout: Vec<bool>,
    num_land_tiles: usize,
}

impl GameMap {
    pub fn new(width: u32, height: u32, terrain: Vec<TerrainType>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidMap(format!("empty map {}x{}", width, height)));
        }
        let expected = width as usize * height as usize;
        if terrain.len() != expected {
            return Err(SimError::InvalidMap(format!(
                "expected {} tiles, got {}",
                expected,
                terrain.len()
            )));
        }
        let num_land_tiles = terrain.iter().filter(|t| t.is_land()).count();
        Ok(Self {
            width,
            height,
            owners: vec![0; expected],
            fallout: vec![false; expected],
            terrain,
            num_land_tiles,
        })
    }

    /// Map of a single terrain type
    pub fn filled(width: u32, height: u32, terrain: TerrainType) -> Self {
        let size = width.max(1) as usize * height.max(1) as usize;
        Self {
            width: width.max(1),
            height: height.max(1),
            terrain: vec![terrain; size],
            owners: vec![0; size],
            fallout: vec![false; size],
            num_land_tiles: if terrain.is_land() { size } else { 0 },
        }
    }

    /// Parse a map drawn with one character per tile:
    /// `.` plains, `h` highland, `M` mountain, `o` lake, `~` ocean.
    pub fn from_ascii(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0) as u32;
        let mut terrain = Vec::with_capacity(width as usize * height as usize);
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as u32 != width {
                return Err(SimError::InvalidMap(format!("row {} has the wrong width", y)));
            }
            for c in row.chars() {
                let t = TerrainType::from_char(c).ok_or_else(|| {
                    SimError::InvalidMap(format!("unknown terrain '{}' in row {}", c, y))
                })?;
                terrain.push(t);
            }
        }
        Self::new(width, height, terrain)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_tiles(&self) -> usize {
        self.terrain.len()
    }

    pub fn num_land_tiles(&self) -> usize {
        self.num_land_tiles
    }

    pub fn ref_at(&self, x: u32, y: u32) -> TileRef {
        TileRef(y * self.width + x)
    }

    pub fn is_valid_coord(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    pub fn try_ref(&self, x: i64, y: i64) -> Option<TileRef> {
        if self.is_valid_coord(x, y) {
            Some(self.ref_at(x as u32, y as u32))
        } else {
            None
        }
    }

    pub fn is_valid_ref(&self, tile: TileRef) -> bool {
        tile.index() < self.terrain.len()
    }

    pub fn x(&self, tile: TileRef) -> u32 {
        tile.0 % self.width
    }

    pub fn y(&self, tile: TileRef) -> u32 {
        tile.0 / self.width
    }

    pub fn terrain(&self, tile: TileRef) -> TerrainType {
        self.terrain[tile.index()]
    }

    pub fn is_land(&self, tile: TileRef) -> bool {
        self.terrain(tile).is_land()
    }

    pub fn is_water(&self, tile: TileRef) -> bool {
        self.terrain(tile).is_water()
    }

    pub fn is_ocean(&self, tile: TileRef) -> bool {
        self.terrain(tile) == TerrainType::Ocean
    }

    pub fn is_lake(&self, tile: TileRef) -> bool {
        self.terrain(tile) == TerrainType::Lake
    }

    /// Land tile touching any water
    pub fn is_shore(&self, tile: TileRef) -> bool {
        self.is_land(tile) && self.neighbors(tile).any(|n| self.is_water(n))
    }

    /// Land tile touching the ocean
    pub fn is_ocean_shore(&self, tile: TileRef) -> bool {
        self.is_land(tile) && self.neighbors(tile).any(|n| self.is_ocean(n))
    }

    /// Water tile touching land
    pub fn is_shoreline(&self, tile: TileRef) -> bool {
        self.is_water(tile) && self.neighbors(tile).any(|n| self.is_land(n))
    }

    pub fn is_on_edge_of_map(&self, tile: TileRef) -> bool {
        let (x, y) = (self.x(tile), self.y(tile));
        x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1
    }

    /// Four-connected neighbors, clipped to the map
    pub fn neighbors(&self, tile: TileRef) -> impl Iterator<Item = TileRef> {
        self.offsets(tile, &CARDINAL)
    }

    /// Eight-connected neighbors, clipped to the map
    pub fn neighbors_with_diagonals(&self, tile: TileRef) -> impl Iterator<Item = TileRef> {
        self.offsets(tile, &WITH_DIAGONALS)
    }

    fn offsets(
        &self,
        tile: TileRef,
        offsets: &'static [(i64, i64)],
    ) -> impl Iterator<Item = TileRef> {
        let x = i64::from(self.x(tile));
        let y = i64::from(self.y(tile));
        let width = i64::from(self.width);
        let height = i64::from(self.height);
        offsets.iter().filter_map(move |&(dx, dy)| {
            let (nx, ny) = (x + dx, y + dy);
            if nx >= 0 && ny >= 0 && nx < width && ny < height {
                Some(TileRef((ny * width + nx) as u32))
            } else {
                None
            }
        })
    }

    pub fn manhattan_dist(&self, a: TileRef, b: TileRef) -> u32 {
        self.x(a).abs_diff(self.x(b)) + self.y(a).abs_diff(self.y(b))
    }

    pub fn euclidean_dist_squared(&self, a: TileRef, b: TileRef) -> u64 {
        let dx = u64::from(self.x(a).abs_diff(self.x(b)));
        let dy = u64::from(self.y(a).abs_diff(self.y(b)));
        dx * dx + dy * dy
    }

    pub fn owner(&self, tile: TileRef) -> Owner {
        Owner::from_raw(self.owners[tile.index()])
    }

    pub fn has_owner(&self, tile: TileRef) -> bool {
        self.owners[tile.index()] != 0
    }

    /// Raw ownership write. `Game` keeps player tile sets in sync.
    pub(crate) fn set_owner(&mut self, tile: TileRef, owner: Owner) {
        self.owners[tile.index()] = owner.raw();
    }

    pub fn has_fallout(&self, tile: TileRef) -> bool {
        self.fallout[tile.index()]
    }

    pub(crate) fn set_fallout(&mut self, tile: TileRef, value: bool) {
        self.fallout[tile.index()] = value;
    }

    pub fn num_fallout_tiles(&self) -> usize {
        self.fallout.iter().filter(|f| **f).count()
    }

    /// Breadth-first flood fill over four-connected tiles accepted by `filter`.
    /// Tiles come back in visit order; `start` is included only if accepted.
    pub fn bfs<F>(&self, start: TileRef, mut filter: F) -> Vec<TileRef>
    where
        F: FnMut(&GameMap, TileRef) -> bool,
    {
        let mut visited = AHashSet::new();
        let mut queue = VecDeque::new();
        let mut result = Vec::new();
        visited.insert(start);
        if filter(self, start) {
            queue.push_back(start);
        }
        while let Some(tile) = queue.pop_front() {
            result.push(tile);
            for neighbor in self.neighbors(tile) {
                if visited.insert(neighbor) && filter(self, neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        result
    }

    /// Half-resolution copy used for coarse pathfinding. A mini tile is ocean
    /// if any tile it covers is ocean, else a lake if any covered tile is a
    /// lake, else the terrain of its top-left tile.
    pub fn to_mini(&self) -> GameMap {
        let width = self.width.div_ceil(2);
        let height = self.height.div_ceil(2);
        let mut terrain = Vec::with_capacity(width as usize * height as usize);
        for my in 0..height {
            for mx in 0..width {
                let covered: Vec<TerrainType> = [(0, 0), (1, 0), (0, 1), (1, 1)]
                    .iter()
                    .filter_map(|&(dx, dy)| {
                        self.try_ref(i64::from(mx * 2 + dx), i64::from(my * 2 + dy))
                    })
                    .map(|t| self.terrain(t))
                    .collect();
                let t = if covered.contains(&TerrainType::Ocean) {
                    TerrainType::Ocean
                } else if covered.contains(&TerrainType::Lake) {
                    TerrainType::Lake
                } else {
                    covered.first().copied().unwrap_or(TerrainType::Ocean)
                };
                terrain.push(t);
            }
        }
        let num_land_tiles = terrain.iter().filter(|t| t.is_land()).count();
        let size = terrain.len();
        GameMap {
            width,
            height,
            terrain,
            owners: vec![0; size],
            fallout: vec![false; size],
            num_land_tiles,
        }
    }
}
