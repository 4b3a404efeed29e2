//! Direct walk for aerial units
//!
//! No obstacle avoidance. Each step moves along one axis, picking x with
//! probability `1 / ratio` where `ratio` grows with how much further the
//! unit has to go in y than in x.

use crate::core::random::PseudoRandom;
use crate::core::types::TileRef;
use crate::map::GameMap;
use crate::pathfinding::PathStep;

#[derive(Debug, Clone)]
pub struct AirPathFinder {
    random: PseudoRandom,
}

impl AirPathFinder {
    pub fn new(seed: u64) -> Self {
        Self {
            random: PseudoRandom::new(seed),
        }
    }

    pub fn next_tile(&mut self, map: &GameMap, tile: TileRef, dst: TileRef) -> PathStep {
        let (x, y) = (i64::from(map.x(tile)), i64::from(map.y(tile)));
        let (dst_x, dst_y) = (i64::from(map.x(dst)), i64::from(map.y(dst)));

        if x == dst_x && y == dst_y {
            return PathStep::Completed(tile);
        }

        let ratio = 1 + (dst_y - y).abs() / ((dst_x - x).abs() + 1);
        let (mut nx, mut ny) = (x, y);
        if x != dst_x && (y == dst_y || self.random.chance(ratio as u32)) {
            nx += (dst_x - x).signum();
        } else {
            ny += (dst_y - y).signum();
        }

        match map.try_ref(nx, ny) {
            Some(next) => PathStep::NextTile(next),
            None => PathStep::Completed(tile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TerrainType;

    #[test]
    fn test_air_path_reaches_target_in_manhattan_steps() {
        let map = GameMap::filled(50, 50, TerrainType::Ocean);
        let mut finder = AirPathFinder::new(7);
        let dst = map.ref_at(40, 12);
        let mut tile = map.ref_at(3, 30);
        let mut steps = 0;
        while let PathStep::NextTile(next) = finder.next_tile(&map, tile, dst) {
            assert_eq!(map.manhattan_dist(tile, next), 1);
            assert!(map.manhattan_dist(next, dst) < map.manhattan_dist(tile, dst));
            tile = next;
            steps += 1;
        }
        assert_eq!(tile, dst);
        assert_eq!(steps, 37 + 18);
    }

    #[test]
    fn test_air_path_interleaves_axes() {
        let map = GameMap::filled(50, 50, TerrainType::Plains);
        let mut finder = AirPathFinder::new(3);
        let dst = map.ref_at(10, 40);
        let mut tile = map.ref_at(0, 0);
        let mut axes = Vec::new();
        while let PathStep::NextTile(next) = finder.next_tile(&map, tile, dst) {
            axes.push(map.x(next) != map.x(tile));
            tile = next;
        }
        let first_y = axes.iter().position(|moved_x| !moved_x).unwrap();
        let last_x = axes.iter().rposition(|moved_x| *moved_x).unwrap();
        assert!(first_y < last_x, "moved one axis fully before the other");
    }

    #[test]
    fn test_already_there() {
        let map = GameMap::filled(5, 5, TerrainType::Plains);
        let mut finder = AirPathFinder::new(1);
        let t = map.ref_at(2, 2);
        assert_eq!(finder.next_tile(&map, t, t), PathStep::Completed(t));
    }
}
