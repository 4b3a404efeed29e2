//! Cached, incremental path following
//!
//! A `PathFinder` keeps the last computed path and pops one waypoint per
//! call. It only searches again when the cached path runs out or the
//! destination has drifted beyond a tolerance that shrinks as the unit
//! gets closer.

use std::collections::VecDeque;

use crate::core::types::TileRef;
use crate::map::GameMap;
use crate::pathfinding::{MiniAStar, PathStep, SearchStatus, SerialAStar, Traversal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Full,
    Mini,
}

#[derive(Debug)]
enum Search {
    Full(SerialAStar),
    Mini(MiniAStar),
}

impl Search {
    fn compute(&mut self, map: &GameMap, mini_map: &GameMap) -> SearchStatus {
        match self {
            Search::Full(search) => search.compute(map),
            Search::Mini(search) => search.compute(mini_map),
        }
    }

    fn reconstruct_path(&self, map: &GameMap, mini_map: &GameMap) -> Vec<TileRef> {
        match self {
            Search::Full(search) => search.reconstruct_path(),
            Search::Mini(search) => search.reconstruct_path(map, mini_map),
        }
    }
}

#[derive(Debug)]
pub struct PathFinder {
    resolution: Resolution,
    traversal: Traversal,
    iterations: u32,
    max_tries: u32,
    search: Option<Search>,
    path: VecDeque<TileRef>,
    cached_dst: Option<TileRef>,
    searches_started: u32,
}

impl PathFinder {
    fn with_resolution(resolution: Resolution, traversal: Traversal, iterations: u32, max_tries: u32) -> Self {
        Self {
            resolution,
            traversal,
            iterations,
            max_tries,
            search: None,
            path: VecDeque::new(),
            cached_dst: None,
            searches_started: 0,
        }
    }

    /// Full-resolution search
    pub fn serial(traversal: Traversal, iterations: u32, max_tries: u32) -> Self {
        Self::with_resolution(Resolution::Full, traversal, iterations, max_tries)
    }

    /// Half-resolution search for long sea routes
    pub fn mini(traversal: Traversal, iterations: u32, max_tries: u32) -> Self {
        Self::with_resolution(Resolution::Mini, traversal, iterations, max_tries)
    }

    /// Number of searches started so far
    pub fn searches_started(&self) -> u32 {
        self.searches_started
    }

    /// Next tile on the way from `curr` to `dst`. `Completed` once within
    /// Manhattan distance `dist` (exclusive) of the destination.
    pub fn next_tile(
        &mut self,
        map: &GameMap,
        mini_map: &GameMap,
        curr: TileRef,
        dst: TileRef,
        dist: u32,
    ) -> PathStep {
        if map.manhattan_dist(curr, dst) < dist {
            return PathStep::Completed(curr);
        }

        if self.search.is_none() {
            if !self.should_recompute(map, curr, dst) {
                if let Some(next) = self.path.pop_front() {
                    return PathStep::NextTile(next);
                }
            }
            self.start_search(map, mini_map, curr, dst);
        }

        let Some(search) = self.search.as_mut() else {
            return PathStep::PathNotFound;
        };
        match search.compute(map, mini_map) {
            SearchStatus::Completed => {
                let mut path: VecDeque<TileRef> = search.reconstruct_path(map, mini_map).into();
                self.search = None;
                // drop the start tile
                path.pop_front();
                self.path = path;
                match self.path.pop_front() {
                    Some(next) => PathStep::NextTile(next),
                    None => PathStep::PathNotFound,
                }
            }
            SearchStatus::Pending => PathStep::Pending,
            SearchStatus::PathNotFound => {
                self.search = None;
                PathStep::PathNotFound
            }
        }
    }

    fn start_search(&mut self, map: &GameMap, mini_map: &GameMap, curr: TileRef, dst: TileRef) {
        self.cached_dst = Some(dst);
        self.path.clear();
        self.searches_started += 1;
        self.search = Some(match self.resolution {
            Resolution::Full => Search::Full(SerialAStar::new(
                map,
                curr,
                dst,
                self.traversal,
                self.iterations,
                self.max_tries,
            )),
            Resolution::Mini => Search::Mini(MiniAStar::new(
                map,
                mini_map,
                curr,
                dst,
                self.traversal,
                self.iterations,
                self.max_tries,
            )),
        });
    }

    fn should_recompute(&self, map: &GameMap, curr: TileRef, dst: TileRef) -> bool {
        let Some(cached_dst) = self.cached_dst else {
            return true;
        };
        if self.path.is_empty() {
            return true;
        }
        let dist = map.manhattan_dist(curr, dst);
        let tolerance = if dist > 50 {
            10
        } else if dist > 25 {
            5
        } else {
            0
        };
        map.manhattan_dist(cached_dst, dst) > tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TerrainType;

    fn ocean(width: u32, height: u32) -> (GameMap, GameMap) {
        let map = GameMap::filled(width, height, TerrainType::Ocean);
        let mini = map.to_mini();
        (map, mini)
    }

    #[test]
    fn test_arrival_is_completed() {
        let (map, mini) = ocean(10, 10);
        let mut finder = PathFinder::serial(Traversal::Ocean, 100, 10);
        let tile = map.ref_at(3, 3);
        assert_eq!(finder.next_tile(&map, &mini, tile, tile, 1), PathStep::Completed(tile));
        // within range counts as arrived
        let near = map.ref_at(4, 3);
        assert_eq!(finder.next_tile(&map, &mini, near, tile, 2), PathStep::Completed(near));
        assert_eq!(finder.searches_started(), 0);
    }

    #[test]
    fn test_follow_cached_path_without_recompute() {
        let (map, mini) = ocean(30, 30);
        let mut finder = PathFinder::serial(Traversal::Ocean, 10_000, 10);
        let dst = map.ref_at(20, 25);
        let mut curr = map.ref_at(2, 2);
        let mut steps = 0;
        loop {
            match finder.next_tile(&map, &mini, curr, dst, 1) {
                PathStep::NextTile(next) => {
                    assert_eq!(map.manhattan_dist(curr, next), 1);
                    curr = next;
                    steps += 1;
                }
                PathStep::Completed(_) => break,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(curr, dst);
        assert!(steps >= 41);
        assert_eq!(finder.searches_started(), 1);
    }

    #[test]
    fn test_moved_destination_triggers_recompute() {
        let (map, mini) = ocean(30, 30);
        let mut finder = PathFinder::serial(Traversal::Ocean, 10_000, 10);
        let curr = map.ref_at(0, 0);
        let PathStep::NextTile(next) = finder.next_tile(&map, &mini, curr, map.ref_at(10, 0), 1) else {
            panic!("expected a step");
        };
        // remaining distance is small, so any drift forces a new search
        finder.next_tile(&map, &mini, next, map.ref_at(10, 5), 1);
        assert_eq!(finder.searches_started(), 2);
    }

    #[test]
    fn test_far_destination_tolerates_drift() {
        let (map, mini) = ocean(120, 10);
        let mut finder = PathFinder::serial(Traversal::Ocean, 100_000, 10);
        let curr = map.ref_at(0, 0);
        let PathStep::NextTile(next) = finder.next_tile(&map, &mini, curr, map.ref_at(110, 0), 1) else {
            panic!("expected a step");
        };
        finder.next_tile(&map, &mini, next, map.ref_at(110, 3), 1);
        assert_eq!(finder.searches_started(), 1);
    }

    #[test]
    fn test_unreachable_reports_not_found() {
        let map = GameMap::from_ascii(
            "
            ~~.~~
            ~~.~~
            ",
        )
        .unwrap();
        let mini = map.to_mini();
        let mut finder = PathFinder::serial(Traversal::Ocean, 100, 5);
        let step = finder.next_tile(&map, &mini, map.ref_at(0, 0), map.ref_at(4, 1), 1);
        assert_eq!(step, PathStep::PathNotFound);
    }

    #[test]
    fn test_mini_finder_reaches_destination() {
        let (map, mini) = ocean(40, 40);
        let mut finder = PathFinder::mini(Traversal::Ocean, 10_000, 10);
        let dst = map.ref_at(35, 33);
        let mut curr = map.ref_at(3, 4);
        for _ in 0..500 {
            match finder.next_tile(&map, &mini, curr, dst, 1) {
                PathStep::NextTile(next) => curr = next,
                PathStep::Completed(_) => break,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(curr, dst);
    }
}
