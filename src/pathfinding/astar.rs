//! Bidirectional, time-sliced A*
//!
//! Forward (source to destination) and backward (destination to source)
//! searches alternate one expansion each. The search state survives between
//! `compute()` calls so a long route can be spread across many ticks.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::types::TileRef;
use crate::map::GameMap;
use crate::pathfinding::{SearchStatus, Traversal};

/// Node in an open set
#[derive(Debug, Clone)]
struct PathNode {
    tile: TileRef,
    f_cost: OrderedFloat<f64>,
    g_cost: f64,
    /// Insertion order, breaks f-cost ties first-in first-out
    seq: u64,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.seq == other.seq
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
struct Frontier {
    open: BinaryHeap<PathNode>,
    came_from: AHashMap<TileRef, TileRef>,
    g_scores: AHashMap<TileRef, f64>,
}

impl Frontier {
    fn seeded(start: TileRef, goal: TileRef, map: &GameMap) -> Self {
        let mut frontier = Frontier::default();
        frontier.g_scores.insert(start, 0.0);
        frontier.open.push(PathNode {
            tile: start,
            f_cost: OrderedFloat(heuristic(map, start, goal)),
            g_cost: 0.0,
            seq: 0,
        });
        frontier
    }

    fn expand(
        &mut self,
        map: &GameMap,
        traversal: Traversal,
        current: TileRef,
        goal: TileRef,
        seq: &mut u64,
    ) {
        let current_g = self.g_scores.get(&current).copied().unwrap_or(f64::INFINITY);
        for neighbor in map.neighbors(current) {
            if neighbor != goal && !traversal.allows(map, neighbor) {
                continue;
            }
            let tentative_g = current_g + 1.0;
            let neighbor_g = self.g_scores.get(&neighbor).copied().unwrap_or(f64::INFINITY);
            if tentative_g < neighbor_g {
                self.came_from.insert(neighbor, current);
                self.g_scores.insert(neighbor, tentative_g);
                *seq += 1;
                self.open.push(PathNode {
                    tile: neighbor,
                    f_cost: OrderedFloat(tentative_g + heuristic(map, neighbor, goal)),
                    g_cost: tentative_g,
                    seq: *seq,
                });
            }
        }
    }

    /// Pop the best node that is not a stale duplicate
    fn pop(&mut self) -> Option<TileRef> {
        while let Some(node) = self.open.pop() {
            let best = self.g_scores.get(&node.tile).copied().unwrap_or(f64::INFINITY);
            if node.g_cost <= best {
                return Some(node.tile);
            }
        }
        None
    }
}

/// Weighted Manhattan distance; the x term is weighted 1.1
pub fn heuristic(map: &GameMap, a: TileRef, b: TileRef) -> f64 {
    let dx = f64::from(map.x(a).abs_diff(map.x(b)));
    let dy = f64::from(map.y(a).abs_diff(map.y(b)));
    1.1 * dx + dy
}

#[derive(Debug)]
pub struct SerialAStar {
    src: TileRef,
    dst: TileRef,
    traversal: Traversal,
    iterations: u32,
    tries_left: u32,
    forward: Frontier,
    backward: Frontier,
    meeting_point: Option<TileRef>,
    seq: u64,
}

impl SerialAStar {
    /// `iterations` bounds the expansion rounds per `compute()` call and
    /// `max_tries` bounds how many calls may end `Pending`.
    pub fn new(
        map: &GameMap,
        src: TileRef,
        dst: TileRef,
        traversal: Traversal,
        iterations: u32,
        max_tries: u32,
    ) -> Self {
        Self {
            src,
            dst,
            traversal,
            iterations: iterations.max(1),
            tries_left: max_tries,
            forward: Frontier::seeded(src, dst, map),
            backward: Frontier::seeded(dst, src, map),
            meeting_point: None,
            seq: 0,
        }
    }

    pub fn src(&self) -> TileRef {
        self.src
    }

    pub fn dst(&self) -> TileRef {
        self.dst
    }

    pub fn compute(&mut self, map: &GameMap) -> SearchStatus {
        if self.meeting_point.is_some() {
            return SearchStatus::Completed;
        }
        self.tries_left = self.tries_left.saturating_sub(1);
        let mut budget = self.iterations;

        while !self.forward.open.is_empty() && !self.backward.open.is_empty() {
            if budget == 0 {
                return if self.tries_left == 0 {
                    SearchStatus::PathNotFound
                } else {
                    SearchStatus::Pending
                };
            }
            budget -= 1;

            if let Some(current) = self.forward.pop() {
                if self.backward.g_scores.contains_key(&current) {
                    self.meeting_point = Some(current);
                    return SearchStatus::Completed;
                }
                self.forward
                    .expand(map, self.traversal, current, self.dst, &mut self.seq);
            }

            if let Some(current) = self.backward.pop() {
                if self.forward.g_scores.contains_key(&current) {
                    self.meeting_point = Some(current);
                    return SearchStatus::Completed;
                }
                self.backward
                    .expand(map, self.traversal, current, self.src, &mut self.seq);
            }
        }

        if self.meeting_point.is_some() {
            SearchStatus::Completed
        } else {
            SearchStatus::PathNotFound
        }
    }

    /// Full path from source to destination through the meeting point.
    /// Empty until `compute()` has returned `Completed`.
    pub fn reconstruct_path(&self) -> Vec<TileRef> {
        let Some(meeting) = self.meeting_point else {
            return Vec::new();
        };
        let mut path = vec![meeting];
        let mut current = meeting;
        while let Some(&prev) = self.forward.came_from.get(&current) {
            path.push(prev);
            current = prev;
        }
        path.reverse();

        current = meeting;
        while let Some(&next) = self.backward.came_from.get(&current) {
            path.push(next);
            current = next;
        }
        path
    }
}
