//! Coarse search on the half-resolution map

use crate::core::types::TileRef;
use crate::map::GameMap;
use crate::pathfinding::{SearchStatus, SerialAStar, Traversal};

const SCALE: u32 = 2;

#[derive(Debug)]
pub struct MiniAStar {
    inner: SerialAStar,
    src: TileRef,
    dst: TileRef,
}

impl MiniAStar {
    pub fn new(
        map: &GameMap,
        mini_map: &GameMap,
        src: TileRef,
        dst: TileRef,
        traversal: Traversal,
        iterations: u32,
        max_tries: u32,
    ) -> Self {
        let to_mini = |t: TileRef| mini_map.ref_at(map.x(t) / SCALE, map.y(t) / SCALE);
        Self {
            inner: SerialAStar::new(
                mini_map,
                to_mini(src),
                to_mini(dst),
                traversal,
                iterations,
                max_tries,
            ),
            src,
            dst,
        }
    }

    pub fn compute(&mut self, mini_map: &GameMap) -> SearchStatus {
        self.inner.compute(mini_map)
    }

    /// Full-resolution path from the original source to the original destination
    pub fn reconstruct_path(&self, map: &GameMap, mini_map: &GameMap) -> Vec<TileRef> {
        let coarse: Vec<(i64, i64)> = self
            .inner
            .reconstruct_path()
            .into_iter()
            .map(|t| (i64::from(mini_map.x(t)), i64::from(mini_map.y(t))))
            .collect();
        if coarse.is_empty() {
            return Vec::new();
        }

        let mut path: Vec<TileRef> = upscale_path(&coarse, i64::from(SCALE))
            .into_iter()
            .filter_map(|(x, y)| map.try_ref(x, y))
            .collect();
        if path.first() != Some(&self.src) {
            path.insert(0, self.src);
        }
        if path.last() != Some(&self.dst) {
            path.push(self.dst);
        }
        path
    }
}

/// Scale coarse waypoints up and fill the gaps with rounded linear interpolation
pub fn upscale_path(path: &[(i64, i64)], scale: i64) -> Vec<(i64, i64)> {
    let scaled: Vec<(i64, i64)> = path.iter().map(|&(x, y)| (x * scale, y * scale)).collect();
    let mut result = Vec::with_capacity(scaled.len() * scale as usize);

    for pair in scaled.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs());
        for i in 0..steps {
            let t = i as f64 / steps as f64;
            result.push((
                x0 + (dx as f64 * t + 0.5).floor() as i64,
                y0 + (dy as f64 * t + 0.5).floor() as i64,
            ));
        }
    }
    if let Some(&last) = scaled.last() {
        result.push(last);
    }
    result
}
