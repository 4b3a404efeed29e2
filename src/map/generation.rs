//! Seeded procedural maps for headless matches

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::map::{GameMap, TerrainType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapGenConfig {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    /// Number of landmass seeds
    pub continents: u32,
    /// Outer fraction of each continent's radius that stays lowland
    pub plains_fraction: f32,
    /// Chance that a lowland tile becomes a lake
    pub lake_frequency: f32,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 120,
            seed: 42,
            continents: 5,
            plains_fraction: 0.6,
            lake_frequency: 0.002,
        }
    }
}

struct Continent {
    cx: f32,
    cy: f32,
    radius: f32,
}

/// Generate a map of blob continents surrounded by ocean. Elevation rises
/// toward each continent's center, giving highland and mountain cores.
pub fn generate_map(config: &MapGenConfig) -> Result<GameMap> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let (w, h) = (config.width as f32, config.height as f32);
    let min_side = w.min(h);

    let continents: Vec<Continent> = (0..config.continents.max(1))
        .map(|_| Continent {
            cx: rng.gen_range(0.15..0.85) * w,
            cy: rng.gen_range(0.15..0.85) * h,
            radius: rng.gen_range(0.15..0.35) * min_side,
        })
        .collect();

    let mut terrain = Vec::with_capacity(config.width as usize * config.height as usize);
    for y in 0..config.height {
        for x in 0..config.width {
            let elevation = continents
                .iter()
                .map(|c| {
                    let dx = x as f32 - c.cx;
                    let dy = y as f32 - c.cy;
                    1.0 - (dx * dx + dy * dy).sqrt() / c.radius
                })
                .fold(f32::MIN, f32::max)
                + rng.gen_range(-0.05..0.05);

            let t = if elevation <= 0.0 {
                TerrainType::Ocean
            } else if elevation < config.plains_fraction {
                if rng.gen::<f32>() < config.lake_frequency {
                    TerrainType::Lake
                } else {
                    TerrainType::Plains
                }
            } else if elevation < 0.85 {
                TerrainType::Highland
            } else {
                TerrainType::Mountain
            };
            terrain.push(t);
        }
    }

    GameMap::new(config.width, config.height, terrain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let config = MapGenConfig {
            width: 60,
            height: 40,
            ..Default::default()
        };
        let a = generate_map(&config).unwrap();
        let b = generate_map(&config).unwrap();
        for i in 0..a.num_tiles() as u32 {
            let t = crate::core::types::TileRef(i);
            assert_eq!(a.terrain(t), b.terrain(t));
        }
    }

    #[test]
    fn test_generated_map_has_land_and_sea() {
        let map = generate_map(&MapGenConfig::default()).unwrap();
        assert!(map.num_land_tiles() > 0);
        assert!(map.num_land_tiles() < map.num_tiles());
    }
}
