//! MIRV flight and separation into warheads

use crate::core::random::{simple_hash, PseudoRandom};
use crate::core::types::{MessageSeverity, Owner, PlayerId, Tick, TileRef, UnitId};
use crate::execution::{Executable, NukeExecution};
use crate::game::{Game, UnitKind, UnitType};
use crate::pathfinding::{AirPathFinder, PathStep};

/// Air tiles per tick before separation
const MIRV_SPEED: u32 = 4;
const PLACEMENT_ATTEMPTS: u32 = 1_000;
const TRIES_PER_WARHEAD: u32 = 100;
/// Minimum Manhattan distance between two warhead targets
const WARHEAD_SPACING: u32 = 25;

#[derive(Debug)]
pub struct MirvExecution {
    mirv: UnitId,
    random: PseudoRandom,
    path: AirPathFinder,
    target: Owner,
    active: bool,
}

impl MirvExecution {
    pub fn new(mirv: UnitId) -> Self {
        Self {
            mirv,
            random: PseudoRandom::new(0),
            path: AirPathFinder::new(0),
            target: Owner::TerraNullius,
            active: true,
        }
    }

    /// Random land of the target player within range, away from `taken`
    fn random_land(&mut self, game: &Game, center: TileRef, taken: &[TileRef]) -> Option<TileRef> {
        let map = game.map();
        let range = i64::from(game.settings().mirv_range);
        let range2 = u64::from(game.settings().mirv_range).pow(2);
        let (cx, cy) = (i64::from(map.x(center)), i64::from(map.y(center)));
        for _ in 0..TRIES_PER_WARHEAD {
            let x = self.random.next_int(cx - range, cx + range);
            let y = self.random.next_int(cy - range, cy + range);
            let Some(tile) = map.try_ref(x, y) else {
                continue;
            };
            if !map.is_land(tile)
                || map.euclidean_dist_squared(tile, center) > range2
                || map.owner(tile) != self.target
            {
                continue;
            }
            if taken
                .iter()
                .any(|&t| map.manhattan_dist(tile, t) < WARHEAD_SPACING)
            {
                continue;
            }
            return Some(tile);
        }
        None
    }

    fn separate(&mut self, game: &mut Game, owner: PlayerId, tile: TileRef, dst: TileRef) {
        let count = game.settings().mirv_warheads;
        let mut targets = vec![dst];
        let mut attempts = PLACEMENT_ATTEMPTS;
        while attempts > 0 && targets.len() < count {
            attempts -= 1;
            if let Some(next) = self.random_land(game, dst, &targets) {
                targets.push(next);
            }
        }
        let map = game.map();
        targets.sort_by_key(|&t| std::cmp::Reverse(map.manhattan_dist(t, dst)));

        for (i, target) in targets.iter().enumerate() {
            let speed = 15 + (i * 5 / count.max(1)) as u32;
            let wait = self.random.next_int(0, 15) as Tick;
            let warhead = game.build_unit(
                owner,
                tile,
                UnitKind::MirvWarhead {
                    destination: *target,
                },
            );
            game.add_execution(NukeExecution::new(warhead).with_flight(speed, wait));
        }
        tracing::info!(mirv = ?self.mirv, warheads = targets.len(), "MIRV separated");

        if let Owner::Player(victim) = self.target {
            if victim != owner {
                if game.is_allied(owner, victim) {
                    game.break_alliance(owner, victim);
                }
                if let Some(p) = game.player_mut(victim) {
                    p.update_relation(owner, -100.0);
                }
            }
        }
        game.stats_mut().bomb_land(owner, UnitType::Mirv);
        game.remove_unit(self.mirv);
    }
}

impl Executable for MirvExecution {
    fn init(&mut self, game: &mut Game, tick: Tick) {
        let Some((owner, dst)) = game
            .unit(self.mirv)
            .and_then(|u| Some((u.owner(), u.detonation_dst()?)))
        else {
            tracing::warn!(mirv = ?self.mirv, "MIRV not found");
            self.active = false;
            return;
        };
        let seed = tick.wrapping_add(simple_hash(&owner.to_string()));
        self.random = PseudoRandom::new(seed);
        self.path = AirPathFinder::new(seed);
        self.target = game.map().owner(dst);

        game.stats_mut().bomb_launch(owner, UnitType::Mirv);
        if let Owner::Player(victim) = self.target {
            let name = game
                .player(owner)
                .map(|p| p.name().to_string())
                .unwrap_or_default();
            game.display_message(
                format!("{} - MIRV INBOUND", name),
                MessageSeverity::Error,
                Some(victim),
            );
        }
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let Some((owner, mut tile, dst)) = game
            .unit(self.mirv)
            .and_then(|u| Some((u.owner(), u.tile(), u.detonation_dst()?)))
        else {
            self.active = false;
            return;
        };
        for _ in 0..MIRV_SPEED {
            match self.path.next_tile(game.map(), tile, dst) {
                PathStep::NextTile(next) => {
                    game.move_unit(self.mirv, next);
                    tile = next;
                }
                PathStep::Completed(_) | PathStep::Pending | PathStep::PathNotFound => {
                    self.separate(game, owner, tile, dst);
                    self.active = false;
                    return;
                }
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
