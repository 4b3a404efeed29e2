//! Atom bomb, hydrogen bomb and MIRV warhead flight and detonation

use std::collections::BTreeMap;

use crate::core::random::PseudoRandom;
use crate::core::types::{MessageSeverity, Owner, PlayerId, Tick, TileRef, UnitId};
use crate::execution::Executable;
use crate::game::{Game, UnitType};
use crate::pathfinding::{AirPathFinder, PathStep};

/// A player losing more tiles than this to one blast turns on the launcher
const ALLIANCE_BREAK_TILES: usize = 100;

#[derive(Debug)]
pub struct NukeExecution {
    nuke: UnitId,
    speed: Option<u32>,
    wait_ticks: Tick,
    path: AirPathFinder,
    active: bool,
}

impl NukeExecution {
    pub fn new(nuke: UnitId) -> Self {
        Self {
            nuke,
            speed: None,
            wait_ticks: 0,
            path: AirPathFinder::new(0),
            active: true,
        }
    }

    /// Custom speed in tiles per tick and a delay before the first move
    pub fn with_flight(mut self, speed: u32, wait_ticks: Tick) -> Self {
        self.speed = Some(speed);
        self.wait_ticks = wait_ticks;
        self
    }

    fn tiles_to_destroy(game: &Game, unit_type: UnitType, dst: TileRef) -> Vec<TileRef> {
        let magnitude = game.config().nuke_magnitudes(unit_type);
        let inner2 = u64::from(magnitude.inner).pow(2);
        let outer2 = u64::from(magnitude.outer).pow(2);
        let mut random = PseudoRandom::new(game.ticks());
        game.map().bfs(dst, |map, tile| {
            let d2 = map.euclidean_dist_squared(dst, tile);
            d2 <= outer2 && (d2 <= inner2 || random.chance(2))
        })
    }

    fn break_alliances(
        game: &mut Game,
        launcher: PlayerId,
        unit_type: UnitType,
        destroyed: &[TileRef],
    ) {
        if unit_type == UnitType::MirvWarhead {
            return;
        }
        let mut hit: BTreeMap<PlayerId, usize> = BTreeMap::new();
        for &tile in destroyed {
            if let Owner::Player(owner) = game.map().owner(tile) {
                *hit.entry(owner).or_default() += 1;
            }
        }
        for (victim, tiles) in hit {
            if tiles <= ALLIANCE_BREAK_TILES || victim == launcher {
                continue;
            }
            if game.is_allied(launcher, victim) {
                game.break_alliance(launcher, victim);
            }
            if let Some(p) = game.player_mut(victim) {
                p.update_relation(launcher, -100.0);
            }
        }
    }

    fn detonate(&mut self, game: &mut Game) {
        let Some((owner, unit_type, dst)) = game
            .unit(self.nuke)
            .and_then(|u| Some((u.owner(), u.unit_type(), u.detonation_dst()?)))
        else {
            self.active = false;
            return;
        };
        let destroyed = Self::tiles_to_destroy(game, unit_type, dst);
        Self::break_alliances(game, owner, unit_type, &destroyed);

        for &tile in &destroyed {
            if let Owner::Player(victim) = game.map().owner(tile) {
                game.relinquish(tile);
                Self::kill_population(game, victim);
            }
            if game.map().is_land(tile) {
                game.set_fallout(tile, true);
            }
        }

        let outer = game.config().nuke_magnitudes(unit_type).outer;
        let outer2 = u64::from(outer).pow(2);
        let caught: Vec<UnitId> = game
            .units()
            .filter(|u| !u.unit_type().is_nuke())
            .filter(|u| game.map().euclidean_dist_squared(dst, u.tile()) < outer2)
            .map(|u| u.id())
            .collect();
        for id in caught {
            let Some((unit_owner, caught_type, troops)) = game
                .unit(id)
                .map(|u| (u.owner(), u.unit_type(), u.troops()))
            else {
                continue;
            };
            if caught_type == UnitType::TransportShip {
                let tiles = game
                    .player(unit_owner)
                    .map(|p| p.num_tiles_owned())
                    .unwrap_or(0);
                let deaths = game.config().nuke_death_factor(troops, tiles);
                if let Some(ship) = game.unit_mut(id) {
                    ship.set_troops(troops - deaths);
                }
                continue;
            }
            game.destroy_unit(id, Some(owner));
        }

        game.stats_mut().bomb_land(owner, unit_type);
        tracing::debug!(nuke = ?self.nuke, ?unit_type, tiles = destroyed.len(), "nuke detonated");
        game.remove_unit(self.nuke);
        self.active = false;
    }

    /// Losses for one destroyed tile of `victim`
    fn kill_population(game: &mut Game, victim: PlayerId) {
        let Some((troops, workers, tiles)) = game
            .player(victim)
            .map(|p| (p.troops(), p.workers(), p.num_tiles_owned()))
        else {
            return;
        };
        let troop_deaths = game.config().nuke_death_factor(troops, tiles);
        let worker_deaths = game.config().nuke_death_factor(workers, tiles);
        if let Some(p) = game.player_mut(victim) {
            p.remove_troops(troop_deaths);
            p.remove_workers(worker_deaths);
        }

        for id in game.outgoing_attacks(victim) {
            let Some(troops) = game.attack(id).map(|a| a.troops()) else {
                continue;
            };
            let deaths = game.config().nuke_death_factor(troops, tiles);
            if let Some(attack) = game.attack_mut(id) {
                attack.lose_troops(deaths);
            }
        }
        for id in game.units_of(victim, &[UnitType::TransportShip]) {
            let Some(troops) = game.unit(id).map(|u| u.troops()) else {
                continue;
            };
            let deaths = game.config().nuke_death_factor(troops, tiles);
            if let Some(ship) = game.unit_mut(id) {
                ship.set_troops(troops - deaths);
            }
        }
    }
}

impl Executable for NukeExecution {
    fn init(&mut self, game: &mut Game, tick: Tick) {
        self.path = AirPathFinder::new(tick);
        if self.speed.is_none() {
            self.speed = Some(game.config().default_nuke_speed());
        }
        let Some((owner, unit_type, dst)) = game
            .unit(self.nuke)
            .and_then(|u| Some((u.owner(), u.unit_type(), u.detonation_dst()?)))
        else {
            tracing::warn!(nuke = ?self.nuke, "nuke not found");
            self.active = false;
            return;
        };
        if unit_type == UnitType::MirvWarhead {
            return;
        }
        game.stats_mut().bomb_launch(owner, unit_type);
        if let Owner::Player(target) = game.map().owner(dst) {
            let name = game
                .player(owner)
                .map(|p| p.name().to_string())
                .unwrap_or_default();
            let label = match unit_type {
                UnitType::HydrogenBomb => "hydrogen bomb",
                _ => "atom bomb",
            };
            game.display_message(
                format!("{} - {} inbound", name, label),
                MessageSeverity::Error,
                Some(target),
            );
        }
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let Some((mut tile, dst)) = game
            .unit(self.nuke)
            .and_then(|u| Some((u.tile(), u.detonation_dst()?)))
        else {
            // intercepted
            tracing::debug!(nuke = ?self.nuke, "nuke gone before reaching target");
            self.active = false;
            return;
        };

        if self.wait_ticks > 0 {
            self.wait_ticks -= 1;
            return;
        }

        for _ in 0..self.speed.unwrap_or(1) {
            match self.path.next_tile(game.map(), tile, dst) {
                PathStep::NextTile(next) => {
                    game.move_unit(self.nuke, next);
                    tile = next;
                }
                PathStep::Completed(_) | PathStep::PathNotFound | PathStep::Pending => {
                    self.detonate(game);
                    return;
                }
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
