//! Warship shell

use crate::core::types::{PlayerId, Tick, TileRef, UnitId};
use crate::execution::Executable;
use crate::game::{Game, UnitKind, UnitType};
use crate::pathfinding::{AirPathFinder, PathStep};

const SHELL_SPEED: u32 = 3;
const DEFAULT_DAMAGE: f64 = 250.0;

#[derive(Debug)]
pub struct ShellExecution {
    spawn: TileRef,
    owner: PlayerId,
    launcher: UnitId,
    target: UnitId,
    shell: Option<UnitId>,
    path: AirPathFinder,
    destroy_at: Option<Tick>,
    active: bool,
}

impl ShellExecution {
    pub fn new(spawn: TileRef, owner: PlayerId, launcher: UnitId, target: UnitId) -> Self {
        Self {
            spawn,
            owner,
            launcher,
            target,
            shell: None,
            path: AirPathFinder::new(0),
            destroy_at: None,
            active: true,
        }
    }

    fn expire(&mut self, game: &mut Game, shell: UnitId) {
        game.remove_unit(shell);
        self.active = false;
    }

    fn hit(&mut self, game: &mut Game) {
        let Some(target) = game.unit(self.target) else {
            return;
        };
        let target_type = target.unit_type();
        let destroyed = if target.has_health() {
            let damage = game
                .config()
                .unit_info(UnitType::Shell)
                .damage
                .unwrap_or(DEFAULT_DAMAGE);
            let remaining = game.unit_mut(self.target).and_then(|u| {
                u.modify_health(-damage);
                u.health()
            });
            remaining.is_some_and(|h| h <= 0.0)
        } else {
            true
        };
        if destroyed {
            if target_type.is_ship() {
                game.stats_mut().boat_destroy(self.owner, target_type);
            }
            game.destroy_unit(self.target, Some(self.owner));
        }
    }
}

impl Executable for ShellExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        self.path = AirPathFinder::new(game.ticks());
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        let shell = *self
            .shell
            .get_or_insert_with(|| game.build_unit(self.owner, self.spawn, UnitKind::Shell));
        let Some(mut tile) = game.unit(shell).map(|u| u.tile()) else {
            self.active = false;
            return;
        };
        let target_tile = game
            .unit(self.target)
            .filter(|u| u.owner() != self.owner)
            .map(|u| u.tile());
        let expired = self.destroy_at.is_some_and(|at| tick >= at);
        let Some(target_tile) = target_tile.filter(|_| !expired) else {
            self.expire(game, shell);
            return;
        };
        if self.destroy_at.is_none() && !game.is_unit_active(self.launcher) {
            self.destroy_at = Some(tick + game.settings().shell_lifetime);
        }

        for _ in 0..SHELL_SPEED {
            match self.path.next_tile(game.map(), tile, target_tile) {
                PathStep::NextTile(next) => {
                    game.move_unit(shell, next);
                    tile = next;
                }
                PathStep::Completed(_) | PathStep::Pending | PathStep::PathNotFound => {
                    self.hit(game);
                    self.expire(game, shell);
                    return;
                }
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
