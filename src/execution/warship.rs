//! Warship patrol and naval combat
//!
//! A warship wanders between random ocean tiles around its patrol tile.
//! Enemy transport ships are shot first, then warships. Trade ships are
//! boarded instead of shot once the warship is next to them.

use crate::core::random::PseudoRandom;
use crate::core::types::{PlayerId, Tick, TileRef, UnitId};
use crate::execution::{Executable, ShellExecution};
use crate::game::{Game, UnitKind, UnitType};
use crate::pathfinding::{PathFinder, PathStep, Traversal};

const PATH_ITERATIONS: u32 = 5_000;
const PATH_MAX_TRIES: u32 = 20;
const PATROL_PICK_TRIES: u32 = 50;
/// Distance at which a trade ship is boarded
const BOARDING_RANGE: u32 = 2;

fn target_priority(unit_type: UnitType) -> u8 {
    match unit_type {
        UnitType::TransportShip => 0,
        UnitType::Warship => 1,
        _ => 2,
    }
}

#[derive(Debug)]
pub struct WarshipExecution {
    warship: UnitId,
    random: PseudoRandom,
    path: PathFinder,
    patrol_target: Option<TileRef>,
    last_shell: Option<Tick>,
    active: bool,
}

impl WarshipExecution {
    pub fn new(warship: UnitId) -> Self {
        Self {
            warship,
            random: PseudoRandom::new(0),
            path: PathFinder::serial(Traversal::Ocean, PATH_ITERATIONS, PATH_MAX_TRIES),
            patrol_target: None,
            last_shell: None,
            active: true,
        }
    }

    /// Closest enemy ship in range, transports before warships before trade ships
    fn find_target(game: &Game, owner: PlayerId, tile: TileRef) -> Option<(UnitId, UnitType)> {
        game.nearby_units(
            tile,
            game.settings().warship_target_range,
            &[UnitType::TransportShip, UnitType::Warship, UnitType::TradeShip],
        )
        .into_iter()
        .filter_map(|(id, dist)| game.unit(id).map(|u| (u, dist)))
        .filter(|(u, _)| u.owner() != owner && !game.is_friendly(owner, u.owner()))
        .filter(|(u, _)| match u.kind() {
            // ships bound for our own ports are left alone
            UnitKind::TradeShip {
                destination_port, ..
            } => game
                .unit(*destination_port)
                .map_or(true, |port| port.owner() != owner),
            _ => true,
        })
        .min_by_key(|(u, dist)| (target_priority(u.unit_type()), *dist, u.id()))
        .map(|(u, _)| (u.id(), u.unit_type()))
    }

    fn random_patrol_tile(&mut self, game: &Game, patrol_tile: TileRef) -> Option<TileRef> {
        let map = game.map();
        let range = i64::from(game.settings().warship_patrol_range);
        let (cx, cy) = (i64::from(map.x(patrol_tile)), i64::from(map.y(patrol_tile)));
        for _ in 0..PATROL_PICK_TRIES {
            let x = self.random.next_int(cx - range / 2, cx + range / 2 + 1);
            let y = self.random.next_int(cy - range / 2, cy + range / 2 + 1);
            if let Some(tile) = map.try_ref(x, y) {
                if map.is_ocean(tile) {
                    return Some(tile);
                }
            }
        }
        None
    }

    fn step_toward(&mut self, game: &mut Game, tile: TileRef, dst: TileRef) -> PathStep {
        let step = self
            .path
            .next_tile(game.map(), game.mini_map(), tile, dst, 1);
        if let PathStep::NextTile(next) = step {
            game.move_unit(self.warship, next);
        }
        step
    }

    fn patrol(&mut self, game: &mut Game, tile: TileRef, patrol_tile: TileRef) {
        if self.patrol_target.is_none() {
            self.patrol_target = self.random_patrol_tile(game, patrol_tile);
        }
        let Some(target) = self.patrol_target else {
            return;
        };
        match self.step_toward(game, tile, target) {
            PathStep::Completed(_) | PathStep::PathNotFound => self.patrol_target = None,
            PathStep::NextTile(_) | PathStep::Pending => {}
        }
    }

    fn board(&mut self, game: &mut Game, owner: PlayerId, tile: TileRef, ship: UnitId) {
        let Some(ship_tile) = game.unit(ship).map(|u| u.tile()) else {
            return;
        };
        if game.map().manhattan_dist(tile, ship_tile) <= BOARDING_RANGE {
            game.capture_unit(ship, owner);
            game.stats_mut().boat_capture(owner, UnitType::TradeShip);
            tracing::debug!(warship = ?self.warship, ?ship, "trade ship captured");
            return;
        }
        self.step_toward(game, tile, ship_tile);
    }
}

impl Executable for WarshipExecution {
    fn init(&mut self, _game: &mut Game, tick: Tick) {
        self.random = PseudoRandom::new(tick.wrapping_add(u64::from(self.warship.0)));
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        let Some(unit) = game.unit_mut(self.warship) else {
            self.active = false;
            return;
        };
        let owner = unit.owner();
        let tile = unit.tile();
        let patrol_tile = match unit.kind_mut() {
            UnitKind::Warship {
                patrol_tile,
                move_target,
            } => {
                if let Some(moved) = move_target.take() {
                    *patrol_tile = moved;
                    self.patrol_target = None;
                }
                *patrol_tile
            }
            _ => {
                self.active = false;
                return;
            }
        };

        match Self::find_target(game, owner, tile) {
            Some((ship, UnitType::TradeShip)) => self.board(game, owner, tile, ship),
            Some((target, _)) => {
                let rate = game.settings().warship_shell_attack_rate;
                if self.last_shell.map_or(true, |last| tick >= last + rate) {
                    self.last_shell = Some(tick);
                    game.add_execution(ShellExecution::new(tile, owner, self.warship, target));
                }
                self.patrol(game, tile, patrol_tile);
            }
            None => self.patrol(game, tile, patrol_tile),
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Sends a warship to patrol somewhere else
#[derive(Debug)]
pub struct MoveWarshipExecution {
    warship: UnitId,
    tile: TileRef,
    active: bool,
}

impl MoveWarshipExecution {
    pub fn new(warship: UnitId, tile: TileRef) -> Self {
        Self {
            warship,
            tile,
            active: true,
        }
    }
}

impl Executable for MoveWarshipExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        self.active = false;
        if !game.map().is_valid_ref(self.tile) {
            tracing::warn!(tile = ?self.tile, "invalid warship destination");
            return;
        }
        match game.unit_mut(self.warship).map(|u| u.kind_mut()) {
            Some(UnitKind::Warship { move_target, .. }) => *move_target = Some(self.tile),
            _ => tracing::debug!(warship = ?self.warship, "warship already gone"),
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Execution;
    use crate::game::test_support::*;
    use crate::map::{GameMap, TerrainType};

    fn sea_game() -> (Game, PlayerId, PlayerId) {
        let mut game = Game::with_settings(GameMap::filled(60, 60, TerrainType::Ocean), open_settings());
        let a = add_human(&mut game, "a");
        let b = add_human(&mut game, "b");
        (game, a, b)
    }

    fn warship(game: &mut Game, owner: PlayerId, x: u32, y: u32) -> UnitId {
        let tile = game.map().ref_at(x, y);
        game.build_unit(
            owner,
            tile,
            UnitKind::Warship {
                patrol_tile: tile,
                move_target: None,
            },
        )
    }

    #[test]
    fn test_patrols_over_ocean() {
        let (mut game, a, _b) = sea_game();
        let ship = warship(&mut game, a, 30, 30);
        let mut exec = WarshipExecution::new(ship);
        exec.init(&mut game, 0);
        for tick in 0..20 {
            exec.tick(&mut game, tick);
        }
        let tile = game.unit(ship).unwrap().tile();
        assert_ne!(tile, game.map().ref_at(30, 30));
        assert!(game.map().is_ocean(tile));
    }

    #[test]
    fn test_shoots_transport_before_warship() {
        let (mut game, a, b) = sea_game();
        let ship = warship(&mut game, a, 30, 30);
        let enemy = warship(&mut game, b, 31, 30);
        let boat = game.build_unit(
            b,
            game.map().ref_at(40, 30),
            UnitKind::TransportShip {
                troops: 50.0,
                destination: game.map().ref_at(0, 0),
            },
        );
        assert_eq!(
            WarshipExecution::find_target(&game, a, game.map().ref_at(30, 30)),
            Some((boat, UnitType::TransportShip))
        );
        game.remove_unit(boat);
        assert_eq!(
            WarshipExecution::find_target(&game, a, game.map().ref_at(30, 30)),
            Some((enemy, UnitType::Warship))
        );

        let mut exec = WarshipExecution::new(ship);
        exec.init(&mut game, 0);
        exec.tick(&mut game, 0);
        exec.tick(&mut game, 1);
        let pending = game.take_pending();
        assert_eq!(pending.len(), 1);
        assert!(matches!(pending[0], Execution::Shell(_)));
        exec.tick(&mut game, 20);
        assert_eq!(game.take_pending().len(), 1);
    }

    #[test]
    fn test_allies_are_not_targeted() {
        let (mut game, a, b) = sea_game();
        game.create_alliance(a, b);
        warship(&mut game, b, 31, 30);
        assert_eq!(WarshipExecution::find_target(&game, a, game.map().ref_at(30, 30)), None);
    }

    #[test]
    fn test_boards_adjacent_trade_ship() {
        let (mut game, a, b) = sea_game();
        let c = add_human(&mut game, "c");
        let ship = warship(&mut game, a, 30, 30);
        let port = game.build_unit(c, game.map().ref_at(59, 59), UnitKind::Port);
        let trader = game.build_unit(
            b,
            game.map().ref_at(31, 31),
            UnitKind::TradeShip {
                source_port: port,
                destination_port: port,
                captured: false,
            },
        );
        let mut exec = WarshipExecution::new(ship);
        exec.init(&mut game, 0);
        exec.tick(&mut game, 0);
        assert_eq!(game.unit(trader).unwrap().owner(), a);
        assert_eq!(game.stats().player(a).unwrap().boats[&UnitType::TradeShip][2], 1);
    }

    #[test]
    fn test_move_order_changes_patrol_tile() {
        let (mut game, a, _b) = sea_game();
        let ship = warship(&mut game, a, 5, 5);
        let dst = game.map().ref_at(50, 50);
        let mut order = MoveWarshipExecution::new(ship, dst);
        order.tick(&mut game, 0);
        assert!(!order.is_active());

        let mut exec = WarshipExecution::new(ship);
        exec.init(&mut game, 0);
        exec.tick(&mut game, 0);
        match game.unit(ship).unwrap().kind() {
            UnitKind::Warship {
                patrol_tile,
                move_target,
            } => {
                assert_eq!(*patrol_tile, dst);
                assert_eq!(*move_target, None);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
