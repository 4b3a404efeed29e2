//! Naval invasion
//!
//! Troops leave the player's pool when the boat launches. On landing they
//! reinforce friendly land, or take the landing tile and continue as an
//! attack that does not debit the player a second time.

use crate::core::types::{MessageSeverity, Owner, PlayerId, Tick, TileRef, UnitId};
use crate::execution::{AttackExecution, Executable};
use crate::game::{Game, UnitKind, UnitType};
use crate::pathfinding::{PathFinder, PathStep, Traversal};

const PATH_ITERATIONS: u32 = 10_000;
const PATH_MAX_TRIES: u32 = 10;

#[derive(Debug)]
pub struct TransportShipExecution {
    owner: PlayerId,
    destination: TileRef,
    troops: Option<f64>,
    ship: Option<UnitId>,
    path: PathFinder,
    active: bool,
}

impl TransportShipExecution {
    pub fn new(owner: PlayerId, destination: TileRef, troops: Option<f64>) -> Self {
        Self {
            owner,
            destination,
            troops,
            ship: None,
            path: PathFinder::mini(Traversal::Ocean, PATH_ITERATIONS, PATH_MAX_TRIES),
            active: true,
        }
    }

    pub fn ship(&self) -> Option<UnitId> {
        self.ship
    }

    fn refund(game: &mut Game, player: PlayerId, troops: f64) {
        if let Some(p) = game.player_mut(player) {
            p.add_troops(troops);
        }
    }

    fn land(&mut self, game: &mut Game, ship: UnitId, owner: PlayerId, troops: f64) {
        let dst = self.destination;
        match game.map().owner(dst) {
            Owner::Player(p) if p == owner => Self::refund(game, owner, troops),
            Owner::Player(p) if game.is_friendly(owner, p) => Self::refund(game, p, troops),
            target => {
                game.conquer(owner, dst);
                game.add_execution(
                    AttackExecution::new(owner, target, Some(troops))
                        .with_source_tile(dst)
                        .without_troop_removal(),
                );
            }
        }
        game.stats_mut().boat_arrive(owner, UnitType::TransportShip);
        tracing::debug!(?ship, ?owner, troops, "transport ship landed");
        game.remove_unit(ship);
        self.active = false;
    }
}

impl Executable for TransportShipExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        let Some(spawn) = game.can_build(self.owner, UnitType::TransportShip, self.destination) else {
            tracing::warn!(player = ?self.owner, dst = ?self.destination, "cannot send transport ship");
            if game.unit_count(self.owner, UnitType::TransportShip) >= game.config().boat_max_number() {
                game.display_message(
                    format!("No boats available, max {}", game.config().boat_max_number()),
                    MessageSeverity::Warn,
                    Some(self.owner),
                );
            }
            self.active = false;
            return;
        };
        let Some(player) = game.player(self.owner) else {
            self.active = false;
            return;
        };
        let wanted = self
            .troops
            .unwrap_or_else(|| game.config().attack_amount(player));
        let name = player.name().to_string();
        let Some(troops) = game
            .player_mut(self.owner)
            .map(|p| p.remove_troops(wanted.max(0.0)))
        else {
            self.active = false;
            return;
        };

        let ship = game.build_unit(
            self.owner,
            spawn,
            UnitKind::TransportShip {
                troops,
                destination: self.destination,
            },
        );
        game.stats_mut().boat_send(self.owner, UnitType::TransportShip);
        self.ship = Some(ship);

        if let Owner::Player(target) = game.map().owner(self.destination) {
            game.display_message(
                format!("Naval invasion incoming from {}", name),
                MessageSeverity::Warn,
                Some(target),
            );
        }
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let Some(ship) = self.ship else {
            self.active = false;
            return;
        };
        let Some((owner, tile, troops)) = game
            .unit(ship)
            .map(|u| (u.owner(), u.tile(), u.troops()))
        else {
            // sunk with everyone aboard
            self.active = false;
            return;
        };

        match self
            .path
            .next_tile(game.map(), game.mini_map(), tile, self.destination, 1)
        {
            PathStep::Completed(_) => self.land(game, ship, owner, troops),
            PathStep::NextTile(next) => game.move_unit(ship, next),
            PathStep::Pending => {}
            PathStep::PathNotFound => {
                tracing::warn!(?ship, dst = ?self.destination, "transport ship path not found");
                Self::refund(game, owner, troops);
                game.remove_unit(ship);
                self.active = false;
            }
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
    use crate::map::GameMap;

    const BAY: &str = "
        ....~~~~~~....
        ....~~~~~~....
        ....~~~~~~....
        ....~~~~~~....
    ";

    fn bay_game() -> (Game, PlayerId, PlayerId) {
        let map = GameMap::from_ascii(BAY).unwrap();
        let mut game = Game::with_settings(map, open_settings());
        let a = add_human(&mut game, "a");
        let b = add_human(&mut game, "b");
        claim_rect(&mut game, a, 0, 0, 4, 4);
        claim_rect(&mut game, b, 10, 2, 14, 4);
        (game, a, b)
    }

    fn sail(game: &mut Game, exec: &mut TransportShipExecution) {
        exec.init(game, 0);
        for tick in 0..200 {
            if !exec.is_active() {
                break;
            }
            exec.tick(game, tick);
        }
    }

    #[test]
    fn test_landing_on_unclaimed_shore_starts_attack() {
        let (mut game, a, _b) = bay_game();
        let dst = game.map().ref_at(10, 1);
        let mut exec = TransportShipExecution::new(a, dst, Some(500.0));
        sail(&mut game, &mut exec);
        assert!(!exec.is_active());
        assert_eq!(game.map().owner(dst), Owner::Player(a));
        assert_eq!(game.player(a).unwrap().troops(), 2_000.0);
        assert_eq!(game.unit_count(a, UnitType::TransportShip), 0);

        let pending = game.take_pending();
        assert_eq!(pending.len(), 1);
        assert!(matches!(pending[0], Execution::Attack(_)));
    }

    #[test]
    fn test_landing_on_ally_reinforces() {
        let (mut game, a, b) = bay_game();
        game.create_alliance(a, b);
        let dst = game.map().ref_at(10, 2);
        let mut exec = TransportShipExecution::new(a, dst, Some(300.0));
        sail(&mut game, &mut exec);
        assert_eq!(game.map().owner(dst), Owner::Player(b));
        assert_eq!(game.player(b).unwrap().troops(), 2_800.0);
        assert!(game.take_pending().is_empty());
    }

    #[test]
    fn test_target_is_warned() {
        let (mut game, a, b) = bay_game();
        let dst = game.map().ref_at(10, 2);
        let mut exec = TransportShipExecution::new(a, dst, None);
        exec.init(&mut game, 0);
        assert!(exec.ship().is_some());
        assert!(game
            .messages()
            .iter()
            .any(|m| m.player == Some(b) && m.text.contains("Naval invasion")));
        // humans send a fifth of their troops by default
        assert_eq!(game.player(a).unwrap().troops(), 2_000.0);
    }

    #[test]
    fn test_sunk_ship_loses_troops() {
        let (mut game, a, _b) = bay_game();
        let dst = game.map().ref_at(10, 3);
        let mut exec = TransportShipExecution::new(a, dst, Some(1_000.0));
        exec.init(&mut game, 0);
        let ship = exec.ship().unwrap();
        game.destroy_unit(ship, None);
        exec.tick(&mut game, 1);
        assert!(!exec.is_active());
        assert_eq!(game.player(a).unwrap().troops(), 1_500.0);
    }

    #[test]
    fn test_inland_destination_rejected() {
        let (mut game, a, _b) = bay_game();
        let dst = game.map().ref_at(13, 1);
        let mut exec = TransportShipExecution::new(a, dst, None);
        exec.init(&mut game, 0);
        assert!(!exec.is_active());
        assert_eq!(game.player(a).unwrap().troops(), 2_500.0);
    }
}
