//! Trade ship voyage between two ports
//!
//! Gold is paid on arrival to both port owners. A ship captured on the way
//! sails to its captor's nearest port instead and pays only the captor.

use crate::core::types::{MessageSeverity, PlayerId, Tick, TileRef, UnitId};
use crate::execution::Executable;
use crate::game::{Game, UnitKind, UnitType};
use crate::pathfinding::{PathFinder, PathStep, Traversal};

const PATH_ITERATIONS: u32 = 2_500;
const PATH_MAX_TRIES: u32 = 20;

#[derive(Debug)]
pub struct TradeShipExecution {
    owner: PlayerId,
    source_port: UnitId,
    destination_port: UnitId,
    source_tile: Option<TileRef>,
    ship: Option<UnitId>,
    captured: bool,
    path: PathFinder,
    active: bool,
}

impl TradeShipExecution {
    pub fn new(owner: PlayerId, source_port: UnitId, destination_port: UnitId) -> Self {
        Self {
            owner,
            source_port,
            destination_port,
            source_tile: None,
            ship: None,
            captured: false,
            path: PathFinder::mini(Traversal::Ocean, PATH_ITERATIONS, PATH_MAX_TRIES),
            active: true,
        }
    }

    pub fn ship(&self) -> Option<UnitId> {
        self.ship
    }

    fn launch(&mut self, game: &mut Game) {
        let spawn = game
            .unit(self.source_port)
            .map(|p| p.tile())
            .and_then(|tile| game.can_build(self.owner, UnitType::TradeShip, tile));
        let Some(spawn) = spawn else {
            tracing::debug!(port = ?self.source_port, "trade ship cannot leave port");
            self.active = false;
            return;
        };
        let ship = game.build_unit(
            self.owner,
            spawn,
            UnitKind::TradeShip {
                source_port: self.source_port,
                destination_port: self.destination_port,
                captured: false,
            },
        );
        game.stats_mut().boat_send(self.owner, UnitType::TradeShip);
        self.source_tile = Some(spawn);
        self.ship = Some(ship);
    }

    fn sink(&mut self, game: &mut Game, ship: UnitId) {
        game.remove_unit(ship);
        self.active = false;
    }

    fn nearest_port(game: &Game, owner: PlayerId, tile: TileRef) -> Option<UnitId> {
        game.units_of(owner, &[UnitType::Port])
            .into_iter()
            .filter_map(|id| game.unit(id))
            .min_by_key(|p| (game.map().manhattan_dist(p.tile(), tile), p.id()))
            .map(|p| p.id())
    }

    fn set_destination(&mut self, game: &mut Game, ship: UnitId, port: UnitId) {
        self.destination_port = port;
        let captured = self.captured;
        if let Some(UnitKind::TradeShip {
            destination_port,
            captured: flag,
            ..
        }) = game.unit_mut(ship).map(|u| u.kind_mut())
        {
            *destination_port = port;
            *flag = captured;
        }
    }

    fn arrive(&mut self, game: &mut Game, ship: UnitId, ship_owner: PlayerId, dst_tile: TileRef) {
        let distance = self
            .source_tile
            .map(|src| game.map().manhattan_dist(src, dst_tile))
            .unwrap_or(0);
        let gold = game.config().trade_ship_gold(distance);
        let name = |game: &Game, id: PlayerId| {
            game.player(id)
                .map(|p| p.name().to_string())
                .unwrap_or_default()
        };

        if self.captured {
            if let Some(p) = game.player_mut(ship_owner) {
                p.add_gold(gold);
            }
            game.stats_mut().gold_trade(ship_owner, gold);
            let from = name(game, self.owner);
            game.display_message(
                format!("Received {} gold from ship captured from {}", gold, from),
                MessageSeverity::Success,
                Some(ship_owner),
            );
        } else if let Some(partner) = game.unit(self.destination_port).map(|p| p.owner()) {
            for (receiver, other) in [(ship_owner, partner), (partner, ship_owner)] {
                if let Some(p) = game.player_mut(receiver) {
                    p.add_gold(gold);
                }
                game.stats_mut().gold_trade(receiver, gold);
                let other = name(game, other);
                game.display_message(
                    format!("Received {} gold from trade with {}", gold, other),
                    MessageSeverity::Success,
                    Some(receiver),
                );
            }
        }
        game.stats_mut().boat_arrive(ship_owner, UnitType::TradeShip);
        tracing::debug!(?ship, gold, captured = self.captured, "trade ship arrived");
        self.sink(game, ship);
    }
}

impl Executable for TradeShipExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let Some(ship) = self.ship else {
            self.launch(game);
            return;
        };
        let Some((ship_owner, ship_tile)) = game.unit(ship).map(|u| (u.owner(), u.tile())) else {
            // sunk
            self.active = false;
            return;
        };
        if ship_owner != self.owner {
            self.captured = true;
        }

        let destination = game
            .unit(self.destination_port)
            .map(|p| (p.owner(), p.tile()));
        if destination.is_some_and(|(owner, _)| owner == ship_owner) && !self.captured {
            self.sink(game, ship);
            return;
        }
        if !self.captured {
            let tradeable = destination.is_some_and(|(owner, _)| game.can_trade(ship_owner, owner));
            if !tradeable {
                self.sink(game, ship);
                return;
            }
        } else {
            let Some(port) = Self::nearest_port(game, ship_owner, ship_tile) else {
                self.sink(game, ship);
                return;
            };
            self.set_destination(game, ship, port);
        }

        let Some(dst_tile) = game.unit(self.destination_port).map(|p| p.tile()) else {
            self.sink(game, ship);
            return;
        };
        match self
            .path
            .next_tile(game.map(), game.mini_map(), ship_tile, dst_tile, 1)
        {
            PathStep::Completed(_) => self.arrive(game, ship, ship_owner, dst_tile),
            PathStep::NextTile(next) => game.move_unit(ship, next),
            PathStep::Pending => {}
            PathStep::PathNotFound => {
                tracing::warn!(?ship, "trade ship cannot find a route");
                self.sink(game, ship);
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
