//! Construction of structures and launch of ordnance
//!
//! Structures with a construction duration first appear as a Construction
//! unit that counts down. The site follows its tile's owner; when it
//! finishes, the current owner gets the building. Everything else is
//! placed on the first tick.

use crate::core::types::{Gold, MessageSeverity, PlayerId, Tick, TileRef, UnitId};
use crate::execution::{
    Executable, MirvExecution, MissileSiloExecution, NukeExecution, PortExecution,
    SamLauncherExecution, WarshipExecution,
};
use crate::game::{Game, UnitKind, UnitType};

#[derive(Debug)]
struct ConstructionSite {
    unit: UnitId,
    ticks_left: Tick,
    cost: Gold,
}

#[derive(Debug)]
pub struct BuildExecution {
    player: PlayerId,
    unit_type: UnitType,
    target: TileRef,
    site: Option<ConstructionSite>,
    active: bool,
}

impl BuildExecution {
    /// `None` for types that are never built on request
    pub fn from_intent(player: PlayerId, unit_type: UnitType, target: TileRef) -> Option<Self> {
        match unit_type {
            UnitType::City
            | UnitType::Port
            | UnitType::MissileSilo
            | UnitType::DefensePost
            | UnitType::SamLauncher
            | UnitType::Warship
            | UnitType::AtomBomb
            | UnitType::HydrogenBomb
            | UnitType::Mirv => Some(Self {
                player,
                unit_type,
                target,
                site: None,
                active: true,
            }),
            UnitType::TransportShip
            | UnitType::TradeShip
            | UnitType::MirvWarhead
            | UnitType::Shell
            | UnitType::SamMissile
            | UnitType::Construction => None,
        }
    }

    fn kind(&self) -> Option<UnitKind> {
        match self.unit_type {
            UnitType::Warship => Some(UnitKind::Warship {
                patrol_tile: self.target,
                move_target: None,
            }),
            UnitType::AtomBomb => Some(UnitKind::AtomBomb {
                destination: self.target,
            }),
            UnitType::HydrogenBomb => Some(UnitKind::HydrogenBomb {
                destination: self.target,
            }),
            UnitType::Mirv => Some(UnitKind::Mirv {
                destination: self.target,
            }),
            other => UnitKind::plain(other),
        }
    }

    fn cost(&self, game: &Game) -> Gold {
        game.config()
            .unit_cost(self.unit_type, game.unit_count(self.player, self.unit_type))
    }

    fn start(&mut self, game: &mut Game) {
        let duration = game.config().unit_info(self.unit_type).construction_duration;
        let Some(duration) = duration else {
            self.complete(game);
            self.active = false;
            return;
        };
        let Some(spawn) = game.can_build(self.player, self.unit_type, self.target) else {
            tracing::warn!(player = ?self.player, unit_type = ?self.unit_type, "cannot build");
            self.active = false;
            return;
        };
        let cost = self.cost(game);
        if let Some(player) = game.player_mut(self.player) {
            player.remove_gold(cost);
        }
        let unit = game.build_unit(
            self.player,
            spawn,
            UnitKind::Construction {
                building: self.unit_type,
            },
        );
        tracing::debug!(?unit, building = ?self.unit_type, duration, "construction started");
        self.site = Some(ConstructionSite {
            unit,
            ticks_left: duration,
            cost,
        });
    }

    fn complete(&mut self, game: &mut Game) {
        let Some(spawn) = game.can_build(self.player, self.unit_type, self.target) else {
            tracing::warn!(player = ?self.player, unit_type = ?self.unit_type, "build cancelled");
            game.display_message(
                format!("Cannot build {:?}", self.unit_type),
                MessageSeverity::Warn,
                Some(self.player),
            );
            return;
        };
        let Some(kind) = self.kind() else {
            tracing::warn!(unit_type = ?self.unit_type, "no unit kind for build");
            return;
        };
        let cost = self.cost(game);
        if let Some(player) = game.player_mut(self.player) {
            player.remove_gold(cost);
        }
        let unit = game.build_unit(self.player, spawn, kind);

        match self.unit_type {
            UnitType::AtomBomb | UnitType::HydrogenBomb => {
                game.add_execution(NukeExecution::new(unit))
            }
            UnitType::Mirv => game.add_execution(MirvExecution::new(unit)),
            UnitType::Warship => game.add_execution(WarshipExecution::new(unit)),
            UnitType::Port => game.add_execution(PortExecution::new(unit)),
            UnitType::MissileSilo => game.add_execution(MissileSiloExecution::new(unit)),
            UnitType::SamLauncher => game.add_execution(SamLauncherExecution::new(unit)),
            UnitType::City | UnitType::DefensePost => {}
            UnitType::TransportShip
            | UnitType::TradeShip
            | UnitType::MirvWarhead
            | UnitType::Shell
            | UnitType::SamMissile
            | UnitType::Construction => {
                tracing::warn!(unit_type = ?self.unit_type, "unexpected build type");
            }
        }
    }
}

impl Executable for BuildExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let Some(site) = self.site.as_mut() else {
            self.start(game);
            return;
        };

        let Some(owner) = game.unit(site.unit).map(|u| u.owner()) else {
            let cost = site.cost;
            if let Some(player) = game.player_mut(self.player) {
                player.add_gold(cost);
            }
            tracing::debug!(player = ?self.player, "construction lost");
            self.active = false;
            return;
        };
        self.player = owner;

        if site.ticks_left > 0 {
            site.ticks_left -= 1;
            return;
        }

        let (unit, cost) = (site.unit, site.cost);
        game.remove_unit(unit);
        // refund so the owner can pay for the finished building
        if let Some(player) = game.player_mut(owner) {
            player.add_gold(cost);
        }
        self.complete(game);
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
