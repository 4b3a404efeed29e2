//! Port: sends trade ships to partners

use crate::core::random::PseudoRandom;
use crate::core::types::{Tick, UnitId};
use crate::execution::{Executable, TradeShipExecution};
use crate::game::{Game, UnitType};

#[derive(Debug)]
pub struct PortExecution {
    port: UnitId,
    random: PseudoRandom,
    check_offset: Tick,
    active: bool,
}

impl PortExecution {
    pub fn new(port: UnitId) -> Self {
        Self {
            port,
            random: PseudoRandom::new(0),
            check_offset: 0,
            active: true,
        }
    }
}

impl Executable for PortExecution {
    fn init(&mut self, game: &mut Game, tick: Tick) {
        self.random = PseudoRandom::new(tick.wrapping_add(u64::from(self.port.0)));
        self.check_offset = tick % game.settings().port_check_interval.max(1);
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        let Some(owner) = game.unit(self.port).map(|u| u.owner()) else {
            self.active = false;
            return;
        };
        let interval = game.settings().port_check_interval.max(1);
        if (tick + self.check_offset) % interval != 0 {
            return;
        }

        let total_ports = game.units_of_type(&[UnitType::Port]).len();
        if !self
            .random
            .chance(game.config().trade_ship_spawn_rate(total_ports))
        {
            return;
        }
        let partners = game.trading_ports(self.port);
        let Some(&destination) = self.random.rand_element(&partners) else {
            return;
        };
        tracing::debug!(port = ?self.port, ?destination, "trade ship dispatched");
        game.add_execution(TradeShipExecution::new(owner, self.port, destination));
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{EmbargoAction, EmbargoExecution, Execution};
    use crate::game::test_support::*;
    use crate::game::UnitKind;

    fn run_port(game: &mut Game, exec: &mut PortExecution, ticks: Tick) -> Vec<Execution> {
        exec.init(game, 0);
        let mut queued = Vec::new();
        for tick in 0..ticks {
            exec.tick(game, tick);
            queued.extend(game.take_pending());
        }
        queued
    }

    #[test]
    fn test_sends_ships_to_partner_ports() {
        let mut game = plains_game(20, 20);
        let a = add_human(&mut game, "a");
        let b = add_human(&mut game, "b");
        claim_rect(&mut game, a, 0, 0, 5, 5);
        claim_rect(&mut game, b, 15, 15, 20, 20);
        let port = game.build_unit(a, game.map().ref_at(1, 1), UnitKind::Port);
        game.build_unit(b, game.map().ref_at(16, 16), UnitKind::Port);

        let mut exec = PortExecution::new(port);
        let queued = run_port(&mut game, &mut exec, 2_000);
        assert!(!queued.is_empty());
        assert!(queued.iter().all(|e| matches!(e, Execution::TradeShip(_))));
    }

    #[test]
    fn test_no_ships_without_partners() {
        let mut game = plains_game(20, 20);
        let a = add_human(&mut game, "a");
        let b = add_human(&mut game, "b");
        claim_rect(&mut game, a, 0, 0, 5, 5);
        claim_rect(&mut game, b, 15, 15, 20, 20);
        let port = game.build_unit(a, game.map().ref_at(1, 1), UnitKind::Port);
        game.build_unit(a, game.map().ref_at(3, 3), UnitKind::Port);
        game.build_unit(b, game.map().ref_at(16, 16), UnitKind::Port);
        let mut embargo = EmbargoExecution::new(b, a, EmbargoAction::Start);
        embargo.init(&mut game, 0);
        embargo.tick(&mut game, 0);

        let mut exec = PortExecution::new(port);
        assert!(run_port(&mut game, &mut exec, 2_000).is_empty());
    }

    #[test]
    fn test_stops_when_port_is_gone() {
        let mut game = plains_game(5, 5);
        let a = add_human(&mut game, "a");
        let port = game.build_unit(a, game.map().ref_at(1, 1), UnitKind::Port);
        let mut exec = PortExecution::new(port);
        exec.init(&mut game, 0);
        game.destroy_unit(port, None);
        exec.tick(&mut game, 1);
        assert!(!exec.is_active());
    }
}
