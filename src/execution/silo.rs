//! Missile silo cooldown

use crate::core::types::{Tick, UnitId};
use crate::execution::Executable;
use crate::game::Game;

#[derive(Debug)]
pub struct MissileSiloExecution {
    silo: UnitId,
    active: bool,
}

impl MissileSiloExecution {
    pub fn new(silo: UnitId) -> Self {
        Self { silo, active: true }
    }
}

impl Executable for MissileSiloExecution {
    fn tick(&mut self, game: &mut Game, tick: Tick) {
        let cooldown = game.config().silo_cooldown();
        let Some(silo) = game.unit_mut(self.silo) else {
            self.active = false;
            return;
        };
        if silo.is_cooldown() && silo.ticks_left_in_cooldown(cooldown, tick) == 0 {
            silo.clear_cooldown();
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::*;
    use crate::game::{UnitKind, UnitType};

    #[test]
    fn test_cooldown_clears_exactly_at_expiry() {
        let mut game = plains_game(10, 10);
        let a = add_human(&mut game, "a");
        claim_rect(&mut game, a, 0, 0, 5, 5);
        let tile = game.map().ref_at(2, 2);
        let silo = game.build_unit(a, tile, UnitKind::MissileSilo { cooldown_start: None });
        game.unit_mut(silo).unwrap().start_cooldown(10);

        let mut exec = MissileSiloExecution::new(silo);
        exec.tick(&mut game, 84);
        assert!(game.unit(silo).unwrap().is_cooldown());
        exec.tick(&mut game, 85);
        assert!(!game.unit(silo).unwrap().is_cooldown());
    }

    #[test]
    fn test_stops_with_silo() {
        let mut game = plains_game(5, 5);
        let a = add_human(&mut game, "a");
        let silo = game.build_unit(a, game.map().ref_at(1, 1), UnitKind::plain(UnitType::MissileSilo).unwrap());
        let mut exec = MissileSiloExecution::new(silo);
        game.destroy_unit(silo, None);
        exec.tick(&mut game, 0);
        assert!(!exec.is_active());
    }
}
