//! Tick loop
//!
//! Strictly sequential: executions are initialized and ticked in the order
//! they were added, so every client replaying the same intents arrives at
//! the same state.

use crate::execution::Execution;
use crate::game::Game;

#[derive(Debug, Default)]
pub struct Scheduler {
    /// Initialized executions, in insertion order
    executions: Vec<Execution>,
    /// Added but not yet initialized (held back during the spawn phase)
    unready: Vec<Execution>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_execution(&mut self, execution: impl Into<Execution>) {
        self.unready.push(execution.into());
    }

    /// Executions that have been initialized and are still running
    pub fn active_count(&self) -> usize {
        self.executions.len()
    }

    /// Executions waiting for their `init`
    pub fn pending_count(&self) -> usize {
        self.unready.len()
    }

    /// Run one full tick and advance the game clock
    pub fn execute_next_tick(&mut self, game: &mut Game) {
        let tick = game.ticks();
        let in_spawn_phase = game.in_spawn_phase();

        let mut queued = std::mem::take(&mut self.unready);
        queued.extend(game.take_pending());
        for mut execution in queued {
            if in_spawn_phase && !execution.active_during_spawn_phase() {
                self.unready.push(execution);
                continue;
            }
            execution.init(game, tick);
            self.executions.push(execution);
        }

        for execution in self.executions.iter_mut() {
            if !execution.is_active() {
                continue;
            }
            if in_spawn_phase && !execution.active_during_spawn_phase() {
                continue;
            }
            execution.tick(game, tick);
        }

        self.executions.retain(Execution::is_active);
        game.end_tick();
    }

    pub fn run(&mut self, game: &mut Game, ticks: u64) {
        for _ in 0..ticks {
            self.execute_next_tick(game);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameSettings;
    use crate::core::types::PlayerType;
    use crate::execution::{SpawnExecution, TargetTroopRatioExecution};
    use crate::game::test_support::*;
    use crate::game::PlayerInfo;
    use crate::map::{GameMap, TerrainType};

    #[test]
    fn test_executions_run_in_insertion_order() {
        let mut game = plains_game(5, 5);
        let a = add_human(&mut game, "a");
        let mut scheduler = Scheduler::new();
        scheduler.add_execution(TargetTroopRatioExecution::new(a, 0.2));
        scheduler.add_execution(TargetTroopRatioExecution::new(a, 0.6));
        scheduler.execute_next_tick(&mut game);
        assert_eq!(game.player(a).unwrap().target_troop_ratio(), 0.6);
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(game.ticks(), 1);
    }

    #[test]
    fn test_spawn_phase_holds_back_other_executions() {
        let settings = GameSettings {
            spawn_phase_turns: 3,
            ..Default::default()
        };
        let mut game = Game::with_settings(GameMap::filled(20, 20, TerrainType::Plains), settings);
        let a = game
            .add_player(PlayerInfo::new("a", PlayerType::Human))
            .unwrap();
        let mut scheduler = Scheduler::new();
        scheduler.add_execution(TargetTroopRatioExecution::new(a, 0.1));
        scheduler.add_execution(SpawnExecution::new(a, game.map().ref_at(10, 10)));

        scheduler.execute_next_tick(&mut game);
        assert!(game.player(a).unwrap().has_spawned());
        assert_ne!(game.player(a).unwrap().target_troop_ratio(), 0.1);
        // the troop ratio change waits for the spawn phase to end
        assert_eq!(scheduler.pending_count(), 1);

        scheduler.run(&mut game, 3);
        assert!(!game.in_spawn_phase());
        assert_eq!(game.player(a).unwrap().target_troop_ratio(), 0.1);
    }

    #[test]
    fn test_executions_queued_on_game_start_next_tick() {
        let mut game = plains_game(5, 5);
        let a = add_human(&mut game, "a");
        game.add_execution(TargetTroopRatioExecution::new(a, 0.3));
        let mut scheduler = Scheduler::new();
        scheduler.execute_next_tick(&mut game);
        assert_eq!(game.player(a).unwrap().target_troop_ratio(), 0.3);
    }
}
