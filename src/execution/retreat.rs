//! Ordered retreat of a running attack

use crate::core::types::{AttackId, PlayerId, Tick};
use crate::execution::Executable;
use crate::game::Game;

#[derive(Debug)]
pub struct RetreatExecution {
    player: PlayerId,
    attack: AttackId,
    ordered_at: Option<Tick>,
    active: bool,
}

impl RetreatExecution {
    pub fn new(player: PlayerId, attack: AttackId) -> Self {
        Self {
            player,
            attack,
            ordered_at: None,
            active: true,
        }
    }
}

impl Executable for RetreatExecution {
    fn init(&mut self, game: &mut Game, tick: Tick) {
        let owned = game
            .attack(self.attack)
            .is_some_and(|a| a.attacker() == self.player);
        if !owned {
            tracing::warn!(player = ?self.player, attack = ?self.attack, "retreat for unknown or foreign attack");
            self.active = false;
            return;
        }
        game.order_retreat(self.attack);
        self.ordered_at = Some(tick);
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        let Some(ordered_at) = self.ordered_at else {
            self.active = false;
            return;
        };
        if tick >= ordered_at + game.settings().retreat_delay {
            game.execute_retreat(self.attack);
            self.active = false;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
