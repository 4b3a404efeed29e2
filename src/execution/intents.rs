//! Small player intents that resolve in a single tick

use crate::core::types::{Gold, MessageSeverity, PlayerId, Tick};
use crate::execution::Executable;
use crate::game::Game;

/// What a donation carries. `None` gives a third of the sender's stock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Donation {
    Troops(Option<f64>),
    Gold(Option<Gold>),
}

#[derive(Debug)]
pub struct DonateExecution {
    sender: PlayerId,
    recipient: PlayerId,
    donation: Donation,
    active: bool,
}

impl DonateExecution {
    pub fn new(sender: PlayerId, recipient: PlayerId, donation: Donation) -> Self {
        Self {
            sender,
            recipient,
            donation,
            active: true,
        }
    }
}

impl Executable for DonateExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        if game.player(self.sender).is_none() || game.player(self.recipient).is_none() {
            tracing::warn!(sender = ?self.sender, recipient = ?self.recipient, "donation between unknown players");
            self.active = false;
        }
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        self.active = false;
        if !game.is_friendly(self.sender, self.recipient) {
            tracing::warn!(sender = ?self.sender, recipient = ?self.recipient, "donation to non-friendly player");
            return;
        }
        let Some(sender) = game.player_mut(self.sender) else {
            return;
        };
        let text = match self.donation {
            Donation::Troops(amount) => {
                let amount = amount.unwrap_or(sender.troops() / 3.0);
                let given = sender.remove_troops(amount);
                if let Some(recipient) = game.player_mut(self.recipient) {
                    recipient.add_troops(given);
                }
                format!("Received {:.0} troops", given)
            }
            Donation::Gold(amount) => {
                let amount = amount.unwrap_or(sender.gold() / 3);
                let given = sender.remove_gold(amount);
                if let Some(recipient) = game.player_mut(self.recipient) {
                    recipient.add_gold(given);
                }
                format!("Received {} gold", given)
            }
        };
        game.display_message(text, MessageSeverity::Success, Some(self.recipient));
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug)]
pub struct TargetTroopRatioExecution {
    player: PlayerId,
    ratio: f64,
    active: bool,
}

impl TargetTroopRatioExecution {
    pub fn new(player: PlayerId, ratio: f64) -> Self {
        Self {
            player,
            ratio,
            active: true,
        }
    }
}

impl Executable for TargetTroopRatioExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        self.active = false;
        if !(0.0..=1.0).contains(&self.ratio) {
            tracing::warn!(player = ?self.player, ratio = self.ratio, "troop ratio out of range");
            return;
        }
        match game.player_mut(self.player) {
            Some(player) => player.set_target_troop_ratio(self.ratio),
            None => tracing::warn!(player = ?self.player, "troop ratio for unknown player"),
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug)]
pub struct MarkDisconnectedExecution {
    player: PlayerId,
    disconnected: bool,
    active: bool,
}

impl MarkDisconnectedExecution {
    pub fn new(player: PlayerId, disconnected: bool) -> Self {
        Self {
            player,
            disconnected,
            active: true,
        }
    }
}

impl Executable for MarkDisconnectedExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        self.active = false;
        if let Some(player) = game.player_mut(self.player) {
            player.set_disconnected(self.disconnected);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn active_during_spawn_phase(&self) -> bool {
        true
    }
}
