//! Alliance, embargo and targeting intents

use crate::core::types::{MessageSeverity, PlayerId, Tick};
use crate::execution::Executable;
use crate::game::Game;

#[derive(Debug)]
pub struct AllianceRequestExecution {
    requestor: PlayerId,
    recipient: PlayerId,
    active: bool,
}

impl AllianceRequestExecution {
    pub fn new(requestor: PlayerId, recipient: PlayerId) -> Self {
        Self {
            requestor,
            recipient,
            active: true,
        }
    }
}

impl Executable for AllianceRequestExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        self.active = false;
        if !game.can_send_alliance_request(self.requestor, self.recipient) {
            tracing::warn!(requestor = ?self.requestor, recipient = ?self.recipient, "alliance request not allowed");
            return;
        }
        // both asked each other: that is an agreement
        if game.alliance_request(self.recipient, self.requestor).is_some() {
            game.create_alliance(self.recipient, self.requestor);
            return;
        }
        game.add_alliance_request(self.requestor, self.recipient);
        let name = game
            .player(self.requestor)
            .map(|p| p.name().to_string())
            .unwrap_or_default();
        game.display_message(
            format!("{} requests an alliance", name),
            MessageSeverity::Info,
            Some(self.recipient),
        );
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug)]
pub struct AllianceReplyExecution {
    requestor: PlayerId,
    recipient: PlayerId,
    accept: bool,
    active: bool,
}

impl AllianceReplyExecution {
    pub fn new(requestor: PlayerId, recipient: PlayerId, accept: bool) -> Self {
        Self {
            requestor,
            recipient,
            accept,
            active: true,
        }
    }
}

impl Executable for AllianceReplyExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        self.active = false;
        if game.alliance_request(self.requestor, self.recipient).is_none() {
            tracing::warn!(requestor = ?self.requestor, recipient = ?self.recipient, "reply to missing alliance request");
            return;
        }
        if self.accept {
            game.create_alliance(self.requestor, self.recipient);
        } else {
            game.remove_alliance_request(self.requestor, self.recipient);
            game.display_message(
                "Your alliance request was rejected",
                MessageSeverity::Warn,
                Some(self.requestor),
            );
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug)]
pub struct BreakAllianceExecution {
    breaker: PlayerId,
    other: PlayerId,
    active: bool,
}

impl BreakAllianceExecution {
    pub fn new(breaker: PlayerId, other: PlayerId) -> Self {
        Self {
            breaker,
            other,
            active: true,
        }
    }
}

impl Executable for BreakAllianceExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        self.active = false;
        if !game.is_allied(self.breaker, self.other) {
            tracing::warn!(breaker = ?self.breaker, other = ?self.other, "no alliance to break");
            return;
        }
        game.break_alliance(self.breaker, self.other);
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbargoAction {
    Start,
    Stop,
}

#[derive(Debug)]
pub struct EmbargoExecution {
    player: PlayerId,
    target: PlayerId,
    action: EmbargoAction,
    active: bool,
}

impl EmbargoExecution {
    pub fn new(player: PlayerId, target: PlayerId, action: EmbargoAction) -> Self {
        Self {
            player,
            target,
            action,
            active: true,
        }
    }
}

impl Executable for EmbargoExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        self.active = false;
        if self.player == self.target || game.player(self.target).is_none() {
            tracing::warn!(player = ?self.player, target = ?self.target, "invalid embargo target");
            return;
        }
        let now = game.ticks();
        let Some(player) = game.player_mut(self.player) else {
            return;
        };
        match self.action {
            EmbargoAction::Start => player.add_embargo(self.target, now, false),
            EmbargoAction::Stop => player.stop_embargo(self.target),
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Marks a player as a target and tells the requester's allies
#[derive(Debug)]
pub struct TargetPlayerExecution {
    player: PlayerId,
    target: PlayerId,
    active: bool,
}

impl TargetPlayerExecution {
    pub fn new(player: PlayerId, target: PlayerId) -> Self {
        Self {
            player,
            target,
            active: true,
        }
    }
}

impl Executable for TargetPlayerExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        self.active = false;
        let Some(target_name) = game.player(self.target).map(|p| p.name().to_string()) else {
            tracing::warn!(target = ?self.target, "target player not found");
            return;
        };
        let now = game.ticks();
        let Some(player) = game.player_mut(self.player) else {
            return;
        };
        player.add_target(self.target, now);
        let name = player.name().to_string();
        for ally in game.allies(self.player) {
            game.display_message(
                format!("{} requests you attack {}", name, target_name),
                MessageSeverity::Info,
                Some(ally),
            );
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

    fn two_players() -> (Game, PlayerId, PlayerId) {
        let mut game = plains_game(6, 6);
        let a = add_human(&mut game, "a");
        let b = add_human(&mut game, "b");
        claim_rect(&mut game, a, 0, 0, 3, 6);
        claim_rect(&mut game, b, 3, 0, 6, 6);
        (game, a, b)
    }

    #[test]
    fn test_request_then_accept() {
        let (mut game, a, b) = two_players();
        AllianceRequestExecution::new(a, b).tick(&mut game, 0);
        assert!(game.alliance_request(a, b).is_some());
        AllianceReplyExecution::new(a, b, true).tick(&mut game, 0);
        assert!(game.is_allied(a, b));
        assert!(game.alliance_requests().is_empty());
    }

    #[test]
    fn test_reciprocal_request_forms_alliance() {
        let (mut game, a, b) = two_players();
        AllianceRequestExecution::new(a, b).tick(&mut game, 0);
        AllianceRequestExecution::new(b, a).tick(&mut game, 0);
        assert!(game.is_allied(a, b));
        assert!(game.alliance_requests().is_empty());
    }

    #[test]
    fn test_reject_clears_request() {
        let (mut game, a, b) = two_players();
        AllianceRequestExecution::new(a, b).tick(&mut game, 0);
        AllianceReplyExecution::new(a, b, false).tick(&mut game, 0);
        assert!(!game.is_allied(a, b));
        assert!(game.alliance_request(a, b).is_none());
    }

    #[test]
    fn test_breaking_marks_traitor() {
        let (mut game, a, b) = two_players();
        game.create_alliance(a, b);
        BreakAllianceExecution::new(a, b).tick(&mut game, 0);
        assert!(!game.is_allied(a, b));
        assert!(game.player(a).unwrap().is_traitor(0, 300));
        assert_eq!(game.stats().player(a).unwrap().betrayals, 1);
    }

    #[test]
    fn test_embargo_blocks_trade_until_lifted() {
        let (mut game, a, b) = two_players();
        assert!(game.can_trade(a, b));
        EmbargoExecution::new(a, b, EmbargoAction::Start).tick(&mut game, 0);
        assert!(!game.can_trade(a, b));
        EmbargoExecution::new(a, b, EmbargoAction::Stop).tick(&mut game, 0);
        assert!(game.can_trade(a, b));
    }

    #[test]
    fn test_target_notifies_allies() {
        let mut game = plains_game(9, 3);
        let a = add_human(&mut game, "a");
        let b = add_human(&mut game, "b");
        let c = add_human(&mut game, "c");
        game.create_alliance(a, b);
        TargetPlayerExecution::new(a, c).tick(&mut game, 5);
        assert_eq!(game.player(a).unwrap().targets(0, 100), vec![c]);
        assert!(game.messages().iter().any(|m| m.player == Some(b)));
    }
}
