//! Computer-controlled player
//!
//! Every bot acts on its own seeded schedule: it grabs unclaimed land while
//! any borders it, then saves troops until its population reaches a trigger
//! ratio and attacks a random neighbor. Incoming attacks make the attacker
//! the enemy for a while.

use crate::core::random::{simple_hash, PseudoRandom};
use crate::core::types::{Owner, PlayerId, PlayerType, Tick};
use crate::execution::{AttackExecution, Executable};
use crate::game::{Game, Relation};

/// Ticks an enemy is remembered without being refreshed
const ENEMY_MEMORY: Tick = 100;
const BOT_TROOP_RATIO: f64 = 0.7;
/// Requestors with this many allies are turned down unless much larger
const MAX_REQUESTOR_ALLIANCES: usize = 3;

#[derive(Debug)]
pub struct BotExecution {
    bot: PlayerId,
    random: PseudoRandom,
    attack_rate: Tick,
    attack_tick: Tick,
    trigger_ratio: f64,
    reserve_ratio: f64,
    neighbors_terra_nullius: bool,
    enemy: Option<PlayerId>,
    last_enemy_update: Tick,
    active: bool,
}

impl BotExecution {
    pub fn new(bot: PlayerId) -> Self {
        let mut random = PseudoRandom::new(simple_hash(&bot.to_string()));
        let attack_rate = random.next_int(40, 80) as Tick;
        let attack_tick = random.next_int(0, attack_rate as i64) as Tick;
        let trigger_ratio = random.next_int(60, 90) as f64 / 100.0;
        let reserve_ratio = random.next_int(30, 60) as f64 / 100.0;
        Self {
            bot,
            random,
            attack_rate,
            attack_tick,
            trigger_ratio,
            reserve_ratio,
            neighbors_terra_nullius: true,
            enemy: None,
            last_enemy_update: 0,
            active: true,
        }
    }

    /// Tick within each `attack_rate` window on which the bot acts
    pub fn attack_tick(&self) -> Tick {
        self.attack_tick
    }

    pub fn attack_rate(&self) -> Tick {
        self.attack_rate
    }

    fn handle_alliance_requests(&self, game: &mut Game) {
        let now = game.ticks();
        let traitor_duration = game.settings().traitor_duration;
        let requestors: Vec<PlayerId> = game
            .alliance_requests()
            .iter()
            .filter(|r| r.recipient == self.bot)
            .map(|r| r.requestor)
            .collect();
        let Some(bot) = game.player(self.bot) else {
            return;
        };
        let bot_tiles = bot.num_tiles_owned();

        let mut replies = Vec::with_capacity(requestors.len());
        for requestor in requestors {
            let Some(other) = game.player(requestor) else {
                continue;
            };
            let much_larger = other.num_tiles_owned() > bot_tiles * 3;
            let reject = other.is_traitor(now, traitor_duration)
                || bot.relation(requestor) < Relation::Neutral
                || (!much_larger && game.allies(requestor).len() >= MAX_REQUESTOR_ALLIANCES);
            replies.push((requestor, !reject));
        }

        for (requestor, accept) in replies {
            if accept {
                game.create_alliance(requestor, self.bot);
            } else {
                game.remove_alliance_request(requestor, self.bot);
            }
            tracing::debug!(bot = ?self.bot, ?requestor, accept, "bot answered alliance request");
        }
    }

    fn borders_terra_nullius(&self, game: &Game) -> bool {
        let Some(bot) = game.player(self.bot) else {
            return false;
        };
        let map = game.map();
        bot.border_tiles().iter().any(|&tile| {
            map.neighbors(tile)
                .any(|n| map.is_land(n) && !map.has_owner(n))
        })
    }

    fn maybe_attack(&mut self, game: &mut Game) {
        let now = game.ticks();
        if self.neighbors_terra_nullius {
            if self.borders_terra_nullius(game) {
                self.send_attack(game, Owner::TerraNullius);
                return;
            }
            self.neighbors_terra_nullius = false;
        }

        if now.saturating_sub(self.last_enemy_update) > ENEMY_MEMORY {
            self.enemy = None;
        }

        let strongest_attacker = game
            .incoming_attacks(self.bot)
            .into_iter()
            .filter_map(|id| game.attack(id))
            .max_by(|a, b| a.troops().total_cmp(&b.troops()))
            .map(|a| a.attacker());
        if let Some(attacker) = strongest_attacker {
            self.enemy = Some(attacker);
            self.last_enemy_update = now;
        }

        if self.enemy.is_none() && !self.pick_enemy(game) {
            return;
        }

        let Some(enemy) = self.enemy else {
            return;
        };
        if game.is_friendly(self.bot, enemy) && self.random.chance(50) {
            self.enemy = None;
            return;
        }
        let fake_human = game
            .player(enemy)
            .is_some_and(|p| p.player_type() == PlayerType::FakeHuman);
        if fake_human && !self.random.chance(2) {
            return;
        }
        self.send_attack(game, Owner::Player(enemy));
    }

    /// Chooses a new enemy once enough troops are saved. Returns false when
    /// the bot should keep waiting.
    fn pick_enemy(&mut self, game: &mut Game) -> bool {
        let now = game.ticks();
        let Some(bot) = game.player(self.bot) else {
            return false;
        };
        let max_population = game.config().max_population(game, bot);
        if max_population <= 0.0 || bot.population() / max_population < self.trigger_ratio {
            return false;
        }

        let map = game.map();
        let border: Vec<_> = bot
            .border_tiles()
            .iter()
            .flat_map(|&tile| map.neighbors(tile))
            .filter(|&n| map.is_land(n) && map.owner(n) != Owner::Player(self.bot))
            .collect();
        if let Some(&tile) = self.random.rand_element(&border) {
            match map.owner(tile) {
                Owner::TerraNullius => {
                    self.send_attack(game, Owner::TerraNullius);
                    self.neighbors_terra_nullius = true;
                    return false;
                }
                Owner::Player(owner) => {
                    self.enemy = Some(owner);
                    self.last_enemy_update = now;
                }
            }
        }

        let traitor_duration = game.settings().traitor_duration;
        let traitors: Vec<PlayerId> = game
            .neighbors_of(self.bot)
            .into_iter()
            .filter_map(|o| o.player())
            .filter(|&id| game.player(id).is_some_and(|p| p.is_traitor(now, traitor_duration)))
            .collect();
        if let Some(&traitor) = self.random.rand_element(&traitors) {
            let odds = if game.is_friendly(self.bot, traitor) { 6 } else { 3 };
            if self.random.chance(odds) {
                self.enemy = Some(traitor);
                self.last_enemy_update = now;
            }
        }
        true
    }

    fn send_attack(&self, game: &mut Game, target: Owner) {
        if let Owner::Player(p) = target {
            if game.is_on_same_team(self.bot, p) {
                return;
            }
        }
        let Some(bot) = game.player(self.bot) else {
            return;
        };
        let reserve = game.config().max_population(game, bot) * bot.target_troop_ratio() * self.reserve_ratio;
        let troops = bot.troops() - reserve;
        if troops < 1.0 {
            return;
        }
        tracing::debug!(bot = ?self.bot, ?target, troops, "bot attacks");
        game.add_execution(AttackExecution::new(self.bot, target, Some(troops)));
    }
}

impl Executable for BotExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        if let Some(bot) = game.player_mut(self.bot) {
            bot.set_target_troop_ratio(BOT_TROOP_RATIO);
        }
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        if tick % self.attack_rate != self.attack_tick {
            return;
        }
        if !game.player(self.bot).is_some_and(|p| p.is_alive()) {
            self.active = false;
            return;
        }
        self.handle_alliance_requests(game);
        self.maybe_attack(game);
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameSettings;
    use crate::execution::Execution;
    use crate::game::test_support::*;
    use crate::game::PlayerInfo;
    use crate::map::{GameMap, TerrainType};

    fn add_bot(game: &mut Game) -> PlayerId {
        game.add_player(PlayerInfo::new("bot", PlayerType::Bot)).unwrap()
    }

    fn first_action_tick(exec: &BotExecution) -> Tick {
        exec.attack_tick()
    }

    #[test]
    fn test_schedule_is_seeded_by_id() {
        let a = BotExecution::new(PlayerId(3));
        let b = BotExecution::new(PlayerId(3));
        assert_eq!(a.attack_rate(), b.attack_rate());
        assert_eq!(a.attack_tick(), b.attack_tick());
        assert!((40..80).contains(&a.attack_rate()));
        assert!(a.attack_tick() < a.attack_rate());
    }

    #[test]
    fn test_expands_into_unclaimed_land() {
        let mut game = plains_game(20, 20);
        let bot = add_bot(&mut game);
        claim_rect(&mut game, bot, 5, 5, 10, 10);
        // above the reserve the bot keeps back
        game.player_mut(bot).unwrap().add_troops(50_000.0);
        let mut exec = BotExecution::new(bot);
        exec.init(&mut game, 0);
        assert_eq!(game.player(bot).unwrap().target_troop_ratio(), BOT_TROOP_RATIO);

        let tick = first_action_tick(&exec);
        if tick > 0 {
            exec.tick(&mut game, tick - 1);
            assert!(game.take_pending().is_empty());
        }
        exec.tick(&mut game, tick);
        let pending = game.take_pending();
        assert_eq!(pending.len(), 1);
        assert!(matches!(pending[0], Execution::Attack(_)));
    }

    #[test]
    fn test_accepts_and_rejects_alliance_requests() {
        let settings = GameSettings {
            traitor_duration: 1_000,
            ..open_settings()
        };
        let mut game = Game::with_settings(GameMap::filled(30, 30, TerrainType::Plains), settings);
        let bot = add_bot(&mut game);
        let friend = add_human(&mut game, "friend");
        let traitor = add_human(&mut game, "traitor");
        let victim = add_human(&mut game, "victim");
        claim_rect(&mut game, bot, 0, 0, 10, 10);
        claim_rect(&mut game, friend, 10, 0, 20, 10);
        claim_rect(&mut game, traitor, 0, 10, 10, 20);
        claim_rect(&mut game, victim, 10, 10, 20, 20);
        game.create_alliance(traitor, victim);
        game.break_alliance(traitor, victim);
        game.add_alliance_request(friend, bot);
        game.add_alliance_request(traitor, bot);

        let mut exec = BotExecution::new(bot);
        exec.init(&mut game, 0);
        exec.tick(&mut game, first_action_tick(&exec));
        assert!(game.is_allied(friend, bot));
        assert!(!game.is_allied(traitor, bot));
        assert!(game.alliance_request(traitor, bot).is_none());
    }

    #[test]
    fn test_dead_bot_stops() {
        let mut game = plains_game(10, 10);
        let bot = add_bot(&mut game);
        let mut exec = BotExecution::new(bot);
        exec.tick(&mut game, first_action_tick(&exec));
        assert!(!exec.is_active());
    }

    #[test]
    fn test_no_attack_on_same_team() {
        let settings = GameSettings {
            game_mode: crate::core::config::GameMode::Team,
            ..open_settings()
        };
        let mut game = Game::with_settings(GameMap::filled(10, 10, TerrainType::Plains), settings);
        let team = crate::core::types::Team(1);
        let bot = game
            .add_player(PlayerInfo::new("bot", PlayerType::Bot).with_team(team))
            .unwrap();
        let mate = game
            .add_player(PlayerInfo::new("mate", PlayerType::Human).with_team(team))
            .unwrap();
        claim_rect(&mut game, bot, 0, 0, 5, 10);
        claim_rect(&mut game, mate, 5, 0, 10, 10);
        let exec = BotExecution::new(bot);
        exec.send_attack(&mut game, Owner::Player(mate));
        assert!(game.take_pending().is_empty());
    }
}
