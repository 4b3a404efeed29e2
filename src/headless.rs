//! Headless bot matches on generated maps

use serde::Serialize;

use crate::core::config::GameSettings;
use crate::core::error::{Result, SimError};
use crate::core::random::PseudoRandom;
use crate::core::types::{Gold, PlayerType, Tick};
use crate::execution::{Scheduler, SpawnExecution, WinCheckExecution};
use crate::game::{Game, PlayerInfo, Winner};
use crate::map::{generate_map, MapGenConfig};

/// Attempts at finding free land for each bot's spawn
const SPAWN_PICK_TRIES: u32 = 200;

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub map: MapGenConfig,
    pub bots: u32,
    pub ticks: Tick,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            map: MapGenConfig::default(),
            bots: 8,
            ticks: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub name: String,
    pub alive: bool,
    pub tiles: usize,
    pub troops: f64,
    pub gold: Gold,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub seed: u64,
    pub ticks: Tick,
    pub winner: Option<Winner>,
    pub players: Vec<PlayerSummary>,
}

impl MatchSummary {
    pub fn capture(game: &Game, seed: u64) -> Self {
        Self {
            seed,
            ticks: game.ticks(),
            winner: game.winner(),
            players: game
                .players()
                .iter()
                .map(|p| PlayerSummary {
                    name: p.name().to_string(),
                    alive: p.is_alive(),
                    tiles: p.num_tiles_owned(),
                    troops: p.troops(),
                    gold: p.gold(),
                })
                .collect(),
        }
    }
}

/// Build a game with `config.bots` bots queued to spawn on random land
pub fn setup_match(settings: GameSettings, config: &MatchConfig) -> Result<(Game, Scheduler)> {
    settings.validate().map_err(SimError::InvalidConfig)?;
    let map = generate_map(&config.map)?;
    let mut game = Game::with_settings(map, settings);
    let mut scheduler = Scheduler::new();
    let mut random = PseudoRandom::new(config.map.seed);

    for i in 0..config.bots {
        let id = game.add_player(PlayerInfo::new(format!("Bot {}", i + 1), PlayerType::Bot))?;
        let map = game.map();
        let spawn = (0..SPAWN_PICK_TRIES).find_map(|_| {
            let x = random.next_int(0, i64::from(map.width()));
            let y = random.next_int(0, i64::from(map.height()));
            map.try_ref(x, y)
                .filter(|&t| map.is_land(t) && !map.has_owner(t))
        });
        match spawn {
            Some(tile) => scheduler.add_execution(SpawnExecution::new(id, tile)),
            None => tracing::warn!(bot = ?id, "no free land to spawn on"),
        }
    }
    scheduler.add_execution(WinCheckExecution::new());
    tracing::info!(
        width = config.map.width,
        height = config.map.height,
        bots = config.bots,
        "match set up"
    );
    Ok((game, scheduler))
}

/// One tick; nobody reads messages in a headless match, so they go to the log
fn advance(game: &mut Game, scheduler: &mut Scheduler) {
    scheduler.execute_next_tick(game);
    for message in game.drain_messages() {
        tracing::trace!(player = ?message.player, tick = message.tick, "{}", message.text);
    }
}

/// Run until the tick limit or a winner, whichever comes first
pub fn run_match(settings: GameSettings, config: &MatchConfig) -> Result<(Game, MatchSummary)> {
    let (mut game, mut scheduler) = setup_match(settings, config)?;
    while game.ticks() < config.ticks && game.winner().is_none() {
        advance(&mut game, &mut scheduler);
    }
    let summary = MatchSummary::capture(&game, config.map.seed);
    tracing::info!(ticks = summary.ticks, winner = ?summary.winner, "match finished");
    Ok((game, summary))
}
