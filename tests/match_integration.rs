//! Integration tests for a match's lifecycle
//!
//! Spawning, upkeep and diplomacy intents, all queued on the scheduler
//! the way a lobby and its clients would feed them in.

use frontline::core::config::GameSettings;
use frontline::core::types::{PlayerId, PlayerType};
use frontline::execution::{
    AllianceRequestExecution, BreakAllianceExecution, DonateExecution, Donation,
    EmbargoAction, EmbargoExecution, Scheduler, SpawnExecution, WinCheckExecution,
};
use frontline::game::{Game, PlayerInfo, Winner};
use frontline::map::{GameMap, TerrainType};

fn game_with(settings: GameSettings) -> Game {
    Game::with_settings(GameMap::filled(40, 20, TerrainType::Plains), settings)
}

fn join(game: &mut Game, name: &str) -> PlayerId {
    game.add_player(PlayerInfo::new(name, PlayerType::Human))
        .unwrap()
}

fn quick_settings() -> GameSettings {
    GameSettings {
        spawn_phase_turns: 5,
        spawn_immunity_duration: 0,
        ..Default::default()
    }
}

#[test]
fn test_spawn_then_upkeep_after_spawn_phase() {
    let mut game = game_with(quick_settings());
    let a = join(&mut game, "a");
    let b = join(&mut game, "b");
    let mut scheduler = Scheduler::new();
    scheduler.add_execution(SpawnExecution::new(a, game.map().ref_at(10, 10)));
    scheduler.add_execution(SpawnExecution::new(b, game.map().ref_at(30, 10)));

    scheduler.execute_next_tick(&mut game);
    for id in [a, b] {
        let player = game.player(id).unwrap();
        assert!(player.has_spawned());
        assert!(player.num_tiles_owned() > 0);
    }
    // upkeep waits for the spawn phase to end
    scheduler.run(&mut game, 4);
    assert_eq!(game.player(a).unwrap().gold(), 0);

    scheduler.run(&mut game, 20);
    assert!(!game.in_spawn_phase());
    assert!(game.player(a).unwrap().gold() > 0);
    assert!(game.stats().player(a).unwrap().gold[0] > 0);
}

#[test]
fn test_spawn_on_water_does_nothing() {
    let mut map_text = String::new();
    for y in 0..10 {
        if y > 0 {
            map_text.push('\n');
        }
        map_text.push_str("....~~~~~~");
    }
    let map = GameMap::from_ascii(&map_text).unwrap();
    let mut game = Game::with_settings(map, quick_settings());
    let a = join(&mut game, "a");
    let mut scheduler = Scheduler::new();
    scheduler.add_execution(SpawnExecution::new(a, game.map().ref_at(8, 5)));
    scheduler.execute_next_tick(&mut game);
    assert!(!game.player(a).unwrap().has_spawned());
    assert_eq!(game.player(a).unwrap().num_tiles_owned(), 0);
}

#[test]
fn test_alliance_donation_and_betrayal() {
    let settings = GameSettings {
        spawn_phase_turns: 0,
        ..quick_settings()
    };
    let mut game = game_with(settings);
    let a = join(&mut game, "a");
    let b = join(&mut game, "b");
    // territory without upkeep, so gold only moves through the donation
    for (player, x0) in [(a, 0), (b, 20)] {
        for y in 0..20 {
            for x in x0..x0 + 20 {
                let tile = game.map().ref_at(x, y);
                game.conquer(player, tile);
            }
        }
    }
    let mut scheduler = Scheduler::new();

    scheduler.add_execution(AllianceRequestExecution::new(a, b));
    scheduler.execute_next_tick(&mut game);
    assert!(game.alliance_request(a, b).is_some());
    assert!(!game.is_allied(a, b));

    // asking back counts as accepting
    scheduler.add_execution(AllianceRequestExecution::new(b, a));
    scheduler.execute_next_tick(&mut game);
    assert!(game.is_allied(a, b));
    assert!(game.alliance_requests().is_empty());

    game.player_mut(a).unwrap().add_gold(900);
    scheduler.add_execution(DonateExecution::new(a, b, Donation::Gold(None)));
    scheduler.execute_next_tick(&mut game);
    assert_eq!(game.player(a).unwrap().gold(), 600);
    assert_eq!(game.player(b).unwrap().gold(), 300);

    scheduler.add_execution(BreakAllianceExecution::new(a, b));
    scheduler.execute_next_tick(&mut game);
    assert!(!game.is_allied(a, b));
    let now = game.ticks();
    let traitor_duration = game.settings().traitor_duration;
    assert!(game.player(a).unwrap().is_traitor(now, traitor_duration));
    assert_eq!(game.stats().player(a).unwrap().betrayals, 1);

    // strangers again: donations are refused
    scheduler.add_execution(DonateExecution::new(a, b, Donation::Gold(Some(100))));
    scheduler.execute_next_tick(&mut game);
    assert_eq!(game.player(b).unwrap().gold(), 300);
}

#[test]
fn test_embargo_stops_trade_until_lifted() {
    let mut game = game_with(quick_settings());
    let a = join(&mut game, "a");
    let b = join(&mut game, "b");
    let mut scheduler = Scheduler::new();
    scheduler.add_execution(SpawnExecution::new(a, game.map().ref_at(10, 10)));
    scheduler.add_execution(SpawnExecution::new(b, game.map().ref_at(30, 10)));
    scheduler.run(&mut game, 6);
    assert!(game.can_trade(a, b));

    scheduler.add_execution(EmbargoExecution::new(a, b, EmbargoAction::Start));
    scheduler.execute_next_tick(&mut game);
    assert!(!game.can_trade(a, b));
    assert!(!game.can_trade(b, a));

    scheduler.add_execution(EmbargoExecution::new(a, b, EmbargoAction::Stop));
    scheduler.execute_next_tick(&mut game);
    assert!(game.can_trade(a, b));
}

#[test]
fn test_lone_survivor_wins() {
    let settings = GameSettings {
        spawn_phase_turns: 0,
        ..quick_settings()
    };
    let mut game = Game::with_settings(GameMap::filled(6, 6, TerrainType::Plains), settings);
    let a = join(&mut game, "a");
    let mut scheduler = Scheduler::new();
    scheduler.add_execution(SpawnExecution::new(a, game.map().ref_at(3, 3)));
    scheduler.add_execution(WinCheckExecution::new());
    scheduler.run(&mut game, 11);
    assert_eq!(game.winner(), Some(Winner::Player(a)));
}
