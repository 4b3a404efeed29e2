//! Determinism of whole matches
//!
//! Two runs from the same settings and seed must agree on every tile,
//! unit, attack and player counter. Snapshots are compared as JSON so a
//! mismatch shows up as a readable diff.

use frontline::core::config::GameSettings;
use frontline::game::GameSnapshot;
use frontline::headless::{run_match, MatchConfig};
use frontline::map::MapGenConfig;

fn small_match(seed: u64) -> MatchConfig {
    MatchConfig {
        map: MapGenConfig {
            width: 80,
            height: 50,
            seed,
            continents: 3,
            ..Default::default()
        },
        bots: 4,
        ticks: 300,
    }
}

fn run(seed: u64) -> (String, String) {
    let (game, summary) = run_match(GameSettings::default(), &small_match(seed)).unwrap();
    let snapshot = GameSnapshot::capture(&game).to_json().unwrap();
    let summary = serde_json::to_string(&summary).unwrap();
    (snapshot, summary)
}

#[test]
fn test_same_seed_same_match() {
    let (snapshot_a, summary_a) = run(7);
    let (snapshot_b, summary_b) = run(7);
    assert_eq!(summary_a, summary_b);
    assert_eq!(snapshot_a, snapshot_b);
}

#[test]
fn test_different_seeds_diverge() {
    let (snapshot_a, _) = run(7);
    let (snapshot_b, _) = run(8);
    assert_ne!(snapshot_a, snapshot_b);
}

#[test]
fn test_bots_spawn_and_play() {
    let (game, summary) = run_match(GameSettings::default(), &small_match(11)).unwrap();
    assert_eq!(summary.players.len(), 4);
    assert!(summary.winner.is_some() || summary.ticks == 300);
    assert!(game.players().iter().any(|p| p.is_alive()));
    for player in game.players().iter().filter(|p| p.is_alive()) {
        assert!(player.has_spawned());
    }
}

#[test]
fn test_invalid_settings_are_rejected() {
    let settings = GameSettings {
        percentage_tiles_owned_to_win: 0.0,
        ..Default::default()
    };
    assert!(run_match(settings, &small_match(1)).is_err());
}
