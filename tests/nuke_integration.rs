//! Integration tests for silos and nukes
//!
//! Build intents go through the scheduler exactly as a client would send
//! them: the silo is built, a bomb is launched from it, flies across the
//! map and detonates.

use frontline::core::config::{Config, GameSettings};
use frontline::core::types::{Owner, PlayerId, PlayerType, TileRef, UnitId};
use frontline::execution::{BuildExecution, Scheduler};
use frontline::game::{Game, PlayerInfo, UnitKind, UnitType};
use frontline::map::GameMap;

const WIDTH: u32 = 100;
const HEIGHT: u32 = 40;
/// Columns from here on are ocean
const COAST_X: u32 = 85;

fn settings() -> GameSettings {
    GameSettings {
        spawn_phase_turns: 0,
        spawn_immunity_duration: 0,
        infinite_gold: true,
        instant_build: true,
        ..Default::default()
    }
}

fn coast_map() -> GameMap {
    let row: String = (0..WIDTH)
        .map(|x| if x >= COAST_X { '~' } else { '.' })
        .collect();
    let text = vec![row; HEIGHT as usize].join("\n");
    GameMap::from_ascii(&text).unwrap()
}

struct World {
    game: Game,
    scheduler: Scheduler,
    a: PlayerId,
    b: PlayerId,
}

fn setup(settings: GameSettings) -> World {
    let mut game = Game::with_settings(coast_map(), settings);
    let a = game
        .add_player(PlayerInfo::new("launcher", PlayerType::Human))
        .unwrap();
    let b = game
        .add_player(PlayerInfo::new("victim", PlayerType::Human))
        .unwrap();
    for y in 0..HEIGHT {
        for x in 0..20 {
            let tile = game.map().ref_at(x, y);
            game.conquer(a, tile);
        }
        for x in 60..COAST_X {
            let tile = game.map().ref_at(x, y);
            game.conquer(b, tile);
        }
    }
    World {
        game,
        scheduler: Scheduler::new(),
        a,
        b,
    }
}

fn build(world: &mut World, unit_type: UnitType, tile: TileRef) {
    let exec = BuildExecution::from_intent(world.a, unit_type, tile).unwrap();
    world.scheduler.add_execution(exec);
}

fn silo_of(game: &Game, owner: PlayerId) -> UnitId {
    game.units_of(owner, &[UnitType::MissileSilo])[0]
}

/// A ship off b's coast, owned by a bystander whose `side`×`side` block
/// lies well outside the blast
fn bystander_ship(world: &mut World, side: u32) -> (PlayerId, UnitId) {
    let c = world
        .game
        .add_player(PlayerInfo::new("bystander", PlayerType::Human))
        .unwrap();
    for y in 0..side {
        for x in 25..25 + side {
            let tile = world.game.map().ref_at(x, y);
            world.game.conquer(c, tile);
        }
    }
    let at = world.game.map().ref_at(88, 20);
    let destination = world.game.map().ref_at(0, 0);
    let ship = world.game.build_unit(
        c,
        at,
        UnitKind::TransportShip {
            troops: 1_000.0,
            destination,
        },
    );
    (c, ship)
}

fn bomb_coast(world: &mut World) {
    let silo_tile = world.game.map().ref_at(10, 20);
    let dst = world.game.map().ref_at(80, 20);
    build(world, UnitType::MissileSilo, silo_tile);
    build(world, UnitType::AtomBomb, dst);
    world.scheduler.run(&mut world.game, 30);
    assert_eq!(world.game.unit_count(world.a, UnitType::AtomBomb), 0);
}

#[test]
fn test_atom_bomb_flies_and_detonates() {
    let mut world = setup(settings());
    let silo_tile = world.game.map().ref_at(10, 20);
    let dst = world.game.map().ref_at(80, 20);
    build(&mut world, UnitType::MissileSilo, silo_tile);
    build(&mut world, UnitType::AtomBomb, dst);

    world.scheduler.execute_next_tick(&mut world.game);
    assert_eq!(world.game.unit_count(world.a, UnitType::AtomBomb), 1);
    // the flight starts, and the target hears of it, a tick later
    world.scheduler.execute_next_tick(&mut world.game);
    assert!(world.game.messages().iter().any(|m| {
        m.player == Some(world.b) && m.text.contains("inbound")
    }));

    world.scheduler.run(&mut world.game, 20);
    let game = &world.game;
    assert_eq!(game.unit_count(world.a, UnitType::AtomBomb), 0);
    assert_eq!(game.map().owner(dst), Owner::TerraNullius);
    assert!(game.map().has_fallout(dst));
    // the blast never reaches the launcher's land
    assert_eq!(game.player(world.a).unwrap().num_tiles_owned(), 800);
    assert!(game.player(world.b).unwrap().num_tiles_owned() < 1_000);
    assert!(game.player(world.b).unwrap().troops() < 2_500.0);

    let bombs = game.stats().player(world.a).unwrap().bombs[&UnitType::AtomBomb];
    assert_eq!(bombs, [1, 1, 0]);
}

#[test]
fn test_transport_in_blast_loses_troops_by_death_factor() {
    let mut world = setup(settings());
    let (c, ship) = bystander_ship(&mut world, 10);
    bomb_coast(&mut world);

    let game = &world.game;
    assert_eq!(game.player(c).unwrap().num_tiles_owned(), 100);
    let expected = 1_000.0 - game.config().nuke_death_factor(1_000.0, 100);
    assert_eq!(expected, 950.0);
    assert_eq!(game.unit(ship).unwrap().troops(), expected);
}

#[test]
fn test_transport_losses_stop_at_zero() {
    let mut world = setup(settings());
    // on a 2x2 block the death factor outweighs the whole cargo
    let (c, ship) = bystander_ship(&mut world, 2);
    bomb_coast(&mut world);

    let game = &world.game;
    let tiles = game.player(c).unwrap().num_tiles_owned();
    assert!(game.config().nuke_death_factor(1_000.0, tiles) > 1_000.0);
    let ship = game.unit(ship).unwrap();
    assert_eq!(ship.unit_type(), UnitType::TransportShip);
    assert_eq!(ship.troops(), 0.0);
}

#[test]
fn test_silo_cannot_launch_again_until_cooldown_ends() {
    let mut world = setup(settings());
    let silo_tile = world.game.map().ref_at(10, 20);
    let dst = world.game.map().ref_at(70, 5);
    build(&mut world, UnitType::MissileSilo, silo_tile);
    build(&mut world, UnitType::AtomBomb, dst);

    // launched on tick 0
    world.scheduler.run(&mut world.game, 75);
    let silo = silo_of(&world.game, world.a);
    assert!(world.game.unit(silo).unwrap().is_cooldown());
    assert_eq!(world.game.can_build(world.a, UnitType::AtomBomb, dst), None);

    world.scheduler.execute_next_tick(&mut world.game);
    assert!(!world.game.unit(silo).unwrap().is_cooldown());
    assert_eq!(
        world.game.can_build(world.a, UnitType::AtomBomb, dst),
        Some(silo_tile)
    );
}

#[test]
fn test_silo_waits_for_construction() {
    let mut world = setup(GameSettings {
        instant_build: false,
        ..settings()
    });
    let silo_tile = world.game.map().ref_at(10, 20);
    build(&mut world, UnitType::MissileSilo, silo_tile);

    world.scheduler.run(&mut world.game, 101);
    assert_eq!(world.game.unit_count(world.a, UnitType::Construction), 1);
    assert_eq!(world.game.unit_count(world.a, UnitType::MissileSilo), 0);

    world.scheduler.execute_next_tick(&mut world.game);
    assert_eq!(world.game.unit_count(world.a, UnitType::Construction), 0);
    assert_eq!(world.game.unit(silo_of(&world.game, world.a)).unwrap().tile(), silo_tile);
}

#[test]
fn test_nukes_disabled() {
    let mut world = setup(GameSettings {
        disable_nukes: true,
        ..settings()
    });
    let silo_tile = world.game.map().ref_at(10, 20);
    let dst = world.game.map().ref_at(70, 5);
    build(&mut world, UnitType::MissileSilo, silo_tile);
    build(&mut world, UnitType::AtomBomb, dst);
    world.scheduler.run(&mut world.game, 5);
    assert_eq!(world.game.unit_count(world.a, UnitType::MissileSilo), 1);
    assert_eq!(world.game.unit_count(world.a, UnitType::AtomBomb), 0);
    assert!(world.game.stats().player(world.a).unwrap().bombs.is_empty());
}
