//! Spawn placement

use crate::core::types::{Owner, PlayerId, PlayerType, Tick, TileRef};
use crate::execution::{BotExecution, Executable, PlayerExecution};
use crate::game::Game;

/// Euclidean radius of the starting territory
const SPAWN_RADIUS: u64 = 4;

#[derive(Debug)]
pub struct SpawnExecution {
    player: PlayerId,
    tile: TileRef,
    active: bool,
}

impl SpawnExecution {
    pub fn new(player: PlayerId, tile: TileRef) -> Self {
        Self {
            player,
            tile,
            active: true,
        }
    }
}

impl Executable for SpawnExecution {
    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        self.active = false;

        let Some((spawned, player_type)) = game
            .player(self.player)
            .map(|p| (p.has_spawned(), p.player_type()))
        else {
            tracing::warn!(player = ?self.player, "spawn for unknown player");
            return;
        };
        // late joiners may still place their first spawn
        if !game.in_spawn_phase() && spawned {
            tracing::warn!(player = ?self.player, "spawn after the spawn phase");
            return;
        }
        let map = game.map();
        if !map.is_valid_ref(self.tile) || !map.is_land(self.tile) {
            tracing::warn!(player = ?self.player, tile = ?self.tile, "invalid spawn tile");
            return;
        }

        let previous: Vec<TileRef> = game
            .player(self.player)
            .map(|p| p.tiles().iter().copied().collect())
            .unwrap_or_default();
        for tile in previous {
            game.relinquish(tile);
        }

        let center = self.tile;
        let claim = game.map().bfs(center, |map, t| {
            map.is_land(t)
                && map.owner(t) == Owner::TerraNullius
                && map.euclidean_dist_squared(center, t) <= SPAWN_RADIUS * SPAWN_RADIUS
        });
        for tile in claim {
            game.conquer(self.player, tile);
        }
        tracing::debug!(player = ?self.player, tile = ?self.tile, "player spawned");

        if !spawned {
            game.mark_spawned(self.player);
            game.add_execution(PlayerExecution::new(self.player));
            if player_type == PlayerType::Bot {
                game.add_execution(BotExecution::new(self.player));
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn active_during_spawn_phase(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameSettings;
    use crate::game::PlayerInfo;
    use crate::map::{GameMap, TerrainType};

    fn spawn_game() -> Game {
        Game::with_settings(
            GameMap::filled(30, 30, TerrainType::Plains),
            GameSettings::default(),
        )
    }

    #[test]
    fn test_spawn_claims_disc() {
        let mut game = spawn_game();
        let a = game.add_player(PlayerInfo::new("a", PlayerType::Human)).unwrap();
        let mut spawn = SpawnExecution::new(a, game.map().ref_at(15, 15));
        spawn.tick(&mut game, 0);
        let player = game.player(a).unwrap();
        assert!(player.has_spawned());
        // lattice points with x^2 + y^2 <= 16
        assert_eq!(player.num_tiles_owned(), 49);
        assert_eq!(game.take_pending().len(), 1);
    }

    #[test]
    fn test_respawn_moves_territory() {
        let mut game = spawn_game();
        let a = game.add_player(PlayerInfo::new("a", PlayerType::Bot)).unwrap();
        SpawnExecution::new(a, game.map().ref_at(5, 5)).tick(&mut game, 0);
        assert_eq!(game.take_pending().len(), 2);
        SpawnExecution::new(a, game.map().ref_at(20, 20)).tick(&mut game, 1);
        assert!(!game.map().has_owner(game.map().ref_at(5, 5)));
        assert_eq!(game.map().owner(game.map().ref_at(20, 20)), Owner::Player(a));
        // upkeep is only queued once
        assert!(game.take_pending().is_empty());
    }

    #[test]
    fn test_spawn_on_water_is_rejected() {
        let map = GameMap::from_ascii(
            "
            ~~~..
            ~~~..
            ",
        )
        .unwrap();
        let mut game = Game::with_settings(map, GameSettings::default());
        let a = game.add_player(PlayerInfo::new("a", PlayerType::Human)).unwrap();
        SpawnExecution::new(a, game.map().ref_at(0, 0)).tick(&mut game, 0);
        assert!(!game.player(a).unwrap().has_spawned());
    }

    #[test]
    fn test_spawn_skips_claimed_land() {
        let mut game = spawn_game();
        let a = game.add_player(PlayerInfo::new("a", PlayerType::Human)).unwrap();
        let b = game.add_player(PlayerInfo::new("b", PlayerType::Human)).unwrap();
        SpawnExecution::new(a, game.map().ref_at(10, 10)).tick(&mut game, 0);
        SpawnExecution::new(b, game.map().ref_at(17, 10)).tick(&mut game, 0);
        assert_eq!(game.map().owner(game.map().ref_at(14, 10)), Owner::Player(a));
        assert_eq!(game.map().owner(game.map().ref_at(15, 10)), Owner::Player(b));
        assert!(game.player(b).unwrap().num_tiles_owned() < 49);
    }
}
