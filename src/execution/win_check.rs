//! Victory by territory share

use std::collections::BTreeMap;

use crate::core::config::GameMode;
use crate::core::types::{Team, Tick};
use crate::execution::Executable;
use crate::game::{Game, Winner};

const CHECK_INTERVAL: Tick = 10;

#[derive(Debug)]
pub struct WinCheckExecution {
    active: bool,
}

impl Default for WinCheckExecution {
    fn default() -> Self {
        Self::new()
    }
}

impl WinCheckExecution {
    pub fn new() -> Self {
        Self { active: true }
    }

    /// Percent of the land that is not fallout
    fn share(game: &Game, tiles: usize) -> f64 {
        let map = game.map();
        let habitable = map.num_land_tiles().saturating_sub(map.num_fallout_tiles());
        if habitable == 0 {
            return 0.0;
        }
        tiles as f64 * 100.0 / habitable as f64
    }

    fn leader(game: &Game) -> Option<(Winner, usize)> {
        match game.settings().game_mode {
            GameMode::FreeForAll => game
                .players()
                .iter()
                .max_by_key(|p| (p.num_tiles_owned(), std::cmp::Reverse(p.id())))
                .map(|p| (Winner::Player(p.id()), p.num_tiles_owned())),
            GameMode::Team => {
                let mut tiles: BTreeMap<Team, usize> = BTreeMap::new();
                for player in game.players() {
                    if let Some(team) = player.team() {
                        *tiles.entry(team).or_default() += player.num_tiles_owned();
                    }
                }
                tiles
                    .into_iter()
                    .max_by_key(|&(team, count)| (count, std::cmp::Reverse(team)))
                    .map(|(team, count)| (Winner::Team(team), count))
            }
        }
    }
}

impl Executable for WinCheckExecution {
    fn tick(&mut self, game: &mut Game, tick: Tick) {
        if tick % CHECK_INTERVAL != 0 || game.winner().is_some() {
            return;
        }
        let Some((winner, tiles)) = Self::leader(game) else {
            return;
        };
        let share = Self::share(game, tiles);
        if share > game.settings().percentage_tiles_owned_to_win {
            tracing::info!(?winner, share, tick, "game won");
            game.set_winner(winner);
            self.active = false;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameSettings;
    use crate::core::types::PlayerType;
    use crate::game::test_support::*;
    use crate::game::PlayerInfo;
    use crate::map::{GameMap, TerrainType};

    #[test]
    fn test_player_wins_past_threshold() {
        let mut game = plains_game(10, 10);
        let a = add_human(&mut game, "a");
        let b = add_human(&mut game, "b");
        claim_rect(&mut game, a, 0, 0, 10, 8);
        claim_rect(&mut game, b, 0, 8, 10, 10);
        let mut exec = WinCheckExecution::new();

        // exactly 80% is not enough
        exec.tick(&mut game, 0);
        assert!(exec.is_active());
        assert_eq!(game.winner(), None);

        let tile = game.map().ref_at(0, 8);
        game.conquer(a, tile);
        exec.tick(&mut game, 5);
        assert_eq!(game.winner(), None);
        exec.tick(&mut game, 10);
        assert_eq!(game.winner(), Some(Winner::Player(a)));
        assert!(!exec.is_active());
    }

    #[test]
    fn test_fallout_shrinks_the_denominator() {
        let mut game = plains_game(10, 10);
        let a = add_human(&mut game, "a");
        claim_rect(&mut game, a, 0, 0, 10, 7);
        for x in 0..10 {
            let tile = game.map().ref_at(x, 9);
            game.set_fallout(tile, true);
        }
        let mut exec = WinCheckExecution::new();
        exec.tick(&mut game, 0);
        // 70 of 90 habitable tiles
        assert_eq!(game.winner(), None);
        for x in 0..10 {
            let tile = game.map().ref_at(x, 8);
            game.set_fallout(tile, true);
        }
        exec.tick(&mut game, 10);
        assert_eq!(game.winner(), Some(Winner::Player(a)));
    }

    #[test]
    fn test_team_tiles_are_summed() {
        let settings = GameSettings {
            game_mode: GameMode::Team,
            ..open_settings()
        };
        let mut game = Game::with_settings(GameMap::filled(10, 10, TerrainType::Plains), settings);
        let join = |game: &mut Game, name: &str, team: u8| {
            game.add_player(PlayerInfo::new(name, PlayerType::Human).with_team(Team(team)))
                .unwrap()
        };
        let a = join(&mut game, "a", 1);
        let b = join(&mut game, "b", 1);
        let c = join(&mut game, "c", 2);
        claim_rect(&mut game, a, 0, 0, 10, 5);
        claim_rect(&mut game, b, 0, 5, 10, 9);
        claim_rect(&mut game, c, 0, 9, 10, 10);
        let mut exec = WinCheckExecution::new();
        exec.tick(&mut game, 0);
        assert_eq!(game.winner(), Some(Winner::Team(Team(1))));
    }
}
