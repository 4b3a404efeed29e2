//! Game configuration with documented constants
//!
//! `GameSettings` carries the per-match knobs and can be loaded from TOML.
//! The `Config` trait exposes every balance policy the executions consult;
//! `DefaultConfig` is the stock implementation built from a `GameSettings`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Gold, PlayerType, Tick, TileRef};
use crate::game::{Game, Player, UnitType};
use crate::map::TerrainType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    FreeForAll,
    Team,
}

/// Per-match settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub game_mode: GameMode,

    // === SPAWN ===
    /// Ticks at the start of the match during which players pick spawn points
    pub spawn_phase_turns: Tick,
    /// Extra ticks after the spawn phase during which players cannot be attacked
    pub spawn_immunity_duration: Tick,

    // === CHEATS / TEST KNOBS ===
    pub infinite_gold: bool,
    pub infinite_troops: bool,
    /// Skip construction countdowns entirely
    pub instant_build: bool,
    pub disable_nukes: bool,

    // === VICTORY ===
    /// Share of non-fallout land (percent) a player or team must exceed to win
    pub percentage_tiles_owned_to_win: f64,

    // === DIPLOMACY ===
    /// Ticks an alliance lasts before it expires on its own
    pub alliance_duration: Tick,
    /// Ticks a temporary embargo (placed by attacking) lasts
    pub temporary_embargo_duration: Tick,
    /// Ticks a player stays marked as a target
    pub target_duration: Tick,
    /// Ticks a betrayal keeps a player flagged as traitor
    pub traitor_duration: Tick,
    /// Relation drift toward neutral per tick
    pub relation_decay_per_tick: f64,

    // === ATTACKS ===
    /// Ticks between a retreat order and the refund
    pub retreat_delay: Tick,
    /// Defenders with fewer tiles than this are wiped out on contact
    pub defeated_tile_threshold: usize,
    /// Passes used to hand out the tiles of a defeated defender
    pub defeated_mop_up_passes: u32,
    /// Minimum ticks between disconnected-cluster checks
    pub cluster_check_interval: Tick,

    // === UNITS ===
    pub boat_max_number: usize,
    pub silo_cooldown: Tick,
    pub sam_cooldown: Tick,
    /// Air tiles per tick for atom and hydrogen bombs
    pub default_nuke_speed: u32,
    pub mirv_warheads: usize,
    /// Manhattan radius around the MIRV target in which warheads land
    pub mirv_range: u32,
    pub sam_hitting_chance: f64,
    pub sam_warhead_hitting_chance: f64,
    /// Ticks a shell survives after its launcher is gone
    pub shell_lifetime: Tick,
    pub warship_patrol_range: u32,
    pub warship_target_range: u32,
    pub warship_shell_attack_rate: Tick,
    /// Manhattan radius within which a defense post strengthens tiles
    pub defense_post_range: u32,
    /// Ticks between trade-ship spawn rolls for a port
    pub port_check_interval: Tick,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            game_mode: GameMode::FreeForAll,
            spawn_phase_turns: 100,
            spawn_immunity_duration: 50,
            infinite_gold: false,
            infinite_troops: false,
            instant_build: false,
            disable_nukes: false,
            percentage_tiles_owned_to_win: 80.0,
            alliance_duration: 6000,
            temporary_embargo_duration: 3000,
            target_duration: 100,
            traitor_duration: 300,
            relation_decay_per_tick: 0.05,
            retreat_delay: 1,
            defeated_tile_threshold: 100,
            defeated_mop_up_passes: 10,
            cluster_check_interval: 20,
            boat_max_number: 3,
            silo_cooldown: 75,
            sam_cooldown: 75,
            default_nuke_speed: 6,
            mirv_warheads: 350,
            mirv_range: 1500,
            sam_hitting_chance: 0.8,
            sam_warhead_hitting_chance: 0.5,
            shell_lifetime: 50,
            warship_patrol_range: 100,
            warship_target_range: 130,
            warship_shell_attack_rate: 20,
            defense_post_range: 30,
            port_check_interval: 10,
        }
    }
}

impl GameSettings {
    /// Parse settings from TOML. Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: GameSettings = toml::from_str(content)?;
        settings.validate().map_err(SimError::InvalidConfig)?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check that values are coherent
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.percentage_tiles_owned_to_win > 0.0 && self.percentage_tiles_owned_to_win <= 100.0)
        {
            return Err("percentage_tiles_owned_to_win must be in (0, 100]".into());
        }
        for (name, value) in [
            ("sam_hitting_chance", self.sam_hitting_chance),
            ("sam_warhead_hitting_chance", self.sam_warhead_hitting_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be in [0, 1]", name));
            }
        }
        if self.cluster_check_interval == 0 {
            return Err("cluster_check_interval must be positive".into());
        }
        if self.port_check_interval == 0 {
            return Err("port_check_interval must be positive".into());
        }
        if self.default_nuke_speed == 0 {
            return Err("default_nuke_speed must be positive".into());
        }
        if self.relation_decay_per_tick < 0.0 {
            return Err("relation_decay_per_tick must not be negative".into());
        }
        Ok(())
    }
}

/// Static attributes of a unit type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitInfo {
    pub territory_bound: bool,
    pub max_health: Option<f64>,
    pub damage: Option<f64>,
    pub construction_duration: Option<Tick>,
}

/// Blast radii (Euclidean) of a nuke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NukeMagnitude {
    pub inner: u32,
    pub outer: u32,
}

/// Result of resolving one tile of an attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOutcome {
    pub attacker_troop_loss: f64,
    pub defender_troop_loss: f64,
    pub tiles_per_tick_used: f64,
}

/// Balance policies consumed by the simulation
///
/// Plain settings are provided methods over `settings()`; formulas must be
/// supplied by the implementor.
pub trait Config {
    fn settings(&self) -> &GameSettings;

    fn spawn_phase_turns(&self) -> Tick {
        self.settings().spawn_phase_turns
    }

    fn spawn_immunity_duration(&self) -> Tick {
        self.settings().spawn_immunity_duration
    }

    fn silo_cooldown(&self) -> Tick {
        self.settings().silo_cooldown
    }

    fn sam_cooldown(&self) -> Tick {
        self.settings().sam_cooldown
    }

    fn boat_max_number(&self) -> usize {
        self.settings().boat_max_number
    }

    fn default_nuke_speed(&self) -> u32 {
        self.settings().default_nuke_speed
    }

    /// Troops committed by an attack order that names no amount
    fn attack_amount(&self, attacker: &Player) -> f64;

    /// Tile budget of an attack for one tick
    fn attack_tiles_per_tick(
        &self,
        attack_troops: f64,
        attacker: &Player,
        defender: Option<&Player>,
        border_size: f64,
    ) -> f64;

    /// Losses and budget cost of conquering one tile
    fn attack_logic(
        &self,
        game: &Game,
        attack_troops: f64,
        attacker: &Player,
        defender: Option<&Player>,
        tile: TileRef,
    ) -> AttackOutcome;

    fn unit_info(&self, unit_type: UnitType) -> UnitInfo;

    /// Price of the next unit of `unit_type` given how many the player already owns
    fn unit_cost(&self, unit_type: UnitType, already_owned: usize) -> Gold;

    fn nuke_magnitudes(&self, unit_type: UnitType) -> NukeMagnitude;

    /// Population killed per destroyed tile
    fn nuke_death_factor(&self, humans: f64, tiles_owned: usize) -> f64;

    fn max_population(&self, game: &Game, player: &Player) -> f64;

    fn population_increase_rate(&self, game: &Game, player: &Player) -> f64;

    fn gold_addition_rate(&self, player: &Player) -> Gold;

    /// Troops moved from workers (positive) or back to workers (negative) this tick
    fn troop_adjustment_rate(&self, game: &Game, player: &Player) -> f64;

    fn trade_ship_gold(&self, distance: u32) -> Gold;

    /// Odds (1 in n) that a port spawns a trade ship on a check
    fn trade_ship_spawn_rate(&self, num_ports: usize) -> u32;
}

// Terrain magnitude and speed for attack resolution
const PLAINS_ATTACK: (f64, f64) = (80.0, 16.5);
const HIGHLAND_ATTACK: (f64, f64) = (100.0, 20.0);
const MOUNTAIN_ATTACK: (f64, f64) = (120.0, 25.0);

const DEFENSE_POST_DEFENSE_BONUS: f64 = 5.0;
const DEFENSE_POST_SPEED_BONUS: f64 = 3.0;
const TRAITOR_DEFENSE_DEBUFF: f64 = 0.8;

/// Stock balance
#[derive(Debug, Clone, Default)]
pub struct DefaultConfig {
    settings: GameSettings,
}

impl DefaultConfig {
    pub fn new(settings: GameSettings) -> Self {
        Self { settings }
    }
}

impl Config for DefaultConfig {
    fn settings(&self) -> &GameSettings {
        &self.settings
    }

    fn attack_amount(&self, attacker: &Player) -> f64 {
        match attacker.player_type() {
            PlayerType::Bot => attacker.troops() / 20.0,
            PlayerType::Human | PlayerType::FakeHuman => attacker.troops() / 5.0,
        }
    }

    fn attack_tiles_per_tick(
        &self,
        attack_troops: f64,
        _attacker: &Player,
        defender: Option<&Player>,
        border_size: f64,
    ) -> f64 {
        match defender {
            Some(defender) => {
                let ratio = 5.0 * attack_troops / defender.troops().max(1.0) * 2.0;
                ratio.clamp(0.01, 0.5) * border_size * 3.0
            }
            None => border_size * 2.0,
        }
    }

    fn attack_logic(
        &self,
        game: &Game,
        attack_troops: f64,
        attacker: &Player,
        defender: Option<&Player>,
        tile: TileRef,
    ) -> AttackOutcome {
        let (mut mag, mut speed) = match game.map().terrain(tile) {
            TerrainType::Plains => PLAINS_ATTACK,
            TerrainType::Highland => HIGHLAND_ATTACK,
            TerrainType::Mountain => MOUNTAIN_ATTACK,
            TerrainType::Lake | TerrainType::Ocean => PLAINS_ATTACK,
        };

        let Some(defender) = defender else {
            let loss = match attacker.player_type() {
                PlayerType::Bot => mag / 10.0,
                PlayerType::Human | PlayerType::FakeHuman => mag / 5.0,
            };
            return AttackOutcome {
                attacker_troop_loss: loss,
                defender_troop_loss: 0.0,
                tiles_per_tick_used: speed,
            };
        };

        if game.has_defense_post_near(defender.id(), tile, self.settings.defense_post_range) {
            mag *= DEFENSE_POST_DEFENSE_BONUS;
            speed *= DEFENSE_POST_SPEED_BONUS;
        }

        let mut attacker_troop_loss =
            (defender.troops() / attack_troops.max(1.0)).clamp(0.6, 2.0) * mag * 0.8;
        if defender.is_traitor(game.ticks(), self.settings.traitor_duration) {
            attacker_troop_loss *= TRAITOR_DEFENSE_DEBUFF;
        }

        AttackOutcome {
            attacker_troop_loss,
            defender_troop_loss: defender.troops() / defender.num_tiles_owned().max(1) as f64,
            tiles_per_tick_used: (defender.troops() / (5.0 * attack_troops.max(1.0)))
                .clamp(0.2, 1.5)
                * speed,
        }
    }

    fn unit_info(&self, unit_type: UnitType) -> UnitInfo {
        let (territory_bound, max_health, damage, duration) = match unit_type {
            UnitType::City => (true, None, None, Some(2 * 10)),
            UnitType::Port => (true, None, None, Some(2 * 10)),
            UnitType::MissileSilo => (true, None, None, Some(10 * 10)),
            UnitType::DefensePost => (true, None, None, Some(5 * 10)),
            UnitType::SamLauncher => (true, None, None, Some(30 * 10)),
            UnitType::Warship => (false, Some(1000.0), None, None),
            UnitType::Shell => (false, None, Some(250.0), None),
            UnitType::TransportShip
            | UnitType::TradeShip
            | UnitType::AtomBomb
            | UnitType::HydrogenBomb
            | UnitType::Mirv
            | UnitType::MirvWarhead
            | UnitType::SamMissile => (false, None, None, None),
            UnitType::Construction => (true, None, None, None),
        };
        UnitInfo {
            territory_bound,
            max_health,
            damage,
            construction_duration: if self.settings.instant_build {
                None
            } else {
                duration
            },
        }
    }

    fn unit_cost(&self, unit_type: UnitType, already_owned: usize) -> Gold {
        if self.settings.infinite_gold {
            return 0;
        }
        let scaled = |base: Gold, cap: Gold| ((already_owned as Gold + 1) * base).min(cap);
        match unit_type {
            UnitType::City => scaled(125_000, 1_000_000),
            UnitType::Port => scaled(125_000, 1_000_000),
            UnitType::DefensePost => scaled(50_000, 250_000),
            UnitType::Warship => scaled(250_000, 1_000_000),
            UnitType::MissileSilo => 1_000_000,
            UnitType::SamLauncher => 1_500_000,
            UnitType::AtomBomb => 750_000,
            UnitType::HydrogenBomb => 5_000_000,
            UnitType::Mirv => 25_000_000,
            UnitType::TransportShip
            | UnitType::TradeShip
            | UnitType::MirvWarhead
            | UnitType::Shell
            | UnitType::SamMissile
            | UnitType::Construction => 0,
        }
    }

    fn nuke_magnitudes(&self, unit_type: UnitType) -> NukeMagnitude {
        match unit_type {
            UnitType::AtomBomb => NukeMagnitude { inner: 12, outer: 30 },
            UnitType::HydrogenBomb => NukeMagnitude { inner: 80, outer: 100 },
            UnitType::MirvWarhead => NukeMagnitude { inner: 12, outer: 18 },
            _ => NukeMagnitude { inner: 0, outer: 0 },
        }
    }

    fn nuke_death_factor(&self, humans: f64, tiles_owned: usize) -> f64 {
        5.0 * humans / tiles_owned.max(1) as f64
    }

    fn max_population(&self, game: &Game, player: &Player) -> f64 {
        if self.settings.infinite_troops {
            return 1_000_000_000.0;
        }
        let tiles = player.num_tiles_owned() as f64;
        let cities = game.unit_count(player.id(), UnitType::City) as f64;
        let max = 2.0 * (tiles.powf(0.6) * 1000.0 + 50_000.0) + cities * 250_000.0;
        match player.player_type() {
            PlayerType::Bot => max / 2.0,
            PlayerType::Human | PlayerType::FakeHuman => max,
        }
    }

    fn population_increase_rate(&self, game: &Game, player: &Player) -> f64 {
        let max = self.max_population(game, player);
        let population = player.population();
        let mut to_add = 10.0 + population.powf(0.73) / 4.0;
        to_add *= 1.0 - population / max;
        if player.player_type() == PlayerType::Bot {
            to_add *= 0.7;
        }
        (population + to_add).min(max) - population
    }

    fn gold_addition_rate(&self, player: &Player) -> Gold {
        ((player.workers() * player.num_tiles_owned() as f64).sqrt() / 200.0).floor() as Gold
    }

    fn troop_adjustment_rate(&self, game: &Game, player: &Player) -> f64 {
        let max_diff = self.max_population(game, player) / 1000.0;
        let target = player.population() * player.target_troop_ratio();
        (target - player.troops()).clamp(-max_diff, max_diff)
    }

    fn trade_ship_gold(&self, distance: u32) -> Gold {
        (10_000.0 + 150.0 * f64::from(distance).powf(1.1)).floor() as Gold
    }

    fn trade_ship_spawn_rate(&self, num_ports: usize) -> u32 {
        ((10.0 * (num_ports.max(1) as f64).powf(0.6)).round() as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(GameSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = GameSettings::from_toml_str(
            r#"
            spawn_phase_turns = 0
            instant_build = true
            game_mode = "Team"
            "#,
        )
        .unwrap();
        assert_eq!(settings.spawn_phase_turns, 0);
        assert!(settings.instant_build);
        assert_eq!(settings.game_mode, GameMode::Team);
        assert_eq!(settings.silo_cooldown, 75);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = GameSettings::from_toml_str("sam_hitting_chance = 1.5").unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
        let err = GameSettings::from_toml_str("spawn_phase_turns = \"soon\"").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse(_)));
    }

    #[test]
    fn test_scaled_cost_caps() {
        let config = DefaultConfig::default();
        assert_eq!(config.unit_cost(UnitType::City, 0), 125_000);
        assert_eq!(config.unit_cost(UnitType::City, 2), 375_000);
        assert_eq!(config.unit_cost(UnitType::City, 50), 1_000_000);
    }

    #[test]
    fn test_infinite_gold_makes_everything_free() {
        let config = DefaultConfig::new(GameSettings {
            infinite_gold: true,
            ..Default::default()
        });
        assert_eq!(config.unit_cost(UnitType::Mirv, 0), 0);
    }

    #[test]
    fn test_instant_build_drops_construction() {
        let config = DefaultConfig::new(GameSettings {
            instant_build: true,
            ..Default::default()
        });
        assert_eq!(config.unit_info(UnitType::MissileSilo).construction_duration, None);
        let config = DefaultConfig::default();
        assert_eq!(config.unit_info(UnitType::MissileSilo).construction_duration, Some(100));
    }

    #[test]
    fn test_trade_gold_grows_with_distance() {
        let config = DefaultConfig::default();
        assert_eq!(config.trade_ship_gold(0), 10_000);
        assert!(config.trade_ship_gold(100) > config.trade_ship_gold(10));
    }

    #[test]
    fn test_death_factor_handles_zero_tiles() {
        let config = DefaultConfig::default();
        assert!((config.nuke_death_factor(100.0, 0) - 500.0).abs() < 1e-9);
        assert!((config.nuke_death_factor(100.0, 10) - 50.0).abs() < 1e-9);
    }
}
