//! Surface-to-air defense
//!
//! A launcher watches for enemy bombs. MIRV warheads aimed close to the
//! launcher are swatted as a group on a hit; a single atom or hydrogen
//! bomb gets a missile that flies to it and destroys it on contact.

use crate::core::random::PseudoRandom;
use crate::core::types::{MessageSeverity, PlayerId, Tick, TileRef, UnitId};
use crate::execution::Executable;
use crate::game::{Game, UnitKind, UnitType};
use crate::pathfinding::{AirPathFinder, PathStep};

const SEARCH_RADIUS: u32 = 80;
/// Warheads fly fast, so they are tracked from far away
const WARHEAD_SEARCH_RADIUS: u32 = 400;
/// Only warheads aimed this close to the launcher are engaged
const WARHEAD_PROTECTION_RADIUS: u32 = 50;
const MISSILE_SPEED: u32 = 12;

#[derive(Debug)]
pub struct SamLauncherExecution {
    sam: UnitId,
    random: Option<PseudoRandom>,
    active: bool,
}

impl SamLauncherExecution {
    pub fn new(sam: UnitId) -> Self {
        Self {
            sam,
            random: None,
            active: true,
        }
    }

    fn is_enemy(game: &Game, owner: PlayerId, other: PlayerId) -> bool {
        owner != other && !game.is_friendly(owner, other)
    }

    fn warhead_targets(game: &Game, owner: PlayerId, tile: TileRef) -> Vec<UnitId> {
        game.nearby_units(tile, WARHEAD_SEARCH_RADIUS, &[UnitType::MirvWarhead])
            .into_iter()
            .filter_map(|(id, _)| game.unit(id))
            .filter(|u| Self::is_enemy(game, owner, u.owner()))
            .filter(|u| {
                u.detonation_dst()
                    .is_some_and(|dst| game.map().manhattan_dist(dst, tile) < WARHEAD_PROTECTION_RADIUS)
            })
            .map(|u| u.id())
            .collect()
    }

    /// Hydrogen bombs first, then the closest
    fn single_target(game: &Game, owner: PlayerId, tile: TileRef) -> Option<UnitId> {
        game.nearby_units(tile, SEARCH_RADIUS, &[UnitType::AtomBomb, UnitType::HydrogenBomb])
            .into_iter()
            .filter_map(|(id, dist)| game.unit(id).map(|u| (u, dist)))
            .filter(|(u, _)| Self::is_enemy(game, owner, u.owner()))
            .min_by_key(|(u, dist)| (u.unit_type() != UnitType::HydrogenBomb, *dist, u.id()))
            .map(|(u, _)| u.id())
    }

    fn is_hit(game: &Game, unit_type: UnitType, roll: f64) -> bool {
        match unit_type {
            UnitType::AtomBomb => true,
            UnitType::MirvWarhead => roll < game.settings().sam_warhead_hitting_chance,
            _ => roll < game.settings().sam_hitting_chance,
        }
    }
}

impl Executable for SamLauncherExecution {
    fn tick(&mut self, game: &mut Game, tick: Tick) {
        let Some((owner, tile)) = game.unit(self.sam).map(|u| (u.owner(), u.tile())) else {
            self.active = false;
            return;
        };
        let warheads = Self::warhead_targets(game, owner, tile);
        let single = if warheads.is_empty() {
            Self::single_target(game, owner, tile)
        } else {
            None
        };

        let cooldown = game.config().sam_cooldown();
        if let Some(sam) = game.unit_mut(self.sam) {
            if sam.is_cooldown() && sam.ticks_left_in_cooldown(cooldown, tick) == 0 {
                sam.clear_cooldown();
            }
        }

        let single = single.filter(|&id| game.unit(id).is_some_and(|u| !u.targeted_by_sam()));
        let cooling = game.unit(self.sam).is_some_and(|u| u.is_cooldown());
        if cooling || (warheads.is_empty() && single.is_none()) {
            return;
        }

        if let Some(sam) = game.unit_mut(self.sam) {
            sam.start_cooldown(tick);
        }
        let target_type = match single.and_then(|id| game.unit(id)) {
            Some(unit) if warheads.is_empty() => unit.unit_type(),
            _ => UnitType::MirvWarhead,
        };
        let sam_id = self.sam;
        let roll = self
            .random
            .get_or_insert_with(|| PseudoRandom::new(u64::from(sam_id.0)))
            .next_f64();
        if !Self::is_hit(game, target_type, roll) {
            game.display_message(
                format!("Missile failed to intercept {:?}", target_type),
                MessageSeverity::Error,
                Some(owner),
            );
            return;
        }

        if !warheads.is_empty() {
            game.display_message(
                format!("{} MIRV warheads intercepted", warheads.len()),
                MessageSeverity::Success,
                Some(owner),
            );
            game.stats_mut()
                .bomb_intercept(owner, UnitType::MirvWarhead, warheads.len() as u64);
            for id in warheads {
                game.destroy_unit(id, Some(owner));
            }
            return;
        }

        if let Some(target) = single {
            if let Some(unit) = game.unit_mut(target) {
                unit.set_targeted_by_sam(true);
            }
            game.add_execution(SamMissileExecution::new(self.sam, owner, tile, target));
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug)]
pub struct SamMissileExecution {
    launcher: UnitId,
    owner: PlayerId,
    spawn: TileRef,
    target: UnitId,
    missile: Option<UnitId>,
    speed: u32,
    path: AirPathFinder,
    active: bool,
}

impl SamMissileExecution {
    pub fn new(launcher: UnitId, owner: PlayerId, spawn: TileRef, target: UnitId) -> Self {
        Self {
            launcher,
            owner,
            spawn,
            target,
            missile: None,
            speed: MISSILE_SPEED,
            path: AirPathFinder::new(0),
            active: true,
        }
    }

    fn finish(&mut self, game: &mut Game, missile: UnitId) {
        game.remove_unit(missile);
        self.active = false;
    }
}

impl Executable for SamMissileExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        self.path = AirPathFinder::new(game.ticks());
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let missile = *self
            .missile
            .get_or_insert_with(|| game.build_unit(self.owner, self.spawn, UnitKind::SamMissile));
        let Some(mut tile) = game.unit(missile).map(|u| u.tile()) else {
            self.active = false;
            return;
        };

        // warheads are never chased
        let target = game
            .unit(self.target)
            .filter(|u| matches!(u.unit_type(), UnitType::AtomBomb | UnitType::HydrogenBomb))
            .filter(|u| u.owner() != self.owner)
            .map(|u| (u.tile(), u.unit_type()));
        let Some((target_tile, target_type)) = target else {
            self.finish(game, missile);
            return;
        };
        if !game.is_unit_active(self.launcher) {
            self.finish(game, missile);
            return;
        }

        for _ in 0..self.speed {
            match self.path.next_tile(game.map(), tile, target_tile) {
                PathStep::NextTile(next) => {
                    game.move_unit(missile, next);
                    tile = next;
                }
                PathStep::Completed(_) | PathStep::Pending | PathStep::PathNotFound => {
                    game.display_message(
                        format!("Missile intercepted {:?}", target_type),
                        MessageSeverity::Success,
                        Some(self.owner),
                    );
                    game.stats_mut().bomb_intercept(self.owner, target_type, 1);
                    game.destroy_unit(self.target, Some(self.owner));
                    self.finish(game, missile);
                    return;
                }
            }
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
    use crate::execution::Execution;
    use crate::game::test_support::*;
    use crate::map::{GameMap, TerrainType};

    fn sam_game(settings: GameSettings) -> (Game, PlayerId, PlayerId, UnitId) {
        let mut game = Game::with_settings(GameMap::filled(200, 200, TerrainType::Plains), settings);
        let a = add_human(&mut game, "a");
        let b = add_human(&mut game, "b");
        claim_rect(&mut game, a, 90, 90, 110, 110);
        claim_rect(&mut game, b, 0, 0, 5, 5);
        let sam = game.build_unit(
            a,
            game.map().ref_at(100, 100),
            UnitKind::SamLauncher { cooldown_start: None },
        );
        (game, a, b, sam)
    }

    #[test]
    fn test_missile_downs_atom_bomb() {
        let (mut game, a, b, sam) = sam_game(open_settings());
        let dst = game.map().ref_at(100, 100);
        let bomb = game.build_unit(b, game.map().ref_at(100, 60), UnitKind::AtomBomb { destination: dst });

        let mut launcher = SamLauncherExecution::new(sam);
        launcher.tick(&mut game, 0);
        assert!(game.unit(sam).unwrap().is_cooldown());
        assert!(game.unit(bomb).unwrap().targeted_by_sam());

        let mut pending = game.take_pending();
        assert_eq!(pending.len(), 1);
        let Some(Execution::SamMissile(mut missile)) = pending.pop() else {
            panic!("expected a SAM missile");
        };
        missile.init(&mut game, 0);
        for tick in 0..10 {
            if !missile.is_active() {
                break;
            }
            missile.tick(&mut game, tick);
        }
        assert!(!missile.is_active());
        assert!(!game.is_unit_active(bomb));
        assert_eq!(game.unit_count(a, UnitType::SamMissile), 0);
        assert_eq!(game.stats().player(a).unwrap().bombs[&UnitType::AtomBomb][2], 1);

        // a second bomb has to wait for the cooldown
        let second = game.build_unit(b, game.map().ref_at(100, 60), UnitKind::AtomBomb { destination: dst });
        launcher.tick(&mut game, 1);
        assert!(!game.unit(second).unwrap().targeted_by_sam());
        launcher.tick(&mut game, 75);
        assert!(game.unit(second).unwrap().targeted_by_sam());
    }

    #[test]
    fn test_friendly_bombs_are_ignored() {
        let (mut game, a, b, sam) = sam_game(open_settings());
        game.create_alliance(a, b);
        let dst = game.map().ref_at(100, 100);
        game.build_unit(b, game.map().ref_at(100, 60), UnitKind::AtomBomb { destination: dst });
        SamLauncherExecution::new(sam).tick(&mut game, 0);
        assert!(!game.unit(sam).unwrap().is_cooldown());
    }

    #[test]
    fn test_warheads_intercepted_as_group() {
        let settings = GameSettings {
            sam_warhead_hitting_chance: 1.0,
            ..open_settings()
        };
        let (mut game, a, b, sam) = sam_game(settings);
        let near = game.map().ref_at(110, 100);
        let far = game.map().ref_at(190, 190);
        let w1 = game.build_unit(b, game.map().ref_at(100, 20), UnitKind::MirvWarhead { destination: near });
        let w2 = game.build_unit(b, game.map().ref_at(120, 20), UnitKind::MirvWarhead { destination: near });
        let w3 = game.build_unit(b, game.map().ref_at(100, 20), UnitKind::MirvWarhead { destination: far });
        SamLauncherExecution::new(sam).tick(&mut game, 0);
        assert!(!game.is_unit_active(w1));
        assert!(!game.is_unit_active(w2));
        assert!(game.is_unit_active(w3));
        assert_eq!(game.stats().player(a).unwrap().bombs[&UnitType::MirvWarhead][2], 2);
    }

    #[test]
    fn test_hydrogen_bomb_preferred() {
        let settings = GameSettings {
            sam_hitting_chance: 1.0,
            ..open_settings()
        };
        let (mut game, _a, b, sam) = sam_game(settings);
        let dst = game.map().ref_at(100, 100);
        let atom = game.build_unit(b, game.map().ref_at(100, 95), UnitKind::AtomBomb { destination: dst });
        let hydrogen = game.build_unit(b, game.map().ref_at(100, 50), UnitKind::HydrogenBomb { destination: dst });
        SamLauncherExecution::new(sam).tick(&mut game, 0);
        assert!(game.unit(hydrogen).unwrap().targeted_by_sam());
        assert!(!game.unit(atom).unwrap().targeted_by_sam());
    }
}
