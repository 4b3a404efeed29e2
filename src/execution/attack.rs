//! Attack execution - tile-by-tile territory capture
//!
//! An attack keeps a frontier of target-owned tiles next to the attacker.
//! Each tick it spends a tile budget picking frontier tiles by weighted
//! roulette: tiles surrounded by more attacker land and easier terrain go
//! first, which keeps the front line smooth.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::random::PseudoRandom;
use crate::core::types::{AttackId, MessageSeverity, Owner, PlayerId, PlayerType, Tick, TileRef};
use crate::execution::Executable;
use crate::game::{Attack, Game, TroopLedger};
use crate::map::TerrainType;

/// Percent of troops lost when retreating from a player
const RETREAT_MALUS_PERCENT: f64 = 25.0;
/// Relation hit the target takes toward its attacker
const ATTACK_RELATION_PENALTY: f64 = -80.0;
/// Frontier tiles with at least this many attacker neighbors are taken first
const PRIORITY_NEIGHBORS: usize = 3;

#[derive(Debug, Clone, Copy)]
struct TileWeight {
    weight: f64,
    attacker_neighbors: usize,
}

#[derive(Debug)]
pub struct AttackExecution {
    attacker: PlayerId,
    target: Owner,
    start_troops: Option<f64>,
    source_tile: Option<TileRef>,
    remove_troops: bool,
    attack: Option<AttackId>,
    active: bool,
    break_alliance: bool,
    random: PseudoRandom,
    to_conquer: Vec<TileRef>,
    border: BTreeSet<TileRef>,
    tile_weights: BTreeMap<TileRef, TileWeight>,
    /// Troops not handed to an attack record, plus the record's ledger once settled
    ledger: TroopLedger,
}

impl AttackExecution {
    /// `troops: None` lets the config decide how many troops to commit
    pub fn new(attacker: PlayerId, target: Owner, troops: Option<f64>) -> Self {
        Self {
            attacker,
            target,
            start_troops: troops,
            source_tile: None,
            remove_troops: true,
            attack: None,
            active: true,
            break_alliance: false,
            random: PseudoRandom::new(0),
            to_conquer: Vec::new(),
            border: BTreeSet::new(),
            tile_weights: BTreeMap::new(),
            ledger: TroopLedger::default(),
        }
    }

    /// Expand only from the neighbors of `tile` (a boat landing)
    pub fn with_source_tile(mut self, tile: TileRef) -> Self {
        self.source_tile = Some(tile);
        self
    }

    /// The troops were already taken from the attacker elsewhere
    pub fn without_troop_removal(mut self) -> Self {
        self.remove_troops = false;
        self
    }

    pub fn attack_id(&self) -> Option<AttackId> {
        self.attack
    }

    /// Frontier candidates in selection order
    pub fn to_conquer(&self) -> &[TileRef] {
        &self.to_conquer
    }

    /// Complete once the execution is inactive
    pub fn ledger(&self) -> TroopLedger {
        self.ledger
    }

    /// Troops this execution committed and kept on its own front
    pub fn troops_debited(&self) -> f64 {
        self.ledger.debited
    }

    /// Troops lost in combat, during retreat, to netting or dropped when the attack fizzled
    pub fn attacker_losses(&self) -> f64 {
        self.ledger.losses
    }

    /// Troops returned to the attacker
    pub fn refunded(&self) -> f64 {
        self.ledger.refunded
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    /// Fold in the ledger of our deleted attack and stop
    fn collect(&mut self, game: &mut Game, id: AttackId) {
        if let Some(settled) = game.take_settled_ledger(id) {
            self.ledger += settled;
        }
        self.deactivate();
    }

    fn settle(&mut self, game: &mut Game, id: AttackId) {
        game.delete_attack(id);
        self.collect(game, id);
    }

    fn reject(&mut self, reason: &str) {
        tracing::warn!(attacker = ?self.attacker, target = ?self.target, reason, "attack rejected");
        self.deactivate();
    }

    fn borders_attacker(&self, game: &Game, tile: TileRef) -> bool {
        let map = game.map();
        map.neighbors(tile)
            .any(|n| map.owner(n) == Owner::Player(self.attacker))
    }

    fn is_candidate(&self, game: &Game, tile: TileRef) -> bool {
        game.map().owner(tile) == self.target && self.borders_attacker(game, tile)
    }

    fn update_tile_weight(&mut self, game: &Game, tile: TileRef) {
        let map = game.map();
        let attacker_neighbors = map
            .neighbors(tile)
            .filter(|&n| map.owner(n) == Owner::Player(self.attacker))
            .count();
        let mut weight = match map.terrain(tile) {
            TerrainType::Plains => 3.0,
            TerrainType::Highland => 0.5,
            TerrainType::Mountain => 0.25,
            TerrainType::Lake | TerrainType::Ocean => 1.0,
        };
        if attacker_neighbors == 2 {
            weight *= 8.0;
        }
        self.tile_weights.insert(
            tile,
            TileWeight {
                weight,
                attacker_neighbors,
            },
        );
    }

    /// Queue the target-owned land around `tile`
    fn add_neighbors(&mut self, game: &Game, tile: TileRef) {
        let map = game.map();
        for neighbor in map.neighbors(tile) {
            if map.is_water(neighbor) || map.owner(neighbor) != self.target {
                continue;
            }
            if self.border.insert(neighbor) {
                self.to_conquer.push(neighbor);
            }
            self.update_tile_weight(game, neighbor);
        }
    }

    fn refresh_to_conquer(&mut self, game: &Game) {
        self.to_conquer.clear();
        self.border.clear();
        let border: Vec<TileRef> = game
            .player(self.attacker)
            .map(|p| p.border_tiles().iter().copied().collect())
            .unwrap_or_default();
        for tile in border {
            self.add_neighbors(game, tile);
        }
    }

    fn remove_candidate(&mut self, tile: TileRef) {
        if let Some(idx) = self.to_conquer.iter().position(|&t| t == tile) {
            self.to_conquer.swap_remove(idx);
        }
        self.border.remove(&tile);
    }

    /// Weighted roulette over the current front line
    fn select_tile(&mut self, game: &Game) -> Option<TileRef> {
        let mut priority = Vec::new();
        let mut fallback = Vec::new();
        for &tile in &self.to_conquer {
            if !self.is_candidate(game, tile) {
                continue;
            }
            let Some(meta) = self.tile_weights.get(&tile) else {
                continue;
            };
            if meta.attacker_neighbors >= PRIORITY_NEIGHBORS {
                priority.push((tile, meta.weight));
            } else {
                fallback.push((tile, meta.weight));
            }
        }
        let candidates = if priority.is_empty() { fallback } else { priority };
        if candidates.is_empty() {
            return None;
        }

        let mut cumulative = Vec::with_capacity(candidates.len());
        let mut total = 0.0;
        for &(_, weight) in &candidates {
            total += weight;
            cumulative.push(total);
        }
        if total <= 0.0 {
            return None;
        }

        let r = self.random.next_int(0, 10_000) as f64 / 10_000.0 * total;
        let idx = cumulative
            .partition_point(|&c| c <= r)
            .min(candidates.len() - 1);
        Some(candidates[idx].0)
    }

    /// Give the remaining troops back, minus `malus_percent`
    fn retreat(&mut self, game: &mut Game, malus_percent: f64) {
        let Some(id) = self.attack else {
            self.deactivate();
            return;
        };
        let troops = game.attack(id).map(Attack::troops).unwrap_or(0.0);
        let survivors = game
            .attack_mut(id)
            .map(|a| a.withdraw(malus_percent))
            .unwrap_or(0.0);
        let deaths = troops - survivors;
        if deaths > 0.0 {
            game.display_message(
                format!(
                    "Attack cancelled, {:.0} soldiers killed during retreat",
                    deaths
                ),
                MessageSeverity::Success,
                Some(self.attacker),
            );
        }
        if let Some(player) = game.player_mut(self.attacker) {
            player.add_troops(survivors);
        }
        game.stats_mut().attack_cancel(self.attacker, self.target, troops);
        tracing::debug!(?id, refunded = survivors, "attack retreated");
        self.settle(game, id);
    }

    /// A player shrunk below the threshold hands everything over at once
    fn handle_dead_defender(&mut self, game: &mut Game) {
        let Owner::Player(defender) = self.target else {
            return;
        };
        let threshold = game.settings().defeated_tile_threshold;
        let passes = game.settings().defeated_mop_up_passes;
        let Some((tiles_left, gold, name)) = game
            .player(defender)
            .map(|p| (p.num_tiles_owned(), p.gold(), p.name().to_string()))
        else {
            return;
        };
        if tiles_left == 0 || tiles_left >= threshold {
            return;
        }

        if gold > 0 {
            let taken = game
                .player_mut(defender)
                .map(|p| p.remove_gold(gold))
                .unwrap_or(0);
            if let Some(attacker) = game.player_mut(self.attacker) {
                attacker.add_gold(taken);
            }
            game.stats_mut().gold_war(self.attacker, taken);
            game.display_message(
                format!("Conquered {}, received {} gold", name, taken),
                MessageSeverity::Success,
                Some(self.attacker),
            );
        }

        for _ in 0..passes {
            let tiles: Vec<TileRef> = game
                .player(defender)
                .map(|p| p.tiles().iter().copied().collect())
                .unwrap_or_default();
            if tiles.is_empty() {
                break;
            }
            for tile in tiles {
                if self.borders_attacker(game, tile) {
                    game.conquer(self.attacker, tile);
                    continue;
                }
                let heir = game.map().neighbors(tile).find_map(|n| {
                    game.map()
                        .owner(n)
                        .player()
                        .filter(|&owner| owner != defender)
                });
                if let Some(heir) = heir {
                    game.conquer(heir, tile);
                }
            }
        }
        tracing::info!(?defender, attacker = ?self.attacker, "defender collapsed");
    }
}

impl Executable for AttackExecution {
    fn init(&mut self, game: &mut Game, tick: Tick) {
        if !self.active {
            return;
        }
        self.random = PseudoRandom::new(tick.wrapping_mul(7919) ^ u64::from(self.attacker.0));

        let Some(attacker_type) = game.player(self.attacker).map(|p| p.player_type()) else {
            self.reject("attacker not found");
            return;
        };
        if self.target == Owner::Player(self.attacker) {
            self.reject("cannot attack itself");
            return;
        }
        if let Owner::Player(target) = self.target {
            let Some(target_type) = game.player(target).map(|p| p.player_type()) else {
                self.reject("target not found");
                return;
            };
            if game.in_spawn_immunity() {
                self.reject("target is under spawn immunity");
                return;
            }
            if attacker_type != PlayerType::Bot && target_type != PlayerType::Bot {
                let now = game.ticks();
                if let Some(p) = game.player_mut(target) {
                    p.add_embargo(self.attacker, now, true);
                }
            }
        }

        let mut troops = match self.start_troops {
            Some(troops) => troops,
            None => game
                .player(self.attacker)
                .map(|p| game.config().attack_amount(p))
                .unwrap_or(0.0),
        };
        if self.remove_troops {
            troops = game
                .player_mut(self.attacker)
                .map(|p| p.remove_troops(troops))
                .unwrap_or(0.0);
        }
        troops = troops.max(0.0);
        self.ledger = TroopLedger::debit(troops);

        // Net against an attack coming the other way
        if let Owner::Player(target) = self.target {
            let incoming: Vec<AttackId> = game
                .incoming_attacks(self.attacker)
                .into_iter()
                .filter(|&id| {
                    game.attack(id).is_some_and(|a| {
                        a.attacker() == target && a.source_tile() == self.source_tile
                    })
                })
                .collect();
            for id in incoming {
                let Some(theirs) = game.attack(id).map(Attack::troops) else {
                    continue;
                };
                if theirs > troops {
                    if let Some(attack) = game.attack_mut(id) {
                        attack.lose_troops(troops);
                    }
                    self.ledger.losses += troops;
                    tracing::debug!(attacker = ?self.attacker, "attack absorbed by opposing attack");
                    self.deactivate();
                    return;
                }
                if let Some(attack) = game.attack_mut(id) {
                    attack.lose_troops(theirs);
                }
                troops -= theirs;
                self.ledger.losses += theirs;
                game.delete_attack(id);
            }
        }

        // Merge into an existing attack on the same front
        let duplicate = game.outgoing_attacks(self.attacker).into_iter().find(|&id| {
            game.attack(id).is_some_and(|a| {
                a.target() == self.target && a.source_tile() == self.source_tile
            })
        });
        if let Some(id) = duplicate {
            if let Some(attack) = game.attack_mut(id) {
                attack.reinforce(troops);
            }
            self.ledger.debited -= troops;
            self.deactivate();
            return;
        }

        let id = game.create_attack(self.attacker, self.target, troops, self.source_tile);
        self.ledger.debited -= troops;
        self.attack = Some(id);
        game.stats_mut().attack(self.attacker, self.target, troops);
        tracing::debug!(?id, attacker = ?self.attacker, target = ?self.target, troops, "attack started");

        match self.source_tile {
            Some(tile) => self.add_neighbors(game, tile),
            None => self.refresh_to_conquer(game),
        }

        if let Owner::Player(target) = self.target {
            if game.is_allied(self.attacker, target) {
                self.break_alliance = true;
            }
            if let Some(p) = game.player_mut(target) {
                p.update_relation(self.attacker, ATTACK_RELATION_PENALTY);
            }
        }
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let Some(id) = self.attack else {
            self.deactivate();
            return;
        };
        let Some((retreated, retreating)) = game
            .attack(id)
            .map(|a| (a.retreated(), a.is_retreating()))
        else {
            self.collect(game, id);
            return;
        };

        if retreated {
            let malus = if self.target.is_player() {
                RETREAT_MALUS_PERCENT
            } else {
                0.0
            };
            self.retreat(game, malus);
            return;
        }
        if retreating {
            return;
        }

        if let Owner::Player(target) = self.target {
            if self.break_alliance {
                self.break_alliance = false;
                if game.is_allied(self.attacker, target) {
                    game.break_alliance(self.attacker, target);
                }
            }
            if game.is_allied(self.attacker, target) {
                self.retreat(game, 0.0);
                return;
            }
        }

        let jitter = self.random.next_int(0, 5) as f64;
        let mut budget = {
            let Some(attacker) = game.player(self.attacker) else {
                self.deactivate();
                return;
            };
            let defender = self.target.player().and_then(|t| game.player(t));
            let troops = game.attack(id).map(Attack::troops).unwrap_or(0.0);
            game.config().attack_tiles_per_tick(
                troops,
                attacker,
                defender,
                self.border.len() as f64 + jitter,
            )
        };

        while budget > 0.0 {
            let Some(troops) = game.attack(id).map(Attack::troops) else {
                self.collect(game, id);
                return;
            };
            if troops < 1.0 {
                if let Some(attack) = game.attack_mut(id) {
                    attack.lose_troops(troops);
                }
                tracing::debug!(?id, "attack ran out of troops");
                self.settle(game, id);
                return;
            }
            if self.to_conquer.is_empty() {
                self.retreat(game, 0.0);
                return;
            }
            let Some(tile) = self.select_tile(game) else {
                self.retreat(game, 0.0);
                return;
            };
            self.remove_candidate(tile);
            if !self.is_candidate(game, tile) {
                continue;
            }

            let outcome = {
                let Some(attacker) = game.player(self.attacker) else {
                    self.deactivate();
                    return;
                };
                let defender = self.target.player().and_then(|t| game.player(t));
                game.config()
                    .attack_logic(game, troops, attacker, defender, tile)
            };

            budget -= outcome.tiles_per_tick_used;
            if let Some(attack) = game.attack_mut(id) {
                attack.lose_troops(outcome.attacker_troop_loss);
            }
            if let Some(defender) = self.target.player().and_then(|t| game.player_mut(t)) {
                defender.remove_troops(outcome.defender_troop_loss);
            }
            game.conquer(self.attacker, tile);

            self.add_neighbors(game, tile);
            let neighbors: Vec<TileRef> = game.map().neighbors(tile).collect();
            for neighbor in neighbors {
                if self.border.contains(&neighbor) {
                    self.update_tile_weight(game, neighbor);
                }
            }

            self.handle_dead_defender(game);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
