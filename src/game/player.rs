//! Player state: resources, territory and diplomatic standing

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::types::{Gold, PlayerId, PlayerType, Team, Tick, TileRef};

pub const STARTING_TROOPS: f64 = 2_500.0;
pub const STARTING_WORKERS: f64 = 7_500.0;
pub const DEFAULT_TARGET_TROOP_RATIO: f64 = 0.95;

/// How one player feels about another, bucketed from the relation score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relation {
    Hostile = 0,
    Distrustful = 1,
    Neutral = 2,
    Friendly = 3,
}

impl Relation {
    pub fn from_score(score: f64) -> Self {
        if score < -50.0 {
            Relation::Hostile
        } else if score < 0.0 {
            Relation::Distrustful
        } else if score < 50.0 {
            Relation::Neutral
        } else {
            Relation::Friendly
        }
    }
}

/// Lobby data used to create a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub player_type: PlayerType,
    pub team: Option<Team>,
}

impl PlayerInfo {
    pub fn new(name: impl Into<String>, player_type: PlayerType) -> Self {
        Self {
            name: name.into(),
            player_type,
            team: None,
        }
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Embargo {
    pub created_at: Tick,
    /// Placed automatically by an attack and lifted after a while
    pub temporary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTarget {
    pub target: PlayerId,
    pub tick: Tick,
}

#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    player_type: PlayerType,
    team: Option<Team>,
    gold: Gold,
    troops: f64,
    workers: f64,
    target_troop_ratio: f64,
    pub(crate) tiles: BTreeSet<TileRef>,
    pub(crate) border_tiles: BTreeSet<TileRef>,
    relations: BTreeMap<PlayerId, f64>,
    embargoes: BTreeMap<PlayerId, Embargo>,
    targets: Vec<PlayerTarget>,
    traitor_since: Option<Tick>,
    disconnected: bool,
    has_spawned: bool,
    pub(crate) last_tile_change: Tick,
}

impl Player {
    pub fn new(id: PlayerId, info: PlayerInfo) -> Self {
        Self {
            id,
            name: info.name,
            player_type: info.player_type,
            team: info.team,
            gold: 0,
            troops: STARTING_TROOPS,
            workers: STARTING_WORKERS,
            target_troop_ratio: DEFAULT_TARGET_TROOP_RATIO,
            tiles: BTreeSet::new(),
            border_tiles: BTreeSet::new(),
            relations: BTreeMap::new(),
            embargoes: BTreeMap::new(),
            targets: Vec::new(),
            traitor_since: None,
            disconnected: false,
            has_spawned: false,
            last_tile_change: 0,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    pub fn team(&self) -> Option<Team> {
        self.team
    }

    pub fn is_alive(&self) -> bool {
        !self.tiles.is_empty()
    }

    pub fn has_spawned(&self) -> bool {
        self.has_spawned
    }

    pub(crate) fn mark_spawned(&mut self) {
        self.has_spawned = true;
    }

    // === RESOURCES ===

    pub fn gold(&self) -> Gold {
        self.gold
    }

    pub fn add_gold(&mut self, amount: Gold) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Remove up to `amount`, returning what was actually taken
    pub fn remove_gold(&mut self, amount: Gold) -> Gold {
        let taken = amount.min(self.gold);
        self.gold -= taken;
        taken
    }

    pub fn troops(&self) -> f64 {
        self.troops
    }

    pub fn workers(&self) -> f64 {
        self.workers
    }

    pub fn population(&self) -> f64 {
        self.troops + self.workers
    }

    pub fn add_troops(&mut self, amount: f64) {
        if amount < 0.0 {
            self.remove_troops(-amount);
        } else {
            self.troops += amount;
        }
    }

    /// Remove up to `amount` troops, returning what was actually taken
    pub fn remove_troops(&mut self, amount: f64) -> f64 {
        let taken = amount.max(0.0).min(self.troops);
        self.troops -= taken;
        taken
    }

    pub fn add_workers(&mut self, amount: f64) {
        if amount < 0.0 {
            self.remove_workers(-amount);
        } else {
            self.workers += amount;
        }
    }

    pub fn remove_workers(&mut self, amount: f64) -> f64 {
        let taken = amount.max(0.0).min(self.workers);
        self.workers -= taken;
        taken
    }

    pub fn target_troop_ratio(&self) -> f64 {
        self.target_troop_ratio
    }

    pub fn set_target_troop_ratio(&mut self, ratio: f64) {
        self.target_troop_ratio = ratio.clamp(0.0, 1.0);
    }

    // === TERRITORY ===

    pub fn tiles(&self) -> &BTreeSet<TileRef> {
        &self.tiles
    }

    pub fn border_tiles(&self) -> &BTreeSet<TileRef> {
        &self.border_tiles
    }

    pub fn num_tiles_owned(&self) -> usize {
        self.tiles.len()
    }

    pub fn last_tile_change(&self) -> Tick {
        self.last_tile_change
    }

    // === DIPLOMACY ===

    pub fn relation_score(&self, other: PlayerId) -> f64 {
        self.relations.get(&other).copied().unwrap_or(0.0)
    }

    pub fn relation(&self, other: PlayerId) -> Relation {
        Relation::from_score(self.relation_score(other))
    }

    pub fn update_relation(&mut self, other: PlayerId, delta: f64) {
        let score = (self.relation_score(other) + delta).clamp(-100.0, 100.0);
        self.relations.insert(other, score);
    }

    /// Drift every relation toward neutral
    pub fn decay_relations(&mut self, rate: f64) {
        for score in self.relations.values_mut() {
            if *score > 0.0 {
                *score = (*score - rate).max(0.0);
            } else if *score < 0.0 {
                *score = (*score + rate).min(0.0);
            }
        }
    }

    pub fn has_embargo_against(&self, other: PlayerId) -> bool {
        self.embargoes.contains_key(&other)
    }

    pub fn embargoes(&self) -> &BTreeMap<PlayerId, Embargo> {
        &self.embargoes
    }

    pub fn add_embargo(&mut self, other: PlayerId, now: Tick, temporary: bool) {
        // A permanent embargo is never downgraded to a temporary one
        if temporary && self.embargoes.get(&other).is_some_and(|e| !e.temporary) {
            return;
        }
        self.embargoes.insert(
            other,
            Embargo {
                created_at: now,
                temporary,
            },
        );
    }

    pub fn stop_embargo(&mut self, other: PlayerId) {
        self.embargoes.remove(&other);
    }

    /// Lift temporary embargoes older than `duration`
    pub fn expire_embargoes(&mut self, now: Tick, duration: Tick) {
        self.embargoes
            .retain(|_, e| !e.temporary || now.saturating_sub(e.created_at) <= duration);
    }

    pub fn add_target(&mut self, target: PlayerId, now: Tick) {
        self.targets.retain(|t| t.target != target);
        self.targets.push(PlayerTarget { target, tick: now });
    }

    /// Players targeted within the last `duration` ticks
    pub fn targets(&self, now: Tick, duration: Tick) -> Vec<PlayerId> {
        self.targets
            .iter()
            .filter(|t| now.saturating_sub(t.tick) < duration)
            .map(|t| t.target)
            .collect()
    }

    pub fn is_traitor(&self, now: Tick, duration: Tick) -> bool {
        self.traitor_since
            .is_some_and(|since| now.saturating_sub(since) < duration)
    }

    pub(crate) fn mark_traitor(&mut self, now: Tick) {
        self.traitor_since = Some(now);
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    pub fn set_disconnected(&mut self, disconnected: bool) {
        self.disconnected = disconnected;
    }
}
