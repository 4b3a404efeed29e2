//! Game - the shared state every execution reads and mutates
//!
//! The map owns tile state, the game owns players, units, attacks and
//! alliances. Everything outside refers to them by id.

pub mod attack;
pub mod diplomacy;
pub mod player;
pub mod snapshot;
pub mod stats;
pub mod unit;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::config::{Config, DefaultConfig, GameMode, GameSettings};
use crate::core::error::{Result, SimError};
use crate::core::types::{
    AllianceId, AttackId, Gold, MessageSeverity, Owner, PlayerId, Team, Tick, TileRef, UnitId,
};
use crate::execution::Execution;
use crate::map::GameMap;

pub use attack::{Attack, TroopLedger};
pub use diplomacy::{Alliance, AllianceRequest};
pub use player::{Embargo, Player, PlayerInfo, Relation};
pub use snapshot::GameSnapshot;
pub use stats::{PlayerStats, Stats};
pub use unit::{Unit, UnitKind, UnitType};

/// Largest distance at which a port can be placed from the requested tile
const PORT_PLACEMENT_RANGE: u32 = 20;

/// Message queued for display to one player or everyone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub text: String,
    pub severity: MessageSeverity,
    pub player: Option<PlayerId>,
    pub tick: Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player(PlayerId),
    Team(Team),
}

pub struct Game {
    map: GameMap,
    mini_map: GameMap,
    config: Box<dyn Config>,
    players: Vec<Player>,
    units: BTreeMap<UnitId, Unit>,
    attacks: BTreeMap<AttackId, Attack>,
    /// Ledgers of deleted attacks, held until their execution collects them
    settled_ledgers: BTreeMap<AttackId, TroopLedger>,
    alliances: BTreeMap<AllianceId, Alliance>,
    alliance_requests: Vec<AllianceRequest>,
    stats: Stats,
    messages: Vec<DisplayMessage>,
    pending: Vec<Execution>,
    ticks: Tick,
    next_unit_id: u32,
    next_attack_id: u32,
    next_alliance_id: u32,
    winner: Option<Winner>,
}

impl Game {
    pub fn new(map: GameMap, config: Box<dyn Config>) -> Self {
        let mini_map = map.to_mini();
        Self {
            map,
            mini_map,
            config,
            players: Vec::new(),
            units: BTreeMap::new(),
            attacks: BTreeMap::new(),
            settled_ledgers: BTreeMap::new(),
            alliances: BTreeMap::new(),
            alliance_requests: Vec::new(),
            stats: Stats::default(),
            messages: Vec::new(),
            pending: Vec::new(),
            ticks: 0,
            next_unit_id: 1,
            next_attack_id: 1,
            next_alliance_id: 1,
            winner: None,
        }
    }

    pub fn with_settings(map: GameMap, settings: GameSettings) -> Self {
        Self::new(map, Box::new(DefaultConfig::new(settings)))
    }

    // === CONTEXT ===

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn mini_map(&self) -> &GameMap {
        &self.mini_map
    }

    pub fn config(&self) -> &dyn Config {
        self.config.as_ref()
    }

    pub fn settings(&self) -> &GameSettings {
        self.config.settings()
    }

    pub fn ticks(&self) -> Tick {
        self.ticks
    }

    pub(crate) fn end_tick(&mut self) {
        self.ticks += 1;
    }

    pub fn in_spawn_phase(&self) -> bool {
        self.ticks < self.config.spawn_phase_turns()
    }

    /// Players cannot be attacked until the spawn phase and immunity are over
    pub fn in_spawn_immunity(&self) -> bool {
        self.ticks < self.config.spawn_phase_turns() + self.config.spawn_immunity_duration()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn set_winner(&mut self, winner: Winner) {
        self.winner = Some(winner);
    }

    /// Queue an execution; the scheduler picks it up on its next pass
    pub fn add_execution(&mut self, execution: impl Into<Execution>) {
        self.pending.push(execution.into());
    }

    pub(crate) fn take_pending(&mut self) -> Vec<Execution> {
        std::mem::take(&mut self.pending)
    }

    pub fn display_message(
        &mut self,
        text: impl Into<String>,
        severity: MessageSeverity,
        player: Option<PlayerId>,
    ) {
        self.messages.push(DisplayMessage {
            text: text.into(),
            severity,
            player,
            tick: self.ticks,
        });
    }

    pub fn messages(&self) -> &[DisplayMessage] {
        &self.messages
    }

    pub fn drain_messages(&mut self) -> Vec<DisplayMessage> {
        std::mem::take(&mut self.messages)
    }

    // === PLAYERS ===

    pub fn add_player(&mut self, info: PlayerInfo) -> Result<PlayerId> {
        let next = self.players.len() + 1;
        let raw = u16::try_from(next).map_err(|_| SimError::TooManyPlayers(next))?;
        let id = PlayerId(raw);
        self.players.push(Player::new(id, info));
        Ok(id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index()).filter(|p| p.id() == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.index()).filter(|p| p.id() == id)
    }

    pub fn try_player(&self, id: PlayerId) -> Result<&Player> {
        self.player(id).ok_or(SimError::PlayerNotFound(id))
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(Player::id).collect()
    }

    /// Player owning `tile`, if any
    pub fn owner_player(&self, tile: TileRef) -> Option<&Player> {
        self.map.owner(tile).player().and_then(|id| self.player(id))
    }

    pub(crate) fn mark_spawned(&mut self, id: PlayerId) {
        if let Some(player) = self.player_mut(id) {
            player.mark_spawned();
        }
    }

    /// Move all gold from one player to another, returning the amount
    pub fn transfer_gold(&mut self, from: PlayerId, to: PlayerId) -> Gold {
        let Some(amount) = self.player_mut(from).map(|p| {
            let all = p.gold();
            p.remove_gold(all)
        }) else {
            return 0;
        };
        if let Some(recipient) = self.player_mut(to) {
            recipient.add_gold(amount);
        }
        amount
    }

    // === TERRITORY ===

    /// Give `tile` to `player`, updating both players' tile and border sets
    pub fn conquer(&mut self, player: PlayerId, tile: TileRef) {
        if !self.map.is_valid_ref(tile) || self.map.is_water(tile) {
            tracing::warn!(?tile, "cannot conquer water or out-of-bounds tile");
            return;
        }
        if self.player(player).is_none() {
            tracing::warn!(?player, "conquer by unknown player");
            return;
        }
        let previous = self.map.owner(tile);
        if previous == Owner::Player(player) {
            return;
        }
        self.detach_tile(previous, tile);
        self.map.set_owner(tile, Owner::Player(player));
        let now = self.ticks;
        if let Some(p) = self.player_mut(player) {
            p.tiles.insert(tile);
            p.last_tile_change = now;
        }
        self.refresh_borders_around(tile);
    }

    /// Return `tile` to terra nullius
    pub fn relinquish(&mut self, tile: TileRef) {
        if !self.map.is_valid_ref(tile) {
            return;
        }
        let previous = self.map.owner(tile);
        if previous == Owner::TerraNullius {
            return;
        }
        self.detach_tile(previous, tile);
        self.map.set_owner(tile, Owner::TerraNullius);
        self.refresh_borders_around(tile);
    }

    pub(crate) fn set_fallout(&mut self, tile: TileRef, value: bool) {
        if self.map.is_valid_ref(tile) {
            self.map.set_fallout(tile, value);
        }
    }

    fn detach_tile(&mut self, owner: Owner, tile: TileRef) {
        let now = self.ticks;
        if let Some(p) = owner.player().and_then(|id| self.player_mut(id)) {
            p.tiles.remove(&tile);
            p.border_tiles.remove(&tile);
            p.last_tile_change = now;
        }
    }

    fn refresh_borders_around(&mut self, tile: TileRef) {
        self.refresh_border(tile);
        for neighbor in self.map.neighbors(tile) {
            self.refresh_border(neighbor);
        }
    }

    fn refresh_border(&mut self, tile: TileRef) {
        let Owner::Player(id) = self.map.owner(tile) else {
            return;
        };
        let is_border = self.is_border(tile);
        if let Some(p) = self.player_mut(id) {
            if is_border {
                p.border_tiles.insert(tile);
            } else {
                p.border_tiles.remove(&tile);
            }
        }
    }

    /// Owned tile with at least one neighbor held by someone else
    pub fn is_border(&self, tile: TileRef) -> bool {
        let owner = self.map.owner(tile);
        owner.is_player() && self.map.neighbors(tile).any(|n| self.map.owner(n) != owner)
    }

    /// Owners (including terra nullius) touching the player's border
    pub fn neighbors_of(&self, id: PlayerId) -> BTreeSet<Owner> {
        let mut result = BTreeSet::new();
        let Some(player) = self.player(id) else {
            return result;
        };
        for &tile in player.border_tiles() {
            for n in self.map.neighbors(tile) {
                if self.map.is_water(n) {
                    continue;
                }
                let owner = self.map.owner(n);
                if owner != Owner::Player(id) {
                    result.insert(owner);
                }
            }
        }
        result
    }

    pub fn shares_border_with(&self, id: PlayerId, other: Owner) -> bool {
        self.neighbors_of(id).contains(&other)
    }

    /// Border tiles of `id` that touch territory of `other`
    pub fn shared_border_count(&self, id: PlayerId, other: PlayerId) -> usize {
        let Some(player) = self.player(id) else {
            return 0;
        };
        player
            .border_tiles()
            .iter()
            .filter(|&&t| {
                self.map
                    .neighbors(t)
                    .any(|n| self.map.owner(n) == Owner::Player(other))
            })
            .count()
    }

    // === ATTACKS ===

    pub fn create_attack(
        &mut self,
        attacker: PlayerId,
        target: Owner,
        troops: f64,
        source_tile: Option<TileRef>,
    ) -> AttackId {
        let id = AttackId(self.next_attack_id);
        self.next_attack_id += 1;
        self.attacks
            .insert(id, Attack::new(id, attacker, target, troops, source_tile));
        id
    }

    pub fn attack(&self, id: AttackId) -> Option<&Attack> {
        self.attacks.get(&id)
    }

    pub fn attack_mut(&mut self, id: AttackId) -> Option<&mut Attack> {
        self.attacks.get_mut(&id)
    }

    pub fn is_attack_active(&self, id: AttackId) -> bool {
        self.attacks.contains_key(&id)
    }

    pub fn delete_attack(&mut self, id: AttackId) {
        if let Some(attack) = self.attacks.remove(&id) {
            self.settled_ledgers.insert(id, attack.ledger());
        }
    }

    /// Ledger of a deleted attack; handed out once
    pub fn take_settled_ledger(&mut self, id: AttackId) -> Option<TroopLedger> {
        self.settled_ledgers.remove(&id)
    }

    pub fn outgoing_attacks(&self, id: PlayerId) -> Vec<AttackId> {
        self.attacks
            .values()
            .filter(|a| a.attacker() == id)
            .map(Attack::id)
            .collect()
    }

    pub fn incoming_attacks(&self, id: PlayerId) -> Vec<AttackId> {
        self.attacks
            .values()
            .filter(|a| a.target() == Owner::Player(id))
            .map(Attack::id)
            .collect()
    }

    pub fn order_retreat(&mut self, id: AttackId) {
        if let Some(attack) = self.attacks.get_mut(&id) {
            attack.order_retreat();
        }
    }

    pub fn execute_retreat(&mut self, id: AttackId) {
        if let Some(attack) = self.attacks.get_mut(&id) {
            attack.execute_retreat();
        }
    }

    // === UNITS ===

    /// Create a unit. Launching a bomb puts the silo it leaves from on cooldown.
    pub fn build_unit(&mut self, owner: PlayerId, tile: TileRef, kind: UnitKind) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        let unit_type = kind.unit_type();
        let max_health = self.config.unit_info(unit_type).max_health;
        if matches!(
            unit_type,
            UnitType::AtomBomb | UnitType::HydrogenBomb | UnitType::Mirv
        ) {
            let now = self.ticks;
            if let Some(silo) = self.units.values_mut().find(|u| {
                u.owner() == owner
                    && u.tile() == tile
                    && u.unit_type() == UnitType::MissileSilo
                    && !u.is_cooldown()
            }) {
                silo.start_cooldown(now);
            }
        }
        self.units
            .insert(id, Unit::new(id, owner, tile, kind, max_health, self.ticks));
        self.stats.unit_build(owner, unit_type);
        tracing::debug!(?id, ?unit_type, ?owner, "unit built");
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn is_unit_active(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn move_unit(&mut self, id: UnitId, tile: TileRef) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.move_to(tile);
        }
    }

    /// Remove a unit that has finished its job
    pub fn remove_unit(&mut self, id: UnitId) {
        self.units.remove(&id);
    }

    /// Remove a unit that was destroyed, notifying its owner
    pub fn destroy_unit(&mut self, id: UnitId, destroyer: Option<PlayerId>) {
        let Some(unit) = self.units.remove(&id) else {
            return;
        };
        let unit_type = unit.unit_type();
        self.stats.unit_lose(unit.owner(), unit_type);
        if let Some(destroyer) = destroyer {
            self.stats.unit_destroy(destroyer, unit_type);
        }
        if unit_type != UnitType::MirvWarhead {
            self.display_message(
                format!("Your {:?} was destroyed", unit_type),
                MessageSeverity::Error,
                Some(unit.owner()),
            );
        }
    }

    /// Hand a unit to a new owner without recreating it
    pub fn capture_unit(&mut self, id: UnitId, new_owner: PlayerId) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        let previous = unit.owner();
        if previous == new_owner {
            return;
        }
        unit.set_owner(new_owner);
        let unit_type = unit.unit_type();
        self.stats.unit_capture(new_owner, unit_type);
        self.stats.unit_lose(previous, unit_type);
        self.display_message(
            format!("Your {:?} was captured", unit_type),
            MessageSeverity::Error,
            Some(previous),
        );
    }

    pub fn units_of(&self, owner: PlayerId, types: &[UnitType]) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.owner() == owner && (types.is_empty() || types.contains(&u.unit_type())))
            .map(Unit::id)
            .collect()
    }

    pub fn units_of_type(&self, types: &[UnitType]) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| types.contains(&u.unit_type()))
            .map(Unit::id)
            .collect()
    }

    pub fn unit_count(&self, owner: PlayerId, unit_type: UnitType) -> usize {
        self.units
            .values()
            .filter(|u| u.owner() == owner && u.unit_type() == unit_type)
            .count()
    }

    /// Units of the given types within Euclidean `range` of `tile`, with squared distance
    pub fn nearby_units(
        &self,
        tile: TileRef,
        range: u32,
        types: &[UnitType],
    ) -> Vec<(UnitId, u64)> {
        let range_sq = u64::from(range) * u64::from(range);
        self.units
            .values()
            .filter(|u| types.contains(&u.unit_type()))
            .filter_map(|u| {
                let d = self.map.euclidean_dist_squared(tile, u.tile());
                (d <= range_sq).then_some((u.id(), d))
            })
            .collect()
    }

    pub fn has_defense_post_near(&self, owner: PlayerId, tile: TileRef, range: u32) -> bool {
        self.nearby_units(tile, range, &[UnitType::DefensePost])
            .iter()
            .any(|(id, _)| self.unit(*id).is_some_and(|u| u.owner() == owner))
    }

    /// Where a unit of `unit_type` aimed at `target` would spawn, or `None` if it cannot be built
    pub fn can_build(&self, owner: PlayerId, unit_type: UnitType, target: TileRef) -> Option<TileRef> {
        let player = self.player(owner)?;
        if !player.is_alive() || !self.map.is_valid_ref(target) {
            return None;
        }
        let cost = self
            .config
            .unit_cost(unit_type, self.unit_count(owner, unit_type));
        if player.gold() < cost {
            return None;
        }
        match unit_type {
            UnitType::AtomBomb | UnitType::HydrogenBomb | UnitType::Mirv => {
                if self.settings().disable_nukes {
                    return None;
                }
                self.ready_silo_near(owner, target)
            }
            UnitType::Port => self.port_spawn(player, target),
            UnitType::Warship => self.warship_spawn(owner, target),
            UnitType::TransportShip => self.transport_ship_spawn(player, target),
            UnitType::TradeShip => self
                .units
                .values()
                .any(|u| u.owner() == owner && u.tile() == target && u.unit_type() == UnitType::Port)
                .then_some(target),
            UnitType::City
            | UnitType::DefensePost
            | UnitType::SamLauncher
            | UnitType::MissileSilo => {
                (self.map.owner(target) == Owner::Player(owner) && self.map.is_land(target))
                    .then_some(target)
            }
            UnitType::MirvWarhead
            | UnitType::Shell
            | UnitType::SamMissile
            | UnitType::Construction => None,
        }
    }

    fn ready_silo_near(&self, owner: PlayerId, target: TileRef) -> Option<TileRef> {
        self.units
            .values()
            .filter(|u| u.owner() == owner && u.unit_type() == UnitType::MissileSilo && !u.is_cooldown())
            .min_by_key(|u| (self.map.manhattan_dist(u.tile(), target), u.id()))
            .map(Unit::tile)
    }

    fn port_spawn(&self, player: &Player, target: TileRef) -> Option<TileRef> {
        player
            .border_tiles()
            .iter()
            .copied()
            .filter(|&t| self.map.is_ocean_shore(t))
            .filter(|&t| self.map.manhattan_dist(t, target) <= PORT_PLACEMENT_RANGE)
            .min_by_key(|&t| (self.map.manhattan_dist(t, target), t))
    }

    fn warship_spawn(&self, owner: PlayerId, target: TileRef) -> Option<TileRef> {
        if !self.map.is_ocean(target) {
            return None;
        }
        self.units
            .values()
            .filter(|u| u.owner() == owner && u.unit_type() == UnitType::Port)
            .min_by_key(|u| (self.map.manhattan_dist(u.tile(), target), u.id()))
            .map(Unit::tile)
    }

    fn transport_ship_spawn(&self, player: &Player, target: TileRef) -> Option<TileRef> {
        if !self.map.is_ocean_shore(target) || self.map.owner(target) == Owner::Player(player.id()) {
            return None;
        }
        if self.unit_count(player.id(), UnitType::TransportShip) >= self.config.boat_max_number() {
            return None;
        }
        player
            .border_tiles()
            .iter()
            .copied()
            .filter(|&t| self.map.is_ocean_shore(t))
            .min_by_key(|&t| (self.map.manhattan_dist(t, target), t))
    }

    // === TRADE ===

    pub fn can_trade(&self, a: PlayerId, b: PlayerId) -> bool {
        if a == b {
            return false;
        }
        match (self.player(a), self.player(b)) {
            (Some(pa), Some(pb)) => !pa.has_embargo_against(b) && !pb.has_embargo_against(a),
            _ => false,
        }
    }

    /// Ports of other players this port's owner may trade with
    pub fn trading_ports(&self, port: UnitId) -> Vec<UnitId> {
        let Some(owner) = self.unit(port).map(Unit::owner) else {
            return Vec::new();
        };
        self.units
            .values()
            .filter(|u| u.unit_type() == UnitType::Port && self.can_trade(owner, u.owner()))
            .map(Unit::id)
            .collect()
    }

    // === DIPLOMACY ===

    pub fn alliances(&self) -> impl Iterator<Item = &Alliance> {
        self.alliances.values()
    }

    pub fn alliance(&self, id: AllianceId) -> Option<&Alliance> {
        self.alliances.get(&id)
    }

    pub fn alliance_between(&self, a: PlayerId, b: PlayerId) -> Option<AllianceId> {
        self.alliances
            .values()
            .find(|al| al.is_between(a, b))
            .map(|al| al.id)
    }

    pub fn is_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        self.alliance_between(a, b).is_some()
    }

    pub fn allies(&self, id: PlayerId) -> Vec<PlayerId> {
        self.alliances
            .values()
            .filter(|al| al.involves(id))
            .map(|al| al.other(id))
            .collect()
    }

    pub fn is_on_same_team(&self, a: PlayerId, b: PlayerId) -> bool {
        if self.settings().game_mode != GameMode::Team || a == b {
            return false;
        }
        match (self.player(a).and_then(Player::team), self.player(b).and_then(Player::team)) {
            (Some(ta), Some(tb)) => ta == tb,
            _ => false,
        }
    }

    /// Allied or teammates
    pub fn is_friendly(&self, a: PlayerId, b: PlayerId) -> bool {
        self.is_allied(a, b) || self.is_on_same_team(a, b)
    }

    pub fn alliance_requests(&self) -> &[AllianceRequest] {
        &self.alliance_requests
    }

    pub fn alliance_request(&self, requestor: PlayerId, recipient: PlayerId) -> Option<&AllianceRequest> {
        self.alliance_requests
            .iter()
            .find(|r| r.requestor == requestor && r.recipient == recipient)
    }

    pub fn can_send_alliance_request(&self, requestor: PlayerId, recipient: PlayerId) -> bool {
        requestor != recipient
            && self.player(requestor).is_some_and(Player::is_alive)
            && self.player(recipient).is_some_and(Player::is_alive)
            && !self.is_allied(requestor, recipient)
            && self.alliance_request(requestor, recipient).is_none()
    }

    pub fn add_alliance_request(&mut self, requestor: PlayerId, recipient: PlayerId) {
        self.alliance_requests.push(AllianceRequest {
            requestor,
            recipient,
            created_at: self.ticks,
        });
    }

    pub fn remove_alliance_request(&mut self, requestor: PlayerId, recipient: PlayerId) {
        self.alliance_requests
            .retain(|r| !(r.requestor == requestor && r.recipient == recipient));
    }

    pub fn create_alliance(&mut self, requestor: PlayerId, recipient: PlayerId) -> AllianceId {
        if let Some(existing) = self.alliance_between(requestor, recipient) {
            return existing;
        }
        self.alliance_requests
            .retain(|r| !((r.requestor == requestor && r.recipient == recipient)
                || (r.requestor == recipient && r.recipient == requestor)));
        let id = AllianceId(self.next_alliance_id);
        self.next_alliance_id += 1;
        self.alliances.insert(
            id,
            Alliance {
                id,
                requestor,
                recipient,
                created_at: self.ticks,
            },
        );
        tracing::info!(?requestor, ?recipient, "alliance formed");
        id
    }

    /// Drop an alliance without blame (expiry)
    pub fn remove_alliance(&mut self, id: AllianceId) {
        self.alliances.remove(&id);
    }

    /// `breaker` walks out of its alliance with `other` and is marked a traitor
    pub fn break_alliance(&mut self, breaker: PlayerId, other: PlayerId) {
        let Some(id) = self.alliance_between(breaker, other) else {
            return;
        };
        self.alliances.remove(&id);
        let now = self.ticks;
        let traitor_duration = self.settings().traitor_duration;
        let other_is_traitor = self
            .player(other)
            .is_some_and(|p| p.is_traitor(now, traitor_duration));
        if !other_is_traitor {
            if let Some(p) = self.player_mut(breaker) {
                p.mark_traitor(now);
            }
            self.stats.betray(breaker);
        }
        if let Some(p) = self.player_mut(other) {
            p.update_relation(breaker, -100.0);
        }
        tracing::info!(?breaker, ?other, "alliance broken");
        self.display_message(
            "Your alliance was broken",
            MessageSeverity::Warn,
            Some(other),
        );
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::types::PlayerType;
    use crate::map::TerrainType;

    /// Settings with no spawn phase or immunity, for tests that attack right away
    pub fn open_settings() -> GameSettings {
        GameSettings {
            spawn_phase_turns: 0,
            spawn_immunity_duration: 0,
            ..Default::default()
        }
    }

    pub fn plains_game(width: u32, height: u32) -> Game {
        Game::with_settings(
            GameMap::filled(width, height, TerrainType::Plains),
            open_settings(),
        )
    }

    pub fn add_human(game: &mut Game, name: &str) -> PlayerId {
        game.add_player(PlayerInfo::new(name, PlayerType::Human))
            .expect("player slot")
    }

    /// Conquer the axis-aligned rectangle `[x0, x1) x [y0, y1)`
    pub fn claim_rect(game: &mut Game, player: PlayerId, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                let tile = game.map().ref_at(x, y);
                game.conquer(player, tile);
            }
        }
    }
}
