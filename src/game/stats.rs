//! Write-only match statistics

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::types::{Gold, Owner, PlayerId};
use crate::game::unit::UnitType;

const OUTGOING: usize = 0;
const INCOMING: usize = 1;
const CANCELLED: usize = 2;

const SENT: usize = 0;
const ARRIVED: usize = 1;
const CAPTURED: usize = 2;
const DESTROYED: usize = 3;

const LAUNCHED: usize = 0;
const LANDED: usize = 1;
const INTERCEPTED: usize = 2;

const BUILT: usize = 0;
const UNIT_DESTROYED: usize = 1;
const UNIT_CAPTURED: usize = 2;
const LOST: usize = 3;

const WORK: usize = 0;
const WAR: usize = 1;
const TRADE: usize = 2;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerStats {
    /// Troops sent, received and called back: [outgoing, incoming, cancelled]
    pub attacks: [f64; 3],
    pub betrayals: u32,
    /// Per ship type: [sent, arrived, captured, destroyed]
    pub boats: BTreeMap<UnitType, [u64; 4]>,
    /// Per bomb type: [launched, landed, intercepted]
    pub bombs: BTreeMap<UnitType, [u64; 3]>,
    /// Per unit type: [built, destroyed, captured, lost]
    pub units: BTreeMap<UnitType, [u64; 4]>,
    /// Gold income: [work, war, trade]
    pub gold: [Gold; 3],
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    players: BTreeMap<PlayerId, PlayerStats>,
}

impl Stats {
    pub fn player(&self, player: PlayerId) -> Option<&PlayerStats> {
        self.players.get(&player)
    }

    fn entry(&mut self, player: PlayerId) -> &mut PlayerStats {
        self.players.entry(player).or_default()
    }

    pub fn attack(&mut self, attacker: PlayerId, target: Owner, troops: f64) {
        self.entry(attacker).attacks[OUTGOING] += troops;
        if let Owner::Player(target) = target {
            self.entry(target).attacks[INCOMING] += troops;
        }
    }

    pub fn attack_cancel(&mut self, attacker: PlayerId, target: Owner, troops: f64) {
        self.entry(attacker).attacks[CANCELLED] += troops;
        self.entry(attacker).attacks[OUTGOING] -= troops;
        if let Owner::Player(target) = target {
            self.entry(target).attacks[INCOMING] -= troops;
        }
    }

    pub fn betray(&mut self, player: PlayerId) {
        self.entry(player).betrayals += 1;
    }

    fn boat(&mut self, player: PlayerId, boat: UnitType, slot: usize) {
        self.entry(player).boats.entry(boat).or_default()[slot] += 1;
    }

    pub fn boat_send(&mut self, player: PlayerId, boat: UnitType) {
        self.boat(player, boat, SENT);
    }

    pub fn boat_arrive(&mut self, player: PlayerId, boat: UnitType) {
        self.boat(player, boat, ARRIVED);
    }

    pub fn boat_capture(&mut self, player: PlayerId, boat: UnitType) {
        self.boat(player, boat, CAPTURED);
    }

    pub fn boat_destroy(&mut self, player: PlayerId, boat: UnitType) {
        self.boat(player, boat, DESTROYED);
    }

    fn bomb(&mut self, player: PlayerId, bomb: UnitType, slot: usize, count: u64) {
        self.entry(player).bombs.entry(bomb).or_default()[slot] += count;
    }

    pub fn bomb_launch(&mut self, player: PlayerId, bomb: UnitType) {
        self.bomb(player, bomb, LAUNCHED, 1);
    }

    pub fn bomb_land(&mut self, player: PlayerId, bomb: UnitType) {
        self.bomb(player, bomb, LANDED, 1);
    }

    pub fn bomb_intercept(&mut self, interceptor: PlayerId, bomb: UnitType, count: u64) {
        self.bomb(interceptor, bomb, INTERCEPTED, count);
    }

    fn unit(&mut self, player: PlayerId, unit: UnitType, slot: usize) {
        self.entry(player).units.entry(unit).or_default()[slot] += 1;
    }

    pub fn unit_build(&mut self, player: PlayerId, unit: UnitType) {
        self.unit(player, unit, BUILT);
    }

    pub fn unit_destroy(&mut self, player: PlayerId, unit: UnitType) {
        self.unit(player, unit, UNIT_DESTROYED);
    }

    pub fn unit_capture(&mut self, player: PlayerId, unit: UnitType) {
        self.unit(player, unit, UNIT_CAPTURED);
    }

    pub fn unit_lose(&mut self, player: PlayerId, unit: UnitType) {
        self.unit(player, unit, LOST);
    }

    pub fn gold_work(&mut self, player: PlayerId, gold: Gold) {
        self.entry(player).gold[WORK] += gold;
    }

    pub fn gold_war(&mut self, player: PlayerId, gold: Gold) {
        self.entry(player).gold[WAR] += gold;
    }

    pub fn gold_trade(&mut self, player: PlayerId, gold: Gold) {
        self.entry(player).gold[TRADE] += gold;
    }
}
