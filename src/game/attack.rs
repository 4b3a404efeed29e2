use derive_more::{Add, AddAssign};
use serde::{Deserialize, Serialize};

use crate::core::types::{AttackId, Owner, PlayerId, TileRef};

/// Where the troops committed to an attack ended up
///
/// Balanced once `debited == losses + refunded`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Add, AddAssign, Serialize, Deserialize)]
pub struct TroopLedger {
    pub debited: f64,
    pub losses: f64,
    pub refunded: f64,
}

impl TroopLedger {
    pub fn debit(troops: f64) -> Self {
        Self {
            debited: troops,
            ..Self::default()
        }
    }

    /// Troops debited but neither lost nor refunded yet
    pub fn outstanding(&self) -> f64 {
        self.debited - self.losses - self.refunded
    }

    pub fn is_balanced(&self) -> bool {
        self.outstanding().abs() < 1e-6
    }
}

/// Troops committed against a target's territory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attack {
    id: AttackId,
    attacker: PlayerId,
    target: Owner,
    troops: f64,
    /// Landing tile of a boat invasion; `None` expands from the whole border
    source_tile: Option<TileRef>,
    retreating: bool,
    retreated: bool,
    ledger: TroopLedger,
}

impl Attack {
    pub(crate) fn new(
        id: AttackId,
        attacker: PlayerId,
        target: Owner,
        troops: f64,
        source_tile: Option<TileRef>,
    ) -> Self {
        let troops = troops.max(0.0);
        Self {
            id,
            attacker,
            target,
            troops,
            source_tile,
            retreating: false,
            retreated: false,
            ledger: TroopLedger::debit(troops),
        }
    }

    pub fn id(&self) -> AttackId {
        self.id
    }

    pub fn attacker(&self) -> PlayerId {
        self.attacker
    }

    pub fn target(&self) -> Owner {
        self.target
    }

    pub fn troops(&self) -> f64 {
        self.troops
    }

    pub fn ledger(&self) -> TroopLedger {
        self.ledger
    }

    /// Kill up to `amount` troops, returning how many died
    pub(crate) fn lose_troops(&mut self, amount: f64) -> f64 {
        let lost = amount.clamp(0.0, self.troops);
        self.troops -= lost;
        self.ledger.losses += lost;
        lost
    }

    /// Fold more committed troops into this attack
    pub(crate) fn reinforce(&mut self, troops: f64) {
        let troops = troops.max(0.0);
        self.troops += troops;
        self.ledger.debited += troops;
    }

    /// Take every remaining troop off the attack, killing `malus_percent` of
    /// them. Returns the survivors, who go back to the attacker.
    pub(crate) fn withdraw(&mut self, malus_percent: f64) -> f64 {
        let deaths = self.troops * malus_percent / 100.0;
        self.lose_troops(deaths);
        let survivors = self.troops;
        self.troops = 0.0;
        self.ledger.refunded += survivors;
        survivors
    }

    pub fn source_tile(&self) -> Option<TileRef> {
        self.source_tile
    }

    pub fn is_retreating(&self) -> bool {
        self.retreating
    }

    pub fn retreated(&self) -> bool {
        self.retreated
    }

    pub(crate) fn order_retreat(&mut self) {
        self.retreating = true;
    }

    pub(crate) fn execute_retreat(&mut self) {
        self.retreated = true;
    }
}
