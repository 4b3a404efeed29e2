//! Units: structures, ships and ordnance

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, Tick, TileRef, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    City,
    Port,
    MissileSilo,
    DefensePost,
    SamLauncher,
    TransportShip,
    Warship,
    TradeShip,
    AtomBomb,
    HydrogenBomb,
    Mirv,
    MirvWarhead,
    Shell,
    SamMissile,
    Construction,
}

impl UnitType {
    /// Bombs that detonate on a destination tile
    pub fn is_nuke(self) -> bool {
        matches!(
            self,
            UnitType::AtomBomb | UnitType::HydrogenBomb | UnitType::Mirv | UnitType::MirvWarhead
        )
    }

    pub fn is_ship(self) -> bool {
        matches!(
            self,
            UnitType::TransportShip | UnitType::Warship | UnitType::TradeShip
        )
    }

    pub fn is_structure(self) -> bool {
        matches!(
            self,
            UnitType::City
                | UnitType::Port
                | UnitType::MissileSilo
                | UnitType::DefensePost
                | UnitType::SamLauncher
                | UnitType::Construction
        )
    }
}

/// Type tag plus the data that only that type carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitKind {
    City,
    Port,
    MissileSilo { cooldown_start: Option<Tick> },
    DefensePost,
    SamLauncher { cooldown_start: Option<Tick> },
    TransportShip { troops: f64, destination: TileRef },
    Warship { patrol_tile: TileRef, move_target: Option<TileRef> },
    TradeShip {
        source_port: UnitId,
        destination_port: UnitId,
        captured: bool,
    },
    AtomBomb { destination: TileRef },
    HydrogenBomb { destination: TileRef },
    Mirv { destination: TileRef },
    MirvWarhead { destination: TileRef },
    Shell,
    SamMissile,
    Construction { building: UnitType },
}

impl UnitKind {
    pub fn unit_type(&self) -> UnitType {
        match self {
            UnitKind::City => UnitType::City,
            UnitKind::Port => UnitType::Port,
            UnitKind::MissileSilo { .. } => UnitType::MissileSilo,
            UnitKind::DefensePost => UnitType::DefensePost,
            UnitKind::SamLauncher { .. } => UnitType::SamLauncher,
            UnitKind::TransportShip { .. } => UnitType::TransportShip,
            UnitKind::Warship { .. } => UnitType::Warship,
            UnitKind::TradeShip { .. } => UnitType::TradeShip,
            UnitKind::AtomBomb { .. } => UnitType::AtomBomb,
            UnitKind::HydrogenBomb { .. } => UnitType::HydrogenBomb,
            UnitKind::Mirv { .. } => UnitType::Mirv,
            UnitKind::MirvWarhead { .. } => UnitType::MirvWarhead,
            UnitKind::Shell => UnitType::Shell,
            UnitKind::SamMissile => UnitType::SamMissile,
            UnitKind::Construction { .. } => UnitType::Construction,
        }
    }

    /// Payload-free kind for the structure and projectile types
    pub fn plain(unit_type: UnitType) -> Option<Self> {
        match unit_type {
            UnitType::City => Some(UnitKind::City),
            UnitType::Port => Some(UnitKind::Port),
            UnitType::MissileSilo => Some(UnitKind::MissileSilo {
                cooldown_start: None,
            }),
            UnitType::DefensePost => Some(UnitKind::DefensePost),
            UnitType::SamLauncher => Some(UnitKind::SamLauncher {
                cooldown_start: None,
            }),
            UnitType::Shell => Some(UnitKind::Shell),
            UnitType::SamMissile => Some(UnitKind::SamMissile),
            UnitType::TransportShip
            | UnitType::Warship
            | UnitType::TradeShip
            | UnitType::AtomBomb
            | UnitType::HydrogenBomb
            | UnitType::Mirv
            | UnitType::MirvWarhead
            | UnitType::Construction => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    owner: PlayerId,
    tile: TileRef,
    last_tile: TileRef,
    health: Option<f64>,
    max_health: Option<f64>,
    targeted_by_sam: bool,
    created_at: Tick,
    kind: UnitKind,
}

impl Unit {
    pub(crate) fn new(
        id: UnitId,
        owner: PlayerId,
        tile: TileRef,
        kind: UnitKind,
        max_health: Option<f64>,
        created_at: Tick,
    ) -> Self {
        Self {
            id,
            owner,
            tile,
            last_tile: tile,
            health: max_health,
            max_health,
            targeted_by_sam: false,
            created_at,
            kind,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: PlayerId) {
        self.owner = owner;
    }

    pub fn tile(&self) -> TileRef {
        self.tile
    }

    pub fn last_tile(&self) -> TileRef {
        self.last_tile
    }

    pub(crate) fn move_to(&mut self, tile: TileRef) {
        self.last_tile = self.tile;
        self.tile = tile;
    }

    pub fn unit_type(&self) -> UnitType {
        self.kind.unit_type()
    }

    pub fn kind(&self) -> &UnitKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut UnitKind {
        &mut self.kind
    }

    pub fn created_at(&self) -> Tick {
        self.created_at
    }

    pub fn has_health(&self) -> bool {
        self.health.is_some()
    }

    pub fn health(&self) -> Option<f64> {
        self.health
    }

    /// Add `delta` to health, clamped to `[0, max_health]`
    pub fn modify_health(&mut self, delta: f64) {
        if let (Some(health), Some(max)) = (self.health.as_mut(), self.max_health) {
            *health = (*health + delta).clamp(0.0, max);
        }
    }

    pub fn targeted_by_sam(&self) -> bool {
        self.targeted_by_sam
    }

    pub fn set_targeted_by_sam(&mut self, targeted: bool) {
        self.targeted_by_sam = targeted;
    }

    /// Where a bomb will go off
    pub fn detonation_dst(&self) -> Option<TileRef> {
        match self.kind {
            UnitKind::AtomBomb { destination }
            | UnitKind::HydrogenBomb { destination }
            | UnitKind::Mirv { destination }
            | UnitKind::MirvWarhead { destination } => Some(destination),
            _ => None,
        }
    }

    /// Troops carried by a transport ship
    pub fn troops(&self) -> f64 {
        match self.kind {
            UnitKind::TransportShip { troops, .. } => troops,
            _ => 0.0,
        }
    }

    pub fn set_troops(&mut self, value: f64) {
        if let UnitKind::TransportShip { troops, .. } = &mut self.kind {
            *troops = value.max(0.0);
        }
    }

    fn cooldown_slot(&mut self) -> Option<&mut Option<Tick>> {
        match &mut self.kind {
            UnitKind::MissileSilo { cooldown_start } | UnitKind::SamLauncher { cooldown_start } => {
                Some(cooldown_start)
            }
            _ => None,
        }
    }

    pub fn is_cooldown(&self) -> bool {
        matches!(
            self.kind,
            UnitKind::MissileSilo {
                cooldown_start: Some(_)
            } | UnitKind::SamLauncher {
                cooldown_start: Some(_)
            }
        )
    }

    pub fn start_cooldown(&mut self, now: Tick) {
        if let Some(slot) = self.cooldown_slot() {
            *slot = Some(now);
        }
    }

    pub fn clear_cooldown(&mut self) {
        if let Some(slot) = self.cooldown_slot() {
            *slot = None;
        }
    }

    /// Ticks until a cooldown of `duration` started by this unit runs out
    pub fn ticks_left_in_cooldown(&self, duration: Tick, now: Tick) -> Tick {
        match self.kind {
            UnitKind::MissileSilo {
                cooldown_start: Some(start),
            }
            | UnitKind::SamLauncher {
                cooldown_start: Some(start),
            } => (start + duration).saturating_sub(now),
            _ => 0,
        }
    }

    /// Building type of a construction site
    pub fn construction_type(&self) -> Option<UnitType> {
        match self.kind {
            UnitKind::Construction { building } => Some(building),
            _ => None,
        }
    }
}
