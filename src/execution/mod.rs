//! Executions - the actors that drive the simulation
//!
//! Every behavior in a match (attacks, unit flights, upkeep, player
//! intents) is an execution. The scheduler initializes each one once,
//! ticks it while it reports active and drops it afterwards. Executions
//! mutate the `Game` directly and queue follow-up executions on it.

pub mod attack;
pub mod bot;
pub mod build;
pub mod diplomacy;
pub mod intents;
pub mod mirv;
pub mod nuke;
pub mod player;
pub mod port;
pub mod retreat;
pub mod sam;
pub mod scheduler;
pub mod shell;
pub mod silo;
pub mod spawn;
pub mod trade_ship;
pub mod transport_ship;
pub mod warship;
pub mod win_check;

use derive_more::From;

use crate::core::types::Tick;
use crate::game::Game;

pub use attack::AttackExecution;
pub use bot::BotExecution;
pub use build::BuildExecution;
pub use diplomacy::{
    AllianceReplyExecution, AllianceRequestExecution, BreakAllianceExecution, EmbargoAction,
    EmbargoExecution, TargetPlayerExecution,
};
pub use intents::{Donation, DonateExecution, MarkDisconnectedExecution, TargetTroopRatioExecution};
pub use mirv::MirvExecution;
pub use nuke::NukeExecution;
pub use player::PlayerExecution;
pub use port::PortExecution;
pub use retreat::RetreatExecution;
pub use sam::{SamLauncherExecution, SamMissileExecution};
pub use scheduler::Scheduler;
pub use shell::ShellExecution;
pub use silo::MissileSiloExecution;
pub use spawn::SpawnExecution;
pub use trade_ship::TradeShipExecution;
pub use transport_ship::TransportShipExecution;
pub use warship::{MoveWarshipExecution, WarshipExecution};
pub use win_check::WinCheckExecution;

/// Lifecycle shared by every execution
pub trait Executable {
    /// Called exactly once, before the first `tick`
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, tick: Tick);

    fn is_active(&self) -> bool;

    /// Whether the execution runs while players are still picking spawns
    fn active_during_spawn_phase(&self) -> bool {
        false
    }
}

/// Every kind of execution the scheduler can run
#[derive(Debug, From)]
pub enum Execution {
    Spawn(SpawnExecution),
    Player(PlayerExecution),
    Bot(BotExecution),
    Attack(AttackExecution),
    Retreat(RetreatExecution),
    Build(BuildExecution),
    Nuke(NukeExecution),
    Mirv(MirvExecution),
    SamLauncher(SamLauncherExecution),
    SamMissile(SamMissileExecution),
    MissileSilo(MissileSiloExecution),
    Port(PortExecution),
    TradeShip(TradeShipExecution),
    TransportShip(TransportShipExecution),
    Warship(WarshipExecution),
    MoveWarship(MoveWarshipExecution),
    Shell(ShellExecution),
    WinCheck(WinCheckExecution),
    AllianceRequest(AllianceRequestExecution),
    AllianceReply(AllianceReplyExecution),
    BreakAlliance(BreakAllianceExecution),
    Embargo(EmbargoExecution),
    TargetPlayer(TargetPlayerExecution),
    Donate(DonateExecution),
    TargetTroopRatio(TargetTroopRatioExecution),
    MarkDisconnected(MarkDisconnectedExecution),
}

macro_rules! dispatch {
    ($self:expr, $exec:ident => $body:expr) => {
        match $self {
            Execution::Spawn($exec) => $body,
            Execution::Player($exec) => $body,
            Execution::Bot($exec) => $body,
            Execution::Attack($exec) => $body,
            Execution::Retreat($exec) => $body,
            Execution::Build($exec) => $body,
            Execution::Nuke($exec) => $body,
            Execution::Mirv($exec) => $body,
            Execution::SamLauncher($exec) => $body,
            Execution::SamMissile($exec) => $body,
            Execution::MissileSilo($exec) => $body,
            Execution::Port($exec) => $body,
            Execution::TradeShip($exec) => $body,
            Execution::TransportShip($exec) => $body,
            Execution::Warship($exec) => $body,
            Execution::MoveWarship($exec) => $body,
            Execution::Shell($exec) => $body,
            Execution::WinCheck($exec) => $body,
            Execution::AllianceRequest($exec) => $body,
            Execution::AllianceReply($exec) => $body,
            Execution::BreakAlliance($exec) => $body,
            Execution::Embargo($exec) => $body,
            Execution::TargetPlayer($exec) => $body,
            Execution::Donate($exec) => $body,
            Execution::TargetTroopRatio($exec) => $body,
            Execution::MarkDisconnected($exec) => $body,
        }
    };
}

impl Execution {
    pub fn init(&mut self, game: &mut Game, tick: Tick) {
        dispatch!(self, exec => exec.init(game, tick))
    }

    pub fn tick(&mut self, game: &mut Game, tick: Tick) {
        dispatch!(self, exec => exec.tick(game, tick))
    }

    pub fn is_active(&self) -> bool {
        dispatch!(self, exec => exec.is_active())
    }

    pub fn active_during_spawn_phase(&self) -> bool {
        dispatch!(self, exec => exec.active_during_spawn_phase())
    }
}
