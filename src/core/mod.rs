pub mod config;
pub mod error;
pub mod random;
pub mod types;

pub use config::{AttackOutcome, Config, DefaultConfig, GameMode, GameSettings, NukeMagnitude, UnitInfo};
pub use error::{Result, SimError};
pub use random::{simple_hash, PseudoRandom};
pub use types::*;
