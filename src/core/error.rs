use thiserror::Error;

use crate::core::types::{AttackId, PlayerId, TileRef, UnitId};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Player not found: {0:?}")]
    PlayerNotFound(PlayerId),

    #[error("Unit not found: {0:?}")]
    UnitNotFound(UnitId),

    #[error("Attack not found: {0:?}")]
    AttackNotFound(AttackId),

    #[error("Tile out of bounds: {0:?}")]
    TileOutOfBounds(TileRef),

    #[error("Invalid map: {0}")]
    InvalidMap(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Too many players: {0}")]
    TooManyPlayers(usize),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
