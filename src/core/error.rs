use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::types::{PlayerId, UnitId};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unit not found: {0}")]
    UnknownUnit(UnitId),

    #[error("{unit} is owned by {owner}, not {player}")]
    NotOwner {
        unit: UnitId,
        owner: PlayerId,
        player: PlayerId,
    },

    #[error("Unit already registered: {0}")]
    DuplicateUnit(UnitId),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;
