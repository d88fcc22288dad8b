pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigError, GameRules};
pub use error::{CommandError, Result};
