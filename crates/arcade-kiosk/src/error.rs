use thiserror::Error;

use arcade_core::game_registry::RegistryError;

use crate::config::ConfigError;

/// Anything that stops the kiosk. All of these are fatal.
#[derive(Debug, Error)]
pub enum KioskError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("game catalog: {0}")]
    Registry(#[from] RegistryError),
    #[error("terminal i/o: {0}")]
    Io(#[from] std::io::Error),
}
