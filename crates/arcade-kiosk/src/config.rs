use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use arcade_core::prize::{PrizeError, PrizeTable, default_dares};

pub const DEFAULT_CONFIG_PATH: &str = "arcade.toml";

/// Highest frame rate the host will drive games at.
pub const MAX_FRAME_RATE: u32 = 240;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Prize(#[from] PrizeError),
}

/// Top-level kiosk configuration, loaded from `arcade.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Frames per second for the game loop.
    pub frame_rate: u32,
    /// Fixed seed for reproducible sessions. Unset seeds from the OS.
    pub seed: Option<u64>,
    pub audio: AudioConfig,
    pub haptics: HapticsConfig,
    pub prizes: PrizesConfig,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            seed: None,
            audio: AudioConfig::default(),
            haptics: HapticsConfig::default(),
            prizes: PrizesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub master_volume: f32,
    pub game_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            master_volume: 0.5,
            game_volume: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticsConfig {
    pub enabled: bool,
    /// Pulse length per unit of shake intensity.
    pub ms_per_intensity: u32,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ms_per_intensity: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrizesConfig {
    pub chocolate_weight: u32,
    pub jackpot_weight: u32,
    pub dare_weight: u32,
    pub dares: Vec<String>,
}

impl Default for PrizesConfig {
    fn default() -> Self {
        Self {
            chocolate_weight: 10,
            jackpot_weight: 5,
            dare_weight: 85,
            dares: default_dares(),
        }
    }
}

impl KioskConfig {
    /// Read `path` if it exists, then apply environment overrides. A missing
    /// file means defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
                tracing::info!(path = %path.display(), "loaded configuration");
                cfg
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            },
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            },
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `ARCADE_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Unparseable values are logged and
    /// skipped.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("ARCADE_FRAME_RATE") {
            match val.trim().parse::<u32>() {
                Ok(n) => self.frame_rate = n,
                Err(_) => tracing::warn!(value = %val, "ignoring bad ARCADE_FRAME_RATE"),
            }
        }
        if let Some(val) = lookup("ARCADE_SEED") {
            match val.trim().parse::<u64>() {
                Ok(n) => self.seed = Some(n),
                Err(_) => tracing::warn!(value = %val, "ignoring bad ARCADE_SEED"),
            }
        }
        if let Some(val) = lookup("ARCADE_MUTE") {
            match val.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.audio.enabled = false,
                "0" | "false" | "no" | "off" | "" => {},
                _ => tracing::warn!(value = %val, "ignoring bad ARCADE_MUTE"),
            }
        }
        if let Some(val) = lookup("ARCADE_MASTER_VOLUME") {
            match val.trim().parse::<f32>() {
                Ok(v) => self.audio.master_volume = v,
                Err(_) => tracing::warn!(value = %val, "ignoring bad ARCADE_MASTER_VOLUME"),
            }
        }
    }

    /// Reject values the kiosk cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate == 0 || self.frame_rate > MAX_FRAME_RATE {
            return Err(ConfigError::Invalid(format!(
                "frame_rate must be in 1..={MAX_FRAME_RATE} (got {})",
                self.frame_rate
            )));
        }
        for (name, value) in [
            ("audio.master_volume", self.audio.master_volume),
            ("audio.game_volume", self.audio.game_volume),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1] (got {value})"
                )));
            }
        }
        let p = &self.prizes;
        if p.chocolate_weight == 0 && p.jackpot_weight == 0 && p.dare_weight == 0 {
            return Err(ConfigError::Invalid(
                "at least one prize weight must be > 0".to_string(),
            ));
        }
        if p.dares.iter().all(|d| d.trim().is_empty()) {
            return Err(ConfigError::Invalid("prizes.dares must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.frame_rate.max(1)))
    }

    pub fn prize_table(&self) -> Result<PrizeTable, ConfigError> {
        let p = &self.prizes;
        Ok(PrizeTable::new(
            p.chocolate_weight,
            p.jackpot_weight,
            p.dare_weight,
            p.dares.clone(),
        )?)
    }
}
