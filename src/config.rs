//! Server configuration and the numeric battle ruleset.
//!
//! Values come from Rocket's figment (`Rocket.toml`, `ROCKET_*` env vars) under the
//! `game` key. `OBJECTS_FILE` overrides the catalog path.

use rocket::figment::Figment;
use rocket::serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::matchup::TypeLabel;

pub const OBJECTS_FILE_ENV: &str = "OBJECTS_FILE";

/// Upper bound on the opponents offered per level.
pub const MAX_POOL_SIZE: usize = 3;

/// Configuration that must stop the server from launching.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed [game] config: {0}")]
    Figment(#[from] rocket::figment::Error),
    #[error("invalid rules: {0}")]
    Rules(String),
}

/// Numbers that shape a run: hp pools, damage, level count, item uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde", default)]
pub struct Rules {
    pub player_hp_max: u32,
    /// Uses each starting item comes with.
    pub base_item_uses: u32,
    pub base_item_types: Vec<TypeLabel>,
    /// `cpu_hp_max = cpu_hp_base + level`
    pub cpu_hp_base: u32,
    pub max_level: u32,
    /// Opponents offered per level.
    pub pool_size: usize,
    pub tie_damage: u32,
    pub hit_damage: u32,
    pub loot_uses: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            player_hp_max: 15,
            base_item_uses: 3,
            base_item_types: vec![TypeLabel::Rock, TypeLabel::Paper, TypeLabel::Scissors],
            cpu_hp_base: 4,
            max_level: 10,
            pool_size: 3,
            tie_damage: 1,
            hit_damage: 3,
            loot_uses: 1,
        }
    }
}

impl Rules {
    pub fn cpu_hp_max(&self, level: u32) -> u32 {
        self.cpu_hp_base.saturating_add(level)
    }

    /// Reject rulesets that cannot produce a playable run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_POOL_SIZE).contains(&self.pool_size) {
            return Err(ConfigError::Rules(format!(
                "pool_size must be between 1 and {}, got {}",
                MAX_POOL_SIZE, self.pool_size
            )));
        }
        if self.max_level == 0 {
            return Err(ConfigError::Rules("max_level must be at least 1".to_string()));
        }
        if self.player_hp_max == 0 {
            return Err(ConfigError::Rules("player_hp_max must be at least 1".to_string()));
        }
        if self.base_item_types.is_empty() {
            return Err(ConfigError::Rules("base_item_types must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde", default)]
pub struct GameConfig {
    pub objects_file: PathBuf,
    /// Front-end bundle served at `/` when the directory exists.
    pub static_dir: Option<PathBuf>,
    pub rules: Rules,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            objects_file: PathBuf::from("data").join("objects.csv"),
            static_dir: None,
            rules: Rules::default(),
        }
    }
}

impl GameConfig {
    /// Read the `game` section, apply the `OBJECTS_FILE` override and check the rules.
    ///
    /// A missing section means defaults; a malformed one is an error.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let mut config = if figment.contains("game") {
            figment.extract_inner::<GameConfig>("game")?
        } else {
            GameConfig::default()
        };
        if let Ok(path) = std::env::var(OBJECTS_FILE_ENV) {
            if !path.trim().is_empty() {
                config.objects_file = PathBuf::from(path);
            }
        }
        config.rules.validate()?;
        Ok(config)
    }
}
