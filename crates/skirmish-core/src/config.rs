//! Battle configuration.
//!
//! A [`BattleConfig`] is plain data: it deserializes from JSON with every field
//! optional, and [`BattleConfig::validate`] rejects values the engine cannot
//! run with.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::{BattleConfig, ControlMode};
//!
//! let config = BattleConfig::from_json_str(r#"{ "seed": 12, "active_per_side": 2 }"#).unwrap();
//! assert_eq!(config.seed, 12);
//! assert_eq!(config.active_per_side, 2);
//! assert_eq!(config.player_control, ControlMode::Ai);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest number of simultaneously active combatants per side.
pub const MAX_ACTIVE_PER_SIDE: usize = 3;

/// Who answers command requests for the player side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Command requests surface to the caller as an await.
    Manual,
    /// The engine's command policy answers them.
    #[default]
    Ai,
}

/// Tunables for one battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seed for the battle RNG.
    pub seed: u64,
    /// Active combatants per side (1 to [`MAX_ACTIVE_PER_SIDE`]).
    pub active_per_side: usize,
    /// Turn limit after which the battle ends in a draw. `None` disables it.
    pub max_turns: Option<u32>,
    /// Whether damaging hits may land critically.
    pub critical_hits: bool,
    /// Whether damage rolls the 85-100% variance factor.
    pub damage_variance: bool,
    /// Who chooses the player side's commands.
    pub player_control: ControlMode,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            active_per_side: 1,
            max_turns: Some(200),
            critical_hits: true,
            damage_variance: true,
            player_control: ControlMode::Ai,
        }
    }
}

impl BattleConfig {
    /// Parses and validates a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any error
    /// [`validate`](Self::validate) reports.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field is within range.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_ACTIVE_PER_SIDE).contains(&self.active_per_side) {
            return Err(ConfigError::ActivePerSide {
                value: self.active_per_side,
                max: MAX_ACTIVE_PER_SIDE,
            });
        }
        if self.max_turns == Some(0) {
            return Err(ConfigError::ZeroTurnLimit);
        }
        Ok(())
    }

    /// Returns a copy with the given seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns a copy with the given number of active combatants per side.
    #[must_use]
    pub fn with_active_per_side(mut self, count: usize) -> Self {
        self.active_per_side = count;
        self
    }

    /// Returns a copy with variance and critical hits disabled.
    ///
    /// Damage becomes a pure function of the combatants and the move, which
    /// is what scenario tests want.
    #[must_use]
    pub fn without_damage_rolls(mut self) -> Self {
        self.critical_hits = false;
        self.damage_variance = false;
        self
    }

    /// Returns a copy with the given player control mode.
    #[must_use]
    pub fn with_player_control(mut self, mode: ControlMode) -> Self {
        self.player_control = mode;
        self
    }
}
