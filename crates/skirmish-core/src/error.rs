//! Error types for battle setup.
//!
//! Battle resolution itself never fails: a phase that cannot find its
//! combatant logs a warning and retires. Errors only surface while a battle is
//! being assembled (bad configuration, unknown catalog ids, empty rosters).

use thiserror::Error;

use crate::ability::AbilityId;
use crate::combatant::Side;
use crate::moves::MoveId;

/// Errors raised while loading or validating a [`BattleConfig`](crate::config::BattleConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text was not valid JSON for the schema.
    #[error("invalid battle config: {0}")]
    Parse(#[from] serde_json::Error),

    /// `active_per_side` is outside the supported range.
    #[error("active_per_side must be between 1 and {max}, got {value}")]
    ActivePerSide {
        /// Configured value.
        value: usize,
        /// Largest supported value.
        max: usize,
    },

    /// `max_turns` was set to zero.
    #[error("max_turns must be positive when set")]
    ZeroTurnLimit,
}

/// Errors raised while constructing an [`Engine`](crate::engine::Engine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A roster entry referenced a move the catalog does not know.
    #[error("unknown move `{0}`")]
    UnknownMove(MoveId),

    /// A roster entry referenced an ability the catalog does not know.
    #[error("unknown ability `{0}`")]
    UnknownAbility(AbilityId),

    /// One side has nobody to send out.
    #[error("{0} side has no combatants")]
    EmptyRoster(Side),

    /// A roster entry is malformed.
    #[error("combatant `{name}` is invalid: {reason}")]
    InvalidCombatant {
        /// Display name of the offending entry.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}
