//! # Skirmish Core
//!
//! Deterministic turn-based battle resolution.
//!
//! A battle is a queue of phases. Every step of a turn (command selection,
//! move ordering, each strike of each move, stat changes, fainting, end of
//! turn upkeep) is a phase the engine checks out, runs, and either retires or
//! suspends until the presentation layer answers.
//!
//! ## Architecture
//!
//! - **Scheduler**: [`queue::PhaseQueue`] with its prepend stack, insertion
//!   point, deferred list and one-level override
//! - **Attributes**: Abilities and moves are lists of attribute values;
//!   [`ability::dispatch`] and [`moves::dispatch`] run the ones that apply
//! - **Resolvers**: [`hit`] decides whether a strike lands, [`damage`] how
//!   much it takes, [`effects`] what follows
//! - **Driver**: [`engine::Engine`] steps the queue against an
//!   [`engine::EngineContext`] that owns all battle state
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::catalog::Catalog;
//! use skirmish_core::setup::BattleSetup;
//!
//! let setup = BattleSetup::from_json_str(r#"{
//!     "config": { "seed": 1 },
//!     "combatants": [
//!         { "name": "Hero", "side": "player", "level": 40, "moves": ["tackle"] },
//!         { "name": "Foe", "side": "enemy", "level": 40, "moves": ["tackle"] }
//!     ]
//! }"#)?;
//! let outcome = setup.into_engine(&Catalog::standard())?.run_headless();
//! println!("{outcome}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

// Battle model
pub mod catalog;
pub mod combatant;
pub mod config;
pub mod element;
pub mod error;
pub mod field;
pub mod setup;
pub mod stat;

// Attributes
pub mod ability;
pub mod holder;
pub mod moves;

// Resolution
pub mod damage;
pub mod effects;
pub mod hit;
pub mod rng;

// Scheduling
pub mod ai;
pub mod engine;
pub mod event;
pub mod phase;
pub mod phases;
pub mod queue;

pub use config::BattleConfig;
pub use engine::{BattleOutcome, Engine};
pub use error::{ConfigError, EngineError};

#[cfg(test)]
mod tests;
