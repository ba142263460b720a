//! Crate-level battle scenarios.
//!
//! - **Determinism tests**: The same seed replays the same battle
//! - **Integration tests**: Whole battles driven through the engine
//! - **Helper functions**: Roster and engine setup
//!
//! # Test Structure
//!
//! - `determinism.rs`: Seeded reproducibility and scheduler ordering properties
//! - `integration.rs`: End-to-end battles, manual control, overrides
//! - `helpers.rs`: Factories shared by both

mod determinism;
mod helpers;
mod integration;

pub use helpers::*;
