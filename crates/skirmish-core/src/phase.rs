//! The phase abstraction: one schedulable unit of battle execution.
//!
//! A [`Phase`] is started once by the scheduler and either finishes
//! immediately or suspends on the presentation collaborator. Suspension is an
//! explicit value: [`Phase::start`] and [`Phase::resume`] return
//! [`PhaseStatus::Await`] naming what the phase waits for, and the engine
//! later calls [`Phase::resume`] with a [`ResumeSignal`]. Returning
//! [`PhaseStatus::Done`] is the hand-off back to the scheduler.
//!
//! # Example
//!
//! ```
//! use skirmish_core::engine::EngineContext;
//! use skirmish_core::phase::{Await, AnimationCue, Phase, PhaseKind, PhaseStatus, ResumeSignal};
//!
//! /// Plays a cue, then says something once it finished.
//! struct Fanfare {
//!     played: bool,
//! }
//!
//! impl Phase for Fanfare {
//!     fn kind(&self) -> PhaseKind {
//!         PhaseKind::External("fanfare")
//!     }
//!
//!     fn start(&mut self, _ctx: &mut EngineContext) -> PhaseStatus {
//!         PhaseStatus::Await(Await::Animation(AnimationCue::Custom("fanfare")))
//!     }
//!
//!     fn resume(&mut self, ctx: &mut EngineContext, _signal: ResumeSignal) -> PhaseStatus {
//!         self.played = true;
//!         ctx.message("Ta-da!".to_string());
//!         PhaseStatus::Done
//!     }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;
use crate::engine::EngineContext;
use crate::moves::MoveId;

// =============================================================================
// Phase kinds
// =============================================================================

/// Identifies what a queued phase does, for queue searches and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Summons both leads.
    BattleStart,
    /// Puts a combatant into a slot.
    Summon,
    /// Runs a combatant's on-entry abilities.
    PostSummon,
    /// Default turn start: queues command requests.
    TurnInit,
    /// Requests one combatant's command.
    Command,
    /// Orders the turn's moves.
    TurnStart,
    /// Executes one combatant's move.
    Move,
    /// Resolves one strike of a move.
    MoveEffect,
    /// Wraps up a move.
    MoveEnd,
    /// Applies a stat stage change.
    StatStageChange,
    /// Handles a fainted combatant.
    Faint,
    /// End-of-turn upkeep.
    TurnEnd,
    /// Shows a message.
    Message,
    /// Ends the battle.
    BattleEnd,
    /// A phase defined outside this crate.
    External(&'static str),
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External(name) => write!(f, "External({name})"),
            other => write!(f, "{other:?}"),
        }
    }
}

// =============================================================================
// Suspension
// =============================================================================

/// An animation the presentation layer should play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationCue {
    /// A combatant entering the field.
    Summon {
        /// Who entered.
        combatant: CombatantId,
    },
    /// A move's strike against its targets.
    Move {
        /// User.
        user: CombatantId,
        /// Move.
        move_id: MoveId,
        /// Targets struck.
        targets: Vec<CombatantId>,
    },
    /// A stat stage change.
    StatStage {
        /// Whose stages changed.
        target: CombatantId,
        /// Direction of the change.
        rising: bool,
    },
    /// A combatant fainting.
    Faint {
        /// Who fainted.
        combatant: CombatantId,
    },
    /// A cue defined outside this crate.
    Custom(&'static str),
}

/// What a suspended phase is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Await {
    /// Playback of an animation.
    Animation(AnimationCue),
    /// Acknowledgement of a shown message.
    Message,
    /// A command for a combatant.
    Command {
        /// Combatant that needs a command.
        combatant: CombatantId,
    },
}

/// A combatant's chosen action for the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Use the move in a moveset slot.
    UseMove {
        /// Moveset slot.
        slot: usize,
        /// Chosen target; `None` lets the engine pick.
        target: Option<CombatantId>,
    },
    /// Do nothing this turn.
    Pass,
}

/// What the engine hands a suspended phase when it continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeSignal {
    /// The awaited animation or message finished.
    Completed,
    /// The requested command.
    Command(Command),
    /// An override that preempted the phase finished.
    Restored,
}

/// Result of starting or resuming a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseStatus {
    /// The phase finished; the scheduler moves on.
    Done,
    /// The phase is suspended until resumed.
    Await(Await),
}

// =============================================================================
// Phase trait
// =============================================================================

/// One unit of battle execution.
pub trait Phase {
    /// Returns the kind.
    fn kind(&self) -> PhaseKind;

    /// Begins the phase.
    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus;

    /// Continues a suspended phase. Phases that never suspend finish here.
    fn resume(&mut self, ctx: &mut EngineContext, signal: ResumeSignal) -> PhaseStatus {
        let _ = (ctx, signal);
        PhaseStatus::Done
    }

    /// Returns the combatant the phase acts for, if any.
    fn combatant(&self) -> Option<CombatantId> {
        None
    }
}

impl fmt::Debug for dyn Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.combatant() {
            Some(id) => write!(f, "{}({id})", self.kind()),
            None => write!(f, "{}", self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl Phase for Probe {
        fn kind(&self) -> PhaseKind {
            PhaseKind::External("probe")
        }

        fn start(&mut self, _ctx: &mut EngineContext) -> PhaseStatus {
            PhaseStatus::Done
        }

        fn combatant(&self) -> Option<CombatantId> {
            Some(CombatantId::new(7))
        }
    }

    #[test]
    fn debug_names_kind_and_combatant() {
        let phase: Box<dyn Phase> = Box::new(Probe);
        assert_eq!(format!("{phase:?}"), "External(probe)(7)");
        assert_eq!(PhaseKind::TurnEnd.to_string(), "TurnEnd");
    }

    #[test]
    fn commands_serialize_with_an_action_tag() {
        let json = serde_json::to_string(&Command::UseMove {
            slot: 1,
            target: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"action":"use_move","slot":1,"target":null}"#);
    }
}
