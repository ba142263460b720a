//! Battle event log.
//!
//! Phases and effect fragments record what happened as [`BattleEvent`]s. The
//! log is the engine's only outward channel: a front end renders it, tests
//! assert on it, and the runner prints it.
//!
//! Each event is wrapped in an [`EventRecord`] carrying:
//! - `sequence`: Monotonic position in the log, unique per battle
//! - `turn`: The turn the event happened on (0 before the first turn)
//!
//! # Example
//!
//! ```
//! use skirmish_core::event::{BattleEvent, EventLog};
//!
//! let mut log = EventLog::new();
//! log.push(1, BattleEvent::Message { text: "Go!".into() });
//! log.push(1, BattleEvent::TurnStarted { turn: 2 });
//!
//! assert_eq!(log.len(), 2);
//! assert_eq!(log.messages().collect::<Vec<_>>(), vec!["Go!"]);
//! assert_eq!(log.records()[1].sequence(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::ability::AbilityId;
use crate::combatant::{BattlerTagKind, CombatantId, StatusKind};
use crate::engine::BattleOutcome;
use crate::field::{ArenaTagKind, ArenaTagSide, WeatherKind};
use crate::moves::MoveId;
use crate::stat::BattleStat;

/// Something that happened during a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    /// Human-readable battle text.
    Message {
        /// The text.
        text: String,
    },
    /// A new turn began.
    TurnStarted {
        /// Turn number, starting at 1.
        turn: u32,
    },
    /// A combatant entered a slot.
    Summoned {
        /// Who entered.
        combatant: CombatantId,
        /// Slot index.
        slot: usize,
    },
    /// A combatant began executing a move.
    MoveUsed {
        /// User.
        user: CombatantId,
        /// Move.
        move_id: MoveId,
    },
    /// A move missed a target.
    Missed {
        /// User.
        user: CombatantId,
        /// Target that avoided it.
        target: CombatantId,
    },
    /// A protection blocked a move.
    Protected {
        /// Protected combatant.
        target: CombatantId,
    },
    /// A move had no effect on a target.
    NoEffect {
        /// Unaffected combatant.
        target: CombatantId,
    },
    /// HP was removed.
    Damaged {
        /// Who took damage.
        target: CombatantId,
        /// Who caused it, if a combatant did.
        source: Option<CombatantId>,
        /// HP removed.
        amount: u32,
    },
    /// HP was restored.
    Healed {
        /// Who healed.
        target: CombatantId,
        /// HP restored.
        amount: u32,
    },
    /// A combatant fainted.
    Fainted {
        /// Who fainted.
        combatant: CombatantId,
    },
    /// A stat stage moved (or failed to move).
    StatStageChanged {
        /// Whose stage.
        target: CombatantId,
        /// Which stat.
        stat: BattleStat,
        /// Change applied; 0 if the stage was already at its limit.
        delta: i8,
    },
    /// A status condition was inflicted.
    StatusApplied {
        /// Who received it.
        target: CombatantId,
        /// Which status.
        status: StatusKind,
    },
    /// A status condition ended.
    StatusCured {
        /// Who was cured.
        target: CombatantId,
        /// Which status.
        status: StatusKind,
    },
    /// A battler tag was attached.
    TagAdded {
        /// Holder.
        target: CombatantId,
        /// Tag kind.
        tag: BattlerTagKind,
    },
    /// A battler tag was detached.
    TagRemoved {
        /// Former holder.
        target: CombatantId,
        /// Tag kind.
        tag: BattlerTagKind,
    },
    /// An arena tag was set.
    ArenaTagAdded {
        /// Tag kind.
        tag: ArenaTagKind,
        /// Covered part of the field.
        side: ArenaTagSide,
    },
    /// An arena tag expired.
    ArenaTagRemoved {
        /// Tag kind.
        tag: ArenaTagKind,
        /// Covered part of the field.
        side: ArenaTagSide,
    },
    /// The weather changed.
    WeatherChanged {
        /// New weather; `None` when it cleared.
        weather: Option<WeatherKind>,
    },
    /// An ability visibly took effect.
    AbilityShown {
        /// Holder.
        combatant: CombatantId,
        /// Ability.
        ability: AbilityId,
    },
    /// The battle ended.
    BattleEnded {
        /// Result.
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// Returns the primary combatant involved, if any.
    #[must_use]
    pub const fn primary_combatant(&self) -> Option<CombatantId> {
        match self {
            Self::Summoned { combatant, .. }
            | Self::Fainted { combatant }
            | Self::AbilityShown { combatant, .. } => Some(*combatant),
            Self::MoveUsed { user, .. } | Self::Missed { user, .. } => Some(*user),
            Self::Protected { target }
            | Self::NoEffect { target }
            | Self::Damaged { target, .. }
            | Self::Healed { target, .. }
            | Self::StatStageChanged { target, .. }
            | Self::StatusApplied { target, .. }
            | Self::StatusCured { target, .. }
            | Self::TagAdded { target, .. }
            | Self::TagRemoved { target, .. } => Some(*target),
            Self::Message { .. }
            | Self::TurnStarted { .. }
            | Self::ArenaTagAdded { .. }
            | Self::ArenaTagRemoved { .. }
            | Self::WeatherChanged { .. }
            | Self::BattleEnded { .. } => None,
        }
    }
}

/// An event with its position in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    sequence: u64,
    turn: u32,
    event: BattleEvent,
}

impl EventRecord {
    /// Returns the position in the log.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the turn the event happened on.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Returns the event.
    #[must_use]
    pub const fn event(&self) -> &BattleEvent {
        &self.event
    }
}

/// Append-only record of a battle.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
    next_sequence: u64,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, turn: u32, event: BattleEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.records.push(EventRecord {
            sequence,
            turn,
            event,
        });
    }

    /// Returns every record still in the log.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Iterates the events still in the log.
    pub fn events(&self) -> impl Iterator<Item = &BattleEvent> {
        self.records.iter().map(EventRecord::event)
    }

    /// Iterates message text still in the log.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.events().filter_map(|e| match e {
            BattleEvent::Message { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Removes and returns every record. Sequence numbers keep counting.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    /// Returns the number of records in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
