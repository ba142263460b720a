//! The battle driver: engine context plus the phase step loop.
//!
//! [`EngineContext`] is the explicit value every phase and dispatch call
//! receives. It owns the phase queue, the RNG service, the field, the event
//! log and the turn bookkeeping, so nothing in the crate reaches for global
//! state.
//!
//! [`Engine`] wraps a context and drives it:
//! 1. **ADVANCE**: Ask the queue for the next phase (or the restored standby)
//! 2. **RUN**: Check the phase out and start or resume it against the context
//! 3. **ANSWER**: Command requests the policy owns are answered in place
//! 4. **SETTLE**: Check the phase back in; a suspended phase makes the engine
//!    wait for the caller
//!
//! # Presentation contract
//!
//! [`Engine::run`] loops until the battle ends or a phase waits on the
//! presentation collaborator. The caller plays the animation, shows the
//! message or picks the command, then calls [`Engine::resume`].
//! [`Engine::run_headless`] answers every wait itself.
//!
//! # Example
//!
//! ```
//! use skirmish_core::catalog::Catalog;
//! use skirmish_core::combatant::{CombatantTemplate, Side};
//! use skirmish_core::config::BattleConfig;
//! use skirmish_core::engine::{BattleOutcome, Engine};
//!
//! let catalog = Catalog::standard();
//! let roster = vec![
//!     CombatantTemplate::new("Hero", Side::Player, 60)
//!         .with_move(catalog.move_by_id("tackle").unwrap()),
//!     CombatantTemplate::new("Foe", Side::Enemy, 5)
//!         .with_move(catalog.move_by_id("growl").unwrap()),
//! ];
//!
//! let mut engine = Engine::new(BattleConfig::default().with_seed(7), roster).unwrap();
//! let outcome = engine.run_headless();
//! assert_eq!(outcome, BattleOutcome::Victory(Side::Player));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::ai::{CommandPolicy, ScoringPolicy};
use crate::combatant::{CombatantId, CombatantTemplate, Side};
use crate::config::{BattleConfig, ControlMode};
use crate::error::EngineError;
use crate::event::{BattleEvent, EventLog, EventRecord};
use crate::field::Field;
use crate::phase::{Await, Command, Phase, PhaseStatus, ResumeSignal};
use crate::phases::{BattleStartPhase, TurnInitPhase};
use crate::queue::{Advance, Checkin, PhaseQueue};
use crate::rng::BattleRng;

/// Most moves a combatant may know.
pub const MAX_MOVES: usize = 4;

// =============================================================================
// Outcome
// =============================================================================

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    /// One side has combatants left.
    Victory(Side),
    /// Neither side won: both were wiped out together or the turn limit hit.
    Draw,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleOutcome::Victory(side) => write!(f, "{side} side wins"),
            BattleOutcome::Draw => f.write_str("draw"),
        }
    }
}

// =============================================================================
// Engine context
// =============================================================================

/// Everything a phase or effect fragment may read or write.
pub struct EngineContext {
    pub(crate) queue: PhaseQueue,
    pub(crate) rng: BattleRng,
    pub(crate) field: Field,
    pub(crate) log: EventLog,
    pub(crate) config: BattleConfig,
    pub(crate) turn: u32,
    pub(crate) commands: BTreeMap<CombatantId, Command>,
    pub(crate) outcome: Option<BattleOutcome>,
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("turn", &self.turn)
            .field("queue", &self.queue)
            .field("rng", &self.rng)
            .field("field", &self.field)
            .field("events", &format!("[{} events]", self.log.len()))
            .field("commands", &self.commands)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl EngineContext {
    /// Creates a context around an assembled field.
    ///
    /// The queue starts empty; its default turn-start phase is
    /// [`TurnInitPhase`].
    #[must_use]
    pub fn new(config: BattleConfig, field: Field) -> Self {
        Self {
            queue: PhaseQueue::new(|| Box::new(TurnInitPhase::new())),
            rng: BattleRng::new(config.seed),
            field,
            log: EventLog::new(),
            config,
            turn: 0,
            commands: BTreeMap::new(),
            outcome: None,
        }
    }

    /// Returns the field.
    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Returns the field mutably.
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    /// Returns the phase queue.
    #[must_use]
    pub fn queue(&self) -> &PhaseQueue {
        &self.queue
    }

    /// Returns the phase queue mutably, for phases defined outside this crate.
    pub fn queue_mut(&mut self) -> &mut PhaseQueue {
        &mut self.queue
    }

    /// Returns the RNG service.
    pub fn rng_mut(&mut self) -> &mut BattleRng {
        &mut self.rng
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Returns the current turn (0 before the first turn starts).
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Returns the outcome once the battle has ended.
    #[must_use]
    pub const fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    /// Returns the command queued for a combatant this turn.
    #[must_use]
    pub fn command(&self, combatant: CombatantId) -> Option<Command> {
        self.commands.get(&combatant).copied()
    }

    /// Returns the event log.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.log
    }

    /// Removes and returns every logged event.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.log.drain()
    }

    /// Records an event for the presentation layer.
    pub fn emit(&mut self, event: BattleEvent) {
        trace!(turn = self.turn, ?event, "event");
        self.log.push(self.turn, event);
    }

    /// Queues a message for the presentation layer.
    pub fn message(&mut self, text: String) {
        self.emit(BattleEvent::Message { text });
    }

    /// Returns a combatant's display name.
    #[must_use]
    pub fn name_of(&self, id: CombatantId) -> String {
        self.field.name_of(id)
    }

    /// Returns `true` if the engine's policy picks this combatant's commands.
    #[must_use]
    pub fn policy_controls(&self, combatant: CombatantId) -> bool {
        match self.field.get(combatant).map(|c| c.side()) {
            Some(Side::Enemy) => true,
            Some(Side::Player) => self.config.player_control == ControlMode::Ai,
            None => false,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Where the driver stands between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// The next phase can run.
    Ready,
    /// The current phase waits on the caller.
    Awaiting(Await),
    /// The battle is over.
    Finished(BattleOutcome),
}

/// Drives a battle one phase at a time.
pub struct Engine {
    ctx: EngineContext,
    state: EngineState,
    /// Await of a phase preempted by an override, surfaced again on restore.
    parked: Option<Await>,
    policy: Box<dyn CommandPolicy>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("parked", &self.parked)
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Assembles a battle from a configuration and a roster.
    ///
    /// Combatants are spawned in roster order, so the first entry of each
    /// side leads. The battle-start phase is queued; nothing runs until
    /// [`Engine::run`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the configuration is invalid,
    /// [`EngineError::EmptyRoster`] if a side has nobody, and
    /// [`EngineError::InvalidCombatant`] for malformed entries.
    pub fn new(config: BattleConfig, roster: Vec<CombatantTemplate>) -> Result<Self, EngineError> {
        config.validate()?;
        for side in Side::BOTH {
            if !roster.iter().any(|t| t.side == side) {
                return Err(EngineError::EmptyRoster(side));
            }
        }

        let mut field = Field::new(config.active_per_side);
        for template in roster {
            validate_template(&template)?;
            field.spawn(template);
        }
        debug!(
            seed = config.seed,
            active_per_side = config.active_per_side,
            player = field.roster_size(Side::Player),
            enemy = field.roster_size(Side::Enemy),
            "battle assembled"
        );

        let mut ctx = EngineContext::new(config, field);
        ctx.queue.push(Box::new(BattleStartPhase::new()), false);
        Ok(Self {
            ctx,
            state: EngineState::Ready,
            parked: None,
            policy: Box::new(ScoringPolicy::new()),
        })
    }

    /// Replaces the command policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Box<dyn CommandPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the context.
    #[must_use]
    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Returns the context mutably, for setup and inspection between calls.
    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    /// Returns the field.
    #[must_use]
    pub fn field(&self) -> &Field {
        &self.ctx.field
    }

    /// Returns the event log.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.ctx.log
    }

    /// Removes and returns every logged event.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.ctx.drain_events()
    }

    /// Returns where the driver stands.
    #[must_use]
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    /// Returns the current turn.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.ctx.turn
    }

    /// Runs phases until the battle ends or a phase waits on the caller.
    pub fn run(&mut self) -> &EngineState {
        while self.state == EngineState::Ready {
            self.step();
        }
        &self.state
    }

    /// Continues the waiting phase with `signal`, then keeps running.
    ///
    /// Returns `false`, changing nothing, if no phase is waiting.
    pub fn resume(&mut self, signal: ResumeSignal) -> bool {
        if !matches!(self.state, EngineState::Awaiting(_)) {
            warn!(state = ?self.state, ?signal, "resume without a waiting phase");
            return false;
        }
        let Some(mut phase) = self.ctx.queue.checkout() else {
            warn!(?signal, "waiting phase missing from the queue");
            return false;
        };
        trace!(phase = ?phase, ?signal, turn = self.ctx.turn, "phase resumed");
        let status = phase.resume(&mut self.ctx, signal);
        self.settle(phase, status);
        self.check_finished();
        self.run();
        true
    }

    /// Preempts the current phase with `phase`.
    ///
    /// The preempted phase goes on standby and is restored, still waiting
    /// on whatever it waited for, once `phase` and everything it queued
    /// ahead of the queue's front has run. Returns `false` if an override is
    /// already in effect or the battle is over.
    pub fn override_phase(&mut self, phase: Box<dyn Phase>) -> bool {
        if matches!(self.state, EngineState::Finished(_)) {
            return false;
        }
        if !self.ctx.queue.override_phase(phase) {
            return false;
        }
        if let EngineState::Awaiting(waiting) =
            std::mem::replace(&mut self.state, EngineState::Ready)
        {
            self.parked = Some(waiting);
        }
        if let Some(mut current) = self.ctx.queue.checkout() {
            debug!(phase = ?current, turn = self.ctx.turn, "override started");
            let status = current.start(&mut self.ctx);
            self.settle(current, status);
        }
        self.check_finished();
        true
    }

    /// Runs the battle to the end, answering every wait itself.
    ///
    /// Animations and messages complete immediately and command requests
    /// go to the policy regardless of the control mode.
    pub fn run_headless(&mut self) -> BattleOutcome {
        loop {
            let signal = match self.run().clone() {
                EngineState::Finished(outcome) => return outcome,
                EngineState::Ready => continue,
                EngineState::Awaiting(Await::Command { combatant }) => {
                    ResumeSignal::Command(self.policy.choose(&mut self.ctx, combatant))
                }
                EngineState::Awaiting(_) => ResumeSignal::Completed,
            };
            self.resume(signal);
        }
    }

    /// Advances the queue and runs the phase it made current.
    fn step(&mut self) {
        let advance = self.ctx.queue.advance(&self.ctx.field);
        let Some(mut phase) = self.ctx.queue.checkout() else {
            warn!("queue advanced without a current phase");
            return;
        };
        let status = match advance {
            Advance::Resumed => match self.parked.take() {
                Some(waiting) => {
                    trace!(phase = ?phase, ?waiting, "standby phase restored");
                    PhaseStatus::Await(waiting)
                }
                None => phase.resume(&mut self.ctx, ResumeSignal::Restored),
            },
            Advance::Started => {
                trace!(phase = ?phase, turn = self.ctx.turn, "phase started");
                phase.start(&mut self.ctx)
            }
        };
        self.settle(phase, status);
        self.check_finished();
    }

    /// Answers policy-owned command requests, then checks the phase back in.
    fn settle(&mut self, mut phase: Box<dyn Phase>, status: PhaseStatus) {
        let status = self.answer_commands(phase.as_mut(), status);
        let finished = status == PhaseStatus::Done;
        match self.ctx.queue.checkin(phase, finished) {
            Checkin::Retired => self.state = EngineState::Ready,
            Checkin::Current => {
                if let PhaseStatus::Await(waiting) = status {
                    self.state = EngineState::Awaiting(waiting);
                }
            }
            Checkin::Overridden => {
                if let PhaseStatus::Await(waiting) = status {
                    self.parked = Some(waiting);
                }
                self.state = EngineState::Ready;
                if let Some(mut next) = self.ctx.queue.checkout() {
                    debug!(phase = ?next, turn = self.ctx.turn, "override started");
                    let status = next.start(&mut self.ctx);
                    self.settle(next, status);
                }
            }
        }
    }

    fn answer_commands(&mut self, phase: &mut dyn Phase, mut status: PhaseStatus) -> PhaseStatus {
        while let PhaseStatus::Await(Await::Command { combatant }) = status {
            if !self.ctx.policy_controls(combatant) {
                break;
            }
            let command = self.policy.choose(&mut self.ctx, combatant);
            debug!(%combatant, ?command, "policy chose a command");
            status = phase.resume(&mut self.ctx, ResumeSignal::Command(command));
        }
        status
    }

    fn check_finished(&mut self) {
        if let Some(outcome) = self.ctx.outcome {
            self.state = EngineState::Finished(outcome);
        }
    }
}

fn validate_template(template: &CombatantTemplate) -> Result<(), EngineError> {
    let invalid = |reason: &str| EngineError::InvalidCombatant {
        name: template.name.clone(),
        reason: reason.to_string(),
    };
    if !(1..=100).contains(&template.level) {
        return Err(invalid("level must be between 1 and 100"));
    }
    if template.types.is_empty() || template.types.len() > 2 {
        return Err(invalid("must have one or two types"));
    }
    if template.moves.is_empty() || template.moves.len() > MAX_MOVES {
        return Err(invalid("must know between one and four moves"));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
