//! Setup helpers for battle scenarios.

use std::cell::RefCell;
use std::rc::Rc;

use crate::catalog::Catalog;
use crate::combatant::{CombatantTemplate, Side};
use crate::config::BattleConfig;
use crate::engine::{Engine, EngineContext};
use crate::field::Field;
use crate::phase::{Phase, PhaseKind, PhaseStatus};

// =============================================================================
// Rosters
// =============================================================================

/// Builds a template that knows the given catalog moves.
///
/// # Panics
///
/// Panics if a move id is not in the standard catalog.
pub fn fighter(name: &str, side: Side, level: u32, moves: &[&str]) -> CombatantTemplate {
    let catalog = Catalog::standard();
    moves.iter().fold(CombatantTemplate::new(name, side, level), |t, id| {
        t.with_move(catalog.move_by_id(id).unwrap_or_else(|| panic!("no move {id}")))
    })
}

/// Builds a template with an ability from the standard catalog.
///
/// # Panics
///
/// Panics if an id is not in the standard catalog.
pub fn fighter_with(name: &str, side: Side, level: u32, ability: &str, moves: &[&str]) -> CombatantTemplate {
    let ability = Catalog::standard()
        .ability(ability)
        .unwrap_or_else(|| panic!("no ability {ability}"));
    fighter(name, side, level, moves).with_ability(ability)
}

/// A one-on-one battle between two Tackle users.
pub fn tackle_duel(seed: u64) -> Engine {
    Engine::new(
        BattleConfig::default().with_seed(seed),
        vec![
            fighter("Hero", Side::Player, 50, &["tackle", "growl"]),
            fighter("Foe", Side::Enemy, 50, &["tackle", "growl"]),
        ],
    )
    .expect("valid duel")
}

/// A two-on-two doubles battle with a mix of spread and single-target moves.
pub fn doubles(seed: u64) -> Engine {
    Engine::new(
        BattleConfig::default().with_seed(seed).with_active_per_side(2),
        vec![
            fighter("Ace", Side::Player, 50, &["rock_slide", "thunderbolt", "protect"]),
            fighter("Buddy", Side::Player, 48, &["surf", "ice_beam"]),
            fighter("Reserve", Side::Player, 45, &["tackle"]),
            fighter("Rival", Side::Enemy, 50, &["earthquake", "flamethrower"]),
            fighter("Grunt", Side::Enemy, 47, &["double_kick", "will_o_wisp"]),
        ],
    )
    .expect("valid doubles")
}

/// An engine context with a singles field and nobody on it.
pub fn empty_context() -> EngineContext {
    EngineContext::new(BattleConfig::default(), Field::new(1))
}

// =============================================================================
// Probe phases
// =============================================================================

/// Shared record of which probes started, in order.
pub type Trace = Rc<RefCell<Vec<usize>>>;

/// A phase that records its number when started.
pub struct Probe {
    id: usize,
    trace: Trace,
}

impl Probe {
    /// Creates a boxed probe.
    pub fn boxed(id: usize, trace: &Trace) -> Box<dyn Phase> {
        Box::new(Self {
            id,
            trace: Rc::clone(trace),
        })
    }
}

impl Phase for Probe {
    fn kind(&self) -> PhaseKind {
        PhaseKind::External("probe")
    }

    fn start(&mut self, _ctx: &mut EngineContext) -> PhaseStatus {
        self.trace.borrow_mut().push(self.id);
        PhaseStatus::Done
    }
}

/// Advances the context's queue `n` times, starting and retiring each phase.
///
/// # Panics
///
/// Panics if the queue hands out no phase.
pub fn step_queue(ctx: &mut EngineContext, n: usize) {
    for _ in 0..n {
        ctx.queue.advance(&ctx.field);
        let mut phase = ctx.queue.checkout().expect("a current phase");
        let status = phase.start(ctx);
        ctx.queue.checkin(phase, status == PhaseStatus::Done);
    }
}
