//! Fainting: withdraw, then either send in a replacement or end the battle.

use tracing::{debug, warn};

use crate::combatant::CombatantId;
use crate::engine::{BattleOutcome, EngineContext};
use crate::event::BattleEvent;
use crate::phase::{AnimationCue, Await, Phase, PhaseKind, PhaseStatus, ResumeSignal};

use super::{BattleEndPhase, SummonPhase};

/// Handles a combatant that dropped to zero HP.
#[derive(Debug)]
pub struct FaintPhase {
    combatant: CombatantId,
    slot: Option<usize>,
}

impl FaintPhase {
    /// Creates the phase.
    #[must_use]
    pub fn new(combatant: CombatantId) -> Self {
        Self {
            combatant,
            slot: None,
        }
    }
}

impl Phase for FaintPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Faint
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        let Some(c) = ctx.field.get(self.combatant) else {
            warn!(combatant = %self.combatant, "faint phase for an untracked combatant");
            return PhaseStatus::Done;
        };
        if !c.is_on_field() {
            return PhaseStatus::Done;
        }
        self.slot = c.slot();
        let name = c.name().to_string();
        ctx.message(format!("{name} fainted!"));
        ctx.emit(BattleEvent::Fainted {
            combatant: self.combatant,
        });
        PhaseStatus::Await(Await::Animation(AnimationCue::Faint {
            combatant: self.combatant,
        }))
    }

    fn resume(&mut self, ctx: &mut EngineContext, _signal: ResumeSignal) -> PhaseStatus {
        let Some(side) = ctx.field.get(self.combatant).map(|c| c.side()) else {
            return PhaseStatus::Done;
        };
        ctx.field.withdraw(self.combatant);
        let id = self.combatant;
        let dropped = ctx
            .queue
            .remove_all(|p| p.kind() == PhaseKind::Move && p.combatant() == Some(id));
        debug!(combatant = %id, %side, dropped, "withdrawn after fainting");

        if ctx.field.remaining(side) > 0 {
            if let Some(slot) = self.slot {
                ctx.queue
                    .push(Box::new(SummonPhase::replacement(side, slot)), true);
            }
            return PhaseStatus::Done;
        }

        let ending = ctx.queue.find(|p| p.kind() == PhaseKind::BattleEnd);
        if !ending {
            let outcome = if ctx.field.remaining(side.opposite()) == 0 {
                BattleOutcome::Draw
            } else {
                BattleOutcome::Victory(side.opposite())
            };
            ctx.queue.unshift(Box::new(BattleEndPhase::new(outcome)));
        }
        PhaseStatus::Done
    }

    fn combatant(&self) -> Option<CombatantId> {
        Some(self.combatant)
    }
}
