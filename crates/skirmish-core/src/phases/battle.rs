//! Phases that open and close a battle and bring combatants onto the field.

use tracing::{debug, trace, warn};

use crate::ability::dispatch::apply_post_summon_ab_attrs;
use crate::combatant::{CombatantId, Side};
use crate::engine::{BattleOutcome, EngineContext};
use crate::event::BattleEvent;
use crate::phase::{AnimationCue, Await, Phase, PhaseKind, PhaseStatus, ResumeSignal};

use super::order_by_priority_and_speed;

// =============================================================================
// Battle start
// =============================================================================

/// Sends out each side's leads, then runs their on-entry abilities fastest first.
#[derive(Debug, Default)]
pub struct BattleStartPhase;

impl BattleStartPhase {
    /// Creates the phase.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Phase for BattleStartPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::BattleStart
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        let per_side = ctx.field.active_per_side();
        let leads: Vec<(CombatantId, usize)> = Side::BOTH
            .into_iter()
            .flat_map(|side| {
                ctx.field
                    .bench(side)
                    .into_iter()
                    .take(per_side)
                    .enumerate()
                    .map(|(slot, id)| (id, slot))
            })
            .collect();

        ctx.queue.mark_insertion_point();
        for &(id, slot) in &leads {
            ctx.queue.unshift(Box::new(SummonPhase::lead(id, slot)));
        }
        let entries: Vec<(CombatantId, i8)> = leads.iter().map(|&(id, _)| (id, 0)).collect();
        for id in order_by_priority_and_speed(ctx, &entries) {
            ctx.queue.unshift(Box::new(PostSummonPhase::new(id)));
        }
        debug!(leads = leads.len(), "battle started");
        PhaseStatus::Done
    }
}

// =============================================================================
// Summon
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Entrant {
    Known(CombatantId),
    FirstBenched(Side),
}

/// Puts a combatant into a field slot.
///
/// A lead's on-entry abilities are queued by [`BattleStartPhase`] in speed
/// order; any other summon queues its own [`PostSummonPhase`] once the
/// entry animation finished.
#[derive(Debug)]
pub struct SummonPhase {
    entrant: Entrant,
    slot: usize,
    lead: bool,
    summoned: Option<CombatantId>,
}

impl SummonPhase {
    /// Summons `combatant` into `slot` mid-battle.
    #[must_use]
    pub fn new(combatant: CombatantId, slot: usize) -> Self {
        Self {
            entrant: Entrant::Known(combatant),
            slot,
            lead: false,
            summoned: None,
        }
    }

    /// Summons a lead at battle start.
    #[must_use]
    pub fn lead(combatant: CombatantId, slot: usize) -> Self {
        Self {
            lead: true,
            ..Self::new(combatant, slot)
        }
    }

    /// Summons whoever is first on `side`'s bench when the phase runs.
    #[must_use]
    pub fn replacement(side: Side, slot: usize) -> Self {
        Self {
            entrant: Entrant::FirstBenched(side),
            slot,
            lead: false,
            summoned: None,
        }
    }
}

impl Phase for SummonPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Summon
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        let id = match self.entrant {
            Entrant::Known(id) => Some(id),
            Entrant::FirstBenched(side) => ctx.field.bench(side).first().copied(),
        };
        let Some(id) = id else {
            trace!(slot = self.slot, "nobody left to send out");
            return PhaseStatus::Done;
        };
        if !ctx.field.summon(id, self.slot) {
            warn!(%id, slot = self.slot, "summon failed");
            return PhaseStatus::Done;
        }
        self.summoned = Some(id);

        let name = ctx.field.name_of(id);
        let text = match ctx.field.get(id).map(|c| c.side()) {
            Some(Side::Enemy) => format!("The foe sent out {name}!"),
            _ => format!("Go! {name}!"),
        };
        ctx.message(text);
        ctx.emit(BattleEvent::Summoned {
            combatant: id,
            slot: self.slot,
        });
        debug!(%id, slot = self.slot, "summoned");
        PhaseStatus::Await(Await::Animation(AnimationCue::Summon { combatant: id }))
    }

    fn resume(&mut self, ctx: &mut EngineContext, _signal: ResumeSignal) -> PhaseStatus {
        if let (false, Some(id)) = (self.lead, self.summoned) {
            ctx.queue.unshift(Box::new(PostSummonPhase::new(id)));
        }
        PhaseStatus::Done
    }

    fn combatant(&self) -> Option<CombatantId> {
        match self.entrant {
            Entrant::Known(id) => Some(id),
            Entrant::FirstBenched(_) => self.summoned,
        }
    }
}

/// Runs a combatant's on-entry abilities.
#[derive(Debug)]
pub struct PostSummonPhase {
    combatant: CombatantId,
}

impl PostSummonPhase {
    /// Creates the phase.
    #[must_use]
    pub fn new(combatant: CombatantId) -> Self {
        Self { combatant }
    }
}

impl Phase for PostSummonPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::PostSummon
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        if ctx.field.is_active(self.combatant) {
            apply_post_summon_ab_attrs(ctx, self.combatant, false);
        }
        PhaseStatus::Done
    }

    fn combatant(&self) -> Option<CombatantId> {
        Some(self.combatant)
    }
}

// =============================================================================
// Battle end
// =============================================================================

/// Records the outcome and drops everything still queued.
#[derive(Debug)]
pub struct BattleEndPhase {
    outcome: BattleOutcome,
}

impl BattleEndPhase {
    /// Creates the phase.
    #[must_use]
    pub fn new(outcome: BattleOutcome) -> Self {
        Self { outcome }
    }
}

impl Phase for BattleEndPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::BattleEnd
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        if ctx.outcome.is_some() {
            return PhaseStatus::Done;
        }
        ctx.outcome = Some(self.outcome);
        let text = match self.outcome {
            BattleOutcome::Victory(side) => format!("The {side} side won the battle!"),
            BattleOutcome::Draw => "The battle ended in a draw!".to_string(),
        };
        ctx.message(text);
        ctx.emit(BattleEvent::BattleEnded {
            outcome: self.outcome,
        });
        ctx.queue.clear();
        debug!(outcome = %self.outcome, turn = ctx.turn, "battle ended");
        PhaseStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::CombatantTemplate;
    use crate::config::BattleConfig;
    use crate::field::Field;
    use crate::phases::MessagePhase;

    fn context(active_per_side: usize, per_side: usize) -> EngineContext {
        let mut field = Field::new(active_per_side);
        for side in Side::BOTH {
            for i in 0..per_side {
                field.spawn(CombatantTemplate::new(format!("{side} {i}"), side, 50));
            }
        }
        EngineContext::new(
            BattleConfig::default().with_active_per_side(active_per_side),
            field,
        )
    }

    #[test]
    fn battle_start_queues_one_summon_per_slot() {
        let mut ctx = context(2, 3);
        BattleStartPhase::new().start(&mut ctx);
        assert_eq!(ctx.queue.prepended_len(), 8);
        assert!(ctx.field.all_active().is_empty());
    }

    #[test]
    fn summon_places_and_waits_for_the_animation() {
        let mut ctx = context(1, 1);
        let id = ctx.field.bench(Side::Player)[0];
        let mut phase = SummonPhase::new(id, 0);
        let status = phase.start(&mut ctx);
        assert_eq!(
            status,
            PhaseStatus::Await(Await::Animation(AnimationCue::Summon { combatant: id }))
        );
        assert!(ctx.field.is_active(id));
        assert_eq!(phase.resume(&mut ctx, ResumeSignal::Completed), PhaseStatus::Done);
        assert_eq!(ctx.queue.prepended_len(), 1);
    }

    #[test]
    fn replacement_with_an_empty_bench_does_nothing() {
        let mut ctx = context(1, 1);
        let id = ctx.field.bench(Side::Enemy)[0];
        assert!(ctx.field.summon(id, 0));
        let mut phase = SummonPhase::replacement(Side::Enemy, 0);
        assert_eq!(phase.start(&mut ctx), PhaseStatus::Done);
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn battle_end_clears_the_queue_once() {
        let mut ctx = context(1, 1);
        ctx.queue.push(Box::new(MessagePhase::new("never shown")), false);
        BattleEndPhase::new(BattleOutcome::Draw).start(&mut ctx);
        assert_eq!(ctx.outcome, Some(BattleOutcome::Draw));
        assert!(ctx.queue.is_empty());

        BattleEndPhase::new(BattleOutcome::Victory(Side::Player)).start(&mut ctx);
        assert_eq!(ctx.outcome, Some(BattleOutcome::Draw));
    }
}
