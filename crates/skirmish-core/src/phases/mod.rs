//! Concrete phases of a battle.
//!
//! This module provides every phase the engine schedules on its own:
//!
//! - [`BattleStartPhase`]: Sends out the leads and queues their on-entry abilities
//! - [`SummonPhase`] / [`PostSummonPhase`]: One combatant entering the field
//! - [`TurnInitPhase`]: Default turn start; requests a command per active combatant
//! - [`CommandPhase`]: Waits for one combatant's command
//! - [`TurnStartPhase`]: Orders the turn's moves
//! - [`MovePhase`] / [`MoveEffectPhase`] / [`MoveEndPhase`]: One move, one strike at a time
//! - [`StatStageChangePhase`]: Applies a stage change through the stat-change abilities
//! - [`FaintPhase`]: Withdraws a fainted combatant and queues its replacement
//! - [`TurnEndPhase`]: Chip damage and lapsing of tags, arena tags and weather
//! - [`MessagePhase`]: Shows a message
//! - [`BattleEndPhase`]: Records the outcome and empties the queue
//!
//! # Architecture
//!
//! A turn is a chain of queue insertions. `TurnInit` pushes the command
//! phases and `TurnStart`; `TurnStart` pushes one `Move` per command and
//! `TurnEnd`; each `Move` unshifts its `MoveEffect` and `MoveEnd` behind an
//! insertion point, and every follow-up a strike causes (stat changes,
//! fainting, further strikes) is unshifted ahead of the rest of the turn.
//! Replacements for fainted combatants are deferred until the turn's queue
//! runs dry, so they enter before the next `TurnInit`.
//!
//! Phases that cannot find their combatant log a warning and finish
//! without touching the battle.

mod action;
mod battle;
mod faint;
mod message;
mod stat_stage;
mod turn;

pub use action::{MoveEffectPhase, MoveEndPhase, MovePhase};
pub use battle::{BattleEndPhase, BattleStartPhase, PostSummonPhase, SummonPhase};
pub use faint::FaintPhase;
pub use message::MessagePhase;
pub use stat_stage::StatStageChangePhase;
pub use turn::{CommandPhase, TurnEndPhase, TurnInitPhase, TurnStartPhase};

use crate::combatant::CombatantId;
use crate::engine::EngineContext;
use crate::stat::BattleStat;

/// Orders combatants by priority (highest first), then by effective speed.
///
/// Entries with equal priority and speed are shuffled from a stream keyed by
/// the turn, so tie order does not depend on draws made earlier in the turn.
/// Entries whose combatant is unknown are dropped.
pub(crate) fn order_by_priority_and_speed(
    ctx: &mut EngineContext,
    entries: &[(CombatantId, i8)],
) -> Vec<CombatantId> {
    // Speeds are compared on whole points.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut keyed: Vec<(CombatantId, i8, u32)> = entries
        .iter()
        .filter_map(|&(id, priority)| {
            let speed = ctx.field.get(id)?.effective_stat(BattleStat::Speed);
            Some((id, priority, speed.floor() as u32))
        })
        .collect();
    keyed.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));

    let turn = u64::from(ctx.turn) << 16;
    let mut start = 0;
    while start < keyed.len() {
        let key = (keyed[start].1, keyed[start].2);
        let end = keyed[start..]
            .iter()
            .position(|e| (e.1, e.2) != key)
            .map_or(keyed.len(), |n| start + n);
        if end - start > 1 {
            let offset = turn | start as u64;
            ctx.rng
                .with_seed_offset(offset, |rng| rng.shuffle(&mut keyed[start..end]));
        }
        start = end;
    }
    keyed.into_iter().map(|(id, ..)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{CombatantTemplate, Side};
    use crate::config::BattleConfig;
    use crate::field::Field;
    use crate::stat::BaseStats;

    fn racer(field: &mut Field, name: &str, speed: u32) -> CombatantId {
        field.spawn(
            CombatantTemplate::new(name, Side::Player, 50)
                .with_base(BaseStats::new(80, 80, 80, 80, 80, speed)),
        )
    }

    #[test]
    fn priority_beats_speed() {
        let mut field = Field::new(1);
        let slow = racer(&mut field, "Slow", 20);
        let fast = racer(&mut field, "Fast", 150);
        let mut ctx = EngineContext::new(BattleConfig::default(), field);
        let order = order_by_priority_and_speed(&mut ctx, &[(fast, 0), (slow, 1)]);
        assert_eq!(order, vec![slow, fast]);
    }

    #[test]
    fn faster_goes_first_within_a_bracket() {
        let mut field = Field::new(1);
        let slow = racer(&mut field, "Slow", 20);
        let fast = racer(&mut field, "Fast", 150);
        let mut ctx = EngineContext::new(BattleConfig::default(), field);
        let order = order_by_priority_and_speed(&mut ctx, &[(slow, 0), (fast, 0)]);
        assert_eq!(order, vec![fast, slow]);
    }

    #[test]
    fn speed_ties_are_reproducible_per_seed() {
        let build = || {
            let mut field = Field::new(1);
            let ids: Vec<_> = (0..4)
                .map(|i| racer(&mut field, &format!("Twin {i}"), 90))
                .collect();
            (EngineContext::new(BattleConfig::default().with_seed(11), field), ids)
        };
        let (mut a, ids) = build();
        let (mut b, _) = build();
        let entries: Vec<_> = ids.iter().map(|&id| (id, 0)).collect();
        let first = order_by_priority_and_speed(&mut a, &entries);
        let second = order_by_priority_and_speed(&mut b, &entries);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }
}
