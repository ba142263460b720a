//! Command policies: who picks a combatant's move when no one else does.
//!
//! - [`FirstUsableMove`]: The first slot with PP left, aimed wherever the move decides
//! - [`ScoringPolicy`]: Scores every usable move against every candidate target
//!
//! # Architecture
//!
//! Policies only ever read the battle. Scoring goes through the same damage
//! and immunity code the battle runs, called with `simulated = true`, so it
//! draws no randomness and writes no state: asking the policy never changes
//! how the battle plays out.

use tracing::{trace, warn};

use crate::combatant::{BattlerTagKind, Combatant, CombatantId, StatusKind};
use crate::damage::{calculate_damage, Strike};
use crate::effects::try_set_status;
use crate::engine::EngineContext;
use crate::hit::move_effectiveness;
use crate::holder::BoolHolder;
use crate::moves::{Move, MoveEffect, MoveEffectAttr, MoveTarget};
use crate::phase::Command;

/// Picks the command for a combatant the caller does not control.
pub trait CommandPolicy {
    /// Chooses a command for `combatant`.
    fn choose(&self, ctx: &mut EngineContext, combatant: CombatantId) -> Command;
}

// =============================================================================
// First usable move
// =============================================================================

/// Uses the first move with PP left, or passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstUsableMove;

impl CommandPolicy for FirstUsableMove {
    fn choose(&self, ctx: &mut EngineContext, combatant: CombatantId) -> Command {
        ctx.field
            .get(combatant)
            .and_then(|c| c.usable_slots().first().copied())
            .map_or(Command::Pass, |slot| Command::UseMove { slot, target: None })
    }
}

// =============================================================================
// Scoring
// =============================================================================

/// Score of a move that can do nothing to its target.
const USELESS: i32 = -20;

/// Picks the highest-scoring (move, target) pair.
///
/// Damaging moves score the share of the target's remaining HP they would
/// take. Status moves score the conditions they would inflict, weighted by
/// [`ScoringPolicy::status_score`] and [`ScoringPolicy::tag_score`]. Ties go
/// to the lower slot, then to the first target in field order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoringPolicy;

impl ScoringPolicy {
    /// Creates the policy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Benefit of inflicting a status condition on an opponent.
    #[must_use]
    pub const fn status_score(kind: StatusKind) -> i32 {
        match kind {
            StatusKind::Sleep | StatusKind::Freeze => 40,
            StatusKind::Paralysis | StatusKind::Toxic => 30,
            StatusKind::Burn => 25,
            StatusKind::Poison => 20,
        }
    }

    /// Benefit of attaching a battler tag, or `None` if the kind has no weight.
    #[must_use]
    pub const fn tag_score(kind: BattlerTagKind) -> Option<i32> {
        match kind {
            BattlerTagKind::Confused => Some(25),
            BattlerTagKind::LockOn => Some(15),
            BattlerTagKind::AbilitySuppressed => Some(15),
            BattlerTagKind::Telekinesis | BattlerTagKind::Exposed => Some(10),
            BattlerTagKind::Flinched => Some(5),
            _ => None,
        }
    }

    fn candidates(ctx: &EngineContext, user: CombatantId, mv: &Move) -> Vec<Option<CombatantId>> {
        match mv.target() {
            MoveTarget::NearEnemy | MoveTarget::NearOther | MoveTarget::RandomNearEnemy => {
                ctx.field.opponents_of(user).into_iter().map(Some).collect()
            }
            MoveTarget::NearAlly => ctx.field.allies_of(user).into_iter().map(Some).collect(),
            _ => vec![None],
        }
    }

    fn score(ctx: &mut EngineContext, user: CombatantId, mv: &Move, target: Option<CombatantId>) -> i32 {
        let targets = match (target, mv.target()) {
            (Some(t), _) => vec![t],
            (None, MoveTarget::AllNearEnemies) => ctx.field.opponents_of(user),
            (None, MoveTarget::AllNearOthers) => {
                let mut all = ctx.field.opponents_of(user);
                all.extend(ctx.field.allies_of(user));
                all
            }
            (None, _) => vec![user],
        };

        let mut total = 0;
        for &t in &targets {
            if !mv.is_status() {
                total += Self::damage_score(ctx, user, mv, t, targets.len() > 1);
            }
            for attr in mv.effect_attrs() {
                let recipient = if attr.is_self_target() { user } else { t };
                let chance = attr.chance_override.or_else(|| mv.chance()).unwrap_or(100);
                let score = Self::effect_score(ctx, user, recipient, attr);
                // Chance-gated effects count in proportion; their failure costs nothing.
                total += if chance >= 100 {
                    score
                } else {
                    score.max(0) * i32::try_from(chance).unwrap_or(100) / 100
                };
            }
        }
        total
    }

    fn damage_score(ctx: &mut EngineContext, user: CombatantId, mv: &Move, target: CombatantId, spread: bool) -> i32 {
        let mut cancelled = BoolHolder::new(false);
        let effectiveness = move_effectiveness(ctx, user, mv, target, &mut cancelled, true);
        if effectiveness == 0.0 {
            return USELESS;
        }
        let result = calculate_damage(
            ctx,
            user,
            target,
            Strike {
                mv,
                effectiveness,
                spread: spread && mv.target().is_spread(),
            },
            true,
        );
        let hp = ctx.field.get(target).map_or(1, |c| c.hp().max(1));
        let share = (u64::from(result.damage) * 100 / u64::from(hp)).min(100);
        i32::try_from(share).unwrap_or(100)
    }

    fn effect_score(ctx: &mut EngineContext, user: CombatantId, recipient: CombatantId, attr: &MoveEffectAttr) -> i32 {
        let friendly = ctx.field.get(user).map(|c| c.side()) == ctx.field.get(recipient).map(|c| c.side());
        match &attr.effect {
            MoveEffect::Status(kind) => {
                if friendly {
                    return USELESS;
                }
                if try_set_status(ctx, recipient, *kind, Some(user), true) {
                    Self::status_score(*kind)
                } else {
                    USELESS
                }
            }
            MoveEffect::StatStages { stats, stages } => {
                let Some(c) = ctx.field.get(recipient) else {
                    return 0;
                };
                let room: i32 = stats
                    .iter()
                    .map(|s| i32::from(c.stages().headroom(*s, *stages).min(stages.abs())))
                    .sum();
                if room == 0 {
                    return USELESS;
                }
                let helpful = (*stages > 0) == friendly;
                if helpful {
                    room * 8
                } else {
                    -room * 8
                }
            }
            MoveEffect::AddTag(kind) => {
                let present = ctx.field.get(recipient).is_some_and(|c| c.has_tag(*kind));
                if present {
                    return USELESS;
                }
                Self::tag_score(*kind).unwrap_or_else(|| {
                    warn!(?kind, "no score for tag, treating it as neutral");
                    0
                })
            }
            MoveEffect::LockOn => Self::tag_score(BattlerTagKind::LockOn).unwrap_or(0),
            MoveEffect::Protect(_) => 5,
            MoveEffect::ArenaTag { kind, .. } => {
                let side = ctx.field.get(user).map(|c| c.side());
                let up = side.is_some_and(|s| ctx.field.has_arena_tag_covering(*kind, s));
                if up {
                    USELESS
                } else {
                    15
                }
            }
            MoveEffect::Weather(kind) => {
                if ctx.field.weather_kind() == Some(*kind) {
                    USELESS
                } else {
                    10
                }
            }
            MoveEffect::Heal { .. } => ctx.field.get(recipient).map_or(0, missing_hp_percent),
            MoveEffect::Recoil { .. } | MoveEffect::Drain { .. } => 0,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn missing_hp_percent(c: &Combatant) -> i32 {
    ((1.0 - c.hp_ratio()) * 100.0).round() as i32
}

impl CommandPolicy for ScoringPolicy {
    fn choose(&self, ctx: &mut EngineContext, combatant: CombatantId) -> Command {
        let Some(moves) = ctx.field.get(combatant).map(|c| {
            c.usable_slots()
                .into_iter()
                .filter_map(|slot| c.move_slot(slot).map(|s| (slot, s.mv().clone())))
                .collect::<Vec<_>>()
        }) else {
            return Command::Pass;
        };

        let mut best: Option<(i32, usize, Option<CombatantId>)> = None;
        for (slot, mv) in moves {
            for target in Self::candidates(ctx, combatant, &mv) {
                let score = Self::score(ctx, combatant, &mv, target);
                trace!(%combatant, move_id = %mv.id(), ?target, score, "scored");
                if best.map_or(true, |(b, ..)| score > b) {
                    best = Some((score, slot, target));
                }
            }
        }
        best.map_or(Command::Pass, |(_, slot, target)| Command::UseMove { slot, target })
    }
}
