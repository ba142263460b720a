//! Move attribute dispatch.
//!
//! Effect fragments run in declaration order. Each one is gated by its
//! trigger and scoping flags, then by [`EffectAttr::can_apply`], then by its
//! effect chance. The chance is computed per fragment:
//!
//! 1. Start from the fragment's override, or the move's own chance. A move
//!    without a chance has guaranteed effects and skips the rest.
//! 2. Apply the user's [`MoveEffectChanceMultiplier`] attributes.
//! 3. Unless the fragment affects the user, apply the target's
//!    [`IgnoreMoveEffects`] attributes.
//! 4. Apply arena tag multipliers covering the user's side.
//! 5. Clamp to `[0, 100]`.
//!
//! [`MoveEffectChanceMultiplier`]: crate::ability::MoveEffectChanceMultiplier
//! [`IgnoreMoveEffects`]: crate::ability::IgnoreMoveEffects

use tracing::trace;

use crate::ability::dispatch::{apply_effect_chance_ab_attrs, has_ab_attr};
use crate::ability::AbAttrKind;
use crate::combatant::{CombatantId, MoveOutcome};
use crate::engine::EngineContext;
use crate::holder::NumberHolder;
use crate::moves::{
    EffectApplication, EffectAttr, EffectTrigger, HitFlags, Move, MoveAttr, MoveCondition,
    MoveEffectAttr, MultiHitKind,
};

/// Accuracy value meaning "never misses".
pub const SURE_HIT: f64 = -1.0;

/// Highest protection streak whose odds are tracked; longer streaks keep the same odds.
const MAX_PROTECT_STREAK: u32 = 6;

/// Computes the chance a fragment fires, or `None` if it is guaranteed.
pub fn effect_chance(
    ctx: &mut EngineContext,
    attr: &MoveEffectAttr,
    user: CombatantId,
    target: CombatantId,
    mv: &Move,
    simulated: bool,
) -> Option<f64> {
    let base = attr.chance_override.or_else(|| mv.chance())?;
    let mut chance = NumberHolder::new(f64::from(base));
    apply_effect_chance_ab_attrs(
        ctx,
        AbAttrKind::MoveEffectChanceMultiplier,
        user,
        mv,
        &mut chance,
        simulated,
    );
    if !attr.is_self_target() {
        apply_effect_chance_ab_attrs(
            ctx,
            AbAttrKind::IgnoreMoveEffects,
            target,
            mv,
            &mut chance,
            simulated,
        );
    }
    if let Some(side) = ctx.field.get(user).map(|c| c.side()) {
        for tag in ctx.field.arena_tags_covering(side) {
            tag.apply_chance_multiplier(&mut chance);
        }
    }
    chance.clamp(0.0, 100.0);
    Some(chance.value)
}

/// Rolls a resolved effect chance. Guaranteed and certain effects draw nothing.
pub fn roll_effect_chance(ctx: &mut EngineContext, chance: Option<f64>) -> bool {
    match chance {
        None => true,
        Some(c) if c >= 100.0 => true,
        Some(c) if c <= 0.0 => false,
        Some(c) => f64::from(ctx.rng.random_int(100)) < c,
    }
}

/// Applies every effect fragment of `mv` that fires on `trigger` at this strike.
///
/// # Arguments
///
/// * `damage` - Damage this strike dealt to `target`, for recoil and drain
///
/// Returns `true` if any fragment applied.
pub fn apply_move_effects(
    ctx: &mut EngineContext,
    trigger: EffectTrigger,
    user: CombatantId,
    target: CombatantId,
    mv: &Move,
    hit: HitFlags,
    damage: u32,
) -> bool {
    let app = EffectApplication {
        user,
        target,
        mv,
        damage,
    };
    let mut applied = false;
    for attr in mv.effect_attrs() {
        if !attr.fires_on(trigger, hit) || !attr.can_apply(ctx, &app) {
            continue;
        }
        let chance = effect_chance(ctx, attr, user, target, mv, false);
        if !roll_effect_chance(ctx, chance) {
            trace!(move_id = %mv.id(), ?chance, "effect chance failed");
            continue;
        }
        applied |= attr.apply(ctx, &app);
    }
    applied
}

/// Runs the move's accuracy rewrites over `accuracy`. Returns `true` if any fired.
pub fn apply_variable_accuracy(
    ctx: &EngineContext,
    user: CombatantId,
    target: CombatantId,
    mv: &Move,
    accuracy: &mut NumberHolder,
) -> bool {
    let mut fired = false;
    for attr in mv.attrs().iter().filter_map(MoveAttr::as_variable_accuracy) {
        fired |= attr.apply_accuracy(ctx, user, target, accuracy);
    }
    fired
}

/// Rolls how many times `mv` strikes this use.
pub fn roll_hit_count(ctx: &mut EngineContext, user: CombatantId, mv: &Move) -> u32 {
    let kind = mv.attrs().iter().find_map(|a| match a {
        MoveAttr::MultiHit(kind) => Some(*kind),
        _ => None,
    });
    match kind {
        None => 1,
        Some(MultiHitKind::Fixed(n)) => n.max(1),
        Some(MultiHitKind::TwoToFive) => {
            if has_ab_attr(&ctx.field, user, AbAttrKind::MaxMultiHit) {
                return 5;
            }
            match ctx.rng.random_int(20) {
                0..=6 => 2,
                7..=13 => 3,
                14..=16 => 4,
                _ => 5,
            }
        }
    }
}

/// Counts the user's consecutive successful protections, most recent first.
fn protect_streak(ctx: &EngineContext, user: CombatantId) -> u32 {
    let Some(c) = ctx.field.get(user) else {
        return 0;
    };
    let streak = c
        .history()
        .iter()
        .rev()
        .take_while(|record| {
            record.outcome == MoveOutcome::Success
                && c.slot_of(&record.move_id)
                    .and_then(|slot| c.move_slot(slot))
                    .is_some_and(|slot| slot.mv().is_protection())
        })
        .count();
    u32::try_from(streak).unwrap_or(u32::MAX)
}

/// Checks the move's preconditions. Returns `false` if the move fails.
pub fn check_move_conditions(ctx: &mut EngineContext, user: CombatantId, mv: &Move) -> bool {
    for condition in mv.conditions() {
        let holds = match condition {
            MoveCondition::ProtectStreak => {
                let streak = protect_streak(ctx, user).min(MAX_PROTECT_STREAK);
                streak == 0 || ctx.rng.random_int(3u32.pow(streak)) == 0
            }
            MoveCondition::FirstTurnOnly => ctx
                .field
                .get(user)
                .is_some_and(|c| c.turns_on_field() == 0),
            MoveCondition::UserNotFullHp => {
                ctx.field.get(user).is_some_and(|c| !c.is_full_hp())
            }
        };
        if !holds {
            trace!(move_id = %mv.id(), ?condition, "move condition failed");
            return false;
        }
    }
    true
}
