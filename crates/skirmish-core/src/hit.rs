//! Hit resolution: does one strike of a move connect with one target?
//!
//! [`hit_check`] walks a fixed list of decisions, each of which can end the
//! check early:
//!
//! 1. Moves aimed at the user or the field always hit with multiplier 1.
//! 2. A target that is not on the field is a silent no-effect.
//! 3. A target hidden by [`Commanding`](BattlerTagKind::Commanding) is missed.
//! 4. "Always hits" is computed from abilities, a lock-on aimed at this
//!    target, or the target's [`AlwaysGetHit`](BattlerTagKind::AlwaysGetHit) tag.
//! 5. A semi-invulnerable target the move does not pierce is missed, unless
//!    the move always hits.
//! 6. Field-level conditional protection, then the target's own protection.
//! 7. A zero type/ability multiplier is a no-effect.
//! 8. Later strikes of a committed multi-hit move connect, unless the move
//!    checks every strike and the user cannot force every strike.
//! 9. Moves that always hit, and moves against a target lifted by
//!    telekinesis (except one-hit KOs), connect.
//! 10. Otherwise one draw in `[0, 100)` against the modified accuracy.
//!
//! The only randomness is the single draw in step 10, so the same battle
//! state and RNG stream always give the same [`HitCheckEntry`].

use tracing::{trace, warn};

use crate::ability::dispatch::{
    apply_pre_defend_ab_attrs, apply_stat_multiplier_ab_attrs, has_ab_attr, ignores_opponent_stage,
};
use crate::ability::{AbAttrKind, DefendArgs};
use crate::combatant::{BattlerTagKind, CombatantId, LapseTrigger};
use crate::effects;
use crate::element::Element;
use crate::engine::EngineContext;
use crate::event::BattleEvent;
use crate::field::{ArenaTagKind, Field};
use crate::holder::{BoolHolder, NumberHolder};
use crate::moves::dispatch::{apply_variable_accuracy, SURE_HIT};
use crate::moves::{Accuracy, Move, MoveAttrKind, MoveFlags};
use crate::stat::{BattleStat, MAX_STAGE, MIN_STAGE};

/// Ability kinds consulted for a target's immunity multiplier.
const IMMUNITY_KINDS: &[AbAttrKind] = &[
    AbAttrKind::TypeImmunity,
    AbAttrKind::TypeImmunityHeal,
    AbAttrKind::TypeImmunityAddTag,
    AbAttrKind::TypeImmunityStatStageChange,
    AbAttrKind::MoveImmunity,
    AbAttrKind::FullHpResistType,
];

/// Outcome of resolving one strike against one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitCheckResult {
    /// Not resolved yet.
    Pending,
    /// The user could not be resolved; abort silently.
    Error,
    /// The strike connects.
    Hit,
    /// The target avoided it.
    Miss,
    /// A protection blocked it.
    Protected,
    /// The target is unaffected.
    NoEffect,
    /// The target is unaffected and something already said so.
    NoEffectSilent,
}

impl HitCheckResult {
    /// Returns `true` for outcomes that should abort the phase without a battle event.
    #[must_use]
    pub const fn is_unresolved(self) -> bool {
        matches!(self, HitCheckResult::Pending | HitCheckResult::Error)
    }
}

/// Result of one hit check: the outcome and the effectiveness multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCheckEntry {
    /// Outcome.
    pub result: HitCheckResult,
    /// Type/ability effectiveness multiplier.
    pub multiplier: f64,
}

impl HitCheckEntry {
    /// An entry not resolved yet.
    pub const PENDING: HitCheckEntry = HitCheckEntry::new(HitCheckResult::Pending, 0.0);

    /// Creates an entry.
    #[must_use]
    pub const fn new(result: HitCheckResult, multiplier: f64) -> Self {
        Self { result, multiplier }
    }

    const fn hit(multiplier: f64) -> Self {
        Self::new(HitCheckResult::Hit, multiplier)
    }

    const fn miss() -> Self {
        Self::new(HitCheckResult::Miss, 0.0)
    }

    /// Returns `true` if the strike connects.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.result == HitCheckResult::Hit
    }
}

/// Resolves one strike of `mv` from `user` against `target`.
///
/// # Arguments
///
/// * `hit_index` - Zero-based strike number within the move's multi-hit sequence
pub fn hit_check(
    ctx: &mut EngineContext,
    user: CombatantId,
    mv: &Move,
    target: CombatantId,
    hit_index: u32,
) -> HitCheckEntry {
    // 1
    if mv.target().skips_hit_check() {
        return HitCheckEntry::hit(1.0);
    }

    if ctx.field.get(user).is_none() {
        warn!(%user, move_id = %mv.id(), "hit check for an untracked user");
        return HitCheckEntry::new(HitCheckResult::Error, 0.0);
    }

    // 2
    let Some(defender) = ctx.field.get(target).filter(|c| c.is_on_field() && !c.is_fainted())
    else {
        return HitCheckEntry::new(HitCheckResult::NoEffectSilent, 0.0);
    };

    // 3
    if defender.has_tag(BattlerTagKind::Commanding) {
        return HitCheckEntry::miss();
    }

    // 4
    let always_hits = always_hits(ctx, user, target);

    // 5
    if let Some(tag) = semi_invulnerability(ctx, target) {
        if !mv.hits_tag(tag) && !always_hits {
            trace!(%target, ?tag, "target is out of reach");
            return HitCheckEntry::miss();
        }
    }

    // 6
    if protected_check(ctx, user, mv, target, false) {
        return HitCheckEntry::new(HitCheckResult::Protected, 0.0);
    }

    // 7
    let mut cancelled = BoolHolder::new(false);
    let multiplier = move_effectiveness(ctx, user, mv, target, &mut cancelled, false);
    if multiplier == 0.0 {
        let result = if cancelled.value {
            HitCheckResult::NoEffectSilent
        } else {
            HitCheckResult::NoEffect
        };
        return HitCheckEntry::new(result, 0.0);
    }

    // 8
    if hit_index > 0
        && (!mv.flags().contains(MoveFlags::CHECK_ALL_HITS)
            || has_ab_attr(&ctx.field, user, AbAttrKind::MaxMultiHit))
    {
        return HitCheckEntry::hit(multiplier);
    }

    // 9
    let lifted = ctx
        .field
        .get(target)
        .is_some_and(|c| c.has_tag(BattlerTagKind::Telekinesis));
    if always_hits || (lifted && !mv.has_attr(MoveAttrKind::OneHitKo)) {
        return HitCheckEntry::hit(multiplier);
    }

    // 10
    let Some(accuracy) = move_accuracy(ctx, user, mv, target) else {
        return HitCheckEntry::hit(multiplier);
    };
    let threshold = accuracy * accuracy_multiplier(ctx, user, mv, target, false);
    let roll = ctx.rng.random_int(100);
    trace!(%user, %target, roll, threshold, "accuracy roll");
    if f64::from(roll) < threshold {
        HitCheckEntry::hit(multiplier)
    } else {
        HitCheckEntry::miss()
    }
}

fn always_hits(ctx: &EngineContext, user: CombatantId, target: CombatantId) -> bool {
    if has_ab_attr(&ctx.field, user, AbAttrKind::AlwaysHit)
        || has_ab_attr(&ctx.field, target, AbAttrKind::AlwaysHit)
    {
        return true;
    }
    let locked_on = ctx
        .field
        .get(user)
        .and_then(|c| c.tag(BattlerTagKind::LockOn))
        .is_some_and(|tag| tag.target == Some(target));
    locked_on
        || ctx
            .field
            .get(target)
            .is_some_and(|c| c.has_tag(BattlerTagKind::AlwaysGetHit))
}

/// Returns the semi-invulnerable tag that hides `target`, if any.
///
/// Gravity pulls airborne combatants down, so [`BattlerTagKind::Flying`]
/// offers no cover while it is up.
fn semi_invulnerability(ctx: &EngineContext, target: CombatantId) -> Option<BattlerTagKind> {
    let c = ctx.field.get(target)?;
    let tag = c.semi_invulnerable_tag()?;
    if tag == BattlerTagKind::Flying
        && ctx.field.has_arena_tag_covering(ArenaTagKind::Gravity, c.side())
    {
        return None;
    }
    Some(tag)
}

/// Returns `true` if a protection blocks `mv` from reaching `target`.
///
/// Field-level conditional protection on the target's side is checked first.
/// A move that bypasses protection (by flag, or by contact with the matching
/// ability) goes through it unless the tag declares itself bypass-proof. The
/// target's own protection tag is checked second and never stops a bypassing
/// move. When not simulated, a block is announced and a protection tag
/// reacts to it (Spiky Shield hurts contact attackers, King's Shield lowers
/// their Attack).
pub fn protected_check(
    ctx: &mut EngineContext,
    user: CombatantId,
    mv: &Move,
    target: CombatantId,
    simulated: bool,
) -> bool {
    let (Some(user_side), Some(target_side)) = (
        ctx.field.get(user).map(|c| c.side()),
        ctx.field.get(target).map(|c| c.side()),
    ) else {
        return false;
    };
    if user == target {
        return false;
    }
    let bypass = bypasses_protection(&ctx.field, user, mv);

    let mut protected = BoolHolder::new(false);
    let mut ignores_bypass = BoolHolder::new(false);
    let mut blocking_tag = None;
    if user_side != target_side {
        for tag in ctx.field.arena_tags_covering(target_side) {
            if tag.apply_conditional_protect(mv, &mut protected, &mut ignores_bypass) {
                blocking_tag = Some(tag.kind);
            }
        }
    }
    if protected.value && (ignores_bypass.value || !bypass) {
        if !simulated {
            let name = ctx.field.name_of(target);
            let tag = blocking_tag.map_or("A protection", ArenaTagKind::name);
            ctx.emit(BattleEvent::Protected { target });
            ctx.message(format!("{tag} protected {name}!"));
        }
        return true;
    }
    if bypass {
        return false;
    }

    let shield = ctx.field.get(target).and_then(|c| {
        c.tags()
            .iter()
            .map(|t| t.kind)
            .find(|k| k.protection_scope().is_some_and(|scope| scope.covers(mv)))
    });
    let Some(tag) = shield else {
        return false;
    };
    if !simulated {
        react_to_protection(ctx, user, mv, target, tag);
    }
    true
}

/// Returns `true` if `mv` used by `user` goes through protection, either by
/// flag or by contact with an ability that reaches past it.
///
/// Bypass-proof field protection still stops such a move; see
/// [`protected_check`].
#[must_use]
pub fn bypasses_protection(field: &Field, user: CombatantId, mv: &Move) -> bool {
    mv.flags().contains(MoveFlags::IGNORE_PROTECT)
        || (mv.makes_contact() && has_ab_attr(field, user, AbAttrKind::IgnoreProtectOnContact))
}

/// The custom lapse of a protection tag that blocked a move.
fn react_to_protection(
    ctx: &mut EngineContext,
    user: CombatantId,
    mv: &Move,
    target: CombatantId,
    tag: BattlerTagKind,
) {
    if let Some(c) = ctx.field.get_mut(target) {
        c.lapse_tag(tag, LapseTrigger::Custom);
    }
    let name = ctx.field.name_of(target);
    ctx.emit(BattleEvent::Protected { target });
    ctx.message(format!("{name} protected itself!"));
    if !mv.makes_contact() {
        return;
    }
    match tag {
        BattlerTagKind::SpikyShield => {
            let max_hp = ctx.field.get(user).map_or(0, |c| c.max_hp());
            let attacker = ctx.field.name_of(user);
            ctx.message(format!("{attacker} was hurt!"));
            effects::deal_damage(ctx, user, (max_hp / 8).max(1), Some(target));
        }
        BattlerTagKind::KingsShield => {
            effects::queue_stat_change(ctx, user, Some(target), vec![BattleStat::Attack], -1);
        }
        _ => {}
    }
}

/// Type effectiveness of `element` against `target`, with field and tag adjustments.
fn type_multiplier(ctx: &EngineContext, element: Element, target: CombatantId) -> f64 {
    let Some(c) = ctx.field.get(target) else {
        return 1.0;
    };
    if c.tags()
        .iter()
        .any(|t| t.kind.immune_type() == Some(element))
    {
        return 0.0;
    }
    let grounded = element == Element::Ground
        && ctx.field.has_arena_tag_covering(ArenaTagKind::Gravity, c.side());
    let identified = matches!(element, Element::Normal | Element::Fighting)
        && c.has_tag(BattlerTagKind::Exposed);
    c.types()
        .iter()
        .filter(|t| !(grounded && **t == Element::Flying))
        .filter(|t| !(identified && **t == Element::Ghost))
        .map(|t| element.effectiveness_against(*t))
        .product()
}

/// Returns the combined type and ability multiplier of `mv` against `target`.
///
/// Status moves are unaffected by types unless they respect type immunity,
/// in which case an immune target still yields 0. Ability immunities may
/// zero the multiplier and raise `cancelled` when they handled the move
/// themselves (absorbing it, or announcing the immunity).
pub fn move_effectiveness(
    ctx: &mut EngineContext,
    user: CombatantId,
    mv: &Move,
    target: CombatantId,
    cancelled: &mut BoolHolder,
    simulated: bool,
) -> f64 {
    if user == target {
        return 1.0;
    }
    let raw = type_multiplier(ctx, mv.element(), target);
    let typed = if !mv.is_status() {
        raw
    } else if mv.flags().contains(MoveFlags::RESPECT_TYPE_IMMUNITY) && raw == 0.0 {
        0.0
    } else {
        1.0
    };

    let mut value = NumberHolder::new(typed);
    let args = DefendArgs {
        defender: target,
        attacker: user,
        mv,
    };
    apply_pre_defend_ab_attrs(ctx, IMMUNITY_KINDS, &args, cancelled, &mut value, simulated);
    if cancelled.value {
        return 0.0;
    }
    value.value
}

/// Returns the move's accuracy after rewrites, or `None` if it never misses.
fn move_accuracy(ctx: &mut EngineContext, user: CombatantId, mv: &Move, target: CombatantId) -> Option<f64> {
    let base = match mv.accuracy() {
        Accuracy::Sure => SURE_HIT,
        Accuracy::Percent(p) => f64::from(p),
    };
    let mut accuracy = NumberHolder::new(base);
    apply_variable_accuracy(ctx, user, target, mv, &mut accuracy);
    if accuracy.value == SURE_HIT {
        return None;
    }
    let mut cancelled = BoolHolder::new(false);
    let args = DefendArgs {
        defender: target,
        attacker: user,
        mv,
    };
    apply_pre_defend_ab_attrs(ctx, &[AbAttrKind::WonderSkin], &args, &mut cancelled, &mut accuracy, false);
    Some(accuracy.value)
}

/// Multiplier for a net accuracy stage in `-6..=6`.
#[must_use]
pub fn accuracy_stage_multiplier(stage: i8) -> f64 {
    let stage = f64::from(stage.clamp(MIN_STAGE, MAX_STAGE));
    if stage >= 0.0 {
        (3.0 + stage) / 3.0
    } else {
        3.0 / (3.0 - stage)
    }
}

/// Scales a move's accuracy by stages, abilities and the field.
///
/// The user's Accuracy stage is ignored by a target that ignores opposing
/// stages. The target's Evasion stage is ignored by a user (or move) that
/// ignores opposing stages, and a positive Evasion stage is ignored against
/// an identified target.
pub fn accuracy_multiplier(
    ctx: &mut EngineContext,
    user: CombatantId,
    mv: &Move,
    target: CombatantId,
    simulated: bool,
) -> f64 {
    let (Some(attacker), Some(defender)) = (ctx.field.get(user), ctx.field.get(target)) else {
        return 1.0;
    };
    let accuracy_stage = if ignores_opponent_stage(&ctx.field, target, BattleStat::Accuracy) {
        0
    } else {
        attacker.stages().get(BattleStat::Accuracy)
    };
    let mut evasion_stage = if ignores_opponent_stage(&ctx.field, user, BattleStat::Evasion)
        || mv.has_attr(MoveAttrKind::IgnoreOpponentStatStages)
    {
        0
    } else {
        defender.stages().get(BattleStat::Evasion)
    };
    if defender.has_tag(BattlerTagKind::Exposed) {
        evasion_stage = evasion_stage.min(0);
    }
    let gravity = ctx
        .field
        .has_arena_tag_covering(ArenaTagKind::Gravity, defender.side());

    let mut multiplier = accuracy_stage_multiplier(accuracy_stage.saturating_sub(evasion_stage));

    let mut user_accuracy = NumberHolder::new(1.0);
    apply_stat_multiplier_ab_attrs(ctx, user, BattleStat::Accuracy, Some(mv), &mut user_accuracy, simulated);
    let mut target_evasion = NumberHolder::new(1.0);
    apply_stat_multiplier_ab_attrs(ctx, target, BattleStat::Evasion, Some(mv), &mut target_evasion, simulated);

    multiplier *= user_accuracy.value;
    if target_evasion.value > 0.0 {
        multiplier /= target_evasion.value;
    }
    if gravity {
        multiplier *= 5.0 / 3.0;
    }
    multiplier
}
