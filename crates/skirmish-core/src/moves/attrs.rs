//! Move attribute fragments.

use crate::combatant::{BattlerTag, BattlerTagKind, Combatant, CombatantId, StatusKind};
use crate::effects;
use crate::element::Element;
use crate::engine::EngineContext;
use crate::field::{ArenaTag, ArenaTagKind, ArenaTagSide, Field, WeatherKind};
use crate::hit::bypasses_protection;
use crate::holder::NumberHolder;
use crate::moves::{Accuracy, Move};
use crate::stat::BattleStat;

use super::dispatch::SURE_HIT;

// =============================================================================
// Effect attributes
// =============================================================================

/// When an effect fragment fires relative to the hit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EffectTrigger {
    /// Before damage is applied.
    BeforeHit,
    /// After damage is applied, on every strike.
    AfterHit,
    /// After the final strike of the move only.
    LastHit,
}

/// Who receives an effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EffectScope {
    /// The combatant being hit.
    Target,
    /// The combatant using the move.
    User,
}

/// Position of the current strike inside the move's resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct HitFlags {
    /// First strike of a multi-hit sequence.
    pub first_hit: bool,
    /// Final strike of a multi-hit sequence.
    pub last_hit: bool,
    /// First target resolved this strike.
    pub first_target: bool,
}

impl HitFlags {
    /// Flags of a single-strike move against its first target.
    pub const SINGLE: HitFlags = HitFlags {
        first_hit: true,
        last_hit: true,
        first_target: true,
    };
}

/// What an effect fragment does.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveEffect {
    /// Inflicts a status condition.
    Status(StatusKind),
    /// Changes stat stages.
    StatStages {
        /// Stats changed.
        stats: Vec<BattleStat>,
        /// Stages applied.
        stages: i8,
    },
    /// Attaches a battler tag sourced from the move.
    AddTag(BattlerTagKind),
    /// Raises a protection tag on the recipient.
    Protect(BattlerTagKind),
    /// Locks the user onto the target.
    LockOn,
    /// Sets an arena tag on the user's side, or on both sides.
    ArenaTag {
        /// Tag set.
        kind: ArenaTagKind,
        /// Cover the whole field.
        both_sides: bool,
    },
    /// Starts a weather.
    Weather(WeatherKind),
    /// User loses `damage / divisor`.
    Recoil {
        /// Fraction of the damage dealt.
        divisor: u32,
    },
    /// User restores `damage / divisor`.
    Drain {
        /// Fraction of the damage dealt.
        divisor: u32,
    },
    /// User restores `max_hp / divisor`.
    Heal {
        /// Fraction of max HP.
        divisor: u32,
    },
}

/// An effect fragment with its trigger and scoping.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEffectAttr {
    /// What happens.
    pub effect: MoveEffect,
    /// Who receives it.
    pub scope: EffectScope,
    /// When it fires.
    pub trigger: EffectTrigger,
    /// Only on the first strike.
    pub first_hit_only: bool,
    /// Only on the last strike.
    pub last_hit_only: bool,
    /// Only against the first target of a spread move.
    pub first_target_only: bool,
    /// Replaces the move's own effect chance.
    pub chance_override: Option<u32>,
}

impl MoveEffectAttr {
    fn new(effect: MoveEffect, scope: EffectScope) -> Self {
        Self {
            effect,
            scope,
            trigger: EffectTrigger::AfterHit,
            first_hit_only: false,
            last_hit_only: false,
            first_target_only: false,
            chance_override: None,
        }
    }

    /// An effect on the target, fired after each hit.
    #[must_use]
    pub fn on_target(effect: MoveEffect) -> Self {
        Self::new(effect, EffectScope::Target)
    }

    /// An effect on the user, fired after each hit.
    #[must_use]
    pub fn on_user(effect: MoveEffect) -> Self {
        Self::new(effect, EffectScope::User)
    }

    /// Sets the trigger.
    #[must_use]
    pub fn on(mut self, trigger: EffectTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Fires on the first strike only.
    #[must_use]
    pub fn first_hit_only(mut self) -> Self {
        self.first_hit_only = true;
        self
    }

    /// Fires on the last strike only.
    #[must_use]
    pub fn last_hit_only(mut self) -> Self {
        self.last_hit_only = true;
        self
    }

    /// Fires against the first target only.
    #[must_use]
    pub fn first_target_only(mut self) -> Self {
        self.first_target_only = true;
        self
    }

    /// Replaces the move's effect chance for this fragment.
    #[must_use]
    pub fn with_chance(mut self, chance: u32) -> Self {
        self.chance_override = Some(chance);
        self
    }

    /// Returns `true` if the fragment affects its own user.
    #[must_use]
    pub fn is_self_target(&self) -> bool {
        self.scope == EffectScope::User
    }

    /// Returns `true` if the fragment fires on `trigger` at this strike.
    #[must_use]
    pub fn fires_on(&self, trigger: EffectTrigger, hit: HitFlags) -> bool {
        if self.trigger != trigger {
            return false;
        }
        if self.trigger == EffectTrigger::LastHit && !hit.last_hit {
            return false;
        }
        !(self.first_hit_only && !hit.first_hit
            || self.last_hit_only && !hit.last_hit
            || self.first_target_only && !hit.first_target)
    }
}

/// The parties and state one effect fragment is applied against.
#[derive(Debug, Clone, Copy)]
pub struct EffectApplication<'a> {
    /// Move user.
    pub user: CombatantId,
    /// Combatant being hit.
    pub target: CombatantId,
    /// The move.
    pub mv: &'a Move,
    /// Damage this strike dealt to `target`.
    pub damage: u32,
}

impl EffectApplication<'_> {
    /// Returns the combatant a fragment with this scope affects.
    #[must_use]
    pub fn recipient(&self, scope: EffectScope) -> CombatantId {
        match scope {
            EffectScope::Target => self.target,
            EffectScope::User => self.user,
        }
    }
}

/// A move fragment with a guarded side effect.
pub trait EffectAttr {
    /// Returns `true` if the fragment may apply at all.
    fn can_apply(&self, ctx: &EngineContext, app: &EffectApplication<'_>) -> bool;

    /// Applies the fragment. Returns `true` if it changed anything.
    fn apply(&self, ctx: &mut EngineContext, app: &EffectApplication<'_>) -> bool;
}

fn is_shielded(field: &Field, user: CombatantId, target: &Combatant, mv: &Move) -> bool {
    if bypasses_protection(field, user, mv) {
        return false;
    }
    target.tags().iter().any(|tag| {
        tag.kind
            .protection_scope()
            .is_some_and(|scope| scope.covers(mv))
    })
}

impl EffectAttr for MoveEffectAttr {
    fn can_apply(&self, ctx: &EngineContext, app: &EffectApplication<'_>) -> bool {
        let alive = |id| ctx.field.get(id).filter(|c| !c.is_fainted() && c.is_on_field());
        if alive(app.user).is_none() {
            return false;
        }
        if self.is_self_target() {
            return app.damage > 0
                || !matches!(self.effect, MoveEffect::Recoil { .. } | MoveEffect::Drain { .. });
        }
        alive(app.target).is_some_and(|target| {
            app.user == app.target || !is_shielded(&ctx.field, app.user, target, app.mv)
        })
    }

    fn apply(&self, ctx: &mut EngineContext, app: &EffectApplication<'_>) -> bool {
        let recipient = app.recipient(self.scope);
        match &self.effect {
            MoveEffect::Status(kind) => {
                effects::try_set_status(ctx, recipient, *kind, Some(app.user), false)
            }
            MoveEffect::StatStages { stats, stages } => {
                effects::queue_stat_change(ctx, recipient, Some(app.user), stats.clone(), *stages);
                true
            }
            MoveEffect::AddTag(kind) | MoveEffect::Protect(kind) => {
                let tag = BattlerTag::new(*kind).from_source(app.mv.id().clone(), app.user);
                effects::try_add_tag(ctx, recipient, tag, false)
            }
            MoveEffect::LockOn => {
                effects::remove_tag(ctx, app.user, BattlerTagKind::LockOn);
                let tag = BattlerTag::new(BattlerTagKind::LockOn)
                    .from_source(app.mv.id().clone(), app.user)
                    .targeting(app.target);
                let added = effects::try_add_tag(ctx, app.user, tag, false);
                if added {
                    let user = ctx.field.name_of(app.user);
                    let target = ctx.field.name_of(app.target);
                    ctx.message(format!("{user} took aim at {target}!"));
                }
                added
            }
            MoveEffect::ArenaTag { kind, both_sides } => {
                let side = if *both_sides {
                    ArenaTagSide::Both
                } else {
                    ctx.field
                        .get(app.user)
                        .map_or(ArenaTagSide::Both, |c| c.side().into())
                };
                effects::add_arena_tag(ctx, ArenaTag::new(*kind, side).from_source(app.user))
            }
            MoveEffect::Weather(kind) => effects::set_weather(ctx, *kind),
            MoveEffect::Recoil { divisor } => {
                if crate::ability::dispatch::has_ab_attr(
                    &ctx.field,
                    app.user,
                    crate::ability::AbAttrKind::BlockRecoil,
                ) {
                    return false;
                }
                let amount = (app.damage / (*divisor).max(1)).max(1);
                let name = ctx.field.name_of(app.user);
                ctx.message(format!("{name} is damaged by recoil!"));
                effects::deal_damage(ctx, app.user, amount, None) > 0
            }
            MoveEffect::Drain { divisor } => {
                let amount = (app.damage / (*divisor).max(1)).max(1);
                let healed = effects::heal(ctx, app.user, amount);
                if healed > 0 {
                    let name = ctx.field.name_of(app.target);
                    ctx.message(format!("{name} had its energy drained!"));
                }
                healed > 0
            }
            MoveEffect::Heal { divisor } => {
                let max_hp = ctx.field.get(recipient).map_or(0, Combatant::max_hp);
                let healed = effects::heal(ctx, recipient, (max_hp / (*divisor).max(1)).max(1));
                let name = ctx.field.name_of(recipient);
                if healed > 0 {
                    ctx.message(format!("{name}'s HP was restored."));
                } else {
                    ctx.message(format!("{name}'s HP is full!"));
                }
                healed > 0
            }
        }
    }
}

// =============================================================================
// Accuracy attributes
// =============================================================================

/// Rewrites a move's base accuracy before modifiers apply.
pub trait VariableAccuracyAttr {
    /// Applies the fragment. Returns `true` if it rewrote the accuracy.
    fn apply_accuracy(
        &self,
        ctx: &EngineContext,
        user: CombatantId,
        target: CombatantId,
        accuracy: &mut NumberHolder,
    ) -> bool;
}

fn accuracy_value(accuracy: Accuracy) -> f64 {
    match accuracy {
        Accuracy::Sure => SURE_HIT,
        Accuracy::Percent(p) => f64::from(p),
    }
}

// =============================================================================
// Attribute set
// =============================================================================

/// Strike count of a multi-hit move.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MultiHitKind {
    /// Always this many strikes.
    Fixed(u32),
    /// Two to five strikes, weighted towards fewer.
    TwoToFive,
}

/// Every move attribute fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveAttr {
    /// A secondary or primary effect.
    Effect(MoveEffectAttr),
    /// Reaches a target hidden by a semi-invulnerable tag.
    HitsTag {
        /// Pierced tag.
        tag: BattlerTagKind,
        /// Double damage against a target in that tag.
        double_damage: bool,
    },
    /// Strikes several times.
    MultiHit(MultiHitKind),
    /// Knocks out in one hit; accuracy scales with the level gap.
    OneHitKo,
    /// Accuracy changes under a weather.
    WeatherAccuracy {
        /// Weather that rewrites accuracy.
        weather: WeatherKind,
        /// Accuracy under that weather.
        accuracy: Accuracy,
    },
    /// Never misses when used by a combatant of this type.
    ToxicAccuracy {
        /// User type that guarantees the hit.
        element: Element,
    },
    /// Disregards the target's stat stages.
    IgnoreOpponentStatStages,
    /// Spends one turn charging before it executes.
    Charge {
        /// Semi-invulnerable tag held while charging.
        tag: Option<BattlerTagKind>,
        /// Charge message; `{name}` is replaced with the user's name.
        message: String,
    },
}

/// Category of a [`MoveAttr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum MoveAttrKind {
    Effect,
    HitsTag,
    MultiHit,
    OneHitKo,
    WeatherAccuracy,
    ToxicAccuracy,
    IgnoreOpponentStatStages,
    Charge,
}

impl MoveAttr {
    /// Returns the category.
    #[must_use]
    pub const fn kind(&self) -> MoveAttrKind {
        match self {
            MoveAttr::Effect(_) => MoveAttrKind::Effect,
            MoveAttr::HitsTag { .. } => MoveAttrKind::HitsTag,
            MoveAttr::MultiHit(_) => MoveAttrKind::MultiHit,
            MoveAttr::OneHitKo => MoveAttrKind::OneHitKo,
            MoveAttr::WeatherAccuracy { .. } => MoveAttrKind::WeatherAccuracy,
            MoveAttr::ToxicAccuracy { .. } => MoveAttrKind::ToxicAccuracy,
            MoveAttr::IgnoreOpponentStatStages => MoveAttrKind::IgnoreOpponentStatStages,
            MoveAttr::Charge { .. } => MoveAttrKind::Charge,
        }
    }

    /// Returns the fragment as an accuracy rewrite, if it is one.
    #[must_use]
    pub fn as_variable_accuracy(&self) -> Option<&dyn VariableAccuracyAttr> {
        match self {
            MoveAttr::OneHitKo
            | MoveAttr::WeatherAccuracy { .. }
            | MoveAttr::ToxicAccuracy { .. } => Some(self),
            _ => None,
        }
    }
}

impl VariableAccuracyAttr for MoveAttr {
    fn apply_accuracy(
        &self,
        ctx: &EngineContext,
        user: CombatantId,
        target: CombatantId,
        accuracy: &mut NumberHolder,
    ) -> bool {
        match self {
            MoveAttr::OneHitKo => {
                let (Some(u), Some(t)) = (ctx.field.get(user), ctx.field.get(target)) else {
                    return false;
                };
                let value = if u.level() < t.level() {
                    0
                } else {
                    (30 + u.level() - t.level()).min(100)
                };
                accuracy.set(f64::from(value));
                true
            }
            MoveAttr::WeatherAccuracy {
                weather,
                accuracy: rewritten,
            } => {
                if ctx.field.weather_kind() != Some(*weather) {
                    return false;
                }
                accuracy.set(accuracy_value(*rewritten));
                true
            }
            MoveAttr::ToxicAccuracy { element } => {
                if !ctx.field.get(user).is_some_and(|c| c.is_of_type(*element)) {
                    return false;
                }
                accuracy.set(SURE_HIT);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_hit_trigger_waits_for_final_strike() {
        let attr = MoveEffectAttr::on_target(MoveEffect::Status(StatusKind::Burn))
            .on(EffectTrigger::LastHit);
        let middle = HitFlags {
            first_hit: true,
            last_hit: false,
            first_target: true,
        };
        assert!(!attr.fires_on(EffectTrigger::LastHit, middle));
        assert!(attr.fires_on(EffectTrigger::LastHit, HitFlags::SINGLE));
        assert!(!attr.fires_on(EffectTrigger::AfterHit, HitFlags::SINGLE));
    }

    #[test]
    fn first_target_scoping_skips_later_targets() {
        let attr = MoveEffectAttr::on_user(MoveEffect::StatStages {
            stats: vec![BattleStat::Defense],
            stages: -1,
        })
        .first_target_only();
        let second = HitFlags {
            first_target: false,
            ..HitFlags::SINGLE
        };
        assert!(attr.is_self_target());
        assert!(!attr.fires_on(EffectTrigger::AfterHit, second));
    }

    #[test]
    fn variable_accuracy_fragments_are_selected() {
        assert!(MoveAttr::OneHitKo.as_variable_accuracy().is_some());
        assert!(MoveAttr::MultiHit(MultiHitKind::TwoToFive)
            .as_variable_accuracy()
            .is_none());
    }
}
