//! Ability attribute dispatch.
//!
//! Every `apply_*` function here follows the same protocol:
//! 1. Resolve the holder's ability; stop if it cannot take effect right now
//!    (holder fainted or suppressed, or an ignorable ability while another
//!    combatant's move is bypassing abilities).
//! 2. Walk the ability's attributes in declaration order, keeping those of
//!    the requested capability categories whose condition holds.
//! 3. Apply each one against the caller's holders. Every matching attribute
//!    runs; one firing never stops the next.
//! 4. When an attribute fires, is marked visible and the call is not
//!    simulated, record an [`AbilityShown`](crate::event::BattleEvent::AbilityShown) event.
//!
//! Simulated calls compute the same holder values without writing battle
//! state, drawing randomness or recording events, so the command policy can
//! ask "what would happen".

use tracing::trace;

use crate::ability::{AbAttr, AbAttrKind, DefendArgs};
use crate::combatant::{BattlerTagKind, CombatantId, StatusKind};
use crate::engine::EngineContext;
use crate::event::BattleEvent;
use crate::field::Field;
use crate::holder::{BoolHolder, NumberHolder};
use crate::moves::Move;
use crate::stat::BattleStat;

/// Applies every selected attribute of `holder`'s ability. Returns `true` if any fired.
fn dispatch<F>(
    ctx: &mut EngineContext,
    holder: CombatantId,
    kinds: &[AbAttrKind],
    simulated: bool,
    mut apply: F,
) -> bool
where
    F: FnMut(&mut EngineContext, &AbAttr) -> bool,
{
    // Clone the handle out so attributes may borrow the context mutably.
    let Some(ability) = ctx.field.active_ability(holder) else {
        return false;
    };
    let mut fired = false;
    for entry in ability.attrs() {
        if !kinds.contains(&entry.kind()) {
            continue;
        }
        if let Some(condition) = entry.condition() {
            let holds = ctx
                .field
                .get(holder)
                .is_some_and(|c| condition.holds(c, &ctx.field));
            if !holds {
                continue;
            }
        }
        if !apply(ctx, entry.attr()) {
            continue;
        }
        fired = true;
        trace!(%holder, ability = %ability.id(), kind = ?entry.kind(), simulated, "ability attribute fired");
        if entry.show_ability() && !simulated {
            ctx.emit(BattleEvent::AbilityShown {
                combatant: holder,
                ability: ability.id().clone(),
            });
        }
    }
    fired
}

/// Applies pre-defend attributes of the kinds in `kinds` on the defender.
///
/// # Arguments
///
/// * `ctx` - Battle context
/// * `kinds` - Pre-defend categories to run (e.g. [`AbAttrKind::TYPE_IMMUNITY`])
/// * `args` - Defender, attacker and move
/// * `cancelled` - Set when the move should become a silent no-effect
/// * `value` - Quantity being computed (type multiplier, accuracy, damage multiplier)
/// * `simulated` - Compute without side effects
#[allow(clippy::too_many_arguments)]
pub fn apply_pre_defend_ab_attrs(
    ctx: &mut EngineContext,
    kinds: &[AbAttrKind],
    args: &DefendArgs<'_>,
    cancelled: &mut BoolHolder,
    value: &mut NumberHolder,
    simulated: bool,
) -> bool {
    dispatch(ctx, args.defender, kinds, simulated, |ctx, attr| {
        attr.as_pre_defend()
            .is_some_and(|a| a.apply_pre_defend(ctx, args, cancelled, value, simulated))
    })
}

/// Applies post-defend attributes on the defender after a damaging hit.
pub fn apply_post_defend_ab_attrs(
    ctx: &mut EngineContext,
    args: &DefendArgs<'_>,
    simulated: bool,
) -> bool {
    dispatch(ctx, args.defender, AbAttrKind::POST_DEFEND, simulated, |ctx, attr| {
        attr.as_post_defend()
            .is_some_and(|a| a.apply_post_defend(ctx, args, simulated))
    })
}

/// Applies post-summon attributes when `holder` enters the field.
pub fn apply_post_summon_ab_attrs(
    ctx: &mut EngineContext,
    holder: CombatantId,
    simulated: bool,
) -> bool {
    dispatch(ctx, holder, AbAttrKind::POST_SUMMON, simulated, |ctx, attr| {
        attr.as_post_summon()
            .is_some_and(|a| a.apply_post_summon(ctx, holder, simulated))
    })
}

/// Applies pre-stat-change attributes before `holder`'s `stat` is lowered by another combatant.
pub fn apply_pre_stat_change_ab_attrs(
    ctx: &mut EngineContext,
    holder: CombatantId,
    stat: BattleStat,
    cancelled: &mut BoolHolder,
    simulated: bool,
) -> bool {
    dispatch(ctx, holder, &[AbAttrKind::ProtectStat], simulated, |ctx, attr| {
        attr.as_pre_stat_change()
            .is_some_and(|a| a.apply_pre_stat_change(ctx, holder, stat, cancelled, simulated))
    })
}

/// Applies post-stat-change attributes after `holder`'s stages moved.
pub fn apply_post_stat_change_ab_attrs(
    ctx: &mut EngineContext,
    holder: CombatantId,
    stats: &[BattleStat],
    delta: i8,
    self_inflicted: bool,
    simulated: bool,
) -> bool {
    dispatch(
        ctx,
        holder,
        &[AbAttrKind::PostStatStageChangeBoost],
        simulated,
        |ctx, attr| {
            attr.as_post_stat_change().is_some_and(|a| {
                a.apply_post_stat_change(ctx, holder, stats, delta, self_inflicted, simulated)
            })
        },
    )
}

/// Applies effect-chance attributes of one kind on `holder`.
///
/// The attacker side runs [`AbAttrKind::MoveEffectChanceMultiplier`]; the
/// target side runs [`AbAttrKind::IgnoreMoveEffects`].
pub fn apply_effect_chance_ab_attrs(
    ctx: &mut EngineContext,
    kind: AbAttrKind,
    holder: CombatantId,
    mv: &Move,
    chance: &mut NumberHolder,
    simulated: bool,
) -> bool {
    dispatch(ctx, holder, &[kind], simulated, |ctx, attr| {
        attr.as_effect_chance()
            .is_some_and(|a| a.apply_effect_chance(ctx, holder, mv, chance, simulated))
    })
}

/// Scales `multiplier` by `holder`'s stat-multiplier attributes for `stat`.
pub fn apply_stat_multiplier_ab_attrs(
    ctx: &mut EngineContext,
    holder: CombatantId,
    stat: BattleStat,
    mv: Option<&Move>,
    multiplier: &mut NumberHolder,
    simulated: bool,
) -> bool {
    dispatch(ctx, holder, &[AbAttrKind::StatMultiplier], simulated, |_, attr| {
        attr.as_stat_multiplier()
            .is_some_and(|a| a.apply_stat_multiplier(stat, mv, multiplier))
    })
}

/// Scales `power` by `holder`'s move-power attributes.
pub fn apply_move_power_ab_attrs(
    ctx: &mut EngineContext,
    holder: CombatantId,
    mv: &Move,
    power: &mut NumberHolder,
    simulated: bool,
) -> bool {
    dispatch(ctx, holder, &[AbAttrKind::MoveTypePowerBoost], simulated, |_, attr| {
        attr.as_move_power()
            .is_some_and(|a| a.apply_move_power(mv, power))
    })
}

/// Runs `holder`'s status-immunity attributes against `status`.
pub fn apply_status_immunity_ab_attrs(
    ctx: &mut EngineContext,
    holder: CombatantId,
    status: StatusKind,
    cancelled: &mut BoolHolder,
    simulated: bool,
) -> bool {
    dispatch(ctx, holder, &[AbAttrKind::BlockStatusEffect], simulated, |ctx, attr| {
        attr.as_status_immunity()
            .is_some_and(|a| a.apply_status_immunity(ctx, holder, status, cancelled, simulated))
    })
}

/// Runs `holder`'s tag-immunity attributes against `tag`.
pub fn apply_tag_immunity_ab_attrs(
    ctx: &mut EngineContext,
    holder: CombatantId,
    tag: BattlerTagKind,
    cancelled: &mut BoolHolder,
    simulated: bool,
) -> bool {
    dispatch(ctx, holder, &[AbAttrKind::BattlerTagImmunity], simulated, |ctx, attr| {
        attr.as_tag_immunity()
            .is_some_and(|a| a.apply_tag_immunity(ctx, holder, tag, cancelled, simulated))
    })
}

/// Returns `true` if `holder`'s active ability has an attribute of `kind` whose condition holds.
#[must_use]
pub fn has_ab_attr(field: &Field, holder: CombatantId, kind: AbAttrKind) -> bool {
    let (Some(ability), Some(combatant)) = (field.active_ability(holder), field.get(holder)) else {
        return false;
    };
    ability.attrs().iter().any(|entry| {
        entry.kind() == kind && entry.condition().map_or(true, |c| c.holds(combatant, field))
    })
}

/// Returns `true` if `holder` disregards its opponents' stages for `stat`.
#[must_use]
pub fn ignores_opponent_stage(field: &Field, holder: CombatantId, stat: BattleStat) -> bool {
    let Some(ability) = field.active_ability(holder) else {
        return false;
    };
    ability
        .attrs()
        .iter()
        .filter_map(|entry| entry.attr().as_ignore_stages())
        .any(|a| a.ignores(stat))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ability::{
        Ability, AbilityAttr, AttrCondition, IgnoreOpponentStatStages, TypeImmunity,
        TypeImmunityHeal,
    };
    use crate::catalog::Catalog;
    use crate::combatant::{BattlerTag, CombatantTemplate, Side};
    use crate::config::BattleConfig;
    use crate::element::Element;

    fn context_with(ability: Ability) -> (EngineContext, CombatantId, CombatantId) {
        let mut field = Field::new(1);
        let holder = field.spawn(
            CombatantTemplate::new("Holder", Side::Player, 50).with_ability(Arc::new(ability)),
        );
        let foe = field.spawn(CombatantTemplate::new("Foe", Side::Enemy, 50));
        field.summon(holder, 0);
        field.summon(foe, 0);
        (EngineContext::new(BattleConfig::default(), field), holder, foe)
    }

    mod protocol_tests {
        use super::*;

        #[test]
        fn attributes_compose_in_declaration_order() {
            let doubled = Ability::new("doubled", "Doubled")
                .with_attr(AbilityAttr::new(AbAttr::ReceivedMoveDamageMultiplier(
                    crate::ability::ReceivedMoveDamageMultiplier { factor: 0.5 },
                )))
                .with_attr(AbilityAttr::new(AbAttr::ReceivedMoveDamageMultiplier(
                    crate::ability::ReceivedMoveDamageMultiplier { factor: 0.5 },
                )));
            let (mut ctx, holder, foe) = context_with(doubled);
            let mv = Catalog::standard().move_by_id("tackle").unwrap();
            let args = DefendArgs {
                defender: holder,
                attacker: foe,
                mv: &mv,
            };
            let mut cancelled = BoolHolder::default();
            let mut value = NumberHolder::new(1.0);
            let fired = apply_pre_defend_ab_attrs(
                &mut ctx,
                &[AbAttrKind::ReceivedMoveDamageMultiplier],
                &args,
                &mut cancelled,
                &mut value,
                false,
            );
            assert!(fired);
            assert_eq!(value.value, 0.25);
        }

        #[test]
        fn false_condition_skips_attribute() {
            let gated = Ability::new("gated", "Gated").with_attr(
                AbilityAttr::new(AbAttr::TypeImmunity(TypeImmunity::new(Element::Normal)))
                    .when(AttrCondition::HpAtMost(0.5)),
            );
            let (mut ctx, holder, foe) = context_with(gated);
            let mv = Catalog::standard().move_by_id("tackle").unwrap();
            let args = DefendArgs {
                defender: holder,
                attacker: foe,
                mv: &mv,
            };
            let mut cancelled = BoolHolder::default();
            let mut value = NumberHolder::new(1.0);
            assert!(!apply_pre_defend_ab_attrs(
                &mut ctx,
                AbAttrKind::TYPE_IMMUNITY,
                &args,
                &mut cancelled,
                &mut value,
                false
            ));
            assert_eq!(value.value, 1.0);
        }

        #[test]
        fn visible_attribute_emits_event_only_when_not_simulated() {
            let absorb = Ability::new("water_absorb", "Water Absorb").with_attr(AbilityAttr::new(
                AbAttr::TypeImmunityHeal(TypeImmunityHeal {
                    element: Element::Water,
                }),
            ));
            let (mut ctx, holder, foe) = context_with(absorb);
            let mv = Catalog::standard().move_by_id("surf").unwrap();
            let args = DefendArgs {
                defender: holder,
                attacker: foe,
                mv: &mv,
            };

            let mut cancelled = BoolHolder::default();
            let mut value = NumberHolder::new(1.0);
            assert!(apply_pre_defend_ab_attrs(
                &mut ctx,
                AbAttrKind::TYPE_IMMUNITY,
                &args,
                &mut cancelled,
                &mut value,
                true
            ));
            assert!(cancelled.value);
            assert!(ctx.events().is_empty());

            let mut cancelled = BoolHolder::default();
            let mut value = NumberHolder::new(1.0);
            apply_pre_defend_ab_attrs(
                &mut ctx,
                AbAttrKind::TYPE_IMMUNITY,
                &args,
                &mut cancelled,
                &mut value,
                false,
            );
            assert!(ctx
                .events()
                .events()
                .any(|e| matches!(e, BattleEvent::AbilityShown { combatant, .. } if *combatant == holder)));
        }
    }

    mod gating_tests {
        use super::*;

        #[test]
        fn suppressed_ability_does_not_fire() {
            let levitate = Catalog::standard().ability("levitate").unwrap();
            let (mut ctx, holder, _) = context_with((*levitate).clone());
            assert!(has_ab_attr(&ctx.field, holder, AbAttrKind::TypeImmunity));
            ctx.field
                .get_mut(holder)
                .unwrap()
                .add_tag(BattlerTag::new(BattlerTagKind::AbilitySuppressed));
            assert!(!has_ab_attr(&ctx.field, holder, AbAttrKind::TypeImmunity));
        }

        #[test]
        fn ignorable_ability_is_bypassed_by_marked_attacker() {
            let levitate = Catalog::standard().ability("levitate").unwrap();
            let (mut ctx, holder, foe) = context_with((*levitate).clone());
            ctx.field.set_ignore_abilities(Some(foe));
            assert!(!has_ab_attr(&ctx.field, holder, AbAttrKind::TypeImmunity));
            ctx.field.set_ignore_abilities(Some(holder));
            assert!(has_ab_attr(&ctx.field, holder, AbAttrKind::TypeImmunity));
        }

        #[test]
        fn stage_ignoring_is_per_stat() {
            let keen = Ability::new("keen", "Keen").with_attr(AbilityAttr::new(
                AbAttr::IgnoreOpponentStatStages(IgnoreOpponentStatStages {
                    stats: vec![BattleStat::Evasion],
                }),
            ));
            let (ctx, holder, _) = context_with(keen);
            assert!(ignores_opponent_stage(&ctx.field, holder, BattleStat::Evasion));
            assert!(!ignores_opponent_stage(&ctx.field, holder, BattleStat::Accuracy));
        }
    }
}
