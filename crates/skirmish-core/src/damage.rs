//! Damage calculation for one connecting strike.
//!
//! The formula is the familiar level/power/attack/defense one:
//!
//! ```text
//! base = ((2 * level / 5 + 2) * power * attack / defense) / 50 + 2
//! ```
//!
//! followed by the modifier chain in this order: spread (×0.75), weather,
//! critical hit (×1.5), random variance (85-100%), same-type bonus (×1.5),
//! type effectiveness, burn on physical moves (×0.5), and the defender's
//! received-damage abilities. A strike that is not immune deals at least 1.

use tracing::trace;

use crate::ability::dispatch::{
    apply_move_power_ab_attrs, apply_pre_defend_ab_attrs, apply_stat_multiplier_ab_attrs,
    ignores_opponent_stage,
};
use crate::ability::{AbAttrKind, DefendArgs};
use crate::combatant::{BattlerTagKind, CombatantId, StatusKind};
use crate::element::Element;
use crate::engine::EngineContext;
use crate::holder::{BoolHolder, NumberHolder};
use crate::moves::{Move, MoveAttr, MoveAttrKind, MoveCategory, MoveFlags};
use crate::stat::{stage_multiplier, BattleStat};

/// Damage multiplier for moves that hit more than one target.
pub const SPREAD_MULTIPLIER: f64 = 0.75;
/// Damage multiplier for critical hits.
pub const CRITICAL_MULTIPLIER: f64 = 1.5;
/// Damage multiplier for a move matching one of its user's types.
pub const STAB_MULTIPLIER: f64 = 1.5;

/// Result of one damage calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageResult {
    /// HP to remove.
    pub damage: u32,
    /// The strike was critical.
    pub critical: bool,
    /// Type and ability effectiveness the damage was scaled by.
    pub effectiveness: f64,
}

impl DamageResult {
    const NONE: DamageResult = DamageResult {
        damage: 0,
        critical: false,
        effectiveness: 0.0,
    };
}

/// Inputs of one damage calculation besides the two combatants.
#[derive(Debug, Clone, Copy)]
pub struct Strike<'a> {
    /// Move used.
    pub mv: &'a Move,
    /// Effectiveness from hit resolution.
    pub effectiveness: f64,
    /// The move is hitting more than one target.
    pub spread: bool,
}

/// Computes the damage `user` deals to `target` with one strike.
///
/// When `simulated` is set, no randomness is drawn: the strike is never
/// critical and the variance factor is 1.
pub fn calculate_damage(
    ctx: &mut EngineContext,
    user: CombatantId,
    target: CombatantId,
    strike: Strike<'_>,
    simulated: bool,
) -> DamageResult {
    let mv = strike.mv;
    if mv.is_status() || strike.effectiveness <= 0.0 {
        return DamageResult::NONE;
    }
    let (Some(attacker), Some(defender)) = (ctx.field.get(user), ctx.field.get(target)) else {
        return DamageResult::NONE;
    };
    if mv.has_attr(MoveAttrKind::OneHitKo) {
        return DamageResult {
            damage: defender.hp(),
            critical: false,
            effectiveness: strike.effectiveness,
        };
    }

    let level = f64::from(attacker.level());
    let same_type = attacker.is_of_type(mv.element());
    let burned = attacker.has_status(StatusKind::Burn) && mv.category() == MoveCategory::Physical;
    let flash_fire = mv.element() == Element::Fire && attacker.has_tag(BattlerTagKind::FlashFire);
    let pierced_double = mv.attrs().iter().any(|a| {
        matches!(a, MoveAttr::HitsTag { tag, double_damage: true }
            if defender.semi_invulnerable_tag() == Some(*tag))
    });

    // Power.
    let mut power = NumberHolder::new(f64::from(mv.power()));
    apply_move_power_ab_attrs(ctx, user, mv, &mut power, simulated);
    if flash_fire {
        power.scale(1.5);
    }
    if pierced_double {
        power.scale(2.0);
    }

    let critical = !simulated && roll_critical(ctx, mv);

    // Attack and defense.
    let (attack_stat, defense_stat) = match mv.category() {
        MoveCategory::Special => (BattleStat::SpAttack, BattleStat::SpDefense),
        _ => (BattleStat::Attack, BattleStat::Defense),
    };
    let attack = offensive_stat(ctx, user, target, mv, attack_stat, critical, simulated);
    let defense = defensive_stat(ctx, user, target, mv, defense_stat, critical);

    let base = ((2.0 * level / 5.0 + 2.0).floor() * power.value * attack / defense.max(1.0))
        .floor()
        / 50.0;
    let mut damage = base.floor() + 2.0;

    if strike.spread {
        damage *= SPREAD_MULTIPLIER;
    }
    if let Some(weather) = ctx.field.weather_kind() {
        damage *= weather.damage_multiplier(mv.element());
    }
    if critical {
        damage *= CRITICAL_MULTIPLIER;
    }
    if ctx.config.damage_variance && !simulated {
        damage = (damage * f64::from(ctx.rng.random_int_range(85, 100)) / 100.0).floor();
    }
    if same_type {
        damage *= STAB_MULTIPLIER;
    }
    damage *= strike.effectiveness;
    if burned {
        damage *= 0.5;
    }

    let mut received = NumberHolder::new(1.0);
    let mut cancelled = BoolHolder::new(false);
    let args = DefendArgs {
        defender: target,
        attacker: user,
        mv,
    };
    apply_pre_defend_ab_attrs(
        ctx,
        &[AbAttrKind::ReceivedMoveDamageMultiplier],
        &args,
        &mut cancelled,
        &mut received,
        simulated,
    );
    damage *= received.value;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let damage = (damage.floor() as u32).max(1);
    trace!(%user, %target, move_id = %mv.id(), damage, critical, "damage calculated");
    DamageResult {
        damage,
        critical,
        effectiveness: strike.effectiveness,
    }
}

fn roll_critical(ctx: &mut EngineContext, mv: &Move) -> bool {
    if !ctx.config.critical_hits {
        return false;
    }
    let rate = if mv.flags().contains(MoveFlags::HIGH_CRIT) { 8 } else { 24 };
    ctx.rng.random_int(rate) == 0
}

/// The user's attacking stat. A critical hit ignores the user's own drops.
fn offensive_stat(
    ctx: &mut EngineContext,
    user: CombatantId,
    target: CombatantId,
    mv: &Move,
    stat: BattleStat,
    critical: bool,
    simulated: bool,
) -> f64 {
    let Some((raw, stage)) = raw_and_stage(ctx, user, stat) else {
        return 1.0;
    };
    let mut stage = if ignores_opponent_stage(&ctx.field, target, stat) {
        0
    } else {
        stage
    };
    if critical {
        stage = stage.max(0);
    }
    let mut multiplier = NumberHolder::new(1.0);
    apply_stat_multiplier_ab_attrs(ctx, user, stat, Some(mv), &mut multiplier, simulated);
    raw * stage_multiplier(stage) * multiplier.value
}

/// The target's defending stat. A critical hit ignores the target's boosts.
fn defensive_stat(
    ctx: &EngineContext,
    user: CombatantId,
    target: CombatantId,
    mv: &Move,
    stat: BattleStat,
    critical: bool,
) -> f64 {
    let Some((raw, stage)) = raw_and_stage(ctx, target, stat) else {
        return 1.0;
    };
    let mut stage = if ignores_opponent_stage(&ctx.field, user, stat)
        || mv.has_attr(MoveAttrKind::IgnoreOpponentStatStages)
    {
        0
    } else {
        stage
    };
    if critical {
        stage = stage.min(0);
    }
    raw * stage_multiplier(stage)
}

fn raw_and_stage(ctx: &EngineContext, id: CombatantId, stat: BattleStat) -> Option<(f64, i8)> {
    let c = ctx.field.get(id)?;
    let permanent = stat.permanent()?;
    Some((f64::from(c.stat(permanent)), c.stages().get(stat)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::combatant::{CombatantTemplate, Side, StatusEffect};
    use crate::config::BattleConfig;
    use crate::field::{Field, Weather, WeatherKind};

    fn duel(user: CombatantTemplate, target: CombatantTemplate) -> (EngineContext, CombatantId, CombatantId) {
        let mut field = Field::new(1);
        let u = field.spawn(user);
        let t = field.spawn(target);
        field.summon(u, 0);
        field.summon(t, 0);
        let config = BattleConfig::default().with_seed(5).without_damage_rolls();
        (EngineContext::new(config, field), u, t)
    }

    fn plain() -> (EngineContext, CombatantId, CombatantId) {
        duel(
            CombatantTemplate::new("User", Side::Player, 50),
            CombatantTemplate::new("Target", Side::Enemy, 50),
        )
    }

    fn damage_of(ctx: &mut EngineContext, u: CombatantId, t: CombatantId, id: &str, spread: bool) -> u32 {
        let mv = Catalog::standard().move_by_id(id).unwrap();
        calculate_damage(
            ctx,
            u,
            t,
            Strike {
                mv: &mv,
                effectiveness: 1.0,
                spread,
            },
            false,
        )
        .damage
    }

    #[test]
    fn status_moves_and_immune_targets_take_nothing() {
        let (mut ctx, u, t) = plain();
        let wave = Catalog::standard().move_by_id("thunder_wave").unwrap();
        let strike = Strike {
            mv: &wave,
            effectiveness: 1.0,
            spread: false,
        };
        assert_eq!(calculate_damage(&mut ctx, u, t, strike, false).damage, 0);

        let tackle = Catalog::standard().move_by_id("tackle").unwrap();
        let strike = Strike {
            mv: &tackle,
            effectiveness: 0.0,
            spread: false,
        };
        assert_eq!(calculate_damage(&mut ctx, u, t, strike, false).damage, 0);
    }

    #[test]
    fn fixed_inputs_give_fixed_damage() {
        let (mut ctx, u, t) = plain();
        let draws = ctx.rng.draws();
        let first = damage_of(&mut ctx, u, t, "vine_whip", false);
        let second = damage_of(&mut ctx, u, t, "vine_whip", false);
        assert_eq!(first, second);
        assert!(first >= 1);
        assert_eq!(ctx.rng.draws(), draws);
    }

    #[test]
    fn same_type_bonus_applies() {
        let (mut ctx, u, t) = plain();
        let normal = damage_of(&mut ctx, u, t, "tackle", false);
        let (mut ctx, u, t) = duel(
            CombatantTemplate::new("User", Side::Player, 50).with_types(&[Element::Fighting]),
            CombatantTemplate::new("Target", Side::Enemy, 50),
        );
        let off_type = damage_of(&mut ctx, u, t, "tackle", false);
        assert!(normal > off_type);
    }

    #[test]
    fn spread_reduces_damage() {
        let (mut ctx, u, t) = plain();
        let single = damage_of(&mut ctx, u, t, "surf", false);
        let spread = damage_of(&mut ctx, u, t, "surf", true);
        assert!(spread < single);
    }

    #[test]
    fn burn_halves_physical_damage_only() {
        let (mut ctx, u, t) = plain();
        let before = damage_of(&mut ctx, u, t, "double_edge", false);
        let special_before = damage_of(&mut ctx, u, t, "hyper_voice", false);
        ctx.field
            .get_mut(u)
            .unwrap()
            .set_status(Some(StatusEffect::new(StatusKind::Burn)));
        assert!(damage_of(&mut ctx, u, t, "double_edge", false) < before);
        assert_eq!(damage_of(&mut ctx, u, t, "hyper_voice", false), special_before);
    }

    #[test]
    fn rain_boosts_water_and_weakens_fire() {
        let (mut ctx, u, t) = plain();
        let water = damage_of(&mut ctx, u, t, "surf", false);
        let fire = damage_of(&mut ctx, u, t, "flamethrower", false);
        ctx.field.set_weather(Weather::new(WeatherKind::Rain));
        assert!(damage_of(&mut ctx, u, t, "surf", false) > water);
        assert!(damage_of(&mut ctx, u, t, "flamethrower", false) < fire);
    }

    #[test]
    fn multiscale_halves_damage_at_full_hp() {
        let (mut ctx, u, t) = plain();
        let plain_damage = damage_of(&mut ctx, u, t, "tackle", false);
        let (mut ctx, u, t) = duel(
            CombatantTemplate::new("User", Side::Player, 50),
            CombatantTemplate::new("Target", Side::Enemy, 50)
                .with_ability(Catalog::standard().ability("multiscale").unwrap()),
        );
        assert!(damage_of(&mut ctx, u, t, "tackle", false) < plain_damage);
    }

    #[test]
    fn sacred_sword_ignores_defense_boosts() {
        let (mut ctx, u, t) = duel(
            CombatantTemplate::new("User", Side::Player, 50).with_types(&[Element::Fighting]),
            CombatantTemplate::new("Target", Side::Enemy, 50),
        );
        let before = damage_of(&mut ctx, u, t, "sacred_sword", false);
        ctx.field
            .get_mut(t)
            .unwrap()
            .stages_mut()
            .change(BattleStat::Defense, 6);
        assert_eq!(damage_of(&mut ctx, u, t, "sacred_sword", false), before);
        assert!(damage_of(&mut ctx, u, t, "close_combat", false) < before * 2);
    }

    #[test]
    fn one_hit_ko_deals_remaining_hp() {
        let (mut ctx, u, t) = plain();
        let hp = ctx.field.get(t).unwrap().hp();
        assert_eq!(damage_of(&mut ctx, u, t, "fissure", false), hp);
    }

    #[test]
    fn minimum_damage_is_one() {
        let (mut ctx, u, t) = duel(
            CombatantTemplate::new("User", Side::Player, 1),
            CombatantTemplate::new("Target", Side::Enemy, 100),
        );
        let mv = Catalog::standard().move_by_id("tackle").unwrap();
        let strike = Strike {
            mv: &mv,
            effectiveness: 0.25,
            spread: true,
        };
        assert_eq!(calculate_damage(&mut ctx, u, t, strike, true).damage, 1);
    }
}
