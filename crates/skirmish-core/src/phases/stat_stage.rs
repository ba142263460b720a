//! Stat stage changes.

use tracing::{debug, trace};

use crate::ability::dispatch::{apply_post_stat_change_ab_attrs, apply_pre_stat_change_ab_attrs};
use crate::combatant::CombatantId;
use crate::engine::EngineContext;
use crate::event::BattleEvent;
use crate::holder::BoolHolder;
use crate::phase::{AnimationCue, Await, Phase, PhaseKind, PhaseStatus};
use crate::stat::BattleStat;

/// Moves one or more of a combatant's stat stages by the same amount.
///
/// A drop caused by another combatant runs through the target's
/// pre-change abilities first, one stat at a time. Stats that actually
/// moved are handed to the post-change abilities together.
#[derive(Debug)]
pub struct StatStageChangePhase {
    target: CombatantId,
    source: Option<CombatantId>,
    stats: Vec<BattleStat>,
    stages: i8,
}

impl StatStageChangePhase {
    /// Creates the phase.
    ///
    /// # Arguments
    ///
    /// * `source` - Combatant causing the change, if any
    /// * `stages` - Signed stage delta applied to every stat
    #[must_use]
    pub fn new(
        target: CombatantId,
        source: Option<CombatantId>,
        stats: Vec<BattleStat>,
        stages: i8,
    ) -> Self {
        Self {
            target,
            source,
            stats,
            stages,
        }
    }
}

fn change_message(name: &str, stat: BattleStat, delta: i8, requested: i8) -> String {
    let stat = stat.name();
    match delta {
        0 if requested > 0 => format!("{name}'s {stat} won't go any higher!"),
        0 => format!("{name}'s {stat} won't go any lower!"),
        1 => format!("{name}'s {stat} rose!"),
        2 => format!("{name}'s {stat} rose sharply!"),
        d if d > 2 => format!("{name}'s {stat} rose drastically!"),
        -1 => format!("{name}'s {stat} fell!"),
        -2 => format!("{name}'s {stat} harshly fell!"),
        _ => format!("{name}'s {stat} severely fell!"),
    }
}

impl Phase for StatStageChangePhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::StatStageChange
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        let standing = ctx
            .field
            .get(self.target)
            .is_some_and(|c| c.is_on_field() && !c.is_fainted());
        if !standing || self.stages == 0 {
            trace!(target = %self.target, "stat change skipped");
            return PhaseStatus::Done;
        }

        let by_other = self.source.is_some_and(|s| s != self.target);
        let name = ctx.field.name_of(self.target);
        let mut moved = Vec::with_capacity(self.stats.len());
        for &stat in &self.stats {
            if self.stages < 0 && by_other {
                let mut cancelled = BoolHolder::new(false);
                apply_pre_stat_change_ab_attrs(ctx, self.target, stat, &mut cancelled, false);
                if cancelled.value {
                    continue;
                }
            }
            let delta = ctx
                .field
                .get_mut(self.target)
                .map_or(0, |c| c.stages_mut().change(stat, self.stages));
            ctx.emit(BattleEvent::StatStageChanged {
                target: self.target,
                stat,
                delta,
            });
            ctx.message(change_message(&name, stat, delta, self.stages));
            if delta != 0 {
                moved.push(stat);
            }
        }

        if moved.is_empty() {
            return PhaseStatus::Done;
        }
        debug!(target = %self.target, ?moved, stages = self.stages, "stat stages changed");
        apply_post_stat_change_ab_attrs(ctx, self.target, &moved, self.stages, !by_other, false);
        PhaseStatus::Await(Await::Animation(AnimationCue::StatStage {
            target: self.target,
            rising: self.stages > 0,
        }))
    }

    fn combatant(&self) -> Option<CombatantId> {
        Some(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::combatant::{CombatantTemplate, Side};
    use crate::config::BattleConfig;
    use crate::field::Field;

    fn pair(target_ability: &str) -> (EngineContext, CombatantId, CombatantId) {
        let catalog = Catalog::standard();
        let mut field = Field::new(1);
        let user = field.spawn(CombatantTemplate::new("User", Side::Player, 50));
        let target = field.spawn(
            CombatantTemplate::new("Target", Side::Enemy, 50)
                .with_ability(catalog.ability(target_ability).unwrap()),
        );
        field.summon(user, 0);
        field.summon(target, 0);
        (EngineContext::new(BattleConfig::default(), field), user, target)
    }

    fn stage(ctx: &EngineContext, id: CombatantId, stat: BattleStat) -> i8 {
        ctx.field.get(id).unwrap().stages().get(stat)
    }

    #[test]
    fn drop_is_applied_and_announced() {
        let (mut ctx, user, target) = pair("pressure");
        let mut phase = StatStageChangePhase::new(target, Some(user), vec![BattleStat::Attack], -1);
        assert!(matches!(phase.start(&mut ctx), PhaseStatus::Await(_)));
        assert_eq!(stage(&ctx, target, BattleStat::Attack), -1);
        assert!(ctx.events().messages().any(|m| m == "Target's Attack fell!"));
    }

    #[test]
    fn guard_ability_blocks_drops_from_others_only() {
        let (mut ctx, user, target) = pair("clear_body");
        StatStageChangePhase::new(target, Some(user), vec![BattleStat::Defense], -2).start(&mut ctx);
        assert_eq!(stage(&ctx, target, BattleStat::Defense), 0);

        StatStageChangePhase::new(target, Some(target), vec![BattleStat::Defense], -2)
            .start(&mut ctx);
        assert_eq!(stage(&ctx, target, BattleStat::Defense), -2);
    }

    #[test]
    fn stage_at_the_limit_reports_no_change() {
        let (mut ctx, _, target) = pair("pressure");
        ctx.field
            .get_mut(target)
            .unwrap()
            .stages_mut()
            .change(BattleStat::Speed, 6);
        let status = StatStageChangePhase::new(target, None, vec![BattleStat::Speed], 1)
            .start(&mut ctx);
        assert_eq!(status, PhaseStatus::Done);
        assert!(ctx
            .events()
            .messages()
            .any(|m| m == "Target's Speed won't go any higher!"));
    }

    #[test]
    fn drop_by_an_opponent_triggers_a_reaction() {
        let (mut ctx, user, target) = pair("defiant");
        StatStageChangePhase::new(target, Some(user), vec![BattleStat::Speed], -1).start(&mut ctx);
        assert_eq!(ctx.queue.prepended_len(), 1);
    }

    #[test]
    fn messages_scale_with_the_delta() {
        assert_eq!(
            change_message("A", BattleStat::Attack, 2, 2),
            "A's Attack rose sharply!"
        );
        assert_eq!(
            change_message("A", BattleStat::Evasion, -3, -3),
            "A's evasiveness severely fell!"
        );
    }
}
