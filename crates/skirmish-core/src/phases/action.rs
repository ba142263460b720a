//! Phases that execute a move: [`MovePhase`] decides whether and at whom the
//! move goes off, [`MoveEffectPhase`] resolves it one strike at a time and
//! [`MoveEndPhase`] cleans up after it.
//!
//! # Architecture
//!
//! ```text
//! Move ──► MoveEffect(strike 0) ──► follow-ups ──► MoveEffect(strike 1) ──► ... ──► MoveEnd
//! ```
//!
//! Every `MoveEffect` pins the insertion point when it starts, so the stat
//! changes and faints a strike causes run in the order they were queued and
//! the next strike, unshifted last, runs after them. The move's history
//! record is written when the last strike finishes, or by `Move` when the
//! move never got that far.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::ability::dispatch::{apply_post_defend_ab_attrs, has_ab_attr};
use crate::ability::{AbAttrKind, DefendArgs};
use crate::combatant::{
    BattlerTag, BattlerTagKind, Combatant, CombatantId, LapseTrigger, MoveOutcome, MoveRecord,
    StatusKind,
};
use crate::damage::{calculate_damage, Strike};
use crate::effects::{announce_tag_removed, cure_status, deal_damage};
use crate::engine::EngineContext;
use crate::event::BattleEvent;
use crate::hit::{hit_check, HitCheckEntry, HitCheckResult};
use crate::moves::dispatch::{apply_move_effects, check_move_conditions, roll_hit_count};
use crate::moves::{EffectTrigger, HitFlags, Move, MoveAttr, MoveAttrKind, MoveFlags, MoveTarget};
use crate::phase::{AnimationCue, Await, Phase, PhaseKind, PhaseStatus, ResumeSignal};
use crate::stat::BattleStat;

/// Power of the hit a confused combatant deals itself.
const CONFUSION_POWER: f64 = 40.0;

fn record(ctx: &mut EngineContext, user: CombatantId, mv: &Move, targets: Vec<CombatantId>, outcome: MoveOutcome) {
    let turn = ctx.turn;
    if let Some(c) = ctx.field.get_mut(user) {
        c.record_move(MoveRecord {
            move_id: mv.id().clone(),
            targets,
            outcome,
            turn,
        });
    }
    trace!(%user, move_id = %mv.id(), ?outcome, "move recorded");
}

// =============================================================================
// Move
// =============================================================================

/// Executes one combatant's chosen move.
#[derive(Debug)]
pub struct MovePhase {
    user: CombatantId,
    slot: usize,
    target: Option<CombatantId>,
}

impl MovePhase {
    /// Creates the phase.
    ///
    /// # Arguments
    ///
    /// * `slot` - Moveset slot of the move
    /// * `target` - Chosen target; `None` lets the move pick
    #[must_use]
    pub fn new(user: CombatantId, slot: usize, target: Option<CombatantId>) -> Self {
        Self { user, slot, target }
    }

    /// Runs the checks that can stop a combatant from moving at all.
    ///
    /// Returns `false` if the combatant cannot act this turn.
    fn can_act(&self, ctx: &mut EngineContext) -> bool {
        let name = ctx.field.name_of(self.user);

        match ctx.field.get(self.user).and_then(|c| c.status()).map(|s| s.kind) {
            Some(StatusKind::Sleep) => {
                let still_asleep = ctx
                    .field
                    .get_mut(self.user)
                    .and_then(|c| c.status_mut())
                    .is_some_and(|s| {
                        s.turns = s.turns.saturating_sub(1);
                        s.turns > 0
                    });
                if still_asleep {
                    ctx.message(format!("{name} is fast asleep."));
                    return false;
                }
                cure_status(ctx, self.user);
                ctx.message(format!("{name} woke up!"));
            }
            Some(StatusKind::Freeze) => {
                if ctx.rng.random_int(5) != 0 {
                    ctx.message(format!("{name} is frozen solid!"));
                    return false;
                }
                cure_status(ctx, self.user);
                ctx.message(format!("{name} thawed out!"));
            }
            Some(StatusKind::Paralysis) if ctx.rng.random_int(4) == 0 => {
                ctx.message(format!("{name} is paralyzed! It can't move!"));
                return false;
            }
            _ => {}
        }

        let flinched = ctx
            .field
            .get(self.user)
            .is_some_and(|c| c.has_tag(BattlerTagKind::Flinched));
        let expired = ctx
            .field
            .get_mut(self.user)
            .map(|c| c.lapse_tags(LapseTrigger::PreMove))
            .unwrap_or_default();
        for tag in &expired {
            announce_tag_removed(ctx, self.user, tag.kind);
        }
        if flinched {
            ctx.message(format!("{name} flinched!"));
            return false;
        }

        let confused = ctx
            .field
            .get(self.user)
            .is_some_and(|c| c.has_tag(BattlerTagKind::Confused));
        if confused {
            ctx.message(format!("{name} is confused!"));
            if ctx.rng.random_int(3) == 0 {
                let damage = ctx.field.get(self.user).map_or(0, confusion_damage);
                ctx.message("It hurt itself in its confusion!".to_string());
                deal_damage(ctx, self.user, damage, None);
                return false;
            }
        }
        true
    }

    /// Resolves who the move is aimed at.
    fn resolve_targets(&self, ctx: &mut EngineContext, mv: &Move) -> Vec<CombatantId> {
        let opponents = ctx.field.opponents_of(self.user);
        let chosen = self.target.filter(|t| ctx.field.is_active(*t));
        match mv.target() {
            MoveTarget::User | MoveTarget::UserSide | MoveTarget::EnemySide | MoveTarget::BothSides => {
                vec![self.user]
            }
            MoveTarget::NearEnemy => match chosen.filter(|t| opponents.contains(t)) {
                Some(t) => vec![t],
                None => pick_one(ctx, &opponents),
            },
            MoveTarget::NearOther => match chosen.filter(|t| *t != self.user) {
                Some(t) => vec![t],
                None => pick_one(ctx, &opponents),
            },
            MoveTarget::RandomNearEnemy => pick_one(ctx, &opponents),
            MoveTarget::AllNearEnemies => opponents,
            MoveTarget::AllNearOthers => {
                let mut all = opponents;
                all.extend(ctx.field.allies_of(self.user));
                all
            }
            MoveTarget::NearAlly => {
                let allies = ctx.field.allies_of(self.user);
                match chosen.filter(|t| allies.contains(t)) {
                    Some(t) => vec![t],
                    None => allies.into_iter().take(1).collect(),
                }
            }
        }
    }

    fn fail(&self, ctx: &mut EngineContext, mv: &Move, message: bool) {
        if message {
            ctx.message("But it failed!".to_string());
        }
        record(ctx, self.user, mv, Vec::new(), MoveOutcome::Fail);
    }

    /// Drops the charge state of an interrupted two-turn move.
    fn cancel_charge(&self, ctx: &mut EngineContext) {
        let Some(c) = ctx.field.get_mut(self.user) else {
            return;
        };
        c.remove_tag(BattlerTagKind::Charging);
        let hidden = c.semi_invulnerable_tag().and_then(|kind| c.remove_tag(kind));
        if let Some(tag) = hidden {
            ctx.emit(BattleEvent::TagRemoved {
                target: self.user,
                tag: tag.kind,
            });
        }
    }
}

impl Phase for MovePhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Move
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        let Some(c) = ctx.field.get(self.user) else {
            warn!(user = %self.user, "move phase for an untracked combatant");
            return PhaseStatus::Done;
        };
        if !c.is_on_field() || c.is_fainted() {
            trace!(user = %self.user, "user is no longer on the field");
            return PhaseStatus::Done;
        }
        let Some(mv) = c.move_slot(self.slot).map(|s| Arc::clone(s.mv())) else {
            warn!(user = %self.user, slot = self.slot, "move phase for an empty slot");
            return PhaseStatus::Done;
        };
        let charged = c.has_tag(BattlerTagKind::Charging);
        if let Some(c) = ctx.field.get_mut(self.user) {
            c.turn_data_mut().acted = true;
        }

        if !self.can_act(ctx) {
            self.cancel_charge(ctx);
            self.fail(ctx, &mv, false);
            return PhaseStatus::Done;
        }

        let name = ctx.field.name_of(self.user);
        if !charged {
            let spent = ctx
                .field
                .get_mut(self.user)
                .and_then(|c| c.move_slot_mut(self.slot))
                .is_some_and(|s| s.spend_pp());
            if !spent {
                ctx.message(format!("{name} has no PP left for {}!", mv.name()));
                self.fail(ctx, &mv, false);
                return PhaseStatus::Done;
            }
        }
        ctx.message(format!("{name} used {}!", mv.name()));
        ctx.emit(BattleEvent::MoveUsed {
            user: self.user,
            move_id: mv.id().clone(),
        });

        let charge = mv.attrs().iter().find_map(|a| match a {
            MoveAttr::Charge { tag, message } => Some((*tag, message.clone())),
            _ => None,
        });
        if let Some((hide, message)) = charge {
            if charged {
                self.cancel_charge(ctx);
            } else {
                let aim = self.target.or_else(|| ctx.field.opponents_of(self.user).first().copied());
                let mut tag = BattlerTag::new(BattlerTagKind::Charging).from_source(mv.id().clone(), self.user);
                if let Some(aim) = aim {
                    tag = tag.targeting(aim);
                }
                if let Some(c) = ctx.field.get_mut(self.user) {
                    c.add_tag(tag);
                    if let Some(kind) = hide {
                        c.add_tag(BattlerTag::new(kind));
                    }
                }
                if let Some(kind) = hide {
                    ctx.emit(BattleEvent::TagAdded {
                        target: self.user,
                        tag: kind,
                    });
                }
                ctx.message(message.replace("{name}", &name));
                record(ctx, self.user, &mv, Vec::new(), MoveOutcome::Charging);
                debug!(user = %self.user, move_id = %mv.id(), "charging");
                return PhaseStatus::Done;
            }
        }

        let targets = self.resolve_targets(ctx, &mv);
        if targets.is_empty() || !check_move_conditions(ctx, self.user, &mv) {
            self.fail(ctx, &mv, true);
            return PhaseStatus::Done;
        }

        let bypass = mv.flags().contains(MoveFlags::IGNORE_ABILITIES)
            || has_ab_attr(&ctx.field, self.user, AbAttrKind::MoveAbilityBypass);
        if bypass {
            ctx.field.set_ignore_abilities(Some(self.user));
        }

        let hits = roll_hit_count(ctx, self.user, &mv);
        if let Some(c) = ctx.field.get_mut(self.user) {
            let data = c.turn_data_mut();
            data.hit_count = hits;
            data.hits_left = hits;
        }
        debug!(user = %self.user, move_id = %mv.id(), ?targets, hits, "move executing");

        ctx.queue.mark_insertion_point();
        ctx.queue
            .unshift(Box::new(MoveEffectPhase::new(self.user, mv, targets, hits)));
        ctx.queue.unshift(Box::new(MoveEndPhase::new(self.user)));
        PhaseStatus::Done
    }

    fn combatant(&self) -> Option<CombatantId> {
        Some(self.user)
    }
}

fn pick_one(ctx: &mut EngineContext, candidates: &[CombatantId]) -> Vec<CombatantId> {
    match candidates.len() {
        0 => Vec::new(),
        1 => vec![candidates[0]],
        n => {
            let bound = u32::try_from(n).unwrap_or(u32::MAX);
            let index = ctx.rng.random_int(bound) as usize;
            vec![candidates[index]]
        }
    }
}

/// Damage of a confused combatant's self-hit: typeless and physical.
fn confusion_damage(c: &Combatant) -> u32 {
    let level = f64::from(c.level());
    let attack = c.effective_stat(BattleStat::Attack);
    let defense = c.effective_stat(BattleStat::Defense).max(1.0);
    let base = ((2.0 * level / 5.0 + 2.0).floor() * CONFUSION_POWER * attack / defense).floor() / 50.0;
    // Bounded by the HP range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let damage = (base.floor() + 2.0) as u32;
    damage.max(1)
}

// =============================================================================
// Move effect
// =============================================================================

/// Resolves one strike of a move against all of its targets.
pub struct MoveEffectPhase {
    user: CombatantId,
    mv: Arc<Move>,
    targets: Vec<CombatantId>,
    strike: u32,
    total: u32,
    landed: u32,
    hits: Vec<(CombatantId, HitCheckEntry)>,
}

impl std::fmt::Debug for MoveEffectPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveEffectPhase")
            .field("user", &self.user)
            .field("move", self.mv.id())
            .field("targets", &self.targets)
            .field("strike", &format!("{}/{}", self.strike + 1, self.total))
            .finish_non_exhaustive()
    }
}

impl MoveEffectPhase {
    /// Creates the phase for the first strike of a move.
    #[must_use]
    pub fn new(user: CombatantId, mv: Arc<Move>, targets: Vec<CombatantId>, total: u32) -> Self {
        Self {
            user,
            mv,
            targets,
            strike: 0,
            total: total.max(1),
            landed: 0,
            hits: Vec::new(),
        }
    }

    fn next_strike(&self, targets: Vec<CombatantId>) -> Self {
        Self {
            user: self.user,
            mv: Arc::clone(&self.mv),
            targets,
            strike: self.strike + 1,
            total: self.total,
            landed: self.landed,
            hits: Vec::new(),
        }
    }

    /// Writes the record and the strike summary once the sequence is over.
    fn finish(&self, ctx: &mut EngineContext) {
        if self.total > 1 && self.landed > 0 {
            let times = if self.landed == 1 { "time" } else { "times" };
            ctx.message(format!("Hit {} {times}!", self.landed));
        }
        let outcome = if self.landed > 0 {
            MoveOutcome::Success
        } else {
            MoveOutcome::Miss
        };
        record(ctx, self.user, &self.mv, self.targets.clone(), outcome);
    }

    fn announce_miss(ctx: &mut EngineContext, user: CombatantId, target: CombatantId, result: HitCheckResult) {
        let name = ctx.field.name_of(target);
        match result {
            HitCheckResult::Miss => {
                ctx.emit(BattleEvent::Missed { user, target });
                ctx.message(format!("{name} avoided the attack!"));
            }
            HitCheckResult::NoEffect => {
                ctx.emit(BattleEvent::NoEffect { target });
                ctx.message(format!("It doesn't affect {name}..."));
            }
            _ => {}
        }
    }

    fn strike_target(&self, ctx: &mut EngineContext, index: usize, target: CombatantId, entry: HitCheckEntry) {
        let mv = Arc::clone(&self.mv);
        let mut flags = HitFlags {
            first_hit: self.strike == 0,
            last_hit: self.strike + 1 >= self.total,
            first_target: index == 0,
        };

        apply_move_effects(ctx, EffectTrigger::BeforeHit, self.user, target, &mv, flags, 0);

        let mut dealt = 0;
        if !mv.is_status() {
            let spread = mv.target().is_spread() && self.targets.len() > 1;
            let result = calculate_damage(
                ctx,
                self.user,
                target,
                Strike {
                    mv: &mv,
                    effectiveness: entry.multiplier,
                    spread,
                },
                false,
            );
            if result.critical {
                ctx.message("A critical hit!".to_string());
            }
            if mv.has_attr(MoveAttrKind::OneHitKo) {
                ctx.message("It's a one-hit KO!".to_string());
            } else if flags.first_hit && result.effectiveness > 1.0 {
                ctx.message("It's super effective!".to_string());
            } else if flags.first_hit && result.effectiveness < 1.0 {
                ctx.message("It's not very effective...".to_string());
            }
            dealt = deal_damage(ctx, target, result.damage, Some(self.user));
        }

        let args = DefendArgs {
            defender: target,
            attacker: self.user,
            mv: &mv,
        };
        apply_post_defend_ab_attrs(ctx, &args, false);

        if ctx.field.get(target).map_or(true, |c| c.is_fainted()) {
            flags.last_hit = true;
        }
        apply_move_effects(ctx, EffectTrigger::AfterHit, self.user, target, &mv, flags, dealt);
        if flags.last_hit {
            apply_move_effects(ctx, EffectTrigger::LastHit, self.user, target, &mv, flags, dealt);
        }
    }
}

impl Phase for MoveEffectPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::MoveEffect
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        if ctx.field.get(self.user).map_or(true, |c| !c.is_on_field() || c.is_fainted()) {
            trace!(user = %self.user, "user left the field mid-move");
            self.finish(ctx);
            return PhaseStatus::Done;
        }
        ctx.queue.mark_insertion_point();

        let mv = Arc::clone(&self.mv);
        let mut hits = Vec::with_capacity(self.targets.len());
        for &target in &self.targets {
            let entry = hit_check(ctx, self.user, &mv, target, self.strike);
            if entry.result.is_unresolved() {
                warn!(user = %self.user, move_id = %mv.id(), "hit check unresolved, aborting");
                return PhaseStatus::Done;
            }
            if entry.is_hit() {
                hits.push((target, entry));
            } else {
                Self::announce_miss(ctx, self.user, target, entry.result);
            }
        }

        if hits.is_empty() {
            self.finish(ctx);
            return PhaseStatus::Done;
        }
        let struck = hits.iter().map(|(t, _)| *t).collect();
        self.hits = hits;
        PhaseStatus::Await(Await::Animation(AnimationCue::Move {
            user: self.user,
            move_id: mv.id().clone(),
            targets: struck,
        }))
    }

    fn resume(&mut self, ctx: &mut EngineContext, _signal: ResumeSignal) -> PhaseStatus {
        let hits = std::mem::take(&mut self.hits);
        for (index, &(target, entry)) in hits.iter().enumerate() {
            self.strike_target(ctx, index, target, entry);
        }
        self.landed += 1;
        if let Some(c) = ctx.field.get_mut(self.user) {
            let data = c.turn_data_mut();
            data.hits_left = data.hits_left.saturating_sub(1);
        }

        let user_standing = ctx
            .field
            .get(self.user)
            .is_some_and(|c| c.is_on_field() && !c.is_fainted());
        let standing: Vec<CombatantId> = hits
            .iter()
            .map(|(t, _)| *t)
            .filter(|t| ctx.field.get(*t).is_some_and(|c| c.is_on_field() && !c.is_fainted()))
            .collect();
        if self.strike + 1 < self.total && user_standing && !standing.is_empty() {
            ctx.queue.unshift(Box::new(self.next_strike(standing)));
        } else {
            self.finish(ctx);
        }
        PhaseStatus::Done
    }

    fn combatant(&self) -> Option<CombatantId> {
        Some(self.user)
    }
}

// =============================================================================
// Move end
// =============================================================================

/// Lapses the user's after-move tags and lifts the ability bypass.
#[derive(Debug)]
pub struct MoveEndPhase {
    user: CombatantId,
}

impl MoveEndPhase {
    /// Creates the phase.
    #[must_use]
    pub fn new(user: CombatantId) -> Self {
        Self { user }
    }
}

impl Phase for MoveEndPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::MoveEnd
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        let expired = ctx
            .field
            .get_mut(self.user)
            .map(|c| c.lapse_tags(LapseTrigger::AfterMove))
            .unwrap_or_default();
        for tag in expired {
            announce_tag_removed(ctx, self.user, tag.kind);
        }
        ctx.field.set_ignore_abilities(None);
        PhaseStatus::Done
    }

    fn combatant(&self) -> Option<CombatantId> {
        Some(self.user)
    }
}
