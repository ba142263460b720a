//! State-changing primitives shared by attributes and phases.
//!
//! Every write to a combatant's HP, status, tags, or to the field's arena
//! tags and weather, goes through here so the event log and the follow-up
//! phases (stat changes, fainting) stay consistent no matter which fragment
//! caused the change.

use tracing::{debug, trace};

use crate::ability::dispatch::{apply_status_immunity_ab_attrs, apply_tag_immunity_ab_attrs};
use crate::combatant::{BattlerTag, BattlerTagKind, CombatantId, StatusEffect, StatusKind};
use crate::engine::EngineContext;
use crate::event::BattleEvent;
use crate::field::{ArenaTag, Weather, WeatherKind};
use crate::holder::BoolHolder;
use crate::phase::PhaseKind;
use crate::phases::{FaintPhase, StatStageChangePhase};
use crate::stat::BattleStat;

/// Inflicts a status condition. Returns `true` if it took hold.
///
/// Fails on a fainted target, a target that already has a status, a target
/// whose type is immune, or one whose ability blocks the status.
pub fn try_set_status(
    ctx: &mut EngineContext,
    target: CombatantId,
    kind: StatusKind,
    source: Option<CombatantId>,
    simulated: bool,
) -> bool {
    let Some(c) = ctx.field.get(target) else {
        return false;
    };
    if c.is_fainted() || c.status().is_some() {
        return false;
    }
    if kind.immune_types().iter().any(|t| c.is_of_type(*t)) {
        return false;
    }
    let mut cancelled = BoolHolder::new(false);
    apply_status_immunity_ab_attrs(ctx, target, kind, &mut cancelled, simulated);
    if cancelled.value {
        return false;
    }
    if simulated {
        return true;
    }

    let effect = if kind == StatusKind::Sleep {
        StatusEffect::with_turns(kind, ctx.rng.random_int_range(1, 3))
    } else {
        StatusEffect::new(kind)
    };
    if let Some(c) = ctx.field.get_mut(target) {
        c.set_status(Some(effect));
    }
    debug!(%target, ?kind, ?source, "status applied");
    ctx.emit(BattleEvent::StatusApplied {
        target,
        status: kind,
    });
    let name = ctx.field.name_of(target);
    ctx.message(kind.inflicted_message(&name));
    true
}

/// Ends a combatant's status condition.
pub fn cure_status(ctx: &mut EngineContext, target: CombatantId) -> Option<StatusKind> {
    let c = ctx.field.get_mut(target)?;
    let kind = c.status()?.kind;
    c.set_status(None);
    ctx.emit(BattleEvent::StatusCured {
        target,
        status: kind,
    });
    Some(kind)
}

/// Attaches a battler tag. Returns `true` if it was attached.
pub fn try_add_tag(
    ctx: &mut EngineContext,
    target: CombatantId,
    tag: BattlerTag,
    simulated: bool,
) -> bool {
    let Some(c) = ctx.field.get(target) else {
        return false;
    };
    if c.is_fainted() || c.has_tag(tag.kind) {
        return false;
    }
    let mut cancelled = BoolHolder::new(false);
    apply_tag_immunity_ab_attrs(ctx, target, tag.kind, &mut cancelled, simulated);
    if cancelled.value {
        return false;
    }
    if simulated {
        return true;
    }

    let kind = tag.kind;
    let added = ctx.field.get_mut(target).is_some_and(|c| c.add_tag(tag));
    if added {
        trace!(%target, ?kind, "tag added");
        ctx.emit(BattleEvent::TagAdded { target, tag: kind });
        let name = ctx.field.name_of(target);
        if let Some(text) = kind.added_message(&name) {
            ctx.message(text);
        }
    }
    added
}

/// Detaches a battler tag. Returns `true` if one was attached.
pub fn remove_tag(ctx: &mut EngineContext, target: CombatantId, kind: BattlerTagKind) -> bool {
    let removed = ctx
        .field
        .get_mut(target)
        .and_then(|c| c.remove_tag(kind))
        .is_some();
    if removed {
        announce_tag_removed(ctx, target, kind);
    }
    removed
}

/// Records the removal of a tag that already left its holder.
pub fn announce_tag_removed(ctx: &mut EngineContext, target: CombatantId, kind: BattlerTagKind) {
    trace!(%target, ?kind, "tag removed");
    ctx.emit(BattleEvent::TagRemoved { target, tag: kind });
    let name = ctx.field.name_of(target);
    if let Some(text) = kind.removed_message(&name) {
        ctx.message(text);
    }
}

/// Queues a stat stage change to run before anything already queued.
///
/// # Arguments
///
/// * `source` - Combatant causing the change; a change caused by someone
///   other than `target` can be blocked by the target's ability
pub fn queue_stat_change(
    ctx: &mut EngineContext,
    target: CombatantId,
    source: Option<CombatantId>,
    stats: Vec<BattleStat>,
    stages: i8,
) {
    ctx.queue.unshift(Box::new(StatStageChangePhase::new(
        target, source, stats, stages,
    )));
}

/// Removes HP and schedules fainting. Returns the HP actually removed.
pub fn deal_damage(
    ctx: &mut EngineContext,
    target: CombatantId,
    amount: u32,
    source: Option<CombatantId>,
) -> u32 {
    let dealt = ctx.field.apply_damage(target, amount);
    if dealt == 0 {
        return 0;
    }
    ctx.emit(BattleEvent::Damaged {
        target,
        source,
        amount: dealt,
    });
    if let Some(source) = source.filter(|s| *s != target) {
        if let Some(c) = ctx.field.get_mut(target) {
            c.turn_data_mut().last_attacker = Some(source);
        }
        if let Some(c) = ctx.field.get_mut(source) {
            c.turn_data_mut().damage_dealt += dealt;
        }
    }
    if ctx.field.get(target).is_some_and(|c| c.is_fainted()) {
        let queued = ctx
            .queue
            .find(|p| p.kind() == PhaseKind::Faint && p.combatant() == Some(target));
        if !queued {
            ctx.queue.unshift(Box::new(FaintPhase::new(target)));
        }
    }
    dealt
}

/// Restores HP. Returns the HP actually restored.
pub fn heal(ctx: &mut EngineContext, target: CombatantId, amount: u32) -> u32 {
    let healed = ctx.field.heal(target, amount);
    if healed > 0 {
        ctx.emit(BattleEvent::Healed {
            target,
            amount: healed,
        });
    }
    healed
}

/// Sets an arena tag. Returns `false` if the same tag already covers that side.
pub fn add_arena_tag(ctx: &mut EngineContext, tag: ArenaTag) -> bool {
    let (kind, side) = (tag.kind, tag.side);
    if !ctx.field.add_arena_tag(tag) {
        return false;
    }
    debug!(?kind, ?side, "arena tag added");
    ctx.emit(BattleEvent::ArenaTagAdded { tag: kind, side });
    ctx.message(format!("{} took effect!", capitalize(kind.name())));
    true
}

/// Starts a weather. Returns `false` if it is already active.
pub fn set_weather(ctx: &mut EngineContext, kind: WeatherKind) -> bool {
    if !ctx.field.set_weather(Weather::new(kind)) {
        return false;
    }
    ctx.emit(BattleEvent::WeatherChanged {
        weather: Some(kind),
    });
    ctx.message(kind.start_message().to_string());
    true
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
