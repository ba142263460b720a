//! Phases that frame a turn: command collection, move ordering and upkeep.

use tracing::{debug, trace, warn};

use crate::combatant::{BattlerTagKind, CombatantId, LapseTrigger};
use crate::effects::{announce_tag_removed, deal_damage};
use crate::engine::{BattleOutcome, EngineContext};
use crate::event::BattleEvent;
use crate::phase::{Await, Command, Phase, PhaseKind, PhaseStatus, ResumeSignal};

use super::{order_by_priority_and_speed, BattleEndPhase, MovePhase};

// =============================================================================
// Turn init
// =============================================================================

/// Default turn-start phase: opens a turn and asks every active combatant
/// for a command.
#[derive(Debug, Default)]
pub struct TurnInitPhase;

impl TurnInitPhase {
    /// Creates the phase.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Phase for TurnInitPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::TurnInit
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        if ctx.config.max_turns.is_some_and(|max| ctx.turn >= max) {
            debug!(turn = ctx.turn, "turn limit reached");
            ctx.queue
                .unshift(Box::new(BattleEndPhase::new(BattleOutcome::Draw)));
            return PhaseStatus::Done;
        }

        ctx.turn += 1;
        let turn = ctx.turn;
        ctx.rng.begin_turn(turn);
        ctx.commands.clear();
        ctx.emit(BattleEvent::TurnStarted { turn });

        let active = ctx.field.all_active();
        for &id in &active {
            if let Some(c) = ctx.field.get_mut(id) {
                c.reset_turn_data();
            }
        }
        for &id in &active {
            ctx.queue.push(Box::new(CommandPhase::new(id)), false);
        }
        ctx.queue.push(Box::new(TurnStartPhase::new()), false);
        debug!(turn, combatants = active.len(), "turn opened");
        PhaseStatus::Done
    }
}

// =============================================================================
// Command
// =============================================================================

/// Collects one combatant's command for the turn.
///
/// A charging combatant is locked into its charged move and a combatant
/// with no PP left passes; neither waits for input.
#[derive(Debug)]
pub struct CommandPhase {
    combatant: CombatantId,
}

impl CommandPhase {
    /// Creates the phase.
    #[must_use]
    pub fn new(combatant: CombatantId) -> Self {
        Self { combatant }
    }

    fn store(&self, ctx: &mut EngineContext, command: Command) {
        trace!(combatant = %self.combatant, ?command, "command stored");
        ctx.commands.insert(self.combatant, command);
    }
}

impl Phase for CommandPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Command
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        if !ctx.field.is_active(self.combatant) {
            trace!(combatant = %self.combatant, "combatant left the field before choosing");
            return PhaseStatus::Done;
        }
        let Some(c) = ctx.field.get(self.combatant) else {
            return PhaseStatus::Done;
        };

        if let Some(tag) = c.tag(BattlerTagKind::Charging) {
            let slot = tag.source_move.as_ref().and_then(|id| c.slot_of(id));
            if let Some(slot) = slot {
                let command = Command::UseMove {
                    slot,
                    target: tag.target,
                };
                self.store(ctx, command);
                return PhaseStatus::Done;
            }
        }

        if c.usable_slots().is_empty() {
            let name = c.name().to_string();
            ctx.message(format!("{name} has no moves left!"));
            self.store(ctx, Command::Pass);
            return PhaseStatus::Done;
        }

        PhaseStatus::Await(Await::Command {
            combatant: self.combatant,
        })
    }

    fn resume(&mut self, ctx: &mut EngineContext, signal: ResumeSignal) -> PhaseStatus {
        let command = match signal {
            ResumeSignal::Command(command) => command,
            other => {
                warn!(combatant = %self.combatant, ?other, "command phase resumed without a command");
                Command::Pass
            }
        };
        let command = match command {
            Command::UseMove { slot, .. } => {
                let usable = ctx
                    .field
                    .get(self.combatant)
                    .and_then(|c| c.move_slot(slot))
                    .is_some_and(|s| s.is_usable());
                if usable {
                    command
                } else {
                    warn!(combatant = %self.combatant, slot, "command names an unusable slot");
                    Command::Pass
                }
            }
            Command::Pass => Command::Pass,
        };
        self.store(ctx, command);
        PhaseStatus::Done
    }

    fn combatant(&self) -> Option<CombatantId> {
        Some(self.combatant)
    }
}

// =============================================================================
// Turn start
// =============================================================================

/// Orders the turn's moves by priority, then speed, and queues them.
#[derive(Debug, Default)]
pub struct TurnStartPhase;

impl TurnStartPhase {
    /// Creates the phase.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Phase for TurnStartPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::TurnStart
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        let entries: Vec<(CombatantId, i8)> = ctx
            .commands
            .iter()
            .filter(|(id, _)| ctx.field.is_active(**id))
            .map(|(&id, command)| {
                let priority = match *command {
                    Command::UseMove { slot, .. } => ctx
                        .field
                        .get(id)
                        .and_then(|c| c.move_slot(slot))
                        .map_or(0, |s| s.mv().priority()),
                    Command::Pass => 0,
                };
                (id, priority)
            })
            .collect();

        for id in order_by_priority_and_speed(ctx, &entries) {
            if let Some(Command::UseMove { slot, target }) = ctx.commands.get(&id).copied() {
                ctx.queue
                    .push(Box::new(MovePhase::new(id, slot, target)), false);
            }
        }
        ctx.queue.push(Box::new(TurnEndPhase::new()), false);
        PhaseStatus::Done
    }
}

// =============================================================================
// Turn end
// =============================================================================

/// End-of-turn upkeep: chip damage, then tag, weather and arena tag lapses.
#[derive(Debug, Default)]
pub struct TurnEndPhase;

impl TurnEndPhase {
    /// Creates the phase.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn status_chip(ctx: &mut EngineContext, id: CombatantId) {
        let Some(status) = ctx.field.get_mut(id).and_then(|c| c.status_mut()) else {
            return;
        };
        let kind = status.kind;
        let Some((num, den)) = status.chip_fraction() else {
            return;
        };
        let Some(max_hp) = ctx.field.get(id).map(|c| c.max_hp()) else {
            return;
        };
        let amount = (max_hp * num / den).max(1);
        let name = ctx.field.name_of(id);
        ctx.message(format!("{name} is hurt by its {kind}!"));
        deal_damage(ctx, id, amount, None);
    }

    fn weather_chip(ctx: &mut EngineContext, id: CombatantId) {
        let Some(weather) = ctx.field.weather_kind() else {
            return;
        };
        let Some(c) = ctx.field.get(id).filter(|c| !c.is_fainted()) else {
            return;
        };
        if !weather.chips(c.types()) {
            return;
        }
        let amount = (c.max_hp() / 16).max(1);
        let name = c.name().to_string();
        ctx.message(format!("{name} is buffeted by the {weather}!"));
        deal_damage(ctx, id, amount, None);
    }
}

impl Phase for TurnEndPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::TurnEnd
    }

    fn start(&mut self, ctx: &mut EngineContext) -> PhaseStatus {
        for id in ctx.field.all_active() {
            if ctx.field.get(id).map_or(true, |c| c.is_fainted()) {
                continue;
            }
            Self::status_chip(ctx, id);
            Self::weather_chip(ctx, id);

            let expired = ctx
                .field
                .get_mut(id)
                .map(|c| c.lapse_tags(LapseTrigger::TurnEnd))
                .unwrap_or_default();
            for tag in expired {
                announce_tag_removed(ctx, id, tag.kind);
            }
            if let Some(c) = ctx.field.get_mut(id) {
                c.bump_turns_on_field();
            }
        }

        if let Some(weather) = ctx.field.lapse_weather() {
            ctx.emit(BattleEvent::WeatherChanged { weather: None });
            ctx.message(weather.end_message().to_string());
        }
        for tag in ctx.field.lapse_arena_tags() {
            ctx.emit(BattleEvent::ArenaTagRemoved {
                tag: tag.kind,
                side: tag.side,
            });
            ctx.message(format!("{} wore off!", tag.kind));
        }
        trace!(turn = ctx.turn, "turn closed");
        PhaseStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::combatant::{BattlerTag, CombatantTemplate, Side, StatusEffect, StatusKind};
    use crate::config::BattleConfig;
    use crate::element::Element;
    use crate::field::{Field, Weather, WeatherKind};

    fn duel(config: BattleConfig) -> (EngineContext, CombatantId, CombatantId) {
        let catalog = Catalog::standard();
        let mut field = Field::new(1);
        let hero = field.spawn(
            CombatantTemplate::new("Hero", Side::Player, 50)
                .with_move(catalog.move_by_id("tackle").unwrap())
                .with_move(catalog.move_by_id("quick_attack").unwrap()),
        );
        let foe = field.spawn(
            CombatantTemplate::new("Foe", Side::Enemy, 50)
                .with_move(catalog.move_by_id("tackle").unwrap()),
        );
        field.summon(hero, 0);
        field.summon(foe, 0);
        (EngineContext::new(config, field), hero, foe)
    }

    mod turn_init_tests {
        use super::*;

        #[test]
        fn opens_the_turn_and_requests_commands() {
            let (mut ctx, ..) = duel(BattleConfig::default());
            assert_eq!(TurnInitPhase::new().start(&mut ctx), PhaseStatus::Done);
            assert_eq!(ctx.turn, 1);
            // Two commands plus the turn start.
            assert_eq!(ctx.queue.len(), 3);
            assert!(ctx
                .events()
                .events()
                .any(|e| *e == BattleEvent::TurnStarted { turn: 1 }));
        }

        #[test]
        fn turn_limit_ends_in_a_draw() {
            let mut config = BattleConfig::default();
            config.max_turns = Some(0);
            let (mut ctx, ..) = duel(config);
            TurnInitPhase::new().start(&mut ctx);
            assert_eq!(ctx.turn, 0);
            assert_eq!(ctx.queue.prepended_len(), 1);
        }
    }

    mod command_tests {
        use super::*;

        #[test]
        fn waits_for_a_command() {
            let (mut ctx, hero, _) = duel(BattleConfig::default());
            let mut phase = CommandPhase::new(hero);
            assert_eq!(
                phase.start(&mut ctx),
                PhaseStatus::Await(Await::Command { combatant: hero })
            );
            let command = Command::UseMove {
                slot: 1,
                target: None,
            };
            phase.resume(&mut ctx, ResumeSignal::Command(command));
            assert_eq!(ctx.command(hero), Some(command));
        }

        #[test]
        fn unusable_slot_falls_back_to_pass() {
            let (mut ctx, hero, _) = duel(BattleConfig::default());
            let mut phase = CommandPhase::new(hero);
            phase.start(&mut ctx);
            phase.resume(
                &mut ctx,
                ResumeSignal::Command(Command::UseMove {
                    slot: 3,
                    target: None,
                }),
            );
            assert_eq!(ctx.command(hero), Some(Command::Pass));
        }

        #[test]
        fn charging_combatant_is_locked_in() {
            let (mut ctx, hero, foe) = duel(BattleConfig::default());
            let tackle = ctx.field.get(hero).unwrap().move_slot(0).unwrap().mv().id().clone();
            ctx.field.get_mut(hero).unwrap().add_tag(
                BattlerTag::new(BattlerTagKind::Charging)
                    .from_source(tackle, hero)
                    .targeting(foe),
            );
            assert_eq!(CommandPhase::new(hero).start(&mut ctx), PhaseStatus::Done);
            assert_eq!(
                ctx.command(hero),
                Some(Command::UseMove {
                    slot: 0,
                    target: Some(foe)
                })
            );
        }
    }

    mod turn_start_tests {
        use super::*;

        #[test]
        fn queues_moves_then_turn_end() {
            let (mut ctx, hero, foe) = duel(BattleConfig::default());
            ctx.commands.insert(
                hero,
                Command::UseMove {
                    slot: 0,
                    target: None,
                },
            );
            ctx.commands.insert(foe, Command::Pass);
            TurnStartPhase::new().start(&mut ctx);
            assert_eq!(ctx.queue.len(), 2);
        }
    }

    mod turn_end_tests {
        use super::*;

        #[test]
        fn burn_chips_a_sixteenth() {
            let (mut ctx, hero, _) = duel(BattleConfig::default());
            ctx.field
                .get_mut(hero)
                .unwrap()
                .set_status(Some(StatusEffect::new(StatusKind::Burn)));
            let max_hp = ctx.field.get(hero).unwrap().max_hp();
            TurnEndPhase::new().start(&mut ctx);
            assert_eq!(ctx.field.get(hero).unwrap().hp(), max_hp - max_hp / 16);
        }

        #[test]
        fn sandstorm_spares_steel_types() {
            let catalog = Catalog::standard();
            let mut field = Field::new(1);
            let rock = field.spawn(
                CombatantTemplate::new("Rocky", Side::Player, 50)
                    .with_types(&[Element::Steel])
                    .with_move(catalog.move_by_id("tackle").unwrap()),
            );
            let soft = field.spawn(
                CombatantTemplate::new("Soft", Side::Enemy, 50)
                    .with_move(catalog.move_by_id("tackle").unwrap()),
            );
            field.summon(rock, 0);
            field.summon(soft, 0);
            field.set_weather(Weather::new(WeatherKind::Sandstorm));
            let mut ctx = EngineContext::new(BattleConfig::default(), field);

            TurnEndPhase::new().start(&mut ctx);
            assert!(ctx.field.get(rock).unwrap().is_full_hp());
            assert!(!ctx.field.get(soft).unwrap().is_full_hp());
        }

        #[test]
        fn protection_expires_and_turns_on_field_advance() {
            let (mut ctx, hero, _) = duel(BattleConfig::default());
            ctx.field
                .get_mut(hero)
                .unwrap()
                .add_tag(BattlerTag::new(BattlerTagKind::Protected));
            TurnEndPhase::new().start(&mut ctx);
            let c = ctx.field.get(hero).unwrap();
            assert!(!c.has_tag(BattlerTagKind::Protected));
            assert_eq!(c.turns_on_field(), 1);
        }
    }
}
