//! Determinism verification tests.
//!
//! A battle must replay exactly from its seed:
//! - Same seed and roster produce the same event log
//! - Hit checks draw the same numbers from the same turn stream
//! - Scheduler ordering depends only on the calls made

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use proptest::prelude::*;

use crate::ability::{AbAttr, Ability, AbilityAttr, MoveEffectChanceMultiplier};
use crate::catalog::Catalog;
use crate::combatant::{BattlerTagKind, CombatantId, Side};
use crate::config::BattleConfig;
use crate::engine::{EngineContext, Engine};
use crate::field::{ArenaTag, ArenaTagKind, ArenaTagSide, Field};
use crate::hit::hit_check;
use crate::moves::dispatch::effect_chance;
use crate::moves::{MoveEffect, MoveEffectAttr};
use crate::stat::BattleStat;

use super::helpers::{doubles, fighter, step_queue, tackle_duel, Probe, Trace};

// =============================================================================
// Whole battles
// =============================================================================

#[test]
fn same_seed_replays_the_same_battle() {
    let mut first = tackle_duel(42);
    let mut second = tackle_duel(42);
    assert_eq!(first.run_headless(), second.run_headless());
    assert_eq!(first.events().records(), second.events().records());
    assert_eq!(first.turn(), second.turn());
}

#[test]
fn doubles_replay_the_same_battle() {
    let mut first = doubles(7);
    let mut second = doubles(7);
    first.run_headless();
    second.run_headless();
    assert!(!first.events().is_empty());
    assert_eq!(first.events().records(), second.events().records());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn any_seed_replays(seed in any::<u64>()) {
        let mut first = tackle_duel(seed);
        let mut second = tackle_duel(seed);
        prop_assert_eq!(first.run_headless(), second.run_headless());
        prop_assert_eq!(first.events().records(), second.events().records());
    }
}

// =============================================================================
// Hit checks
// =============================================================================

fn accuracy_duel(seed: u64) -> (EngineContext, CombatantId, CombatantId) {
    let mut field = Field::new(1);
    let user = field.spawn(fighter("User", Side::Player, 50, &["thunder"]));
    let target = field.spawn(fighter("Target", Side::Enemy, 50, &["tackle"]));
    field.summon(user, 0);
    field.summon(target, 0);
    let mut ctx = EngineContext::new(BattleConfig::default().with_seed(seed), field);
    ctx.rng.begin_turn(1);
    (ctx, user, target)
}

proptest! {
    #[test]
    fn hit_checks_repeat_from_the_same_stream(seed in any::<u64>()) {
        let thunder = Catalog::standard().move_by_id("thunder").unwrap();
        let (mut a, user, target) = accuracy_duel(seed);
        let (mut b, _, _) = accuracy_duel(seed);
        for hit_index in 0..4 {
            let left = hit_check(&mut a, user, &thunder, target, hit_index);
            let right = hit_check(&mut b, user, &thunder, target, hit_index);
            prop_assert_eq!(left, right);
        }
        prop_assert_eq!(a.rng.draws(), b.rng.draws());
    }
}

// =============================================================================
// Effect chance
// =============================================================================

fn boosted(factors: &[f64]) -> Ability {
    factors.iter().fold(Ability::new("boosted", "Boosted"), |ability, &factor| {
        ability.with_attr(AbilityAttr::new(AbAttr::MoveEffectChanceMultiplier(
            MoveEffectChanceMultiplier { factor },
        )))
    })
}

proptest! {
    #[test]
    fn resolved_chance_stays_in_range(
        base in 0u32..=100,
        factors in prop::collection::vec(0.0f64..8.0, 0..5),
        rainbow in any::<bool>(),
        shield_dust in any::<bool>(),
        self_target in any::<bool>(),
    ) {
        let catalog = Catalog::standard();
        let mut defender = fighter("Target", Side::Enemy, 50, &["tackle"]);
        if shield_dust {
            defender = defender.with_ability(catalog.ability("shield_dust").unwrap());
        }
        let mut field = Field::new(1);
        let user = field.spawn(
            fighter("User", Side::Player, 50, &["tackle"]).with_ability(Arc::new(boosted(&factors))),
        );
        let target = field.spawn(defender);
        field.summon(user, 0);
        field.summon(target, 0);
        if rainbow {
            field.add_arena_tag(ArenaTag::new(ArenaTagKind::Rainbow, ArenaTagSide::Player));
        }
        let mut ctx = EngineContext::new(BattleConfig::default(), field);

        let mv = catalog.move_by_id("tackle").unwrap();
        let attr = if self_target {
            MoveEffectAttr::on_user(MoveEffect::StatStages {
                stats: vec![BattleStat::Attack],
                stages: 1,
            })
        } else {
            MoveEffectAttr::on_target(MoveEffect::AddTag(BattlerTagKind::Flinched))
        }
        .with_chance(base);
        let chance = effect_chance(&mut ctx, &attr, user, target, &mv, true).unwrap();

        prop_assert!((0.0..=100.0).contains(&chance));
        let suppressed = shield_dust && !self_target;
        if suppressed {
            prop_assert_eq!(chance, 0.0);
        }
        // Each multiplier caps itself at 100, so only the field doubling can overshoot.
        if rainbow && !suppressed && base >= 50 && factors.iter().all(|&f| f >= 1.0) {
            prop_assert_eq!(chance, 100.0);
        }
    }
}

// =============================================================================
// Scheduler ordering
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Push,
    Unshift,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Push), Just(Op::Unshift)]
}

proptest! {
    #[test]
    fn prepended_phases_run_before_queued_ones(ops in prop::collection::vec(op(), 1..24)) {
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let mut ctx = super::helpers::empty_context();
        let mut pushed = Vec::new();
        let mut unshifted = Vec::new();
        for (id, op) in ops.iter().enumerate() {
            match op {
                Op::Push => {
                    ctx.queue.push(Probe::boxed(id, &trace), false);
                    pushed.push(id);
                }
                Op::Unshift => {
                    ctx.queue.unshift(Probe::boxed(id, &trace));
                    unshifted.push(id);
                }
            }
        }

        step_queue(&mut ctx, ops.len());

        let expected: Vec<usize> = unshifted.iter().rev().chain(pushed.iter()).copied().collect();
        prop_assert_eq!(trace.borrow().clone(), expected);
    }

    #[test]
    fn marked_follow_ups_run_in_call_order(count in 1usize..10) {
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let mut ctx = super::helpers::empty_context();
        ctx.queue.push(Probe::boxed(usize::MAX, &trace), false);
        ctx.queue.mark_insertion_point();
        for id in 0..count {
            ctx.queue.unshift(Probe::boxed(id, &trace));
        }

        step_queue(&mut ctx, count + 1);

        let mut expected: Vec<usize> = (0..count).collect();
        expected.push(usize::MAX);
        prop_assert_eq!(trace.borrow().clone(), expected);
    }
}

#[test]
fn unshift_after_mark_runs_first() {
    let trace: Trace = Rc::new(RefCell::new(Vec::new()));
    let mut ctx = super::helpers::empty_context();
    ctx.queue.unshift(Probe::boxed(0, &trace));
    ctx.queue.mark_insertion_point();
    ctx.queue.unshift(Probe::boxed(1, &trace));
    step_queue(&mut ctx, 2);
    assert_eq!(*trace.borrow(), vec![1, 0]);
}

#[test]
fn engine_turn_counter_matches_turn_events() {
    let mut engine: Engine = tackle_duel(11);
    engine.run_headless();
    let started = engine
        .events()
        .events()
        .filter(|e| matches!(e, crate::event::BattleEvent::TurnStarted { .. }))
        .count();
    assert_eq!(u32::try_from(started).unwrap(), engine.turn());
}
