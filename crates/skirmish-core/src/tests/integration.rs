//! Integration tests for whole battles.
//!
//! These drive the engine end to end:
//! - Lead summons and the closing event
//! - Replacements after fainting
//! - Status and weather attrition across turns
//! - Doubles with spread moves

use crate::ai::FirstUsableMove;
use crate::combatant::{Side, StatusKind};
use crate::config::BattleConfig;
use crate::element::Element;
use crate::engine::{BattleOutcome, Engine, EngineState};
use crate::event::BattleEvent;
use crate::field::WeatherKind;

use super::helpers::{doubles, fighter, tackle_duel};

fn messages(engine: &Engine) -> Vec<String> {
    engine.events().messages().map(str::to_string).collect()
}

fn count(engine: &Engine, pred: impl Fn(&BattleEvent) -> bool) -> usize {
    engine.events().events().filter(|e| pred(e)).count()
}

// =============================================================================
// Singles
// =============================================================================

#[test]
fn leads_are_announced_and_the_battle_closes_once() {
    let mut engine = tackle_duel(3);
    let outcome = engine.run_headless();

    let log = messages(&engine);
    assert_eq!(log[0], "Go! Hero!");
    assert_eq!(log[1], "The foe sent out Foe!");
    assert_eq!(count(&engine, |e| matches!(e, BattleEvent::BattleEnded { .. })), 1);
    assert!(matches!(
        engine.events().events().last(),
        Some(BattleEvent::BattleEnded { outcome: o }) if *o == outcome
    ));
    assert_eq!(engine.state(), &EngineState::Finished(outcome));
}

#[test]
fn overlevelled_lead_wins() {
    let mut engine = Engine::new(
        BattleConfig::default().with_seed(9),
        vec![
            fighter("Hero", Side::Player, 80, &["tackle"]),
            fighter("Foe", Side::Enemy, 5, &["growl"]),
        ],
    )
    .unwrap();
    assert_eq!(engine.run_headless(), BattleOutcome::Victory(Side::Player));
    assert!(messages(&engine).iter().any(|m| m == "Foe fainted!"));
}

#[test]
fn fainted_lead_is_replaced_from_the_bench() {
    let mut engine = Engine::new(
        BattleConfig::default().with_seed(4),
        vec![
            fighter("Lead", Side::Player, 5, &["growl"]),
            fighter("Reserve", Side::Player, 5, &["growl"]),
            fighter("Boss", Side::Enemy, 90, &["tackle"]),
        ],
    )
    .unwrap();

    assert_eq!(engine.run_headless(), BattleOutcome::Victory(Side::Enemy));
    let log = messages(&engine);
    let lead_down = log.iter().position(|m| m == "Lead fainted!").unwrap();
    let reserve_in = log.iter().position(|m| m == "Go! Reserve!").unwrap();
    assert!(lead_down < reserve_in);
    assert_eq!(count(&engine, |e| matches!(e, BattleEvent::Fainted { .. })), 2);
    assert_eq!(engine.field().remaining(Side::Player), 0);
}

#[test]
fn badly_poisoned_target_wears_down() {
    let mut engine = Engine::new(
        BattleConfig::default().with_seed(21),
        vec![
            fighter("Hero", Side::Player, 50, &["toxic"]).with_types(&[Element::Poison]),
            fighter("Foe", Side::Enemy, 50, &["growl"]),
        ],
    )
    .unwrap()
    .with_policy(Box::new(FirstUsableMove));

    assert_eq!(engine.run_headless(), BattleOutcome::Victory(Side::Player));
    assert_eq!(
        count(&engine, |e| matches!(
            e,
            BattleEvent::StatusApplied {
                status: StatusKind::Toxic,
                ..
            }
        )),
        1
    );
}

#[test]
fn sandstorm_chips_and_clears() {
    let mut engine = Engine::new(
        BattleConfig::default().with_seed(8),
        vec![
            fighter("Hero", Side::Player, 50, &["sandstorm"]).with_types(&[Element::Rock]),
            fighter("Foe", Side::Enemy, 50, &["growl"]),
        ],
    )
    .unwrap()
    .with_policy(Box::new(FirstUsableMove));
    engine.run_headless();

    let log = messages(&engine);
    assert!(log.iter().any(|m| m.starts_with("Foe is buffeted by the")));
    assert!(!log.iter().any(|m| m.starts_with("Hero is buffeted by the")));
    assert!(count(&engine, |e| matches!(
        e,
        BattleEvent::WeatherChanged {
            weather: Some(WeatherKind::Sandstorm)
        }
    )) >= 1);
    assert!(count(&engine, |e| matches!(e, BattleEvent::WeatherChanged { weather: None })) >= 1);
}

// =============================================================================
// Doubles
// =============================================================================

#[test]
fn doubles_run_to_a_decided_end() {
    let mut engine = doubles(13);
    let outcome = engine.run_headless();
    match outcome {
        BattleOutcome::Victory(side) => assert_eq!(engine.field().remaining(side.opposite()), 0),
        BattleOutcome::Draw => {}
    }
    assert!(engine.turn() > 0);
}

#[test]
fn doubles_send_out_two_leads_per_side() {
    let mut engine = doubles(2);
    engine.run_headless();
    let summons: Vec<_> = engine
        .events()
        .events()
        .filter(|e| matches!(e, BattleEvent::Summoned { .. }))
        .take(4)
        .collect();
    assert_eq!(summons.len(), 4);
    let log = messages(&engine);
    assert_eq!(&log[..4], ["Go! Ace!", "Go! Buddy!", "The foe sent out Rival!", "The foe sent out Grunt!"]);
}

#[test]
fn drained_events_are_gone() {
    let mut engine = tackle_duel(5);
    engine.run_headless();
    let drained = engine.drain_events();
    assert!(!drained.is_empty());
    assert!(engine.events().is_empty());
}
