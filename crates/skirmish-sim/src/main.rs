//! `skirmish-sim`: runs battle files headlessly and prints what happened.

mod cli;
mod logging;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use skirmish_core::ai::{CommandPolicy, FirstUsableMove, ScoringPolicy};
use skirmish_core::catalog::Catalog;
use skirmish_core::event::{BattleEvent, EventRecord};
use skirmish_core::setup::BattleSetup;

use crate::cli::{Cli, Commands, OutputFormat, PolicyChoice, RunArgs};
use crate::logging::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::Catalog => list_catalog(),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let mut setup = BattleSetup::from_json_str(&text)
        .with_context(|| format!("parsing {}", args.file.display()))?;
    if let Some(seed) = args.seed {
        setup.config.seed = seed;
    }

    let policy: Box<dyn CommandPolicy> = match args.policy {
        PolicyChoice::Scoring => Box::new(ScoringPolicy::new()),
        PolicyChoice::First => Box::new(FirstUsableMove),
    };
    let seed = setup.config.seed;
    let mut engine = setup
        .into_engine(&Catalog::standard())
        .context("assembling the battle")?
        .with_policy(policy);

    info!(seed, file = %args.file.display(), "battle started");
    let outcome = engine.run_headless();
    info!(%outcome, turns = engine.turn(), "battle finished");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_events(&mut out, &engine.drain_events(), args.format)?;
    if args.format == OutputFormat::Text {
        writeln!(out, "-- {outcome} after {} turn(s)", engine.turn())?;
    }
    Ok(())
}

fn print_events(out: &mut impl Write, records: &[EventRecord], format: OutputFormat) -> Result<()> {
    for record in records {
        match format {
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(record)?)?,
            OutputFormat::Text => {
                if let BattleEvent::Message { text } = record.event() {
                    writeln!(out, "{text}")?;
                }
            }
        }
    }
    Ok(())
}

fn list_catalog() -> Result<()> {
    let catalog = Catalog::standard();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "moves:")?;
    for id in catalog.move_ids() {
        writeln!(out, "  {id}")?;
    }
    writeln!(out, "abilities:")?;
    for id in catalog.ability_ids() {
        writeln!(out, "  {id}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMOS: [&str; 2] = [
        include_str!("../../../demos/duel.json"),
        include_str!("../../../demos/doubles.json"),
    ];

    #[test]
    fn demo_battles_resolve_and_finish() {
        for text in DEMOS {
            let setup = BattleSetup::from_json_str(text).unwrap();
            let mut engine = setup.into_engine(&Catalog::standard()).unwrap();
            engine.run_headless();
            assert!(matches!(engine.state(), skirmish_core::engine::EngineState::Finished(_)));
        }
    }

    #[test]
    fn text_output_prints_messages_only() {
        let setup = BattleSetup::from_json_str(DEMOS[0]).unwrap();
        let mut engine = setup.into_engine(&Catalog::standard()).unwrap();
        engine.run_headless();
        let records = engine.drain_events();

        let mut text = Vec::new();
        print_events(&mut text, &records, OutputFormat::Text).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.starts_with("Go! Ember!\n"));

        let mut json = Vec::new();
        print_events(&mut json, &records, OutputFormat::Json).unwrap();
        assert_eq!(String::from_utf8(json).unwrap().lines().count(), records.len());
    }
}
