//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Headless battle runner.
#[derive(Parser, Debug)]
#[command(name = "skirmish-sim", version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a battle file to completion.
    Run(RunArgs),

    /// List the move and ability ids battle files may use.
    Catalog,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Battle description (JSON).
    pub file: PathBuf,

    /// Override the seed from the battle file.
    #[arg(long, env = "SKIRMISH_SEED")]
    pub seed: Option<u64>,

    /// Who picks moves.
    #[arg(long, value_enum, default_value = "scoring")]
    pub policy: PolicyChoice,

    /// Output format for battle events.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Command policy for both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyChoice {
    /// Score every move against every target.
    Scoring,
    /// Use the first move with PP left.
    First,
}

/// How events are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Battle messages only.
    Text,
    /// One JSON event record per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults() {
        let cli = Cli::try_parse_from(["skirmish-sim", "run", "battle.json"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.file, PathBuf::from("battle.json"));
        assert_eq!(args.policy, PolicyChoice::Scoring);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn verbosity_counts_and_is_global() {
        let cli = Cli::try_parse_from(["skirmish-sim", "run", "-vv", "b.json", "--seed", "9", "--format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
