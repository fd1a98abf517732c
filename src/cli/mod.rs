use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::commands::run::RunOptions;
use crate::models::ScoringType;

const HELP_TEMPLATE: &str = "
{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}";

#[derive(Debug, Parser)]
#[command(name = "find-templates")]
#[command(about = "Compare reaction template usage between aizynthfinder and Postera routes", long_about = None)]
#[command(version)]
#[command(help_template = HELP_TEMPLATE)]
pub struct Cli {
    /// Path to the targets file (one SMILES per line)
    #[arg(long)]
    pub targets: PathBuf,

    /// Path to the RetroMix configuration file
    #[arg(long)]
    pub config: PathBuf,

    /// Number of processes aizynthfinder may use
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub nproc: u16,

    /// Output directory for route caches and template reports
    #[arg(long)]
    pub output: PathBuf,

    /// How routes are weighted when ranking templates
    #[arg(long = "scoring_type", value_enum, default_value_t = ScoringType::State)]
    pub scoring_type: ScoringType,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            targets: self.targets.clone(),
            config: self.config.clone(),
            nproc: usize::from(self.nproc),
            output: self.output.clone(),
            scoring_type: self.scoring_type,
        }
    }

    /// Default log filter for the verbosity level; `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "warn,retromix=info,find_templates=info",
            2 => "warn,retromix=debug,find_templates=debug",
            _ => "trace",
        }
    }
}
