//! CLI argument definitions using clap
//!
//! Commands:
//! - restgate filter [--config <path>]
//! - restgate assemble [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// restgate - result assembly and projection for a REST aggregation gateway
#[derive(Parser, Debug)]
#[command(name = "restgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Apply `only` and `hidden` clauses to resolved results
    Filter,

    /// Build the result record of a single call
    Assemble,
}

impl Command {
    /// Name used for the command's observation scope
    pub fn scope_name(&self) -> &'static str {
        match self {
            Command::Filter => "FILTER",
            Command::Assemble => "ASSEMBLE",
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
