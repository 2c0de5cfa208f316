//! Command-line argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::analyze::AnalyzeArgs;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::config::ConfigCommands;
use crate::cli::commands::extract::ExtractArgs;
use crate::cli::commands::spec::SpecArgs;
use crate::cli::commands::stats::StatsArgs;

#[derive(Parser, Debug)]
#[command(name = "iqc")]
#[command(author, version)]
#[command(about = "Extract dimensional measurements from OCR'd inspection forms and compute SPC capability")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Extra config file, merged over user and project config
    #[arg(long, global = true, env = "IQC_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Default for GlobalOpts {
    fn default() -> Self {
        Self {
            format: OutputFormat::Auto,
            verbose: 0,
            quiet: false,
            config: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table on a terminal report, YAML for single records
    Auto,
    /// Human-readable tables
    Table,
    Yaml,
    Json,
    Csv,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract and analyze inspection documents (files or directories)
    Analyze(AnalyzeArgs),

    /// Extract dimensions and batch metadata without statistics
    Extract(ExtractArgs),

    /// Parse tolerance strings
    Spec(SpecArgs),

    /// Capability statistics for measurements given directly or on stdin
    Stats(StatsArgs),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
