//! `iqc config` command - effective configuration and where it comes from

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::output::print_structured;
use crate::cli::{load_config, GlobalOpts, OutputFormat};
use crate::core::config::Config;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the merged configuration
    Show,

    /// List config file locations in merge order
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(global),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let format = match global.format {
        OutputFormat::Json => OutputFormat::Json,
        _ => OutputFormat::Yaml,
    };
    print_structured(&config, format)?;
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    for path in Config::search_paths(global.config.as_deref()) {
        let marker = if path.exists() {
            style("✓").green()
        } else {
            style("·").dim()
        };
        println!("{} {}", marker, path.display());
    }
    Ok(())
}
