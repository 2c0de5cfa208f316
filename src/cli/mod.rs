//! CLI module - argument parsing, command dispatch and rendering

pub mod args;
pub mod commands;
pub mod helpers;
pub mod logging;
pub mod output;
pub mod table;
pub mod viz;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};

use miette::Result;

use crate::core::config::Config;

/// Load the layered configuration for a command
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    let config = Config::load(global.config.as_deref())?;
    Ok(config)
}
