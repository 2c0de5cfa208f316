//! CLI command implementations

pub mod analyze;
pub mod completions;
pub mod config;
pub mod extract;
pub mod spec;
pub mod stats;
