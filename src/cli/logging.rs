//! Diagnostic logging on stderr

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::GlobalOpts;

/// Environment variable holding a tracing filter (`IQC_LOG=iqc=debug`)
pub const LOG_ENV: &str = "IQC_LOG";

/// Default filter directive for the given flags
pub fn default_directive(global: &GlobalOpts) -> &'static str {
    if global.quiet {
        return "error";
    }
    match global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initializes the tracing subscriber.
///
/// `IQC_LOG` wins over `-v`/`-q` when set. Output goes to stderr so that
/// stdout stays clean for YAML/JSON/CSV.
pub fn init_tracing(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
