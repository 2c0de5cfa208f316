use clap::Parser;
use iqc::cli::logging::init_tracing;
use iqc::cli::{Cli, Commands};
use miette::Result;

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(&cli.global);
    let global = &cli.global;

    match cli.command {
        Commands::Analyze(args) => iqc::cli::commands::analyze::run(args, global),
        Commands::Extract(args) => iqc::cli::commands::extract::run(args, global),
        Commands::Spec(args) => iqc::cli::commands::spec::run(args, global),
        Commands::Stats(args) => iqc::cli::commands::stats::run(args, global),
        Commands::Config(cmd) => iqc::cli::commands::config::run(cmd, global),
        Commands::Completions(args) => iqc::cli::commands::completions::run(args),
    }
}
