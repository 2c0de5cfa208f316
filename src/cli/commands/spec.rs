//! `iqc spec` command - parse tolerance strings

use clap::Args;
use miette::Result;

use crate::cli::output::{effective_format, print_csv, print_structured};
use crate::cli::table::{spec_table, SpecRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::spec::{self, ToleranceSpec};

#[derive(Args, Debug, Clone)]
pub struct SpecArgs {
    /// Tolerance strings, e.g. "Φ6.00±0.10" "27.80+0.10-0.00"
    #[arg(required = true)]
    pub specs: Vec<String>,
}

pub fn run(args: SpecArgs, global: &GlobalOpts) -> Result<()> {
    let parsed: Vec<ToleranceSpec> = args.specs.iter().map(|s| spec::parse(s)).collect();

    let format = effective_format(global.format, parsed.len() > 1);
    if print_structured(&parsed, format)? {
        return Ok(());
    }

    let rows: Vec<SpecRow> = parsed.iter().map(SpecRow::new).collect();
    match format {
        OutputFormat::Csv => print_csv(&rows),
        _ => {
            println!("{}", spec_table(&rows));
            Ok(())
        }
    }
}
