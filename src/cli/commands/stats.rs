//! `iqc stats` command - capability of measurements given directly

use clap::Args;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_out_of_spec, parse_values, read_values_from_stdin};
use crate::cli::output::{effective_format, print_csv, print_structured};
use crate::cli::table::{capability_table, styled_status, CapabilityRow};
use crate::cli::viz::{render_range_bar, render_xbar_r, CHART_HEIGHT, CHART_WIDTH};
use crate::cli::{load_config, GlobalOpts, OutputFormat};
use crate::core::analysis::analyze_record;
use crate::core::spec;
use crate::entities::dimension::DimensionRecord;

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Tolerance, e.g. "Φ6.00±0.10"
    #[arg(long, short = 's')]
    pub spec: String,

    /// Measurements; read from stdin when omitted
    #[arg(allow_hyphen_values = true)]
    pub values: Vec<String>,

    /// Rational subgroup size (2-10)
    #[arg(long, env = "IQC_SUBGROUP_SIZE")]
    pub subgroup_size: Option<usize>,

    /// Dimension label used in output
    #[arg(long, default_value = "-")]
    pub label: String,

    /// Draw Xbar-R control charts and a tolerance bar
    #[arg(long)]
    pub chart: bool,
}

pub fn run(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = load_config(global)?;
    if let Some(n) = args.subgroup_size {
        config.analysis.subgroup_size = n;
    }
    config.validate("command line")?;

    let values = if args.values.is_empty() {
        read_values_from_stdin()?.unwrap_or_default()
    } else {
        parse_values(&args.values)?
    };
    if values.is_empty() {
        return Err(miette::miette!(
            help = "pass values as arguments or pipe them on stdin",
            "No measurements given"
        ));
    }

    let mut record = DimensionRecord::new(args.label.as_str(), spec::parse(&args.spec));
    record.measurements = values;
    let analysis = analyze_record(record, &config.analysis);

    let format = effective_format(global.format, false);
    if print_structured(&analysis, format)? {
        return Ok(());
    }

    let row = CapabilityRow::new("-", &analysis);
    if format == OutputFormat::Csv {
        return print_csv(&[row]);
    }

    let cap = &analysis.capability;
    println!("{}", capability_table(&[row]));
    println!(
        "  {}  σ within {:.6}  σ overall {:.6}",
        styled_status(cap.status),
        cap.std_within,
        cap.std_overall
    );
    println!("  {}", cap.conclusion);
    if let Some(parts) = format_out_of_spec(&analysis.record) {
        println!("  {} out of tolerance: {}", style("✗").red(), parts);
    }
    println!("  {}", style(&cap.suggestion).dim());

    if args.chart {
        let spec = &analysis.record.spec;
        println!();
        println!("{}", render_range_bar(cap.min, cap.max, spec.lsl, spec.usl));
        println!();
        println!("{}", render_xbar_r(&analysis, CHART_WIDTH, CHART_HEIGHT));
    }
    Ok(())
}
