//! Table rendering for reports and records

use console::style;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::{smart_round, truncate_str};
use crate::core::analysis::DimensionAnalysis;
use crate::core::capability::LotStatus;
use crate::core::spec::ToleranceSpec;
use crate::entities::dimension::DimensionRecord;

/// One row of the capability summary, also used for CSV output
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CapabilityRow {
    #[tabled(rename = "Source")]
    pub source: String,
    #[tabled(rename = "Dim")]
    pub dimension: String,
    #[tabled(rename = "Spec")]
    pub spec: String,
    #[tabled(rename = "N")]
    pub n: usize,
    #[tabled(rename = "Mean")]
    pub mean: String,
    #[tabled(rename = "Cp")]
    pub cp: String,
    #[tabled(rename = "Cpk")]
    pub cpk: String,
    #[tabled(rename = "Pp")]
    pub pp: String,
    #[tabled(rename = "Ppk")]
    pub ppk: String,
    #[tabled(rename = "Level")]
    pub level: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl CapabilityRow {
    pub fn new(source: &str, analysis: &DimensionAnalysis) -> Self {
        let cap = &analysis.capability;
        let spec = &analysis.record.spec;
        let band = spec.tolerance_band();
        let mut spec_text = truncate_str(&spec.raw_text, 24);
        if analysis.low_confidence_spec {
            spec_text.push_str(" (?)");
        }
        Self {
            source: source.to_string(),
            dimension: analysis.record.identity.clone(),
            spec: spec_text,
            n: cap.count,
            mean: smart_round(cap.mean, band),
            cp: format_index(cap.cp),
            cpk: format_index(cap.cpk),
            pp: format_index(cap.pp),
            ppk: format_index(cap.ppk),
            level: cap.level.to_string(),
            status: cap.status.to_string(),
        }
    }
}

/// Capability indices above this print as ">999"
const INDEX_DISPLAY_MAX: f64 = 999.0;

fn format_index(value: f64) -> String {
    if value > INDEX_DISPLAY_MAX {
        format!(">{}", INDEX_DISPLAY_MAX)
    } else {
        format!("{:.2}", value)
    }
}

/// Capability summary table
pub fn capability_table(rows: &[CapabilityRow]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// One row of the extracted-record table
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct RecordRow {
    #[tabled(rename = "Dim")]
    pub dimension: String,
    #[tabled(rename = "Spec")]
    pub spec: String,
    #[tabled(rename = "LSL")]
    pub lsl: String,
    #[tabled(rename = "USL")]
    pub usl: String,
    #[tabled(rename = "Grammar")]
    pub grammar: String,
    #[tabled(rename = "N")]
    pub n: usize,
    #[tabled(rename = "Values")]
    pub values: String,
}

impl RecordRow {
    pub fn new(record: &DimensionRecord) -> Self {
        let band = record.spec.tolerance_band();
        let preview: Vec<String> = record
            .measurements
            .iter()
            .take(5)
            .map(|v| smart_round(*v, band))
            .collect();
        let mut values = preview.join(" ");
        if record.measurements.len() > preview.len() {
            values.push_str(" ...");
        }
        Self {
            dimension: record.identity.clone(),
            spec: truncate_str(&record.spec.raw_text, 24),
            lsl: smart_round(record.spec.lsl, band),
            usl: smart_round(record.spec.usl, band),
            grammar: record.spec.grammar.to_string(),
            n: record.measurements.len(),
            values,
        }
    }
}

pub fn record_table(rows: &[RecordRow]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// One row of the spec-parsing table
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SpecRow {
    #[tabled(rename = "Text")]
    pub text: String,
    #[tabled(rename = "Nominal")]
    pub nominal: f64,
    #[tabled(rename = "LSL")]
    pub lsl: f64,
    #[tabled(rename = "USL")]
    pub usl: f64,
    #[tabled(rename = "Grammar")]
    pub grammar: String,
    #[tabled(rename = "Confidence")]
    pub confidence: String,
}

impl SpecRow {
    pub fn new(spec: &ToleranceSpec) -> Self {
        Self {
            text: spec.raw_text.clone(),
            nominal: spec.nominal,
            lsl: spec.lsl,
            usl: spec.usl,
            grammar: spec.grammar.to_string(),
            confidence: if spec.is_low_confidence() {
                "low".to_string()
            } else {
                "high".to_string()
            },
        }
    }
}

pub fn spec_table(rows: &[SpecRow]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Colored status marker for terminal output
pub fn styled_status(status: LotStatus) -> String {
    match status {
        LotStatus::Ok => style(status.to_string()).green().bold().to_string(),
        LotStatus::Ng => style(status.to_string()).red().bold().to_string(),
    }
}
