//! Per-dimension analysis pipeline
//!
//! record → subgroups → control limits + capability + outlier screen

use serde::Serialize;

use crate::core::capability::{CapabilityEngine, CapabilityResult};
use crate::core::config::AnalysisConfig;
use crate::core::control::{control_limits_for, ControlLimits};
use crate::core::outliers::{detect_outliers, OutlierReport};
use crate::core::subgroup::{subgroup, Subgroup};
use crate::entities::dimension::DimensionRecord;
use crate::entities::report::InspectionReport;
use crate::extract::ExtractedDocument;

/// Statistics bundle for one dimension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionAnalysis {
    pub record: DimensionRecord,
    pub subgroups: Vec<Subgroup>,
    pub limits: ControlLimits,
    pub capability: CapabilityResult,
    pub outliers: OutlierReport,

    /// Subgroups whose mean is outside the Xbar limits
    pub x_out_of_control: Vec<usize>,

    /// Subgroups whose range is outside the R limits
    pub r_out_of_control: Vec<usize>,

    /// Tolerance limits were assumed rather than read
    pub low_confidence_spec: bool,
}

/// Run the statistics engines over one record
pub fn analyze_record(record: DimensionRecord, config: &AnalysisConfig) -> DimensionAnalysis {
    let subgroups = subgroup(&record.measurements, config.subgroup_size);
    let limits = control_limits_for(&subgroups, config.subgroup_size);
    let engine = CapabilityEngine::for_subgroup_size(config.subgroup_size, config.thresholds());
    let capability = engine.evaluate(&record.measurements, &record.spec, &subgroups);
    let outliers = detect_outliers(&record.measurements, config.outlier_sigma);
    let x_out_of_control = limits.x_out_of_control(&subgroups);
    let r_out_of_control = limits.r_out_of_control(&subgroups);
    let low_confidence_spec = record.spec.is_low_confidence();

    tracing::debug!(
        label = %record.identity,
        n = capability.count,
        cpk = capability.cpk,
        status = %capability.status,
        "analyzed dimension"
    );

    DimensionAnalysis {
        record,
        subgroups,
        limits,
        capability,
        outliers,
        x_out_of_control,
        r_out_of_control,
        low_confidence_spec,
    }
}

/// Analyze every dimension of an extracted document
pub fn analyze_document(
    source: impl Into<String>,
    document: ExtractedDocument,
    config: &AnalysisConfig,
) -> InspectionReport {
    let dimensions = document
        .records
        .into_iter()
        .map(|record| analyze_record(record, config))
        .collect();
    InspectionReport::new(source, document.metadata, dimensions)
}
