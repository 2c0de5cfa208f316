//! Inspection report - the analyzed form of one incoming lot

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::analysis::DimensionAnalysis;
use crate::core::capability::{CapabilityLevel, LotStatus};
use crate::extract::metadata::DocumentMetadata;

/// Counters across the dimensions of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub dimensions: usize,
    pub ok: usize,
    pub ng: usize,
    pub capable: usize,
    pub acceptable: usize,
    pub incapable: usize,

    /// Dimensions whose tolerance was assumed (plus-only, bare, unparseable)
    pub low_confidence: usize,
}

impl ReportSummary {
    pub fn from_dimensions(dimensions: &[DimensionAnalysis]) -> Self {
        let mut summary = Self {
            dimensions: dimensions.len(),
            ..Default::default()
        };
        for dim in dimensions {
            match dim.capability.status {
                LotStatus::Ok => summary.ok += 1,
                LotStatus::Ng => summary.ng += 1,
            }
            match dim.capability.level {
                CapabilityLevel::Capable => summary.capable += 1,
                CapabilityLevel::Acceptable => summary.acceptable += 1,
                CapabilityLevel::Incapable => summary.incapable += 1,
            }
            if dim.low_confidence_spec {
                summary.low_confidence += 1;
            }
        }
        summary
    }
}

/// Analysis results for one inspection document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionReport {
    /// Document path or label
    pub source: String,

    pub metadata: DocumentMetadata,

    pub dimensions: Vec<DimensionAnalysis>,

    pub summary: ReportSummary,

    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,
}

impl InspectionReport {
    pub fn new(
        source: impl Into<String>,
        metadata: DocumentMetadata,
        dimensions: Vec<DimensionAnalysis>,
    ) -> Self {
        let summary = ReportSummary::from_dimensions(&dimensions);
        Self {
            source: source.into(),
            metadata,
            dimensions,
            summary,
            analyzed_at: Utc::now(),
        }
    }

    /// NG when any dimension is NG
    pub fn status(&self) -> LotStatus {
        if self.summary.ng > 0 {
            LotStatus::Ng
        } else {
            LotStatus::Ok
        }
    }

    /// Whether no dimension was recognized in the document
    pub fn is_unrecognized(&self) -> bool {
        self.dimensions.is_empty()
    }
}
