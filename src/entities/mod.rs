//! Data carried between extraction, analysis and rendering

pub mod dimension;
pub mod report;

pub use dimension::DimensionRecord;
pub use report::{InspectionReport, ReportSummary};
