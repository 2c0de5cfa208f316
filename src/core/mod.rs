//! Core module - tolerance parsing, SPC statistics and configuration

pub mod analysis;
pub mod capability;
pub mod config;
pub mod control;
pub mod outliers;
pub mod spec;
pub mod subgroup;

pub use analysis::{analyze_document, analyze_record, DimensionAnalysis};
pub use capability::{
    capability, CapabilityEngine, CapabilityLevel, CapabilityResult, CapabilityThresholds,
    LotStatus,
};
pub use config::{AnalysisConfig, Config, ConfigError, ExtractionConfig};
pub use control::{control_limits, control_limits_for, ControlLimits, ShewhartConstants};
pub use outliers::{detect_outliers, OutlierReport};
pub use spec::{SpecGrammar, ToleranceSpec};
pub use subgroup::{subgroup, Subgroup};
