//! Dimension record - one inspected feature and its measurements

use serde::{Deserialize, Serialize};

use crate::core::spec::ToleranceSpec;

/// A dimension recovered from an inspection form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRecord {
    /// Location label as printed on the form (`①`, `3`)
    pub identity: String,

    /// Human-readable name
    pub name: String,

    /// Tolerance parsed from the specification row
    pub spec: ToleranceSpec,

    /// Measurements in sequence-number order
    pub measurements: Vec<f64>,

    /// Sample size declared on the form, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_count: Option<usize>,
}

impl DimensionRecord {
    pub fn new(identity: impl Into<String>, spec: ToleranceSpec) -> Self {
        let identity = identity.into();
        let name = if spec.raw_text.is_empty() {
            format!("Position {}", identity)
        } else {
            format!("Position {} ({})", identity, spec.raw_text)
        };
        Self {
            identity,
            name,
            spec,
            measurements: Vec::new(),
            expected_count: None,
        }
    }

    /// Whether fewer measurements were recovered than the form declares
    pub fn is_short(&self) -> bool {
        self.expected_count
            .is_some_and(|expected| self.measurements.len() < expected)
    }

    /// Measurements outside the tolerance
    pub fn out_of_spec(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.measurements
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| !self.spec.contains(*v))
    }
}
