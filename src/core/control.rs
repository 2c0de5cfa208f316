//! Xbar-R control chart limits
//!
//! Shewhart constants are looked up by subgroup size. Forms in the field use
//! n = 5, which is what [`control_limits`] assumes.

use serde::{Deserialize, Serialize};

use crate::core::subgroup::{mean, Subgroup, DEFAULT_SUBGROUP_SIZE};

/// Shewhart Xbar-R chart constants for one subgroup size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShewhartConstants {
    /// Subgroup size
    pub n: usize,
    /// Xbar chart limit factor
    pub a2: f64,
    /// R chart lower limit factor
    pub d3: f64,
    /// R chart upper limit factor
    pub d4: f64,
    /// Bias correction: E[R] = d2 * σ
    pub d2: f64,
}

const fn row(n: usize, a2: f64, d3: f64, d4: f64, d2: f64) -> ShewhartConstants {
    ShewhartConstants { n, a2, d3, d4, d2 }
}

const SHEWHART_TABLE: &[ShewhartConstants] = &[
    row(2, 1.880, 0.0, 3.267, 1.128),
    row(3, 1.023, 0.0, 2.574, 1.693),
    row(4, 0.729, 0.0, 2.282, 2.059),
    row(5, 0.577, 0.0, 2.114, 2.326),
    row(6, 0.483, 0.0, 2.004, 2.534),
    row(7, 0.419, 0.076, 1.924, 2.704),
    row(8, 0.373, 0.136, 1.864, 2.847),
    row(9, 0.337, 0.184, 1.816, 2.970),
    row(10, 0.308, 0.223, 1.777, 3.078),
];

impl ShewhartConstants {
    /// Constants for n = 5
    pub const N5: ShewhartConstants = row(5, 0.577, 0.0, 2.114, 2.326);

    /// Look up constants for a subgroup size (2..=10)
    pub fn for_size(n: usize) -> Option<Self> {
        SHEWHART_TABLE.iter().find(|c| c.n == n).copied()
    }

    /// Look up constants, falling back to n = 5 outside the table
    pub fn for_size_or_default(n: usize) -> Self {
        Self::for_size(n).unwrap_or_else(|| {
            tracing::warn!(
                subgroup_size = n,
                "no Shewhart constants for subgroup size, using n={} values",
                DEFAULT_SUBGROUP_SIZE
            );
            Self::N5
        })
    }
}

/// Xbar and R chart center lines and control limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Grand mean (Xbar chart center line)
    pub x_bar_bar: f64,
    /// Mean range (R chart center line)
    pub r_bar: f64,
    pub ucl_x: f64,
    pub lcl_x: f64,
    pub ucl_r: f64,
    pub lcl_r: f64,
}

impl ControlLimits {
    /// Indices of subgroups whose mean falls outside the Xbar limits
    pub fn x_out_of_control(&self, subgroups: &[Subgroup]) -> Vec<usize> {
        subgroups
            .iter()
            .enumerate()
            .filter(|(_, s)| s.mean > self.ucl_x || s.mean < self.lcl_x)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of subgroups whose range falls outside the R limits
    pub fn r_out_of_control(&self, subgroups: &[Subgroup]) -> Vec<usize> {
        subgroups
            .iter()
            .enumerate()
            .filter(|(_, s)| s.range > self.ucl_r || s.range < self.lcl_r)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Control limits using the n = 5 constants
pub fn control_limits(subgroups: &[Subgroup]) -> ControlLimits {
    control_limits_with(subgroups, &ShewhartConstants::N5)
}

/// Control limits using the constants for `subgroup_size`
pub fn control_limits_for(subgroups: &[Subgroup], subgroup_size: usize) -> ControlLimits {
    control_limits_with(
        subgroups,
        &ShewhartConstants::for_size_or_default(subgroup_size),
    )
}

/// Control limits from explicit constants; all zero without subgroups
pub fn control_limits_with(subgroups: &[Subgroup], constants: &ShewhartConstants) -> ControlLimits {
    if subgroups.is_empty() {
        return ControlLimits::default();
    }

    let means: Vec<f64> = subgroups.iter().map(|s| s.mean).collect();
    let ranges: Vec<f64> = subgroups.iter().map(|s| s.range).collect();
    let x_bar_bar = mean(&means);
    let r_bar = mean(&ranges);

    ControlLimits {
        x_bar_bar,
        r_bar,
        ucl_x: x_bar_bar + constants.a2 * r_bar,
        lcl_x: x_bar_bar - constants.a2 * r_bar,
        ucl_r: constants.d4 * r_bar,
        lcl_r: (constants.d3 * r_bar).max(0.0),
    }
}
