//! Rational subgrouping of a measurement sequence

use serde::{Deserialize, Serialize};

/// Subgroup size used by the Xbar-R charts on the inspection forms
pub const DEFAULT_SUBGROUP_SIZE: usize = 5;

/// A contiguous chunk of the measurement sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subgroup {
    /// Arithmetic mean of the members
    pub mean: f64,

    /// max - min of the members
    pub range: f64,

    /// Members in their original order
    pub members: Vec<f64>,
}

impl Subgroup {
    /// Build a subgroup from its members
    pub fn from_members(members: &[f64]) -> Self {
        let (min, max) = min_max(members);
        Self {
            mean: mean(members),
            range: max - min,
            members: members.to_vec(),
        }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Minimum and maximum; `(0.0, 0.0)` for an empty slice
pub fn min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Partition `values` into non-overlapping chunks of `size`.
///
/// Chunks with fewer than two members (including a trailing straggler) are
/// dropped since a range needs two points. Order is preserved.
pub fn subgroup(values: &[f64], size: usize) -> Vec<Subgroup> {
    if size == 0 {
        return Vec::new();
    }
    values
        .chunks(size)
        .filter(|chunk| chunk.len() >= 2)
        .map(Subgroup::from_members)
        .collect()
}
