//! Sigma-rule outlier screening

use serde::{Deserialize, Serialize};

use crate::core::subgroup::mean;

/// Measurements lying outside `mean ± kσ`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    /// Positions in the measurement sequence
    pub indices: Vec<usize>,

    /// The outlying values, in sequence order
    pub values: Vec<f64>,

    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl OutlierReport {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

/// Flag values outside `mean ± k·σ` (Bessel σ).
///
/// Fewer than three values, or zero spread, yields an empty report.
pub fn detect_outliers(values: &[f64], k: f64) -> OutlierReport {
    if values.len() < 3 {
        return OutlierReport::default();
    }

    let mu = mean(values);
    let variance =
        values.iter().map(|v| (v - mu) * (v - mu)).sum::<f64>() / (values.len() - 1) as f64;
    let sigma = variance.sqrt();
    if sigma == 0.0 {
        return OutlierReport {
            lower_bound: mu,
            upper_bound: mu,
            ..Default::default()
        };
    }

    let lower_bound = mu - k * sigma;
    let upper_bound = mu + k * sigma;
    let (indices, outliers): (Vec<usize>, Vec<f64>) = values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v < lower_bound || v > upper_bound)
        .map(|(i, &v)| (i, v))
        .unzip();

    OutlierReport {
        indices,
        values: outliers,
        lower_bound,
        upper_bound,
    }
}
