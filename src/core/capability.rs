//! Process capability (Cp/Cpk) and performance (Pp/Ppk) indices
//!
//! Two standard-deviation estimators are kept separate on purpose:
//! - **overall** σ is the Bessel-corrected sample standard deviation of every
//!   measurement and feeds Pp/Ppk (the process as observed, drift included)
//! - **within** σ is estimated from subgroup ranges (R̄/d2), or from the mean
//!   moving range when there are fewer than two subgroups, and feeds Cp/Cpk
//!   (common-cause variation only)
//!
//! A process whose subgroup means wander shows σ_within < σ_overall and hence
//! Cp > Pp.

use serde::{Deserialize, Serialize};

use crate::core::control::ShewhartConstants;
use crate::core::spec::ToleranceSpec;
use crate::core::subgroup::{mean, min_max, Subgroup};

/// Within-σ substituted when the subgroups show no variation at all
pub const SIGMA_EPSILON: f64 = 1e-6;

/// d2 for a moving range of two consecutive points
pub const MOVING_RANGE_D2: f64 = 1.128;

/// Standard normal cumulative distribution function (CDF)
/// Φ(z) = probability that a standard normal random variable is ≤ z
/// Uses Hastings approximation (error < 7.5e-8)
fn normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return 0.5;
    }
    if z >= 8.0 {
        return 1.0;
    }
    if z <= -8.0 {
        return 0.0;
    }

    // Handle negative z by symmetry: Φ(-z) = 1 - Φ(z)
    let (z_abs, negate) = if z < 0.0 { (-z, true) } else { (z, false) };

    // Hastings approximation constants (A&S 26.2.17)
    const B0: f64 = 0.2316419;
    const B1: f64 = 0.319381530;
    const B2: f64 = -0.356563782;
    const B3: f64 = 1.781477937;
    const B4: f64 = -1.821255978;
    const B5: f64 = 1.330274429;

    let t = 1.0 / (1.0 + B0 * z_abs);
    let poly = t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));
    let pdf = (-0.5 * z_abs * z_abs).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let cdf = 1.0 - pdf * poly;

    if negate {
        1.0 - cdf
    } else {
        cdf
    }
}

/// Cpk thresholds and the centering rule used for classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityThresholds {
    /// Cpk at or above which the process is capable
    pub capable_cpk: f64,

    /// Cpk at or above which the process is acceptable but must be watched
    pub acceptable_cpk: f64,

    /// Fraction of the tolerance band the mean may sit off nominal before a
    /// centering problem is reported
    pub centering_fraction: f64,
}

impl Default for CapabilityThresholds {
    fn default() -> Self {
        Self {
            capable_cpk: 1.33,
            acceptable_cpk: 1.0,
            centering_fraction: 0.2,
        }
    }
}

/// Capability classification from Cpk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityLevel {
    /// Cpk ≥ capable threshold
    Capable,
    /// acceptable threshold ≤ Cpk < capable threshold
    Acceptable,
    /// Cpk below the acceptable threshold
    Incapable,
}

impl std::fmt::Display for CapabilityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityLevel::Capable => write!(f, "capable"),
            CapabilityLevel::Acceptable => write!(f, "acceptable"),
            CapabilityLevel::Incapable => write!(f, "incapable"),
        }
    }
}

/// Lot disposition: any physically out-of-tolerance part fails the lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NG")]
    Ng,
}

impl std::fmt::Display for LotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LotStatus::Ok => write!(f, "OK"),
            LotStatus::Ng => write!(f, "NG"),
        }
    }
}

/// Capability and performance of one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityResult {
    /// Number of measurements
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,

    /// Long-term σ (sample standard deviation)
    pub std_overall: f64,

    /// Short-term σ (R̄/d2 or moving range)
    pub std_within: f64,

    /// (USL - LSL) / 6σ_within
    pub cp: f64,
    /// min(USL - μ, μ - LSL) / 3σ_within
    pub cpk: f64,
    /// (USL - LSL) / 6σ_overall
    pub pp: f64,
    /// min(USL - μ, μ - LSL) / 3σ_overall
    pub ppk: f64,

    pub level: CapabilityLevel,
    pub status: LotStatus,

    /// Measurements outside `[lsl, usl]`
    pub out_of_spec: usize,

    /// Mean is off nominal by more than the centering fraction while Cpk is
    /// below the capable threshold
    pub centering_issue: bool,

    /// Out-of-spec fraction in parts per million
    pub ppm_observed: f64,

    /// Normal-model tail beyond the limits, using σ_overall, in parts per million
    pub ppm_expected: f64,

    pub conclusion: String,
    pub suggestion: String,
}

/// Overall σ estimate.
///
/// With fewer than two values the tolerance band stands in for the process
/// (`(usl - lsl) / 6`, or `0.1` when the band is empty).
pub fn overall_std_dev(values: &[f64], usl: f64, lsl: f64) -> f64 {
    if values.len() < 2 {
        return if usl > lsl { (usl - lsl) / 6.0 } else { 0.1 };
    }
    let mu = mean(values);
    let ss: f64 = values.iter().map(|v| (v - mu) * (v - mu)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Within σ estimate.
///
/// R̄/d2 with two or more subgroups; otherwise mean moving range / 1.128 with
/// two or more values; otherwise `fallback`. A zero R̄ (or moving range)
/// yields [`SIGMA_EPSILON`] rather than zero.
pub fn within_std_dev(values: &[f64], subgroups: &[Subgroup], d2: f64, fallback: f64) -> f64 {
    if subgroups.len() >= 2 {
        let ranges: Vec<f64> = subgroups.iter().map(|s| s.range).collect();
        let r_bar = mean(&ranges);
        return if r_bar > 0.0 { r_bar / d2 } else { SIGMA_EPSILON };
    }

    if values.len() >= 2 {
        let moving_ranges: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        let mr_bar = mean(&moving_ranges);
        return if mr_bar > 0.0 {
            mr_bar / MOVING_RANGE_D2
        } else {
            SIGMA_EPSILON
        };
    }

    fallback
}

/// (potential index, centered index) for one σ estimate
fn indices(usl: f64, lsl: f64, mu: f64, sigma: f64) -> (f64, f64) {
    let sigma = sigma.max(SIGMA_EPSILON);
    let potential = (usl - lsl) / (6.0 * sigma);
    let upper = (usl - mu) / (3.0 * sigma);
    let lower = (mu - lsl) / (3.0 * sigma);
    (potential, upper.min(lower))
}

/// Capability calculator with configurable d2 and thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapabilityEngine {
    /// d2 matching the subgroup size
    pub d2: f64,
    pub thresholds: CapabilityThresholds,
}

impl Default for CapabilityEngine {
    fn default() -> Self {
        Self {
            d2: ShewhartConstants::N5.d2,
            thresholds: CapabilityThresholds::default(),
        }
    }
}

impl CapabilityEngine {
    /// Engine whose d2 matches `subgroup_size`
    pub fn for_subgroup_size(subgroup_size: usize, thresholds: CapabilityThresholds) -> Self {
        Self {
            d2: ShewhartConstants::for_size_or_default(subgroup_size).d2,
            thresholds,
        }
    }

    /// Evaluate measurements against a parsed tolerance
    pub fn evaluate(
        &self,
        values: &[f64],
        spec: &ToleranceSpec,
        subgroups: &[Subgroup],
    ) -> CapabilityResult {
        self.compute(values, spec.usl, spec.lsl, spec.nominal, subgroups)
    }

    /// Evaluate measurements against explicit limits
    pub fn compute(
        &self,
        values: &[f64],
        usl: f64,
        lsl: f64,
        nominal: f64,
        subgroups: &[Subgroup],
    ) -> CapabilityResult {
        let count = values.len();
        let (mu, min, max) = if values.is_empty() {
            (nominal, nominal, nominal)
        } else {
            let (lo, hi) = min_max(values);
            (mean(values), lo, hi)
        };

        let std_overall = overall_std_dev(values, usl, lsl);
        let std_within = within_std_dev(values, subgroups, self.d2, std_overall);

        let (cp, cpk) = indices(usl, lsl, mu, std_within);
        let (pp, ppk) = indices(usl, lsl, mu, std_overall);

        let level = if cpk >= self.thresholds.capable_cpk {
            CapabilityLevel::Capable
        } else if cpk >= self.thresholds.acceptable_cpk {
            CapabilityLevel::Acceptable
        } else {
            CapabilityLevel::Incapable
        };

        let out_of_spec = values.iter().filter(|&&v| v < lsl || v > usl).count();
        let status = if out_of_spec > 0 {
            LotStatus::Ng
        } else {
            LotStatus::Ok
        };

        let band = usl - lsl;
        let offset = mu - nominal;
        let centering_issue = band > 0.0
            && offset.abs() > self.thresholds.centering_fraction * band
            && cpk < self.thresholds.capable_cpk;

        let ppm_observed = if count > 0 {
            out_of_spec as f64 / count as f64 * 1e6
        } else {
            0.0
        };
        let sigma = std_overall.max(SIGMA_EPSILON);
        let ppm_expected =
            ((1.0 - normal_cdf((usl - mu) / sigma)) + normal_cdf((lsl - mu) / sigma)) * 1e6;

        let conclusion = self.conclusion(level, status, cpk, out_of_spec, count);
        let suggestion = self.suggestion(level, status, centering_issue, offset, band);

        CapabilityResult {
            count,
            mean: mu,
            min,
            max,
            std_overall,
            std_within,
            cp,
            cpk,
            pp,
            ppk,
            level,
            status,
            out_of_spec,
            centering_issue,
            ppm_observed,
            ppm_expected,
            conclusion,
            suggestion,
        }
    }

    fn conclusion(
        &self,
        level: CapabilityLevel,
        status: LotStatus,
        cpk: f64,
        out_of_spec: usize,
        count: usize,
    ) -> String {
        let t = &self.thresholds;
        let verdict = match level {
            CapabilityLevel::Capable => {
                format!("Capable (Cpk {:.2} ≥ {:.2})", cpk, t.capable_cpk)
            }
            CapabilityLevel::Acceptable => format!(
                "Acceptable, monitor ({:.2} ≤ Cpk {:.2} < {:.2})",
                t.acceptable_cpk, cpk, t.capable_cpk
            ),
            CapabilityLevel::Incapable => format!(
                "Incapable, act now (Cpk {:.2} < {:.2})",
                cpk, t.acceptable_cpk
            ),
        };
        match status {
            LotStatus::Ok => verdict,
            LotStatus::Ng => format!(
                "NG: {} of {} parts out of tolerance; {}",
                out_of_spec, count, verdict
            ),
        }
    }

    fn suggestion(
        &self,
        level: CapabilityLevel,
        status: LotStatus,
        centering_issue: bool,
        offset: f64,
        band: f64,
    ) -> String {
        let mut parts = Vec::new();

        if status == LotStatus::Ng {
            parts.push(
                "Hold the lot and sort the out-of-tolerance parts before release.".to_string(),
            );
        }

        if centering_issue {
            parts.push(format!(
                "Process mean is off nominal by {:+.4} ({:.0}% of the tolerance band); \
                 re-center the setup before working on spread.",
                offset,
                offset.abs() / band * 100.0
            ));
        }

        let advice = match (level, centering_issue) {
            (CapabilityLevel::Capable, _) => {
                "Process is stable and well inside tolerance; keep current controls, \
                 sampling frequency may be reduced."
            }
            (CapabilityLevel::Acceptable, true) => {
                "Spread is adequate once centered; keep watching the Xbar chart for drift."
            }
            (CapabilityLevel::Acceptable, false) => {
                "Keep monitoring the Xbar-R chart and watch for a drifting mean."
            }
            (CapabilityLevel::Incapable, true) => {
                "Re-evaluate capability after centering; spread may also need work."
            }
            (CapabilityLevel::Incapable, false) => {
                "Spread is too wide for the tolerance: check equipment precision, \
                 ask the supplier to tighten the process and increase sampling."
            }
        };
        parts.push(advice.to_string());

        parts.join(" ")
    }
}

/// Capability with the default engine (n = 5, Cpk 1.33 / 1.00), nominal
/// taken as the midpoint of the limits
pub fn capability(values: &[f64], usl: f64, lsl: f64, subgroups: &[Subgroup]) -> CapabilityResult {
    CapabilityEngine::default().compute(values, usl, lsl, (usl + lsl) / 2.0, subgroups)
}
