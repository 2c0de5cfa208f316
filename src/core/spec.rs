//! Tolerance specification parsing
//!
//! Converts the tolerance notations written on inspection forms into a
//! canonical nominal/USL/LSL triple. Grammars are tried in a fixed order and
//! the first match wins, because some notations are syntactic subsets of
//! others (a lone `+` is a prefix of `+x-y`).
//!
//! Parsing never fails: text no grammar recognizes still yields a placeholder
//! band, tagged [`SpecGrammar::Unparseable`], so one garbled spec cell cannot
//! stop the other dimensions of a document from being analyzed.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Marker every diameter glyph is folded into before matching
pub const DIAMETER_MARKER: char = 'Φ';

/// Glyphs that OCR produces for the diameter symbol
const DIAMETER_GLYPHS: &[char] = &['Φ', 'φ', 'Ø', 'ø', 'Ф', 'ф', '⌀'];

/// Unsigned decimal number: `6`, `6.00`, `6.`, `.5`
const NUM: &str = r"(\d+(?:\.\d*)?|\.\d+)";

static DIAMETER_SYMMETRIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^Φ{NUM}±{NUM}$")).expect("static regex"));
static SYMMETRIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{NUM}±{NUM}$")).expect("static regex"));
static BILATERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{NUM}\+{NUM}-{NUM}$")).expect("static regex"));
static PLUS_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{NUM}\+{NUM}$")).expect("static regex"));
static BARE_NOMINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{NUM}$")).expect("static regex"));

/// The notation a tolerance string was recognized as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecGrammar {
    /// `Φ6.00±0.10`
    DiameterSymmetric,
    /// `2.88±1.0`
    Symmetric,
    /// `27.80+0.10-0.00`
    Bilateral,
    /// `27.80+0.10` with no minus term; lower limit assumed to be nominal
    PlusOnly,
    /// `27.80` with no tolerance at all; synthetic ±1% band
    BareNominal,
    /// Nothing matched; placeholder band `[-1, 1]` around zero
    Unparseable,
}

impl SpecGrammar {
    /// Grammars in matching priority order
    pub const ORDERED: &'static [SpecGrammar] = &[
        SpecGrammar::DiameterSymmetric,
        SpecGrammar::Symmetric,
        SpecGrammar::Bilateral,
        SpecGrammar::PlusOnly,
        SpecGrammar::BareNominal,
    ];

    /// Whether limits derived by this grammar are an assumption rather than
    /// a reading of a complete tolerance
    pub fn is_low_confidence(&self) -> bool {
        matches!(
            self,
            SpecGrammar::PlusOnly | SpecGrammar::BareNominal | SpecGrammar::Unparseable
        )
    }

    /// Try this grammar against normalized text.
    ///
    /// `marked` still carries the diameter marker; `bare` has it removed.
    /// Returns `(nominal, usl, lsl)` on a match.
    pub fn apply(&self, marked: &str, bare: &str) -> Option<(f64, f64, f64)> {
        match self {
            SpecGrammar::DiameterSymmetric => {
                let caps = DIAMETER_SYMMETRIC_RE.captures(marked)?;
                let (nominal, tol) = (number(&caps, 1)?, number(&caps, 2)?);
                Some((nominal, nominal + tol, nominal - tol))
            }
            SpecGrammar::Symmetric => {
                let caps = SYMMETRIC_RE.captures(bare)?;
                let (nominal, tol) = (number(&caps, 1)?, number(&caps, 2)?);
                Some((nominal, nominal + tol, nominal - tol))
            }
            SpecGrammar::Bilateral => {
                let caps = BILATERAL_RE.captures(bare)?;
                let nominal = number(&caps, 1)?;
                let (plus, minus) = (number(&caps, 2)?, number(&caps, 3)?);
                Some((nominal, nominal + plus, nominal - minus))
            }
            SpecGrammar::PlusOnly => {
                let caps = PLUS_ONLY_RE.captures(bare)?;
                let (nominal, tol) = (number(&caps, 1)?, number(&caps, 2)?);
                Some((nominal, nominal + tol, nominal))
            }
            SpecGrammar::BareNominal => {
                let caps = BARE_NOMINAL_RE.captures(bare)?;
                let nominal = number(&caps, 1)?;
                Some((nominal, nominal * 1.01, nominal * 0.99))
            }
            SpecGrammar::Unparseable => Some((0.0, 1.0, -1.0)),
        }
    }
}

impl std::fmt::Display for SpecGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecGrammar::DiameterSymmetric => write!(f, "diameter-symmetric"),
            SpecGrammar::Symmetric => write!(f, "symmetric"),
            SpecGrammar::Bilateral => write!(f, "bilateral"),
            SpecGrammar::PlusOnly => write!(f, "plus-only"),
            SpecGrammar::BareNominal => write!(f, "bare-nominal"),
            SpecGrammar::Unparseable => write!(f, "unparseable"),
        }
    }
}

fn number(caps: &Captures<'_>, group: usize) -> Option<f64> {
    caps.get(group)?.as_str().parse().ok()
}

/// A tolerance reduced to its limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSpec {
    /// Nominal (target) value
    pub nominal: f64,

    /// Upper specification limit
    pub usl: f64,

    /// Lower specification limit
    pub lsl: f64,

    /// Text as it appeared on the form
    pub raw_text: String,

    /// Notation the text was recognized as
    pub grammar: SpecGrammar,
}

impl ToleranceSpec {
    /// Placeholder band used when nothing could be recognized
    pub fn placeholder(raw_text: &str) -> Self {
        Self {
            nominal: 0.0,
            usl: 1.0,
            lsl: -1.0,
            raw_text: raw_text.to_string(),
            grammar: SpecGrammar::Unparseable,
        }
    }

    /// Width of the tolerance zone (USL - LSL)
    pub fn tolerance_band(&self) -> f64 {
        self.usl - self.lsl
    }

    /// Check whether a measured value lies inside `[lsl, usl]`
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lsl && value <= self.usl
    }

    /// See [`SpecGrammar::is_low_confidence`]
    pub fn is_low_confidence(&self) -> bool {
        self.grammar.is_low_confidence()
    }
}

/// Canonicalize a tolerance string before grammar matching.
///
/// Removes whitespace, parentheses and the `mm` unit, folds every diameter
/// glyph into [`DIAMETER_MARKER`] and the various plus/minus spellings into
/// `+`, `-` and `±`.
pub fn normalize(spec_text: &str) -> String {
    let folded: String = spec_text
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter_map(|c| match c {
            '(' | ')' | '（' | '）' => None,
            c if DIAMETER_GLYPHS.contains(&c) => Some(DIAMETER_MARKER),
            '＋' => Some('+'),
            '－' | '−' | '–' => Some('-'),
            // OCR regularly reads ± as the CJK character 士
            '士' => Some('±'),
            c => Some(c),
        })
        .collect();

    folded
        .replace("+/-", "±")
        .replace("+-", "±")
        .replace("mm", "")
        .replace("MM", "")
        .replace('㎜', "")
}

/// Parse a tolerance string into a [`ToleranceSpec`].
///
/// Never fails; see the module documentation for the fallback policy.
pub fn parse(spec_text: &str) -> ToleranceSpec {
    let marked = normalize(spec_text);
    let bare: String = marked.chars().filter(|c| *c != DIAMETER_MARKER).collect();

    for grammar in SpecGrammar::ORDERED {
        if let Some((nominal, usl, lsl)) = grammar.apply(&marked, &bare) {
            if grammar.is_low_confidence() {
                tracing::debug!(spec = spec_text, %grammar, "low-confidence tolerance notation");
            }
            return ToleranceSpec {
                nominal,
                usl,
                lsl,
                raw_text: spec_text.to_string(),
                grammar: *grammar,
            };
        }
    }

    tracing::warn!(
        spec = spec_text,
        "unrecognized tolerance notation, using placeholder band"
    );
    ToleranceSpec::placeholder(spec_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_limits(spec: &ToleranceSpec, nominal: f64, usl: f64, lsl: f64) {
        assert!(
            (spec.nominal - nominal).abs() < 1e-9,
            "nominal {} != {}",
            spec.nominal,
            nominal
        );
        assert!((spec.usl - usl).abs() < 1e-9, "usl {} != {}", spec.usl, usl);
        assert!((spec.lsl - lsl).abs() < 1e-9, "lsl {} != {}", spec.lsl, lsl);
    }

    #[test]
    fn test_bilateral() {
        let spec = parse("27.80+0.10-0.00");
        assert_limits(&spec, 27.80, 27.90, 27.80);
        assert_eq!(spec.grammar, SpecGrammar::Bilateral);
    }

    #[test]
    fn test_bilateral_with_unit_and_spaces() {
        let spec = parse("73.20 +0.00 -0.15 (mm)");
        assert_limits(&spec, 73.20, 73.20, 73.05);
        assert_eq!(spec.raw_text, "73.20 +0.00 -0.15 (mm)");
    }

    #[test]
    fn test_diameter_symmetric() {
        let spec = parse("Φ6.00±0.10");
        assert_limits(&spec, 6.00, 6.10, 5.90);
        assert_eq!(spec.grammar, SpecGrammar::DiameterSymmetric);
    }

    #[test]
    fn test_diameter_glyph_variants() {
        for text in ["Ø6.00±0.10", "Ф6.00±0.10mm", "φ 6.00 ± 0.10", "(Φ6.00±0.10)"] {
            let spec = parse(text);
            assert_eq!(spec.grammar, SpecGrammar::DiameterSymmetric, "{}", text);
            assert_limits(&spec, 6.00, 6.10, 5.90);
        }
    }

    #[test]
    fn test_symmetric_without_marker() {
        let spec = parse("2.88±1.0");
        assert_limits(&spec, 2.88, 3.88, 1.88);
        assert_eq!(spec.grammar, SpecGrammar::Symmetric);
    }

    #[test]
    fn test_symmetric_ascii_spellings() {
        assert_limits(&parse("10+/-0.2"), 10.0, 10.2, 9.8);
        assert_limits(&parse("10+-0.2"), 10.0, 10.2, 9.8);
        assert_limits(&parse("10士0.2"), 10.0, 10.2, 9.8);
    }

    #[test]
    fn test_fullwidth_signs() {
        let spec = parse("27.80＋0.10－0.05");
        assert_limits(&spec, 27.80, 27.90, 27.75);
    }

    #[test]
    fn test_plus_only_assumes_nominal_lower_limit() {
        let spec = parse("12.5+0.2");
        assert_limits(&spec, 12.5, 12.7, 12.5);
        assert_eq!(spec.grammar, SpecGrammar::PlusOnly);
        assert!(spec.is_low_confidence());
    }

    #[test]
    fn test_bare_nominal_gets_one_percent_band() {
        let spec = parse("50.00mm");
        assert_limits(&spec, 50.0, 50.5, 49.5);
        assert_eq!(spec.grammar, SpecGrammar::BareNominal);
        assert!(spec.is_low_confidence());
    }

    #[test]
    fn test_unparseable_falls_back() {
        let spec = parse("not-a-spec");
        assert_limits(&spec, 0.0, 1.0, -1.0);
        assert_eq!(spec.grammar, SpecGrammar::Unparseable);
        assert_eq!(spec.raw_text, "not-a-spec");
    }

    #[test]
    fn test_empty_text_falls_back() {
        let spec = parse("");
        assert_eq!(spec.grammar, SpecGrammar::Unparseable);
        assert!(spec.usl >= spec.lsl);
    }

    #[test]
    fn test_bilateral_wins_over_plus_only() {
        // "+0.10" alone would satisfy PlusOnly if it were tried first
        let spec = parse("5+0.10-0.20");
        assert_eq!(spec.grammar, SpecGrammar::Bilateral);
        assert_limits(&spec, 5.0, 5.10, 4.80);
    }

    #[test]
    fn test_usl_not_below_lsl_for_recognized_grammars() {
        for text in ["1±0", "0.5+0.0-0.0", "3+0.4", "7", "Φ2±0.01", ".5±.1"] {
            let spec = parse(text);
            assert!(spec.usl >= spec.lsl, "{} gave {:?}", text, spec);
            assert_ne!(spec.grammar, SpecGrammar::Unparseable, "{}", text);
        }
    }

    #[test]
    fn test_no_rounding_inside_parser() {
        let spec = parse("1.23456±0.00001");
        assert!((spec.usl - 1.23457).abs() < 1e-12);
        assert!((spec.lsl - 1.23455).abs() < 1e-12);
    }

    #[test]
    fn test_each_grammar_independently() {
        assert!(SpecGrammar::DiameterSymmetric
            .apply("6±0.1", "6±0.1")
            .is_none());
        assert!(SpecGrammar::Symmetric.apply("Φ6±0.1", "6±0.1").is_some());
        assert!(SpecGrammar::Bilateral.apply("", "6+0.1").is_none());
        assert!(SpecGrammar::PlusOnly.apply("", "6+0.1").is_some());
        assert!(SpecGrammar::BareNominal.apply("", "abc").is_none());
        assert_eq!(
            SpecGrammar::Unparseable.apply("", ""),
            Some((0.0, 1.0, -1.0))
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(" Ø 6.00 ± 0.10 (mm) "), "Φ6.00±0.10");
        assert_eq!(normalize("27.80+0.10-0.00mm"), "27.80+0.10-0.00");
    }

    #[test]
    fn test_tolerance_band_and_contains() {
        let spec = parse("Φ6.00±0.10");
        assert!((spec.tolerance_band() - 0.2).abs() < 1e-9);
        assert!(spec.contains(6.05));
        assert!(spec.contains(5.90));
        assert!(!spec.contains(6.11));
    }
}
