//! Dimension and measurement recovery from inspection tables
//!
//! Works in two passes over the table blocks of one document:
//!
//! 1. **Discover.** A row with a header keyword cell (`检验位置`, ...) is a
//!    location row and the row after it holds the tolerances. Every column
//!    `j >= 1` whose text is a location label creates a dimension. The first
//!    time a label is seen fixes its tolerance.
//! 2. **Collect.** Location rows replace the active column→label mapping,
//!    which lets a table split across pages restate (or reorder) its header.
//!    Rows starting with a bare integer are data rows; the value of the
//!    dimension in header column `j` sits in cell `2j - 1`, since each
//!    dimension takes one value cell and one judgment cell.
//!
//! Values are keyed by sequence number, so repeated rows overwrite instead of
//! double counting, and are emitted in sequence order.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::core::config::ExtractionConfig;
use crate::core::spec;
use crate::entities::dimension::DimensionRecord;
use crate::extract::metadata::DocumentMetadata;
use crate::extract::table::{parse_blocks, text_lines, Block};
use crate::extract::{DocumentError, ExtractedDocument};

static VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?(?:\d+(?:\.\d+)?|\.\d+)").expect("static regex"));

/// Circled digits ① (U+2460) through ⑳ (U+2473)
const CIRCLED_RANGE: std::ops::RangeInclusive<char> = '\u{2460}'..='\u{2473}';

/// A dimension being assembled
struct Pending {
    record: DimensionRecord,
    by_sequence: BTreeMap<u64, f64>,
}

/// Extracts dimension records from OCR'd form text
#[derive(Debug, Clone, Default)]
pub struct TableExtractor {
    config: ExtractionConfig,
}

impl TableExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Dimension records of a document; empty when nothing is recognized
    pub fn extract(&self, text: &str) -> Vec<DimensionRecord> {
        self.extract_document(text).records
    }

    /// Dimension records plus the batch metadata of a document
    pub fn extract_document(&self, text: &str) -> ExtractedDocument {
        let blocks = parse_blocks(text);
        let lines = text_lines(text);
        let metadata = DocumentMetadata::from_parts(&blocks, &lines);
        let sample_size = metadata
            .sample_size
            .unwrap_or(self.config.default_sample_size);

        let (mut pending, index) = self.discover(&blocks);
        self.collect(&blocks, &mut pending, &index, sample_size);
        let records = self.finalize(pending, sample_size, metadata.sample_size);

        if records.is_empty() {
            tracing::info!(tables = blocks.len(), "no dimensions recognized");
        }

        ExtractedDocument {
            metadata,
            records,
            tables: blocks.len(),
        }
    }

    /// Read and extract a document file
    pub fn extract_file(&self, path: &Path) -> Result<ExtractedDocument, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let _span = tracing::info_span!("extract", path = %path.display()).entered();
        Ok(self.extract_document(&text))
    }

    /// Whether a row carries a header keyword
    pub fn is_location_row(&self, row: &[String]) -> bool {
        row.iter().any(|cell| {
            self.config
                .header_keywords
                .iter()
                .any(|keyword| cell.contains(keyword.as_str()))
        })
    }

    /// Whether text belongs to the location label alphabet
    pub fn is_label(&self, text: &str) -> bool {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if CIRCLED_RANGE.contains(&c) => true,
            _ => {
                self.config.numeric_labels
                    && (1..=3).contains(&text.len())
                    && text.bytes().all(|b| b.is_ascii_digit())
            }
        }
    }

    fn discover(&self, blocks: &[Block]) -> (Vec<Pending>, HashMap<String, usize>) {
        let mut pending: Vec<Pending> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for block in blocks {
            for (i, row) in block.rows.iter().enumerate() {
                if !self.is_location_row(row) {
                    continue;
                }
                let spec_row = block.rows.get(i + 1);
                for (j, cell) in row.iter().enumerate().skip(1) {
                    let label = cell.trim();
                    if !self.is_label(label) || index.contains_key(label) {
                        continue;
                    }
                    let spec_text = spec_row
                        .and_then(|r| r.get(j))
                        .map(String::as_str)
                        .unwrap_or("");
                    let spec = spec::parse(spec_text);
                    tracing::debug!(label, column = j, spec = spec_text, "discovered dimension");

                    index.insert(label.to_string(), pending.len());
                    pending.push(Pending {
                        record: DimensionRecord::new(label, spec),
                        by_sequence: BTreeMap::new(),
                    });
                }
            }
        }

        (pending, index)
    }

    fn collect(
        &self,
        blocks: &[Block],
        pending: &mut [Pending],
        index: &HashMap<String, usize>,
        sample_size: usize,
    ) {
        let max_sequence = (sample_size as u64).saturating_mul(2);
        // (header column, dimension slot)
        let mut mapping: Vec<(usize, usize)> = Vec::new();

        for block in blocks {
            for row in &block.rows {
                if self.is_location_row(row) {
                    mapping = row
                        .iter()
                        .enumerate()
                        .skip(1)
                        .filter_map(|(j, cell)| index.get(cell.trim()).map(|&slot| (j, slot)))
                        .collect();
                    tracing::debug!(columns = mapping.len(), "column mapping replaced");
                    continue;
                }

                let Some(sequence) = row.first().and_then(|cell| sequence_number(cell)) else {
                    continue;
                };
                if sequence > max_sequence {
                    tracing::warn!(
                        sequence,
                        limit = max_sequence,
                        "sequence number beyond twice the sample size, row discarded"
                    );
                    continue;
                }

                for &(j, slot) in &mapping {
                    let value = row.get(2 * j - 1).and_then(|cell| first_number(cell));
                    if let Some(value) = value {
                        pending[slot].by_sequence.insert(sequence, value);
                    }
                }
            }
        }
    }

    fn finalize(
        &self,
        pending: Vec<Pending>,
        sample_size: usize,
        declared: Option<usize>,
    ) -> Vec<DimensionRecord> {
        pending
            .into_iter()
            .filter_map(|Pending { mut record, by_sequence }| {
                record.measurements = by_sequence.into_values().take(sample_size).collect();
                record.expected_count = declared;

                if record.measurements.len() < self.config.min_measurements {
                    tracing::warn!(
                        label = %record.identity,
                        count = record.measurements.len(),
                        min = self.config.min_measurements,
                        "too few measurements, dimension dropped"
                    );
                    return None;
                }
                if record.is_short() {
                    tracing::info!(
                        label = %record.identity,
                        count = record.measurements.len(),
                        expected = ?record.expected_count,
                        "fewer measurements than declared sample size"
                    );
                }
                Some(record)
            })
            .collect()
    }
}

/// Leading cell of a data row: a bare non-negative integer
fn sequence_number(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    if cell.is_empty() || !cell.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cell.parse().ok()
}

/// First numeric substring of a value cell
fn first_number(cell: &str) -> Option<f64> {
    VALUE_RE.find(cell)?.as_str().parse().ok()
}
