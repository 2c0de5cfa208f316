//! Batch metadata from the header block of an inspection form

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extract::table::Block;

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Metadata fields that can be recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    MaterialName,
    MaterialCode,
    BatchNumber,
    Supplier,
    Date,
    LotQuantity,
    SampleSize,
    Aql,
}

/// Key spellings per field. More specific keys come first so that
/// `物料批号` is not mistaken for a shorter key.
const KEYS: &[(&str, Field)] = &[
    ("物料名称", Field::MaterialName),
    ("物料编码", Field::MaterialCode),
    ("物料批号", Field::BatchNumber),
    ("批号", Field::BatchNumber),
    ("Lot No", Field::BatchNumber),
    ("Batch", Field::BatchNumber),
    ("供应商", Field::Supplier),
    ("进料日期", Field::Date),
    ("检验日期", Field::Date),
    ("进料数量", Field::LotQuantity),
    ("批量", Field::LotQuantity),
    ("抽样数量", Field::SampleSize),
    ("样本数", Field::SampleSize),
    ("Sample Size", Field::SampleSize),
    ("AQL", Field::Aql),
];

/// Batch-level information printed on the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    /// Incoming or inspection date, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Number of parts received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_quantity: Option<usize>,

    /// Declared number of parts sampled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<usize>,

    /// AQL entries, as written (`0.65`, `Major 1.0`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aql: Vec<String>,
}

impl DocumentMetadata {
    /// Read metadata from table blocks and free-text lines.
    ///
    /// Table cells are read as `key | value` pairs: the value is the next
    /// non-empty cell after the key in the same row. Text lines are read as
    /// `key: value` or `key：value`. The first value seen for a field wins.
    pub fn from_parts(blocks: &[Block], lines: &[&str]) -> Self {
        let mut meta = Self::default();

        for row in blocks.iter().flat_map(|block| &block.rows) {
            for (i, cell) in row.iter().enumerate() {
                let Some(field) = match_key(cell) else {
                    continue;
                };
                let value = row[i + 1..]
                    .iter()
                    .find(|c| !c.is_empty())
                    .filter(|c| match_key(c).is_none());
                if let Some(value) = value {
                    meta.set(field, value);
                }
            }
        }

        for line in lines {
            let Some((key, value)) = line.split_once([':', '：']) else {
                continue;
            };
            if let Some(field) = match_key(key) {
                let value = value.trim();
                if !value.is_empty() {
                    meta.set(field, value);
                }
            }
        }

        meta
    }

    /// Whether nothing was recognized
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn set(&mut self, field: Field, value: &str) {
        let text = || Some(value.trim().to_string());
        match field {
            Field::MaterialName if self.material_name.is_none() => self.material_name = text(),
            Field::MaterialCode if self.material_code.is_none() => self.material_code = text(),
            Field::BatchNumber if self.batch_number.is_none() => self.batch_number = text(),
            Field::Supplier if self.supplier.is_none() => self.supplier = text(),
            Field::Date if self.date.is_none() => self.date = text(),
            Field::LotQuantity if self.lot_quantity.is_none() => {
                self.lot_quantity = first_integer(value)
            }
            Field::SampleSize if self.sample_size.is_none() => {
                self.sample_size = first_integer(value).filter(|n| *n > 0);
                if let Some(n) = self.sample_size {
                    tracing::debug!(sample_size = n, "declared sample size");
                }
            }
            Field::Aql => self.aql.push(value.trim().to_string()),
            _ => {}
        }
    }
}

/// Field whose key the cell text contains, if any.
///
/// Long cells are ignored so that a remark mentioning "批号" in passing is
/// not read as a key.
fn match_key(cell: &str) -> Option<Field> {
    let cell = cell.trim();
    if cell.is_empty() || cell.chars().count() > 24 {
        return None;
    }
    KEYS.iter()
        .find(|(key, _)| cell.contains(key))
        .map(|(_, field)| *field)
}

fn first_integer(text: &str) -> Option<usize> {
    INTEGER_RE.find(text)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::table::{parse_blocks, text_lines};

    fn read(text: &str) -> DocumentMetadata {
        let blocks = parse_blocks(text);
        let lines = text_lines(text);
        DocumentMetadata::from_parts(&blocks, &lines)
    }

    #[test]
    fn test_html_key_value_cells() {
        let text = "<table>\
            <tr><td>物料名称</td><td>垫片</td><td>物料编码</td><td>3.01.0042</td></tr>\
            <tr><td>物料批号</td><td>JSR20240311</td><td>供应商</td><td>华兴五金</td></tr>\
            <tr><td>进料数量</td><td>2000 pcs</td><td>抽样数量</td><td>32</td></tr>\
            <tr><td>进料日期</td><td>2024-03-11</td><td>AQL</td><td>0.65</td></tr>\
            </table>";
        let meta = read(text);
        assert_eq!(meta.material_name.as_deref(), Some("垫片"));
        assert_eq!(meta.material_code.as_deref(), Some("3.01.0042"));
        assert_eq!(meta.batch_number.as_deref(), Some("JSR20240311"));
        assert_eq!(meta.supplier.as_deref(), Some("华兴五金"));
        assert_eq!(meta.lot_quantity, Some(2000));
        assert_eq!(meta.sample_size, Some(32));
        assert_eq!(meta.date.as_deref(), Some("2024-03-11"));
        assert_eq!(meta.aql, vec!["0.65".to_string()]);
    }

    #[test]
    fn test_value_skips_empty_cells() {
        let text = "| 抽样数量 | | 50 |\n";
        assert_eq!(read(text).sample_size, Some(50));
    }

    #[test]
    fn test_key_at_row_end_does_not_read_next_row() {
        let text = "<table>\
            <tr><td>物料名称</td><td>垫片</td><td>供应商</td></tr>\
            <tr><td>华兴五金</td><td>物料批号</td><td>JSR20240311</td></tr>\
            </table>";
        let meta = read(text);
        assert_eq!(meta.supplier, None);
        assert_eq!(meta.material_name.as_deref(), Some("垫片"));
        assert_eq!(meta.batch_number.as_deref(), Some("JSR20240311"));
    }

    #[test]
    fn test_key_followed_by_key_has_no_value() {
        let text = "| 供应商 | 物料批号 | B-7 |\n";
        let meta = read(text);
        assert_eq!(meta.supplier, None);
        assert_eq!(meta.batch_number.as_deref(), Some("B-7"));
    }

    #[test]
    fn test_text_lines() {
        let text = "物料名称：垫片\nSample Size: 20\nLot No: L-0042\n";
        let meta = read(text);
        assert_eq!(meta.material_name.as_deref(), Some("垫片"));
        assert_eq!(meta.sample_size, Some(20));
        assert_eq!(meta.batch_number.as_deref(), Some("L-0042"));
    }

    #[test]
    fn test_first_value_wins() {
        let text = "| 抽样数量 | 20 |\n\n| 抽样数量 | 80 |\n";
        assert_eq!(read(text).sample_size, Some(20));
    }

    #[test]
    fn test_non_numeric_sample_size_ignored() {
        let text = "| 抽样数量 | 见附表 |\n";
        assert_eq!(read(text).sample_size, None);
        assert!(read("no metadata").is_empty());
    }
}
