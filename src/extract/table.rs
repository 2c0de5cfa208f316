//! Table block parsing for OCR'd documents
//!
//! OCR output mixes HTML `<table>` fragments with Markdown pipe tables.
//! Both are reduced to the same shape: a block of rows of trimmed cell text,
//! in document order. Cells are taken literally; `colspan`/`rowspan` are not
//! expanded.

use once_cell::sync::Lazy;
use regex::Regex;

/// A table runs to its closing tag, or to the end of the text when a
/// truncated page lost it
static TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<table\b[^>]*>(.*?)(?:</table\s*>|\z)").expect("static regex")
});
static ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").expect("static regex"));
static CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<t([dh])\b[^>]*>(.*?)</t[dh]\s*>").expect("static regex")
});
static BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("static regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));
static SEPARATOR_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:?-+:?$").expect("static regex"));

/// One table: rows of cell text
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub rows: Vec<Vec<String>>,
}

/// Split a document into table blocks, in document order.
///
/// Text outside tables is ignored. Tables without any cells are dropped.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    for table in TABLE_RE.captures_iter(text) {
        let (Some(whole), Some(body)) = (table.get(0), table.get(1)) else {
            continue;
        };
        blocks.extend(markdown_blocks(&text[cursor..whole.start()]));
        if let Some(block) = html_block(body.as_str()) {
            blocks.push(block);
        }
        cursor = whole.end();
    }
    blocks.extend(markdown_blocks(&text[cursor..]));

    tracing::debug!(blocks = blocks.len(), "parsed table blocks");
    blocks
}

/// Lines outside table markup; used for `key: value` metadata
pub fn text_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut cursor = 0;
    for table in TABLE_RE.find_iter(text) {
        lines.extend(plain_lines(&text[cursor..table.start()]));
        cursor = table.end();
    }
    lines.extend(plain_lines(&text[cursor..]));
    lines
}

fn plain_lines(segment: &str) -> impl Iterator<Item = &str> {
    segment
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('|'))
}

fn html_block(body: &str) -> Option<Block> {
    let rows: Vec<Vec<String>> = ROW_RE
        .captures_iter(body)
        .filter_map(|row| {
            let inner = row.get(1)?.as_str();
            let cells: Vec<String> = CELL_RE
                .captures_iter(inner)
                .filter_map(|cell| cell.get(2).map(|m| clean_html_cell(m.as_str())))
                .collect();
            (!cells.is_empty()).then_some(cells)
        })
        .collect();

    (!rows.is_empty()).then_some(Block { rows })
}

fn clean_html_cell(raw: &str) -> String {
    let spaced = BREAK_RE.replace_all(raw, " ");
    let stripped = TAG_RE.replace_all(&spaced, "");
    let decoded = html_escape::decode_html_entities(stripped.as_ref());
    collapse_whitespace(&decoded)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn markdown_blocks(segment: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for line in segment.lines() {
        let line = line.trim();
        if line.starts_with('|') {
            if let Some(cells) = markdown_row(line) {
                rows.push(cells);
            }
        } else if !rows.is_empty() {
            blocks.push(Block {
                rows: std::mem::take(&mut rows),
            });
        }
    }
    if !rows.is_empty() {
        blocks.push(Block { rows });
    }
    blocks
}

/// Cells of one pipe-table line; `None` for the `|---|:--:|` separator
fn markdown_row(line: &str) -> Option<Vec<String>> {
    let inner = line.trim_start_matches('|');
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    let cells: Vec<String> = inner
        .split('|')
        .map(|cell| {
            let cell = cell.trim();
            let cell = cell
                .strip_prefix("**")
                .and_then(|c| c.strip_suffix("**"))
                .unwrap_or(cell);
            collapse_whitespace(cell)
        })
        .collect();

    let is_separator = cells
        .iter()
        .all(|c| c.is_empty() || SEPARATOR_CELL_RE.is_match(c))
        && cells.iter().any(|c| !c.is_empty());
    (!is_separator).then_some(cells)
}
