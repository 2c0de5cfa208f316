//! Inspection form extraction: table blocks, batch metadata and dimensions

pub mod extractor;
pub mod metadata;
pub mod table;

use miette::Diagnostic;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::entities::dimension::DimensionRecord;

pub use extractor::TableExtractor;
pub use metadata::DocumentMetadata;
pub use table::{parse_blocks, Block};

/// File extensions treated as OCR'd documents
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "html", "htm", "txt"];

#[derive(Debug, Error, Diagnostic)]
pub enum DocumentError {
    #[error("Failed to read {}", path.display())]
    #[diagnostic(
        code(iqc::document::read),
        help("documents must be UTF-8 text (Markdown or HTML)")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything recovered from one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedDocument {
    pub metadata: DocumentMetadata,
    pub records: Vec<DimensionRecord>,

    /// Number of table blocks found
    pub tables: usize,
}

/// Whether a path has a document extension
pub fn is_document(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
