use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to extract PDF text: {0}")]
    PdfExtract(String),

    #[error("invalid catalog pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("failed to build disease lexicon: {0}")]
    Lexicon(#[from] aho_corasick::BuildError),

    #[error("unsupported catalog version {found} (expected {expected})")]
    UnsupportedCatalogVersion { found: u32, expected: u32 },

    #[error("catalog {list} entry '{term}' has a blank term or synonym")]
    BlankCatalogTerm { list: String, term: String },

    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
