//! Text acquisition: turns input files into [`RawDocument`]s.
//!
//! PDFs are read through their text layer only; scanned pages without one
//! come back empty. Anything else is read as plain text.

use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, WINDOWS_1252};
use lopdf::Document;

use crate::error::ExtractError;
use crate::model::RawDocument;
use crate::warning::{ExtractWarning, WarningCode};

const REPORT_LABELS: [&str; 8] = [
    "patient",
    "name",
    "age",
    "gender",
    "sex",
    "test results",
    "diagnosis",
    "observations",
];

/// Decodes plain-text bytes: BOM-tagged UTF-8/UTF-16 first, then UTF-8, then
/// Windows-1252 as the lossless last resort.
pub(crate) fn decode_text_bytes(bytes: &[u8]) -> String {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return text.into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

fn looks_decoding_broken(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t' | '\u{000C}'))
        .count();
    replacement * 8 > total || control * 5 > total
}

fn text_quality_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let lower = text.to_lowercase();
    let label_hits = REPORT_LABELS
        .iter()
        .filter(|label| lower.contains(*label))
        .count();
    let non_empty_lines = text.lines().filter(|line| !line.trim().is_empty()).count();

    let broken_penalty = if looks_decoding_broken(text) { 800 } else { 0 };
    i64::try_from(label_hits * 50 + non_empty_lines).unwrap_or(i64::MAX / 4) - broken_penalty
}

fn choose_best_text(candidates: &[String]) -> String {
    candidates
        .iter()
        .max_by_key(|text| text_quality_score(text))
        .cloned()
        .unwrap_or_default()
}

/// Text layer of a PDF, picking the better of `pdf-extract` and the per-page
/// `lopdf` extraction.
pub(crate) fn pdf_text_from_bytes(bytes: &[u8]) -> Result<String, ExtractError> {
    let document = Document::load_mem(bytes)?;

    let mut candidates = Vec::new();
    let mut extract_failure = None;
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) if !text.trim().is_empty() => candidates.push(text),
        Ok(_) => {}
        Err(error) => {
            tracing::debug!(%error, "pdf-extract failed; using lopdf text only");
            extract_failure = Some(error.to_string());
        }
    }

    let page_texts = document
        .get_pages()
        .keys()
        .filter_map(|page| document.extract_text(&[*page]).ok())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>();
    if !page_texts.is_empty() {
        candidates.push(page_texts.join("\n"));
    }

    match extract_failure {
        Some(message) if candidates.is_empty() => Err(ExtractError::PdfExtract(message)),
        _ => Ok(choose_best_text(&candidates)),
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("pdf"))
}

fn source_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Reads one file. The document is named after the file name, without its
/// directory.
pub fn read_document(path: &Path) -> Result<RawDocument, ExtractError> {
    let bytes = std::fs::read(path)?;
    let text = if is_pdf(path) {
        pdf_text_from_bytes(&bytes)?
    } else {
        decode_text_bytes(&bytes)
    };

    Ok(RawDocument::new(source_name(path), text))
}

/// Reads every file in order. Files that fail to read are reported as
/// warnings and kept as empty documents so the output stays aligned with
/// the inputs.
pub fn read_documents(paths: &[PathBuf], warnings: &mut Vec<ExtractWarning>) -> Vec<RawDocument> {
    paths
        .iter()
        .map(|path| match read_document(path) {
            Ok(document) => {
                if document.text.trim().is_empty() {
                    warnings.push(
                        ExtractWarning::new(WarningCode::EmptyText, "document has no text layer")
                            .with_file(&document.source),
                    );
                }
                document
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to read document");
                let source = source_name(path);
                warnings.push(
                    ExtractWarning::new(WarningCode::UnreadableDocument, error.to_string())
                        .with_file(&source),
                );
                RawDocument::new(source, "")
            }
        })
        .collect()
}
