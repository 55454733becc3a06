mod accuracy;
mod assemble;
mod catalog;
mod csv_io;
mod diagnosis;
mod error;
mod flatten;
mod model;
mod ner;
mod normalize;
mod options;
mod patient;
mod patterns;
mod section;
mod source;
mod warning;

use std::path::{Path, PathBuf};

use crate::csv_io::{read_rows, write_rows};
use crate::warning::WarningCode;

pub use accuracy::{AccuracyReport, FieldAccuracy, score};
pub use assemble::Extractor;
pub use catalog::{CATALOG_VERSION, Catalog, CatalogTerm, Vocabulary};
pub use csv_io::{FILE_COLUMN, FLAT_ROW_HEADERS, read_rows_from_reader, write_rows_to_string};
pub use diagnosis::extract_diagnosis;
pub use error::ExtractError;
pub use flatten::{DIAGNOSIS_SEPARATOR, TEST_SEPARATOR, flatten, flatten_all};
pub use lab_tests::{DETECTED, extract_tests};
pub use model::{
    DiagnosisSet, ExtractionRecord, FlatRow, Gender, PatientField, PatientInfo, RawDocument,
    TestObservation,
};
pub use ner::{DISEASE_LABEL, Entity, EntityRecognizer, LexiconRecognizer, NoEntities};
pub use normalize::normalize;
pub use options::{EvaluatedField, ExtractOptions, FieldKind, FieldSelection, ScoreOptions};
pub use patient::extract_patient_info;
pub use source::{read_document, read_documents};
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub row_count: usize,
    pub readable_count: usize,
    pub extracted_count: usize,
    pub warnings: Vec<ExtractWarning>,
}

fn validate_delimiter(delimiter: u8) -> Result<(), ExtractError> {
    if matches!(delimiter, b'"' | b'\n' | b'\r') || !delimiter.is_ascii() {
        return Err(ExtractError::InvalidOption(format!(
            "delimiter {:?} cannot separate csv fields",
            char::from(delimiter)
        )));
    }
    Ok(())
}

/// Reads and extracts every input, in order.
///
/// Unreadable files do not fail the batch: they are reported in the returned
/// warnings and still produce an (empty) record.
pub fn extract_files(
    inputs: &[PathBuf],
    options: &ExtractOptions,
) -> Result<(Vec<ExtractionRecord>, ExtractionReport), ExtractError> {
    let extractor = Extractor::from_options(options)?;

    let mut warnings = Vec::new();
    let documents = read_documents(inputs, &mut warnings);
    let records = extractor.extract_batch(&documents);

    let mut readable_count = 0;
    let mut extracted_count = 0;
    for (document, record) in documents.iter().zip(&records) {
        if document.text.trim().is_empty() {
            continue;
        }
        readable_count += 1;
        if record.is_empty() {
            warnings.push(
                ExtractWarning::new(
                    WarningCode::NoFieldsExtracted,
                    "no patient, test or diagnosis fields matched",
                )
                .with_file(&record.source),
            );
        } else {
            extracted_count += 1;
        }
    }

    let report = ExtractionReport {
        row_count: records.len(),
        readable_count,
        extracted_count,
        warnings,
    };
    Ok((records, report))
}

pub fn extract_files_to_csv(
    inputs: &[PathBuf],
    output_csv: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    validate_delimiter(options.delimiter)?;

    let (records, report) = extract_files(inputs, options)?;
    write_rows(output_csv, &flatten_all(&records), options.delimiter)?;

    tracing::debug!(
        output = %output_csv.display(),
        rows = report.row_count,
        "wrote flat rows"
    );
    Ok(report)
}

pub fn extract_files_to_json(
    inputs: &[PathBuf],
    output_json: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    let (records, report) = extract_files(inputs, options)?;
    let file = std::fs::File::create(output_json)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records)?;
    Ok(report)
}

/// Scores a predicted CSV against a ground-truth CSV, both in the flat-row
/// layout.
pub fn score_csv_files(
    predicted_csv: &Path,
    truth_csv: &Path,
    options: &ScoreOptions,
) -> Result<AccuracyReport, ExtractError> {
    validate_delimiter(options.delimiter)?;

    let fields = options.fields.as_slice();
    let predicted = read_rows(predicted_csv, "predicted", options.delimiter, fields)?;
    let truth = read_rows(truth_csv, "ground truth", options.delimiter, fields)?;

    let report = score(&predicted, &truth, fields);
    if report.unmatched_rows > 0 {
        tracing::warn!(
            unmatched = report.unmatched_rows,
            "ground-truth rows without a matching prediction were skipped"
        );
    }
    Ok(report)
}
