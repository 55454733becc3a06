use crate::catalog::Catalog;
use crate::diagnosis::extract_diagnosis;
use crate::error::ExtractError;
use crate::lab_tests::extract_tests;
use crate::model::{ExtractionRecord, RawDocument};
use crate::ner::{EntityRecognizer, LexiconRecognizer, NoEntities};
use crate::normalize::normalize;
use crate::options::ExtractOptions;
use crate::patient::extract_patient_info;

/// Runs every field extractor over a document and merges the results.
///
/// Holds no per-document state, so one extractor can serve many documents,
/// including from several threads.
pub struct Extractor {
    catalog: Catalog,
    recognizer: Box<dyn EntityRecognizer>,
}

impl Extractor {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            recognizer: Box::new(NoEntities),
        }
    }

    #[must_use]
    pub fn with_recognizer(mut self, recognizer: impl EntityRecognizer + 'static) -> Self {
        self.recognizer = Box::new(recognizer);
        self
    }

    /// Builds an extractor from the catalog and lexicon files named in `options`.
    pub fn from_options(options: &ExtractOptions) -> Result<Self, ExtractError> {
        let catalog = match &options.catalog {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::builtin(),
        };
        let extractor = Self::new(catalog);

        Ok(match &options.lexicon {
            Some(path) => extractor.with_recognizer(LexiconRecognizer::from_path(path)?),
            None => extractor,
        })
    }

    /// Normalizes the text once and runs all extractors on that same text.
    #[must_use]
    pub fn assemble(&self, document: &RawDocument) -> ExtractionRecord {
        let text = normalize(&document.text);
        let record = ExtractionRecord {
            source: document.source.clone(),
            patient: extract_patient_info(&text),
            tests: extract_tests(&text, &self.catalog.tests),
            diagnoses: extract_diagnosis(&text, &self.catalog.diagnoses, self.recognizer.as_ref()),
        };

        tracing::debug!(
            source = %record.source,
            tests = record.tests.len(),
            diagnoses = record.diagnoses.len(),
            "assembled record"
        );
        record
    }

    /// One record per document, in input order.
    #[must_use]
    pub fn extract_batch(&self, documents: &[RawDocument]) -> Vec<ExtractionRecord> {
        documents
            .iter()
            .map(|document| self.assemble(document))
            .collect()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}
