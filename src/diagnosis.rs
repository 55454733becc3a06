use crate::catalog::Vocabulary;
use crate::model::DiagnosisSet;
use crate::ner::{DISEASE_LABEL, EntityRecognizer};
use crate::section::DIAGNOSIS;

/// Extracts diagnosis labels from the diagnosis/observations section.
///
/// Recognizer spans labeled `DISEASE` come first, as found in the text, then
/// catalog terms in catalog order. Labels are deduplicated by exact string,
/// so "Diabetes" from the recognizer and "diabetes" from the catalog both
/// survive. Text without a diagnosis section yields an empty set.
#[must_use]
pub fn extract_diagnosis(
    text: &str,
    vocabulary: &Vocabulary,
    recognizer: &dyn EntityRecognizer,
) -> DiagnosisSet {
    let mut diagnoses = DiagnosisSet::new();
    let Some(section) = DIAGNOSIS.find(text) else {
        return diagnoses;
    };

    for entity in recognizer.recognize(section) {
        if entity.label == DISEASE_LABEL {
            diagnoses.insert(entity.text);
        }
    }
    let recognized = diagnoses.len();

    for term in vocabulary.scan(section) {
        diagnoses.insert(term);
    }

    tracing::debug!(
        recognized,
        total = diagnoses.len(),
        "extracted diagnoses"
    );
    diagnoses
}
