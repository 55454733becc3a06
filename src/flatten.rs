use crate::model::{ExtractionRecord, FlatRow, TestObservation};

pub const TEST_SEPARATOR: &str = "; ";
pub const DIAGNOSIS_SEPARATOR: &str = ", ";

fn present(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn joined(parts: Vec<String>, separator: &str) -> Option<String> {
    present(Some(parts.join(separator).as_str()))
}

#[must_use]
pub fn flatten(record: &ExtractionRecord) -> FlatRow {
    let patient = &record.patient;
    FlatRow {
        file: record.source.clone(),
        patient_name: present(patient.name.as_deref()),
        age: present(patient.age.as_deref()),
        gender: patient.gender.map(|gender| gender.as_str().to_string()),
        report_date: present(patient.report_date.as_deref()),
        tests: joined(
            record.tests.iter().map(TestObservation::combined).collect(),
            TEST_SEPARATOR,
        ),
        diagnosis: joined(
            record.diagnoses.iter().map(str::to_string).collect(),
            DIAGNOSIS_SEPARATOR,
        ),
    }
}

#[must_use]
pub fn flatten_all(records: &[ExtractionRecord]) -> Vec<FlatRow> {
    records.iter().map(flatten).collect()
}
