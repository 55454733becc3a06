//! Field-level accuracy of predicted rows against labeled ground truth.

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::model::FlatRow;
use crate::options::{EvaluatedField, FieldKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAccuracy {
    pub field: EvaluatedField,
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub fields: Vec<FieldAccuracy>,
    /// Unweighted mean of the per-field accuracies.
    pub overall: f64,
    pub matched_rows: usize,
    /// Ground-truth rows skipped for lack of a prediction.
    pub unmatched_rows: usize,
}

impl AccuracyReport {
    #[must_use]
    pub fn accuracy(&self, field: EvaluatedField) -> Option<f64> {
        self.fields
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| entry.accuracy)
    }
}

impl Display for AccuracyReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for entry in &self.fields {
            writeln!(
                f,
                "{}: {:.2}% ({}/{})",
                entry.field,
                entry.accuracy * 100.0,
                entry.correct,
                entry.total
            )?;
        }
        write!(f, "Overall: {:.2}%", self.overall * 100.0)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    correct: usize,
    total: usize,
}

impl Tally {
    fn add(&mut self, field: EvaluatedField, predicted: &str, truth: &str) {
        match field.kind() {
            FieldKind::Scalar => {
                self.total += 1;
                if predicted.trim().to_lowercase() == truth.trim().to_lowercase() {
                    self.correct += 1;
                }
            }
            FieldKind::Set(delimiters) => {
                let predicted = token_set(predicted, delimiters);
                let truth = token_set(truth, delimiters);
                self.total += truth.len();
                self.correct += predicted.intersection(&truth).count();
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn ratio(self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

fn token_set(value: &str, delimiters: &[char]) -> HashSet<String> {
    value
        .split(delimiters)
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Scores `predicted` against `ground_truth` on the given fields.
///
/// Rows are paired by file name; the first predicted row for a file wins and
/// ground-truth rows without a prediction are left out. Absent values compare
/// as empty strings.
#[must_use]
pub fn score(
    predicted: &[FlatRow],
    ground_truth: &[FlatRow],
    fields: &[EvaluatedField],
) -> AccuracyReport {
    let mut by_file = HashMap::new();
    for row in predicted {
        by_file.entry(row.file.as_str()).or_insert(row);
    }

    let mut tallies = vec![Tally::default(); fields.len()];
    let mut matched_rows = 0;
    let mut unmatched_rows = 0;
    for truth in ground_truth {
        let Some(prediction) = by_file.get(truth.file.as_str()) else {
            tracing::debug!(file = %truth.file, "no prediction for ground-truth row");
            unmatched_rows += 1;
            continue;
        };
        matched_rows += 1;

        for (tally, &field) in tallies.iter_mut().zip(fields) {
            tally.add(
                field,
                field.value(prediction).unwrap_or_default(),
                field.value(truth).unwrap_or_default(),
            );
        }
    }

    let fields = fields
        .iter()
        .zip(tallies)
        .map(|(&field, tally)| FieldAccuracy {
            field,
            correct: tally.correct,
            total: tally.total,
            accuracy: tally.ratio(),
        })
        .collect::<Vec<_>>();

    #[allow(clippy::cast_precision_loss)]
    let overall = if fields.is_empty() {
        0.0
    } else {
        fields.iter().map(|entry| entry.accuracy).sum::<f64>() / fields.len() as f64
    };

    AccuracyReport {
        fields,
        overall,
        matched_rows,
        unmatched_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::score;
    use crate::model::FlatRow;
    use crate::options::{EvaluatedField, FieldSelection};

    fn row(file: &str, name: Option<&str>, tests: Option<&str>, diagnosis: Option<&str>) -> FlatRow {
        FlatRow {
            patient_name: name.map(str::to_string),
            tests: tests.map(str::to_string),
            diagnosis: diagnosis.map(str::to_string),
            ..FlatRow::new(file)
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn set_field_gives_token_level_partial_credit() {
        let predicted = [row("a", None, Some("flu; cold"), None)];
        let truth = [row("a", None, Some("flu; pneumonia"), None)];

        let report = score(&predicted, &truth, &[EvaluatedField::Tests]);
        assert_eq!(report.fields[0].correct, 1);
        assert_eq!(report.fields[0].total, 2);
        assert_close(report.fields[0].accuracy, 0.5);
    }

    #[test]
    fn diagnosis_accepts_comma_or_semicolon() {
        let predicted = [row("a", None, None, Some("flu, cold"))];
        let truth = [row("a", None, None, Some("Flu; Pneumonia"))];

        let report = score(&predicted, &truth, &[EvaluatedField::Diagnosis]);
        assert_close(report.fields[0].accuracy, 0.5);
    }

    #[test]
    fn scalar_field_ignores_case_and_outer_whitespace() {
        let predicted = [row("a", Some(" John Doe "), None, None)];
        let truth = [row("a", Some("john doe"), None, None)];

        let report = score(&predicted, &truth, &[EvaluatedField::PatientName]);
        assert_close(report.fields[0].accuracy, 1.0);
    }

    #[test]
    fn absent_values_compare_as_empty() {
        let predicted = [row("a", None, None, None)];
        let truth = [row("a", None, None, Some("asthma"))];

        let report = score(
            &predicted,
            &truth,
            &[EvaluatedField::PatientName, EvaluatedField::Diagnosis],
        );
        assert_close(report.fields[0].accuracy, 1.0);
        assert_close(report.fields[1].accuracy, 0.0);
    }

    #[test]
    fn unmatched_truth_rows_are_skipped_and_zero_total_scores_zero() {
        let predicted = [row("a", Some("x"), None, None)];
        let truth = [row("b", Some("y"), Some("mri: detected"), None)];

        let report = score(
            &predicted,
            &truth,
            &[EvaluatedField::PatientName, EvaluatedField::Tests],
        );
        assert_eq!(report.matched_rows, 0);
        assert_eq!(report.unmatched_rows, 1);
        assert_eq!(report.fields[0].total, 0);
        assert_close(report.fields[0].accuracy, 0.0);
        assert_close(report.overall, 0.0);
    }

    #[test]
    fn first_prediction_for_a_file_wins() {
        let predicted = [
            row("a", Some("Ann"), None, None),
            row("a", Some("Bob"), None, None),
        ];
        let truth = [row("a", Some("ann"), None, None)];

        let report = score(&predicted, &truth, &[EvaluatedField::PatientName]);
        assert_close(report.fields[0].accuracy, 1.0);
    }

    #[test]
    fn overall_is_unweighted_mean_over_three_fields() {
        let predicted = [
            row("a", Some("Ann"), Some("x: 1; y: 2"), Some("asthma")),
            row("b", Some("Bob"), Some("z: 3"), None),
        ];
        let truth = [
            row("a", Some("Ann"), Some("x: 1; y: 2; w: 4; v: 5"), Some("asthma")),
            row("b", Some("Rob"), Some("z: 3"), Some("gout")),
        ];

        let report = score(
            &predicted,
            &truth,
            &[
                EvaluatedField::PatientName,
                EvaluatedField::Tests,
                EvaluatedField::Diagnosis,
            ],
        );
        // name 1/2, tests 3/5, diagnosis 1/2
        assert_close(report.fields[0].accuracy, 0.5);
        assert_close(report.fields[1].accuracy, 0.6);
        assert_close(report.fields[2].accuracy, 0.5);
        assert_close(report.overall, (0.5 + 0.6 + 0.5) / 3.0);
    }

    #[test]
    fn overall_is_unweighted_mean_over_default_five_fields() {
        let predicted = [FlatRow {
            patient_name: Some("Ann".to_string()),
            age: Some("40".to_string()),
            gender: Some("Female".to_string()),
            tests: Some("MRI: Detected".to_string()),
            diagnosis: None,
            ..FlatRow::new("a")
        }];
        let truth = [FlatRow {
            patient_name: Some("ann".to_string()),
            age: Some("41".to_string()),
            gender: Some("female".to_string()),
            tests: Some("mri: detected; ecg: detected".to_string()),
            diagnosis: Some("asthma".to_string()),
            ..FlatRow::new("a")
        }];

        let report = score(&predicted, &truth, FieldSelection::default().as_slice());
        let expected = [1.0, 0.0, 1.0, 0.5, 0.0];
        for (entry, expected) in report.fields.iter().zip(expected) {
            assert_close(entry.accuracy, expected);
        }
        assert_close(report.overall, 2.5 / 5.0);
        assert_close(
            report.accuracy(EvaluatedField::Tests).expect("tests scored"),
            0.5,
        );
    }

    #[test]
    fn display_renders_percentages() {
        let predicted = [row("a", Some("Ann"), None, None)];
        let truth = [row("a", Some("Ann"), None, None)];
        let report = score(&predicted, &truth, &[EvaluatedField::PatientName]);
        assert_eq!(
            report.to_string(),
            "Patient Name: 100.00% (1/1)\nOverall: 100.00%"
        );
    }
}
