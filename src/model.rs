use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub source: String,
    pub text: String,
}

impl RawDocument {
    #[must_use]
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Self::Male),
            "f" | "female" => Ok(Self::Female),
            other => Err(format!("unrecognized gender '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientField {
    Name,
    Age,
    Gender,
    ReportDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatientInfo {
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<Gender>,
    pub report_date: Option<String>,
}

impl PatientInfo {
    #[must_use]
    pub fn is_set(&self, field: PatientField) -> bool {
        match field {
            PatientField::Name => self.name.is_some(),
            PatientField::Age => self.age.is_some(),
            PatientField::Gender => self.gender.is_some(),
            PatientField::ReportDate => self.report_date.is_some(),
        }
    }

    pub fn set(&mut self, field: PatientField, value: String) {
        match field {
            PatientField::Name => self.name = Some(value),
            PatientField::Age => self.age = Some(value),
            PatientField::Gender => self.gender = value.parse().ok(),
            PatientField::ReportDate => self.report_date = Some(value),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.report_date.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestObservation {
    pub name: String,
    pub value: String,
    pub unit: String,
}

impl TestObservation {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: unit.into(),
        }
    }

    /// Renders `"{name}: {value} {unit}"`, trimmed so an empty unit leaves no
    /// trailing space.
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}: {} {}", self.name, self.value, self.unit)
            .trim()
            .to_string()
    }
}

/// Diagnosis labels in first-seen order, deduplicated by exact string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagnosisSet {
    labels: Vec<String>,
}

impl DiagnosisSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the exact label is already present.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.labels.push(label);
        true
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|existing| existing == label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DiagnosisSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionRecord {
    pub source: String,
    pub patient: PatientInfo,
    pub tests: Vec<TestObservation>,
    pub diagnoses: DiagnosisSet,
}

impl ExtractionRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patient.is_empty() && self.tests.is_empty() && self.diagnoses.is_empty()
    }
}

/// Flat, string-joined projection of an [`ExtractionRecord`].
///
/// `None` marks a value that is not present; a present value is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    pub file: String,
    pub patient_name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub report_date: Option<String>,
    pub tests: Option<String>,
    pub diagnosis: Option<String>,
}

impl FlatRow {
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Cells in [`crate::FLAT_ROW_HEADERS`] order, with absent values as empty cells.
    #[must_use]
    pub fn to_record(&self) -> [&str; 7] {
        [
            self.file.as_str(),
            self.patient_name.as_deref().unwrap_or_default(),
            self.age.as_deref().unwrap_or_default(),
            self.gender.as_deref().unwrap_or_default(),
            self.report_date.as_deref().unwrap_or_default(),
            self.tests.as_deref().unwrap_or_default(),
            self.diagnosis.as_deref().unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosisSet, Gender, PatientField, PatientInfo, TestObservation};

    #[test]
    fn gender_parses_short_and_long_forms() {
        assert_eq!("M".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("female".parse::<Gender>(), Ok(Gender::Female));
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[test]
    fn combined_test_text_drops_empty_unit() {
        assert_eq!(TestObservation::new("MRI", "Detected", "").combined(), "MRI: Detected");
        assert_eq!(
            TestObservation::new("Hemoglobin", "13.5", "g/dL").combined(),
            "Hemoglobin: 13.5 g/dL"
        );
    }

    #[test]
    fn diagnosis_set_dedups_exact_strings_only() {
        let set = ["diabetes", "Diabetes", "diabetes"]
            .into_iter()
            .collect::<DiagnosisSet>();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["diabetes", "Diabetes"]);
    }

    #[test]
    fn patient_info_set_ignores_unparseable_gender() {
        let mut info = PatientInfo::default();
        info.set(PatientField::Gender, "X".to_string());
        assert!(!info.is_set(PatientField::Gender));
        info.set(PatientField::Age, "45".to_string());
        assert_eq!(info.age.as_deref(), Some("45"));
    }
}
