use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::model::FlatRow;

/// How a field is compared during scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Set(&'static [char]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EvaluatedField {
    #[serde(rename = "Patient Name")]
    PatientName,
    #[serde(rename = "Age")]
    Age,
    #[serde(rename = "Gender")]
    Gender,
    #[serde(rename = "Report Date")]
    ReportDate,
    #[serde(rename = "Tests")]
    Tests,
    #[serde(rename = "Diagnosis")]
    Diagnosis,
}

impl EvaluatedField {
    pub const ALL: [Self; 6] = [
        Self::PatientName,
        Self::Age,
        Self::Gender,
        Self::ReportDate,
        Self::Tests,
        Self::Diagnosis,
    ];

    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::PatientName => "Patient Name",
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::ReportDate => "Report Date",
            Self::Tests => "Tests",
            Self::Diagnosis => "Diagnosis",
        }
    }

    // Diagnosis also splits on ';' so ground truth labeled with either
    // delimiter scores the same.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Tests => FieldKind::Set(&[';']),
            Self::Diagnosis => FieldKind::Set(&[',', ';']),
            Self::PatientName | Self::Age | Self::Gender | Self::ReportDate => FieldKind::Scalar,
        }
    }

    #[must_use]
    pub fn value(self, row: &FlatRow) -> Option<&str> {
        match self {
            Self::PatientName => row.patient_name.as_deref(),
            Self::Age => row.age.as_deref(),
            Self::Gender => row.gender.as_deref(),
            Self::ReportDate => row.report_date.as_deref(),
            Self::Tests => row.tests.as_deref(),
            Self::Diagnosis => row.diagnosis.as_deref(),
        }
    }

    pub fn value_mut(self, row: &mut FlatRow) -> &mut Option<String> {
        match self {
            Self::PatientName => &mut row.patient_name,
            Self::Age => &mut row.age,
            Self::Gender => &mut row.gender,
            Self::ReportDate => &mut row.report_date,
            Self::Tests => &mut row.tests,
            Self::Diagnosis => &mut row.diagnosis,
        }
    }
}

impl Display for EvaluatedField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for EvaluatedField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ");
        match normalized.as_str() {
            "patient name" | "name" => Ok(Self::PatientName),
            "age" => Ok(Self::Age),
            "gender" | "sex" => Ok(Self::Gender),
            "report date" | "date" => Ok(Self::ReportDate),
            "tests" | "test" => Ok(Self::Tests),
            "diagnosis" | "diagnoses" => Ok(Self::Diagnosis),
            _ => Err(format!("unknown field '{}'", value.trim())),
        }
    }
}

/// Ordered, duplicate-free list of fields to score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    fields: Vec<EvaluatedField>,
}

impl FieldSelection {
    #[must_use]
    pub fn as_slice(&self) -> &[EvaluatedField] {
        &self.fields
    }
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            fields: vec![
                EvaluatedField::PatientName,
                EvaluatedField::Age,
                EvaluatedField::Gender,
                EvaluatedField::Tests,
                EvaluatedField::Diagnosis,
            ],
        }
    }
}

impl FromStr for FieldSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut fields = Vec::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let field = token.parse::<EvaluatedField>()?;
            if !fields.contains(&field) {
                fields.push(field);
            }
        }

        if fields.is_empty() {
            return Err("field selection cannot be empty".to_string());
        }

        Ok(Self { fields })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub catalog: Option<PathBuf>,
    pub lexicon: Option<PathBuf>,
    pub delimiter: u8,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            catalog: None,
            lexicon: None,
            delimiter: b',',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreOptions {
    pub fields: FieldSelection,
    pub delimiter: u8,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            fields: FieldSelection::default(),
            delimiter: b',',
        }
    }
}
