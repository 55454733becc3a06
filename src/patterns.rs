//! Declarative rule tables for field extraction.
//!
//! Each rule pairs a target field with a compiled pattern and a post-match
//! normalizer. Rules are evaluated in table order and the first rule that
//! yields a value for a field wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::PatientField;

pub(crate) struct FieldRule {
    pub field: PatientField,
    pub regex: Regex,
    pub normalize: fn(&str) -> Option<String>,
}

impl FieldRule {
    /// Runs the rule against `text`, normalizing capture group 1.
    pub fn apply(&self, text: &str) -> Option<String> {
        let captured = self.regex.captures(text)?.get(1)?;
        (self.normalize)(captured.as_str())
    }
}

fn rule(field: PatientField, pattern: &str, normalize: fn(&str) -> Option<String>) -> FieldRule {
    FieldRule {
        field,
        regex: Regex::new(pattern).expect("hardcoded patient-info regex is valid"),
        normalize,
    }
}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn full_gender(value: &str) -> Option<String> {
    match value.trim().to_ascii_uppercase().as_str() {
        "M" | "MALE" => Some("Male".to_string()),
        "F" | "FEMALE" => Some("Female".to_string()),
        _ => None,
    }
}

// The name terminator is a plain group: the regex crate has no look-ahead,
// and only group 1 is read.
pub(crate) static PATIENT_RULES: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        rule(
            PatientField::Name,
            r"(?i)(?:Patient Name|Name)[:\s]+([A-Za-z\s]+?)(?:\n|Age|$)",
            trimmed,
        ),
        rule(
            PatientField::Age,
            r"(?i)\bAge\b[:=\s]{0,8}(\d{1,3})(?:\s*(?:years?|yrs?|y/o|year-old))?",
            trimmed,
        ),
        rule(
            PatientField::Gender,
            r"(?i)(?:Gender|Sex)[:\s]*(Male|Female|M|F)\b",
            full_gender,
        ),
        rule(
            PatientField::ReportDate,
            r"(?i)(?:Report Date|Date)[:\s]*(\d{2}[/-]\d{2}[/-]\d{4})",
            trimmed,
        ),
    ]
});

/// `<label>: <value> [<unit>] [(reference)]` inside a test-results section.
pub(crate) static TEST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([A-Za-z\s()/\-]+?):\s*([\d.\-x^/]+|Normal|Abnormal|Positive|Negative)\s*([a-zA-Z/%^\-\x{00B5}]*)(?:\s*\([^)]+\))?",
    )
    .expect("hardcoded test-line regex is valid")
});
