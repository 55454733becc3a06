use crate::model::PatientInfo;
use crate::patterns::PATIENT_RULES;

/// Extracts name, age, gender and report date. Fields without a match stay
/// `None`.
#[must_use]
pub fn extract_patient_info(text: &str) -> PatientInfo {
    let mut info = PatientInfo::default();
    for rule in PATIENT_RULES.iter() {
        if info.is_set(rule.field) {
            continue;
        }
        if let Some(value) = rule.apply(text) {
            info.set(rule.field, value);
        }
    }
    info
}
