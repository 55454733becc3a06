use std::sync::LazyLock;

use regex::Regex;

/// Locates a labeled span of text: the first start label, then everything up
/// to the nearest end marker or the end of the text.
pub(crate) struct SectionScanner {
    pattern: Regex,
}

impl SectionScanner {
    /// `start_labels` are matched literally. `end_markers` are regex
    /// fragments so a marker can require a following header word.
    fn new(start_labels: &[&str], end_markers: &[&str]) -> Self {
        let starts = start_labels
            .iter()
            .map(|label| regex::escape(label))
            .collect::<Vec<_>>()
            .join("|");
        let ends = end_markers.join("|");
        let pattern = Regex::new(&format!(r"(?is)(?:{starts})[:\s]*(.*?)(?:{ends}|$)"))
            .expect("hardcoded section regex is valid");
        Self { pattern }
    }

    /// Section body, or `None` when no start label occurs.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|body| body.as_str())
    }
}

pub(crate) static TEST_RESULTS: LazyLock<SectionScanner> = LazyLock::new(|| {
    SectionScanner::new(
        &["Test Results", "Laboratory Results"],
        &["Diagnosis", "Observations"],
    )
});

// "Patient" only closes the section as a header ("Patient Name", "Patient
// Details", ...); prose such as "Patient has ..." stays inside it.
pub(crate) static DIAGNOSIS: LazyLock<SectionScanner> = LazyLock::new(|| {
    SectionScanner::new(
        &[
            "Diagnosis/Observations",
            "Diagnosis",
            "Observations",
            "Impression",
        ],
        &[
            "Test Results",
            r"Patient\s*(?:Name|Information|Info|Details|ID)\b",
        ],
    )
});
