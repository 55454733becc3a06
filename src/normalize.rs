use std::sync::LazyLock;

use regex::Regex;

static NEWLINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("hardcoded newline regex is valid"));
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("hardcoded whitespace regex is valid"));

/// Collapses report text into a single trimmed line.
///
/// Newline runs become one space, then any remaining whitespace run of two
/// or more characters becomes one space. Empty input stays empty.
#[must_use]
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let single_line = NEWLINE_RUNS.replace_all(raw, " ");
    let collapsed = WHITESPACE_RUNS.replace_all(&single_line, " ");
    collapsed.trim().to_string()
}
