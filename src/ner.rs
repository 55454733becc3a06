//! Entity-recognition seam used by the diagnosis extractor.
//!
//! The extractor only reads entities labeled [`DISEASE_LABEL`]. Any model can
//! be plugged in by implementing [`EntityRecognizer`]; plain closures work too.

use std::path::Path;

use aho_corasick::{AhoCorasick, MatchKind};

use crate::error::ExtractError;

pub const DISEASE_LABEL: &str = "DISEASE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<Entity>;
}

impl<F> EntityRecognizer for F
where
    F: Fn(&str) -> Vec<Entity> + Send + Sync,
{
    fn recognize(&self, text: &str) -> Vec<Entity> {
        self(text)
    }
}

/// Recognizer that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEntities;

impl EntityRecognizer for NoEntities {
    fn recognize(&self, _text: &str) -> Vec<Entity> {
        Vec::new()
    }
}

/// Dictionary recognizer over a disease lexicon.
///
/// Matching is ASCII case-insensitive and leftmost-longest, restricted to
/// whole words. Spans keep the casing found in the text.
pub struct LexiconRecognizer {
    automaton: AhoCorasick,
    term_count: usize,
}

impl LexiconRecognizer {
    pub fn new<I, S>(terms: I) -> Result<Self, ExtractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_string())
            .filter(|term| !term.is_empty())
            .collect::<Vec<_>>();
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&terms)?;

        Ok(Self {
            automaton,
            term_count: terms.len(),
        })
    }

    /// One term per line; blank lines and `#` comments are skipped.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let contents = std::fs::read_to_string(path)?;
        let recognizer = Self::new(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        )?;
        tracing::debug!(
            path = %path.display(),
            terms = recognizer.term_count,
            "loaded disease lexicon"
        );
        Ok(recognizer)
    }

    #[must_use]
    pub fn term_count(&self) -> usize {
        self.term_count
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn on_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.is_none_or(|ch| !is_word_char(ch)) && after.is_none_or(|ch| !is_word_char(ch))
}

impl EntityRecognizer for LexiconRecognizer {
    fn recognize(&self, text: &str) -> Vec<Entity> {
        self.automaton
            .find_iter(text)
            .filter(|found| on_word_boundaries(text, found.start(), found.end()))
            .map(|found| Entity {
                text: text[found.start()..found.end()].to_string(),
                label: DISEASE_LABEL.to_string(),
                start: found.start(),
                end: found.end(),
            })
            .collect()
    }
}
