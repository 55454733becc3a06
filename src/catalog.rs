//! Versioned term catalogs for the vocabulary scans.
//!
//! A catalog maps each canonical term to optional synonyms. A hit on the
//! term or any synonym reports the canonical term.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::ExtractError;

pub const CATALOG_VERSION: u32 = 1;

const BUILTIN_CATALOG: &str = include_str!("../catalogs/default.json");

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_json(BUILTIN_CATALOG).expect("built-in catalog is valid")
});

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    version: u32,
    tests: Vec<TermSpec>,
    diagnoses: Vec<TermSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct TermSpec {
    term: String,
    #[serde(default)]
    synonyms: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CatalogTerm {
    pub canonical: String,
    pattern: Regex,
}

impl CatalogTerm {
    // A blank alternative would match at every word boundary.
    fn compile(list: &str, spec: TermSpec) -> Result<Self, ExtractError> {
        let canonical = spec.term.trim().to_string();
        let alternatives = std::iter::once(&spec.term)
            .chain(&spec.synonyms)
            .map(|term| {
                let term = term.trim();
                if term.is_empty() {
                    return Err(ExtractError::BlankCatalogTerm {
                        list: list.to_string(),
                        term: canonical.clone(),
                    });
                }
                Ok(regex::escape(term))
            })
            .collect::<Result<Vec<_>, _>>()?
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{alternatives})\b"))?;
        Ok(Self { canonical, pattern })
    }

    /// Whole-word, case-insensitive occurrence of the term or a synonym.
    #[must_use]
    pub fn occurs_in(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Term list in catalog order.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: Vec<CatalogTerm>,
}

impl Vocabulary {
    fn compile(list: &str, specs: Vec<TermSpec>) -> Result<Self, ExtractError> {
        let terms = specs
            .into_iter()
            .map(|spec| CatalogTerm::compile(list, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { terms })
    }

    /// Canonical names of every term found in `text`, in catalog order.
    pub fn scan<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.terms
            .iter()
            .filter(move |term| term.occurs_in(text))
            .map(|term| term.canonical.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub version: u32,
    pub tests: Vocabulary,
    pub diagnoses: Vocabulary,
}

impl Catalog {
    /// The catalog shipped with the crate.
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        if file.version != CATALOG_VERSION {
            return Err(ExtractError::UnsupportedCatalogVersion {
                found: file.version,
                expected: CATALOG_VERSION,
            });
        }

        Ok(Self {
            version: file.version,
            tests: Vocabulary::compile("tests", file.tests)?,
            diagnoses: Vocabulary::compile("diagnoses", file.diagnoses)?,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            tests = catalog.tests.len(),
            diagnoses = catalog.diagnoses.len(),
            "loaded term catalog"
        );
        Ok(catalog)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
