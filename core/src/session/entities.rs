//! Entity extraction from freeform session context (§4.6 step 4).
//!
//! An AST-based extractor would give more accurate identifier boundaries,
//! but regex-only extraction is an accepted equivalent per the spec this
//! was built against. [`SyntaxExtractor`] is left as a swappable
//! collaborator for callers that want the AST path; no default
//! implementation ships here.

use regex::Regex;
use std::sync::OnceLock;

/// Entities pulled out of a block of initial session context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedEntities {
    pub files: Vec<String>,
    pub features: Vec<String>,
}

/// Swappable collaborator for callers that want AST-accurate extraction
/// instead of the regex default. No implementation ships in this crate.
pub trait SyntaxExtractor: Send + Sync {
    fn extract(&self, text: &str) -> ExtractedEntities;
}

fn file_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b[\w./-]+\.(?:rs|ts|tsx|js|jsx|py|go|java|rb|md|toml|json|yaml|yml)\b")
            .expect("static pattern")
    })
}

fn concept_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[A-Z][a-z]+[A-Z][A-Za-z0-9]*\b").expect("static pattern"))
}

/// Regex-based entity extractor: filenames by extension, PascalCase
/// concepts (types, components) as feature candidates.
#[derive(Default)]
pub struct RegexEntityExtractor;

impl RegexEntityExtractor {
    #[must_use]
    pub fn extract(&self, text: &str) -> ExtractedEntities {
        let mut files: Vec<String> = file_pattern()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        files.sort();
        files.dedup();

        let mut features: Vec<String> = concept_pattern()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        features.sort();
        features.dedup();

        ExtractedEntities { files, features }
    }
}

impl SyntaxExtractor for RegexEntityExtractor {
    fn extract(&self, text: &str) -> ExtractedEntities {
        RegexEntityExtractor::extract(self, text)
    }
}
