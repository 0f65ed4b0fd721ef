//! Query string normalization.
//!
//! Replaces variable literal content in a captured query body with stable
//! placeholders so that structurally identical queries compare equal.

use grep_matcher::Matcher;
use grep_regex::RegexMatcher;
use thiserror::Error;

/// `$in` operator with a bracketed value list.
pub const IN_LIST_PATTERN: &str = r"\$in: \[[^\]]+\]";
pub const IN_LIST_PLACEHOLDER: &[u8] = b"$in: [...]";

/// 24-hex-digit object identifier literal.
pub const OBJECT_ID_PATTERN: &str = r"ObjectId\('[0-9a-f]{24}'\)";
pub const OBJECT_ID_PLACEHOLDER: &[u8] = b"ObjectId(...)";

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Invalid normalization pattern: {0}")]
    InvalidPattern(String),

    #[error("Substitution failed: {0}")]
    Substitution(String),

    #[error("Normalized query is not valid UTF-8")]
    NonUtf8,
}

pub struct Normalizer {
    rules: Vec<(RegexMatcher, &'static [u8])>,
}

impl Normalizer {
    pub fn new() -> Result<Self, NormalizeError> {
        let rules = [
            (IN_LIST_PATTERN, IN_LIST_PLACEHOLDER),
            (OBJECT_ID_PATTERN, OBJECT_ID_PLACEHOLDER),
        ]
        .into_iter()
        .map(|(pattern, placeholder)| {
            RegexMatcher::new(pattern)
                .map(|matcher| (matcher, placeholder))
                .map_err(|e| NormalizeError::InvalidPattern(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// Apply every rule in order, replacing all occurrences.
    pub fn normalize(&self, query: &str) -> Result<String, NormalizeError> {
        let mut current = query.as_bytes().to_vec();

        for (matcher, placeholder) in &self.rules {
            let mut replaced = Vec::with_capacity(current.len());
            matcher
                .replace(&current, &mut replaced, |_, dst| {
                    dst.extend_from_slice(placeholder);
                    true
                })
                .map_err(|e| NormalizeError::Substitution(e.to_string()))?;
            current = replaced;
        }

        String::from_utf8(current).map_err(|_| NormalizeError::NonUtf8)
    }
}
