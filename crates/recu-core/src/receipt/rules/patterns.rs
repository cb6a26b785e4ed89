//! Common regex patterns and keyword matchers for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ConfigError;

lazy_static! {
    // Amount tokens: 123,45 | 123.45 | 1 234,56 | 1.234,56 | 1234.56
    pub static ref PRICE_PATTERN: Regex = Regex::new(
        r"\b\d{1,3}(?:[\s.]\d{3})*(?:[.,]\d{2})?\b|\b\d+[.,]\d{2}\b"
    ).unwrap();

    // Dates, day first (French order)
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{2})[/-](\d{2})[/-](\d{4})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[/-](\d{2})[/-](\d{2})\b"
    ).unwrap();

    // Lines made only of digits, separators and currency signs
    pub static ref NUMERIC_LINE: Regex = Regex::new(
        r"^[\d\s./+:,€$-]+$"
    ).unwrap();

    pub static ref NON_WORD: Regex = Regex::new(r"\W+").unwrap();
}

/// Lowercase a line and collapse every run of whitespace to a single space.
pub fn normalize_line(line: &str) -> String {
    line.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether any keyword occurs as a substring of `text`.
pub fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

/// Case-insensitive matcher for a list of whole words or phrases.
#[derive(Debug, Clone)]
pub struct WordMatcher {
    regex: Option<Regex>,
}

impl WordMatcher {
    /// Compile `words` into a single word-bounded alternation.
    ///
    /// An empty list yields a matcher that never matches.
    pub fn new(field: &str, words: &[String]) -> Result<Self, ConfigError> {
        let alternatives: Vec<String> = words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { regex: None });
        }

        let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
        let regex = Regex::new(&pattern).map_err(|e| ConfigError::Keywords {
            field: field.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { regex: Some(regex) })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(text))
    }
}
