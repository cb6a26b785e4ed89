//! Merchant name extraction from the receipt header.

use crate::models::config::{ExtractionConfig, MerchantRules};

use super::LineExtractor;
use super::patterns::{NON_WORD, NUMERIC_LINE, contains_any};

/// Merchant name extractor.
#[derive(Debug, Clone)]
pub struct MerchantExtractor {
    rules: MerchantRules,
}

impl MerchantExtractor {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            rules: config.merchant.clone(),
        }
    }

    /// Pick the merchant name among the first lines of the receipt.
    ///
    /// A line naming a legal form ("SARL", "SAS", ...) wins over the first
    /// plausible line.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> Option<String> {
        let candidates: Vec<&str> = lines
            .iter()
            .map(|l| l.as_ref().trim())
            .filter(|l| !l.is_empty())
            .take(self.rules.max_lines)
            .filter(|l| self.is_candidate(l))
            .collect();

        candidates
            .iter()
            .find(|l| self.has_company_form(l))
            .or_else(|| candidates.first())
            .map(|l| l.to_string())
    }

    fn is_candidate(&self, line: &str) -> bool {
        if line.chars().count() < self.rules.min_length || NUMERIC_LINE.is_match(line) {
            return false;
        }

        let lower = line.to_lowercase();
        !contains_any(&lower, &self.rules.skip_keywords)
            && !self.rules.skip_prefixes.iter().any(|p| lower.starts_with(p.as_str()))
    }

    fn has_company_form(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        NON_WORD
            .split(&lower)
            .any(|word| self.rules.company_forms.iter().any(|form| form == word))
    }
}

impl Default for MerchantExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineExtractor for MerchantExtractor {
    type Output = Option<String>;

    fn extract_lines<S: AsRef<str>>(&self, lines: &[S]) -> Self::Output {
        self.extract(lines)
    }
}

/// Find the merchant name with the default rules.
pub fn extract_merchant<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    MerchantExtractor::new().extract(lines)
}
