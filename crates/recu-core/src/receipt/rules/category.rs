//! Expense categorization by keyword.

use lazy_static::lazy_static;

use crate::error::ConfigError;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::ExpenseCategory;

use super::patterns::WordMatcher;

lazy_static! {
    static ref DEFAULT_CATEGORIZER: Categorizer =
        Categorizer::from_config(&ExtractionConfig::default()).unwrap();
}

/// Keyword-based expense categorizer.
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<(ExpenseCategory, WordMatcher)>,
}

impl Categorizer {
    /// Categorizer with the default keyword tables.
    pub fn new() -> Self {
        DEFAULT_CATEGORIZER.clone()
    }

    /// Compile the configured category keyword tables.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let rules = config
            .categories
            .iter()
            .map(|rule| {
                let field = format!("categories.{}", rule.category);
                Ok((rule.category, WordMatcher::new(&field, &rule.keywords)?))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { rules })
    }

    /// First category whose keywords appear in the receipt or the merchant name.
    pub fn categorize<S: AsRef<str>>(&self, lines: &[S], merchant: Option<&str>) -> ExpenseCategory {
        let text = lines
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        let merchant = merchant.unwrap_or_default();

        self.rules
            .iter()
            .find(|(_, words)| words.is_match(&text) || words.is_match(merchant))
            .map_or(ExpenseCategory::Other, |(category, _)| *category)
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Categorize a receipt with the default keyword tables.
pub fn categorize<S: AsRef<str>>(lines: &[S], merchant: Option<&str>) -> ExpenseCategory {
    DEFAULT_CATEGORIZER.categorize(lines, merchant)
}
