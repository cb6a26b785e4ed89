//! Total amount (TTC) extraction.
//!
//! Every numeric token of the receipt is a candidate unless its line is
//! blacklisted. Candidates are scored from the keywords on their line and
//! their position in the document, and the best one wins.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, trace};

use crate::models::config::{ExtractionConfig, TotalRules};
use crate::models::receipt::AmountExtraction;

use super::LineExtractor;
use super::number::normalize_localized_number;
use super::patterns::{PRICE_PATTERN, contains_any, normalize_line};

/// A numeric token considered as the receipt total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountCandidate {
    /// Parsed value.
    pub value: Decimal,
    /// Index of the source line.
    pub line_index: usize,
    /// Heuristic score, higher is more likely the total.
    pub score: i32,
    /// Token as matched in the source line.
    pub raw: String,
    /// Normalized source line.
    pub context: String,
}

/// Total amount extractor.
#[derive(Debug, Clone)]
pub struct TotalAmountExtractor {
    rules: TotalRules,
    currency: String,
    debug: bool,
}

impl TotalAmountExtractor {
    /// Create an extractor with the default rules.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create an extractor from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            rules: config.total.clone(),
            currency: config.default_currency.clone(),
            debug: false,
        }
    }

    /// Log skipped lines and the best candidates. Never changes the result.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// All surviving candidates, best first.
    pub fn candidates<S: AsRef<str>>(&self, lines: &[S]) -> Vec<AmountCandidate> {
        let mut candidates = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let context = normalize_line(line);
            if context.is_empty() {
                continue;
            }

            if let Some(reason) = self.skip_reason(&context) {
                if self.debug {
                    debug!("Line {} ignored ({}): {}", index, reason, context);
                }
                continue;
            }

            for token in PRICE_PATTERN.find_iter(line) {
                let Some(value) = normalize_localized_number(token.as_str()) else {
                    continue;
                };
                if !self.is_plausible(value) {
                    trace!("Line {}: implausible amount {}", index, value);
                    continue;
                }

                candidates.push(AmountCandidate {
                    value,
                    line_index: index,
                    score: self.score(&context, index, lines.len()),
                    raw: token.as_str().to_string(),
                    context: context.clone(),
                });
            }
        }

        candidates.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| b.value.cmp(&a.value)));
        candidates
    }

    /// Find the total amount due.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> AmountExtraction {
        let candidates = self.candidates(lines);

        if self.debug {
            for candidate in candidates.iter().take(5) {
                debug!(
                    "Candidate {} (score {}, line {}): {}",
                    candidate.value, candidate.score, candidate.line_index, candidate.context
                );
            }
        }

        AmountExtraction {
            amount: candidates.first().map(|c| c.value),
            currency: self.currency.clone(),
        }
    }

    fn skip_reason(&self, context: &str) -> Option<&'static str> {
        if contains_any(context, &self.rules.hard_blacklist) {
            return Some("hard blacklist");
        }

        let has_total_keyword = contains_any(context, &self.rules.total_keywords);
        if !has_total_keyword && contains_any(context, &self.rules.soft_blacklist) {
            return Some("soft blacklist");
        }
        if !has_total_keyword && contains_any(context, &self.rules.tax_keywords) {
            return Some("tax line");
        }

        None
    }

    fn is_plausible(&self, value: Decimal) -> bool {
        if value.is_zero() || value > self.rules.max_amount {
            return false;
        }

        let looks_like_year = value.fract().is_zero()
            && value >= Decimal::from(self.rules.year_min)
            && value <= Decimal::from(self.rules.year_max);
        !looks_like_year
    }

    fn score(&self, context: &str, index: usize, line_count: usize) -> i32 {
        let tier = self
            .rules
            .keyword_tiers
            .iter()
            .find(|tier| contains_any(context, &tier.keywords))
            .map_or(0, |tier| tier.weight);

        let modifiers: i32 = self
            .rules
            .modifiers
            .iter()
            .filter(|m| contains_any(context, &m.keywords))
            .map(|m| m.weight)
            .sum();

        let position = index as f64 / line_count as f64;
        let placement: i32 = self
            .rules
            .position_bonuses
            .iter()
            .filter(|b| position > b.after)
            .map(|b| b.weight)
            .sum();

        tier + modifiers + placement
    }
}

impl Default for TotalAmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineExtractor for TotalAmountExtractor {
    type Output = AmountExtraction;

    fn extract_lines<S: AsRef<str>>(&self, lines: &[S]) -> Self::Output {
        self.extract(lines)
    }
}

/// Find the total amount due with the default rules.
pub fn extract_total_amount<S: AsRef<str>>(lines: &[S], debug: bool) -> AmountExtraction {
    TotalAmountExtractor::new().with_debug(debug).extract(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::KeywordWeight;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn nova_invoice() -> Vec<&'static str> {
        vec![
            "NOVA Receipt Services",
            "SIRET: 123 456 789 00012",
            "TVA Intracom: FR12 123456789",
            "FACTURE N°: NR-2025-00127",
            "Date: 29/12/2025",
            "Détail des prestations",
            "Abonnement 29,00 €",
            "Traitement 15,00 €",
            "Sous-total HT : 143,00 €",
            "TVA (20%): 28,60 €",
            "Total TTC: 171,60 €",
            "IBAN : FR76 3000 6000 0112 3456 7890 189",
        ]
    }

    #[test]
    fn test_invoice_with_iban_and_siret() {
        let result = extract_total_amount(&nova_invoice(), true);
        assert_eq!(result.amount, Some(dec("171.60")));
        assert_eq!(result.currency, "EUR");
    }

    #[test]
    fn test_ht_tva_ttc_breakdown() {
        let lines = ["Total HT   100.00", "TVA 20%     20.00", "Total TTC  120.00"];
        assert_eq!(extract_total_amount(&lines, false).amount, Some(dec("120.00")));
    }

    #[test]
    fn test_simple_ticket() {
        let lines = [
            "Supermarché",
            "Article 1   10.00",
            "Article 2    2.30",
            "TOTAL       12,30€",
            "Merci de votre visite",
        ];
        assert_eq!(extract_total_amount(&lines, false).amount, Some(dec("12.30")));
    }

    #[test]
    fn test_total_with_currency_code() {
        let lines = ["TOTAL: 45,00 EUR"];
        assert_eq!(extract_total_amount(&lines, false).amount, Some(dec("45.00")));
    }

    #[test]
    fn test_ignores_years() {
        let lines = ["Date 2025", "Total 50.00"];
        assert_eq!(extract_total_amount(&lines, false).amount, Some(dec("50.00")));
    }

    #[test]
    fn test_ignores_space_grouped_years() {
        let extractor = TotalAmountExtractor::new();
        let candidates = extractor.candidates(&["Exercice 2 024", "Total 50.00"]);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, dec("50.00"));
    }

    #[test]
    fn test_prioritizes_total_over_larger_numbers() {
        let lines = ["Ref: 999999", "Total à payer: 50.00"];
        assert_eq!(extract_total_amount(&lines, false).amount, Some(dec("50.00")));
    }

    #[test]
    fn test_reference_line_kept_when_it_carries_the_total() {
        let lines = ["Facture n° 12 - Total à payer 80,00 €", "Article 95,00"];
        assert_eq!(extract_total_amount(&lines, false).amount, Some(dec("80.00")));
    }

    #[test]
    fn test_hard_blacklist_excludes_administrative_lines() {
        let lines = ["Article 10,00", "Fax: 999,99 €"];
        assert_eq!(extract_total_amount(&lines, false).amount, Some(dec("10.00")));

        let mut config = ExtractionConfig::default();
        config.total.hard_blacklist.clear();
        let unfiltered = TotalAmountExtractor::from_config(&config).extract(&lines);
        assert_eq!(unfiltered.amount, Some(dec("999.99")));
    }

    #[test]
    fn test_soft_blacklist_excludes_reference_lines() {
        let lines = ["Article 10,00", "Référence 999,99 €"];
        assert_eq!(extract_total_amount(&lines, false).amount, Some(dec("10.00")));

        let mut config = ExtractionConfig::default();
        config.total.soft_blacklist.clear();
        let unfiltered = TotalAmountExtractor::from_config(&config).extract(&lines);
        assert_eq!(unfiltered.amount, Some(dec("999.99")));
    }

    #[test]
    fn test_tax_lines_excluded_without_total_keyword() {
        assert_eq!(extract_total_amount(&["TVA 20% 4,00"], false).amount, None);
        assert_eq!(
            extract_total_amount(&["Total TVA 4,00"], false).amount,
            Some(dec("4.00"))
        );

        let mut config = ExtractionConfig::default();
        config.total.tax_keywords.clear();
        let unfiltered = TotalAmountExtractor::from_config(&config).extract(&["TVA 20% 4,00"]);
        assert_eq!(unfiltered.amount, Some(dec("20")));
    }

    #[test]
    fn test_penalizes_deposit_and_discount_lines() {
        let lines = ["Acompte versé 300,00", "Remise 10,00", "Montant total 250,00"];
        assert_eq!(extract_total_amount(&lines, false).amount, Some(dec("250.00")));
    }

    #[test]
    fn test_rejects_zero_and_huge_values() {
        let lines = ["Total 0,00", "Total 250 000,00"];
        assert_eq!(extract_total_amount(&lines, false).amount, None);
    }

    #[test]
    fn test_empty_input() {
        let lines: [&str; 0] = [];
        let result = extract_total_amount(&lines, false);
        assert_eq!(result.amount, None);
        assert_eq!(result.currency, "EUR");
    }

    #[test]
    fn test_tie_prefers_larger_value() {
        let candidates = TotalAmountExtractor::new().candidates(&["12,00 34,00"]);
        assert_eq!(candidates[0].value, dec("34.00"));
        assert_eq!(candidates[0].score, candidates[1].score);
    }

    #[test]
    fn test_candidate_details() {
        let candidates = TotalAmountExtractor::new().candidates(&nova_invoice());
        let best = &candidates[0];

        assert_eq!(best.line_index, 10);
        assert_eq!(best.raw, "171,60");
        assert_eq!(best.context, "total ttc: 171,60 €");
        // tier 5 + ttc 3 + currency 2 + position 2
        assert_eq!(best.score, 12);
    }

    #[test]
    fn test_debug_and_repeat_calls_agree() {
        let lines = nova_invoice();
        let quiet = extract_total_amount(&lines, false);

        assert_eq!(extract_total_amount(&lines, true), quiet);
        assert_eq!(extract_total_amount(&lines, false), quiet);
    }

    #[test]
    fn test_custom_weights() {
        let mut config = ExtractionConfig::default();
        config.default_currency = "CHF".to_string();
        config.total.modifiers.push(KeywordWeight::new(&["solde"], 20));

        let extractor = TotalAmountExtractor::from_config(&config);
        let result = extractor.extract(&["Solde 40,00", "Total TTC 90,00"]);

        assert_eq!(result.amount, Some(dec("40.00")));
        assert_eq!(result.currency, "CHF");
    }
}
