//! VAT (TVA) amount extraction.
//!
//! Explicit VAT lines are summed, one value per line. When a receipt has no
//! usable VAT line, the VAT is derived from the known total and the net
//! amount (HT).

use lazy_static::lazy_static;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::models::config::ExtractionConfig;

use super::number::normalize_localized_number;
use super::patterns::{PRICE_PATTERN, WordMatcher, contains_any, normalize_line};

lazy_static! {
    static ref DEFAULT_EXTRACTOR: VatExtractor =
        VatExtractor::from_config(&ExtractionConfig::default()).unwrap();
}

/// VAT amount extractor.
#[derive(Debug, Clone)]
pub struct VatExtractor {
    blacklist: Vec<String>,
    vat_words: WordMatcher,
    ht_words: WordMatcher,
    ht_phrases: Vec<String>,
    total_tolerance: Decimal,
    debug: bool,
}

impl VatExtractor {
    /// Create an extractor with the default rules.
    pub fn new() -> Self {
        DEFAULT_EXTRACTOR.clone()
    }

    /// Create an extractor from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let rules = &config.vat;

        Ok(Self {
            blacklist: rules.blacklist.clone(),
            vat_words: WordMatcher::new("vat.vat_keywords", &rules.vat_keywords)?,
            ht_words: WordMatcher::new("vat.ht_keywords", &rules.ht_keywords)?,
            ht_phrases: rules.ht_phrases.clone(),
            total_tolerance: rules.total_tolerance,
            debug: false,
        })
    }

    /// Log rejected values and the fallback path. Never changes the result.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Find the VAT amount. `known_total` bounds every accepted value.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S], known_total: Option<Decimal>) -> Option<Decimal> {
        let total = known_total.filter(|t| !t.is_zero());

        if self.debug {
            debug!("VAT extraction on {} lines, known total: {:?}", lines.len(), total);
        }

        // None once the sum no longer fits in a Decimal
        let mut vat_sum = Some(Decimal::ZERO);
        let mut vat_lines = 0usize;

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let context = normalize_line(line);
            if context.is_empty() {
                continue;
            }

            if contains_any(&context, &self.blacklist) {
                if self.debug {
                    debug!("Line {} ignored (blacklist): {}", index, context);
                }
                continue;
            }

            if !self.vat_words.is_match(&context) {
                continue;
            }

            let mut values = self.vat_values(line, total);

            // Label and value split over two lines
            if values.is_empty() {
                if let Some(next) = lines.get(index + 1).map(|l| l.as_ref()) {
                    values = self.vat_values(next, total);
                    if self.debug && !values.is_empty() {
                        debug!(
                            "VAT keyword on line {} without a value, using line {}: {}",
                            index,
                            index + 1,
                            next
                        );
                    }
                }
            }

            // A line listing a base and its tax: the tax is the smaller figure
            if let Some(vat) = values.into_iter().min() {
                if self.debug {
                    debug!("VAT line {}: {} -> {}", index, context, vat);
                }
                vat_sum = vat_sum.and_then(|sum| sum.checked_add(vat));
                vat_lines += 1;
            }
        }

        if vat_lines > 0 {
            match vat_sum {
                Some(sum) if total.is_none_or(|total| sum <= total) => {
                    return Some(round_cents(sum));
                }
                Some(sum) if self.debug => {
                    debug!("VAT sum {} over {} lines exceeds the total, rejected", sum, vat_lines);
                }
                None if self.debug => {
                    debug!("VAT sum over {} lines overflows, rejected", vat_lines);
                }
                _ => {}
            }
        }

        if self.debug {
            debug!("No usable VAT line found, trying total minus net amount");
        }

        let vat = total.and_then(|total| {
            let net = self.extract_ht(lines, total)?;
            let vat = total - net;
            (vat > Decimal::ZERO && vat < total).then(|| {
                if self.debug {
                    debug!("VAT computed from total {} - net {} = {}", total, net, vat);
                }
                round_cents(vat)
            })
        });

        if vat.is_none() && self.debug {
            debug!("VAT not found");
            for (index, line) in lines.iter().enumerate() {
                if self.vat_words.is_match(line.as_ref()) {
                    debug!("VAT context line {}: {}", index, line.as_ref());
                }
            }
        }

        vat
    }

    /// Values on `line` that can be a VAT amount.
    fn vat_values(&self, line: &str, total: Option<Decimal>) -> Vec<Decimal> {
        PRICE_PATTERN
            .find_iter(line)
            .filter_map(|token| {
                let raw = token.as_str();
                let value = normalize_localized_number(raw)?;
                if value.is_zero() {
                    return None;
                }

                if is_percentage(line, raw) {
                    if self.debug {
                        debug!("Ignored percentage {} on line: {}", value, line);
                    }
                    return None;
                }

                if let Some(total) = total {
                    let restates_total = value
                        .checked_sub(total)
                        .is_some_and(|diff| diff.abs() < self.total_tolerance);
                    if restates_total {
                        if self.debug {
                            debug!("Ignored value equal to the total: {}", value);
                        }
                        return None;
                    }
                    if value > total {
                        if self.debug {
                            debug!("Ignored value above the total: {}", value);
                        }
                        return None;
                    }
                }

                Some(value)
            })
            .collect()
    }

    /// Largest net amount (HT) below `total` found on a net amount line.
    fn extract_ht<S: AsRef<str>>(&self, lines: &[S], total: Decimal) -> Option<Decimal> {
        let mut best: Option<Decimal> = None;

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let context = normalize_line(line);

            if !self.ht_words.is_match(&context) && !contains_any(&context, &self.ht_phrases) {
                continue;
            }

            let mut tokens: Vec<&str> = PRICE_PATTERN.find_iter(line).map(|m| m.as_str()).collect();
            if tokens.is_empty() {
                if let Some(next) = lines.get(index + 1).map(|l| l.as_ref()) {
                    tokens = PRICE_PATTERN.find_iter(next).map(|m| m.as_str()).collect();
                }
            }

            for value in tokens.into_iter().filter_map(normalize_localized_number) {
                if value >= total {
                    continue;
                }
                trace!("Net amount candidate on line {}: {}", index, value);
                if best.is_none_or(|b| value > b) {
                    best = Some(value);
                }
            }
        }

        best.filter(|v| *v > Decimal::ZERO)
    }
}

impl Default for VatExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `raw` occurs in `line` directly followed by a percent sign.
fn is_percentage(line: &str, raw: &str) -> bool {
    line.char_indices().any(|(start, _)| {
        line[start..].starts_with(raw) && line[start + raw.len()..].trim_start().starts_with('%')
    })
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Find the VAT amount with the default rules.
pub fn extract_vat<S: AsRef<str>>(
    lines: &[S],
    known_total: Option<Decimal>,
    debug: bool,
) -> Option<Decimal> {
    VatExtractor::new().with_debug(debug).extract(lines, known_total)
}
