//! Receipt parser combining the individual field extractors.

use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::{ReceiptFields, ReceiptStatus};

use super::rules::{
    Categorizer, DateExtractor, LineExtractor, MerchantExtractor, TotalAmountExtractor,
    VatExtractor,
};

/// Extracts every financial field of a receipt from its OCR lines.
#[derive(Debug, Clone)]
pub struct ReceiptParser {
    total: TotalAmountExtractor,
    vat: VatExtractor,
    merchant: MerchantExtractor,
    dates: DateExtractor,
    categorizer: Categorizer,
}

impl ReceiptParser {
    /// Create a parser with the default rules.
    pub fn new() -> Self {
        Self {
            total: TotalAmountExtractor::new(),
            vat: VatExtractor::new(),
            merchant: MerchantExtractor::new(),
            dates: DateExtractor::new(),
            categorizer: Categorizer::new(),
        }
    }

    /// Create a parser from extraction settings, validating them first.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            total: TotalAmountExtractor::from_config(config),
            vat: VatExtractor::from_config(config)?,
            merchant: MerchantExtractor::from_config(config),
            dates: DateExtractor::new(),
            categorizer: Categorizer::from_config(config)?,
        })
    }

    /// Trace intermediate candidates of the amount extractors.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.total = self.total.with_debug(debug);
        self.vat = self.vat.with_debug(debug);
        self
    }

    /// Parse OCR lines given in reading order.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> ReceiptFields {
        let start = Instant::now();

        let total = self.total.extract_lines(lines);
        let vat = self.vat.extract(lines, total.amount);
        let merchant = self.merchant.extract_lines(lines);
        let date = self.dates.extract_lines(lines);
        let category = self.categorizer.categorize(lines, merchant.as_deref());
        let status = ReceiptStatus::assess(total.amount, vat, date);

        info!(
            "Parsed {} lines: total {:?}, VAT {:?}, status {}",
            lines.len(),
            total.amount,
            vat,
            status
        );
        debug!("Receipt parsed in {:?}", start.elapsed());

        ReceiptFields {
            merchant,
            date,
            amount: total.amount,
            vat,
            currency: total.currency,
            category,
            status,
        }
    }

    /// Parse a text blob, one OCR line per text line.
    pub fn parse_text(&self, text: &str) -> ReceiptFields {
        let lines: Vec<&str> = text.lines().collect();
        self.parse(&lines)
    }
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::ExpenseCategory;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const NOVA_INVOICE: &str = "NOVA Conseil SAS
SIRET: 123 456 789 00012
TVA Intracom: FR12 123456789
FACTURE N°: NR-2025-00127
Date: 29/12/2025
Détail des prestations
Abonnement 29,00 €
Traitement 15,00 €
Sous-total HT : 143,00 €
TVA (20%): 28,60 €
Total TTC: 171,60 €
IBAN : FR76 3000 6000 0112 3456 7890 189";

    #[test]
    fn test_parse_full_invoice() {
        let fields = ReceiptParser::new().parse_text(NOVA_INVOICE);

        assert_eq!(
            fields,
            ReceiptFields {
                merchant: Some("NOVA Conseil SAS".to_string()),
                date: NaiveDate::from_ymd_opt(2025, 12, 29),
                amount: Some(dec("171.60")),
                vat: Some(dec("28.60")),
                currency: "EUR".to_string(),
                category: ExpenseCategory::Other,
                status: ReceiptStatus::Success,
            }
        );
        assert!(!fields.needs_review());
    }

    #[test]
    fn test_parse_ticket_without_vat() {
        let lines = ["Pizza Napoli", "Margherita 11,00", "TOTAL 11,00 €"];
        let fields = ReceiptParser::new().parse(&lines);

        assert_eq!(fields.amount, Some(dec("11.00")));
        assert_eq!(fields.vat, None);
        assert_eq!(fields.category, ExpenseCategory::Restaurant);
        assert_eq!(fields.status, ReceiptStatus::Partial);
        assert!(fields.needs_review());
    }

    #[test]
    fn test_parse_unreadable_receipt() {
        let fields = ReceiptParser::new().parse_text("@@@\n\n###");

        assert_eq!(fields.amount, None);
        assert_eq!(fields.status, ReceiptStatus::Failed);
    }

    #[test]
    fn test_parse_keeps_blank_lines_for_positions() {
        let parser = ReceiptParser::new();
        let text = "Article 40,00\n\n\n\nArticle 25,00";

        // the second article sits in the last fifth of the document
        assert_eq!(parser.parse_text(text).amount, Some(dec("25.00")));
    }

    #[test]
    fn test_debug_does_not_change_fields() {
        let quiet = ReceiptParser::new().parse_text(NOVA_INVOICE);
        let verbose = ReceiptParser::new().with_debug(true).parse_text(NOVA_INVOICE);

        assert_eq!(quiet, verbose);
    }

    #[test]
    fn test_from_config() {
        let mut config = ExtractionConfig::default();
        config.default_currency = "CHF".to_string();

        let fields = ReceiptParser::from_config(&config)
            .unwrap()
            .parse(&["Total 20,00"]);
        assert_eq!(fields.currency, "CHF");

        config.total.year_min = 3000;
        assert!(ReceiptParser::from_config(&config).is_err());
    }
}
