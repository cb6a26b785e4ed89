//! Rule-based field extractors for French receipts and invoices.

pub mod category;
pub mod dates;
pub mod merchant;
pub mod number;
pub mod patterns;
pub mod total;
pub mod vat;

pub use category::{Categorizer, categorize};
pub use dates::{DateExtractor, extract_date};
pub use merchant::{MerchantExtractor, extract_merchant};
pub use number::normalize_localized_number;
pub use total::{AmountCandidate, TotalAmountExtractor, extract_total_amount};
pub use vat::{VatExtractor, extract_vat};

/// Trait for extractors that read a field from the ordered OCR lines alone.
pub trait LineExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from lines given in reading order.
    fn extract_lines<S: AsRef<str>>(&self, lines: &[S]) -> Self::Output;
}
