//! Core library for receipt financial field extraction.
//!
//! This crate provides:
//! - Locale-aware number normalization (`1 234,56`, `1,234.56`)
//! - Keyword and position scored total amount (TTC) extraction
//! - VAT (TVA) extraction with a net amount (HT) fallback
//! - Merchant, date and expense category heuristics
//! - JSON configuration for every keyword list and weight

pub mod error;
pub mod models;
pub mod receipt;

pub use error::{ConfigError, RecuError, Result};
pub use models::config::{ExtractionConfig, OutputConfig, RecuConfig};
pub use models::receipt::{AmountExtraction, ExpenseCategory, ReceiptFields, ReceiptStatus};
pub use receipt::ReceiptParser;
pub use receipt::rules::{
    AmountCandidate, TotalAmountExtractor, VatExtractor, categorize, extract_date,
    extract_merchant, extract_total_amount, extract_vat, normalize_localized_number,
};
