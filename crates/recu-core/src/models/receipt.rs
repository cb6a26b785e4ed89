//! Receipt data models produced by the extractors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Total amount found on a receipt, with the currency it is reported in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountExtraction {
    /// Best total candidate, `None` when no candidate survived.
    pub amount: Option<Decimal>,
    /// Configured default currency code.
    pub currency: String,
}

/// Structured financial fields of one receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Total amount due (TTC).
    pub amount: Option<Decimal>,

    /// VAT amount (TVA).
    pub vat: Option<Decimal>,

    pub currency: String,

    pub category: ExpenseCategory,

    pub status: ReceiptStatus,
}

impl ReceiptFields {
    /// Whether a person has to confirm or complete the fields.
    pub fn needs_review(&self) -> bool {
        self.status != ReceiptStatus::Success
    }

    /// Net amount (HT), when both the total and the VAT are known.
    pub fn net_amount(&self) -> Option<Decimal> {
        Some(self.amount? - self.vat?)
    }
}

/// How completely a receipt was understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Total, VAT and date were all determined.
    Success,
    /// The total was determined but another field is missing.
    Partial,
    /// No total could be determined.
    Failed,
}

impl ReceiptStatus {
    /// Derive the status from the fields that were found.
    pub fn assess(amount: Option<Decimal>, vat: Option<Decimal>, date: Option<NaiveDate>) -> Self {
        match (amount, vat, date) {
            (None, _, _) => Self::Failed,
            (Some(_), Some(_), Some(_)) => Self::Success,
            _ => Self::Partial,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expense category of a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Restaurant,
    Transport,
    Lodging,
    Fuel,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Transport => "transport",
            Self::Lodging => "lodging",
            Self::Fuel => "fuel",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
