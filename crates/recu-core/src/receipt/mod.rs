//! Receipt field extraction from OCR text.

mod parser;
pub mod rules;

pub use parser::ReceiptParser;
