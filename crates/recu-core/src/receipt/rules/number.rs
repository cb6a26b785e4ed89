//! Localized number parsing (French, European and American formatting).

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a localized numeric token such as `"1 234,56"`, `"1.234,56"` or
/// `"1,234.56"`.
///
/// When both separators appear, the one occurring last is the decimal
/// separator and the other is dropped as a thousands separator. A lone comma
/// is a decimal comma. Returns `None` for anything that is not a number
/// afterwards.
pub fn normalize_localized_number(token: &str) -> Option<Decimal> {
    let cleaned: String = token.chars().filter(|c| !c.is_whitespace()).collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replacen(',', ".", 1),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replacen(',', ".", 1),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}
