//! Receipt date extraction.

use chrono::NaiveDate;
use regex::Regex;

use super::LineExtractor;
use super::patterns::{DATE_DMY, DATE_YMD};

/// Date field extractor.
///
/// Day-first dates (`29/12/2025`, `29-12-2025`) are preferred over ISO-like
/// dates (`2025-12-29`), each taken in reading order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> Option<NaiveDate> {
        first_date(lines, &DATE_DMY, [3, 2, 1]).or_else(|| first_date(lines, &DATE_YMD, [1, 2, 3]))
    }
}

impl LineExtractor for DateExtractor {
    type Output = Option<NaiveDate>;

    fn extract_lines<S: AsRef<str>>(&self, lines: &[S]) -> Self::Output {
        self.extract(lines)
    }
}

/// First valid calendar date matched by `pattern`, reading the year, month
/// and day from the given capture groups.
fn first_date<S: AsRef<str>>(lines: &[S], pattern: &Regex, groups: [usize; 3]) -> Option<NaiveDate> {
    let [year, month, day] = groups;

    lines.iter().find_map(|line| {
        pattern.captures_iter(line.as_ref()).find_map(|caps| {
            NaiveDate::from_ymd_opt(
                caps[year].parse().ok()?,
                caps[month].parse().ok()?,
                caps[day].parse().ok()?,
            )
        })
    })
}

/// Find the receipt date.
pub fn extract_date<S: AsRef<str>>(lines: &[S]) -> Option<NaiveDate> {
    DateExtractor::new().extract(lines)
}
