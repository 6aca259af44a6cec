//! Calendar date parsing and half-open stay windows.
//!
//! Every date that crosses the HTTP boundary uses the fixed `MM-DD-YYYY`
//! format. A stay covers the nights from `start` up to but not including
//! `end`, so two stays overlap iff `a.start < b.end && a.end > b.start`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Date;

/// `chrono` format string for `MM-DD-YYYY`.
pub const DATE_FORMAT: &str = "%m-%d-%Y";

/// Exact length of a well-formed `MM-DD-YYYY` string.
const DATE_LEN: usize = 10;

/// Parse a `MM-DD-YYYY` calendar date.
///
/// Shortened forms such as `1-5-2050` and other layouts such as ISO
/// `2050-12-17` are rejected.
pub fn parse_date(input: &str) -> Result<Date, CoreError> {
    let input = input.trim();
    if input.len() != DATE_LEN {
        return Err(CoreError::Validation(format!(
            "Invalid date '{input}', expected MM-DD-YYYY"
        )));
    }
    Date::parse_from_str(input, DATE_FORMAT).map_err(|_| {
        CoreError::Validation(format!("Invalid date '{input}', expected MM-DD-YYYY"))
    })
}

/// Format a date as `MM-DD-YYYY`.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Half-open interval overlap test on calendar dates.
pub fn overlaps(a_start: Date, a_end: Date, b_start: Date, b_end: Date) -> bool {
    a_start < b_end && a_end > b_start
}

// ---------------------------------------------------------------------------
// StayDates
// ---------------------------------------------------------------------------

/// A validated `[start, end)` stay window. `start < end` always holds for
/// values built through [`StayDates::new`] or [`StayDates::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    pub start: Date,
    pub end: Date,
}

impl StayDates {
    pub fn new(start: Date, end: Date) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::Validation(
                "End date must be after the start date".into(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse both sides of a search form.
    ///
    /// Blank inputs, malformed dates and `start >= end` are all reported as
    /// [`CoreError::Validation`] with a message suitable for a user notice.
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        if start.trim().is_empty() || end.trim().is_empty() {
            return Err(CoreError::Validation("Dates cannot be empty".into()));
        }
        let start = parse_date(start)
            .map_err(|_| CoreError::Validation("Invalid start date".into()))?;
        let end =
            parse_date(end).map_err(|_| CoreError::Validation("Invalid end date".into()))?;
        Self::new(start, end)
    }

    /// Whether this stay overlaps an existing `[start, end)` block.
    pub fn overlaps(&self, start: Date, end: Date) -> bool {
        overlaps(self.start, self.end, start, end)
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}
