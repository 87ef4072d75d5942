//! Calendar-day handling
//!
//! Requests are booked per calendar day; time-of-day is never compared.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use crate::error::{DomainError, DomainResult};

/// Parse a calendar day from `YYYY-MM-DD` or a full timestamp
///
/// Timestamps keep the date as written, in their own offset.
pub fn parse_day(input: &str) -> DomainResult<NaiveDate> {
    let input = input.trim();

    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(day);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }

    Err(DomainError::validation(format!("Invalid date: {}", input)))
}

/// The server's current calendar day
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
