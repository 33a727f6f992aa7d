//! # Sale Numbers
//!
//! Human-readable sale identifiers: `SALE-YYYYMMDD-NNNN`.
//!
//! The sequence part comes from a per-day counter in the database, so
//! numbers issued on one day are strictly increasing. It is zero-padded to
//! four digits and simply grows wider past 9999.

use chrono::NaiveDate;

pub const SALE_NUMBER_PREFIX: &str = "SALE";

/// The counter key for a day (`20261016`).
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

/// Formats a sale number from its day and sequence.
///
/// ```rust
/// use chrono::NaiveDate;
/// use tally_core::sale_number::format_sale_number;
///
/// let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
/// assert_eq!(format_sale_number(day, 7), "SALE-20261016-0007");
/// ```
pub fn format_sale_number(day: NaiveDate, sequence: i64) -> String {
    format!("{}-{}-{:04}", SALE_NUMBER_PREFIX, day_key(day), sequence)
}
