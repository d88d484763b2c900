//! Fiscal quarter alignment.
//!
//! Daily rows and quarterly rows meet on the quarter start date. Quarters are
//! calendar quarters: Jan-Mar, Apr-Jun, Jul-Sep, Oct-Dec, boundaries inclusive.

use chrono::{Datelike, NaiveDate};

/// Start date of the quarter containing `date`.
pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let first_month = ((date.month0() / 3) * 3) + 1;
    // Day 1 of months 1, 4, 7 or 10 exists in every year.
    NaiveDate::from_ymd_opt(date.year(), first_month, 1).unwrap_or(date)
}

/// Quarter start date for a (year, quarter) pair, `None` when the quarter is
/// outside 1..=4 or the year is not representable.
pub fn quarter_start_from_parts(year: i32, quarter: u32) -> Option<NaiveDate> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
}

/// Parses raw year/quarter cells. Spreadsheet exports often carry `2021.0`
/// or `Q3`; anything non-integral or out of range yields `None`.
pub fn parse_quarter_key(year: &str, quarter: &str) -> Option<NaiveDate> {
    let year = parse_integral(year)?;
    let quarter_cell = quarter.trim().trim_start_matches(['Q', 'q']);
    let quarter = parse_integral(quarter_cell)?;
    let year = i32::try_from(year).ok()?;
    let quarter = u32::try_from(quarter).ok()?;
    quarter_start_from_parts(year, quarter)
}

fn parse_integral(cell: &str) -> Option<i64> {
    let value: f64 = cell.trim().parse().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    Some(value as i64)
}
