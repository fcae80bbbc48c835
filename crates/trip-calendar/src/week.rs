//! The single week convention shared by the grid builder and the segment
//! materializer.
//!
//! The month grid starts every row on [`WEEK_START`], and a segment is a row
//! boundary exactly when its day is the first or last column of such a row.
//! Both sides go through these functions so the two can never disagree.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// First column of every calendar row (ISO 8601).
pub const WEEK_START: Weekday = Weekday::Mon;

/// Number of columns in a calendar row.
pub const DAYS_PER_WEEK: i64 = 7;

/// How many days `weekday` is from [`WEEK_START`] (0..=6). This is also the
/// column index of the day in its row.
pub fn days_from_week_start(weekday: Weekday) -> i64 {
    let offset = weekday.num_days_from_monday() as i64 - WEEK_START.num_days_from_monday() as i64;
    offset.rem_euclid(DAYS_PER_WEEK)
}

/// The first day of the row containing `date`, or `None` if that day is
/// before the earliest representable date.
pub fn start_of_week(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(days_from_week_start(date.weekday()) as u64))
}

/// The last day of the row containing `date`, or `None` if that day is past
/// the latest representable date.
pub fn end_of_week(date: NaiveDate) -> Option<NaiveDate> {
    let remaining = DAYS_PER_WEEK - 1 - days_from_week_start(date.weekday());
    date.checked_add_days(Days::new(remaining as u64))
}

/// Whether `date` sits in the first column of its row.
pub fn is_row_start(date: NaiveDate) -> bool {
    days_from_week_start(date.weekday()) == 0
}

/// Whether `date` sits in the last column of its row.
pub fn is_row_end(date: NaiveDate) -> bool {
    days_from_week_start(date.weekday()) == DAYS_PER_WEEK - 1
}
