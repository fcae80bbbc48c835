//! Month grid construction.
//!
//! The visible grid is made of whole week rows: it starts on the
//! [`WEEK_START`](crate::week::WEEK_START) day on or before the 1st of the
//! focused month and ends on the last column of the row holding the month's
//! last day. Its length is therefore always a multiple of seven.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::CalendarError;
use crate::week::{end_of_week, start_of_week};

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// The day belongs to the focused month (not a leading/trailing filler).
    pub is_current_month: bool,
    pub is_today: bool,
    /// The day lies within the trip's inclusive start/end boundaries.
    pub in_trip: bool,
}

/// Context for flagging grid days. All fields are optional; without them no
/// day is "today" and no day is inside the trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridOptions {
    pub today: Option<NaiveDate>,
    pub trip_bounds: Option<(NaiveDate, NaiveDate)>,
}

/// Inclusive first/last day of the visible grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisibleRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl VisibleRange {
    /// The range spanned by an ordered day list, or `None` for an empty grid.
    pub fn from_days(days: &[CalendarDay]) -> Option<Self> {
        Some(Self {
            start: days.first()?.date,
            end: days.last()?.date,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Range bounds as `YYYY-MM-DD` strings, for cheap lexical pre-filtering.
    pub fn iso_bounds(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }
}

/// Build the grid for the month containing `focus_month`.
///
/// Any day of the month may be passed; only its year and month matter.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use trip_calendar::grid::build_visible_days;
///
/// let days = build_visible_days(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
/// assert_eq!(days.len() % 7, 0);
/// assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
/// ```
pub fn build_visible_days(focus_month: NaiveDate) -> Vec<CalendarDay> {
    build_visible_days_with_options(focus_month, &GridOptions::default())
}

/// Build the grid for the month containing `focus_month`, flagging today and
/// trip days from `options`.
///
/// Returns an empty grid for the few months at the edges of the supported
/// calendar whose outer week rows cannot be represented.
pub fn build_visible_days_with_options(
    focus_month: NaiveDate,
    options: &GridOptions,
) -> Vec<CalendarDay> {
    let first_of_month = focus_month.with_day(1).unwrap_or(focus_month);
    let Some((grid_start, grid_end)) = grid_bounds(first_of_month) else {
        return Vec::new();
    };

    grid_start
        .iter_days()
        .take_while(|date| *date <= grid_end)
        .map(|date| CalendarDay {
            date,
            is_current_month: date.month() == first_of_month.month()
                && date.year() == first_of_month.year(),
            is_today: options.today == Some(date),
            in_trip: options
                .trip_bounds
                .is_some_and(|(start, end)| start <= date && date <= end),
        })
        .collect()
}

/// The first day of `year`-`month`.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidMonth`] if `month` is not in 1..=12, the
/// year is out of range, or the month's whole-week grid would run past the
/// supported calendar.
pub fn month_start(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .filter(|first| grid_bounds(*first).is_some())
        .ok_or_else(|| CalendarError::InvalidMonth(format!("{year}-{month:02}")))
}

/// Parse a `YYYY-MM` month reference into the first day of that month.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidMonth`] if the string is not `YYYY-MM` or the
/// month number is out of range.
pub fn parse_month(s: &str) -> Result<NaiveDate, CalendarError> {
    let s = s.trim();
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| CalendarError::InvalidMonth(format!("expected YYYY-MM: '{s}'")))?;
    let year: i32 = year
        .parse()
        .map_err(|_| CalendarError::InvalidMonth(format!("invalid year in '{s}'")))?;
    let month: u32 = month
        .parse()
        .map_err(|_| CalendarError::InvalidMonth(format!("invalid month in '{s}'")))?;
    month_start(year, month)
}

/// First and last grid day for the month starting on `first_of_month`.
fn grid_bounds(first_of_month: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let last_of_month = last_day_of_month(first_of_month)?;
    Some((start_of_week(first_of_month)?, end_of_week(last_of_month)?))
}

fn last_day_of_month(first_of_month: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = (first_of_month.year(), first_of_month.month());
    if month == 12 {
        return NaiveDate::from_ymd_opt(year, 12, 31);
    }
    NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // ── build_visible_days ──────────────────────────────────────────────

    #[test]
    fn test_grid_july_2024_starts_on_monday_first() {
        // July 1 2024 is a Monday, July 31 a Wednesday
        let days = build_visible_days(d(2024, 7, 15));
        assert_eq!(days.first().unwrap().date, d(2024, 7, 1));
        assert_eq!(days.last().unwrap().date, d(2024, 8, 4));
        assert_eq!(days.len(), 35);
    }

    #[test]
    fn test_grid_includes_leading_days_from_previous_month() {
        // September 1 2024 is a Sunday → grid starts Monday Aug 26
        let days = build_visible_days(d(2024, 9, 1));
        assert_eq!(days[0].date, d(2024, 8, 26));
        assert!(!days[0].is_current_month);
        assert_eq!(days[6].date, d(2024, 9, 1));
        assert!(days[6].is_current_month);
        assert_eq!(days.last().unwrap().date, d(2024, 10, 6));
        assert_eq!(days.len(), 42);
    }

    #[test]
    fn test_grid_february_exact_four_weeks() {
        // February 2021: Mon Feb 1 .. Sun Feb 28
        let days = build_visible_days(d(2021, 2, 10));
        assert_eq!(days.len(), 28);
        assert!(days.iter().all(|day| day.is_current_month));
    }

    #[test]
    fn test_grid_december_rolls_into_january() {
        let days = build_visible_days(d(2024, 12, 1));
        let last = days.last().unwrap();
        assert_eq!(last.date, d(2025, 1, 5));
        assert_eq!(last.date.weekday(), Weekday::Sun);
    }

    #[test]
    fn test_grid_flags_today_and_trip_days() {
        let options = GridOptions {
            today: Some(d(2024, 7, 16)),
            trip_bounds: Some((d(2024, 7, 10), d(2024, 7, 20))),
        };
        let days = build_visible_days_with_options(d(2024, 7, 1), &options);
        let today: Vec<_> = days.iter().filter(|day| day.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, d(2024, 7, 16));

        let in_trip: Vec<_> = days.iter().filter(|day| day.in_trip).map(|day| day.date).collect();
        assert_eq!(in_trip.len(), 11);
        assert_eq!(in_trip[0], d(2024, 7, 10));
        assert_eq!(*in_trip.last().unwrap(), d(2024, 7, 20));
    }

    // ── VisibleRange ────────────────────────────────────────────────────

    #[test]
    fn test_visible_range_from_days() {
        let days = build_visible_days(d(2024, 7, 1));
        let range = VisibleRange::from_days(&days).unwrap();
        assert_eq!(range.start, d(2024, 7, 1));
        assert_eq!(range.end, d(2024, 8, 4));
        assert!(range.contains(d(2024, 8, 4)));
        assert!(!range.contains(d(2024, 8, 5)));
        assert_eq!(
            range.iso_bounds(),
            ("2024-07-01".to_string(), "2024-08-04".to_string())
        );
    }

    #[test]
    fn test_visible_range_empty() {
        assert_eq!(VisibleRange::from_days(&[]), None);
    }

    // ── month parsing ───────────────────────────────────────────────────

    #[test]
    fn test_month_start_rejects_month_13() {
        let err = month_start(2024, 13).unwrap_err();
        assert!(err.to_string().contains("Invalid month"), "got: {err}");
    }

    #[test]
    fn test_month_start_at_calendar_limits_matches_grid() {
        // Edge months either get a whole-week grid or are rejected outright
        for (year, month) in [(NaiveDate::MIN.year(), 1), (NaiveDate::MAX.year(), 12)] {
            let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            let days = build_visible_days(first);
            match month_start(year, month) {
                Ok(start) => {
                    assert_eq!(start, first);
                    assert!(!days.is_empty());
                    assert_eq!(days.len() % 7, 0);
                    assert!(days.iter().any(|day| day.date == first));
                }
                Err(err) => {
                    assert!(err.to_string().contains("Invalid month"), "got: {err}");
                    assert!(days.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_december_grid_reaches_new_years_eve() {
        let days = build_visible_days(d(2023, 12, 1));
        assert!(days.iter().any(|day| day.date == d(2023, 12, 31) && day.is_current_month));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-07").unwrap(), d(2024, 7, 1));
        assert_eq!(parse_month(" 2024-7 ").unwrap(), d(2024, 7, 1));
        assert!(parse_month("2024").is_err());
        assert!(parse_month("2024-00").is_err());
        assert!(parse_month("July").is_err());
    }
}
