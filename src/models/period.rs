//! Search periods and date-range splitting.
//!
//! The portal only accepts searches spanning a limited number of days, so a
//! requested range is cut into consecutive periods that each fit the limit.

use std::fmt;

use chrono::{Days, NaiveDate};

use crate::error::{Result, ScrapeError};

/// Maximum number of days the portal allows between begin and end date.
pub const DEFAULT_MAX_SPAN_DAYS: u64 = 7;

/// Date format used on the command line and in issue file names.
pub const CLI_DATE_FORMAT: &str = "%m%d%Y";

/// Date format expected by the search form.
pub const FORM_DATE_FORMAT: &str = "%m/%d/%Y";

/// One inclusive date interval submitted to the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SearchPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Begin date as typed into the form (`mm/dd/yyyy`).
    pub fn form_start(&self) -> String {
        self.start.format(FORM_DATE_FORMAT).to_string()
    }

    /// End date as typed into the form (`mm/dd/yyyy`).
    pub fn form_end(&self) -> String {
        self.end.format(FORM_DATE_FORMAT).to_string()
    }

    /// Number of days between start and end.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for SearchPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.form_start(), self.form_end())
    }
}

/// Parse a `mmddyyyy` command-line date.
pub fn parse_cli_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if value.len() != 8 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScrapeError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, CLI_DATE_FORMAT)
        .map_err(|_| ScrapeError::InvalidDate(value.to_string()))
}

/// Format a date as `mmddyyyy`.
pub fn format_cli_date(date: NaiveDate) -> String {
    date.format(CLI_DATE_FORMAT).to_string()
}

/// Split `[start, end]` into consecutive periods.
///
/// Each period's end lies at most `max_span_days` after its start, the next
/// period starts the following day, and the last period ends on `end`.
pub fn split_date_range(
    start: NaiveDate,
    end: NaiveDate,
    max_span_days: u64,
    today: NaiveDate,
) -> Result<Vec<SearchPeriod>> {
    if start > end {
        return Err(ScrapeError::InvalidRange { start, end });
    }
    if end > today {
        return Err(ScrapeError::FutureEnd { end, today });
    }

    let mut periods = Vec::new();
    let mut period_start = start;
    loop {
        let period_end = period_start
            .checked_add_days(Days::new(max_span_days))
            .map_or(end, |d| d.min(end));
        periods.push(SearchPeriod::new(period_start, period_end));

        if period_end >= end {
            break;
        }
        period_start = period_end + Days::new(1);
    }

    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 1, 1)
    }

    #[test]
    fn splits_two_weeks_into_two_periods() {
        let periods = split_date_range(date(2022, 6, 6), date(2022, 6, 20), 7, today()).unwrap();
        assert_eq!(
            periods,
            vec![
                SearchPeriod::new(date(2022, 6, 6), date(2022, 6, 13)),
                SearchPeriod::new(date(2022, 6, 14), date(2022, 6, 20)),
            ]
        );
    }

    #[test]
    fn zero_length_range_yields_single_period() {
        let day = date(2022, 6, 6);
        let periods = split_date_range(day, day, 7, today()).unwrap();
        assert_eq!(periods, vec![SearchPeriod::new(day, day)]);
    }

    #[test]
    fn exact_span_is_one_period() {
        let periods = split_date_range(date(2022, 6, 6), date(2022, 6, 13), 7, today()).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].span_days(), 7);
    }

    #[test]
    fn final_period_is_clamped() {
        let periods = split_date_range(date(2022, 6, 6), date(2022, 6, 14), 7, today()).unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1], SearchPeriod::new(date(2022, 6, 14), date(2022, 6, 14)));
    }

    #[test]
    fn periods_are_contiguous_and_bounded() {
        let start = date(2021, 12, 20);
        let end = date(2022, 3, 3);
        for max_span in [0, 1, 3, 7, 30, 400] {
            let periods = split_date_range(start, end, max_span, today()).unwrap();

            assert_eq!(periods.first().unwrap().start, start);
            assert_eq!(periods.last().unwrap().end, end);
            for period in &periods {
                assert!(period.start <= period.end);
                assert!(period.span_days() <= max_span as i64);
            }
            for pair in periods.windows(2) {
                assert_eq!(pair[0].end + Days::new(1), pair[1].start);
            }
        }
    }

    #[test]
    fn rejects_inverted_range() {
        let err = split_date_range(date(2022, 6, 10), date(2022, 6, 6), 7, today()).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidRange { .. }));
    }

    #[test]
    fn rejects_future_end_date() {
        let err = split_date_range(date(2023, 12, 25), date(2024, 1, 2), 7, today()).unwrap_err();
        assert!(matches!(err, ScrapeError::FutureEnd { .. }));
    }

    #[test]
    fn end_date_may_be_today() {
        let periods = split_date_range(date(2023, 12, 30), today(), 7, today()).unwrap();
        assert_eq!(periods, vec![SearchPeriod::new(date(2023, 12, 30), today())]);
    }

    #[test]
    fn parses_cli_dates() {
        assert_eq!(parse_cli_date("06062022").unwrap(), date(2022, 6, 6));
        assert_eq!(parse_cli_date(" 12312021 ").unwrap(), date(2021, 12, 31));
    }

    #[test]
    fn rejects_bad_cli_dates() {
        for bad in ["6062022", "2022-06-06", "13012022", "02302022", "abcdefgh"] {
            assert!(
                matches!(parse_cli_date(bad), Err(ScrapeError::InvalidDate(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn formats_period_for_form() {
        let period = SearchPeriod::new(date(2022, 6, 6), date(2022, 6, 13));
        assert_eq!(period.form_start(), "06/06/2022");
        assert_eq!(period.form_end(), "06/13/2022");
        assert_eq!(period.to_string(), "06/06/2022-06/13/2022");
        assert_eq!(format_cli_date(period.end), "06132022");
    }
}
