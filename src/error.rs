//! Scraper error types.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("End date {end} is later than today's date ({today})")]
    FutureEnd { end: NaiveDate, today: NaiveDate },
    #[error("Invalid date '{0}' (expected mmddyyyy)")]
    InvalidDate(String),
    #[error("Unable to open dataset at {}", .0.display())]
    DatasetNotFound(PathBuf),
    #[error("{} has no filed dates to continue from; pass START and END dates", .0.display())]
    NoFiledDates(PathBuf),
    #[error("Timed out after {waited:?} waiting for '{selector}'")]
    Timeout { selector: String, waited: Duration },
    #[error("Malformed row: {0}")]
    MalformedRow(String),
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Failures confined to a single case page; the run continues past them.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::MalformedRow(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_and_malformed_rows_are_recoverable() {
        let timeout = ScrapeError::Timeout {
            selector: "#party_info_table".to_string(),
            waited: Duration::from_secs(20),
        };
        assert!(timeout.is_recoverable());
        assert!(ScrapeError::MalformedRow("JUDGE".into()).is_recoverable());
    }

    #[test]
    fn browser_and_io_errors_propagate() {
        assert!(!ScrapeError::Browser("connection reset".into()).is_recoverable());
        assert!(!ScrapeError::ElementNotFound("button".into()).is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(!ScrapeError::from(io).is_recoverable());
    }
}
