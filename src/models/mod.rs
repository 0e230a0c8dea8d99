//! Data models for the eviction scraper.

mod case_link;
mod case_record;
mod period;

pub use case_link::CaseLink;
pub use case_record::{column, non_blank, CaseRecord, Disposition, Party, SchemaVersion};
pub use period::{
    format_cli_date, parse_cli_date, split_date_range, SearchPeriod, DEFAULT_MAX_SPAN_DAYS,
};
