//! Portal endpoints and DOM locators.
//!
//! Every selector the scraper relies on lives in [`Locators`], so a change in
//! the portal's markup is fixed here (or in the config file) and nowhere else.
//! Selectors are CSS; positional ones mirror the portal's fixed page layout.

use serde::{Deserialize, Serialize};

use crate::models::{SchemaVersion, DEFAULT_MAX_SPAN_DAYS};

/// Listing-by-classification search page.
pub const DEFAULT_LISTING_URL: &str =
    "https://www.courtclerk.org/records-search/municipal-civil-listing-by-classification/";

/// Search-by-case-number page.
pub const DEFAULT_CASE_SEARCH_URL: &str =
    "https://www.courtclerk.org/records-search/search-by-case-number/";

/// Classification code selecting eviction cases.
pub const DEFAULT_CLASSIFICATION_CODE: &str = "G";

/// Portal behaviour and pacing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PortalConfig {
    pub listing_url: String,
    pub case_search_url: String,
    pub classification_code: String,
    /// Longest search the portal accepts, in days.
    pub max_span_days: u64,
    /// Dataset column layout.
    pub schema: SchemaVersion,
    /// Upper bound on waiting for an element to appear, in seconds.
    pub wait_timeout_secs: u64,
    /// Pause after each case, in milliseconds.
    pub case_delay_ms: u64,
    /// Pause after a page transition before reading it, in milliseconds.
    pub settle_delay_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            case_search_url: DEFAULT_CASE_SEARCH_URL.to_string(),
            classification_code: DEFAULT_CLASSIFICATION_CODE.to_string(),
            max_span_days: DEFAULT_MAX_SPAN_DAYS,
            schema: SchemaVersion::default(),
            wait_timeout_secs: 20,
            case_delay_ms: 1000,
            settle_delay_ms: 1000,
        }
    }
}

/// Named selectors for every element the scraper touches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Locators {
    /// Classification drop-down on the listing page.
    pub classification_select: String,
    pub begin_date_input: String,
    pub end_date_input: String,
    pub search_button: String,
    /// Control that expands pagination to a single page.
    pub show_all_button: String,
    /// Rows of the results table.
    pub result_rows: String,
    /// Case-summary form inside a result row (not the documents link).
    pub result_link: String,
    /// Cell of a result row holding the case number.
    pub result_case_cell: String,
    /// Button on the detail page that reveals the party table.
    pub party_tab: String,
    pub summary_rows: String,
    pub party_rows: String,
    /// Case-number cell on the detail page, read when a case fails.
    pub detail_case_number: String,
    pub case_number_input: String,
    pub case_search_button: String,
}

impl Default for Locators {
    fn default() -> Self {
        Self {
            classification_select: r#"select[name="ccode"]"#.to_string(),
            begin_date_input: r#"input[name="begdate"]"#.to_string(),
            end_date_input: r#"input[name="enddate"]"#.to_string(),
            search_button:
                "body > div:nth-of-type(1) > div > div:nth-of-type(2) > form > input:nth-of-type(4)"
                    .to_string(),
            show_all_button: "body > div:nth-of-type(1) > div:nth-of-type(3) > button".to_string(),
            result_rows: "tr".to_string(),
            result_link: "td:nth-of-type(5) form".to_string(),
            result_case_cell: "td:nth-of-type(1)".to_string(),
            party_tab: "body > div:nth-of-type(1) > table > tbody > tr:nth-of-type(1) \
                        > td:nth-of-type(2) > form:nth-of-type(4)"
                .to_string(),
            summary_rows: "#case_summary_table > tbody > tr".to_string(),
            party_rows: "#party_info_table > tbody > tr".to_string(),
            detail_case_number: "body > div:nth-of-type(1) > table > tbody > tr:nth-of-type(1) \
                                 > td:nth-of-type(1) > div:nth-of-type(3) > table > tbody \
                                 > tr:nth-of-type(1) > td:nth-of-type(2)"
                .to_string(),
            case_number_input: r#"input[name="casenumber"]"#.to_string(),
            case_search_button:
                "body > div:nth-of-type(1) > div > div:nth-of-type(2) > form > p > input:nth-of-type(4)"
                    .to_string(),
        }
    }
}

impl Locators {
    /// All selectors with their field names, for validation and display.
    pub fn entries(&self) -> [(&'static str, &str); 14] {
        [
            ("classification_select", &self.classification_select),
            ("begin_date_input", &self.begin_date_input),
            ("end_date_input", &self.end_date_input),
            ("search_button", &self.search_button),
            ("show_all_button", &self.show_all_button),
            ("result_rows", &self.result_rows),
            ("result_link", &self.result_link),
            ("result_case_cell", &self.result_case_cell),
            ("party_tab", &self.party_tab),
            ("summary_rows", &self.summary_rows),
            ("party_rows", &self.party_rows),
            ("detail_case_number", &self.detail_case_number),
            ("case_number_input", &self.case_number_input),
            ("case_search_button", &self.case_search_button),
        ]
    }

    /// Check that every selector parses, naming the first one that does not.
    pub fn validate(&self) -> Result<(), String> {
        for (name, selector) in self.entries() {
            if scraper::Selector::parse(selector).is_err() {
                return Err(format!("locator '{}' has invalid selector '{}'", name, selector));
            }
        }
        Ok(())
    }
}
