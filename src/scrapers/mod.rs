//! Portal scraping: the browser-backed portal, the per-period case scraper
//! and the disposition updater.

pub mod browser;
pub mod eviction;
pub mod extract;
#[cfg(test)]
pub(crate) mod fake;
pub mod updater;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::Result;
use crate::models::{CaseLink, SearchPeriod};

pub use browser::BrowserPortal;
pub use eviction::{EvictionScraper, ScrapeOutcome};
pub use updater::{DispositionUpdater, UpdateSummary};

/// Operations the scraper needs from the court portal.
///
/// Implementations own the browser session. The detail view of at most one
/// case is open at a time: `open_case` opens it, `close_case` closes it.
#[async_trait]
pub trait CourtPortal: Send {
    /// Submit the classification search for one period, expand pagination,
    /// and return the case links of every result row.
    async fn search(&mut self, period: &SearchPeriod) -> Result<Vec<CaseLink>>;

    /// Open a case's detail view, reveal the party table, and return the
    /// rendered HTML.
    async fn open_case(&mut self, link: &CaseLink) -> Result<String>;

    /// Best-effort case number from the currently open detail view.
    async fn recover_case_number(&mut self) -> Option<String>;

    /// Close the detail view opened by `open_case`, if any.
    async fn close_case(&mut self) -> Result<()>;

    /// Look a case up by number and return its summary page HTML.
    async fn lookup_case(&mut self, case_number: &str) -> Result<String>;

    /// End the browser session.
    async fn close(&mut self);
}

/// Progress notifications for the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeEvent {
    PeriodStarted { period: SearchPeriod, total_cases: usize },
    CaseScraped { case_number: String },
    CaseFailed { case_id: Option<String>, reason: String },
    PeriodFinished { period: SearchPeriod, scraped: usize, failed: usize },
    UpdateStarted { total_cases: usize },
    DispositionChecked { case_number: String, disposed: bool },
    UpdateFinished,
}

/// Optional event sink shared by the scraper and updater.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink(Option<UnboundedSender<ScrapeEvent>>);

impl EventSink {
    pub(crate) fn new(tx: UnboundedSender<ScrapeEvent>) -> Self {
        Self(Some(tx))
    }

    pub(crate) fn emit(&self, event: ScrapeEvent) {
        if let Some(ref tx) = self.0 {
            // Receiver gone means nobody is listening; keep scraping.
            let _ = tx.send(event);
        }
    }
}
