//! Per-period case scraping.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::Locators;
use crate::error::Result;
use crate::models::{CaseLink, CaseRecord, SearchPeriod};

use super::extract::extract_case_record;
use super::{CourtPortal, EventSink, ScrapeEvent};

/// Records and failures from one scraping session.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    /// One buffer per period, in period order.
    pub batches: Vec<Vec<CaseRecord>>,
    /// Identifiers of cases whose detail page could not be scraped.
    pub issues: Vec<String>,
}

impl ScrapeOutcome {
    pub fn case_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

/// Walks search periods and scrapes every case they list.
///
/// Each session builds its own buffers; nothing carries over between runs.
pub struct EvictionScraper<'a, P: CourtPortal + ?Sized> {
    portal: &'a mut P,
    locators: Locators,
    case_delay: Duration,
    events: EventSink,
}

impl<'a, P: CourtPortal + ?Sized> EvictionScraper<'a, P> {
    pub fn new(portal: &'a mut P, locators: Locators, case_delay: Duration) -> Self {
        Self {
            portal,
            locators,
            case_delay,
            events: EventSink::default(),
        }
    }

    /// Send progress events to `tx`.
    pub fn with_events(mut self, tx: UnboundedSender<ScrapeEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    /// Scrape every period in order.
    pub async fn run(&mut self, periods: &[SearchPeriod]) -> Result<ScrapeOutcome> {
        let mut outcome = ScrapeOutcome::default();
        for period in periods {
            let records = self.scrape_period(period, &mut outcome.issues).await?;
            outcome.batches.push(records);
        }
        Ok(outcome)
    }

    async fn scrape_period(
        &mut self,
        period: &SearchPeriod,
        issues: &mut Vec<String>,
    ) -> Result<Vec<CaseRecord>> {
        let links = self.portal.search(period).await?;
        info!("Found {} cases for {}", links.len(), period);
        self.events.emit(ScrapeEvent::PeriodStarted {
            period: *period,
            total_cases: links.len(),
        });

        let mut records = Vec::with_capacity(links.len());
        let mut failed = 0;

        for link in &links {
            let started = Instant::now();

            match self.scrape_case(link).await {
                Ok(record) => {
                    debug!("Scraped case {}", record.case_number);
                    self.events.emit(ScrapeEvent::CaseScraped {
                        case_number: record.case_number.clone(),
                    });
                    records.push(record);
                }
                Err(e) if e.is_recoverable() => {
                    failed += 1;
                    let case_id = match self.portal.recover_case_number().await {
                        Some(number) => number,
                        None => link.label().to_string(),
                    };
                    warn!("Case {} recorded as issue: {}", case_id, e);
                    self.events.emit(ScrapeEvent::CaseFailed {
                        case_id: Some(case_id.clone()),
                        reason: e.to_string(),
                    });
                    issues.push(case_id);
                }
                Err(e) => {
                    if let Err(close_err) = self.portal.close_case().await {
                        debug!("Failed to close case view: {}", close_err);
                    }
                    return Err(e);
                }
            }

            self.portal.close_case().await?;
            debug!("Case page handled in {:?}", started.elapsed());

            if !self.case_delay.is_zero() {
                tokio::time::sleep(self.case_delay).await;
            }
        }

        info!(
            "Finished scraping period {} ({} scraped, {} issues)",
            period,
            records.len(),
            failed
        );
        self.events.emit(ScrapeEvent::PeriodFinished {
            period: *period,
            scraped: records.len(),
            failed,
        });

        Ok(records)
    }

    async fn scrape_case(&mut self, link: &CaseLink) -> Result<CaseRecord> {
        let html = self.portal.open_case(link).await?;
        extract_case_record(&html, &self.locators)
    }
}
