//! Revisits pending cases and patches in their disposition.

use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::Locators;
use crate::dataset::Dataset;
use crate::error::Result;

use super::extract::extract_disposition;
use super::{CourtPortal, EventSink, ScrapeEvent};

/// Counts from one update pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub checked: usize,
    pub updated: usize,
    pub still_pending: usize,
    pub failed: usize,
}

pub struct DispositionUpdater<'a, P: CourtPortal + ?Sized> {
    portal: &'a mut P,
    locators: Locators,
    case_delay: Duration,
    events: EventSink,
}

impl<'a, P: CourtPortal + ?Sized> DispositionUpdater<'a, P> {
    pub fn new(portal: &'a mut P, locators: Locators, case_delay: Duration) -> Self {
        Self {
            portal,
            locators,
            case_delay,
            events: EventSink::default(),
        }
    }

    pub fn with_events(mut self, tx: UnboundedSender<ScrapeEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    /// Look up each case and record any disposition found in `dataset`.
    ///
    /// Cases whose page cannot be read are skipped and left untouched.
    pub async fn run(
        &mut self,
        dataset: &mut Dataset,
        cases: &[String],
        today: NaiveDate,
    ) -> Result<UpdateSummary> {
        let mut summary = UpdateSummary::default();
        self.events.emit(ScrapeEvent::UpdateStarted {
            total_cases: cases.len(),
        });

        for case_number in cases {
            let lookup = match self.portal.lookup_case(case_number).await {
                Ok(html) => extract_disposition(&html, &self.locators),
                Err(e) => Err(e),
            };

            match lookup {
                Ok(disposition) => {
                    let disposed = disposition.is_some();
                    if !dataset.apply_disposition(case_number, disposition, today) {
                        debug!("Case {} is not in the dataset", case_number);
                    } else if disposed {
                        summary.updated += 1;
                    } else {
                        summary.still_pending += 1;
                    }
                    self.events.emit(ScrapeEvent::DispositionChecked {
                        case_number: case_number.clone(),
                        disposed,
                    });
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Could not check disposition of {}: {}", case_number, e);
                    summary.failed += 1;
                    self.events.emit(ScrapeEvent::DispositionChecked {
                        case_number: case_number.clone(),
                        disposed: false,
                    });
                }
                Err(e) => return Err(e),
            }
            summary.checked += 1;

            if !self.case_delay.is_zero() {
                tokio::time::sleep(self.case_delay).await;
            }
        }

        info!(
            "Checked {} pending cases: {} disposed, {} still pending, {} failed",
            summary.checked, summary.updated, summary.still_pending, summary.failed
        );
        self.events.emit(ScrapeEvent::UpdateFinished);

        Ok(summary)
    }
}
