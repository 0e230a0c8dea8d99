//! One end-to-end run: decide what to scrape, scrape it, patch pending
//! dispositions, and write the results.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Days, NaiveDate};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::config::Locators;
use crate::dataset::{issues_file_name, Dataset, IssuesTable};
use crate::error::{Result, ScrapeError};
use crate::models::{parse_cli_date, split_date_range, SchemaVersion, SearchPeriod};
use crate::scrapers::{
    CourtPortal, DispositionUpdater, EvictionScraper, ScrapeEvent, UpdateSummary,
};

/// What the positional date arguments ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPlan {
    /// Build a fresh dataset covering `[start, end]`.
    NewFile { start: NaiveDate, end: NaiveDate },
    /// Extend an existing dataset with cases filed up to `end`.
    Update { end: NaiveDate },
}

impl RunPlan {
    /// No dates: update to today. One: update to that date. Two: new file.
    pub fn from_args(dates: &[String], today: NaiveDate) -> Result<Self> {
        match dates {
            [] => Ok(Self::Update { end: today }),
            [end] => Ok(Self::Update {
                end: parse_cli_date(end)?,
            }),
            [start, end] => Ok(Self::NewFile {
                start: parse_cli_date(start)?,
                end: parse_cli_date(end)?,
            }),
            _ => Err(ScrapeError::InvalidDate(dates.join(" "))),
        }
    }
}

/// Work resolved from a plan, ready to run against a portal.
#[derive(Debug)]
pub struct Job {
    /// Existing rows in update mode, empty for a new file.
    pub dataset: Dataset,
    pub periods: Vec<SearchPeriod>,
    /// Cases that were pending before this run.
    pub pending: Vec<String>,
    /// Whole range being scraped, if any.
    pub range: Option<SearchPeriod>,
}

impl Job {
    pub fn prepare(
        plan: RunPlan,
        dataset_path: &Path,
        max_span_days: u64,
        today: NaiveDate,
    ) -> Result<Self> {
        match plan {
            RunPlan::NewFile { start, end } => {
                let periods = split_date_range(start, end, max_span_days, today)?;
                if dataset_path.exists() {
                    warn!("{} exists and will be replaced", dataset_path.display());
                }
                Ok(Self {
                    dataset: Dataset::default(),
                    periods,
                    pending: Vec::new(),
                    range: Some(SearchPeriod::new(start, end)),
                })
            }
            RunPlan::Update { end } => {
                if end > today {
                    return Err(ScrapeError::FutureEnd { end, today });
                }
                let dataset = Dataset::load(dataset_path)?;
                let latest = dataset
                    .latest_filed_date()
                    .ok_or_else(|| ScrapeError::NoFiledDates(dataset_path.to_path_buf()))?;
                let start = latest + Days::new(1);
                let pending = dataset.pending_case_numbers();

                let (periods, range) = if start > end {
                    info!(
                        "Dataset already covers filings through {}; no new cases to scrape",
                        latest
                    );
                    (Vec::new(), None)
                } else {
                    (
                        split_date_range(start, end, max_span_days, today)?,
                        Some(SearchPeriod::new(start, end)),
                    )
                };

                Ok(Self {
                    dataset,
                    periods,
                    pending,
                    range,
                })
            }
        }
    }

    /// Whether running this job touches the portal at all.
    pub fn needs_portal(&self, check_dispositions: bool) -> bool {
        !self.periods.is_empty() || (check_dispositions && !self.pending.is_empty())
    }

    pub async fn run<P: CourtPortal + ?Sized>(
        self,
        portal: &mut P,
        settings: &RunSettings,
        events: Option<UnboundedSender<ScrapeEvent>>,
        today: NaiveDate,
    ) -> Result<JobReport> {
        let Job {
            mut dataset,
            periods,
            pending,
            range,
        } = self;

        let mut added = 0;
        let mut issues = IssuesTable::default();
        if !periods.is_empty() {
            let mut scraper =
                EvictionScraper::new(&mut *portal, settings.locators.clone(), settings.case_delay);
            if let Some(ref tx) = events {
                scraper = scraper.with_events(tx.clone());
            }
            let outcome = scraper.run(&periods).await?;
            issues = IssuesTable::new(outcome.issues);
            added = dataset.merge(Dataset::assemble(outcome.batches, today));
            info!("Added {} new cases", added);
        }

        let update = if settings.check_dispositions && !pending.is_empty() {
            let mut updater =
                DispositionUpdater::new(&mut *portal, settings.locators.clone(), settings.case_delay);
            if let Some(tx) = events {
                updater = updater.with_events(tx);
            }
            Some(updater.run(&mut dataset, &pending, today).await?)
        } else {
            None
        };

        Ok(JobReport {
            dataset,
            added,
            issues,
            range,
            update,
        })
    }
}

/// Knobs shared by the scraper and updater.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub locators: Locators,
    pub case_delay: Duration,
    pub check_dispositions: bool,
}

#[derive(Debug)]
pub struct JobReport {
    pub dataset: Dataset,
    pub added: usize,
    pub issues: IssuesTable,
    pub range: Option<SearchPeriod>,
    pub update: Option<UpdateSummary>,
}

impl JobReport {
    /// Write the dataset, and the issues file when any case failed.
    ///
    /// Returns the issues file path if one was written.
    pub fn write(
        &self,
        dataset_path: &Path,
        schema: SchemaVersion,
        issues_dir: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        self.dataset.save(dataset_path, schema)?;

        let Some(range) = self.range.filter(|_| !self.issues.is_empty()) else {
            return Ok(None);
        };
        let dir = issues_dir
            .map(Path::to_path_buf)
            .or_else(|| dataset_path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let path = dir.join(issues_file_name(range.start, range.end));
        self.issues.save(&path)?;
        warn!(
            "{} cases could not be scraped; see {}",
            self.issues.case_ids.len(),
            path.display()
        );
        Ok(Some(path))
    }
}
