//! The scrape command: new-file and update modes.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use console::style;

use crate::config::Config;
use crate::error::ScrapeError;
use crate::pipeline::{Job, RunPlan, RunSettings};
use crate::scrapers::{BrowserPortal, CourtPortal};

pub async fn cmd_scrape(
    config: &Config,
    dataset_path: &Path,
    dates: &[String],
    issues_dir: Option<&Path>,
    check_dispositions: bool,
) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let plan = RunPlan::from_args(dates, today)?;

    let job = match Job::prepare(plan, dataset_path, config.portal.max_span_days, today) {
        Err(e @ ScrapeError::DatasetNotFound(_)) => {
            return Err(e).context("Pass START and END dates to create a new dataset");
        }
        other => other?,
    };

    match plan {
        RunPlan::NewFile { start, end } => println!(
            "{} Building {} from filings {} to {} ({} searches)",
            style("→").cyan(),
            dataset_path.display(),
            start,
            end,
            job.periods.len()
        ),
        RunPlan::Update { .. } => match job.range {
            Some(range) => println!(
                "{} Updating {} with filings {} to {} ({} searches, {} pending cases)",
                style("→").cyan(),
                dataset_path.display(),
                range.start,
                range.end,
                job.periods.len(),
                job.pending.len()
            ),
            None => println!(
                "{} {} is already current ({} pending cases)",
                style("→").cyan(),
                dataset_path.display(),
                job.pending.len()
            ),
        },
    }

    if !job.needs_portal(check_dispositions) {
        println!("{} Nothing to do", style("✓").green());
        return Ok(());
    }

    let settings = RunSettings {
        locators: config.locators.clone(),
        case_delay: Duration::from_millis(config.portal.case_delay_ms),
        check_dispositions,
    };

    let mut portal = BrowserPortal::launch(
        &config.browser,
        config.portal.clone(),
        config.locators.clone(),
    )
    .await
    .context("Failed to start browser")?;

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let progress = super::progress::spawn(rx);

    let result = job.run(&mut portal, &settings, Some(tx), today).await;
    portal.close().await;
    let _ = progress.await;

    let report = result.context("Scrape aborted")?;
    let issues_path = report
        .write(dataset_path, config.portal.schema, issues_dir)
        .with_context(|| format!("Failed to write {}", dataset_path.display()))?;

    println!(
        "{} {} rows written to {} ({} new)",
        style("✓").green(),
        report.dataset.len(),
        dataset_path.display(),
        report.added
    );
    if let Some(update) = report.update {
        println!(
            "{} Dispositions: {} checked, {} newly disposed, {} still pending, {} failed",
            style("✓").green(),
            update.checked,
            update.updated,
            update.still_pending,
            update.failed
        );
    }
    if let Some(path) = issues_path {
        println!(
            "{} {} cases had issues; see {}",
            style("!").yellow(),
            report.issues.case_ids.len(),
            path.display()
        );
    }

    Ok(())
}
