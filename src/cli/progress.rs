//! Progress bars fed by scraper events.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::scrapers::ScrapeEvent;

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
        .map(|s| s.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Render events until every sender is dropped.
pub fn spawn(mut rx: UnboundedReceiver<ScrapeEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut bar: Option<ProgressBar> = None;

        while let Some(event) = rx.recv().await {
            match event {
                ScrapeEvent::PeriodStarted {
                    period,
                    total_cases,
                } => {
                    let pb = ProgressBar::new(total_cases as u64);
                    pb.set_style(bar_style());
                    pb.set_message(format!("Scraping {}", period));
                    bar = Some(pb);
                }
                ScrapeEvent::CaseScraped { case_number } => {
                    if let Some(ref pb) = bar {
                        pb.set_message(case_number);
                        pb.inc(1);
                    }
                }
                ScrapeEvent::CaseFailed { case_id, reason } => {
                    if let Some(ref pb) = bar {
                        pb.println(format!(
                            "  {} {} {}",
                            style("!").yellow(),
                            case_id.unwrap_or_default(),
                            style(reason).dim()
                        ));
                        pb.inc(1);
                    }
                }
                ScrapeEvent::PeriodFinished {
                    period,
                    scraped,
                    failed,
                } => {
                    if let Some(pb) = bar.take() {
                        pb.finish_and_clear();
                    }
                    let mark = if failed == 0 {
                        style("✓").green()
                    } else {
                        style("!").yellow()
                    };
                    println!(
                        "{} {}: {} cases, {} issues",
                        mark, period, scraped, failed
                    );
                }
                ScrapeEvent::UpdateStarted { total_cases } => {
                    let pb = ProgressBar::new(total_cases as u64);
                    pb.set_style(bar_style());
                    pb.set_message("Checking dispositions");
                    bar = Some(pb);
                }
                ScrapeEvent::DispositionChecked { case_number, .. } => {
                    if let Some(ref pb) = bar {
                        pb.set_message(case_number);
                        pb.inc(1);
                    }
                }
                ScrapeEvent::UpdateFinished => {
                    if let Some(pb) = bar.take() {
                        pb.finish_and_clear();
                    }
                }
            }
        }

        if let Some(pb) = bar.take() {
            pb.abandon();
        }
    })
}
