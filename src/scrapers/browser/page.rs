//! Polling waits and small interactions on a CDP page.

use std::time::{Duration, Instant};

use chromiumoxide::element::Element;
use chromiumoxide::Page;
use tracing::debug;

use crate::error::{Result, ScrapeError};

use super::script;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Poll until `selector` matches, or fail with [`ScrapeError::Timeout`].
pub(crate) async fn wait_for_element(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<Element> {
    let started = Instant::now();
    loop {
        match page.find_element(selector).await {
            Ok(element) => return Ok(element),
            Err(e) if started.elapsed() < timeout => {
                debug!("Waiting for '{}': {}", selector, e);
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            Err(_) => {
                return Err(ScrapeError::Timeout {
                    selector: selector.to_string(),
                    waited: started.elapsed(),
                })
            }
        }
    }
}

pub(crate) async fn click(page: &Page, selector: &str, timeout: Duration) -> Result<()> {
    let element = wait_for_element(page, selector, timeout).await?;
    element.click().await?;
    Ok(())
}

/// Click `selector` if it shows up within `timeout`. Returns whether it did.
pub(crate) async fn click_if_present(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<bool> {
    match wait_for_element(page, selector, timeout).await {
        Ok(element) => {
            element.click().await?;
            Ok(true)
        }
        Err(ScrapeError::Timeout { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

pub(crate) async fn set_value(page: &Page, selector: &str, value: &str) -> Result<()> {
    let found: bool = page
        .evaluate(script::set_value(selector, value))
        .await?
        .into_value()
        .map_err(|e| ScrapeError::Browser(e.to_string()))?;
    if found {
        Ok(())
    } else {
        Err(ScrapeError::ElementNotFound(selector.to_string()))
    }
}

pub(crate) async fn evaluate(page: &Page, js: String) -> Result<()> {
    page.evaluate(js).await?;
    Ok(())
}

/// Current URL, falling back to `default` before the first navigation.
pub(crate) async fn current_url(page: &Page, default: &str) -> Result<String> {
    Ok(page.url().await?.unwrap_or_else(|| default.to_string()))
}
