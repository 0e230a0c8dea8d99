//! Browser-driven court portal.
//!
//! Uses chromiumoxide (CDP) to drive a real Chrome session: one long-lived
//! tab for searches and lookups, plus a short-lived tab per opened case.

#[cfg(feature = "browser")]
mod launch;
#[cfg(feature = "browser")]
mod page;
pub mod script;

#[cfg(feature = "browser")]
pub use portal::BrowserPortal;
#[cfg(not(feature = "browser"))]
pub use stub::BrowserPortal;

#[cfg(feature = "browser")]
impl From<chromiumoxide::error::CdpError> for crate::error::ScrapeError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(e.to_string())
    }
}

#[cfg(feature = "browser")]
mod portal {
    use std::time::Duration;

    use async_trait::async_trait;
    use chromiumoxide::{Browser, Page};
    use tokio::task::JoinHandle;
    use tracing::{debug, info, warn};

    use crate::config::{BrowserEngineConfig, Locators, PortalConfig};
    use crate::error::Result;
    use crate::models::{CaseLink, SearchPeriod};
    use crate::scrapers::extract::{extract_case_links, extract_detail_case_number};
    use crate::scrapers::CourtPortal;

    use super::launch;
    use super::page::{self, wait_for_element};
    use super::script;

    pub struct BrowserPortal {
        browser: Browser,
        handler: JoinHandle<()>,
        remote: bool,
        search_page: Option<Page>,
        case_page: Option<Page>,
        portal: PortalConfig,
        locators: Locators,
    }

    impl BrowserPortal {
        /// Launch Chrome, or attach to `browser.remote_url` when set.
        pub async fn launch(
            browser: &BrowserEngineConfig,
            portal: PortalConfig,
            locators: Locators,
        ) -> Result<Self> {
            let session = launch::start(browser).await?;
            Ok(Self {
                browser: session.browser,
                handler: session.handler,
                remote: session.remote,
                search_page: None,
                case_page: None,
                portal,
                locators,
            })
        }

        fn wait_timeout(&self) -> Duration {
            Duration::from_secs(self.portal.wait_timeout_secs)
        }

        fn settle_delay(&self) -> Duration {
            Duration::from_millis(self.portal.settle_delay_ms)
        }

        async fn search_page(&mut self) -> Result<Page> {
            if let Some(ref page) = self.search_page {
                return Ok(page.clone());
            }
            let page = self.browser.new_page("about:blank").await?;
            self.search_page = Some(page.clone());
            Ok(page)
        }
    }

    #[async_trait]
    impl CourtPortal for BrowserPortal {
        async fn search(&mut self, period: &SearchPeriod) -> Result<Vec<CaseLink>> {
            let page = self.search_page().await?;
            let timeout = self.wait_timeout();
            let locators = &self.locators;

            debug!("Searching {} on {}", period, self.portal.listing_url);
            page.goto(self.portal.listing_url.as_str()).await?;
            wait_for_element(&page, &locators.classification_select, timeout).await?;

            page::set_value(
                &page,
                &locators.classification_select,
                &self.portal.classification_code,
            )
            .await?;
            page::set_value(&page, &locators.begin_date_input, &period.form_start()).await?;
            page::set_value(&page, &locators.end_date_input, &period.form_end()).await?;

            page::click(&page, &locators.search_button, timeout).await?;
            if let Err(e) = page.wait_for_navigation().await {
                debug!("No navigation after search submit: {}", e);
            }

            if page::click_if_present(&page, &locators.show_all_button, timeout).await? {
                debug!("Expanded results to a single page");
            } else {
                debug!("No 'show all' control for {}; assuming a single page", period);
            }
            tokio::time::sleep(self.settle_delay()).await;

            let html = page.content().await?;
            let url = page::current_url(&page, &self.portal.listing_url).await?;
            extract_case_links(&html, &url, locators)
        }

        async fn open_case(&mut self, link: &CaseLink) -> Result<String> {
            let timeout = self.wait_timeout();
            let page = self.browser.new_page("about:blank").await?;
            self.case_page = Some(page.clone());

            page::evaluate(&page, script::submit_case_form(link)).await?;
            page::click(&page, &self.locators.party_tab, timeout).await?;
            wait_for_element(&page, &self.locators.summary_rows, timeout).await?;
            wait_for_element(&page, &self.locators.party_rows, timeout).await?;
            tokio::time::sleep(self.settle_delay()).await;

            Ok(page.content().await?)
        }

        async fn recover_case_number(&mut self) -> Option<String> {
            let page = self.case_page.as_ref()?;
            let html = page.content().await.ok()?;
            extract_detail_case_number(&html, &self.locators).ok().flatten()
        }

        async fn close_case(&mut self) -> Result<()> {
            if let Some(page) = self.case_page.take() {
                page.close().await?;
            }
            Ok(())
        }

        async fn lookup_case(&mut self, case_number: &str) -> Result<String> {
            let page = self.search_page().await?;
            let timeout = self.wait_timeout();
            let locators = &self.locators;

            page.goto(self.portal.case_search_url.as_str()).await?;
            wait_for_element(&page, &locators.case_number_input, timeout).await?;
            page::set_value(&page, &locators.case_number_input, case_number).await?;
            page::click(&page, &locators.case_search_button, timeout).await?;
            wait_for_element(&page, &locators.summary_rows, timeout).await?;
            tokio::time::sleep(self.settle_delay()).await;

            Ok(page.content().await?)
        }

        async fn close(&mut self) {
            if let Err(e) = self.close_case().await {
                debug!("Failed to close case tab: {}", e);
            }
            if let Some(page) = self.search_page.take() {
                if let Err(e) = page.close().await {
                    debug!("Failed to close search tab: {}", e);
                }
            }

            // An attached browser belongs to someone else; leave it running.
            if !self.remote {
                if let Err(e) = self.browser.close().await {
                    warn!("Failed to close browser: {}", e);
                }
                if let Err(e) = self.browser.wait().await {
                    debug!("Browser process did not exit cleanly: {}", e);
                }
            }
            self.handler.abort();
            info!("Browser session closed");
        }
    }
}

#[cfg(not(feature = "browser"))]
mod stub {
    use async_trait::async_trait;

    use crate::config::{BrowserEngineConfig, Locators, PortalConfig};
    use crate::error::{Result, ScrapeError};
    use crate::models::{CaseLink, SearchPeriod};
    use crate::scrapers::CourtPortal;

    /// Placeholder when built without the `browser` feature; never constructed.
    pub enum BrowserPortal {}

    impl BrowserPortal {
        pub async fn launch(
            _browser: &BrowserEngineConfig,
            _portal: PortalConfig,
            _locators: Locators,
        ) -> Result<Self> {
            Err(ScrapeError::Browser(
                "Browser support not compiled. Rebuild with: cargo build --features browser"
                    .to_string(),
            ))
        }
    }

    #[async_trait]
    impl CourtPortal for BrowserPortal {
        async fn search(&mut self, _period: &SearchPeriod) -> Result<Vec<CaseLink>> {
            match *self {}
        }

        async fn open_case(&mut self, _link: &CaseLink) -> Result<String> {
            match *self {}
        }

        async fn recover_case_number(&mut self) -> Option<String> {
            match *self {}
        }

        async fn close_case(&mut self) -> Result<()> {
            match *self {}
        }

        async fn lookup_case(&mut self, _case_number: &str) -> Result<String> {
            match *self {}
        }

        async fn close(&mut self) {
            match *self {}
        }
    }
}
