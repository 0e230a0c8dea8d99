//! Scripted portal for pipeline tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Locators;
use crate::error::{Result, ScrapeError};
use crate::models::{CaseLink, SearchPeriod};

use super::extract::extract_detail_case_number;
use super::CourtPortal;

/// What the portal does when a case is opened or looked up.
#[derive(Debug, Clone)]
pub enum PageScript {
    Page(String),
    Timeout { shown_case: Option<String> },
    Crash,
}

#[derive(Debug, Default)]
pub struct FakePortal {
    periods: Vec<(SearchPeriod, Vec<String>)>,
    pages: HashMap<String, PageScript>,
    shown: Option<String>,
    open: usize,
    opened: Vec<String>,
    looked_up: Vec<String>,
}

impl FakePortal {
    pub fn with_period(mut self, period: SearchPeriod, cases: &[&str]) -> Self {
        self.periods
            .push((period, cases.iter().map(|c| c.to_string()).collect()));
        self
    }

    pub fn script(&mut self, case: &str, script: PageScript) {
        self.pages.insert(case.to_string(), script);
    }

    pub fn open_views(&self) -> usize {
        self.open
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.clone()
    }

    pub fn looked_up(&self) -> Vec<String> {
        self.looked_up.clone()
    }

    fn play(&self, case: &str) -> (Result<String>, Option<String>) {
        match self.pages.get(case) {
            Some(PageScript::Page(html)) => (Ok(html.clone()), None),
            Some(PageScript::Timeout { shown_case }) => (
                Err(ScrapeError::Timeout {
                    selector: "#party_info_table".to_string(),
                    waited: Duration::from_secs(20),
                }),
                shown_case.clone(),
            ),
            Some(PageScript::Crash) | None => (
                Err(ScrapeError::Browser(format!("target closed while loading {}", case))),
                None,
            ),
        }
    }
}

#[async_trait]
impl CourtPortal for FakePortal {
    async fn search(&mut self, period: &SearchPeriod) -> Result<Vec<CaseLink>> {
        let cases = self
            .periods
            .iter()
            .find(|(p, _)| p == period)
            .map(|(_, cases)| cases.clone())
            .unwrap_or_default();
        Ok(cases
            .into_iter()
            .map(|case| CaseLink {
                action: format!("https://portal.test/summary/{}", case),
                method: "post".to_string(),
                fields: vec![("casenumber".to_string(), case.clone())],
                case_hint: Some(case),
            })
            .collect())
    }

    async fn open_case(&mut self, link: &CaseLink) -> Result<String> {
        let case = link.case_hint.clone().unwrap_or_default();
        self.open += 1;
        self.opened.push(case.clone());
        let (result, shown) = self.play(&case);
        self.shown = match &result {
            Ok(html) => extract_detail_case_number(html, &Locators::default())
                .ok()
                .flatten(),
            Err(_) => shown,
        };
        result
    }

    async fn recover_case_number(&mut self) -> Option<String> {
        self.shown.clone()
    }

    async fn close_case(&mut self) -> Result<()> {
        self.open = self.open.saturating_sub(1);
        self.shown = None;
        Ok(())
    }

    async fn lookup_case(&mut self, case_number: &str) -> Result<String> {
        self.looked_up.push(case_number.to_string());
        self.play(case_number).0
    }

    async fn close(&mut self) {}
}

/// Detail page with summary and party tables.
pub fn detail_page(case: &str, filed: &str, disposition: &str) -> String {
    format!(
        r#"<html><body>
        <table id="case_summary_table">
          <tr><td>Case Number:</td><td>{case}</td></tr>
          <tr><td>Court:</td><td>Municipal</td></tr>
          <tr><td>Filed Date:</td><td>{filed}</td></tr>
          <tr><td>Case Type:</td><td>Eviction</td></tr>
          <tr><td>Disposition:</td><td>{disposition}</td></tr>
        </table>
        <table id="party_info_table">
          <tr><td>LANDLORD {case}</td><td>1 MAIN ST</td><td>P 1</td></tr>
          <tr><td>TENANT {case}</td><td>2 ELM ST</td><td>D 1</td></tr>
        </table>
        </body></html>"#
    )
}
