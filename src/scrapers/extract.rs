//! Field extraction from rendered portal pages.
//!
//! The browser hands over page HTML; everything here is synchronous parsing
//! with `scraper`, so it runs the same against live pages and fixtures.

use std::collections::HashSet;

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::config::Locators;
use crate::error::{Result, ScrapeError};
use crate::models::{column, non_blank, CaseLink, CaseRecord, Disposition, Party};

/// Date formats the portal uses for the filed date.
const FILED_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// Marker of the first plaintiff in the party table.
const FIRST_PLAINTIFF: &str = "P 1";

/// Marker of the first defendant in the party table.
const FIRST_DEFENDANT: &str = "D 1";

/// Split a `LABEL: value` line on its first colon.
///
/// The whole line is upper-cased; label and value are trimmed.
pub fn parse_label_value(text: &str) -> Result<(String, String)> {
    let upper = text.to_uppercase();
    let (label, value) = upper
        .split_once(':')
        .ok_or_else(|| ScrapeError::MalformedRow(text.trim().to_string()))?;
    Ok((label.trim().to_string(), value.trim().to_string()))
}

/// Text content of an element with whitespace runs collapsed to one space.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| ScrapeError::InvalidSelector(css.to_string()))
}

/// Label/value pairs of the case summary table, in row order.
///
/// Blank rows are ignored; any other row without a colon is malformed.
pub fn extract_summary(html: &str, locators: &Locators) -> Result<Vec<(String, String)>> {
    let rows = selector(&locators.summary_rows)?;
    let document = Html::parse_document(html);

    let mut fields = Vec::new();
    for row in document.select(&rows) {
        let text = element_text(row);
        if text.is_empty() {
            continue;
        }
        fields.push(parse_label_value(&text)?);
    }
    Ok(fields)
}

/// Plaintiff and defendant from the party contact table.
///
/// Cells are name, address, party marker and an optional attorney. Rows with
/// fewer than three cells or an unrecognised marker are skipped.
pub fn extract_parties(html: &str, locators: &Locators) -> Result<(Party, Party)> {
    let rows = selector(&locators.party_rows)?;
    let document = Html::parse_document(html);

    let mut plaintiff = Party::default();
    let mut defendant = Party::default();
    let mut defendant_seen = false;

    for row in document.select(&rows) {
        let cells: Vec<String> = row
            .children()
            .filter_map(ElementRef::wrap)
            .map(element_text)
            .collect();
        if cells.len() < 3 {
            debug!("Skipping party row with {} cells", cells.len());
            continue;
        }

        let marker = cells[2].as_str();
        let party = if marker == FIRST_PLAINTIFF {
            &mut plaintiff
        } else if marker == FIRST_DEFENDANT || (marker.contains('D') && !defendant_seen) {
            defendant_seen = true;
            &mut defendant
        } else {
            debug!("Skipping party row with marker '{}'", marker);
            continue;
        };

        party.name = non_blank(&cells[0]);
        party.address = non_blank(&cells[1]);
        party.attorney = cells.get(3).and_then(|a| non_blank(a));
    }

    Ok((plaintiff, defendant))
}

fn parse_filed_date(value: &str) -> Result<Option<NaiveDate>> {
    if value.is_empty() {
        return Ok(None);
    }
    FILED_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(Some)
        .ok_or_else(|| ScrapeError::MalformedRow(format!("{}: {}", column::FILED_DATE, value)))
}

/// Build a case record from a detail page showing both tables.
pub fn extract_case_record(html: &str, locators: &Locators) -> Result<CaseRecord> {
    let summary = extract_summary(html, locators)?;
    let mut record = CaseRecord::default();

    for (label, value) in summary {
        match label.as_str() {
            column::CASE_NUMBER => record.case_number = value,
            column::COURT => record.court = non_blank(&value),
            column::CASE_CAPTION => record.caption = non_blank(&value),
            column::JUDGE => record.judge = non_blank(&value),
            column::FILED_DATE => record.filed_date = parse_filed_date(&value)?,
            column::CASE_TYPE => record.case_type = non_blank(&value),
            column::AMOUNT => record.amount = non_blank(&value),
            column::DISPOSITION => record.disposition = Disposition::parse(&value),
            other => debug!("Ignoring summary field '{}'", other),
        }
    }

    if record.case_number.is_empty() {
        return Err(ScrapeError::MalformedRow(format!(
            "summary table has no {}",
            column::CASE_NUMBER
        )));
    }

    let (plaintiff, defendant) = extract_parties(html, locators)?;
    record.plaintiff = plaintiff;
    record.defendant = defendant;

    Ok(record)
}

/// Disposition from a case summary page, if the court has recorded one.
pub fn extract_disposition(html: &str, locators: &Locators) -> Result<Option<Disposition>> {
    let summary = extract_summary(html, locators)?;
    Ok(summary
        .into_iter()
        .find(|(label, _)| label == column::DISPOSITION)
        .and_then(|(_, value)| Disposition::parse(&value)))
}

/// Case-summary links from an expanded results page.
///
/// Each form is attributed to its nearest enclosing result row, whose case
/// cell supplies the hint.
pub fn extract_case_links(html: &str, page_url: &str, locators: &Locators) -> Result<Vec<CaseLink>> {
    let rows = selector(&locators.result_rows)?;
    let link = selector(&locators.result_link)?;
    let case_cell = selector(&locators.result_case_cell)?;
    let inputs = selector("input[name]")?;
    let base = Url::parse(page_url)
        .map_err(|e| ScrapeError::Browser(format!("Invalid page URL '{}': {}", page_url, e)))?;

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for row in document.select(&rows) {
        for form in row.select(&link) {
            let owner = form
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "tr");
            if owner.map(|tr| tr.id()) != Some(row.id()) || !seen.insert(form.id()) {
                continue;
            }

            let action = form.value().attr("action").unwrap_or_default();
            let action = base
                .join(action)
                .map_err(|e| ScrapeError::Browser(format!("Invalid form action '{}': {}", action, e)))?;
            let method = form
                .value()
                .attr("method")
                .unwrap_or("get")
                .to_lowercase();
            let fields = form
                .select(&inputs)
                .filter_map(|input| {
                    let name = input.value().attr("name")?;
                    let value = input.value().attr("value").unwrap_or_default();
                    Some((name.to_string(), value.to_string()))
                })
                .collect();
            let case_hint = row
                .select(&case_cell)
                .next()
                .and_then(|cell| non_blank(&element_text(cell)));

            links.push(CaseLink {
                action: action.to_string(),
                method,
                fields,
                case_hint,
            });
        }
    }

    Ok(links)
}

/// Case number from the detail page's header cell.
pub fn extract_detail_case_number(html: &str, locators: &Locators) -> Result<Option<String>> {
    let cell = selector(&locators.detail_case_number)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&cell)
        .next()
        .and_then(|el| non_blank(&element_text(el))))
}
