//! Dataset assembly and CSV persistence.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};
use crate::models::{
    column, format_cli_date, non_blank, CaseRecord, Disposition, Party, SchemaVersion,
};

/// Date layouts accepted in the typed date columns.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Ordered collection of case records keyed by case number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<CaseRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<CaseRecord>) -> Self {
        Self { records }
    }

    /// Concatenate per-period buffers in order and stamp every row with `today`.
    pub fn assemble(batches: Vec<Vec<CaseRecord>>, today: NaiveDate) -> Self {
        let records = batches
            .into_iter()
            .flatten()
            .map(|mut record| {
                record.last_updated = Some(today);
                record
            })
            .collect();
        Self { records }
    }

    /// Read a dataset written in either schema.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ScrapeError::DatasetNotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader.headers()?.clone();
        let columns: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect();

        if !columns.contains_key(column::CASE_NUMBER) {
            return Err(ScrapeError::MalformedRow(format!(
                "{} has no '{}' column",
                path.display(),
                column::CASE_NUMBER
            )));
        }
        let split = columns.contains_key(column::DISPOSITION_DATE);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let get = |name: &str| {
                columns
                    .get(name)
                    .and_then(|&i| row.get(i))
                    .and_then(non_blank)
            };

            let Some(case_number) = get(column::CASE_NUMBER) else {
                continue;
            };

            let disposition = if split {
                Disposition::from_parts(get(column::DISPOSITION_DATE), get(column::DISPOSITION))
            } else {
                get(column::DISPOSITION).and_then(|text| Disposition::parse(&text))
            };

            records.push(CaseRecord {
                court: get(column::COURT),
                caption: get(column::CASE_CAPTION),
                judge: get(column::JUDGE),
                filed_date: get(column::FILED_DATE)
                    .map(|v| parse_date_cell(&v))
                    .transpose()?,
                case_type: get(column::CASE_TYPE),
                amount: get(column::AMOUNT),
                disposition,
                plaintiff: Party {
                    name: get(column::PLAINTIFF_NAME),
                    address: get(column::PLAINTIFF_ADDRESS),
                    attorney: get(column::PLAINTIFF_ATTORNEY),
                },
                defendant: Party {
                    name: get(column::DEFENDANT_NAME),
                    address: get(column::DEFENDANT_ADDRESS),
                    attorney: get(column::DEFENDANT_ATTORNEY),
                },
                last_updated: get(column::LAST_UPDATED)
                    .map(|v| parse_date_cell(&v))
                    .transpose()?,
                case_number,
            });
        }

        debug!(
            "Loaded {} records from {} ({} layout)",
            records.len(),
            path.display(),
            if split {
                SchemaVersion::Split
            } else {
                SchemaVersion::Combined
            }
        );
        Ok(Self { records })
    }

    pub fn save(&self, path: &Path, schema: SchemaVersion) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(schema.headers())?;
        for record in &self.records {
            writer.write_record(record.to_row(schema))?;
        }
        writer.flush()?;
        info!("Wrote {} records to {}", self.records.len(), path.display());
        Ok(())
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, case_number: &str) -> Option<&CaseRecord> {
        self.records.iter().find(|r| r.case_number == case_number)
    }

    pub fn get_mut(&mut self, case_number: &str) -> Option<&mut CaseRecord> {
        self.records.iter_mut().find(|r| r.case_number == case_number)
    }

    /// Case numbers with no recorded disposition, in file order.
    pub fn pending_case_numbers(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.is_pending())
            .map(|r| r.case_number.clone())
            .collect()
    }

    pub fn latest_filed_date(&self) -> Option<NaiveDate> {
        self.records.iter().filter_map(|r| r.filed_date).max()
    }

    /// Append records whose case number is not already present.
    ///
    /// Returns the number of records appended.
    pub fn merge(&mut self, other: Dataset) -> usize {
        let mut seen: HashSet<String> = self
            .records
            .iter()
            .map(|r| r.case_number.clone())
            .collect();
        let before = self.records.len();
        for record in other.records {
            if seen.insert(record.case_number.clone()) {
                self.records.push(record);
            } else {
                debug!("Skipping already known case {}", record.case_number);
            }
        }
        self.records.len() - before
    }

    /// Record the result of a disposition check.
    ///
    /// A found disposition replaces the missing one; either way the row is
    /// stamped with `today`. Returns `false` when the case is unknown.
    pub fn apply_disposition(
        &mut self,
        case_number: &str,
        disposition: Option<Disposition>,
        today: NaiveDate,
    ) -> bool {
        let Some(record) = self.get_mut(case_number) else {
            return false;
        };
        if disposition.is_some() {
            record.disposition = disposition;
        }
        record.last_updated = Some(today);
        true
    }
}

/// Identifiers of cases that could not be scraped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuesTable {
    pub case_ids: Vec<String>,
}

impl IssuesTable {
    pub const HEADER: &'static str = "case_id";

    pub fn new(case_ids: Vec<String>) -> Self {
        Self { case_ids }
    }

    pub fn is_empty(&self) -> bool {
        self.case_ids.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([Self::HEADER])?;
        for id in &self.case_ids {
            writer.write_record([id])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// `cases_w_issues_<mmddyyyy>-<mmddyyyy>.csv`
pub fn issues_file_name(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "cases_w_issues_{}-{}.csv",
        format_cli_date(start),
        format_cli_date(end)
    )
}

/// Parse a stored date, tolerating a trailing time component.
fn parse_date_cell(value: &str) -> Result<NaiveDate> {
    let day = value.split_whitespace().next().unwrap_or(value);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
        .ok_or_else(|| ScrapeError::MalformedRow(format!("unrecognised date '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(case: &str, filed: NaiveDate, disposition: &str) -> CaseRecord {
        let mut record = CaseRecord::new(case);
        record.court = Some("Municipal".into());
        record.filed_date = Some(filed);
        record.disposition = Disposition::parse(disposition);
        record.plaintiff.name = Some("LANDLORD LLC".into());
        record.defendant.name = Some("JANE DOE".into());
        record
    }

    #[test]
    fn assemble_concatenates_batches_and_stamps_today() {
        let today = date(2022, 6, 21);
        let dataset = Dataset::assemble(
            vec![
                vec![record("A1", date(2022, 6, 6), "")],
                vec![],
                vec![record("A2", date(2022, 6, 15), "")],
            ],
            today,
        );
        let numbers: Vec<_> = dataset.records().iter().map(|r| r.case_number.as_str()).collect();
        assert_eq!(numbers, vec!["A1", "A2"]);
        assert!(dataset.records().iter().all(|r| r.last_updated == Some(today)));
    }

    #[test]
    fn split_schema_survives_a_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evictions.csv");
        let dataset = Dataset::assemble(
            vec![vec![
                record("A1", date(2022, 6, 6), "06/30/2022 - DISMISSED"),
                record("A2", date(2022, 6, 7), ""),
            ]],
            date(2022, 7, 1),
        );

        dataset.save(&path, SchemaVersion::Split).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert!(header.starts_with("CASE NUMBER,COURT,"));
        assert!(header.ends_with(",LAST_UPDATED,DISPOSITION_DATE"));

        let loaded = Dataset::load(&path).unwrap();
        assert_eq!(loaded, dataset);
    }

    #[test]
    fn loads_combined_layout_with_slash_dates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.csv");
        std::fs::write(
            &path,
            "CASE NUMBER,COURT,FILED DATE,DISPOSITION,LAST_UPDATED\n\
             A1,Municipal,06/06/2022,06/30/2022 - DISMISSED,2022-07-01 00:00:00\n\
             A2,Municipal,2022-06-09,,07/01/2022\n",
        )
        .unwrap();

        let loaded = Dataset::load(&path).unwrap();
        let a1 = loaded.get("A1").unwrap();
        assert_eq!(a1.filed_date, Some(date(2022, 6, 6)));
        assert_eq!(a1.last_updated, Some(date(2022, 7, 1)));
        let disposition = a1.disposition.as_ref().unwrap();
        assert_eq!(disposition.date.as_deref(), Some("06/30/2022"));
        assert_eq!(disposition.status, "DISMISSED");

        assert_eq!(loaded.pending_case_numbers(), vec!["A2"]);
        assert_eq!(loaded.latest_filed_date(), Some(date(2022, 6, 9)));
    }

    #[test]
    fn combined_schema_writes_one_disposition_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let dataset = Dataset::from_records(vec![record(
            "A1",
            date(2022, 6, 6),
            "06/30/2022 - DISMISSED",
        )]);
        dataset.save(&path, SchemaVersion::Combined).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("DISPOSITION_DATE"));
        assert!(contents.contains("06/30/2022 - DISMISSED"));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.csv");
        assert!(matches!(
            Dataset::load(&path),
            Err(ScrapeError::DatasetNotFound(p)) if p == path
        ));
    }

    #[test]
    fn bad_date_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "CASE NUMBER,FILED DATE\nA1,sometime\n").unwrap();
        assert!(matches!(
            Dataset::load(&path),
            Err(ScrapeError::MalformedRow(_))
        ));
    }

    #[test]
    fn merge_keeps_existing_rows() {
        let mut existing = Dataset::from_records(vec![
            record("A1", date(2022, 6, 6), "06/30/2022 - DISMISSED"),
            record("A2", date(2022, 6, 7), ""),
        ]);
        let mut replacement = record("A1", date(2022, 6, 6), "");
        replacement.court = Some("Other".into());
        let fresh = Dataset::from_records(vec![replacement, record("A3", date(2022, 6, 20), "")]);

        assert_eq!(existing.merge(fresh), 1);
        assert_eq!(existing.len(), 3);
        let a1 = existing.get("A1").unwrap();
        assert_eq!(a1.court.as_deref(), Some("Municipal"));
        assert!(!a1.is_pending());
    }

    #[test]
    fn apply_disposition_never_clears_an_existing_one() {
        let mut dataset =
            Dataset::from_records(vec![record("A1", date(2022, 6, 6), "06/30/2022 - DISMISSED")]);
        assert!(dataset.apply_disposition("A1", None, date(2022, 7, 2)));
        let a1 = dataset.get("A1").unwrap();
        assert!(!a1.is_pending());
        assert_eq!(a1.last_updated, Some(date(2022, 7, 2)));
        assert!(!dataset.apply_disposition("ZZ", None, date(2022, 7, 2)));
    }

    #[test]
    fn issues_table_has_single_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(issues_file_name(date(2022, 6, 6), date(2022, 6, 20)));
        assert!(path.ends_with("cases_w_issues_06062022-06202022.csv"));

        IssuesTable::new(vec!["A2".into(), "https://portal.test/x".into()])
            .save(&path)
            .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "case_id\nA2\nhttps://portal.test/x\n");
    }
}
