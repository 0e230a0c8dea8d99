//! Case record model.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Separator between the disposition date and status on the portal.
const DISPOSITION_SEPARATOR: &str = " - ";

/// Column layout of the dataset file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    /// Single `DISPOSITION` column holding `"<date> - <status>"`.
    Combined,
    /// `DISPOSITION_DATE` and `DISPOSITION` in separate columns.
    #[default]
    Split,
}

impl SchemaVersion {
    /// Column headers in file order.
    pub fn headers(self) -> Vec<&'static str> {
        let mut headers = vec![
            column::CASE_NUMBER,
            column::COURT,
            column::CASE_CAPTION,
            column::JUDGE,
            column::FILED_DATE,
            column::CASE_TYPE,
            column::AMOUNT,
            column::DISPOSITION,
            column::PLAINTIFF_NAME,
            column::PLAINTIFF_ADDRESS,
            column::DEFENDANT_ATTORNEY,
            column::DEFENDANT_NAME,
            column::DEFENDANT_ADDRESS,
            column::PLAINTIFF_ATTORNEY,
            column::LAST_UPDATED,
        ];
        if self == Self::Split {
            headers.push(column::DISPOSITION_DATE);
        }
        headers
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combined => write!(f, "combined"),
            Self::Split => write!(f, "split"),
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "combined" | "v1" => Ok(Self::Combined),
            "split" | "v2" => Ok(Self::Split),
            _ => Err(format!(
                "Invalid schema '{}'. Valid options: combined, split",
                s
            )),
        }
    }
}

/// Dataset column names.
pub mod column {
    pub const CASE_NUMBER: &str = "CASE NUMBER";
    pub const COURT: &str = "COURT";
    pub const CASE_CAPTION: &str = "CASE CAPTION";
    pub const JUDGE: &str = "JUDGE";
    pub const FILED_DATE: &str = "FILED DATE";
    pub const CASE_TYPE: &str = "CASE TYPE";
    pub const AMOUNT: &str = "AMOUNT";
    pub const DISPOSITION: &str = "DISPOSITION";
    pub const PLAINTIFF_NAME: &str = "PLAINTIFF NAME";
    pub const PLAINTIFF_ADDRESS: &str = "PLAINTIFF ADDRESS";
    pub const DEFENDANT_ATTORNEY: &str = "DEFENDANT_ATTORNEY";
    pub const DEFENDANT_NAME: &str = "DEFENDANT NAME";
    pub const DEFENDANT_ADDRESS: &str = "DEFENDANT ADDRESS";
    pub const PLAINTIFF_ATTORNEY: &str = "PLAINTIFF_ATTORNEY";
    pub const LAST_UPDATED: &str = "LAST_UPDATED";
    pub const DISPOSITION_DATE: &str = "DISPOSITION_DATE";
}

/// Court's ruling on a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    /// Date portion, kept as the portal renders it.
    pub date: Option<String>,
    pub status: String,
}

impl Disposition {
    /// Parse `"<date> - <status>"`. Returns `None` for blank text.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match text.split_once(DISPOSITION_SEPARATOR) {
            Some((date, status)) => Some(Self {
                date: non_blank(date),
                status: status.trim().to_string(),
            }),
            None => Some(Self {
                date: None,
                status: text.to_string(),
            }),
        }
    }

    /// Build from separate date and status columns.
    pub fn from_parts(date: Option<String>, status: Option<String>) -> Option<Self> {
        match (date, status) {
            (None, None) => None,
            (date, status) => Some(Self {
                date,
                status: status.unwrap_or_default(),
            }),
        }
    }

    /// Render in the portal's combined form.
    pub fn combined(&self) -> String {
        match &self.date {
            Some(date) if self.status.is_empty() => date.clone(),
            Some(date) => format!("{}{}{}", date, DISPOSITION_SEPARATOR, self.status),
            None => self.status.clone(),
        }
    }
}

/// Name, address and attorney of one side of a case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Party {
    pub name: Option<String>,
    pub address: Option<String>,
    pub attorney: Option<String>,
}

/// One eviction filing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseRecord {
    pub case_number: String,
    pub court: Option<String>,
    pub caption: Option<String>,
    pub judge: Option<String>,
    pub filed_date: Option<NaiveDate>,
    pub case_type: Option<String>,
    pub amount: Option<String>,
    pub disposition: Option<Disposition>,
    pub plaintiff: Party,
    pub defendant: Party,
    pub last_updated: Option<NaiveDate>,
}

impl CaseRecord {
    pub fn new(case_number: impl Into<String>) -> Self {
        Self {
            case_number: case_number.into(),
            ..Default::default()
        }
    }

    /// A case is pending until the court records a disposition.
    pub fn is_pending(&self) -> bool {
        self.disposition.is_none()
    }

    /// Row values in the column order of `schema.headers()`.
    pub fn to_row(&self, schema: SchemaVersion) -> Vec<String> {
        let disposition = match (schema, &self.disposition) {
            (_, None) => String::new(),
            (SchemaVersion::Combined, Some(d)) => d.combined(),
            (SchemaVersion::Split, Some(d)) => d.status.clone(),
        };

        let mut row = vec![
            self.case_number.clone(),
            cell(&self.court),
            cell(&self.caption),
            cell(&self.judge),
            date_cell(self.filed_date),
            cell(&self.case_type),
            cell(&self.amount),
            disposition,
            cell(&self.plaintiff.name),
            cell(&self.plaintiff.address),
            cell(&self.defendant.attorney),
            cell(&self.defendant.name),
            cell(&self.defendant.address),
            cell(&self.plaintiff.attorney),
            date_cell(self.last_updated),
        ];
        if schema == SchemaVersion::Split {
            row.push(
                self.disposition
                    .as_ref()
                    .and_then(|d| d.date.clone())
                    .unwrap_or_default(),
            );
        }
        row
    }
}

/// Trim a value, mapping blank text to `None`.
pub fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn date_cell(value: Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_disposition_on_first_separator() {
        let d = Disposition::parse(" 06/15/2022 - JUDGMENT FOR PLAINTIFF - RESTITUTION ").unwrap();
        assert_eq!(d.date.as_deref(), Some("06/15/2022"));
        assert_eq!(d.status, "JUDGMENT FOR PLAINTIFF - RESTITUTION");
    }

    #[test]
    fn disposition_without_separator_is_status_only() {
        let d = Disposition::parse("DISMISSED").unwrap();
        assert_eq!(d.date, None);
        assert_eq!(d.status, "DISMISSED");
        assert_eq!(d.combined(), "DISMISSED");
    }

    #[test]
    fn blank_disposition_is_pending() {
        assert_eq!(Disposition::parse("   "), None);
        assert_eq!(Disposition::from_parts(None, None), None);
        assert!(CaseRecord::new("A1111111").is_pending());
    }

    #[test]
    fn combined_form_restores_portal_text() {
        let d = Disposition::parse("06/15/2022 - DISMISSED").unwrap();
        assert_eq!(d.combined(), "06/15/2022 - DISMISSED");
    }

    #[test]
    fn rows_follow_schema_headers() {
        let mut record = CaseRecord::new("A2200001");
        record.filed_date = NaiveDate::from_ymd_opt(2022, 6, 6);
        record.disposition = Disposition::parse("06/15/2022 - DISMISSED");
        record.plaintiff.attorney = Some("SMITH".into());

        for schema in [SchemaVersion::Split, SchemaVersion::Combined] {
            let headers = schema.headers();
            let row = record.to_row(schema);
            assert_eq!(headers.len(), row.len());

            let value = |name: &str| row[headers.iter().position(|h| *h == name).unwrap()].clone();
            assert_eq!(value(column::CASE_NUMBER), "A2200001");
            assert_eq!(value(column::FILED_DATE), "2022-06-06");
            assert_eq!(value(column::PLAINTIFF_ATTORNEY), "SMITH");
            assert_eq!(value(column::DEFENDANT_ATTORNEY), "");
        }

        let split = record.to_row(SchemaVersion::Split);
        assert_eq!(split[7], "DISMISSED");
        assert_eq!(split.last().unwrap(), "06/15/2022");
        assert_eq!(record.to_row(SchemaVersion::Combined)[7], "06/15/2022 - DISMISSED");
    }

    #[test]
    fn schema_from_str() {
        assert_eq!("split".parse::<SchemaVersion>(), Ok(SchemaVersion::Split));
        assert_eq!("Combined".parse::<SchemaVersion>(), Ok(SchemaVersion::Combined));
        assert!("wide".parse::<SchemaVersion>().is_err());
    }
}
