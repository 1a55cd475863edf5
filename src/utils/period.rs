use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Calendar quarter of a posting date, labelled "1T".."4T".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    #[serde(rename = "1T")]
    First,
    #[serde(rename = "2T")]
    Second,
    #[serde(rename = "3T")]
    Third,
    #[serde(rename = "4T")]
    Fourth,
}

impl Quarter {
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            1..=3 => Some(Quarter::First),
            4..=6 => Some(Quarter::Second),
            7..=9 => Some(Quarter::Third),
            10..=12 => Some(Quarter::Fourth),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quarter::First => "1T",
            Quarter::Second => "2T",
            Quarter::Third => "3T",
            Quarter::Fourth => "4T",
        }
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parse a posting date in any of the layouts found in the quarterly extracts.
pub fn parse_posting_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Derive (year, quarter) from a posting date string; `None` when the date is unparseable.
pub fn derive_period(raw: &str) -> Option<(i32, Quarter)> {
    let date = parse_posting_date(raw)?;
    Quarter::from_month(date.month()).map(|q| (date.year(), q))
}
