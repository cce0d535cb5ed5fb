//! Calendar dates and reporting periods
//!
//! All dates are exchanged as `DD/MM/YYYY`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, LedgerResult};

/// The one date format used in files, flags and output
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `DD/MM/YYYY` date
pub fn parse_date(s: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| LedgerError::DateParse(s.to_string()))
}

/// Format a date as `DD/MM/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `MM/YYYY` month into the range covering the whole month
pub fn parse_month(s: &str) -> LedgerResult<DateRange> {
    let first = NaiveDate::parse_from_str(&format!("01/{}", s.trim()), DATE_FORMAT)
        .map_err(|_| LedgerError::DateParse(s.to_string()))?;
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| LedgerError::DateParse(s.to_string()))?;
    DateRange::new(first, last)
}

/// Serde helper for `DD/MM/YYYY` dates
pub mod ddmmyyyy {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s).map_err(de::Error::custom)
    }
}

/// Serde helper for optional `DD/MM/YYYY` dates (`null` or empty string is `None`)
pub mod ddmmyyyy_option {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_some(&super::format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => super::parse_date(&s)
                .map(Some)
                .map_err(de::Error::custom),
            _ => Ok(None),
        }
    }
}

/// Which posts count as belonging to a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Post occurred by the end of the range and resolved no earlier than its start
    #[default]
    ResolvedOnly,
    /// As `ResolvedOnly`, but pending posts that occurred by the end also count
    IncludeNonResolved,
}

impl RangePolicy {
    /// Pick the policy from an "include non-resolved" flag
    pub fn from_flag(include_nonresolved: bool) -> Self {
        if include_nonresolved {
            Self::IncludeNonResolved
        } else {
            Self::ResolvedOnly
        }
    }
}

/// An inclusive date range `[from, to]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `from > to`
    pub fn new(from: NaiveDate, to: NaiveDate) -> LedgerResult<Self> {
        if from > to {
            return Err(LedgerError::Validation(format!(
                "Date range start {} is after its end {}",
                format_date(from),
                format_date(to)
            )));
        }
        Ok(Self { from, to })
    }

    /// Whether a post with the given dates falls in this range under `policy`
    pub fn admits(
        &self,
        occurred: NaiveDate,
        resolved: Option<NaiveDate>,
        policy: RangePolicy,
    ) -> bool {
        if occurred > self.to {
            return false;
        }
        match (resolved, policy) {
            (Some(resolved), _) => resolved >= self.from,
            (None, RangePolicy::IncludeNonResolved) => true,
            (None, RangePolicy::ResolvedOnly) => false,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", format_date(self.from), format_date(self.to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_and_format() {
        assert_eq!(parse_date("03/01/2019").unwrap(), d(2019, 1, 3));
        assert_eq!(format_date(d(2019, 1, 3)), "03/01/2019");
        assert!(matches!(
            parse_date("2019-01-03"),
            Err(LedgerError::DateParse(_))
        ));
    }

    #[test]
    fn test_parse_month() {
        let range = parse_month("02/2020").unwrap();
        assert_eq!(range.from, d(2020, 2, 1));
        assert_eq!(range.to, d(2020, 2, 29));

        let december = parse_month("12/2019").unwrap();
        assert_eq!(december.to, d(2019, 12, 31));
    }

    #[test]
    fn test_range_rejects_inverted() {
        assert!(DateRange::new(d(2019, 2, 1), d(2019, 1, 1)).is_err());
    }

    #[test]
    fn test_resolved_only_membership() {
        // Post occurred 02/01 and resolved 04/01
        let occurred = d(2019, 1, 2);
        let resolved = Some(d(2019, 1, 4));
        let policy = RangePolicy::ResolvedOnly;

        let admits = |from, to| {
            DateRange::new(from, to)
                .unwrap()
                .admits(occurred, resolved, policy)
        };

        assert!(admits(d(2019, 1, 1), d(2019, 1, 5)));
        assert!(admits(d(2019, 1, 2), d(2019, 1, 4)));
        assert!(admits(d(2019, 1, 4), d(2019, 1, 4)));
        assert!(admits(d(2019, 1, 2), d(2019, 1, 2)));
        assert!(!admits(d(2019, 1, 5), d(2019, 1, 9)));
        assert!(!admits(d(2018, 12, 1), d(2019, 1, 1)));
    }

    #[test]
    fn test_pending_posts_need_include_nonresolved() {
        let range = DateRange::new(d(2019, 1, 1), d(2019, 1, 31)).unwrap();
        let occurred = d(2019, 1, 20);

        assert!(!range.admits(occurred, None, RangePolicy::ResolvedOnly));
        assert!(range.admits(occurred, None, RangePolicy::IncludeNonResolved));
        assert!(!range.admits(d(2019, 2, 1), None, RangePolicy::IncludeNonResolved));
    }

    #[test]
    fn test_option_serde() {
        #[derive(Serialize, Deserialize)]
        struct Row {
            #[serde(with = "ddmmyyyy_option", default)]
            date: Option<NaiveDate>,
        }

        let row: Row = serde_json::from_str(r#"{"date": "08/01/2019"}"#).unwrap();
        assert_eq!(row.date, Some(d(2019, 1, 8)));
        let row: Row = serde_json::from_str(r#"{"date": null}"#).unwrap();
        assert_eq!(row.date, None);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"date":null}"#);
    }
}
