//! Bank statement rows
//!
//! A statement CSV has the columns
//! `date_occurred, date_resolved, amount, description, balance, this,
//! that_auto, that_overwrite, ref`. The header row is optional and short
//! rows are padded with empty cells.
//!
//! A raw bank export has only `date, amount, description, balance`;
//! [`prep_file`] turns it into a statement for one operating account.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::account::validate_account_name;
use crate::models::{parse_date, Money};
use crate::storage::write_atomic;

/// Column names, in file order
pub const FIELDS: [&str; 9] = [
    "date_occurred",
    "date_resolved",
    "amount",
    "description",
    "balance",
    "this",
    "that_auto",
    "that_overwrite",
    "ref",
];

const VALUE_DATE_MARKER: &str = "Value Date:";

/// Cells per row of a raw bank export
const RAW_COLUMNS: usize = 4;

/// One row of a bank statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    pub date_occurred: String,
    pub date_resolved: String,
    pub amount: String,
    pub description: String,
    pub balance: String,
    pub this: String,
    pub that_auto: String,
    pub that_overwrite: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

impl StatementRow {
    fn from_record(record: &csv::StringRecord) -> Self {
        let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        Self {
            date_occurred: cell(0),
            date_resolved: cell(1),
            amount: cell(2),
            description: cell(3),
            balance: cell(4),
            this: cell(5),
            that_auto: cell(6),
            that_overwrite: cell(7),
            reference: cell(8),
        }
    }

    /// The counter-account field in effect: a manual overwrite beats the
    /// classifier's guess
    pub fn that(&self) -> &str {
        if self.that_overwrite.is_empty() {
            &self.that_auto
        } else {
            &self.that_overwrite
        }
    }

    /// Set a column by name; `that` and `desc` are accepted as aliases
    pub fn set_field(&mut self, field: &str, value: &str) -> LedgerResult<()> {
        let slot = match field {
            "date_occurred" | "date" => &mut self.date_occurred,
            "date_resolved" => &mut self.date_resolved,
            "amount" => &mut self.amount,
            "description" | "desc" => &mut self.description,
            "balance" => &mut self.balance,
            "this" => &mut self.this,
            "that_auto" | "that" => &mut self.that_auto,
            "that_overwrite" => &mut self.that_overwrite,
            "ref" => &mut self.reference,
            other => {
                return Err(LedgerError::Validation(format!(
                    "Unknown statement field '{}'",
                    other
                )))
            }
        };
        *slot = value.to_string();
        Ok(())
    }

    /// Move a trailing "Value Date: DD/MM/YYYY" out of the description and
    /// into the occurred date
    pub fn fix_value_date(&mut self) {
        let Some(marker) = self.description.find(VALUE_DATE_MARKER) else {
            return;
        };

        let chars: Vec<char> = self.description.chars().collect();
        let tail_start = chars.len().saturating_sub(10);
        self.date_occurred = chars[tail_start..].iter().collect::<String>().trim().to_string();

        let cut = self.description[..marker].trim_end().len();
        self.description.truncate(cut);
    }

    /// Signed row amount
    pub fn amount(&self) -> LedgerResult<Money> {
        Money::parse(&self.amount)
            .map_err(|e| LedgerError::Validation(format!("Invalid amount '{}': {}", self.amount, e)))
    }

    /// Statement balance after this row, if the bank reported one
    pub fn balance(&self) -> LedgerResult<Option<Money>> {
        if self.balance.is_empty() {
            return Ok(None);
        }
        Money::parse(&self.balance)
            .map(Some)
            .map_err(|e| LedgerError::Validation(format!("Invalid balance '{}': {}", self.balance, e)))
    }

    /// Occurred date, falling back to the resolved date when blank
    pub fn occurred(&self) -> LedgerResult<NaiveDate> {
        if self.date_occurred.is_empty() {
            return parse_date(&self.date_resolved);
        }
        parse_date(&self.date_occurred)
    }

    /// Resolved date; blank means the row is still pending
    pub fn resolved(&self) -> LedgerResult<Option<NaiveDate>> {
        if self.date_resolved.is_empty() {
            return Ok(None);
        }
        parse_date(&self.date_resolved).map(Some)
    }
}

/// Read statement rows from any reader
pub fn read_rows<R: Read>(reader: R) -> LedgerResult<Vec<StatementRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        if index == 0 && record.get(0).map(str::trim) == Some(FIELDS[0]) {
            continue;
        }
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(StatementRow::from_record(&record));
    }

    Ok(rows)
}

/// Load statement rows from a CSV file
pub fn load_rows(path: &Path) -> LedgerResult<Vec<StatementRow>> {
    let file = std::fs::File::open(path)
        .map_err(|e| LedgerError::Io(format!("Failed to open {}: {}", path.display(), e)))?;
    read_rows(file)
}

/// Convert a raw bank export into statement rows
///
/// Each `date, amount, description, balance` row resolves on its date, is
/// booked against `account` and gets the value-date fix-up.
pub fn prep_rows<R: Read>(reader: R, account: &str) -> LedgerResult<Vec<StatementRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if record.len() != RAW_COLUMNS {
            return Err(LedgerError::Validation(format!(
                "Expected {} columns (date, amount, description, balance), found {}",
                RAW_COLUMNS,
                record.len()
            ))
            .at_row(index + 1));
        }

        let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        let mut row = StatementRow {
            date_occurred: cell(0),
            date_resolved: cell(0),
            amount: cell(1),
            description: cell(2),
            balance: cell(3),
            this: account.to_string(),
            ..Default::default()
        };
        row.fix_value_date();
        rows.push(row);
    }

    Ok(rows)
}

/// Rewrite a raw bank export in place as a statement CSV
pub fn prep_file(path: &Path, account: &str) -> LedgerResult<usize> {
    validate_account_name(account)?;
    let file = std::fs::File::open(path)
        .map_err(|e| LedgerError::Io(format!("Failed to open {}: {}", path.display(), e)))?;
    let rows = prep_rows(file, account)?;

    write_rows(path, &rows)?;
    info!(account = %account, rows = rows.len(), "prepared statement");
    Ok(rows.len())
}

/// Rewrite a statement CSV, header first
pub fn write_rows(path: &Path, rows: &[StatementRow]) -> LedgerResult<()> {
    write_atomic(path, |out| {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);
        writer.write_record(FIELDS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_with_and_without_header() {
        let with_header = "date_occurred,date_resolved,amount,description,balance,this,that_auto,that_overwrite,ref\n\
                           01/01/2019,02/01/2019,-5.00,Coffee,95.00,,,,\n";
        let without_header = "01/01/2019,02/01/2019,-5.00,Coffee,95.00\n";

        let a = read_rows(with_header.as_bytes()).unwrap();
        let b = read_rows(without_header.as_bytes()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].description, "Coffee");
        assert_eq!(a[0].reference, "");
    }

    #[test]
    fn test_value_date_fix_up() {
        let mut row = StatementRow {
            date_occurred: "05/01/2019".into(),
            description: "EFTPOS GROCER Value Date: 03/01/2019".into(),
            ..Default::default()
        };
        row.fix_value_date();
        assert_eq!(row.date_occurred, "03/01/2019");
        assert_eq!(row.description, "EFTPOS GROCER");

        // Second pass is a no-op
        row.fix_value_date();
        assert_eq!(row.description, "EFTPOS GROCER");
    }

    #[test]
    fn test_that_prefers_overwrite() {
        let mut row = StatementRow {
            that_auto: "Expenses:Food".into(),
            ..Default::default()
        };
        assert_eq!(row.that(), "Expenses:Food");
        row.set_field("that_overwrite", "Expenses:Rent").unwrap();
        assert_eq!(row.that(), "Expenses:Rent");
        assert!(row.set_field("colour", "red").unwrap_err().is_validation());
    }

    #[test]
    fn test_pending_row() {
        let row = StatementRow {
            date_occurred: "".into(),
            date_resolved: "".into(),
            ..Default::default()
        };
        assert_eq!(row.resolved().unwrap(), None);
        assert!(matches!(row.occurred(), Err(LedgerError::DateParse(_))));
    }

    #[test]
    fn test_prep_raw_export() {
        let raw = "02/01/2019,-5.00,Coffee Value Date: 01/01/2019,95.00\n\
                   \n\
                   03/01/2019,100.00,Salary,195.00\n";

        let rows = prep_rows(raw.as_bytes(), "Assets:Checking").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            StatementRow {
                date_occurred: "01/01/2019".into(),
                date_resolved: "02/01/2019".into(),
                amount: "-5.00".into(),
                description: "Coffee".into(),
                balance: "95.00".into(),
                this: "Assets:Checking".into(),
                ..Default::default()
            }
        );
        assert_eq!(rows[1].date_occurred, "03/01/2019");
        assert_eq!(rows[1].description, "Salary");
    }

    #[test]
    fn test_prep_rejects_wrong_column_count() {
        let prepared = "01/01/2019,02/01/2019,-5.00,Coffee,95.00,Assets:Checking,,,\n";
        let err = prep_rows(prepared.as_bytes(), "Assets:Checking").unwrap_err();
        assert!(matches!(err, LedgerError::AtRow { row: 1, .. }));
        assert!(err.to_string().contains("found 9"));
    }

    #[test]
    fn test_prep_file_rewrites_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("export.csv");
        std::fs::write(&path, "02/01/2019,-5.00,Coffee,95.00\n").unwrap();

        assert_eq!(prep_file(&path, "Assets:Checking").unwrap(), 1);
        let rows = load_rows(&path).unwrap();
        assert_eq!(rows[0].this, "Assets:Checking");
        assert_eq!(rows[0].balance, "95.00");

        assert!(prep_file(&path, "Checking").is_err());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("statement.csv");
        let rows = vec![StatementRow {
            date_occurred: "01/01/2019".into(),
            date_resolved: "01/01/2019".into(),
            amount: "-5".into(),
            description: "Split, with comma".into(),
            this: "{'__this__': -5}".into(),
            ..Default::default()
        }];

        write_rows(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("date_occurred,date_resolved,amount"));
        assert_eq!(load_rows(&path).unwrap(), rows);
    }
}
