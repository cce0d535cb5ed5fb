//! Account model
//!
//! Accounts are named by colon-delimited paths such as
//! `Expenses:Food:Groceries`. The first segment is the account-type tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, LedgerResult};

/// Separator between account name segments
pub const SEGMENT_SEPARATOR: char = ':';

/// Type of account, determined by the root segment of its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Income,
    Expense,
    Asset,
    Liability,
}

impl AccountType {
    /// Every account type, in report order
    pub const ALL: [AccountType; 4] = [
        AccountType::Income,
        AccountType::Expense,
        AccountType::Asset,
        AccountType::Liability,
    ];

    /// Root segments accepted for this type
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            Self::Income => &["Income"],
            Self::Expense => &["Expense", "Expenses"],
            Self::Asset => &["Asset", "Assets"],
            Self::Liability => &["Liability", "Liabilities"],
        }
    }

    /// Determine the type from a root segment
    pub fn from_root(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.tags().contains(&segment))
    }

    /// Determine the type from a full account name
    pub fn of_name(name: &str) -> Option<Self> {
        Self::from_root(root_segment(name))
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
            Self::Asset => write!(f, "Asset"),
            Self::Liability => write!(f, "Liability"),
        }
    }
}

/// First segment of an account name
pub fn root_segment(name: &str) -> &str {
    name.split(SEGMENT_SEPARATOR).next().unwrap_or(name)
}

/// Truncate an account name to its first `depth` segments
pub fn name_at_depth(name: &str, depth: usize) -> String {
    name.split(SEGMENT_SEPARATOR)
        .take(depth.max(1))
        .collect::<Vec<_>>()
        .join(":")
}

/// A ledger account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Full colon-delimited name, the primary key
    pub name: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account, validating its name
    pub fn new(name: impl Into<String>) -> LedgerResult<Self> {
        let account = Self {
            name: name.into(),
            created_at: Utc::now(),
        };
        account.validate()?;
        Ok(account)
    }

    /// Type of this account
    pub fn account_type(&self) -> Option<AccountType> {
        AccountType::of_name(&self.name)
    }

    /// Validate the account name
    pub fn validate(&self) -> LedgerResult<()> {
        validate_account_name(&self.name)
    }
}

/// Check that a name has non-empty segments and a known type root
pub fn validate_account_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".into(),
        ));
    }

    if name.split(SEGMENT_SEPARATOR).any(|seg| seg.trim().is_empty()) {
        return Err(LedgerError::Validation(format!(
            "Account name '{}' has an empty segment",
            name
        )));
    }

    if AccountType::of_name(name).is_none() {
        return Err(LedgerError::Validation(format!(
            "Account '{}' must start with one of Income, Expense(s), Asset(s), Liability/Liabilities",
            name
        )));
    }

    Ok(())
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_from_root() {
        assert_eq!(AccountType::from_root("Expenses"), Some(AccountType::Expense));
        assert_eq!(AccountType::from_root("Expense"), Some(AccountType::Expense));
        assert_eq!(AccountType::from_root("Liabilities"), Some(AccountType::Liability));
        assert_eq!(AccountType::from_root("Checking"), None);
        assert_eq!(
            AccountType::of_name("Assets:Bank:Checking"),
            Some(AccountType::Asset)
        );
    }

    #[test]
    fn test_new_account_validation() {
        assert!(Account::new("Expenses:Food").is_ok());
        assert!(Account::new("").unwrap_err().is_validation());
        assert!(Account::new("Expenses::Food").unwrap_err().is_validation());
        assert!(Account::new("Food:Groceries").unwrap_err().is_validation());
    }

    #[test]
    fn test_name_at_depth() {
        assert_eq!(name_at_depth("Expenses:Food:Groceries", 2), "Expenses:Food");
        assert_eq!(name_at_depth("Expenses:Food", 5), "Expenses:Food");
        assert_eq!(name_at_depth("Expenses:Food", 0), "Expenses");
    }
}
