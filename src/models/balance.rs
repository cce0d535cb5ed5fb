//! Balance snapshot model
//!
//! The statement balance of an account at the end of a given day. There is
//! at most one live snapshot per account; setting it again overwrites it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::date::ddmmyyyy;
use super::money::Money;

/// End-of-day balance of one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Account the snapshot belongs to (primary key)
    pub account: String,

    /// Balance amount
    pub amount: Money,

    /// Day the balance was observed (end of day)
    #[serde(with = "ddmmyyyy")]
    pub date: NaiveDate,
}

impl Balance {
    /// Create a new balance snapshot
    pub fn new(account: impl Into<String>, amount: Money, date: NaiveDate) -> Self {
        Self {
            account: account.into(),
            amount,
            date,
        }
    }
}
