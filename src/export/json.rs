//! Transaction exchange format
//!
//! The JSON file written by `csv to-json` and accepted by
//! `transaction import`:
//!
//! ```json
//! {
//!   "account": "Assets:Checking",
//!   "balance": { "date": "31/01/2019", "balance": 1234.56 },
//!   "transactions": [
//!     {
//!       "id": "…",
//!       "min_date_occurred": "02/01/2019",
//!       "max_date_resolved": "03/01/2019",
//!       "description": "Coffee",
//!       "ref": "",
//!       "posts": [
//!         { "account": "Assets:Checking", "amount": -4.5,
//!           "date_occurred": "02/01/2019", "date_resolved": "03/01/2019" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Amounts are decimal numbers. `id` may be omitted, in which case it is
//! derived from the transaction's date and reference or description.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::date::{ddmmyyyy, ddmmyyyy_option};
use crate::models::money::decimal;
use crate::models::{format_date, Balance, Money, Post, Transaction, TransactionId};
use crate::services::builder::{ImportBatch, KeyAllocator};
use crate::storage::write_json_atomic;

/// Top-level exchange document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeFile {
    pub account: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<ExchangeBalance>,

    #[serde(default)]
    pub transactions: Vec<ExchangeTransaction>,
}

/// Statement balance snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeBalance {
    #[serde(with = "ddmmyyyy")]
    pub date: NaiveDate,

    #[serde(with = "decimal")]
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TransactionId>,

    #[serde(with = "ddmmyyyy")]
    pub min_date_occurred: NaiveDate,

    #[serde(with = "ddmmyyyy_option", default)]
    pub max_date_resolved: Option<NaiveDate>,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "ref", default)]
    pub reference: String,

    pub posts: Vec<ExchangePost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangePost {
    pub account: String,

    #[serde(with = "decimal")]
    pub amount: Money,

    #[serde(with = "ddmmyyyy")]
    pub date_occurred: NaiveDate,

    #[serde(with = "ddmmyyyy_option", default)]
    pub date_resolved: Option<NaiveDate>,
}

impl ExchangeFile {
    /// Convert a built batch into its exchange form
    pub fn from_batch(batch: &ImportBatch) -> Self {
        Self {
            account: batch.account.clone(),
            balance: batch.balance.as_ref().map(|b| ExchangeBalance {
                date: b.date,
                balance: b.amount,
            }),
            transactions: batch.transactions.iter().map(ExchangeTransaction::from).collect(),
        }
    }

    /// Validate the document and turn it into an import batch
    ///
    /// Errors name the 1-based position of the offending transaction.
    pub fn into_batch(self) -> LedgerResult<ImportBatch> {
        let mut keys = KeyAllocator::default();

        let transactions = self
            .transactions
            .into_iter()
            .enumerate()
            .map(|(index, txn)| txn.into_transaction(&mut keys).map_err(|e| e.at_row(index + 1)))
            .collect::<LedgerResult<Vec<_>>>()?;

        let balance = self
            .balance
            .map(|b| Balance::new(self.account.clone(), b.balance, b.date));

        Ok(ImportBatch {
            account: self.account,
            balance,
            transactions,
        })
    }

    /// Read an exchange file
    pub fn load(path: &Path) -> LedgerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write an exchange file atomically
    pub fn save(&self, path: &Path) -> LedgerResult<()> {
        write_json_atomic(path, self)
    }
}

impl From<&Transaction> for ExchangeTransaction {
    fn from(txn: &Transaction) -> Self {
        Self {
            id: Some(txn.id),
            min_date_occurred: txn.min_date_occurred,
            max_date_resolved: txn.max_date_resolved,
            description: txn.description.clone(),
            reference: txn.reference.clone().unwrap_or_default(),
            posts: txn
                .posts
                .iter()
                .map(|p| ExchangePost {
                    account: p.account.clone(),
                    amount: p.amount,
                    date_occurred: p.date_occurred,
                    date_resolved: p.date_resolved,
                })
                .collect(),
        }
    }
}

impl ExchangeTransaction {
    fn into_transaction(self, keys: &mut KeyAllocator) -> LedgerResult<Transaction> {
        let id = match self.id {
            Some(id) => id,
            None => {
                let date = format_date(self.max_date_resolved.unwrap_or(self.min_date_occurred));
                let tail = if self.reference.is_empty() {
                    &self.description
                } else {
                    &self.reference
                };
                TransactionId::from_key(&keys.allocate(format!("{} {}", date, tail)))
            }
        };

        let posts = self
            .posts
            .into_iter()
            .map(|p| {
                crate::models::account::validate_account_name(&p.account)?;
                Ok(Post::new(p.account, p.amount, p.date_occurred, p.date_resolved))
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        Transaction::from_posts(id, Some(self.reference), self.description, posts)
    }
}
