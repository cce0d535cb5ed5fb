//! Transaction model
//!
//! A transaction is a balanced group of posts: every post moves a signed
//! amount into one account, and the amounts of a transaction sum to zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::date::{ddmmyyyy, ddmmyyyy_option};
use super::ids::TransactionId;
use super::money::Money;
use crate::error::{LedgerError, LedgerResult};

/// One signed leg of a transaction against a single account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Full account name
    pub account: String,

    /// Signed amount
    pub amount: Money,

    /// When the underlying event happened
    #[serde(with = "ddmmyyyy")]
    pub date_occurred: NaiveDate,

    /// When the post settled on a statement; `None` while pending
    #[serde(with = "ddmmyyyy_option", default)]
    pub date_resolved: Option<NaiveDate>,
}

impl Post {
    /// Create a new post
    pub fn new(
        account: impl Into<String>,
        amount: Money,
        date_occurred: NaiveDate,
        date_resolved: Option<NaiveDate>,
    ) -> Self {
        Self {
            account: account.into(),
            amount,
            date_occurred,
            date_resolved,
        }
    }

    /// Whether the post has not settled yet
    pub fn is_pending(&self) -> bool {
        self.date_resolved.is_none()
    }

    /// Validate date ordering
    pub fn validate(&self) -> LedgerResult<()> {
        if let Some(resolved) = self.date_resolved {
            if resolved < self.date_occurred {
                return Err(LedgerError::Validation(format!(
                    "Post to '{}' resolves on {} before it occurs on {}",
                    self.account,
                    super::date::format_date(resolved),
                    super::date::format_date(self.date_occurred)
                )));
            }
        }
        Ok(())
    }
}

/// A balanced group of posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// External reference from the statement, if any
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Earliest occurred date across posts
    #[serde(with = "ddmmyyyy")]
    pub min_date_occurred: NaiveDate,

    /// Latest resolved date across posts; `None` while any post is pending
    #[serde(with = "ddmmyyyy_option", default)]
    pub max_date_resolved: Option<NaiveDate>,

    /// Ordered posts
    pub posts: Vec<Post>,
}

impl Transaction {
    /// Build a transaction from posts, deriving its dates and validating it
    pub fn from_posts(
        id: TransactionId,
        reference: Option<String>,
        description: impl Into<String>,
        posts: Vec<Post>,
    ) -> LedgerResult<Self> {
        let min_date_occurred = posts
            .iter()
            .map(|p| p.date_occurred)
            .min()
            .ok_or_else(|| {
                LedgerError::Validation(format!("Transaction {} has no posts", id))
            })?;

        let max_date_resolved = if posts.iter().any(Post::is_pending) {
            None
        } else {
            posts.iter().filter_map(|p| p.date_resolved).max()
        };

        let txn = Self {
            id,
            reference: reference.filter(|r| !r.is_empty()),
            description: description.into(),
            min_date_occurred,
            max_date_resolved,
            posts,
        };
        txn.validate()?;
        Ok(txn)
    }

    /// Sum of all post amounts
    pub fn total(&self) -> Money {
        self.posts.iter().map(|p| p.amount).sum()
    }

    /// Validate the transaction
    ///
    /// A transaction needs at least two posts whose amounts sum to zero.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.posts.len() < 2 {
            return Err(LedgerError::Validation(format!(
                "Transaction {} needs at least 2 posts, has {}",
                self.id,
                self.posts.len()
            )));
        }

        for post in &self.posts {
            post.validate()?;
        }

        let total = self.total();
        if !total.is_zero() {
            return Err(LedgerError::UnbalancedTransaction {
                id: self.id.to_string(),
                sum: total.to_string(),
            });
        }

        Ok(())
    }

    /// Ordering by resolution date, pending transactions last
    pub fn cmp_by_resolution(&self, other: &Self) -> Ordering {
        match (self.max_date_resolved, other.max_date_resolved) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, day).unwrap()
    }

    fn post(account: &str, cents: i64, occurred: u32, resolved: Option<u32>) -> Post {
        Post::new(account, Money::from_cents(cents), d(occurred), resolved.map(d))
    }

    #[test]
    fn test_from_posts_derives_dates() {
        let txn = Transaction::from_posts(
            TransactionId::new(),
            Some("REF1".into()),
            "Groceries",
            vec![
                post("Assets:Checking", -2300, 3, Some(8)),
                post("Expenses:Food", 2300, 2, Some(6)),
            ],
        )
        .unwrap();

        assert_eq!(txn.min_date_occurred, d(2));
        assert_eq!(txn.max_date_resolved, Some(d(8)));
        assert!(txn.total().is_zero());
    }

    #[test]
    fn test_pending_post_leaves_transaction_unresolved() {
        let txn = Transaction::from_posts(
            TransactionId::new(),
            None,
            "",
            vec![
                post("Assets:Checking", -100, 3, None),
                post("Expenses:Food", 100, 3, Some(4)),
            ],
        )
        .unwrap();
        assert_eq!(txn.max_date_resolved, None);
    }

    #[test]
    fn test_unbalanced_rejected() {
        let err = Transaction::from_posts(
            TransactionId::new(),
            None,
            "",
            vec![
                post("Assets:Checking", -100, 3, Some(3)),
                post("Expenses:Food", 99, 3, Some(3)),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::UnbalancedTransaction { .. }));
    }

    #[test]
    fn test_single_post_rejected() {
        let err = Transaction::from_posts(
            TransactionId::new(),
            None,
            "",
            vec![post("Assets:Checking", 0, 3, Some(3))],
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_resolved_before_occurred_rejected() {
        let err = Transaction::from_posts(
            TransactionId::new(),
            None,
            "",
            vec![
                post("Assets:Checking", -100, 5, Some(3)),
                post("Expenses:Food", 100, 3, Some(3)),
            ],
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_empty_reference_dropped() {
        let txn = Transaction::from_posts(
            TransactionId::new(),
            Some(String::new()),
            "",
            vec![
                post("Assets:Checking", -100, 3, Some(3)),
                post("Expenses:Food", 100, 3, Some(3)),
            ],
        )
        .unwrap();
        assert!(txn.reference.is_none());

        let json = serde_json::to_value(&txn).unwrap();
        assert!(json.get("ref").is_none());
        assert_eq!(json["min_date_occurred"], "03/01/2019");
    }
}
