//! Statement rows to balanced transactions
//!
//! Each classified row becomes a set of posts: the `this` split at `+amount`
//! and the counter split at `-amount`. Rows sharing a reference are grouped,
//! and within a group rows on the same date are merged into one transaction.
//! Rows without a reference always stand alone.
//!
//! Ids are derived from a stable key so importing the same statement twice
//! yields the same ids:
//!
//! - `"{date} {ref}"` when the row has a reference
//! - `"{date} {balance}"` when it has a statement balance
//! - `"{date}"` otherwise
//!
//! A key that repeats within one batch gets a `#n` suffix.

use std::collections::HashMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::debug;

use super::split::parse_split;
use super::statement::StatementRow;
use crate::error::{LedgerError, LedgerResult};
use crate::models::account::validate_account_name;
use crate::models::{format_date, Balance, Money, Post, Transaction, TransactionId};

/// Transactions built from one operating account's statement
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBatch {
    /// Operating account
    pub account: String,
    /// Latest statement balance seen in the rows
    pub balance: Option<Balance>,
    /// Balanced transactions ordered by resolution date
    pub transactions: Vec<Transaction>,
}

/// One row after parsing, with its 1-based position
#[derive(Debug, Clone)]
struct RowPosts {
    row: usize,
    reference: String,
    description: String,
    occurred: NaiveDate,
    resolved: Option<NaiveDate>,
    balance: Option<Money>,
    posts: Vec<Post>,
}

impl RowPosts {
    /// Date a row is filed under: resolved, or occurred while pending
    fn key_date(&self) -> NaiveDate {
        self.resolved.unwrap_or(self.occurred)
    }
}

/// Builds transactions for one operating account
pub struct TransactionBuilder {
    account: String,
}

impl TransactionBuilder {
    /// Create a builder for the given operating account
    pub fn new(account: impl Into<String>) -> LedgerResult<Self> {
        let account = account.into();
        validate_account_name(&account)?;
        Ok(Self { account })
    }

    /// Convert classified rows into balanced transactions
    ///
    /// Fails on the first bad row with an error naming its position.
    pub fn build(&self, rows: Vec<StatementRow>) -> LedgerResult<ImportBatch> {
        let parsed = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| self.parse_row(row).map_err(|e| e.at_row(index + 1)))
            .collect::<LedgerResult<Vec<_>>>()?;

        let balance = latest_balance(&parsed).map(|(amount, date)| {
            Balance::new(self.account.clone(), amount, date)
        });

        let mut keys = KeyAllocator::default();
        let mut transactions = Vec::new();
        for group in group_by_reference(parsed) {
            for merged in merge_same_date(group) {
                transactions.push(build_transaction(merged, &mut keys)?);
            }
        }

        // Stable: ties keep statement order
        transactions.sort_by(|a, b| a.cmp_by_resolution(b));

        debug!(
            account = %self.account,
            transactions = transactions.len(),
            "built transactions"
        );

        Ok(ImportBatch {
            account: self.account.clone(),
            balance,
            transactions,
        })
    }

    fn parse_row(&self, mut row: StatementRow) -> LedgerResult<RowPosts> {
        row.fix_value_date();

        let that = row.that();
        if that.is_empty() {
            return Err(LedgerError::Validation(format!(
                "Row '{}' has no counter-account, classify it first",
                row.description
            )));
        }

        let amount = row.amount()?;
        let occurred = row.occurred()?;
        let resolved = row.resolved()?;

        let this_split = parse_split(&row.this, amount)?;
        let that_split = parse_split(that, -amount)?;

        let mut posts = Vec::with_capacity(this_split.len() + that_split.len());
        for (target, part) in this_split.iter().chain(that_split.iter()) {
            let account = target.resolve(&self.account);
            validate_account_name(account)?;
            let post = Post::new(account, *part, occurred, resolved);
            post.validate()?;
            posts.push(post);
        }

        // Position is assigned when grouping
        Ok(RowPosts {
            row: 0,
            balance: row.balance()?,
            reference: row.reference,
            description: row.description,
            occurred,
            resolved,
            posts,
        })
    }
}

/// Split rows into reference groups in first-seen order; unreferenced rows
/// each form their own group
fn group_by_reference(rows: Vec<RowPosts>) -> Vec<Vec<RowPosts>> {
    let mut groups: Vec<Vec<RowPosts>> = Vec::new();
    let mut by_ref: HashMap<String, usize> = HashMap::new();

    for (index, mut row) in rows.into_iter().enumerate() {
        row.row = index + 1;
        if row.reference.is_empty() {
            groups.push(vec![row]);
            continue;
        }
        match by_ref.get(&row.reference) {
            Some(&slot) => groups[slot].push(row),
            None => {
                by_ref.insert(row.reference.clone(), groups.len());
                groups.push(vec![row]);
            }
        }
    }

    groups
}

/// Merge rows of one group that share a date
fn merge_same_date(group: Vec<RowPosts>) -> Vec<Vec<RowPosts>> {
    let mut by_date: IndexMap<NaiveDate, Vec<RowPosts>> = IndexMap::new();
    for row in group {
        by_date.entry(row.key_date()).or_default().push(row);
    }
    by_date.into_values().collect()
}

fn build_transaction(rows: Vec<RowPosts>, keys: &mut KeyAllocator) -> LedgerResult<Transaction> {
    let Some(first) = rows.first() else {
        return Err(LedgerError::Validation("Empty transaction group".into()));
    };
    let row = first.row;

    let date = format_date(first.key_date());
    let key = if !first.reference.is_empty() {
        format!("{} {}", date, first.reference)
    } else if let Some(balance) = first.balance {
        format!("{} {}", date, balance.to_decimal_string())
    } else {
        date
    };
    let key = keys.allocate(key);

    let reference = Some(first.reference.clone());
    let mut descriptions: Vec<&str> = Vec::new();
    for r in &rows {
        if !r.description.is_empty() && !descriptions.contains(&r.description.as_str()) {
            descriptions.push(&r.description);
        }
    }
    let description = descriptions.join("; ");

    let posts = rows.iter().flat_map(|r| r.posts.iter().cloned()).collect();

    Transaction::from_posts(TransactionId::from_key(&key), reference, description, posts)
        .map_err(|e| e.at_row(row))
}

/// Hands out unique id keys within one batch
#[derive(Default)]
pub(crate) struct KeyAllocator {
    seen: HashMap<String, usize>,
}

impl KeyAllocator {
    pub(crate) fn allocate(&mut self, key: String) -> String {
        let count = self.seen.entry(key.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            key
        } else {
            format!("{}#{}", key, count)
        }
    }
}

/// Balance of the latest resolved row that reports one; the first such row
/// wins a tie
fn latest_balance(rows: &[RowPosts]) -> Option<(Money, NaiveDate)> {
    let mut best: Option<(Money, NaiveDate)> = None;
    for row in rows {
        if let (Some(amount), Some(date)) = (row.balance, row.resolved) {
            if best.map_or(true, |(_, best_date)| date > best_date) {
                best = Some((amount, date));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::statement::read_rows;

    const ACCOUNT: &str = "Assets:Checking";

    fn build(csv: &str) -> LedgerResult<ImportBatch> {
        let rows = read_rows(csv.as_bytes()).unwrap();
        TransactionBuilder::new(ACCOUNT).unwrap().build(rows)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, day).unwrap()
    }

    #[test]
    fn test_single_row() {
        let batch = build("02/01/2019,03/01/2019,-12.50,Coffee,87.50,,Expenses:Food,,\n").unwrap();

        assert_eq!(batch.transactions.len(), 1);
        let txn = &batch.transactions[0];
        assert_eq!(txn.posts.len(), 2);
        assert_eq!(txn.posts[0].account, ACCOUNT);
        assert_eq!(txn.posts[0].amount, Money::from_cents(-1250));
        assert_eq!(txn.posts[1].account, "Expenses:Food");
        assert_eq!(txn.min_date_occurred, d(2));
        assert_eq!(txn.max_date_resolved, Some(d(3)));
        assert_eq!(txn.id, TransactionId::from_key("03/01/2019 87.50"));

        let balance = batch.balance.unwrap();
        assert_eq!(balance.amount, Money::from_cents(8750));
        assert_eq!(balance.date, d(3));
    }

    #[test]
    fn test_rows_sharing_reference_and_date_merge() {
        let batch = build(
            "01/01/2019,04/01/2019,-10.00,Part A,,,Expenses:Food,,R1\n\
             02/01/2019,04/01/2019,-5.00,Part B,,,Expenses:Home,,R1\n\
             02/01/2019,06/01/2019,-1.00,Fee,,,Expenses:Fees,,R1\n",
        )
        .unwrap();

        assert_eq!(batch.transactions.len(), 2);
        let merged = &batch.transactions[0];
        assert_eq!(merged.posts.len(), 4);
        assert_eq!(merged.description, "Part A; Part B");
        assert_eq!(merged.reference.as_deref(), Some("R1"));
        assert_eq!(merged.min_date_occurred, d(1));
        assert_eq!(merged.id, TransactionId::from_key("04/01/2019 R1"));
        assert!(merged.total().is_zero());

        assert_eq!(batch.transactions[1].id, TransactionId::from_key("06/01/2019 R1"));
    }

    #[test]
    fn test_unreferenced_rows_never_merge() {
        let batch = build(
            "01/01/2019,01/01/2019,-10.00,A,,,Expenses:Food,,\n\
             01/01/2019,01/01/2019,-10.00,B,,,Expenses:Food,,\n",
        )
        .unwrap();

        assert_eq!(batch.transactions.len(), 2);
        assert_eq!(batch.transactions[0].id, TransactionId::from_key("01/01/2019"));
        assert_eq!(batch.transactions[1].id, TransactionId::from_key("01/01/2019#2"));
        assert!(batch.balance.is_none());
    }

    #[test]
    fn test_ids_are_stable_across_builds() {
        let csv = "01/01/2019,02/01/2019,-3.00,X,10.00,,Expenses:Food,,\n\
                   05/01/2019,,-4.00,Y,,,Expenses:Food,,\n";
        let first: Vec<_> = build(csv).unwrap().transactions.iter().map(|t| t.id).collect();
        let second: Vec<_> = build(csv).unwrap().transactions.iter().map(|t| t.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sorted_by_resolution_with_pending_last() {
        let batch = build(
            "09/01/2019,,-1.00,Pending,,,Expenses:Food,,\n\
             05/01/2019,08/01/2019,-2.00,Later,,,Expenses:Food,,\n\
             01/01/2019,02/01/2019,-3.00,Earlier,,,Expenses:Food,,\n",
        )
        .unwrap();

        let descriptions: Vec<_> = batch
            .transactions
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["Earlier", "Later", "Pending"]);
    }

    #[test]
    fn test_structured_split() {
        let batch = build(
            "01/01/2019,01/01/2019,-30.00,Shop,,,\"{'Expenses:Food': 20, 'Expenses:Home': 10}\",,\n",
        )
        .unwrap();
        let accounts: Vec<_> = batch.transactions[0]
            .posts
            .iter()
            .map(|p| p.account.as_str())
            .collect();
        assert_eq!(accounts, vec![ACCOUNT, "Expenses:Food", "Expenses:Home"]);
    }

    #[test]
    fn test_bad_rows_are_row_indexed() {
        let unbalanced = build(
            "01/01/2019,01/01/2019,-1.00,Ok,,,Expenses:Food,,\n\
             01/01/2019,01/01/2019,-30.00,Shop,,,\"{'Expenses:Food': 20}\",,\n",
        )
        .unwrap_err();
        assert!(matches!(unbalanced, LedgerError::AtRow { row: 2, .. }));
        assert!(matches!(unbalanced.root(), LedgerError::UnbalancedSplit { .. }));

        let unclassified = build("01/01/2019,01/01/2019,-1.00,Mystery,,,,,\n").unwrap_err();
        assert!(unclassified.to_string().starts_with("row 1: Validation error"));

        let bad_account = build("01/01/2019,01/01/2019,-1.00,X,,,Food,,\n").unwrap_err();
        assert!(bad_account.root().is_validation());
    }
}
