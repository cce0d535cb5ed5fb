//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions (with their embedded posts) to
//! transactions.json, and answers date-range queries over posts.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{DateRange, Post, RangePolicy, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_err;

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence with an account index
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: account name -> transaction ids with a post on that account
    by_account: RwLock<HashMap<String, Vec<TransactionId>>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_account: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build indexes
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_err)?;
        let mut by_account = self.by_account.write().map_err(lock_err)?;

        data.clear();
        by_account.clear();

        for txn in file_data.transactions {
            index_transaction(&mut by_account, &txn);
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Save transactions to disk, ordered by resolution date
    pub fn save(&self) -> Result<(), LedgerError> {
        let transactions = self.get_all()?;
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.get(&id).cloned())
    }

    /// Check if a transaction id is taken
    pub fn contains(&self, id: TransactionId) -> Result<bool, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.contains_key(&id))
    }

    /// Find transactions whose id starts with `prefix`
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Transaction>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data
            .values()
            .filter(|t| t.id.matches_prefix(prefix))
            .cloned()
            .collect())
    }

    /// Get all transactions ordered by resolution date, then occurrence
    pub fn get_all(&self) -> Result<Vec<Transaction>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        sort_for_display(&mut transactions);
        Ok(transactions)
    }

    /// Get transactions with a post on the given account
    pub fn get_by_account(&self, account: &str) -> Result<Vec<Transaction>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let by_account = self.by_account.read().map_err(lock_err)?;

        let ids = by_account.get(account).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut transactions: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        sort_for_display(&mut transactions);
        Ok(transactions)
    }

    /// Number of posts booked against an account
    pub fn count_posts_for_account(&self, account: &str) -> Result<usize, LedgerError> {
        Ok(self
            .get_by_account(account)?
            .iter()
            .flat_map(|t| &t.posts)
            .filter(|p| p.account == account)
            .count())
    }

    /// All posts that fall in `range` under `policy`
    pub fn get_posts_in_range(
        &self,
        range: DateRange,
        policy: RangePolicy,
    ) -> Result<Vec<Post>, LedgerError> {
        Ok(self
            .get_all()?
            .into_iter()
            .flat_map(|t| t.posts)
            .filter(|p| range.admits(p.date_occurred, p.date_resolved, policy))
            .collect())
    }

    /// Transactions with at least one post in `range` under `policy`
    pub fn get_in_range(
        &self,
        range: DateRange,
        policy: RangePolicy,
    ) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| {
                t.posts
                    .iter()
                    .any(|p| range.admits(p.date_occurred, p.date_resolved, policy))
            })
            .collect())
    }

    /// Insert a new transaction, failing if its id is taken
    pub fn insert(&self, txn: Transaction) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        let mut by_account = self.by_account.write().map_err(lock_err)?;

        if data.contains_key(&txn.id) {
            return Err(LedgerError::AlreadyExists {
                entity_type: "Transaction",
                identifier: txn.id.to_string(),
            });
        }

        index_transaction(&mut by_account, &txn);
        data.insert(txn.id, txn);
        Ok(())
    }

    /// Delete a transaction
    pub fn delete(&self, id: TransactionId) -> Result<bool, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        let mut by_account = self.by_account.write().map_err(lock_err)?;

        let Some(txn) = data.remove(&id) else {
            return Ok(false);
        };

        for post in &txn.posts {
            if let Some(ids) = by_account.get_mut(&post.account) {
                ids.retain(|&i| i != id);
            }
        }

        Ok(true)
    }

    /// Count transactions
    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.len())
    }
}

fn index_transaction(by_account: &mut HashMap<String, Vec<TransactionId>>, txn: &Transaction) {
    for post in &txn.posts {
        let ids = by_account.entry(post.account.clone()).or_default();
        if !ids.contains(&txn.id) {
            ids.push(txn.id);
        }
    }
}

fn sort_for_display(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        a.cmp_by_resolution(b)
            .then(a.min_date_occurred.cmp(&b.min_date_occurred))
            .then(a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, day).unwrap()
    }

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let repo = TransactionRepository::new(path);
        (temp_dir, repo)
    }

    fn txn(cents: i64, occurred: u32, resolved: Option<u32>) -> Transaction {
        Transaction::from_posts(
            TransactionId::new(),
            None,
            "test",
            vec![
                Post::new("Assets:Checking", Money::from_cents(-cents), d(occurred), resolved.map(d)),
                Post::new("Expenses:Food", Money::from_cents(cents), d(occurred), resolved.map(d)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        let t = txn(500, 2, Some(4));
        let id = t.id;
        repo.insert(t).unwrap();

        assert!(repo.contains(id).unwrap());
        assert_eq!(repo.get(id).unwrap().unwrap().posts.len(), 2);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let (_temp_dir, repo) = create_test_repo();
        let t = txn(500, 2, Some(4));
        repo.insert(t.clone()).unwrap();
        assert!(matches!(
            repo.insert(t),
            Err(LedgerError::AlreadyExists { .. })
        ));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_get_by_account_and_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let t = txn(500, 2, Some(4));
        let id = t.id;
        repo.insert(t).unwrap();
        repo.insert(txn(100, 3, Some(3))).unwrap();

        assert_eq!(repo.get_by_account("Expenses:Food").unwrap().len(), 2);
        assert_eq!(repo.count_posts_for_account("Assets:Checking").unwrap(), 2);

        assert!(repo.delete(id).unwrap());
        assert_eq!(repo.get_by_account("Expenses:Food").unwrap().len(), 1);
        assert!(!repo.delete(id).unwrap());
    }

    #[test]
    fn test_posts_in_range() {
        let (_temp_dir, repo) = create_test_repo();
        repo.insert(txn(500, 2, Some(4))).unwrap();
        repo.insert(txn(700, 10, None)).unwrap();

        let range = DateRange::new(d(1), d(12)).unwrap();
        let resolved = repo
            .get_posts_in_range(range, RangePolicy::ResolvedOnly)
            .unwrap();
        assert_eq!(resolved.len(), 2);

        let all = repo
            .get_posts_in_range(range, RangePolicy::IncludeNonResolved)
            .unwrap();
        assert_eq!(all.len(), 4);

        let early = DateRange::new(d(1), d(3)).unwrap();
        assert_eq!(repo.get_in_range(early, RangePolicy::ResolvedOnly).unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_reload_orders_pending_last() {
        let (temp_dir, repo) = create_test_repo();
        repo.insert(txn(700, 1, None)).unwrap();
        repo.insert(txn(500, 2, Some(9))).unwrap();
        repo.insert(txn(300, 2, Some(4))).unwrap();
        repo.save().unwrap();

        let repo2 = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo2.load().unwrap();

        let resolved: Vec<_> = repo2
            .get_all()
            .unwrap()
            .iter()
            .map(|t| t.max_date_resolved)
            .collect();
        assert_eq!(resolved, vec![Some(d(4)), Some(d(9)), None]);
    }
}
