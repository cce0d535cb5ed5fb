//! Account service
//!
//! Provides business logic for account management: creation with name
//! validation, lookup and guarded deletion.

use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Balance};
use crate::storage::Storage;

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

/// An account with its computed fields
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub account: Account,
    /// Latest balance snapshot
    pub balance: Option<Balance>,
    /// Number of posts booked against the account
    pub post_count: usize,
}

impl<'a> AccountService<'a> {
    /// Create a new account service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account
    pub fn create(&self, name: &str) -> LedgerResult<Account> {
        let account = Account::new(name.trim())?;
        self.storage.accounts.insert(account.clone())?;
        self.storage.accounts.save()?;

        info!(account = %account.name, "created account");
        Ok(account)
    }

    /// Get an account by name
    pub fn get(&self, name: &str) -> LedgerResult<Account> {
        self.storage
            .accounts
            .get(name)?
            .ok_or_else(|| LedgerError::account_not_found(name))
    }

    /// All accounts, optionally only those under `prefix`
    pub fn list(&self, prefix: Option<&str>) -> LedgerResult<Vec<Account>> {
        match prefix {
            Some(prefix) => self.storage.accounts.get_by_prefix(prefix),
            None => self.storage.accounts.get_all(),
        }
    }

    /// Account with its balance snapshot and post count
    pub fn summary(&self, name: &str) -> LedgerResult<AccountSummary> {
        let account = self.get(name)?;
        Ok(AccountSummary {
            balance: self.storage.balances.get(&account.name)?,
            post_count: self.storage.transactions.count_posts_for_account(&account.name)?,
            account,
        })
    }

    /// Delete an account that no post refers to
    pub fn delete(&self, name: &str) -> LedgerResult<Account> {
        let account = self.get(name)?;

        let posts = self.storage.transactions.count_posts_for_account(name)?;
        if posts > 0 {
            return Err(LedgerError::Validation(format!(
                "Account '{}' has {} posts, delete its transactions first",
                name, posts
            )));
        }

        self.storage.accounts.delete(name)?;
        self.storage.balances.delete(name)?;
        self.storage.accounts.save()?;
        self.storage.balances.save()?;

        info!(account = %name, "deleted account");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Money, Post, Transaction, TransactionId};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_account() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);

        let account = service.create("Assets:Checking").unwrap();
        assert_eq!(account.name, "Assets:Checking");
        assert!(service.get("Assets:Checking").is_ok());
    }

    #[test]
    fn test_create_rejects_duplicates_and_bad_roots() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);

        service.create("Expenses:Food").unwrap();
        assert!(matches!(
            service.create("Expenses:Food"),
            Err(LedgerError::AlreadyExists { .. })
        ));
        assert!(service.create("Groceries").unwrap_err().is_validation());
    }

    #[test]
    fn test_get_missing() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        assert!(service.get("Assets:Nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_guarded_by_posts() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        service.create("Assets:Checking").unwrap();
        service.create("Expenses:Food").unwrap();
        service.create("Expenses:Rent").unwrap();

        let day = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let txn = Transaction::from_posts(
            TransactionId::new(),
            None,
            "Lunch",
            vec![
                Post::new("Assets:Checking", Money::from_cents(-500), day, Some(day)),
                Post::new("Expenses:Food", Money::from_cents(500), day, Some(day)),
            ],
        )
        .unwrap();
        storage.transactions.insert(txn).unwrap();

        assert!(service.delete("Expenses:Food").unwrap_err().is_validation());
        assert_eq!(service.summary("Expenses:Food").unwrap().post_count, 1);

        service.delete("Expenses:Rent").unwrap();
        assert!(service.get("Expenses:Rent").unwrap_err().is_not_found());
    }
}
