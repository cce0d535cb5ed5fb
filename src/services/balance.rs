//! Balance snapshot service

use chrono::NaiveDate;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Balance, Money};
use crate::storage::Storage;

/// Service for per-account balance snapshots
pub struct BalanceService<'a> {
    storage: &'a Storage,
}

impl<'a> BalanceService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Set (or overwrite) the snapshot of an existing account
    pub fn set(&self, account: &str, amount: Money, date: NaiveDate) -> LedgerResult<Balance> {
        if !self.storage.accounts.exists(account)? {
            return Err(LedgerError::account_not_found(account));
        }

        let balance = Balance::new(account, amount, date);
        self.storage.balances.upsert(balance.clone())?;
        self.storage.balances.save()?;

        info!(account = %account, amount = %amount, "balance set");
        Ok(balance)
    }

    /// Current snapshot of an account
    pub fn get(&self, account: &str) -> LedgerResult<Balance> {
        self.storage
            .balances
            .get(account)?
            .ok_or_else(|| LedgerError::balance_not_found(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::Account;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage
            .accounts
            .insert(Account::new("Assets:Checking").unwrap())
            .unwrap();

        let service = BalanceService::new(&storage);
        let day = NaiveDate::from_ymd_opt(2019, 1, 31).unwrap();

        service.set("Assets:Checking", Money::from_cents(100), day).unwrap();
        service.set("Assets:Checking", Money::from_cents(-50), day).unwrap();
        assert_eq!(service.get("Assets:Checking").unwrap().amount, Money::from_cents(-50));

        assert!(service
            .set("Assets:Savings", Money::zero(), day)
            .unwrap_err()
            .is_not_found());
        assert!(service.get("Assets:Savings").unwrap_err().is_not_found());
    }
}
