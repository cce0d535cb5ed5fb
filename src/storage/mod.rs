//! Storage layer for ledgerbook
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. Each entity kind lives in its own file under the data directory.

pub mod accounts;
pub mod balances;
pub mod budgets;
pub mod file_io;
pub mod transactions;

pub use accounts::AccountRepository;
pub use balances::BalanceRepository;
pub use budgets::BudgetRepository;
pub use file_io::{read_json, write_atomic, write_json_atomic};
pub use transactions::TransactionRepository;

use std::sync::PoisonError;

use crate::config::paths::LedgerPaths;
use crate::error::LedgerError;

/// Map a poisoned lock into a storage error
pub(crate) fn lock_err<T>(e: PoisonError<T>) -> LedgerError {
    LedgerError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub accounts: AccountRepository,
    pub transactions: TransactionRepository,
    pub balances: BalanceRepository,
    pub budgets: BudgetRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            accounts: AccountRepository::new(paths.accounts_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            balances: BalanceRepository::new(paths.balances_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), LedgerError> {
        self.accounts.load()?;
        self.transactions.load()?;
        self.balances.load()?;
        self.budgets.load()?;
        Ok(())
    }
}
