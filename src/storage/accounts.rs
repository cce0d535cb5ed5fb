//! Account repository for JSON storage
//!
//! Manages loading and saving accounts to accounts.json

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::Account;

use super::file_io::{read_json, write_json_atomic};
use super::lock_err;

/// Serializable account data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AccountData {
    accounts: Vec<Account>,
}

/// Repository for account persistence, keyed by account name
pub struct AccountRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<String, Account>>,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load accounts from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: AccountData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_err)?;
        data.clear();
        for account in file_data.accounts {
            data.insert(account.name.clone(), account);
        }

        Ok(())
    }

    /// Save accounts to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self.data.read().map_err(lock_err)?;

        let file_data = AccountData {
            accounts: data.values().cloned().collect(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get an account by name
    pub fn get(&self, name: &str) -> Result<Option<Account>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.get(name).cloned())
    }

    /// Check if an account exists
    pub fn exists(&self, name: &str) -> Result<bool, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.contains_key(name))
    }

    /// Get all accounts, sorted by name
    pub fn get_all(&self) -> Result<Vec<Account>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.values().cloned().collect())
    }

    /// Get accounts whose name starts with `prefix`
    pub fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Account>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data
            .values()
            .filter(|a| a.name.starts_with(prefix))
            .cloned()
            .collect())
    }

    /// Insert a new account, failing if the name is taken
    pub fn insert(&self, account: Account) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;

        if data.contains_key(&account.name) {
            return Err(LedgerError::AlreadyExists {
                entity_type: "Account",
                identifier: account.name,
            });
        }
        data.insert(account.name.clone(), account);
        Ok(())
    }

    /// Delete an account
    pub fn delete(&self, name: &str) -> Result<bool, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        Ok(data.remove(name).is_some())
    }

    /// Count accounts
    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.len())
    }
}
