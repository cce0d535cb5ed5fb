//! Balance snapshot repository
//!
//! One live snapshot per account, stored in balances.json.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::Balance;

use super::file_io::{read_json, write_json_atomic};
use super::lock_err;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BalanceData {
    balances: Vec<Balance>,
}

/// Repository for balance snapshots, keyed by account name
pub struct BalanceRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<String, Balance>>,
}

impl BalanceRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: BalanceData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_err)?;
        data.clear();
        for balance in file_data.balances {
            data.insert(balance.account.clone(), balance);
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let file_data = BalanceData {
            balances: data.values().cloned().collect(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get(&self, account: &str) -> Result<Option<Balance>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.get(account).cloned())
    }

    pub fn get_all(&self) -> Result<Vec<Balance>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.values().cloned().collect())
    }

    /// Insert or overwrite the snapshot of an account
    pub fn upsert(&self, balance: Balance) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        data.insert(balance.account.clone(), balance);
        Ok(())
    }

    pub fn delete(&self, account: &str) -> Result<bool, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        Ok(data.remove(account).is_some())
    }
}
