//! Budget repository
//!
//! Budgets get sequential numeric ids and are stored in budgets.json.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Budget, BudgetDefinition, BudgetId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_err;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    #[serde(default)]
    next_id: BudgetId,
    budgets: Vec<Budget>,
}

struct BudgetState {
    next_id: BudgetId,
    budgets: BTreeMap<BudgetId, Budget>,
}

/// Repository for budgets
pub struct BudgetRepository {
    path: PathBuf,
    data: RwLock<BudgetState>,
}

impl BudgetRepository {
    /// Create a new budget repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BudgetState {
                next_id: 1,
                budgets: BTreeMap::new(),
            }),
        }
    }

    /// Load budgets from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_err)?;
        data.budgets = file_data
            .budgets
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let highest = data.budgets.keys().next_back().copied().unwrap_or(0);
        data.next_id = file_data.next_id.max(highest + 1);
        Ok(())
    }

    /// Save budgets to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let file_data = BudgetData {
            next_id: data.next_id,
            budgets: data.budgets.values().cloned().collect(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Store a new budget, assigning it the next id
    pub fn create(&self, definition: BudgetDefinition) -> Result<Budget, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;

        let budget = Budget::from_definition(data.next_id, definition)?;
        data.next_id += 1;
        data.budgets.insert(budget.id, budget.clone());
        Ok(budget)
    }

    /// Get a budget by id
    pub fn get(&self, id: BudgetId) -> Result<Option<Budget>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.budgets.get(&id).cloned())
    }

    /// All budgets ordered by start date, then id
    pub fn get_all(&self) -> Result<Vec<Budget>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let mut budgets: Vec<_> = data.budgets.values().cloned().collect();
        budgets.sort_by_key(|b| (b.date_from, b.id));
        Ok(budgets)
    }

    /// Delete a budget
    pub fn delete(&self, id: BudgetId) -> Result<bool, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        Ok(data.budgets.remove(&id).is_some())
    }
}
