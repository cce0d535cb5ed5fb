//! Budget service
//!
//! Budget definitions are imported from YAML and evaluated against the
//! ledger: for every item, the posts under the item's account prefix that
//! fall in the budget period are summed and compared with the target.

use std::path::Path;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::models::account::validate_account_name;
use crate::models::{Budget, BudgetDefinition, BudgetId, DateRange, Money, Post, RangePolicy};
use crate::storage::Storage;

/// Consumption of one budget item
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    /// Account name or prefix the item covers
    pub account: String,
    /// Sum of matching posts in the period
    pub consumed: Money,
    /// Budgeted amount
    pub target: Money,
}

impl BudgetProgress {
    /// `consumed / target`
    pub fn ratio(&self) -> LedgerResult<f64> {
        self.consumed
            .ratio(self.target)
            .ok_or_else(|| LedgerError::DivisionByZeroBudget(self.account.clone()))
    }
}

/// Evaluate every item of a budget against a set of posts
///
/// A post counts towards an item when its account starts with the item's
/// name and it falls in `range` under `policy`.
pub fn evaluate_progress(
    items: &IndexMap<String, Money>,
    posts: &[Post],
    range: DateRange,
    policy: RangePolicy,
) -> Vec<BudgetProgress> {
    let in_period: Vec<&Post> = posts
        .iter()
        .filter(|p| range.admits(p.date_occurred, p.date_resolved, policy))
        .collect();

    items
        .iter()
        .map(|(account, &target)| BudgetProgress {
            account: account.clone(),
            consumed: in_period
                .iter()
                .filter(|p| p.account.starts_with(account.as_str()))
                .map(|p| p.amount)
                .sum(),
            target,
        })
        .collect()
}

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Import a YAML budget definition
    pub fn import(&self, path: &Path) -> LedgerResult<Budget> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        self.create(BudgetDefinition::from_yaml(&text)?)
    }

    /// Store a budget definition
    pub fn create(&self, definition: BudgetDefinition) -> LedgerResult<Budget> {
        for name in definition.items.keys() {
            validate_account_name(name)?;
            if self.storage.accounts.get_by_prefix(name)?.is_empty() {
                warn!(item = %name, "no account matches budget item");
            }
        }

        let budget = self.storage.budgets.create(definition)?;
        self.storage.budgets.save()?;

        info!(id = budget.id, "added budget");
        Ok(budget)
    }

    /// Get a budget by id
    pub fn get(&self, id: BudgetId) -> LedgerResult<Budget> {
        self.storage
            .budgets
            .get(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))
    }

    /// All budgets ordered by start date
    pub fn list(&self) -> LedgerResult<Vec<Budget>> {
        self.storage.budgets.get_all()
    }

    /// Delete a budget
    pub fn delete(&self, id: BudgetId) -> LedgerResult<()> {
        if !self.storage.budgets.delete(id)? {
            return Err(LedgerError::budget_not_found(id.to_string()));
        }
        self.storage.budgets.save()?;

        info!(id, "deleted budget");
        Ok(())
    }

    /// Progress of every item of a budget
    pub fn progress(&self, id: BudgetId, policy: RangePolicy) -> LedgerResult<Vec<BudgetProgress>> {
        let budget = self.get(id)?;
        let posts = self.posts_for(&budget, policy)?;
        Ok(evaluate_progress(&budget.items, &posts, budget.range()?, policy))
    }

    /// Posts that fall in a budget's period
    pub fn posts_for(&self, budget: &Budget, policy: RangePolicy) -> LedgerResult<Vec<Post>> {
        self.storage
            .transactions
            .get_posts_in_range(budget.range()?, policy)
    }
}
