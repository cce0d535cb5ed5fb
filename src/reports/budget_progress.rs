//! Budget progress report
//!
//! Flat form lists every budget item with its consumption, target and
//! progress. Tree form attributes each post to the longest budget item its
//! account falls under and renders the items as account trees, so nested
//! items do not count the same post twice. Only budgeted nodes show a
//! target and progress.

use indexmap::IndexMap;

use super::account_tree::AccountTree;
use crate::display::report::{format_header, format_money, format_ratio};
use crate::display::table::Table;
use crate::error::LedgerResult;
use crate::models::account::root_segment;
use crate::models::{format_date, Budget, DateRange, Money, Post, RangePolicy};
use crate::services::budget::{evaluate_progress, BudgetProgress};

/// Progress of one budget
#[derive(Debug, Clone)]
pub struct BudgetProgressReport {
    /// Budget being evaluated
    pub budget: Budget,
    /// Per-item progress in definition order
    pub items: Vec<BudgetProgress>,
    /// Item hierarchy with attributed consumption
    pub trees: Vec<AccountTree>,
}

impl BudgetProgressReport {
    /// Evaluate a budget against ledger posts
    pub fn generate(budget: Budget, posts: &[Post], policy: RangePolicy) -> LedgerResult<Self> {
        let range = budget.range()?;
        let items = evaluate_progress(&budget.items, posts, range, policy);
        let trees = build_trees(&budget.items, posts, range, policy)?;
        Ok(Self {
            budget,
            items,
            trees,
        })
    }

    fn title(&self) -> String {
        format_header(&format!(
            "Budget {}: {} to {}",
            self.budget.id,
            format_date(self.budget.date_from),
            format_date(self.budget.date_to)
        ))
    }

    /// Render the flat `account | consumed | budgeted | progress` table
    pub fn format_flat(&self, symbol: &str) -> String {
        let mut table = Table::new(["account", "consumed", "budgeted", "progress"])
            .align_right(&[1, 2, 3]);

        for item in &self.items {
            // Zero targets have no progress
            let progress = item.ratio().map(format_ratio).unwrap_or_default();
            table.push_row(vec![
                item.account.clone(),
                format_money(item.consumed, symbol),
                format_money(item.target, symbol),
                progress,
            ]);
        }

        format!("{}{}", self.title(), table.render())
    }

    /// Render the item hierarchy
    pub fn format_tree(&self, symbol: &str) -> String {
        let mut table = Table::new(["account", "consumed", "budgeted", "progress"])
            .align_right(&[1, 2, 3]);

        for tree in &self.trees {
            let rows = tree.rows(|node| {
                let consumed = format_money(node.amount(), symbol);
                match self.budget.items.get(&node.fullname()) {
                    Some(&target) => vec![
                        consumed,
                        format_money(target, symbol),
                        node.amount().ratio(target).map(format_ratio).unwrap_or_default(),
                    ],
                    None => vec![consumed],
                }
            });
            for row in rows {
                let mut cells = vec![row.label];
                cells.extend(row.columns);
                table.push_row(cells);
            }
        }

        format!("{}{}", self.title(), table.render())
    }
}

/// One tree per first segment of the item names
fn build_trees(
    items: &IndexMap<String, Money>,
    posts: &[Post],
    range: DateRange,
    policy: RangePolicy,
) -> LedgerResult<Vec<AccountTree>> {
    let mut trees: IndexMap<&str, AccountTree> = IndexMap::new();

    // Budgeted nodes exist even with nothing consumed
    for name in items.keys() {
        let root = root_segment(name);
        trees
            .entry(root)
            .or_insert_with(|| AccountTree::new(root))
            .add(name, Money::zero())?;
    }

    for post in posts {
        if !range.admits(post.date_occurred, post.date_resolved, policy) {
            continue;
        }
        let item = items
            .keys()
            .filter(|name| post.account.starts_with(name.as_str()))
            .max_by_key(|name| name.len());
        if let Some(name) = item {
            if let Some(tree) = trees.get_mut(root_segment(name)) {
                tree.add(name, post.amount)?;
            }
        }
    }

    Ok(trees.into_values().collect())
}
