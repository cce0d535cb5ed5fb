//! Account summary report
//!
//! Sums posts into one `AccountTree` per account-type root and shows each
//! node's share of its parent.

use indexmap::IndexMap;
use tracing::warn;

use super::account_tree::AccountTree;
use crate::display::report::{format_money, format_ratio};
use crate::display::table::Table;
use crate::error::LedgerResult;
use crate::models::account::{name_at_depth, root_segment};
use crate::models::{AccountType, Post};

/// Summary of posts grouped by account hierarchy
#[derive(Debug, Clone)]
pub struct SummaryReport {
    /// One tree per root tag, income first, then expenses, assets, liabilities
    pub trees: Vec<AccountTree>,
}

impl SummaryReport {
    /// Build the report from posts, truncating accounts to `depth` segments
    pub fn generate(posts: &[Post], depth: Option<usize>) -> LedgerResult<Self> {
        let mut by_root: IndexMap<String, AccountTree> = IndexMap::new();

        for post in posts {
            let root = root_segment(&post.account);
            if AccountType::from_root(root).is_none() {
                warn!(account = %post.account, "skipping post on account without a type root");
                continue;
            }

            let name = match depth {
                Some(depth) => name_at_depth(&post.account, depth),
                None => post.account.clone(),
            };
            by_root
                .entry(root.to_string())
                .or_insert_with(|| AccountTree::new(root))
                .add(&name, post.amount)?;
        }

        let rank = |root: &str| {
            AccountType::from_root(root)
                .and_then(|t| AccountType::ALL.iter().position(|a| *a == t))
                .unwrap_or(usize::MAX)
        };
        by_root.sort_by(|a, _, b, _| rank(a).cmp(&rank(b)));

        Ok(Self {
            trees: by_root.into_values().collect(),
        })
    }

    /// Whether there is nothing to show
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Render as an `account | amount | % of parent` table
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut table = Table::new(["account", "amount", "% of parent"]).align_right(&[1, 2]);

        for tree in &self.trees {
            for row in tree.rows(|node| {
                let share = node
                    .parent()
                    .and_then(|parent| node.amount().ratio(parent.amount()))
                    .map(format_ratio)
                    .unwrap_or_default();
                vec![format_money(node.amount(), symbol), share]
            }) {
                let mut cells = vec![row.label];
                cells.extend(row.columns);
                table.push_row(cells);
            }
        }

        table.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;

    fn post(account: &str, cents: i64) -> Post {
        let day = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        Post::new(account, Money::from_cents(cents), day, Some(day))
    }

    fn posts() -> Vec<Post> {
        vec![
            post("Assets:Checking", -4000),
            post("Expenses:Food:Groceries", 3000),
            post("Expenses:Rent", 1000),
            post("Income:Salary", -5000),
            post("Assets:Savings", 5000),
        ]
    }

    #[test]
    fn test_trees_ordered_by_type() {
        let report = SummaryReport::generate(&posts(), None).unwrap();
        let roots: Vec<_> = report.trees.iter().map(|t| t.root().segment()).collect();
        assert_eq!(roots, vec!["Income", "Expenses", "Assets"]);
        assert_eq!(
            report.trees[1].get("Expenses:Food").unwrap().amount(),
            Money::from_cents(3000)
        );
    }

    #[test]
    fn test_depth_truncates_accounts() {
        let report = SummaryReport::generate(&posts(), Some(2)).unwrap();
        assert!(report.trees[1].get("Expenses:Food").is_some());
        assert!(report.trees[1].get("Expenses:Food:Groceries").is_none());
    }

    #[test]
    fn test_format_terminal() {
        let report = SummaryReport::generate(&posts()[1..3], None).unwrap();
        assert_eq!(
            report.format_terminal("$"),
            "account            amount  % of parent\n\
             -----------------  ------  -----------\n\
             Expenses           $40.00\n\
             ├── Food           $30.00       75.00%\n\
             │   └── Groceries  $30.00      100.00%\n\
             └── Rent           $10.00       25.00%\n"
        );
    }
}
