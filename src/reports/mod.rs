//! Reports module for ledgerbook
//!
//! Account summaries and budget progress, both rendered through the
//! hierarchical account tree.

pub mod account_tree;
pub mod budget_progress;
pub mod summary;

pub use account_tree::{AccountTree, NodeId, NodeRef, TreeRow};
pub use budget_progress::BudgetProgressReport;
pub use summary::SummaryReport;
