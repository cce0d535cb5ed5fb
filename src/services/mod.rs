//! Service layer for ledgerbook
//!
//! The service layer provides business logic on top of the storage layer:
//! the statement pipeline (classify, split, build, import) and management
//! of accounts, balances, transactions and budgets.

pub mod account;
pub mod balance;
pub mod budget;
pub mod builder;
pub mod classify;
pub mod import;
pub mod split;
pub mod statement;
pub mod transaction;

pub use account::{AccountService, AccountSummary};
pub use balance::BalanceService;
pub use budget::{evaluate_progress, BudgetProgress, BudgetService};
pub use builder::{ImportBatch, TransactionBuilder};
pub use classify::{classify_file, ClassifyReport, Classifier, Rule, Rulebook};
pub use import::{ImportOptions, ImportResult, ImportService};
pub use split::{parse_split, Split, SplitTarget};
pub use statement::StatementRow;
pub use transaction::{CreateTransactionInput, TransactionFilter, TransactionService};
