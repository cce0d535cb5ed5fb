//! Core data models for ledgerbook
//!
//! This module contains the data structures of the bookkeeping domain:
//! accounts, posts, transactions, balances and budgets.

pub mod account;
pub mod balance;
pub mod budget;
pub mod date;
pub mod ids;
pub mod money;
pub mod transaction;

pub use account::{Account, AccountType};
pub use balance::Balance;
pub use budget::{Budget, BudgetDefinition, BudgetId};
pub use date::{format_date, parse_date, DateRange, RangePolicy};
pub use ids::TransactionId;
pub use money::Money;
pub use transaction::{Post, Transaction};
