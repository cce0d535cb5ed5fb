//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod balance;
pub mod budget;
pub mod csv;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use balance::{handle_balance_command, BalanceCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use csv::{handle_csv_command, CsvCommands};
pub use transaction::{handle_transaction_command, RangeArgs, TransactionCommands};

use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;

/// Parse a money argument (e.g., "100", "-4.50", "$12.30")
pub(crate) fn parse_amount(s: &str) -> LedgerResult<Money> {
    Money::parse(s).map_err(|e| {
        LedgerError::Validation(format!(
            "Invalid amount '{}': {}. Use a format like '1000.00' or '-4.5'",
            s, e
        ))
    })
}
