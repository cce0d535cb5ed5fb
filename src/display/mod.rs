//! Display formatting for terminal output
//!
//! Plain-text tables and formatters for accounts, transactions and report
//! values.

pub mod account;
pub mod report;
pub mod table;
pub mod transaction;

pub use account::{format_account_details, format_account_list, format_balance};
pub use report::{format_header, format_money, format_ratio};
pub use table::{Align, Table};
pub use transaction::{format_transaction_details, format_transaction_register};
