//! Account CLI commands
//!
//! Implements CLI commands for account management.

use std::collections::HashSet;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::account::{format_account_details, format_account_list};
use crate::error::LedgerResult;
use crate::export::repr::to_repr;
use crate::services::AccountService;
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Add {
        /// Full account name, e.g. Expenses:Food:Groceries
        name: String,
    },
    /// Delete an account that has no posts
    Delete {
        /// Account name
        name: String,
    },
    /// Show account details
    Show {
        /// Account name
        name: String,
        /// Print the account with its balance, posts and transactions as JSON
        #[arg(short, long)]
        verbose: bool,
    },
    /// List accounts
    List {
        /// Only accounts under this prefix
        prefix: Option<String>,
    },
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AccountCommands,
) -> LedgerResult<()> {
    let service = AccountService::new(storage);

    match cmd {
        AccountCommands::Add { name } => {
            let account = service.create(&name)?;
            println!("Created account: {}", account.name);
        }

        AccountCommands::Delete { name } => {
            let account = service.delete(&name)?;
            println!("Deleted account: {}", account.name);
        }

        AccountCommands::Show { name, verbose } => {
            if verbose {
                let account = service.get(&name)?;
                let repr = to_repr(&account, storage, true, &mut HashSet::new())?;
                println!("{}", serde_json::to_string_pretty(&repr)?);
            } else {
                let summary = service.summary(&name)?;
                print!("{}", format_account_details(&summary, &settings.currency_symbol));
            }
        }

        AccountCommands::List { prefix } => {
            let accounts = service.list(prefix.as_deref())?;
            print!("{}", format_account_list(&accounts));
        }
    }

    Ok(())
}
