//! Balance CLI commands

use chrono::Local;
use clap::Subcommand;

use super::parse_amount;
use crate::config::settings::Settings;
use crate::display::account::format_balance;
use crate::error::LedgerResult;
use crate::models::parse_date;
use crate::services::BalanceService;
use crate::storage::Storage;

/// Balance subcommands
#[derive(Subcommand)]
pub enum BalanceCommands {
    /// Set the statement balance of an account
    Set {
        /// Account name
        account: String,
        /// Balance amount (e.g., "1234.56" or "-20")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Day of the balance (DD/MM/YYYY), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show the balance snapshot of an account
    Show {
        /// Account name
        account: String,
    },
}

/// Handle a balance command
pub fn handle_balance_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BalanceCommands,
) -> LedgerResult<()> {
    let service = BalanceService::new(storage);

    match cmd {
        BalanceCommands::Set {
            account,
            amount,
            date,
        } => {
            let amount = parse_amount(&amount)?;
            let date = match date {
                Some(date) => parse_date(&date)?,
                None => Local::now().date_naive(),
            };
            let balance = service.set(&account, amount, date)?;
            println!(
                "Balance of {}: {}",
                balance.account,
                format_balance(&balance, &settings.currency_symbol)
            );
        }

        BalanceCommands::Show { account } => {
            let balance = service.get(&account)?;
            println!(
                "{}: {}",
                balance.account,
                format_balance(&balance, &settings.currency_symbol)
            );
        }
    }

    Ok(())
}
