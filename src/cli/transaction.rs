//! Transaction CLI commands
//!
//! Statement import, manual entry, lookup, deletion and the account
//! summary report.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::parse_amount;
use crate::config::settings::Settings;
use crate::display::transaction::{format_transaction_details, format_transaction_register};
use crate::error::{LedgerError, LedgerResult};
use crate::models::date::parse_month;
use crate::models::{parse_date, DateRange, Money, RangePolicy};
use crate::reports::SummaryReport;
use crate::services::{
    CreateTransactionInput, ImportOptions, ImportService, TransactionFilter, TransactionService,
};
use crate::storage::Storage;

/// Period and pending-post options shared by listing commands
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Start of the period (DD/MM/YYYY)
    #[arg(long, conflicts_with = "month")]
    pub from: Option<String>,
    /// End of the period (DD/MM/YYYY)
    #[arg(long, conflicts_with = "month")]
    pub to: Option<String>,
    /// Whole calendar month (MM/YYYY)
    #[arg(short, long)]
    pub month: Option<String>,
    /// Also count posts that have not resolved yet
    #[arg(short, long)]
    pub include_nonresolved: bool,
}

impl RangeArgs {
    /// The requested period, if any
    pub fn range(&self) -> LedgerResult<Option<DateRange>> {
        if let Some(month) = &self.month {
            return parse_month(month).map(Some);
        }
        let from = self.from.as_deref().map(parse_date).transpose()?;
        let to = self.to.as_deref().map(parse_date).transpose()?;
        match (from, to) {
            (None, None) => Ok(None),
            (from, to) => DateRange::new(
                from.unwrap_or(NaiveDate::MIN),
                to.unwrap_or(NaiveDate::MAX),
            )
            .map(Some),
        }
    }

    /// Range policy, falling back to the configured default
    pub fn policy(&self, settings: &Settings) -> RangePolicy {
        RangePolicy::from_flag(self.include_nonresolved || settings.include_nonresolved)
    }

    fn filter(&self, settings: &Settings, account: Option<String>) -> LedgerResult<TransactionFilter> {
        let mut filter = TransactionFilter::new().policy(self.policy(settings));
        if let Some(range) = self.range()? {
            filter = filter.range(range);
        }
        if let Some(account) = account {
            filter = filter.account(account);
        }
        Ok(filter)
    }
}

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Import a statement CSV or exchange JSON file into the ledger
    Import {
        /// CSV or JSON file
        path: PathBuf,
        /// Operating account (required for CSV)
        #[arg(short, long)]
        account: Option<String>,
        /// Fail instead of creating accounts that do not exist
        #[arg(long)]
        no_create_missing: bool,
    },
    /// Add a balanced transaction by hand
    Add {
        /// Date the transaction occurred (DD/MM/YYYY)
        #[arg(short, long)]
        date: String,
        /// Date it resolved (DD/MM/YYYY), defaults to --date
        #[arg(short, long, conflicts_with = "pending")]
        resolved: Option<String>,
        /// Leave the posts pending
        #[arg(long)]
        pending: bool,
        /// Post as ACCOUNT=AMOUNT, at least two
        #[arg(short, long = "post", required = true, num_args = 1, allow_hyphen_values = true)]
        posts: Vec<String>,
        /// Description
        #[arg(long, default_value = "")]
        description: String,
        /// External reference
        #[arg(long = "ref")]
        reference: Option<String>,
    },
    /// Show one transaction, or list those in a period
    Show {
        /// Transaction id or unique id prefix
        #[arg(long)]
        id: Option<String>,
        /// Only transactions touching accounts under this prefix
        #[arg(short, long)]
        account: Option<String>,
        #[command(flatten)]
        range: RangeArgs,
        /// Also list every post
        #[arg(short, long)]
        verbose: bool,
    },
    /// Delete a transaction
    Delete {
        /// Transaction id or unique id prefix
        id: String,
    },
    /// Summarize posts per account hierarchy
    Summary {
        /// Only accounts under this prefix
        #[arg(short, long)]
        account: Option<String>,
        /// Truncate account names to this many segments
        #[arg(long)]
        depth: Option<usize>,
        #[command(flatten)]
        range: RangeArgs,
    },
}

/// Parse a `ACCOUNT=AMOUNT` post argument
fn parse_post(arg: &str) -> LedgerResult<(String, Money)> {
    let (account, amount) = arg.split_once('=').ok_or_else(|| {
        LedgerError::Validation(format!("Post '{}' must be ACCOUNT=AMOUNT", arg))
    })?;
    Ok((account.trim().to_string(), parse_amount(amount)?))
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> LedgerResult<()> {
    let service = TransactionService::new(storage);
    let symbol = &settings.currency_symbol;

    match cmd {
        TransactionCommands::Import {
            path,
            account,
            no_create_missing,
        } => {
            let options = ImportOptions {
                create_missing_accounts: settings.create_missing_accounts && !no_create_missing,
            };
            let result = ImportService::new(storage).import_file(&path, account.as_deref(), options)?;

            println!(
                "Imported {} transactions ({} already in ledger)",
                result.imported, result.skipped
            );
            for account in &result.accounts_created {
                println!("  Created account: {}", account);
            }
        }

        TransactionCommands::Add {
            date,
            resolved,
            pending,
            posts,
            description,
            reference,
        } => {
            let date_occurred = parse_date(&date)?;
            let date_resolved = match (pending, resolved) {
                (true, _) => None,
                (false, Some(resolved)) => Some(parse_date(&resolved)?),
                (false, None) => Some(date_occurred),
            };
            let posts = posts
                .iter()
                .map(String::as_str)
                .map(parse_post)
                .collect::<LedgerResult<Vec<_>>>()?;

            let txn = service.create(CreateTransactionInput {
                date_occurred,
                date_resolved,
                description,
                reference,
                posts,
                create_missing_accounts: settings.create_missing_accounts,
            })?;
            println!("Created transaction: {}", txn.id);
        }

        TransactionCommands::Show {
            id,
            account,
            range,
            verbose,
        } => match id {
            Some(id) => {
                let txn = service.find(&id)?;
                print!("{}", format_transaction_details(&txn, verbose, symbol));
            }
            None => {
                let transactions = service.list(&range.filter(settings, account)?)?;
                if verbose {
                    for txn in &transactions {
                        println!("{}", format_transaction_details(txn, true, symbol));
                    }
                } else {
                    print!("{}", format_transaction_register(&transactions, symbol));
                }
            }
        },

        TransactionCommands::Delete { id } => {
            let txn = service.delete(&id)?;
            println!("Deleted transaction: {}", txn.id);
        }

        TransactionCommands::Summary {
            account,
            depth,
            range,
        } => {
            let posts = service.posts(&range.filter(settings, account)?)?;
            let report = SummaryReport::generate(&posts, depth)?;
            if report.is_empty() {
                println!("No posts found.");
            } else {
                print!("{}", report.format_terminal(symbol));
            }
        }
    }

    Ok(())
}
