//! Statement CSV commands
//!
//! Preparation of a raw bank export, classification of a statement CSV in
//! place, and conversion of a classified CSV into the transaction exchange
//! JSON without touching the ledger.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::LedgerResult;
use crate::export::json::ExchangeFile;
use crate::services::classify::{classify_file, Classifier, Rulebook};
use crate::services::statement::{load_rows, prep_file};
use crate::services::TransactionBuilder;

/// Statement CSV subcommands
#[derive(Subcommand)]
pub enum CsvCommands {
    /// Turn a raw bank export (date, amount, description, balance) into a
    /// statement CSV
    Prep {
        /// Bank export, rewritten in place
        csv: PathBuf,
        /// Operating account the export belongs to
        #[arg(short, long)]
        account: String,
    },
    /// Fill in the `that` column of a statement CSV from a rulebook
    Classify {
        /// Statement CSV, rewritten in place
        csv: PathBuf,
        /// Rulebook YAML (defaults to `rulebook_path` in config.json)
        #[arg(short, long)]
        rulebook: Option<PathBuf>,
        /// Reclassify rows that already have a counter-account
        #[arg(short, long)]
        force: bool,
    },
    /// Convert a classified CSV into a transaction exchange JSON file
    ToJson {
        /// Classified statement CSV
        csv: PathBuf,
        /// Operating account the statement belongs to
        #[arg(short, long)]
        account: String,
        /// Output JSON path
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Handle a statement CSV command
pub fn handle_csv_command(settings: &Settings, cmd: CsvCommands) -> LedgerResult<()> {
    match cmd {
        CsvCommands::Prep { csv, account } => {
            let rows = prep_file(&csv, &account)?;
            println!("Prepared {} rows for {}", rows, account);
        }

        CsvCommands::Classify {
            csv,
            rulebook,
            force,
        } => {
            let rulebook = Rulebook::load(&settings.resolve_rulebook(rulebook)?)?;
            let classifier = Classifier::new(rulebook)?;
            let report = classify_file(&csv, &classifier, force)?;
            println!(
                "Classified {}/{} rows ({}%)",
                report.classified,
                report.total,
                report.percent()
            );
        }

        CsvCommands::ToJson {
            csv,
            account,
            output,
        } => {
            let batch = TransactionBuilder::new(account)?.build(load_rows(&csv)?)?;
            ExchangeFile::from_batch(&batch).save(&output)?;
            println!(
                "Wrote {} transactions to {}",
                batch.transactions.len(),
                output.display()
            );
        }
    }

    Ok(())
}
