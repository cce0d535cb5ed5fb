use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ledgerbook::cli::{
    handle_account_command, handle_balance_command, handle_budget_command, handle_csv_command,
    handle_transaction_command, AccountCommands, BalanceCommands, BudgetCommands, CsvCommands,
    TransactionCommands,
};
use ledgerbook::config::{paths::LedgerPaths, settings::Settings};
use ledgerbook::storage::Storage;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "LEDGERBOOK_LOG";

#[derive(Parser)]
#[command(
    name = "ledgerbook",
    author = "Kaylee Beyene",
    version,
    about = "Personal double-entry bookkeeping from bank statements",
    long_about = "ledgerbook classifies bank statement CSVs with a rulebook, turns \
                  them into balanced transactions and keeps them in a local ledger \
                  for account summaries and budget tracking."
)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Statement CSV processing
    #[command(subcommand)]
    Csv(CsvCommands),

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Account balance snapshots
    #[command(subcommand)]
    Balance(BalanceCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Show current configuration and paths
    Config,
}

fn init_logging(cli_level: Option<&str>, settings: &Settings) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(cli_level.unwrap_or(&settings.log_level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_logging(cli.log_level.as_deref(), &settings);

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Commands::Csv(cmd) => handle_csv_command(&settings, cmd)?,
        Commands::Account(cmd) => handle_account_command(&storage, &settings, cmd)?,
        Commands::Balance(cmd) => handle_balance_command(&storage, &settings, cmd)?,
        Commands::Transaction(cmd) => handle_transaction_command(&storage, &settings, cmd)?,
        Commands::Budget(cmd) => handle_budget_command(&storage, &settings, cmd)?,
        Commands::Config => {
            println!("ledgerbook Configuration");
            println!("========================");
            println!("Config file:    {}", paths.settings_file().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!();
            println!("Settings:");
            let rulebook = settings
                .rulebook_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not set)".to_string());
            println!("  Rulebook:                {}", rulebook);
            println!("  Log level:               {}", settings.log_level);
            println!("  Include non-resolved:    {}", settings.include_nonresolved);
            println!("  Create missing accounts: {}", settings.create_missing_accounts);
            println!("  Currency symbol:         {}", settings.currency_symbol);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
