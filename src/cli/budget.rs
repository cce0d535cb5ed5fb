//! Budget CLI commands
//!
//! Implements CLI commands for budget import, listing, deletion and
//! progress reports.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::report::{format_money, format_header};
use crate::display::table::Table;
use crate::error::LedgerResult;
use crate::models::{format_date, BudgetId, RangePolicy};
use crate::reports::BudgetProgressReport;
use crate::services::BudgetService;
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Import a budget definition from YAML
    Import {
        /// YAML file with date_from, date_to and items
        path: PathBuf,
    },
    /// List budgets
    List,
    /// Delete a budget
    Delete {
        /// Budget id
        id: BudgetId,
    },
    /// Show how much of each budget item is consumed
    Progress {
        /// Budget id
        id: BudgetId,
        /// Render items as an account tree
        #[arg(short, long)]
        tree: bool,
        /// Also count posts that have not resolved yet
        #[arg(short, long)]
        include_nonresolved: bool,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BudgetCommands,
) -> LedgerResult<()> {
    let service = BudgetService::new(storage);
    let symbol = &settings.currency_symbol;

    match cmd {
        BudgetCommands::Import { path } => {
            let budget = service.import(&path)?;
            println!(
                "Added budget {} ({} to {}, {} items)",
                budget.id,
                format_date(budget.date_from),
                format_date(budget.date_to),
                budget.items.len()
            );
        }

        BudgetCommands::List => {
            let budgets = service.list()?;
            if budgets.is_empty() {
                println!("No budgets found.");
                return Ok(());
            }

            print!("{}", format_header("Budgets"));
            let mut table = Table::new(["id", "from", "to", "items", "total"]).align_right(&[0, 3, 4]);
            for budget in &budgets {
                table.push_row(vec![
                    budget.id.to_string(),
                    format_date(budget.date_from),
                    format_date(budget.date_to),
                    budget.items.len().to_string(),
                    format_money(budget.items.values().sum(), symbol),
                ]);
            }
            print!("{}", table.render());
        }

        BudgetCommands::Delete { id } => {
            service.delete(id)?;
            println!("Deleted budget {}", id);
        }

        BudgetCommands::Progress {
            id,
            tree,
            include_nonresolved,
        } => {
            let policy =
                RangePolicy::from_flag(include_nonresolved || settings.include_nonresolved);
            let budget = service.get(id)?;
            let posts = service.posts_for(&budget, policy)?;
            let report = BudgetProgressReport::generate(budget, &posts, policy)?;

            if tree {
                print!("{}", report.format_tree(symbol));
            } else {
                print!("{}", report.format_flat(symbol));
            }
        }
    }

    Ok(())
}
