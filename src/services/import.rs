//! Ledger import service
//!
//! Imports a statement CSV (built through the transaction builder) or a
//! transaction exchange JSON file into the ledger.
//!
//! Imports are all-or-nothing: the whole batch is built and validated in
//! memory, and only then are accounts, transactions and the balance
//! snapshot stored and written out once. Transactions whose id is already
//! in the ledger are skipped, so importing the same statement twice is
//! harmless.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use super::builder::{ImportBatch, TransactionBuilder};
use super::statement::load_rows;
use crate::error::{LedgerError, LedgerResult};
use crate::export::json::ExchangeFile;
use crate::models::Account;
use crate::storage::Storage;

/// Options for an import
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Create accounts referenced by the batch that do not exist yet
    pub create_missing_accounts: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            create_missing_accounts: true,
        }
    }
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Number of transactions added
    pub imported: usize,
    /// Number of transactions already in the ledger
    pub skipped: usize,
    /// Accounts created along the way
    pub accounts_created: Vec<String>,
    /// Whether the operating account's balance snapshot was set
    pub balance_updated: bool,
}

/// Service for importing statements into the ledger
pub struct ImportService<'a> {
    storage: &'a Storage,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Build an import batch from a file, picking the format by extension
    ///
    /// `.json` files are read as exchange documents; anything else as a
    /// statement CSV, which needs the operating account.
    pub fn load_batch(&self, path: &Path, account: Option<&str>) -> LedgerResult<ImportBatch> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            let batch = ExchangeFile::load(path)?.into_batch()?;
            if let Some(account) = account {
                if account != batch.account {
                    return Err(LedgerError::Validation(format!(
                        "File is for account '{}', not '{}'",
                        batch.account, account
                    )));
                }
            }
            return Ok(batch);
        }

        let account = account.ok_or_else(|| {
            LedgerError::Validation("An operating account is required to import a CSV".into())
        })?;
        TransactionBuilder::new(account)?.build(load_rows(path)?)
    }

    /// Import a statement file
    pub fn import_file(
        &self,
        path: &Path,
        account: Option<&str>,
        options: ImportOptions,
    ) -> LedgerResult<ImportResult> {
        let batch = self.load_batch(path, account)?;
        self.import_batch(batch, options)
    }

    /// Import a built batch atomically
    pub fn import_batch(&self, batch: ImportBatch, options: ImportOptions) -> LedgerResult<ImportResult> {
        let mut result = ImportResult::default();

        // Accounts the batch needs, in first-seen order
        let mut needed: Vec<&str> = vec![batch.account.as_str()];
        for post in batch.transactions.iter().flat_map(|t| &t.posts) {
            if !needed.contains(&post.account.as_str()) {
                needed.push(&post.account);
            }
        }

        let mut new_accounts = Vec::new();
        for name in needed {
            if self.storage.accounts.exists(name)? {
                continue;
            }
            if !options.create_missing_accounts {
                return Err(LedgerError::account_not_found(name));
            }
            new_accounts.push(Account::new(name)?);
        }

        let mut seen = HashSet::new();
        let mut fresh = Vec::new();
        for (index, txn) in batch.transactions.into_iter().enumerate() {
            if !seen.insert(txn.id) {
                return Err(LedgerError::AlreadyExists {
                    entity_type: "Transaction",
                    identifier: txn.id.to_string(),
                }
                .at_row(index + 1));
            }
            if self.storage.transactions.contains(txn.id)? {
                debug!(id = %txn.id, "transaction already in ledger, skipping");
                result.skipped += 1;
                continue;
            }
            fresh.push(txn);
        }

        // Everything is validated; commit
        for account in &new_accounts {
            result.accounts_created.push(account.name.clone());
            self.storage.accounts.insert(account.clone())?;
        }
        result.imported = fresh.len();
        for txn in fresh {
            self.storage.transactions.insert(txn)?;
        }
        if let Some(balance) = batch.balance {
            self.storage.balances.upsert(balance)?;
            result.balance_updated = true;
        }

        // Accounts go last: if their write fails, importing the same batch
        // again skips the saved transactions and recreates the accounts
        if result.imported > 0 {
            self.storage.transactions.save()?;
        }
        if result.balance_updated {
            self.storage.balances.save()?;
        }
        if !new_accounts.is_empty() {
            self.storage.accounts.save()?;
        }

        info!(
            account = %batch.account,
            imported = result.imported,
            skipped = result.skipped,
            "import finished"
        );
        Ok(result)
    }
}
