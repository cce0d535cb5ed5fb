//! Transaction service
//!
//! Manual transaction entry, lookup by id prefix, filtered listing and
//! deletion.

use chrono::NaiveDate;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Account, DateRange, Money, Post, RangePolicy, Transaction, TransactionId,
};
use crate::storage::Storage;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Options for filtering transactions and posts
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only posts falling in this period
    pub range: Option<DateRange>,
    /// Only posts on accounts under this prefix
    pub account: Option<String>,
    /// How pending posts are treated when a range is set
    pub policy: RangePolicy,
}

impl TransactionFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by period
    pub fn range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Filter by account prefix
    pub fn account(mut self, prefix: impl Into<String>) -> Self {
        self.account = Some(prefix.into());
        self
    }

    /// Set the range policy
    pub fn policy(mut self, policy: RangePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether a single post passes the filter
    pub fn admits(&self, post: &Post) -> bool {
        let in_range = self
            .range
            .map_or(true, |r| r.admits(post.date_occurred, post.date_resolved, self.policy));
        let on_account = self
            .account
            .as_deref()
            .map_or(true, |prefix| post.account.starts_with(prefix));
        in_range && on_account
    }
}

/// Input for creating a manual transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub date_occurred: NaiveDate,
    /// `None` leaves the posts pending
    pub date_resolved: Option<NaiveDate>,
    pub description: String,
    pub reference: Option<String>,
    /// Account and signed amount of each post
    pub posts: Vec<(String, Money)>,
    /// Create accounts that do not exist yet instead of failing
    pub create_missing_accounts: bool,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a balanced manual transaction with a random id
    pub fn create(&self, input: CreateTransactionInput) -> LedgerResult<Transaction> {
        let mut new_accounts = Vec::new();
        for (name, _) in &input.posts {
            if self.storage.accounts.exists(name)?
                || new_accounts.iter().any(|a: &Account| &a.name == name)
            {
                continue;
            }
            if !input.create_missing_accounts {
                return Err(LedgerError::account_not_found(name.as_str()));
            }
            new_accounts.push(Account::new(name.as_str())?);
        }

        let posts = input
            .posts
            .into_iter()
            .map(|(account, amount)| {
                Post::new(account, amount, input.date_occurred, input.date_resolved)
            })
            .collect();

        let txn = Transaction::from_posts(
            TransactionId::new(),
            input.reference,
            input.description,
            posts,
        )?;

        for account in new_accounts {
            info!(account = %account.name, "created account");
            self.storage.accounts.insert(account)?;
        }
        self.storage.transactions.insert(txn.clone())?;
        self.storage.transactions.save()?;
        self.storage.accounts.save()?;

        info!(id = %txn.id, "created transaction");
        Ok(txn)
    }

    /// Find a transaction by full id or unique id prefix
    pub fn find(&self, identifier: &str) -> LedgerResult<Transaction> {
        if let Ok(id) = identifier.parse::<TransactionId>() {
            if let Some(txn) = self.storage.transactions.get(id)? {
                return Ok(txn);
            }
        }

        let mut matches = self.storage.transactions.find_by_prefix(identifier)?;
        match matches.len() {
            0 => Err(LedgerError::transaction_not_found(identifier)),
            1 => Ok(matches.remove(0)),
            n => Err(LedgerError::Validation(format!(
                "Transaction id '{}' is ambiguous, it matches {} transactions",
                identifier, n
            ))),
        }
    }

    /// Transactions with at least one post passing the filter
    pub fn list(&self, filter: &TransactionFilter) -> LedgerResult<Vec<Transaction>> {
        let mut transactions = match filter.range {
            Some(range) => self.storage.transactions.get_in_range(range, filter.policy)?,
            None => self.storage.transactions.get_all()?,
        };
        transactions.retain(|t| t.posts.iter().any(|p| filter.admits(p)));
        Ok(transactions)
    }

    /// Posts passing the filter
    pub fn posts(&self, filter: &TransactionFilter) -> LedgerResult<Vec<Post>> {
        let posts = match filter.range {
            Some(range) => self.storage.transactions.get_posts_in_range(range, filter.policy)?,
            None => self
                .storage
                .transactions
                .get_all()?
                .into_iter()
                .flat_map(|t| t.posts)
                .collect(),
        };
        Ok(posts.into_iter().filter(|p| filter.admits(p)).collect())
    }

    /// Delete a transaction by id or unique prefix
    pub fn delete(&self, identifier: &str) -> LedgerResult<Transaction> {
        let txn = self.find(identifier)?;
        self.storage.transactions.delete(txn.id)?;
        self.storage.transactions.save()?;

        info!(id = %txn.id, "deleted transaction");
        Ok(txn)
    }

    /// Count transactions
    pub fn count(&self) -> LedgerResult<usize> {
        self.storage.transactions.count()
    }
}
