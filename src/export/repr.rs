//! Recursive representation of ledger entities
//!
//! Renders an entity and the entities related to it as one JSON value, the
//! way `account show --verbose` prints an account with its balance snapshot,
//! its posts and the transactions those posts belong to.
//!
//! Each entity declares its scalar fields and its relations. The walk keeps
//! a caller-supplied visited set: an entity already on it is rendered by its
//! key (or left out of a has-many collection), which cuts the
//! account → post → transaction → post cycles. With `simple` set, empty
//! optional fields and empty collections are omitted.

use std::collections::HashSet;
use std::fmt;

use serde_json::{json, Map, Value};

use crate::error::LedgerResult;
use crate::models::{format_date, Account, Balance, Money, Post, Transaction, TransactionId};
use crate::storage::Storage;

/// Identity of an entity during a walk
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Account(String),
    Balance(String),
    Transaction(TransactionId),
    /// Post at a position inside a transaction
    Post(TransactionId, usize),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(name) | Self::Balance(name) => write!(f, "{}", name),
            Self::Transaction(id) => write!(f, "{}", id.as_uuid()),
            Self::Post(id, index) => write!(f, "{}#{}", id.as_uuid(), index),
        }
    }
}

/// A related entity or collection
pub enum Relation {
    /// Exactly one related entity
    Required(Box<dyn Repr>),
    /// At most one related entity
    Optional(Option<Box<dyn Repr>>),
    /// Any number of related entities, keyed by their entity key
    HasMany(Vec<Box<dyn Repr>>),
}

/// An entity that can be rendered recursively
pub trait Repr {
    fn key(&self) -> EntityKey;

    /// Scalar fields; `Value::Null` marks an empty optional field
    fn fields(&self) -> Vec<(&'static str, Value)>;

    /// Related entities, loaded from storage
    fn relations(&self, storage: &Storage) -> LedgerResult<Vec<(&'static str, Relation)>>;
}

/// Render `entity` and everything reachable from it that is not in `visited`
pub fn to_repr(
    entity: &dyn Repr,
    storage: &Storage,
    simple: bool,
    visited: &mut HashSet<EntityKey>,
) -> LedgerResult<Value> {
    visited.insert(entity.key());

    let mut map = Map::new();
    for (name, value) in entity.fields() {
        if value.is_null() && simple {
            continue;
        }
        map.insert(name.to_string(), value);
    }

    for (name, relation) in entity.relations(storage)? {
        let value = match relation {
            Relation::Required(related) => related_value(related.as_ref(), storage, simple, visited)?,
            Relation::Optional(Some(related)) => {
                related_value(related.as_ref(), storage, simple, visited)?
            }
            Relation::Optional(None) => {
                if simple {
                    continue;
                }
                Value::Null
            }
            Relation::HasMany(items) => {
                let mut collection = Map::new();
                for item in items {
                    let key = item.key();
                    if visited.contains(&key) {
                        continue;
                    }
                    collection.insert(key.to_string(), to_repr(item.as_ref(), storage, simple, visited)?);
                }
                if collection.is_empty() && simple {
                    continue;
                }
                Value::Object(collection)
            }
        };
        map.insert(name.to_string(), value);
    }

    Ok(Value::Object(map))
}

fn related_value(
    related: &dyn Repr,
    storage: &Storage,
    simple: bool,
    visited: &mut HashSet<EntityKey>,
) -> LedgerResult<Value> {
    let key = related.key();
    if visited.contains(&key) {
        Ok(Value::String(key.to_string()))
    } else {
        to_repr(related, storage, simple, visited)
    }
}

fn amount(value: Money) -> Value {
    json!(value.as_f64())
}

fn optional_date(date: Option<chrono::NaiveDate>) -> Value {
    date.map_or(Value::Null, |d| Value::String(format_date(d)))
}

impl Repr for Account {
    fn key(&self) -> EntityKey {
        EntityKey::Account(self.name.clone())
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![("name", Value::String(self.name.clone()))]
    }

    fn relations(&self, storage: &Storage) -> LedgerResult<Vec<(&'static str, Relation)>> {
        let balance = storage
            .balances
            .get(&self.name)?
            .map(|b| Box::new(b) as Box<dyn Repr>);

        let mut posts: Vec<Box<dyn Repr>> = Vec::new();
        for txn in storage.transactions.get_by_account(&self.name)? {
            for (index, post) in txn.posts.iter().enumerate() {
                if post.account == self.name {
                    posts.push(Box::new(PostEntry::new(&txn, index, post.clone())));
                }
            }
        }

        Ok(vec![
            ("balance", Relation::Optional(balance)),
            ("posts", Relation::HasMany(posts)),
        ])
    }
}

impl Repr for Balance {
    fn key(&self) -> EntityKey {
        EntityKey::Balance(self.account.clone())
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("amount", amount(self.amount)),
            ("date", Value::String(format_date(self.date))),
        ]
    }

    fn relations(&self, storage: &Storage) -> LedgerResult<Vec<(&'static str, Relation)>> {
        Ok(match storage.accounts.get(&self.account)? {
            Some(account) => vec![("account", Relation::Required(Box::new(account)))],
            None => Vec::new(),
        })
    }
}

impl Repr for Transaction {
    fn key(&self) -> EntityKey {
        EntityKey::Transaction(self.id)
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::String(self.id.as_uuid().to_string())),
            (
                "ref",
                self.reference.clone().map_or(Value::Null, Value::String),
            ),
            ("description", Value::String(self.description.clone())),
            (
                "min_date_occurred",
                Value::String(format_date(self.min_date_occurred)),
            ),
            ("max_date_resolved", optional_date(self.max_date_resolved)),
        ]
    }

    fn relations(&self, _storage: &Storage) -> LedgerResult<Vec<(&'static str, Relation)>> {
        let posts = self
            .posts
            .iter()
            .enumerate()
            .map(|(index, post)| Box::new(PostEntry::new(self, index, post.clone())) as Box<dyn Repr>)
            .collect();
        Ok(vec![("posts", Relation::HasMany(posts))])
    }
}

/// A post together with the transaction that owns it
pub struct PostEntry {
    transaction: Transaction,
    index: usize,
    post: Post,
}

impl PostEntry {
    fn new(transaction: &Transaction, index: usize, post: Post) -> Self {
        Self {
            transaction: transaction.clone(),
            index,
            post,
        }
    }
}

impl Repr for PostEntry {
    fn key(&self) -> EntityKey {
        EntityKey::Post(self.transaction.id, self.index)
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("account", Value::String(self.post.account.clone())),
            ("amount", amount(self.post.amount)),
            (
                "date_occurred",
                Value::String(format_date(self.post.date_occurred)),
            ),
            ("date_resolved", optional_date(self.post.date_resolved)),
        ]
    }

    fn relations(&self, _storage: &Storage) -> LedgerResult<Vec<(&'static str, Relation)>> {
        Ok(vec![(
            "transaction",
            Relation::Required(Box::new(self.transaction.clone())),
        )])
    }
}
