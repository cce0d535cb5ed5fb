//! ledgerbook - personal double-entry bookkeeping from bank statements
//!
//! Bank statement CSVs are classified with a rulebook, turned into balanced
//! transactions and imported into a JSON-backed ledger that answers account
//! summaries and budget progress queries.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (money, dates, accounts, transactions, budgets)
//! - `storage`: JSON file storage layer
//! - `services`: Statement pipeline and ledger business logic
//! - `reports`: Account tree, summary and budget progress reports
//! - `export`: Transaction exchange JSON and recursive entity rendering
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use ledgerbook::config::{paths::LedgerPaths, settings::Settings};
//! use ledgerbook::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
