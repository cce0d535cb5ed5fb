//! Custom error types for ledgerbook
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for ledgerbook operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Missing or invalid external configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML (rulebook, budget definition) errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate primary key on create
    #[error("{entity_type} already exists: {identifier}")]
    AlreadyExists {
        entity_type: &'static str,
        identifier: String,
    },

    /// Split field could not be parsed as a `{ "account": amount }` literal
    #[error("Malformed split '{field}': {reason}")]
    MalformedSplit { field: String, reason: String },

    /// Split values do not add up to the row amount
    #[error("Unbalanced split '{field}': parts sum to {sum}, expected {expected}")]
    UnbalancedSplit {
        field: String,
        sum: String,
        expected: String,
    },

    /// Posts of a transaction do not sum to zero
    #[error("Unbalanced transaction '{id}': posts sum to {sum}")]
    UnbalancedTransaction { id: String, sum: String },

    /// Account path does not start with the tree's root segment
    #[error("Account '{name}' does not start with '{segment}'")]
    SegmentMismatch { name: String, segment: String },

    /// Date not in DD/MM/YYYY form
    #[error("Failed to parse date '{0}', must be in format DD/MM/YYYY")]
    DateParse(String),

    /// Budget target is zero, progress undefined
    #[error("Budget target for '{0}' is zero")]
    DivisionByZeroBudget(String),

    /// An error raised while processing one data row of an import
    #[error("row {row}: {error}")]
    AtRow { row: usize, error: Box<LedgerError> },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for balance snapshots
    pub fn balance_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Balance",
            identifier: identifier.into(),
        }
    }

    /// Attach a 1-based data row number to an error
    pub fn at_row(self, row: usize) -> Self {
        match self {
            // Already scoped
            err @ Self::AtRow { .. } => err,
            err => Self::AtRow {
                row,
                error: Box::new(err),
            },
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The innermost error, looking through row wrappers
    pub fn root(&self) -> &LedgerError {
        match self {
            Self::AtRow { error, .. } => error.root(),
            other => other,
        }
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for LedgerError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for ledgerbook operations
pub type LedgerResult<T> = Result<T, LedgerError>;
