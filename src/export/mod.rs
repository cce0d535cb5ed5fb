//! Export module for ledgerbook
//!
//! - `json`: the transaction exchange file written by `csv to-json` and read
//!   by `transaction import`
//! - `repr`: recursive JSON rendering of an entity and its relations

pub mod json;
pub mod repr;

pub use json::{ExchangeBalance, ExchangeFile, ExchangePost, ExchangeTransaction};
pub use repr::{to_repr, EntityKey, Relation, Repr};
