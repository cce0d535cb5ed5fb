//! Budget model
//!
//! A budget is a date range plus a mapping from account name (or account name
//! prefix) to a target amount. Budgets are read from a YAML definition:
//!
//! ```yaml
//! date_from: 01/01/2019
//! date_to:   31/01/2019
//! items:
//!     'Expenses:Food': 400
//!     'Expenses:Rent': 1200
//! ```

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::date::{ddmmyyyy, DateRange};
use super::money::Money;
use crate::error::{LedgerError, LedgerResult};

/// Identifier of a stored budget
pub type BudgetId = u32;

/// Budget definition as written by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetDefinition {
    #[serde(with = "ddmmyyyy")]
    pub date_from: NaiveDate,

    #[serde(with = "ddmmyyyy")]
    pub date_to: NaiveDate,

    /// Account prefix -> target amount, in definition order
    #[serde(with = "decimal_map")]
    pub items: IndexMap<String, Money>,
}

impl BudgetDefinition {
    /// Parse a YAML budget definition
    pub fn from_yaml(text: &str) -> LedgerResult<Self> {
        let definition: Self = serde_yaml::from_str(text)?;
        definition.range()?;
        Ok(definition)
    }

    /// The budget period
    pub fn range(&self) -> LedgerResult<DateRange> {
        DateRange::new(self.date_from, self.date_to)
    }
}

/// A stored budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    #[serde(with = "ddmmyyyy")]
    pub date_from: NaiveDate,

    #[serde(with = "ddmmyyyy")]
    pub date_to: NaiveDate,

    /// Account prefix -> target amount
    pub items: IndexMap<String, Money>,
}

impl Budget {
    /// Create a budget from its definition
    pub fn from_definition(id: BudgetId, definition: BudgetDefinition) -> LedgerResult<Self> {
        let budget = Self {
            id,
            date_from: definition.date_from,
            date_to: definition.date_to,
            items: definition.items,
        };
        budget.validate()?;
        Ok(budget)
    }

    /// The budget period
    pub fn range(&self) -> LedgerResult<DateRange> {
        DateRange::new(self.date_from, self.date_to)
    }

    /// Validate the budget
    pub fn validate(&self) -> LedgerResult<()> {
        self.range()?;
        if self.items.is_empty() {
            return Err(LedgerError::Validation(format!(
                "Budget {} has no items",
                self.id
            )));
        }
        if let Some(name) = self.items.keys().find(|name| name.trim().is_empty()) {
            return Err(LedgerError::Validation(format!(
                "Budget item '{}' has an empty account name",
                name
            )));
        }
        Ok(())
    }
}

/// Serde helper for `{name: decimal amount}` maps
mod decimal_map {
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::models::money::{decimal, Money};

    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    struct Amount(#[serde(with = "decimal")] Money);

    pub fn serialize<S: Serializer>(
        items: &IndexMap<String, Money>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let wrapped: IndexMap<&String, Amount> =
            items.iter().map(|(k, v)| (k, Amount(*v))).collect();
        wrapped.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<String, Money>, D::Error> {
        let wrapped = IndexMap::<String, Amount>::deserialize(deserializer)?;
        Ok(wrapped.into_iter().map(|(k, v)| (k, v.0)).collect())
    }
}
