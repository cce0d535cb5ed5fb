//! Counter-account classification
//!
//! A rulebook maps description patterns to counter-accounts:
//!
//! ```yaml
//! keyword:
//!   WOOLWORTHS: Expenses:Food:Groceries
//!   SALARY: { that: Income:Salary, desc: Monthly salary }
//! regex:
//!   'EFTPOS \d+ CAFE': Expenses:Food:Eating Out
//! ```
//!
//! Keyword rules are tried before regex rules and the first match wins.
//! Keywords match anywhere in the description, ignoring case. Regex rules
//! must match at the start of the description.

use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use super::split::{is_structured, parse_split};
use super::statement::{load_rows, write_rows, StatementRow};
use crate::error::{LedgerError, LedgerResult};

/// What a matching rule does to a row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Rule {
    /// Assign this counter-account
    Account(String),
    /// Overwrite these row fields
    Overrides(IndexMap<String, String>),
}

/// Ordered keyword and regex rules
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rulebook {
    #[serde(default)]
    pub keyword: IndexMap<String, Rule>,
    #[serde(default)]
    pub regex: IndexMap<String, Rule>,
}

impl Rulebook {
    /// Parse a YAML rulebook
    pub fn from_yaml(text: &str) -> LedgerResult<Self> {
        // An empty document is an empty rulebook
        let rulebook: Option<Self> = serde_yaml::from_str(text)?;
        Ok(rulebook.unwrap_or_default())
    }

    /// Load a YAML rulebook from disk
    pub fn load(path: &Path) -> LedgerResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("Failed to read rulebook {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&text)
    }
}

/// A rulebook compiled for matching
pub struct Classifier {
    keywords: Vec<(String, Rule)>,
    patterns: Vec<(Regex, Rule)>,
}

impl Classifier {
    /// Compile a rulebook, rejecting bad patterns and unknown override fields
    pub fn new(rulebook: Rulebook) -> LedgerResult<Self> {
        let rules = rulebook.keyword.values().chain(rulebook.regex.values());
        for rule in rules {
            if let Rule::Overrides(fields) = rule {
                let mut scratch = StatementRow::default();
                for (field, value) in fields {
                    scratch
                        .set_field(field, value)
                        .map_err(|e| LedgerError::Config(format!("Invalid rule: {}", e)))?;
                }
            }
        }

        let keywords = rulebook
            .keyword
            .into_iter()
            .map(|(keyword, rule)| (keyword.to_uppercase(), rule))
            .collect();

        let patterns = rulebook
            .regex
            .into_iter()
            .map(|(pattern, rule)| {
                Regex::new(&format!("^(?:{})", pattern))
                    .map(|re| (re, rule))
                    .map_err(|e| {
                        LedgerError::Config(format!("Invalid rule pattern '{}': {}", pattern, e))
                    })
            })
            .collect::<LedgerResult<_>>()?;

        Ok(Self { keywords, patterns })
    }

    /// First rule matching a description
    pub fn lookup(&self, description: &str) -> Option<&Rule> {
        let upper = description.to_uppercase();
        if let Some((keyword, rule)) = self.keywords.iter().find(|(k, _)| upper.contains(k.as_str())) {
            debug!(keyword = %keyword, "keyword rule matched");
            return Some(rule);
        }

        self.patterns
            .iter()
            .find(|(re, _)| re.is_match(description))
            .map(|(re, rule)| {
                debug!(pattern = %re, "regex rule matched");
                rule
            })
    }

    /// Classify rows, returning them with the number that end up classified
    ///
    /// Rows that already have a counter-account are left alone unless `force`
    /// is set; manually split rows are never touched.
    pub fn classify(
        &self,
        mut rows: Vec<StatementRow>,
        force: bool,
    ) -> LedgerResult<(Vec<StatementRow>, usize)> {
        let mut classified = 0;

        for (index, row) in rows.iter_mut().enumerate() {
            let that = row.that();
            if that.is_empty() || (force && !is_structured(that)) {
                if let Some(rule) = self.lookup(&row.description) {
                    apply_rule(row, rule).map_err(|e| e.at_row(index + 1))?;
                }
            }

            if !row.that().is_empty() {
                classified += 1;
            }
        }

        Ok((rows, classified))
    }
}

fn apply_rule(row: &mut StatementRow, rule: &Rule) -> LedgerResult<()> {
    match rule {
        Rule::Account(account) => {
            row.that_auto = account.clone();
            Ok(())
        }
        Rule::Overrides(fields) => fields
            .iter()
            .try_for_each(|(field, value)| row.set_field(field, value)),
    }
}

/// Check that both split fields of a row parse and balance
pub fn validate_row(row: &StatementRow) -> LedgerResult<()> {
    let amount = row.amount()?;
    parse_split(&row.this, amount)?;
    parse_split(row.that(), -amount)?;
    Ok(())
}

/// Outcome of classifying a statement file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyReport {
    /// Rows with a counter-account after classification
    pub classified: usize,
    /// Data rows in the file
    pub total: usize,
}

impl ClassifyReport {
    /// Whole percentage of rows classified
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.classified * 100 / self.total
    }
}

/// Classify a statement CSV in place
///
/// Value dates are fixed up and every row's split fields are validated
/// before any rule runs, so a bad row aborts without rewriting the file.
pub fn classify_file(path: &Path, classifier: &Classifier, force: bool) -> LedgerResult<ClassifyReport> {
    let mut rows = load_rows(path)?;

    for (index, row) in rows.iter_mut().enumerate() {
        row.fix_value_date();
        validate_row(row).map_err(|e| e.at_row(index + 1))?;
    }

    let total = rows.len();
    let (rows, classified) = classifier.classify(rows, force)?;
    let report = ClassifyReport { classified, total };

    info!(
        "{}/{} classified ({}%)",
        report.classified,
        report.total,
        report.percent()
    );

    write_rows(path, &rows)?;
    Ok(report)
}
