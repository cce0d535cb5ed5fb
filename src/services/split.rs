//! Split field parsing
//!
//! The `this` and `that` columns of a statement row name the account a row's
//! amount is booked against. A field is either a plain account name, empty
//! (the operating account), or a brace-delimited literal that divides the
//! amount across several accounts:
//!
//! ```text
//! { "Expenses:Food": 12.50, 'Expenses:Household': 7.5 }
//! ```
//!
//! The literal grammar is deliberately tiny: quoted string keys, decimal
//! numbers, commas and an optional trailing comma. Anything else is rejected.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;

/// Key standing for the operating account inside a structured split
pub const OPERATING_KEY: &str = "__this__";

/// Where one part of a split is booked
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SplitTarget {
    /// The account whose statement is being imported
    Operating,
    /// A named account
    Account(String),
}

impl SplitTarget {
    fn from_key(key: &str) -> Self {
        let key = key.trim();
        if key.is_empty() || key == OPERATING_KEY {
            Self::Operating
        } else {
            Self::Account(key.to_string())
        }
    }

    /// Resolve to an account name, substituting the operating account
    pub fn resolve<'a>(&'a self, operating: &'a str) -> &'a str {
        match self {
            Self::Operating => operating,
            Self::Account(name) => name,
        }
    }
}

impl fmt::Display for SplitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operating => write!(f, "{}", OPERATING_KEY),
            Self::Account(name) => write!(f, "{}", name),
        }
    }
}

/// Parsed split: target -> signed amount, in field order
pub type Split = IndexMap<SplitTarget, Money>;

/// Whether a field uses the structured multi-account notation
pub fn is_structured(field: &str) -> bool {
    field.contains('{')
}

/// Parse a split field against the signed amount it must add up to
pub fn parse_split(field: &str, amount: Money) -> LedgerResult<Split> {
    let mut split = Split::new();

    if !is_structured(field) {
        split.insert(SplitTarget::from_key(field), amount);
        return Ok(split);
    }

    for (key, value) in LiteralParser::new(field).parse()? {
        let target = SplitTarget::from_key(&key);
        if split.insert(target, value).is_some() {
            return Err(malformed(field, format!("duplicate account '{}'", key)));
        }
    }

    if split.is_empty() {
        return Err(malformed(field, "no accounts"));
    }

    let sum: Money = split.values().sum();
    if sum != amount {
        return Err(LedgerError::UnbalancedSplit {
            field: field.to_string(),
            sum: sum.to_string(),
            expected: amount.to_string(),
        });
    }

    Ok(split)
}

fn malformed(field: &str, reason: impl Into<String>) -> LedgerError {
    LedgerError::MalformedSplit {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Recursive-descent parser for `{ "key": number, ... }`
struct LiteralParser<'a> {
    field: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> LiteralParser<'a> {
    fn new(field: &'a str) -> Self {
        Self {
            field,
            chars: field.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> LedgerResult<Vec<(String, Money)>> {
        let mut entries = Vec::new();

        self.expect('{')?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') => {
                    self.chars.next();
                    break;
                }
                Some('"') | Some('\'') => {
                    let key = self.string()?;
                    self.expect(':')?;
                    let value = self.number()?;
                    entries.push((key, value));

                    self.skip_whitespace();
                    match self.chars.next() {
                        Some((_, ',')) => continue,
                        Some((_, '}')) => break,
                        Some((pos, c)) => {
                            return Err(self.error(format!("unexpected '{}' at {}", c, pos)))
                        }
                        None => return Err(self.error("missing closing '}'")),
                    }
                }
                Some(c) => return Err(self.error(format!("expected a quoted key, found '{}'", c))),
                None => return Err(self.error("missing closing '}'")),
            }
        }

        self.skip_whitespace();
        if let Some((pos, c)) = self.chars.next() {
            return Err(self.error(format!("trailing '{}' at {}", c, pos)));
        }

        Ok(entries)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
        }
    }

    fn expect(&mut self, expected: char) -> LedgerResult<()> {
        self.skip_whitespace();
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((pos, c)) => Err(self.error(format!(
                "expected '{}' at {}, found '{}'",
                expected, pos, c
            ))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn string(&mut self) -> LedgerResult<String> {
        let quote = match self.chars.next() {
            Some((_, c)) => c,
            None => return Err(self.error("expected a quoted key")),
        };

        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, c)) => out.push(c),
                    None => return Err(self.error("unterminated string")),
                },
                Some((_, c)) if c == quote => return Ok(out),
                Some((_, c)) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn number(&mut self) -> LedgerResult<Money> {
        self.skip_whitespace();

        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        if text.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected a number, found '{}'", c)),
                None => self.error("expected a number, found end of input"),
            });
        }

        Money::parse(&text).map_err(|_| self.error(format!("invalid number '{}'", text)))
    }

    fn error(&self, reason: impl Into<String>) -> LedgerError {
        malformed(self.field, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str) -> SplitTarget {
        SplitTarget::Account(name.to_string())
    }

    #[test]
    fn test_plain_account() {
        let split = parse_split("Expenses:Food", Money::from_cents(-500)).unwrap();
        assert_eq!(split.len(), 1);
        assert_eq!(split[&account("Expenses:Food")], Money::from_cents(-500));
    }

    #[test]
    fn test_empty_field_is_operating_account() {
        let split = parse_split("", Money::from_cents(500)).unwrap();
        assert_eq!(split[&SplitTarget::Operating], Money::from_cents(500));
        assert_eq!(SplitTarget::Operating.resolve("Assets:Checking"), "Assets:Checking");
    }

    #[test]
    fn test_structured_split_preserves_order() {
        let field = "{'Expenses:Food': 12.5, \"Expenses:Household\": 7.50, '__this__': -20,}";
        let split = parse_split(field, Money::zero()).unwrap();

        let keys: Vec<_> = split.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                account("Expenses:Food"),
                account("Expenses:Household"),
                SplitTarget::Operating
            ]
        );
        assert_eq!(split[&account("Expenses:Food")], Money::from_cents(1250));
    }

    #[test]
    fn test_unbalanced_split() {
        let err = parse_split("{'A': 1, 'B': 2}", Money::from_cents(400)).unwrap_err();
        match err {
            LedgerError::UnbalancedSplit { sum, expected, .. } => {
                assert_eq!(sum, "$3.00");
                assert_eq!(expected, "$4.00");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_expressions() {
        for field in [
            "{'A': 1 + 2}",
            "{'A': __import__('os')}",
            "{A: 3}",
            "{'A': 3",
            "{'A' 3}",
            "{'A': 3} extra",
            "[('A', 3)]{",
            "{'A': 1.234}",
            "{}",
            "{'A': 1, 'A': 2}",
        ] {
            let err = parse_split(field, Money::from_cents(300)).unwrap_err();
            assert!(
                matches!(err, LedgerError::MalformedSplit { .. }),
                "{field} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_is_structured() {
        assert!(is_structured("{'A': 1}"));
        assert!(!is_structured("Expenses:Food"));
    }
}
