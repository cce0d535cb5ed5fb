//! Transaction display formatting
//!
//! Provides utilities for formatting transactions for terminal display,
//! including register views and detail views.

use indexmap::IndexMap;

use super::report::format_money;
use crate::models::{format_date, Money, Transaction};

fn resolved_label(txn: &Transaction) -> String {
    txn.max_date_resolved
        .map(format_date)
        .unwrap_or_else(|| "pending".to_string())
}

/// Format a single transaction for display (register row)
pub fn format_transaction_row(txn: &Transaction, symbol: &str) -> String {
    // Amount moved by the transaction: the sum of its positive posts
    let moved: Money = txn
        .posts
        .iter()
        .map(|p| p.amount)
        .filter(|a| !a.is_negative())
        .sum();

    format!(
        "{} {:10} {:10} {:30} {:>12}",
        txn.id,
        format_date(txn.min_date_occurred),
        resolved_label(txn),
        truncate(&txn.description, 30),
        format_money(moved, symbol)
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(transactions: &[Transaction], symbol: &str) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12} {:10} {:10} {:30} {:>12}\n",
        "ID", "Occurred", "Resolved", "Description", "Amount"
    ));
    output.push_str(&"-".repeat(78));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(txn, symbol));
        output.push('\n');
    }

    output
}

/// Format transaction details for display
///
/// Shows the per-account totals, and with `verbose` every post.
pub fn format_transaction_details(txn: &Transaction, verbose: bool, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id.as_uuid()));
    if let Some(reference) = &txn.reference {
        output.push_str(&format!("Ref:         {}\n", reference));
    }
    if !txn.description.is_empty() {
        output.push_str(&format!("Description: {}\n", txn.description));
    }
    output.push_str(&format!(
        "Occurred:    {}\n",
        format_date(txn.min_date_occurred)
    ));
    output.push_str(&format!("Resolved:    {}\n", resolved_label(txn)));

    let mut by_account: IndexMap<&str, Money> = IndexMap::new();
    for post in &txn.posts {
        *by_account.entry(post.account.as_str()).or_default() += post.amount;
    }
    let width = by_account.keys().map(|a| a.chars().count()).max().unwrap_or(0);

    output.push_str("\nAccounts:\n");
    for (account, amount) in &by_account {
        output.push_str(&format!(
            "  {:width$}  {:>12}\n",
            account,
            format_money(*amount, symbol),
            width = width
        ));
    }

    if verbose {
        output.push_str("\nPosts:\n");
        for (i, post) in txn.posts.iter().enumerate() {
            output.push_str(&format!(
                "  {}. {} {} ({} / {})\n",
                i + 1,
                post.account,
                format_money(post.amount, symbol),
                format_date(post.date_occurred),
                post.date_resolved
                    .map(format_date)
                    .unwrap_or_else(|| "pending".to_string())
            ));
        }
    }

    output
}

/// Truncate a string to a maximum number of characters
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Post, TransactionId};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, day).unwrap()
    }

    fn sample(resolved: Option<u32>) -> Transaction {
        Transaction::from_posts(
            TransactionId::from_key("02/01/2019 R1"),
            Some("R1".into()),
            "Rent A; Rent B",
            vec![
                Post::new("Assets:Checking", Money::from_cents(-1000), d(1), resolved.map(d)),
                Post::new("Expenses:Rent", Money::from_cents(1000), d(1), resolved.map(d)),
                Post::new("Assets:Checking", Money::from_cents(-500), d(1), resolved.map(d)),
                Post::new("Expenses:Rent", Money::from_cents(500), d(1), resolved.map(d)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_format_transaction_row() {
        let formatted = format_transaction_row(&sample(Some(2)), "$");
        assert!(formatted.starts_with("txn-"));
        assert!(formatted.contains("01/01/2019 02/01/2019"));
        assert!(formatted.contains("Rent A; Rent B"));
        assert!(formatted.ends_with("$15.00"));
    }

    #[test]
    fn test_format_empty_register() {
        let formatted = format_transaction_register(&[], "$");
        assert!(formatted.contains("No transactions found"));
    }

    #[test]
    fn test_details_sum_per_account() {
        let formatted = format_transaction_details(&sample(Some(2)), false, "$");
        assert!(formatted.contains("Ref:         R1"));
        assert!(formatted.contains("Resolved:    02/01/2019"));
        assert!(formatted.contains("  Assets:Checking       -$15.00\n"));
        assert!(formatted.contains("  Expenses:Rent          $15.00\n"));
        assert!(!formatted.contains("Posts:"));
    }

    #[test]
    fn test_verbose_details_list_posts() {
        let formatted = format_transaction_details(&sample(None), true, "$");
        assert!(formatted.contains("Resolved:    pending"));
        assert!(formatted.contains("Posts:\n  1. Assets:Checking -$10.00 (01/01/2019 / pending)"));
        assert!(formatted.contains("  4. Expenses:Rent $5.00"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Short", 10), "Short");
        let result = truncate("A very long string", 10);
        assert_eq!(result.chars().count(), 10);
        assert!(result.ends_with("..."));
    }
}
