//! Report formatting utilities for terminal output

use crate::models::Money;

/// Format a ratio as a percentage with two decimals, e.g. `0.3` -> `30.00%`
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Format an amount with the configured currency symbol
pub fn format_money(amount: Money, symbol: &str) -> String {
    amount.format_with_symbol(symbol)
}

/// Format a header line followed by an underline of the same width
pub fn format_header(title: &str) -> String {
    format!("{}\n{}\n", title, "=".repeat(title.chars().count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(0.3), "30.00%");
        assert_eq!(format_ratio(0.15), "15.00%");
        assert_eq!(format_ratio(-1.5), "-150.00%");
    }

    #[test]
    fn test_format_money_with_symbol() {
        assert_eq!(format_money(Money::from_cents(-1234), "€"), "-€12.34");
    }

    #[test]
    fn test_format_header() {
        assert_eq!(format_header("Budget 1"), "Budget 1\n========\n");
    }
}
