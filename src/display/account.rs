//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use super::report::format_money;
use super::table::Table;
use crate::models::{format_date, Account, Balance};
use crate::services::account::AccountSummary;

/// Format a list of accounts as a table
pub fn format_account_list(accounts: &[Account]) -> String {
    if accounts.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let mut table = Table::new(["Name", "Type", "Created"]);
    for account in accounts {
        table.push_row(vec![
            account.name.clone(),
            account
                .account_type()
                .map(|t| t.to_string())
                .unwrap_or_default(),
            account.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    table.render()
}

/// Format a single account's details
pub fn format_account_details(summary: &AccountSummary, symbol: &str) -> String {
    let account = &summary.account;

    let mut output = String::new();
    output.push_str(&format!("Account: {}\n", account.name));
    if let Some(account_type) = account.account_type() {
        output.push_str(&format!("  Type:     {}\n", account_type));
    }
    output.push_str(&format!("  Posts:    {}\n", summary.post_count));
    match &summary.balance {
        Some(balance) => output.push_str(&format!(
            "  Balance:  {}\n",
            format_balance(balance, symbol)
        )),
        None => output.push_str("  Balance:  (not set)\n"),
    }
    output.push_str(&format!(
        "  Created:  {}\n",
        account.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

/// Format a balance snapshot as `amount on DD/MM/YYYY`
pub fn format_balance(balance: &Balance, symbol: &str) -> String {
    format!(
        "{} on {}",
        format_money(balance.amount, symbol),
        format_date(balance.date)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;

    #[test]
    fn test_format_account_list() {
        let accounts = vec![
            Account::new("Assets:Checking").unwrap(),
            Account::new("Expenses:Food").unwrap(),
        ];
        let output = format_account_list(&accounts);

        assert!(output.starts_with("Name"));
        assert!(output.contains("Assets:Checking  Asset"));
        assert!(output.contains("Expenses:Food    Expense"));
    }

    #[test]
    fn test_format_empty_list() {
        assert_eq!(format_account_list(&[]), "No accounts found.\n");
    }

    #[test]
    fn test_format_account_details() {
        let date = NaiveDate::from_ymd_opt(2019, 1, 31).unwrap();
        let summary = AccountSummary {
            account: Account::new("Assets:Checking").unwrap(),
            balance: Some(Balance::new("Assets:Checking", Money::from_cents(9550), date)),
            post_count: 3,
        };

        let output = format_account_details(&summary, "$");
        assert!(output.contains("Account: Assets:Checking"));
        assert!(output.contains("Type:     Asset"));
        assert!(output.contains("Posts:    3"));
        assert!(output.contains("Balance:  $95.50 on 31/01/2019"));
    }
}
