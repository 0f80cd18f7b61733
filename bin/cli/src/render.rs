//! Plain-text tables for command output.
//!
//! Width specifiers are applied to strings, so typed columns are rendered
//! with `to_string()` first.

use chrono::{DateTime, Utc};
use client_balance_api::{Account, Transaction};
use client_balance_platform_access::User;
use std::fmt::Write;

/// Formats a monetary amount with two decimals.
#[must_use]
pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string())
}

/// One line per account, followed by the total balance.
#[must_use]
pub fn accounts(accounts: &[Account], total: f64) -> String {
    if accounts.is_empty() {
        return "No accounts.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:>6}  {:<14} {:<10} {:>14}", "ID", "NUMBER", "TYPE", "BALANCE");
    for account in accounts {
        let _ = writeln!(
            out,
            "{:>6}  {:<14} {:<10} {:>14}",
            account.id.to_string(),
            account.account_number,
            account.kind.as_deref().unwrap_or("-"),
            money(account.balance),
        );
    }
    let _ = writeln!(out, "{:>47}", format!("total {}", money(total)));
    out
}

/// Details of one account.
#[must_use]
pub fn account(account: &Account) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Account #{} ({})", account.id, account.account_number);
    let _ = writeln!(out, "  balance: {}", money(account.balance));
    if let Some(kind) = &account.kind {
        let _ = writeln!(out, "  type:    {kind}");
    }
    if let Some(status) = &account.status {
        let _ = writeln!(out, "  status:  {status}");
    }
    if let Some(name) = &account.name {
        let _ = writeln!(out, "  name:    {name}");
    }
    let _ = writeln!(out, "  opened:  {}", date(account.created_at));
    out
}

#[must_use]
pub fn transactions(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16}  {:<8} {:>12} {:>14}  {}",
        "DATE", "KIND", "AMOUNT", "BALANCE", "DESCRIPTION"
    );
    for tx in transactions {
        let _ = writeln!(
            out,
            "{:<16}  {:<8} {:>12} {:>14}  {}",
            date(tx.created_at),
            tx.kind.to_string(),
            money(tx.amount),
            money(tx.balance_after),
            tx.description.as_deref().unwrap_or(""),
        );
    }
    out
}

/// Details of one user.
#[must_use]
pub fn user(user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} <{}>", user.name(), user.email());
    let _ = writeln!(out, "  id:     {}", user.id());
    let _ = writeln!(out, "  role:   {}", user.role());
    let _ = writeln!(out, "  status: {}", user.status());
    out
}

#[must_use]
pub fn users(users: &[User]) -> String {
    if users.is_empty() {
        return "No users.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:>6}  {:<24} {:<32} {:<7} {}", "ID", "NAME", "EMAIL", "ROLE", "STATUS");
    for user in users {
        let _ = writeln!(
            out,
            "{:>6}  {:<24} {:<32} {:<7} {}",
            user.id().to_string(),
            user.name(),
            user.email(),
            user.role().to_string(),
            user.status(),
        );
    }
    out
}
