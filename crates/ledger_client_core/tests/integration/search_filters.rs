use ledger_client_core::search::{filter_accounts, filter_transactions};
use ledger_client_core::{AccountType, TransactionStatus};
use pretty_assertions::assert_eq;

use crate::common::{account, date, transaction};

#[test]
fn accounts_match_name_or_code_ignoring_case() {
    let accounts = vec![
        account("a1", "1000", "Cash", AccountType::Asset, 0),
        account("a2", "1100", "Accounts Receivable", AccountType::Asset, 0),
        account("a3", "2000", "Accounts Payable", AccountType::Liability, 0),
    ];
    let names = |term: &str| -> Vec<String> {
        filter_accounts(&accounts, term).iter().map(|a| a.name.clone()).collect()
    };
    assert_eq!(names("CASH"), vec!["Cash"]);
    assert_eq!(names("accounts"), vec!["Accounts Receivable", "Accounts Payable"]);
    assert_eq!(names("11"), vec!["Accounts Receivable"]);
    assert!(names("inventory").is_empty());
}

#[test]
fn empty_term_keeps_everything() {
    let accounts = vec![
        account("a1", "1000", "Cash", AccountType::Asset, 0),
        account("a2", "2000", "Loan", AccountType::Liability, 0),
    ];
    assert_eq!(filter_accounts(&accounts, "").len(), 2);
    // Whitespace is part of the term, not a blank search.
    assert!(filter_accounts(&accounts, "   ").is_empty());
}

#[test]
fn surrounding_spaces_are_part_of_the_term() {
    let accounts = vec![
        account("a1", "1000", "Cash", AccountType::Asset, 0),
        account("a2", "1010", "Petty Cash", AccountType::Asset, 0),
    ];
    let names: Vec<&str> = filter_accounts(&accounts, " cash")
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["Petty Cash"]);

    let txs = vec![
        transaction("t1", "INV-001", "Rent", TransactionStatus::Posted, date(2025, 3, 1), 10),
        transaction("t2", "INV-002", "Office rent", TransactionStatus::Posted, date(2025, 3, 2), 10),
    ];
    let ids: Vec<&str> = filter_transactions(&txs, " RENT").iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t2"]);
}

#[test]
fn transactions_match_reference_or_description() {
    let txs = vec![
        transaction("t1", "INV-001", "Office supplies", TransactionStatus::Posted, date(2025, 3, 1), 10),
        transaction("t2", "PAY-042", "Rent for March", TransactionStatus::Pending, date(2025, 3, 2), 10),
    ];
    let ids = |term: &str| -> Vec<String> {
        filter_transactions(&txs, term).iter().map(|t| t.id.clone()).collect()
    };
    assert_eq!(ids("inv"), vec!["t1"]);
    assert_eq!(ids("march"), vec!["t2"]);
    assert_eq!(ids(""), vec!["t1", "t2"]);
    assert!(ids("payroll").is_empty());
}
