//! Case-insensitive substring filters for the list screens.

use crate::models::{Account, Transaction};

/// The term is matched verbatim, surrounding spaces included.
fn normalize(term: &str) -> Option<String> {
    if term.is_empty() {
        None
    } else {
        Some(term.to_lowercase())
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Accounts whose name or code contains `term`. An empty term keeps everything.
pub fn filter_accounts<'a>(accounts: &'a [Account], term: &str) -> Vec<&'a Account> {
    let Some(needle) = normalize(term) else {
        return accounts.iter().collect();
    };
    accounts
        .iter()
        .filter(|a| contains(&a.name, &needle) || contains(&a.code, &needle))
        .collect()
}

/// Transactions whose reference or description contains `term`.
pub fn filter_transactions<'a>(transactions: &'a [Transaction], term: &str) -> Vec<&'a Transaction> {
    let Some(needle) = normalize(term) else {
        return transactions.iter().collect();
    };
    transactions
        .iter()
        .filter(|t| contains(&t.reference, &needle) || contains(&t.description, &needle))
        .collect()
}
