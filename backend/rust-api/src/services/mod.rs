pub mod ledger;
pub mod tokens;
