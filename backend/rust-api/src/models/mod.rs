//! Wire and row types for the ledger. Money is `Decimal` (serialized as a
//! string), dates are chrono types, ids are UUIDs.

pub mod account;
pub mod ids;
pub mod page;
pub mod transaction;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use account::{AccountListQuery, AccountResponse, CreateAccountRequest, UpdateAccountRequest};
pub use page::Page;
pub use transaction::{
    CreateTransactionRequest, EntryRequest, EntryResponse, TransactionListQuery, TransactionResponse,
    UpdateTransactionRequest,
};

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("\"{}\" is not a valid choice.", other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(AccountType {
    Asset => "asset",
    Liability => "liability",
    Equity => "equity",
    Revenue => "revenue",
    Expense => "expense",
});

string_enum!(TransactionStatus {
    Draft => "draft",
    Pending => "pending",
    Posted => "posted",
    Cancelled => "cancelled",
});

string_enum!(EntryType {
    Debit => "debit",
    Credit => "credit",
});

/// Read a text column into one of the enums above.
pub(crate) fn decode_column<T>(row: &sqlx::postgres::PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = String>,
{
    use sqlx::Row;
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.into(),
    })
}
