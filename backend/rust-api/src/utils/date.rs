//! Query-string date parsing. Empty values mean "no filter".

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Deserialize Option<NaiveDate> from a missing/empty value or "YYYY-MM-DD".
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
