//! Path ids are UUIDs; anything unparsable is treated as a missing row.

use uuid::Uuid;

use crate::error::AppError;

pub fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound)
}
