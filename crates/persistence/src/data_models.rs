// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversions between stored column values and domain values.
//!
//! Enumerations are stored by their `as_str` form and timestamps as RFC 3339
//! strings normalised to UTC. A value that fails to parse back is reported
//! as [`PersistenceError::CorruptRow`] naming the table it came from.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::error::PersistenceError;

/// Formats a timestamp for storage.
///
/// # Errors
///
/// Returns `SerializationError` if the timestamp cannot be formatted.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Parses a stored timestamp.
///
/// # Errors
///
/// Returns `CorruptRow` if the value is not RFC 3339.
pub fn parse_timestamp(
    table: &'static str,
    value: &str,
) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| PersistenceError::CorruptRow {
        table,
        reason: format!("invalid timestamp '{value}': {e}"),
    })
}

/// Parses a stored enumeration or other `FromStr` column.
///
/// # Errors
///
/// Returns `CorruptRow` if the value is not recognised.
pub fn parse_column<T>(table: &'static str, value: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse::<T>().map_err(|e| PersistenceError::CorruptRow {
        table,
        reason: e.to_string(),
    })
}

/// Encodes a string map as a JSON object.
///
/// # Errors
///
/// Returns `SerializationError` if encoding fails.
pub fn encode_map(map: &BTreeMap<String, String>) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(map)?)
}

/// Decodes a string map stored as a JSON object.
///
/// # Errors
///
/// Returns `CorruptRow` if the column does not hold a JSON object of strings.
pub fn decode_map(
    table: &'static str,
    value: &str,
) -> Result<BTreeMap<String, String>, PersistenceError> {
    serde_json::from_str(value).map_err(|e| PersistenceError::CorruptRow {
        table,
        reason: format!("invalid JSON map: {e}"),
    })
}

/// Stored form of a boolean flag.
#[must_use]
pub fn flag(value: bool) -> i32 {
    i32::from(value)
}

/// Converts a stored count to `u64`.
#[must_use]
pub fn count_to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
