// [libs/infra/store/src/time.rs]
//! Timestamp round-tripping. Writes always use RFC 3339; reads tolerate
//! the bare `datetime('now')` format SQLite stamps onto column defaults
//! so rows created outside an explicit insert still parse.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::errors::StoreError;

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::Mapping(format!("unparseable timestamp '{raw}': {e}")))
}

pub fn parse_timestamp_opt(raw: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    raw.map(|s| parse_timestamp(&s)).transpose()
}
