//! Repository layer — entity-scoped database operations.
//!
//! Plain functions over `&Connection`, one sub-module per entity. All
//! public functions are re-exported here.

mod event;
mod notification;
mod professional;
mod user;

pub use event::*;
pub use notification::*;
pub use professional::*;
pub use user::*;

use chrono::NaiveDateTime;

use super::DatabaseError;

/// Parse a stored timestamp, accepting both the space-separated and the
/// `T`-separated form.
pub(crate) fn parse_timestamp(raw: &str, column: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| DatabaseError::CorruptColumn {
            column: column.into(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timestamp_accepts_both_separators() {
        assert!(parse_timestamp("2025-01-15 10:00:00", "t").is_ok());
        assert!(parse_timestamp("2025-01-15T10:00:00", "t").is_ok());
        assert!(parse_timestamp("2025-01-15 10:00:00.123456", "t").is_ok());
    }

    #[test]
    fn parse_timestamp_reports_column() {
        let err = parse_timestamp("not-a-time", "events.created_at").unwrap_err();
        assert!(err.to_string().contains("events.created_at"));
    }
}
