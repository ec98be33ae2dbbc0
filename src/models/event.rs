use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{EventType, FileSlot};

/// A scheduled health event: one professional, one calendar date, one
/// start/end time window. Times are zero-padded `HH:mm` strings, validated
/// before they ever reach the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub professional_id: Uuid,
    pub title: String,
    pub event_type: EventType,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    pub files: Vec<EventFile>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// One attached document record. The event's whole repository is stored as
/// a JSON array of these in the row's `files` column, not a separate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFile {
    pub slot: FileSlot,
    pub name: String,
    pub url: String,
}
