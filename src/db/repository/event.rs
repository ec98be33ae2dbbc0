use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{EventFile, EventType, HealthEvent};
use crate::schedule::{self, Booking};

const COLUMNS: &str =
    "id, user_id, professional_id, title, event_type, date, start_time, end_time, notes, files, created_at, updated_at";

struct EventRow {
    id: String,
    user_id: String,
    professional_id: String,
    title: String,
    event_type: String,
    date: String,
    start_time: String,
    end_time: String,
    notes: Option<String>,
    files: String,
    created_at: String,
    updated_at: Option<String>,
}

fn map_event(row: &Row) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        professional_id: row.get(2)?,
        title: row.get(3)?,
        event_type: row.get(4)?,
        date: row.get(5)?,
        start_time: row.get(6)?,
        end_time: row.get(7)?,
        notes: row.get(8)?,
        files: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn build_event(raw: EventRow) -> Result<HealthEvent, DatabaseError> {
    let files: Vec<EventFile> =
        serde_json::from_str(&raw.files).map_err(|e| DatabaseError::CorruptColumn {
            column: "events.files".into(),
            reason: e.to_string(),
        })?;
    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").map_err(|e| {
        DatabaseError::CorruptColumn {
            column: "events.date".into(),
            reason: e.to_string(),
        }
    })?;
    let updated_at = raw
        .updated_at
        .map(|t| super::parse_timestamp(&t, "events.updated_at"))
        .transpose()?;
    Ok(HealthEvent {
        id: Uuid::parse_str(&raw.id).unwrap_or_default(),
        user_id: Uuid::parse_str(&raw.user_id).unwrap_or_default(),
        professional_id: Uuid::parse_str(&raw.professional_id).unwrap_or_default(),
        title: raw.title,
        event_type: EventType::from_str(&raw.event_type)?,
        date,
        start_time: raw.start_time,
        end_time: raw.end_time,
        notes: raw.notes,
        files,
        created_at: super::parse_timestamp(&raw.created_at, "events.created_at")?,
        updated_at,
    })
}

fn files_json(files: &[EventFile]) -> Result<String, DatabaseError> {
    serde_json::to_string(files).map_err(|e| DatabaseError::CorruptColumn {
        column: "events.files".into(),
        reason: e.to_string(),
    })
}

pub fn insert_event(conn: &Connection, event: &HealthEvent) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO events (id, user_id, professional_id, title, event_type, date,
         start_time, end_time, notes, files, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            event.id.to_string(),
            event.user_id.to_string(),
            event.professional_id.to_string(),
            event.title,
            event.event_type.as_str(),
            event.date.to_string(),
            event.start_time,
            event.end_time,
            event.notes,
            files_json(&event.files)?,
            event.created_at.to_string(),
            event.updated_at.map(|t| t.to_string()),
        ],
    )?;
    Ok(())
}

/// Insert an event and, when a notification is named, archive it in the
/// same transaction — both writes land or neither does.
pub fn create_event_with_notification(
    conn: &mut Connection,
    event: &HealthEvent,
    notification_id: Option<&Uuid>,
) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO events (id, user_id, professional_id, title, event_type, date,
         start_time, end_time, notes, files, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            event.id.to_string(),
            event.user_id.to_string(),
            event.professional_id.to_string(),
            event.title,
            event.event_type.as_str(),
            event.date.to_string(),
            event.start_time,
            event.end_time,
            event.notes,
            files_json(&event.files)?,
            event.created_at.to_string(),
            event.updated_at.map(|t| t.to_string()),
        ],
    )?;
    if let Some(notification_id) = notification_id {
        super::archive_notification_in(&tx, notification_id, Some(&event.id))?;
    }
    tx.commit()?;
    Ok(())
}

pub fn get_event(conn: &Connection, id: &Uuid) -> Result<Option<HealthEvent>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM events WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], map_event) {
        Ok(raw) => Ok(Some(build_event(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Optional filters for event listings. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter {
    pub user_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

pub fn list_events(conn: &Connection, filter: &EventFilter) -> Result<Vec<HealthEvent>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM events
         WHERE (?1 IS NULL OR user_id = ?1)
           AND (?2 IS NULL OR professional_id = ?2)
           AND (?3 IS NULL OR date = ?3)
         ORDER BY date DESC, start_time ASC"
    ))?;
    let rows = stmt.query_map(
        params![
            filter.user_id.map(|u| u.to_string()),
            filter.professional_id.map(|p| p.to_string()),
            filter.date.map(|d| d.to_string()),
        ],
        map_event,
    )?;
    rows.map(|r| build_event(r?)).collect()
}

/// Rewrite every scheduling and descriptive field of an event; `files`
/// and `created_at` are left as they are.
pub fn update_event(conn: &Connection, event: &HealthEvent) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE events
         SET professional_id = ?2, title = ?3, event_type = ?4, date = ?5,
             start_time = ?6, end_time = ?7, notes = ?8, updated_at = ?9
         WHERE id = ?1",
        params![
            event.id.to_string(),
            event.professional_id.to_string(),
            event.title,
            event.event_type.as_str(),
            event.date.to_string(),
            event.start_time,
            event.end_time,
            event.notes,
            event.updated_at.map(|t| t.to_string()),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Event".into(),
            id: event.id.to_string(),
        });
    }
    Ok(())
}

/// Replace the event's file repository (the JSON `files` column).
pub fn update_event_files(
    conn: &Connection,
    id: &Uuid,
    files: &[EventFile],
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE events SET files = ?2 WHERE id = ?1",
        params![id.to_string(), files_json(files)?],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Event".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_event(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM events WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Event".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Load one professional's bookings on one calendar date as normalized
/// time windows, ready for the conflict scan.
pub fn list_bookings_on(
    conn: &Connection,
    professional_id: &Uuid,
    date: NaiveDate,
) -> Result<Vec<Booking>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, start_time, end_time FROM events
         WHERE professional_id = ?1 AND date = ?2
         ORDER BY start_time ASC",
    )?;
    let rows = stmt.query_map(params![professional_id.to_string(), date.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut bookings = Vec::new();
    for row in rows {
        let (id, title, start, end) = row?;
        let start_min = schedule::parse_time(&start).ok_or_else(|| DatabaseError::CorruptColumn {
            column: "events.start_time".into(),
            reason: format!("'{start}' is not HH:mm"),
        })?;
        let end_min = schedule::parse_time(&end).ok_or_else(|| DatabaseError::CorruptColumn {
            column: "events.end_time".into(),
            reason: format!("'{end}' is not HH:mm"),
        })?;
        bookings.push(Booking {
            event_id: Uuid::parse_str(&id).unwrap_or_default(),
            title,
            start_min,
            end_min,
        });
    }
    Ok(bookings)
}
