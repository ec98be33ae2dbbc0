use std::str::FromStr;

use chrono::Local;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Notification, NotificationStatus};

const COLUMNS: &str = "id, user_id, message, event_id, status, created_at, archived_at";

struct NotificationRow {
    id: String,
    user_id: String,
    message: String,
    event_id: Option<String>,
    status: String,
    created_at: String,
    archived_at: Option<String>,
}

fn map_notification(row: &Row) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        message: row.get(2)?,
        event_id: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        archived_at: row.get(6)?,
    })
}

fn build_notification(raw: NotificationRow) -> Result<Notification, DatabaseError> {
    let archived_at = raw
        .archived_at
        .map(|t| super::parse_timestamp(&t, "notifications.archived_at"))
        .transpose()?;
    Ok(Notification {
        id: Uuid::parse_str(&raw.id).unwrap_or_default(),
        user_id: Uuid::parse_str(&raw.user_id).unwrap_or_default(),
        message: raw.message,
        event_id: raw.event_id.and_then(|e| Uuid::parse_str(&e).ok()),
        status: NotificationStatus::from_str(&raw.status)?,
        created_at: super::parse_timestamp(&raw.created_at, "notifications.created_at")?,
        archived_at,
    })
}

pub fn insert_notification(conn: &Connection, n: &Notification) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, user_id, message, event_id, status, created_at, archived_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            n.id.to_string(),
            n.user_id.to_string(),
            n.message,
            n.event_id.map(|e| e.to_string()),
            n.status.as_str(),
            n.created_at.to_string(),
            n.archived_at.map(|t| t.to_string()),
        ],
    )?;
    Ok(())
}

pub fn get_notification(conn: &Connection, id: &Uuid) -> Result<Option<Notification>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {COLUMNS} FROM notifications WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], map_notification) {
        Ok(raw) => Ok(Some(build_notification(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Pending notifications for one user, newest first.
pub fn list_pending_notifications(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM notifications
         WHERE user_id = ?1 AND status = 'pending'
         ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![user_id.to_string()], map_notification)?;
    rows.map(|r| build_notification(r?)).collect()
}

/// Archive a notification, optionally linking the event that resolved it.
/// Works on a plain connection or inside a transaction (the event-write
/// path passes its `Transaction` here).
pub fn archive_notification_in(
    conn: &Connection,
    id: &Uuid,
    event_id: Option<&Uuid>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE notifications
         SET status = 'archived', archived_at = ?2, event_id = COALESCE(?3, event_id)
         WHERE id = ?1",
        params![
            id.to_string(),
            Local::now().naive_local().to_string(),
            event_id.map(|e| e.to_string()),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Notification".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
