use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::NotificationStatus;

/// A pending reminder. Archiving happens either explicitly or atomically
/// with the event write that resolves it, in which case `event_id` links
/// the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub event_id: Option<Uuid>,
    pub status: NotificationStatus,
    pub created_at: NaiveDateTime,
    pub archived_at: Option<NaiveDateTime>,
}
