//! Notification endpoints.
//!
//! Pending reminders are listed per user; archiving happens either here
//! explicitly or atomically with an event write (see the events module).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::{Notification, NotificationStatus};

#[derive(Deserialize)]
pub struct ListQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// `GET /api/notifications` — pending notifications for the acting user.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let user_id = ctx.resolve_user(query.user_id);
    let conn = ctx.open_db()?;
    let notifications = repository::list_pending_notifications(&conn, &user_id)?;
    Ok(Json(NotificationsResponse { notifications }))
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub message: String,
    pub user_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct NotificationResponse {
    pub notification: Notification,
}

/// `POST /api/notifications` — create a pending reminder.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<CreateRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>), ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".into()));
    }

    let notification = Notification {
        id: Uuid::new_v4(),
        user_id: ctx.resolve_user(payload.user_id),
        message: payload.message,
        event_id: None,
        status: NotificationStatus::Pending,
        created_at: Local::now().naive_local(),
        archived_at: None,
    };
    let conn = ctx.open_db()?;
    repository::insert_notification(&conn, &notification)?;

    Ok((StatusCode::CREATED, Json(NotificationResponse { notification })))
}

/// `POST /api/notifications/:id/archive` — archive without an event.
pub async fn archive(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let conn = ctx.open_db()?;
    repository::archive_notification_in(&conn, &id, None)?;
    let notification = repository::get_notification(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Notification {id} not found")))?;

    Ok(Json(NotificationResponse { notification }))
}
