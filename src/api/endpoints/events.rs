//! Health-event endpoints.
//!
//! Create and update run the same gauntlet: field validation (400 with a
//! per-field map), professional resolution (404), then the conflict scan
//! against the professional's same-date bookings (400 naming the
//! conflicting window). A `notification_id` on the payload is archived in
//! the same transaction as the event write.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::{EventType, HealthEvent};
use crate::schedule::{self, EventSchedule};
use crate::storage;

#[derive(Deserialize)]
pub struct EventPayload {
    pub user_id: Option<Uuid>,
    pub professional_id: Uuid,
    pub title: String,
    pub event_type: EventType,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    /// Pending notification resolved by this write, archived atomically.
    pub notification_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct EventResponse {
    pub event: HealthEvent,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<HealthEvent>,
}

/// Shared create/update gauntlet up to a validated schedule.
fn validated_schedule(payload: &EventPayload) -> Result<EventSchedule, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".into()));
    }
    let today = Local::now().date_naive();
    schedule::validate_event_datetime(
        &payload.date,
        &payload.start_time,
        &payload.end_time,
        today,
    )
    .map_err(ApiError::Validation)
}

/// Reject the write when the professional already has an intersecting
/// booking that day. `exclude` drops the event being rescheduled from the
/// scan so it cannot conflict with itself.
fn check_conflict(
    conn: &Connection,
    professional_id: &Uuid,
    sched: &EventSchedule,
    exclude: Option<&Uuid>,
) -> Result<(), ApiError> {
    let mut bookings = repository::list_bookings_on(conn, professional_id, sched.date)?;
    if let Some(id) = exclude {
        bookings.retain(|b| b.event_id != *id);
    }
    if let Some(hit) = schedule::find_conflict(sched.start_min, sched.end_min, &bookings) {
        return Err(ApiError::Conflict(format!(
            "Time conflicts with '{}' from {} to {}",
            hit.title,
            schedule::format_minutes(hit.start_min),
            schedule::format_minutes(hit.end_min),
        )));
    }
    Ok(())
}

fn resolve_professional(conn: &Connection, id: &Uuid) -> Result<(), ApiError> {
    repository::get_professional(conn, id)?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("Professional {id} not found")))
}

/// `POST /api/events` — schedule a new event.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<EventPayload>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let sched = validated_schedule(&payload)?;

    let mut conn = ctx.open_db()?;
    resolve_professional(&conn, &payload.professional_id)?;
    check_conflict(&conn, &payload.professional_id, &sched, None)?;

    let event = HealthEvent {
        id: Uuid::new_v4(),
        user_id: ctx.resolve_user(payload.user_id),
        professional_id: payload.professional_id,
        title: payload.title,
        event_type: payload.event_type,
        date: sched.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        notes: payload.notes,
        files: Vec::new(),
        created_at: Local::now().naive_local(),
        updated_at: None,
    };
    repository::create_event_with_notification(
        &mut conn,
        &event,
        payload.notification_id.as_ref(),
    )?;

    tracing::info!(event_id = %event.id, date = %event.date, "event created");
    Ok((StatusCode::CREATED, Json(EventResponse { event })))
}

#[derive(Deserialize)]
pub struct EventsQuery {
    pub user_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    pub date: Option<String>,
}

/// `GET /api/events` — list, optionally filtered by user, professional,
/// and calendar date.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let date = match &query.date {
        Some(text) => Some(schedule::parse_date(text).ok_or_else(|| {
            ApiError::BadRequest(format!("'{text}' is not a valid date filter"))
        })?),
        None => None,
    };

    let conn = ctx.open_db()?;
    let events = repository::list_events(
        &conn,
        &repository::EventFilter {
            user_id: query.user_id,
            professional_id: query.professional_id,
            date,
        },
    )?;
    Ok(Json(EventsResponse { events }))
}

/// `GET /api/events/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let event = repository::get_event(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Event {id} not found")))?;
    Ok(Json(EventResponse { event }))
}

/// `PUT /api/events/:id` — reschedule or re-describe an event.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventPayload>,
) -> Result<Json<EventResponse>, ApiError> {
    let sched = validated_schedule(&payload)?;

    let mut conn = ctx.open_db()?;
    let existing = repository::get_event(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Event {id} not found")))?;
    resolve_professional(&conn, &payload.professional_id)?;
    check_conflict(&conn, &payload.professional_id, &sched, Some(&id))?;

    let event = HealthEvent {
        id,
        user_id: existing.user_id,
        professional_id: payload.professional_id,
        title: payload.title,
        event_type: payload.event_type,
        date: sched.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        notes: payload.notes,
        files: existing.files,
        created_at: existing.created_at,
        updated_at: Some(Local::now().naive_local()),
    };

    let tx = conn.transaction().map_err(ApiError::from)?;
    repository::update_event(&tx, &event)?;
    if let Some(notification_id) = &payload.notification_id {
        repository::archive_notification_in(&tx, notification_id, Some(&id))?;
    }
    tx.commit().map_err(ApiError::from)?;

    tracing::info!(event_id = %id, "event updated");
    Ok(Json(EventResponse { event }))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: Uuid,
}

/// `DELETE /api/events/:id` — remove the event and its stored files.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let conn = ctx.open_db()?;
    repository::get_event(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Event {id} not found")))?;
    repository::delete_event(&conn, &id)?;
    storage::remove_event_dir(ctx.uploads_dir(), &id);

    tracing::info!(event_id = %id, "event deleted");
    Ok(Json(DeletedResponse { deleted: id }))
}
