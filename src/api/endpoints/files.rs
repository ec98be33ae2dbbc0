//! Per-event document repository endpoints.
//!
//! `POST /api/events/:id/files` — attach an uploaded file to a slot
//! `GET  /api/events/:id/files` — repository listing grouped by slot
//! `DELETE /api/events/:id/files?slot=&name=` — detach a file record
//!
//! Uploads arrive as base64 data URLs in JSON. The decoded bytes are
//! written once to the local store; the event row only carries the
//! `{slot, name, url}` record in its JSON `files` column.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::{EventFile, FileSlot, HealthEvent};
use crate::storage;

#[derive(Deserialize)]
pub struct UploadRequest {
    pub slot: FileSlot,
    pub name: String,
    /// Base64 data URL (e.g., `data:application/pdf;base64,JVBE...`)
    pub data: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub file: EventFile,
}

fn load_event(ctx: &ApiContext, id: &Uuid) -> Result<(rusqlite::Connection, HealthEvent), ApiError> {
    let conn = ctx.open_db()?;
    let event = repository::get_event(&conn, id)?
        .ok_or_else(|| ApiError::NotFound(format!("Event {id} not found")))?;
    Ok((conn, event))
}

/// `POST /api/events/:id/files` — store an upload and attach its record.
pub async fn upload(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UploadRequest>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("File name is required".into()));
    }

    let (conn, mut event) = load_event(&ctx, &id)?;
    let stored = storage::store_event_file(ctx.uploads_dir(), &event.id, &payload.data)?;

    let record = EventFile {
        slot: payload.slot,
        name: payload.name,
        url: stored.url,
    };
    event.files.push(record.clone());
    repository::update_event_files(&conn, &event.id, &event.files)?;

    tracing::info!(event_id = %event.id, slot = record.slot.as_str(), "file attached");
    Ok((StatusCode::CREATED, Json(UploadResponse { file: record })))
}

#[derive(Serialize)]
pub struct SlotGroup {
    pub slot: FileSlot,
    pub files: Vec<EventFile>,
}

#[derive(Serialize)]
pub struct RepositoryResponse {
    pub event_id: Uuid,
    pub slots: Vec<SlotGroup>,
}

/// `GET /api/events/:id/files` — the event's repository grouped by slot.
/// Empty slots are omitted; group order follows the canonical slot order.
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<RepositoryResponse>, ApiError> {
    let (_conn, event) = load_event(&ctx, &id)?;

    let slots = FileSlot::ALL
        .iter()
        .filter_map(|slot| {
            let files: Vec<EventFile> = event
                .files
                .iter()
                .filter(|f| f.slot == *slot)
                .cloned()
                .collect();
            (!files.is_empty()).then_some(SlotGroup { slot: *slot, files })
        })
        .collect();

    Ok(Json(RepositoryResponse {
        event_id: event.id,
        slots,
    }))
}

#[derive(Deserialize)]
pub struct DetachQuery {
    pub slot: FileSlot,
    pub name: String,
}

#[derive(Serialize)]
pub struct FilesResponse {
    pub files: Vec<EventFile>,
}

/// `DELETE /api/events/:id/files?slot=&name=` — drop the first matching
/// record and best-effort remove the stored file.
pub async fn detach(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<DetachQuery>,
) -> Result<Json<FilesResponse>, ApiError> {
    let (conn, mut event) = load_event(&ctx, &id)?;

    let position = event
        .files
        .iter()
        .position(|f| f.slot == query.slot && f.name == query.name)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No '{}' file named '{}' on event {id}",
                query.slot.as_str(),
                query.name
            ))
        })?;

    let removed = event.files.remove(position);
    repository::update_event_files(&conn, &event.id, &event.files)?;
    storage::remove_event_file(ctx.uploads_dir(), &event.id, &removed.url);

    tracing::info!(event_id = %event.id, name = %removed.name, "file detached");
    Ok(Json(FilesResponse { files: event.files }))
}
