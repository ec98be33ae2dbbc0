//! Professional endpoints — plain CRUD over care providers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::Professional;

#[derive(Deserialize)]
pub struct ProfessionalPayload {
    pub name: String,
    pub specialty: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ProfessionalPayload {
    fn validated_name(&self) -> Result<String, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::BadRequest("Name is required".into()));
        }
        Ok(name.to_string())
    }
}

#[derive(Serialize)]
pub struct ProfessionalResponse {
    pub professional: Professional,
}

#[derive(Serialize)]
pub struct ProfessionalsResponse {
    pub professionals: Vec<Professional>,
}

/// `POST /api/professionals`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<ProfessionalPayload>,
) -> Result<(StatusCode, Json<ProfessionalResponse>), ApiError> {
    let professional = Professional {
        id: Uuid::new_v4(),
        name: payload.validated_name()?,
        specialty: payload.specialty,
        address: payload.address,
        phone: payload.phone,
        email: payload.email,
        created_at: Local::now().naive_local(),
    };

    let conn = ctx.open_db()?;
    repository::insert_professional(&conn, &professional)?;

    tracing::info!(professional_id = %professional.id, "professional created");
    Ok((StatusCode::CREATED, Json(ProfessionalResponse { professional })))
}

/// `GET /api/professionals`
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<ProfessionalsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let professionals = repository::list_professionals(&conn)?;
    Ok(Json(ProfessionalsResponse { professionals }))
}

/// `GET /api/professionals/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfessionalResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let professional = repository::get_professional(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Professional {id} not found")))?;
    Ok(Json(ProfessionalResponse { professional }))
}

/// `PUT /api/professionals/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProfessionalPayload>,
) -> Result<Json<ProfessionalResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let existing = repository::get_professional(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Professional {id} not found")))?;

    let professional = Professional {
        id,
        name: payload.validated_name()?,
        specialty: payload.specialty,
        address: payload.address,
        phone: payload.phone,
        email: payload.email,
        created_at: existing.created_at,
    };
    repository::update_professional(&conn, &professional)?;

    Ok(Json(ProfessionalResponse { professional }))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: Uuid,
}

/// `DELETE /api/professionals/:id` — 400 while events still reference them.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let conn = ctx.open_db()?;
    repository::delete_professional(&conn, &id)?;

    tracing::info!(professional_id = %id, "professional deleted");
    Ok(Json(DeletedResponse { deleted: id }))
}
