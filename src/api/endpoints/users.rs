//! User registration and lookup.
//!
//! There is no session or credential handling: registration just creates
//! a named account, and most requests run as the seeded default user.

use std::sync::LazyLock;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::User;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// `POST /api/users` — register an account.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }
    let email = payload.email.trim().to_lowercase();
    if !EMAIL.is_match(&email) {
        return Err(ApiError::BadRequest(format!(
            "'{}' is not a valid email address",
            payload.email
        )));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email,
        created_at: Local::now().naive_local(),
    };
    let conn = ctx.open_db()?;
    // Duplicate email surfaces as a constraint violation → 400.
    repository::insert_user(&conn, &user)?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

/// `GET /api/users/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let user = repository::get_user(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("User {id} not found")))?;
    Ok(Json(UserResponse { user }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern_accepts_plain_addresses() {
        for ok in ["a@b.co", "first.last@clinic.example.org"] {
            assert!(EMAIL.is_match(ok), "{ok} should match");
        }
    }

    #[test]
    fn email_pattern_rejects_malformed_addresses() {
        for bad in ["", "no-at.example.com", "two@@x.io", "spaces in@x.io", "a@b"] {
            assert!(!EMAIL.is_match(bad), "{bad} should not match");
        }
    }
}
