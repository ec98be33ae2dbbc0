//! Shared types for the API layer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::db::sqlite::open_database;

/// Shared context for all API routes.
///
/// Holds paths rather than a live connection: each request opens its own
/// SQLite connection, so no lock is ever held across an `.await` point.
#[derive(Clone)]
pub struct ApiContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    db_path: PathBuf,
    uploads_dir: PathBuf,
    default_user: Uuid,
}

impl ApiContext {
    pub fn new(db_path: PathBuf, uploads_dir: PathBuf, default_user: Uuid) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                db_path,
                uploads_dir,
                default_user,
            }),
        }
    }

    /// Open a fresh connection for this request.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        open_database(&self.inner.db_path).map_err(|e| ApiError::Internal(e.to_string()))
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.inner.uploads_dir
    }

    /// Resolve the acting user: the explicit parameter when given,
    /// otherwise the seeded default user.
    pub fn resolve_user(&self, explicit: Option<Uuid>) -> Uuid {
        explicit.unwrap_or(self.inner.default_user)
    }
}
