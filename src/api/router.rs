//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! JSON routes are nested under `/api/`; the uploaded-file store is served
//! statically under `/files/`. CORS is permissive — the browser UI is the
//! only expected caller and there is no credential to protect.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the full application router.
pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/users", post(endpoints::users::register))
        .route("/users/:id", get(endpoints::users::detail))
        .route(
            "/professionals",
            get(endpoints::professionals::list).post(endpoints::professionals::create),
        )
        .route(
            "/professionals/:id",
            get(endpoints::professionals::detail)
                .put(endpoints::professionals::update)
                .delete(endpoints::professionals::remove),
        )
        .route(
            "/events",
            get(endpoints::events::list).post(endpoints::events::create),
        )
        .route(
            "/events/:id",
            get(endpoints::events::detail)
                .put(endpoints::events::update)
                .delete(endpoints::events::remove),
        )
        .route(
            "/events/:id/files",
            get(endpoints::files::list)
                .post(endpoints::files::upload)
                .delete(endpoints::files::detach),
        )
        .route(
            "/notifications",
            get(endpoints::notifications::list).post(endpoints::notifications::create),
        )
        .route(
            "/notifications/:id/archive",
            post(endpoints::notifications::archive),
        )
        // Base64 upload bodies outgrow the 2 MB default; the storage layer
        // still caps the decoded payload.
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .with_state(ctx.clone());

    Router::new()
        .nest("/api", api)
        .nest_service("/files", ServeDir::new(ctx.uploads_dir().to_path_buf()))
        .layer(CorsLayer::permissive())
}
