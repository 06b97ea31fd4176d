//! Docs API - backend for lease templates and documents
//!
//! Provides REST endpoints for:
//! - Template library CRUD, duplication, activation and rendering
//! - Document records with status/type/category/search filters
//! - File upload and download
//! - PDF conversion of generated document content

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod convert;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

use handlers::{documents, files, templates};

/// Room for base64 expansion and the JSON envelope around an upload
fn body_limit(max_upload_bytes: u64) -> usize {
    let encoded = max_upload_bytes.saturating_mul(4) / 3 + 4;
    usize::try_from(encoded.saturating_add(64 * 1024)).unwrap_or(usize::MAX)
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/api/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/api/templates/:id",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route(
            "/api/templates/:id/duplicate",
            post(templates::duplicate_template),
        )
        .route("/api/templates/:id/toggle", post(templates::toggle_template))
        .route("/api/templates/:id/use", post(templates::use_template))
        .route(
            "/api/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/api/documents/:id",
            get(documents::get_document)
                .put(documents::update_document)
                .delete(documents::delete_document),
        )
        .route(
            "/api/documents/:id/convert",
            get(documents::convert_document),
        )
        .route("/api/files", post(files::upload_file))
        .route(
            "/api/files/:id",
            get(files::download_file).delete(files::delete_file),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .layer(DefaultBodyLimit::max(body_limit(state.max_upload_bytes)))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
