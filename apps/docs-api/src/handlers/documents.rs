//! Document record endpoints
//!
//! Records are stored whole as JSON. `name`, `type`, `category`, `status`
//! and `created_at` are copied into columns for filtering and ordering.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use document_lifecycle::DocumentQuery;
use serde::Deserialize;
use shared_types::{DocError, Document, DownloadFormat};
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::convert::convert_content;
use crate::error::ApiError;
use crate::handlers::files::load_file;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConvertParams {
    pub format: DownloadFormat,
}

fn validate(document: &Document) -> Result<(), ApiError> {
    if document.id.trim().is_empty() {
        return Err(DocError::validation("id", "document id is required").into());
    }
    if document.name.trim().is_empty() {
        return Err(DocError::validation("name", "document name is required").into());
    }
    Ok(())
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DocumentQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT data FROM documents WHERE 1 = 1");
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(kind) = query.kind {
        builder.push(" AND type = ").push_bind(kind.as_str());
    }
    if let Some(category) = &query.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }
    builder.push(" ORDER BY created_at DESC");

    let rows = builder.build().fetch_all(&state.db).await?;
    let mut documents = Vec::with_capacity(rows.len());
    for row in rows {
        let data: String = row.try_get("data")?;
        let document: Document = serde_json::from_str(&data)?;
        // search spans name and description, so it is applied after decoding
        if query.matches(&document) {
            documents.push(document);
        }
    }
    Ok(Json(documents))
}

pub async fn create_document(
    State(state): State<Arc<AppState>>,
    Json(document): Json<Document>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    validate(&document)?;

    let exists = sqlx::query("SELECT 1 FROM documents WHERE id = ?")
        .bind(&document.id)
        .fetch_optional(&state.db)
        .await?
        .is_some();
    if exists {
        return Err(DocError::validation(
            "id",
            format!("document {} already exists", document.id),
        )
        .into());
    }

    sqlx::query(
        r#"
        INSERT INTO documents (id, name, type, category, status, created_at, data)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&document.id)
    .bind(&document.name)
    .bind(document.kind.as_str())
    .bind(&document.category)
    .bind(document.status.as_str())
    .bind(document.created_at.to_rfc3339())
    .bind(serde_json::to_string(&document)?)
    .execute(&state.db)
    .await?;

    tracing::info!("Created document {} ({})", document.id, document.status);
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    Ok(Json(state.load_document(&id).await?))
}

/// Whole-record replace; the last write wins
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(document): Json<Document>,
) -> Result<Json<Document>, ApiError> {
    validate(&document)?;
    if document.id != id {
        return Err(DocError::validation("id", "document id does not match the path").into());
    }

    let result = sqlx::query(
        r#"
        UPDATE documents
        SET name = ?, type = ?, category = ?, status = ?, data = ?
        WHERE id = ?
        "#,
    )
    .bind(&document.name)
    .bind(document.kind.as_str())
    .bind(&document.category)
    .bind(document.status.as_str())
    .bind(serde_json::to_string(&document)?)
    .bind(&id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DocError::not_found("Document", id).into());
    }
    tracing::debug!("Updated document {} ({})", id, document.status);
    Ok(Json(document))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM documents WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DocError::not_found("Document", id).into());
    }
    tracing::info!("Deleted document {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Uploaded documents return their stored file as-is; generated ones are rendered
pub async fn convert_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ConvertParams>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state.load_document(&id).await?;

    let (mime_type, bytes) = match &document.file {
        Some(file) => {
            let stored = load_file(&state, &file.url).await?;
            (stored.mime_type, stored.data)
        }
        None => {
            let content = document.metadata.content.as_deref().unwrap_or_default();
            let bytes = convert_content(&document.name, content, params.format)?;
            (params.format.mime_type().to_string(), bytes)
        }
    };

    tracing::debug!(
        "Converted document {} to {} ({} bytes)",
        id,
        params.format,
        bytes.len()
    );
    Ok(([(header::CONTENT_TYPE, mime_type)], bytes))
}
