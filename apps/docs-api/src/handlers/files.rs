//! File storage endpoints
//!
//! Uploads arrive base64-encoded in JSON and are served back raw.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use document_lifecycle::ALLOWED_UPLOAD_TYPES;
use serde::Deserialize;
use shared_types::{DocError, StoredFile};
use sqlx::Row;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

const FILES_PREFIX: &str = "/api/files/";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    pub file_name: String,
    pub mime_type: String,
    pub data: String,
}

pub struct FileRow {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadFileRequest>,
) -> Result<(StatusCode, Json<StoredFile>), ApiError> {
    if req.file_name.trim().is_empty() {
        return Err(DocError::validation("fileName", "file name is required").into());
    }
    let mime_type = req.mime_type.trim().to_ascii_lowercase();
    if !ALLOWED_UPLOAD_TYPES.contains(&mime_type.as_str()) {
        return Err(DocError::validation(
            "mimeType",
            format!("unsupported file type '{}'", req.mime_type),
        )
        .into());
    }

    let data = BASE64
        .decode(&req.data)
        .map_err(|e| DocError::validation("data", format!("invalid base64: {}", e)))?;
    if data.is_empty() {
        return Err(DocError::validation("data", "file is empty").into());
    }
    if data.len() as u64 > state.max_upload_bytes {
        return Err(DocError::validation(
            "data",
            format!("file exceeds the {} byte limit", state.max_upload_bytes),
        )
        .into());
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO files (id, file_name, mime_type, data, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.file_name)
    .bind(&mime_type)
    .bind(&data)
    .bind(state.clock.now().to_rfc3339())
    .execute(&state.db)
    .await?;

    tracing::info!("Stored file {} ({}, {} bytes)", id, req.file_name, data.len());

    Ok((
        StatusCode::CREATED,
        Json(StoredFile {
            url: format!("{}{}", FILES_PREFIX, id),
            file_name: req.file_name,
            mime_type,
            size_bytes: data.len() as u64,
        }),
    ))
}

pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let file = fetch_row(&state, &id).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        file.file_name.replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, file.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.data,
    ))
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM files WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DocError::not_found("File", &id).into());
    }
    tracing::info!("Deleted file {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Resolve a `StoredFile::url` issued by this server
pub async fn load_file(state: &AppState, url: &str) -> Result<FileRow, ApiError> {
    let id = url
        .strip_prefix(FILES_PREFIX)
        .ok_or_else(|| DocError::not_found("File", url))?;
    fetch_row(state, id).await
}

async fn fetch_row(state: &AppState, id: &str) -> Result<FileRow, ApiError> {
    let row = sqlx::query("SELECT file_name, mime_type, data FROM files WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| DocError::not_found("File", id))?;
    Ok(FileRow {
        file_name: row.try_get("file_name")?,
        mime_type: row.try_get("mime_type")?,
        data: row.try_get("data")?,
    })
}
