//! Template library endpoints
//!
//! Mutations run on a copy of the store under the write lock. The copy
//! replaces the live store only after the database write succeeds.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use template_engine::{NewTemplate, Retired, Template, TemplateFilter, TemplateUpdate};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UseTemplateRequest {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct UseTemplateResponse {
    pub template: Template,
    pub content: String,
    pub missing: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RetireResponse {
    /// `deactivated` when the template had been used, otherwise `deleted`
    pub outcome: &'static str,
    pub template: Template,
}

pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TemplateFilter>,
) -> Json<Vec<Template>> {
    let store = state.templates.read().await;
    Json(store.list(&filter).into_iter().cloned().collect())
}

pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewTemplate>,
) -> Result<(StatusCode, Json<Template>), ApiError> {
    let mut store = state.templates.write().await;
    let mut next = store.clone();
    let template = next.create(input)?;
    state.save_template(&template).await?;
    *store = next;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Template>, ApiError> {
    let store = state.templates.read().await;
    Ok(Json(store.get(&id)?.clone()))
}

pub async fn update_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<TemplateUpdate>,
) -> Result<Json<Template>, ApiError> {
    let mut store = state.templates.write().await;
    let mut next = store.clone();
    let template = next.update(&id, update)?;
    state.save_template(&template).await?;
    *store = next;
    Ok(Json(template))
}

/// Used templates are deactivated instead of removed
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RetireResponse>, ApiError> {
    let mut store = state.templates.write().await;
    let mut next = store.clone();
    let response = match next.retire(&id)? {
        Retired::Deactivated(template) => {
            state.save_template(&template).await?;
            RetireResponse {
                outcome: "deactivated",
                template,
            }
        }
        Retired::Deleted(template) => {
            state.remove_template(&template.id).await?;
            RetireResponse {
                outcome: "deleted",
                template,
            }
        }
    };
    *store = next;
    Ok(Json(response))
}

pub async fn duplicate_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Template>), ApiError> {
    let mut store = state.templates.write().await;
    let mut next = store.clone();
    let copy = next.duplicate(&id)?;
    state.save_template(&copy).await?;
    *store = next;
    Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn toggle_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Template>, ApiError> {
    let mut store = state.templates.write().await;
    let mut next = store.clone();
    let template = next.toggle_active(&id)?;
    state.save_template(&template).await?;
    *store = next;
    Ok(Json(template))
}

/// Render with the supplied values and count the use
pub async fn use_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UseTemplateRequest>,
) -> Result<Json<UseTemplateResponse>, ApiError> {
    let mut store = state.templates.write().await;
    let mut next = store.clone();
    let (template, rendered) = next.render(&id, &req.values)?;
    state.save_template(&template).await?;
    *store = next;
    tracing::info!(
        "Rendered template {} with {} missing values",
        template.id,
        rendered.missing.len()
    );
    Ok(Json(UseTemplateResponse {
        template,
        content: rendered.content,
        missing: rendered.missing,
    }))
}
