//! HTTP handlers for the docs API

pub mod documents;
pub mod files;
pub mod templates;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}
