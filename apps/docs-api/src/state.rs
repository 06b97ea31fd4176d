//! Application state for the docs API

use std::sync::Arc;

use anyhow::Result;
use shared_types::{Clock, DocError, Document, SystemClock};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use template_engine::{Template, TemplateStore};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::ApiError;

pub struct AppState {
    pub db: SqlitePool,
    /// Templates live in memory and are written through to `templates`
    pub templates: RwLock<TemplateStore>,
    pub api_token: String,
    pub max_upload_bytes: u64,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub async fn connect(config: &Config) -> Result<Self> {
        tracing::info!("Connecting to database: {}", config.database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;

        Self::from_pool(
            pool,
            config.api_token.clone(),
            config.max_upload_bytes,
            Arc::new(SystemClock),
        )
        .await
    }

    /// Migrate `pool`, then load templates, seeding the built-ins into an empty table
    pub async fn from_pool(
        pool: SqlitePool,
        api_token: String,
        max_upload_bytes: u64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Self::run_migrations(&pool).await?;

        let rows = sqlx::query("SELECT data FROM templates ORDER BY rowid")
            .fetch_all(&pool)
            .await?;
        let mut templates = Vec::with_capacity(rows.len());
        for row in rows {
            let data: String = row.try_get("data")?;
            templates.push(serde_json::from_str::<Template>(&data)?);
        }

        let store = if templates.is_empty() {
            let store = TemplateStore::seeded(clock.clone())?;
            for template in store.iter() {
                save_template(&pool, template).await?;
            }
            tracing::info!("Seeded {} built-in templates", store.len());
            store
        } else {
            tracing::info!("Loaded {} templates", templates.len());
            TemplateStore::with_templates(clock.clone(), templates)
        };

        Ok(Self {
            db: pool,
            templates: RwLock::new(store),
            api_token,
            max_upload_bytes,
            clock,
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS templates (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                category TEXT,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS files (
                id TEXT PRIMARY KEY,
                file_name TEXT NOT NULL,
                mime_type TEXT NOT NULL,
                data BLOB NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status)")
            .execute(pool)
            .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    pub async fn save_template(&self, template: &Template) -> Result<(), ApiError> {
        save_template(&self.db, template).await
    }

    pub async fn remove_template(&self, id: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM templates WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn load_document(&self, id: &str) -> Result<Document, ApiError> {
        let row = sqlx::query("SELECT data FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| DocError::not_found("Document", id))?;
        let data: String = row.try_get("data")?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Upsert; keeps the original rowid so listing order survives updates
async fn save_template(pool: &SqlitePool, template: &Template) -> Result<(), ApiError> {
    let data = serde_json::to_string(template)?;
    sqlx::query(
        r#"
        INSERT INTO templates (id, data) VALUES (?, ?)
        ON CONFLICT(id) DO UPDATE SET data = excluded.data
        "#,
    )
    .bind(&template.id)
    .bind(data)
    .execute(pool)
    .await?;
    Ok(())
}
