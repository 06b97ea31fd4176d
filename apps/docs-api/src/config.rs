//! Server configuration from flags, environment and `.env`

use clap::Parser;
use document_lifecycle::DEFAULT_MAX_UPLOAD_BYTES;

#[derive(Debug, Clone, Parser)]
#[command(name = "docs-api")]
#[command(about = "Lease templates, generated contracts and document storage over HTTP")]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3001")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:docs-api.db?mode=rwc")]
    pub database_url: String,

    /// Bearer token every /api request must present
    #[arg(long, env = "DOCS_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// Largest accepted upload, in decoded bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
