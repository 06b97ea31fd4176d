//! Docs API server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use docs_api::{router, AppState, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::parse();

    let level = if config.verbose {
        "docs_api=debug"
    } else {
        "docs_api=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(level.parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Initializing docs API...");
    let state = Arc::new(AppState::connect(&config).await?);
    let app = router(state);

    let addr: SocketAddr = config.bind_addr().parse()?;
    info!("Starting docs API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
