//! Read API server: `/stats` and `/tweets` over the persisted collection.

use std::sync::Arc;

use anyhow::{Context, Result};

use sentipulse::api::{self, AppState};
use sentipulse::store::Store;
use sentipulse::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    sentipulse::init_tracing();

    let cfg = AppConfig::from_env();
    let store = Arc::new(Store::connect(&cfg.store_config()).await?);
    let app = api::router(AppState { store });

    let listener = tokio::net::TcpListener::bind(&cfg.api_bind)
        .await
        .with_context(|| format!("binding {}", cfg.api_bind))?;
    tracing::info!(addr = %cfg.api_bind, "read api listening");
    axum::serve(listener, app).await.context("serving api")?;
    Ok(())
}
