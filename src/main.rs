//! Collector daemon: polls the search API, classifies, persists, alerts.
//! Runs until killed; see `bin/api.rs` for the read API and `bin/report.rs`
//! for the daily batch report.

use anyhow::{Context, Result};
use tracing::info;

use sentipulse::classify::{HfInferenceModel, SentimentClassifier};
use sentipulse::collector::{self, InMemoryDedup};
use sentipulse::notify::EmailAlerter;
use sentipulse::source::SearchApiSource;
use sentipulse::store::Store;
use sentipulse::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    sentipulse::init_tracing();

    let cfg = AppConfig::from_env();
    let bearer_token = cfg
        .bearer_token
        .clone()
        .context("SEARCH_BEARER_TOKEN must be set")?;

    let source = SearchApiSource::new(cfg.search_api_url.clone(), bearer_token);
    let classifier = SentimentClassifier::new(Box::new(HfInferenceModel::new(
        &cfg.model_id,
        cfg.hf_api_token.clone(),
    )));
    let store = Store::connect(&cfg.store_config()).await?;

    let alerter = EmailAlerter::from_config(&cfg);
    if alerter.is_none() {
        info!("SMTP not configured, alert emails disabled");
    }

    let mut dedup = InMemoryDedup::new();
    collector::run_loop(
        &cfg,
        &source,
        &classifier,
        &store,
        &mut dedup,
        alerter.as_ref(),
    )
    .await;
    Ok(())
}
