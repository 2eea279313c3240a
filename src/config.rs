// src/config.rs
//! Environment-backed configuration, built once at startup and passed by
//! reference. `dotenvy::dotenv()` is called by each binary before this.

use std::path::PathBuf;
use std::str::FromStr;

use crate::store::StoreConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Credential for the upstream search API; required by the collector only.
    pub bearer_token: Option<String>,
    pub search_api_url: String,
    pub query: String,
    pub poll_interval_secs: u64,
    pub max_results: u32,
    pub database_url: String,
    pub fallback_path: PathBuf,
    pub model_id: String,
    pub hf_api_token: Option<String>,
    pub api_bind: String,
    /// SMTP settings for alert dispatch; alerts stay disabled unless host,
    /// user, password and recipient are all present.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub alert_email: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bearer_token: std::env::var("SEARCH_BEARER_TOKEN").ok(),
            search_api_url: env_or(
                "SEARCH_API_URL",
                "https://api.twitter.com/2/tweets/search/recent",
            ),
            query: env_or("QUERY", "#AI lang:en -is:retweet"),
            poll_interval_secs: env_parse("POLL_INTERVAL_SECONDS", 150),
            max_results: env_parse("MAX_RESULTS", 50),
            database_url: env_or("DATABASE_URL", "sqlite://sentiment.db?mode=rwc"),
            fallback_path: PathBuf::from(env_or("CSV_FALLBACK_PATH", "./posts_fallback.csv")),
            model_id: env_or(
                "SENTIMENT_MODEL",
                "nlptown/bert-base-multilingual-uncased-sentiment",
            ),
            hf_api_token: std::env::var("HF_API_TOKEN").ok(),
            api_bind: env_or("API_BIND", "0.0.0.0:8000"),
            smtp_host: std::env::var("SMTP_HOST").ok(),
            smtp_port: env_parse("SMTP_PORT", 587),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_pass: std::env::var("SMTP_PASS").ok(),
            alert_email: std::env::var("ALERT_EMAIL").ok(),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            database_url: self.database_url.clone(),
            fallback_path: self.fallback_path.clone(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
