// src/source.rs
//! Upstream post source: the recent-search API client and the fetch retry
//! policy (rate-limit cooldown + capped exponential backoff).

use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// One raw post as returned by the upstream search API.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub geo: Option<serde_json::Value>,
}

/// Fetch failures, split the way the retry policy needs them.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream rate limit")]
    RateLimited,
    #[error("transient fetch error: {0}")]
    Transient(#[from] anyhow::Error),
}

#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_recent(&self, query: &str, max_results: u32) -> Result<Vec<Post>, FetchError>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Vec<Post>>,
}

/// Bearer-authenticated client for a recent-search endpoint.
pub struct SearchApiSource {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl SearchApiSource {
    pub fn new(base_url: String, bearer_token: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("sentipulse/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            bearer_token,
        }
    }
}

#[async_trait]
impl PostSource for SearchApiSource {
    async fn fetch_recent(&self, query: &str, max_results: u32) -> Result<Vec<Post>, FetchError> {
        let resp = self
            .http
            .get(&self.base_url)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query),
                ("max_results", &max_results.to_string()),
                ("tweet.fields", "created_at,lang,geo"),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transient(anyhow!(e).context("search request")))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(FetchError::Transient(anyhow!(
                "search endpoint returned {}",
                resp.status()
            )));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::Transient(anyhow!(e).context("decoding search response")))?;
        Ok(body.data.unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "search-api"
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// First transient-failure delay; doubles per consecutive failure.
    pub base: Duration,
    /// Upper bound for the doubled delay.
    pub cap: Duration,
    /// Fixed cooldown after an upstream rate-limit signal.
    pub rate_limit_cooldown: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(10),
            cap: Duration::from_secs(900),
            rate_limit_cooldown: Duration::from_secs(900),
        }
    }
}

/// Retry state for the fetch step. Retries indefinitely; the caller sleeps
/// for whatever `next_delay` returns and tries again.
#[derive(Debug)]
pub struct Backoff {
    policy: BackoffPolicy,
    consecutive_transient: u32,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            consecutive_transient: 0,
        }
    }

    /// Delay before the next attempt. Rate limits use the fixed cooldown and
    /// leave the transient counter untouched.
    pub fn next_delay(&mut self, err: &FetchError) -> Duration {
        match err {
            FetchError::RateLimited => self.policy.rate_limit_cooldown,
            FetchError::Transient(_) => {
                let factor = 2u32.saturating_pow(self.consecutive_transient);
                self.consecutive_transient = self.consecutive_transient.saturating_add(1);
                self.policy.base.saturating_mul(factor).min(self.policy.cap)
            }
        }
    }

    pub fn reset(&mut self) {
        self.consecutive_transient = 0;
    }
}
