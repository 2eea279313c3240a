// src/collector.rs
//! The ingestion loop: fetch -> dedup -> normalize -> classify -> persist ->
//! alert -> sleep. Single task, sequential awaits; all collaborator failures
//! are absorbed so the loop runs until the process is killed.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{info, warn};

use crate::classify::SentimentClassifier;
use crate::config::AppConfig;
use crate::normalize::normalize;
use crate::notify::{contains_flagged_content, EmailAlerter};
use crate::record::NewRecord;
use crate::source::{Backoff, BackoffPolicy, FetchError, Post, PostSource};
use crate::store::Store;

/// Already-seen source ids. Injectable so a durable implementation can
/// replace the process-lifetime set later.
pub trait DedupSet: Send {
    /// Marks the id as seen; returns true if this was its first sighting.
    fn check_and_insert(&mut self, id: &str) -> bool;
}

/// Unbounded, reset on restart; duplicates across restarts are accepted.
#[derive(Debug, Default)]
pub struct InMemoryDedup {
    seen: HashSet<String>,
}

impl InMemoryDedup {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DedupSet for InMemoryDedup {
    fn check_and_insert(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub fetched: usize,
    pub new: usize,
    pub persisted: usize,
    pub flagged: usize,
}

/// Process one poll batch. Persistence failures are logged per item; nothing
/// propagates.
pub async fn run_cycle(
    posts: Vec<Post>,
    classifier: &SentimentClassifier,
    store: &Store,
    dedup: &mut dyn DedupSet,
    alerter: Option<&EmailAlerter>,
) -> CycleStats {
    let mut stats = CycleStats {
        fetched: posts.len(),
        ..Default::default()
    };
    if posts.is_empty() {
        info!("no posts in this poll");
        return stats;
    }

    for post in posts {
        if !dedup.check_and_insert(&post.id) {
            continue;
        }
        stats.new += 1;

        let clean = normalize(&post.text);
        let c = classifier.classify(&clean).await;

        let rec = NewRecord {
            source_id: post.id.clone(),
            raw_text: post.text.clone(),
            normalized_text: clean,
            sentiment: c.sentiment,
            confidence: c.confidence,
            posted_at: post.created_at,
            language: post.lang.clone(),
            geo: post.geo.as_ref().map(|g| g.to_string()),
        };
        match store.insert(rec).await {
            Ok(saved) => {
                stats.persisted += 1;
                info!(
                    id = %saved.source_id,
                    sentiment = %saved.sentiment,
                    confidence = %format_args!("{:.2}", saved.confidence),
                    text = %truncate(&post.text, 200),
                    "persisted post"
                );
            }
            Err(e) => warn!(error = ?e, id = %post.id, "failed to persist post"),
        }

        if contains_flagged_content(&post.text) {
            stats.flagged += 1;
            if let Some(alerter) = alerter {
                let body = format!(
                    "Post ID: {}\nText: {}\nSentiment: {} ({:.2})",
                    post.id, post.text, c.sentiment, c.confidence
                );
                let _ = alerter
                    .send_alert("ALERT: flagged keyword detected in post", &body)
                    .await;
            }
        }
    }
    stats
}

/// Fetch with the loop's retry policy: fixed cooldown on rate limits, capped
/// exponential backoff on anything transient. Retries until it succeeds.
pub async fn fetch_with_retry(
    source: &dyn PostSource,
    query: &str,
    max_results: u32,
    backoff: &mut Backoff,
) -> Vec<Post> {
    loop {
        match source.fetch_recent(query, max_results).await {
            Ok(posts) => {
                backoff.reset();
                return posts;
            }
            Err(err) => {
                let delay = backoff.next_delay(&err);
                match &err {
                    FetchError::RateLimited => {
                        warn!(delay_secs = delay.as_secs(), "rate limit hit, cooling down")
                    }
                    FetchError::Transient(e) => {
                        warn!(error = ?e, delay_secs = delay.as_secs(), "fetch failed, backing off")
                    }
                }
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Poll forever. Stopped only by process termination.
pub async fn run_loop(
    cfg: &AppConfig,
    source: &dyn PostSource,
    classifier: &SentimentClassifier,
    store: &Store,
    dedup: &mut dyn DedupSet,
    alerter: Option<&EmailAlerter>,
) {
    let mut backoff = Backoff::new(BackoffPolicy::default());
    info!(query = %cfg.query, interval_secs = cfg.poll_interval_secs, "starting collector");
    loop {
        let posts = fetch_with_retry(source, &cfg.query, cfg.max_results, &mut backoff).await;
        let stats = run_cycle(posts, classifier, store, dedup, alerter).await;
        info!(
            fetched = stats.fetched,
            new = stats.new,
            persisted = stats.persisted,
            flagged = stats.flagged,
            "poll cycle complete"
        );
        tokio::time::sleep(Duration::from_secs(cfg.poll_interval_secs)).await;
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
