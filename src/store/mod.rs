// src/store/mod.rs
//! Two-state persistence layer: a primary SQL store when reachable, an
//! append-only CSV fallback otherwise. The Connected -> Degraded transition
//! is one-way within a process; reconnecting requires a restart.

pub mod fallback;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{info, warn};

use crate::record::{NewRecord, PostRecord, Sentiment};
use self::fallback::CsvFallback;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS posts (
    source_id TEXT NOT NULL,
    raw_text TEXT NOT NULL,
    normalized_text TEXT NOT NULL,
    sentiment TEXT NOT NULL,
    confidence REAL NOT NULL,
    posted_at TEXT,
    language TEXT,
    geo TEXT,
    ingested_at TEXT NOT NULL
)";

const SELECT_COLS: &str =
    "source_id, raw_text, normalized_text, sentiment, confidence, posted_at, language, geo, ingested_at";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub fallback_path: PathBuf,
}

/// Per-label counts over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub total: i64,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    source_id: String,
    raw_text: String,
    normalized_text: String,
    sentiment: String,
    confidence: f64,
    posted_at: Option<DateTime<Utc>>,
    language: Option<String>,
    geo: Option<String>,
    ingested_at: DateTime<Utc>,
}

impl From<PostRow> for PostRecord {
    fn from(r: PostRow) -> Self {
        PostRecord {
            source_id: r.source_id,
            raw_text: r.raw_text,
            normalized_text: r.normalized_text,
            sentiment: Sentiment::parse(&r.sentiment).unwrap_or(Sentiment::Neutral),
            confidence: r.confidence,
            posted_at: r.posted_at,
            language: r.language,
            geo: r.geo,
            ingested_at: r.ingested_at,
        }
    }
}

pub struct Store {
    pool: Option<SqlitePool>,
    fallback: CsvFallback,
    connected: AtomicBool,
}

impl Store {
    /// Probe the primary store once; start Degraded if it is unreachable.
    /// Construction itself only fails if the fallback file cannot be created.
    pub async fn connect(cfg: &StoreConfig) -> Result<Self> {
        let fallback = CsvFallback::new(cfg.fallback_path.clone());
        match Self::probe(&cfg.database_url).await {
            Ok(pool) => {
                info!(url = %cfg.database_url, "connected to primary store");
                Ok(Self {
                    pool: Some(pool),
                    fallback,
                    connected: AtomicBool::new(true),
                })
            }
            Err(e) => {
                warn!(
                    error = ?e,
                    fallback = %cfg.fallback_path.display(),
                    "primary store unreachable, starting degraded"
                );
                fallback.ensure_header()?;
                Ok(Self {
                    pool: None,
                    fallback,
                    connected: AtomicBool::new(false),
                })
            }
        }
    }

    async fn probe(database_url: &str) -> Result<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .context("connecting to primary store")?;
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .context("ensuring posts table")?;
        Ok(pool)
    }

    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn fallback(&self) -> &CsvFallback {
        &self.fallback
    }

    /// Stamp `ingested_at` and write to exactly one target: the primary store
    /// when Connected and the write succeeds, the CSV fallback otherwise.
    /// A failed primary write degrades the store for the rest of the process.
    pub async fn insert(&self, rec: NewRecord) -> Result<PostRecord> {
        let rec = rec.stamped(Utc::now());
        if self.connected() {
            if let Some(pool) = &self.pool {
                match insert_primary(pool, &rec).await {
                    Ok(()) => return Ok(rec),
                    Err(e) => {
                        warn!(error = ?e, "primary insert failed, degrading to CSV fallback");
                        self.connected.store(false, Ordering::SeqCst);
                    }
                }
            }
        }
        self.fallback.append(&rec)?;
        Ok(rec)
    }

    fn primary(&self) -> Result<&SqlitePool> {
        anyhow::ensure!(self.connected(), "primary store not connected");
        self.pool.as_ref().context("primary store not connected")
    }

    pub async fn stats(&self) -> Result<SentimentCounts> {
        let pool = self.primary()?;
        let (total, positive, neutral, negative): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COALESCE(SUM(sentiment = 'Positive'), 0),
                    COALESCE(SUM(sentiment = 'Neutral'), 0),
                    COALESCE(SUM(sentiment = 'Negative'), 0)
             FROM posts",
        )
        .fetch_one(pool)
        .await
        .context("counting sentiments")?;
        Ok(SentimentCounts {
            total,
            positive,
            neutral,
            negative,
        })
    }

    /// Most recent records by ingestion time, optionally filtered by the
    /// exact stored sentiment label. Unknown labels simply match nothing.
    pub async fn recent(&self, limit: u32, sentiment: Option<&str>) -> Result<Vec<PostRecord>> {
        let pool = self.primary()?;
        let rows: Vec<PostRow> = match sentiment {
            Some(label) => {
                sqlx::query_as(&format!(
                    "SELECT {SELECT_COLS} FROM posts WHERE sentiment = ?1 \
                     ORDER BY ingested_at DESC LIMIT ?2"
                ))
                .bind(label)
                .bind(limit as i64)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {SELECT_COLS} FROM posts ORDER BY ingested_at DESC LIMIT ?1"
                ))
                .bind(limit as i64)
                .fetch_all(pool)
                .await
            }
        }
        .context("listing recent posts")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Records authored on the given UTC calendar day (rows without a
    /// `posted_at` are excluded).
    pub async fn records_for_day(&self, date: NaiveDate) -> Result<Vec<PostRecord>> {
        let pool = self.primary()?;
        let start = date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc();
        let end = start + chrono::Duration::days(1);
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM posts \
             WHERE posted_at >= ?1 AND posted_at < ?2 ORDER BY posted_at ASC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
        .context("listing posts for day")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

async fn insert_primary(pool: &SqlitePool, rec: &PostRecord) -> Result<()> {
    sqlx::query(
        "INSERT INTO posts (source_id, raw_text, normalized_text, sentiment, confidence, \
                            posted_at, language, geo, ingested_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&rec.source_id)
    .bind(&rec.raw_text)
    .bind(&rec.normalized_text)
    .bind(rec.sentiment.as_str())
    .bind(rec.confidence)
    .bind(rec.posted_at)
    .bind(rec.language.as_deref())
    .bind(rec.geo.as_deref())
    .bind(rec.ingested_at)
    .execute(pool)
    .await
    .context("inserting post")?;
    Ok(())
}
