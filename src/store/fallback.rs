// src/store/fallback.rs
//! Append-only CSV fallback. Fixed nine-column layout with a header written
//! once at file creation; timestamps serialized as RFC 3339 strings.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::record::{PostRecord, Sentiment};

pub const FALLBACK_COLUMNS: [&str; 9] = [
    "source_id",
    "raw_text",
    "normalized_text",
    "sentiment_label",
    "confidence",
    "posted_at",
    "language",
    "geo",
    "ingested_at",
];

/// One record as a fixed-order CSV row; optionals serialize as empty fields.
pub fn record_row(rec: &PostRecord) -> [String; 9] {
    [
        rec.source_id.clone(),
        rec.raw_text.clone(),
        rec.normalized_text.clone(),
        rec.sentiment.as_str().to_string(),
        rec.confidence.to_string(),
        rec.posted_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        rec.language.clone().unwrap_or_default(),
        rec.geo.clone().unwrap_or_default(),
        rec.ingested_at.to_rfc3339(),
    ]
}

#[derive(Debug, Deserialize)]
struct FallbackRow {
    source_id: String,
    raw_text: String,
    normalized_text: String,
    sentiment_label: String,
    confidence: f64,
    posted_at: String,
    language: String,
    geo: String,
    ingested_at: String,
}

pub struct CsvFallback {
    path: PathBuf,
}

impl CsvFallback {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its header if it does not exist yet.
    pub fn ensure_header(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        let file = File::create(&self.path)
            .with_context(|| format!("creating fallback file {}", self.path.display()))?;
        let mut w = csv::Writer::from_writer(file);
        w.write_record(FALLBACK_COLUMNS)
            .context("writing fallback header")?;
        w.flush().context("flushing fallback header")?;
        Ok(())
    }

    pub fn append(&self, rec: &PostRecord) -> Result<()> {
        self.ensure_header()?;
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening fallback file {}", self.path.display()))?;
        let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        w.write_record(&record_row(rec))
            .context("appending fallback row")?;
        w.flush().context("flushing fallback row")?;
        Ok(())
    }

    /// Load all rows back; unparseable rows are logged and skipped.
    pub fn load(&self) -> Result<Vec<PostRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("opening fallback file {}", self.path.display()))?;
        let mut out = Vec::new();
        for row in reader.deserialize::<FallbackRow>() {
            let row = match row {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = ?e, "skipping malformed fallback row");
                    continue;
                }
            };
            let ingested_at = match parse_rfc3339(&row.ingested_at) {
                Some(t) => t,
                None => {
                    warn!(id = %row.source_id, "skipping fallback row without ingested_at");
                    continue;
                }
            };
            out.push(PostRecord {
                source_id: row.source_id,
                raw_text: row.raw_text,
                normalized_text: row.normalized_text,
                sentiment: Sentiment::parse(&row.sentiment_label).unwrap_or(Sentiment::Neutral),
                confidence: row.confidence,
                posted_at: parse_rfc3339(&row.posted_at),
                language: non_empty(row.language),
                geo: non_empty(row.geo),
                ingested_at,
            });
        }
        Ok(out)
    }
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
