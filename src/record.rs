// src/record.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Three-class label every finer-grained model output is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }

    /// Exact-label parse; filters use the stored spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Positive" => Some(Sentiment::Positive),
            "Neutral" => Some(Sentiment::Neutral),
            "Negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified post, as persisted. Never updated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub source_id: String,
    pub raw_text: String,
    pub normalized_text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub posted_at: Option<DateTime<Utc>>,
    pub language: Option<String>,
    pub geo: Option<String>,
    pub ingested_at: DateTime<Utc>,
}

/// A record built by the collector, before the store stamps `ingested_at`.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub source_id: String,
    pub raw_text: String,
    pub normalized_text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub posted_at: Option<DateTime<Utc>>,
    pub language: Option<String>,
    pub geo: Option<String>,
}

impl NewRecord {
    pub fn stamped(self, ingested_at: DateTime<Utc>) -> PostRecord {
        PostRecord {
            source_id: self.source_id,
            raw_text: self.raw_text,
            normalized_text: self.normalized_text,
            sentiment: self.sentiment,
            confidence: self.confidence,
            posted_at: self.posted_at,
            language: self.language,
            geo: self.geo,
            ingested_at,
        }
    }
}
