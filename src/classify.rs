// src/classify.rs
//! Sentiment classification: a model seam (`SentimentModel`), an HTTP
//! inference client for hosted text-classification models, and the fixed
//! ordinal mapping from a 5-class star-rating vocabulary onto
//! {Positive, Neutral, Negative}.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::record::Sentiment;

/// Top-ranked class as reported by the model, before mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    pub label: String,
    pub score: f64,
}

#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn predict(&self, text: &str) -> Result<RawPrediction>;
    fn name(&self) -> &'static str;
}

/// Mapping from a model's raw label vocabulary to the three-class output.
/// Kept as a plain function pointer so an alternate model can be substituted
/// together with its own mapping table.
pub type LabelMap = fn(&str) -> Sentiment;

/// Ordinal rule for star-rating vocabularies ("1 star" .. "5 stars"):
/// 1-2 -> Negative, 3 -> Neutral, 4-5 -> Positive.
pub fn star_rating_map(label: &str) -> Sentiment {
    if label.contains('1') || label.contains('2') {
        Sentiment::Negative
    } else if label.contains('3') {
        Sentiment::Neutral
    } else {
        Sentiment::Positive
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub raw_label: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
}

impl Classification {
    /// Fixed result for empty input or a failed model call.
    pub fn fallback() -> Self {
        Self {
            raw_label: "N/A".to_string(),
            sentiment: Sentiment::Neutral,
            confidence: 0.0,
        }
    }
}

pub struct SentimentClassifier {
    model: Box<dyn SentimentModel>,
    map: LabelMap,
}

impl SentimentClassifier {
    pub fn new(model: Box<dyn SentimentModel>) -> Self {
        Self::with_map(model, star_rating_map)
    }

    pub fn with_map(model: Box<dyn SentimentModel>, map: LabelMap) -> Self {
        Self { model, map }
    }

    /// Never errors: empty input and model failures both yield the neutral
    /// fallback so the ingestion loop cannot die here.
    pub async fn classify(&self, text: &str) -> Classification {
        if text.trim().is_empty() {
            return Classification::fallback();
        }
        match self.model.predict(text).await {
            Ok(pred) => {
                let sentiment = (self.map)(&pred.label);
                Classification {
                    raw_label: pred.label,
                    sentiment,
                    confidence: pred.score,
                }
            }
            Err(e) => {
                warn!(error = ?e, model = self.model.name(), "model call failed, using neutral fallback");
                Classification::fallback()
            }
        }
    }
}

/// Hosted inference endpoint client (Hugging Face style): POSTs the text,
/// reads back ranked `{label, score}` pairs, returns the top one.
pub struct HfInferenceModel {
    http: reqwest::Client,
    url: String,
    api_token: Option<String>,
}

impl HfInferenceModel {
    pub fn new(model_id: &str, api_token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("sentipulse/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self {
            http,
            url: format!("https://api-inference.huggingface.co/models/{model_id}"),
            api_token,
        }
    }
}

#[async_trait]
impl SentimentModel for HfInferenceModel {
    async fn predict(&self, text: &str) -> Result<RawPrediction> {
        let mut req = self.http.post(&self.url).json(&json!({
            "inputs": text,
            "parameters": { "truncation": true },
        }));
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.context("inference request")?;
        anyhow::ensure!(
            resp.status().is_success(),
            "inference endpoint returned {}",
            resp.status()
        );

        // Response shape: [[{"label": "4 stars", "score": 0.61}, ...]]
        let ranked: Vec<Vec<RawPrediction>> =
            resp.json().await.context("decoding inference response")?;
        ranked
            .into_iter()
            .flatten()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .context("inference response contained no classes")
    }

    fn name(&self) -> &'static str {
        "hf-inference"
    }
}
