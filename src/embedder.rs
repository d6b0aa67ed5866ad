//! Embedding client: turns chunk text into vectors via an HTTP embedding
//! backend. Generalizes the reference backend's local-model embedding
//! module into a remote client, since this service has no on-device model.

use crate::error::{IndexError, IndexResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Distinguishes asymmetric embedding models' document-side and query-side
/// encodings (Cohere's `search_document` / `search_query` input types).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Document,
    Query,
}

impl InputType {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            InputType::Document => "search_document",
            InputType::Query => "search_query",
        }
    }
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String], input_type: InputType) -> IndexResult<Vec<Vec<f32>>>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Calls a Cohere-shaped `/v1/embed` endpoint over HTTP.
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self { client: reqwest::Client::new(), base_url, api_key, model }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String], input_type: InputType) -> IndexResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest { texts, model: &self.model, input_type: input_type.as_api_str() };

        let response = self
            .client
            .post(format!("{}/v1/embed", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| IndexError::EmbedderError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::EmbedderError(format!("embedder returned {status}: {body}")));
        }

        let parsed: EmbedResponse =
            response.json().await.map_err(|e| IndexError::EmbedderError(e.to_string()))?;

        Ok(parsed.embeddings)
    }
}

/// Deterministic, network-free embedder for tests: hashes each text into a
/// fixed-dimension vector so the same text always yields the same vector,
/// and distinct texts yield (with overwhelming probability) distinct ones.
pub struct FakeEmbedder {
    pub dimension: usize,
}

impl FakeEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    (0..dimension)
        .map(|i| {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let bits = hasher.finish();
            ((bits % 2000) as f32 / 1000.0) - 1.0
        })
        .collect()
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> IndexResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| hash_embed(t, self.dimension)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_embedder_is_deterministic() {
        let embedder = FakeEmbedder::new(8);
        let a = embedder.embed(&["hello".to_string()], InputType::Document).await.unwrap();
        let b = embedder.embed(&["hello".to_string()], InputType::Document).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn fake_embedder_distinguishes_texts() {
        let embedder = FakeEmbedder::new(8);
        let a = embedder.embed(&["hello".to_string()], InputType::Document).await.unwrap();
        let b = embedder.embed(&["goodbye".to_string()], InputType::Document).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn fake_embedder_empty_input_is_empty_output() {
        let embedder = FakeEmbedder::new(8);
        let out = embedder.embed(&[], InputType::Query).await.unwrap();
        assert!(out.is_empty());
    }
}
