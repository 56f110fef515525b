use crate::config::EmbeddingSettings;
use crate::core::ports::{EmbeddingError, EmbeddingProvider};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Client for an OpenAI-compatible `/embeddings` endpoint
///
/// Uses the blocking client. Callers inside an async runtime must run the
/// pipeline on the blocking thread pool.
pub struct HttpEmbeddingClient {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

impl HttpEmbeddingClient {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        model: String,
        timeout_secs: u64,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            endpoint,
            api_key,
            model,
            client,
        })
    }
}

impl EmbeddingProvider for HttpEmbeddingClient {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!("Requesting {} embeddings from {}", texts.len(), self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(EmbeddingError::ApiError(format!(
                "Failed to fetch embeddings: {}",
                response.status()
            )));
        }

        let body = response.text()?;
        let parsed: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        let mut items: Vec<(usize, Vec<f32>)> = parsed
            .data
            .into_iter()
            .enumerate()
            .map(|(position, item)| (item.index.unwrap_or(position), item.embedding))
            .collect();
        items.sort_by_key(|(index, _)| *index);

        if items.iter().enumerate().any(|(expected, (index, _))| expected != *index) {
            return Err(EmbeddingError::InvalidResponse(
                "embedding indices are not a permutation of the input".to_string(),
            ));
        }

        Ok(items.into_iter().map(|(_, embedding)| embedding).collect())
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Offline embedder: hashed bag of words
///
/// Terms are lowercased alphanumeric runs, hashed into fixed buckets with
/// FNV-1a and weighted by frequency, then L2-normalized. Deterministic and
/// always available, but only captures shared vocabulary.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn hash_term(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h as usize) % dims
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.chars().count() >= 2)
            .map(|s| s.to_lowercase())
            .collect()
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let tokens = Self::tokenize(text);
        let mut vec = vec![0.0f32; self.dimensions];
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        for (term, count) in &tf {
            vec[Self::hash_term(term, self.dimensions)] += count / total;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Embedder that is never available; free-text attributes score zero
pub struct DisabledEmbedder;

impl EmbeddingProvider for DisabledEmbedder {
    fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Unavailable("embeddings are disabled".to_string()))
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Select the embedding provider named in configuration
pub fn build_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    match settings.provider.trim().to_lowercase().as_str() {
        "http" => {
            let endpoint = settings.endpoint.clone().ok_or_else(|| {
                EmbeddingError::Unavailable("embedding.endpoint is required for the http provider".to_string())
            })?;
            Ok(Arc::new(HttpEmbeddingClient::new(
                endpoint,
                settings.api_key.clone(),
                settings.model.clone(),
                settings.timeout_secs,
            )?))
        }
        "hashing" => Ok(Arc::new(HashingEmbedder::new(settings.dimensions))),
        "none" | "disabled" => Ok(Arc::new(DisabledEmbedder)),
        other => Err(EmbeddingError::Unavailable(format!(
            "unknown embedding provider '{}'",
            other
        ))),
    }
}
