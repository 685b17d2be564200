use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{RagError, Result};
use crate::http::post_json;

/// Produces fixed-dimension vectors for text. The same provider configuration
/// must be used at index and query time; `id()` is the fingerprint stored
/// with a collection to enforce that.
pub trait Embedder: Send + Sync {
    fn id(&self) -> String;

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let vecs = self.embed(&[text.to_string()])?;
        vecs.into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("provider returned no vector".to_string()))
    }
}

pub struct OllamaEmbedder {
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn from_config(cfg: &Config) -> Self {
        Self { base_url: cfg.ollama_url.clone(), model: cfg.embed_model.clone() }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Serialize)]
struct EmbedLegacyRequest<'a> {
    model: &'a str,
    prompt: &'a [String],
}

impl Embedder for OllamaEmbedder {
    fn id(&self) -> String {
        format!("ollama/{}", self.model)
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        debug!(model = %self.model, batch = texts.len(), "embedding texts");
        let url = format!("{}/api/embed", self.base_url);
        let req = EmbedRequest { model: &self.model, input: texts };
        let value = match post_json::<Value, _>(&url, &req, None) {
            Ok(value) => value,
            Err(_) => {
                // Older servers only expose the legacy endpoint.
                let url = format!("{}/api/embeddings", self.base_url);
                let req = EmbedLegacyRequest { model: &self.model, prompt: texts };
                post_json(&url, &req, None).map_err(RagError::Embedding)?
            }
        };
        parse_embeddings(value)
    }
}

fn parse_embeddings(value: Value) -> Result<Vec<Vec<f32>>> {
    if let Some(embeddings) = value.get("embeddings") {
        return parse_embeddings_value(embeddings);
    }
    if let Some(embedding) = value.get("embedding") {
        return parse_embeddings_value(embedding);
    }
    Err(RagError::Embedding("no embeddings in response".to_string()))
}

fn parse_embeddings_value(value: &Value) -> Result<Vec<Vec<f32>>> {
    if let Some(arr) = value.as_array() {
        if arr.is_empty() {
            return Ok(vec![]);
        }
        if arr[0].is_array() {
            let mut out = Vec::new();
            for row in arr {
                out.push(parse_vec(row)?);
            }
            return Ok(out);
        }
        return Ok(vec![parse_vec(value)?]);
    }
    Err(RagError::Embedding("invalid embeddings format".to_string()))
}

fn parse_vec(value: &Value) -> Result<Vec<f32>> {
    let arr = value
        .as_array()
        .ok_or_else(|| RagError::Embedding("embedding is not an array".to_string()))?;
    let mut out = Vec::with_capacity(arr.len());
    for v in arr {
        let n = v
            .as_f64()
            .ok_or_else(|| RagError::Embedding("embedding value is not a number".to_string()))?;
        out.push(n as f32);
    }
    Ok(out)
}
