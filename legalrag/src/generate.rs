use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{RagError, Result};
use crate::http::post_json;

// Greedy decoding keeps answers reproducible for the same retrieved context.
const TEMPERATURE: f32 = 0.0;

pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct OpenAiGenerator {
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            base_url: cfg.llm_base_url.clone(),
            api_key: cfg.llm_api_key.clone(),
            model: cfg.chat_model.clone(),
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl Generator for OpenAiGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting completion");
        let url = format!("{}/chat/completions", self.base_url);
        let req = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: TEMPERATURE,
        };
        let bearer = (!self.api_key.is_empty()).then_some(self.api_key.as_str());
        let res: ChatResponse = post_json(&url, &req, bearer).map_err(RagError::Generation)?;
        let answer = res
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if answer.is_empty() {
            return Err(RagError::Generation("model returned an empty response".to_string()));
        }
        Ok(answer)
    }
}
