use std::env;

use crate::prompt::LEGAL_PROMPT_TEMPLATE;

#[derive(Clone, Debug)]
pub struct Config {
    pub collection: String,
    pub persist_dir: String,
    pub source_dir: String,
    pub include_exts: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub max_file_bytes: u64,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub ollama_url: String,
    pub embed_model: String,
    pub llm_base_url: String,
    pub llm_api_key: String,
    pub chat_model: String,
    pub distance: String,
    pub top_k: usize,
    pub prompt_template: String,
}

impl Config {
    pub fn from_env() -> Self {
        // Load .env if present so the API key and model config work without
        // a manual `source .env`.
        let _ = dotenvy::dotenv();
        let include_exts =
            env::var("LEGAL_INCLUDE_EXTS").unwrap_or_else(|_| ".txt,.md".to_string());
        Self {
            collection: env::var("LEGAL_COLLECTION").unwrap_or_else(|_| "legal".to_string()),
            persist_dir: env::var("LEGAL_PERSIST_DIR")
                .unwrap_or_else(|_| "./legal_index".to_string()),
            source_dir: env::var("LEGAL_SOURCE_DIR").unwrap_or_else(|_| "./corpus".to_string()),
            include_exts: include_exts.split(',').map(|s| s.trim().to_string()).collect(),
            exclude_dirs: env::var("LEGAL_EXCLUDE_DIRS")
                .unwrap_or_else(|_| ".git,target,node_modules,legal_index".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_file_bytes: env::var("LEGAL_MAX_FILE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500_000),
            chunk_size: env::var("LEGAL_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            chunk_overlap: env::var("LEGAL_CHUNK_OVERLAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(150),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            embed_model: env::var("OLLAMA_EMBED_MODEL")
                .unwrap_or_else(|_| "all-minilm".to_string()),
            llm_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            llm_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            chat_model: env::var("OPENAI_CHAT_MODEL")
                .unwrap_or_else(|_| "gpt-4.1-mini".to_string()),
            distance: env::var("LEGAL_DISTANCE").unwrap_or_else(|_| "Cosine".to_string()),
            top_k: env::var("LEGAL_TOP_K").ok().and_then(|v| v.parse().ok()).unwrap_or(4),
            prompt_template: env::var("LEGAL_PROMPT_TEMPLATE")
                .unwrap_or_else(|_| LEGAL_PROMPT_TEMPLATE.to_string()),
        }
    }
}
