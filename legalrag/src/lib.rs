mod chunk;
mod config;
mod display;
mod embed;
mod engine;
mod error;
mod generate;
mod http;
mod loader;
mod prompt;
mod store;

pub use config::Config;
pub use display::{snippet, strip_markup};
pub use embed::{Embedder, OllamaEmbedder};
pub use engine::{Answer, AnswerEngine, SourceDoc};
pub use error::{RagError, Result};
pub use generate::{Generator, OpenAiGenerator};
pub use loader::load_documents;
pub use prompt::{join_context, render_prompt, validate_template, LEGAL_PROMPT_TEMPLATE};
pub use store::{Collection, Distance, Document, Hit};

use tracing::info;

/// Embed every document and persist the collection, overwriting any previous
/// index. The batch fails on the first document that cannot be embedded.
pub fn build_index(cfg: &Config, embedder: &dyn Embedder, docs: &[Document]) -> Result<Collection> {
    if docs.is_empty() {
        return Err(RagError::Embedding("no documents to index".to_string()));
    }
    for doc in docs {
        if doc.text.trim().is_empty() {
            return Err(RagError::Embedding(format!(
                "document '{}' (page {}) has empty text",
                doc.source, doc.page
            )));
        }
    }

    let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
    let vectors = embedder.embed(&texts)?;
    if vectors.len() != docs.len() {
        return Err(RagError::Embedding(format!(
            "expected {} vectors, got {}",
            docs.len(),
            vectors.len()
        )));
    }

    let dimension = vectors[0].len();
    let mut collection = Collection::new(&cfg.collection, &embedder.id(), dimension);
    for (doc, vector) in docs.iter().cloned().zip(vectors) {
        collection.push(doc, vector)?;
    }
    let path = collection.save(&cfg.persist_dir)?;
    info!(
        collection = %cfg.collection,
        records = collection.len(),
        path = %path.display(),
        "index persisted"
    );
    Ok(collection)
}

/// Load documents from the source directory and index them. Returns the
/// number of chunks written.
pub fn index_corpus(cfg: &Config, embedder: &dyn Embedder, source: Option<&str>) -> Result<usize> {
    let docs = loader::load_documents(cfg, source);
    if docs.is_empty() {
        return Err(RagError::Config(format!(
            "no indexable documents under '{}'",
            source.unwrap_or(&cfg.source_dir)
        )));
    }
    let collection = build_index(cfg, embedder, &docs)?;
    Ok(collection.len())
}
