use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::embed::Embedder;
use crate::error::{RagError, Result};
use crate::generate::Generator;
use crate::prompt::{join_context, render_prompt, validate_template};
use crate::store::{Collection, Distance};

/// One retrieved passage backing an [`Answer`], in retrieval order.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceDoc {
    pub source: String,
    pub page: usize,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SourceDoc>,
}

/// Answers questions from the indexed collection. Built once at startup and
/// shared by reference; the opened collection is the only cached state and
/// is read-only after indexing.
pub struct AnswerEngine {
    collection: Collection,
    distance: Distance,
    top_k: usize,
    template: String,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
}

impl std::fmt::Debug for AnswerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerEngine")
            .field("collection", &self.collection.name())
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl AnswerEngine {
    pub fn open(
        cfg: &Config,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        if cfg.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        validate_template(&cfg.prompt_template)?;
        let distance = Distance::parse(&cfg.distance)?;
        let collection = Collection::open(&cfg.collection, &cfg.persist_dir, &embedder.id())?;
        info!(collection = %cfg.collection, records = collection.len(), "collection opened");
        Ok(Self {
            collection,
            distance,
            top_k: cfg.top_k,
            template: cfg.prompt_template.clone(),
            embedder,
            generator,
        })
    }

    /// Embed the question, retrieve the top-k passages, render the prompt
    /// and ask the model. Every call re-embeds and re-generates; nothing is
    /// cached or retried.
    pub fn answer(&self, question: &str) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(RagError::Config("question must not be empty".to_string()));
        }

        let query_vec = self.embedder.embed_one(question)?;
        let hits = self.collection.query(&query_vec, self.top_k, self.distance);
        let prompt = render_prompt(&self.template, &join_context(&hits), question)?;

        let text = self.generator.generate(&prompt).inspect_err(|e| {
            error!(error = %e, "generation failed");
        })?;
        info!(retrieved = hits.len(), "answered question");

        let sources = hits
            .into_iter()
            .map(|h| SourceDoc { source: h.source, page: h.page, text: h.text })
            .collect();
        Ok(Answer { text, sources })
    }
}
