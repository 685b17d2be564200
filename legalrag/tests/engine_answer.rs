use std::sync::{Arc, Mutex};

use legalrag::{
    AnswerEngine, Collection, Config, Document, Embedder, Generator, RagError, build_index,
};
use tempfile::TempDir;

const VOCAB: &[&str] = &[
    "section", "420", "318", "ipc", "bns", "cheating", "punishable", "punishment", "provisions",
    "what", "is", "the", "for", "under", "with", "up", "to", "7", "years",
];

struct VocabEmbedder;

fn embed_text(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; VOCAB.len()];
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        if let Some(idx) = VOCAB.iter().position(|w| *w == token) {
            vector[idx] += 1.0;
        }
    }
    vector
}

impl Embedder for VocabEmbedder {
    fn id(&self) -> String {
        "test/vocab".to_string()
    }

    fn embed(&self, texts: &[String]) -> legalrag::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| embed_text(t)).collect())
    }
}

const CANNED_REPLY: &str = "1. Conclusion: cheating is punishable.\n\
2. Applicable provisions: Section 420 IPC.\n\
3. Reasoning: the context covers cheating.\n\
4. This is informational, not professional legal advice.";

struct CannedGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl CannedGenerator {
    fn new(reply: &str) -> Self {
        Self { reply: reply.to_string(), prompts: Mutex::new(Vec::new()) }
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl Generator for CannedGenerator {
    fn generate(&self, prompt: &str) -> legalrag::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

struct FailingGenerator;

impl Generator for FailingGenerator {
    fn generate(&self, _prompt: &str) -> legalrag::Result<String> {
        Err(RagError::Generation("connection refused".to_string()))
    }
}

fn test_config(dir: &TempDir) -> Config {
    let mut cfg = Config::from_env();
    cfg.collection = "legal".to_string();
    cfg.persist_dir = dir.path().to_string_lossy().to_string();
    cfg.distance = "Cosine".to_string();
    cfg.top_k = 4;
    cfg
}

fn doc(text: &str, source: &str, page: usize) -> Document {
    Document { text: text.to_string(), source: source.to_string(), page }
}

const IPC_TEXT: &str = "Section 420 IPC: cheating punishable with up to 7 years";
const BNS_TEXT: &str = "Section 318 BNS: cheating provisions";

fn indexed_config(dir: &TempDir) -> Config {
    let cfg = test_config(dir);
    let docs = vec![doc(IPC_TEXT, "ipc.pdf", 1), doc(BNS_TEXT, "bns.pdf", 5)];
    build_index(&cfg, &VocabEmbedder, &docs).unwrap();
    cfg
}

#[test]
fn answer_carries_sources_in_rank_order() {
    let dir = TempDir::new().unwrap();
    let cfg = indexed_config(&dir);
    let generator = Arc::new(CannedGenerator::new(CANNED_REPLY));
    let engine =
        AnswerEngine::open(&cfg, Arc::new(VocabEmbedder), generator.clone()).unwrap();

    let answer = engine.answer("What is the punishment for cheating under IPC?").unwrap();
    assert_eq!(answer.text, CANNED_REPLY);
    assert_eq!(answer.sources.len(), 2);
    assert_eq!(answer.sources[0].source, "ipc.pdf");
    assert_eq!(answer.sources[0].page, 1);
    assert_eq!(answer.sources[1].source, "bns.pdf");

    let prompt = generator.last_prompt();
    assert!(prompt.contains("What is the punishment for cheating under IPC?"));
    assert!(prompt.contains(IPC_TEXT));
    assert!(prompt.contains(BNS_TEXT));
    // Context keeps retrieval order: most similar passage first.
    assert!(prompt.find(IPC_TEXT).unwrap() < prompt.find(BNS_TEXT).unwrap());
    assert!(!prompt.contains("{context}"));
    assert!(!prompt.contains("{question}"));
}

#[test]
fn top_one_retrieval_cites_the_ipc_page() {
    let dir = TempDir::new().unwrap();
    let mut cfg = indexed_config(&dir);
    cfg.top_k = 1;
    let engine = AnswerEngine::open(
        &cfg,
        Arc::new(VocabEmbedder),
        Arc::new(CannedGenerator::new(CANNED_REPLY)),
    )
    .unwrap();

    let answer = engine.answer("What is the punishment for cheating under IPC?").unwrap();
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].source, "ipc.pdf");
    assert_eq!(answer.sources[0].page, 1);
}

#[test]
fn empty_collection_still_answers() {
    let dir = TempDir::new().unwrap();
    let cfg = test_config(&dir);
    Collection::new("legal", "test/vocab", VOCAB.len())
        .save(&cfg.persist_dir)
        .unwrap();

    let generator = Arc::new(CannedGenerator::new(
        "The provided context is insufficient to answer this question.",
    ));
    let engine =
        AnswerEngine::open(&cfg, Arc::new(VocabEmbedder), generator.clone()).unwrap();

    let answer = engine.answer("What is the punishment for cheating under IPC?").unwrap();
    assert!(answer.sources.is_empty());
    assert!(!answer.text.is_empty());
    // The model is still consulted, with an empty context slot.
    assert!(generator.last_prompt().contains("What is the punishment"));
}

#[test]
fn missing_collection_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let cfg = test_config(&dir);
    let err = AnswerEngine::open(
        &cfg,
        Arc::new(VocabEmbedder),
        Arc::new(CannedGenerator::new(CANNED_REPLY)),
    )
    .unwrap_err();
    assert!(matches!(err, RagError::CollectionNotFound { .. }));
}

#[test]
fn invalid_template_fails_at_open() {
    let dir = TempDir::new().unwrap();
    let mut cfg = indexed_config(&dir);
    cfg.prompt_template = "Answer this: {question}".to_string();
    let err = AnswerEngine::open(
        &cfg,
        Arc::new(VocabEmbedder),
        Arc::new(CannedGenerator::new(CANNED_REPLY)),
    )
    .unwrap_err();
    assert!(matches!(err, RagError::Template(_)));
}

#[test]
fn zero_top_k_fails_at_open() {
    let dir = TempDir::new().unwrap();
    let mut cfg = indexed_config(&dir);
    cfg.top_k = 0;
    let err = AnswerEngine::open(
        &cfg,
        Arc::new(VocabEmbedder),
        Arc::new(CannedGenerator::new(CANNED_REPLY)),
    )
    .unwrap_err();
    assert!(matches!(err, RagError::Config(_)));
}

#[test]
fn empty_question_is_rejected() {
    let dir = TempDir::new().unwrap();
    let cfg = indexed_config(&dir);
    let engine = AnswerEngine::open(
        &cfg,
        Arc::new(VocabEmbedder),
        Arc::new(CannedGenerator::new(CANNED_REPLY)),
    )
    .unwrap();
    let err = engine.answer("   ").unwrap_err();
    assert!(matches!(err, RagError::Config(_)));
}

#[test]
fn generation_failure_surfaces_unretried() {
    let dir = TempDir::new().unwrap();
    let cfg = indexed_config(&dir);
    let engine =
        AnswerEngine::open(&cfg, Arc::new(VocabEmbedder), Arc::new(FailingGenerator)).unwrap();
    let err = engine.answer("What is the punishment for cheating under IPC?").unwrap_err();
    match err {
        RagError::Generation(message) => assert!(message.contains("connection refused")),
        other => panic!("expected Generation error, got {other}"),
    }
}
