use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::store::Document;

/// Walk a directory of legal texts and split each file into page-numbered
/// documents ready for indexing.
pub fn load_documents(cfg: &Config, source_dir: Option<&str>) -> Vec<Document> {
    let base = source_dir.unwrap_or(&cfg.source_dir);
    let mut docs = Vec::new();

    let walker = WalkDir::new(base).into_iter().filter_entry(|e| {
        let name = e.file_name().to_string_lossy();
        !cfg.exclude_dirs.iter().any(|d| d == &name)
    });

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_included_ext(path, &cfg.include_exts) {
            continue;
        }
        if let Ok(meta) = fs::metadata(path) {
            if meta.len() > cfg.max_file_bytes {
                debug!(path = %path.display(), "skipping oversized file");
                continue;
            }
        }
        let text = fs::read_to_string(path).unwrap_or_default();
        if text.trim().is_empty() {
            continue;
        }
        let source = path.to_string_lossy().to_string();
        for (idx, chunk) in chunk_text(&text, cfg.chunk_size, cfg.chunk_overlap)
            .into_iter()
            .enumerate()
        {
            docs.push(Document { text: chunk, source: source.clone(), page: idx + 1 });
        }
    }

    docs
}

fn has_included_ext(path: &Path, exts: &[String]) -> bool {
    let lower = path.to_string_lossy().to_lowercase();
    exts.iter().any(|ext| lower.ends_with(ext))
}
