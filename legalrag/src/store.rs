use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RagError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub source: String,
    pub page: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Record {
    text: String,
    source: String,
    page: usize,
    vector: Vec<f32>,
}

/// One retrieval match, ordered by ascending distance to the query vector.
#[derive(Clone, Debug)]
pub struct Hit {
    pub text: String,
    pub source: String,
    pub page: usize,
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Distance {
    Cosine,
    Euclid,
}

impl Distance {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "Cosine" => Ok(Distance::Cosine),
            "Euclid" => Ok(Distance::Euclid),
            other => Err(RagError::Config(format!(
                "unknown distance '{}', expected 'Cosine' or 'Euclid'",
                other
            ))),
        }
    }

    fn between(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Distance::Cosine => {
                let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 1.0;
                }
                1.0 - dot / (norm_a * norm_b)
            }
            Distance::Euclid => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
        }
    }
}

/// A named set of embedded documents persisted as one JSON file under the
/// persist directory. The embedder fingerprint recorded at build time guards
/// against querying with vectors from a different provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Collection {
    name: String,
    embedder_id: String,
    dimension: usize,
    records: Vec<Record>,
}

impl Collection {
    pub fn new(name: &str, embedder_id: &str, dimension: usize) -> Self {
        Self {
            name: name.to_string(),
            embedder_id: embedder_id.to_string(),
            dimension,
            records: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, doc: Document, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.records.push(Record {
            text: doc.text,
            source: doc.source,
            page: doc.page,
            vector,
        });
        Ok(())
    }

    fn file_path(persist_dir: &str, name: &str) -> PathBuf {
        Path::new(persist_dir).join(format!("{}.json", name))
    }

    /// Persist to disk, creating or overwriting the collection file.
    pub fn save(&self, persist_dir: &str) -> Result<PathBuf> {
        fs::create_dir_all(persist_dir)?;
        let path = Self::file_path(persist_dir, &self.name);
        let data = serde_json::to_vec(self).map_err(|e| RagError::Store {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, data)?;
        debug!(path = %path.display(), records = self.records.len(), "collection saved");
        Ok(path)
    }

    pub fn open(name: &str, persist_dir: &str, embedder_id: &str) -> Result<Self> {
        let path = Self::file_path(persist_dir, name);
        if !path.exists() {
            return Err(RagError::CollectionNotFound { collection: name.to_string(), path });
        }
        let data = fs::read(&path)?;
        let collection: Collection = serde_json::from_slice(&data).map_err(|e| {
            RagError::Store { path: path.clone(), message: e.to_string() }
        })?;
        if collection.embedder_id != embedder_id {
            return Err(RagError::EmbedderMismatch {
                collection: name.to_string(),
                indexed: collection.embedder_id,
                current: embedder_id.to_string(),
            });
        }
        Ok(collection)
    }

    /// Top-k scan: at most `k` hits, ascending distance, ties kept in
    /// insertion order.
    pub fn query(&self, vector: &[f32], k: usize, distance: Distance) -> Vec<Hit> {
        let mut hits: Vec<Hit> = self
            .records
            .iter()
            .map(|r| Hit {
                text: r.text.clone(),
                source: r.source.clone(),
                page: r.page,
                distance: distance.between(&r.vector, vector),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, source: &str, page: usize) -> Document {
        Document { text: text.to_string(), source: source.to_string(), page }
    }

    fn sample() -> Collection {
        let mut collection = Collection::new("legal", "test/fixed", 2);
        collection.push(doc("far", "a.txt", 1), vec![0.0, 1.0]).unwrap();
        collection.push(doc("near", "b.txt", 1), vec![1.0, 0.0]).unwrap();
        collection.push(doc("middle", "c.txt", 1), vec![0.7, 0.7]).unwrap();
        collection
    }

    #[test]
    fn query_orders_by_ascending_distance() {
        let hits = sample().query(&[1.0, 0.0], 3, Distance::Cosine);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].text, "near");
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn query_truncates_to_k() {
        assert_eq!(sample().query(&[1.0, 0.0], 1, Distance::Cosine).len(), 1);
        // k larger than the collection returns everything once.
        assert_eq!(sample().query(&[1.0, 0.0], 10, Distance::Cosine).len(), 3);
    }

    #[test]
    fn equal_distances_keep_insertion_order() {
        let mut collection = Collection::new("legal", "test/fixed", 2);
        collection.push(doc("first", "a.txt", 1), vec![1.0, 0.0]).unwrap();
        collection.push(doc("second", "b.txt", 1), vec![1.0, 0.0]).unwrap();
        let hits = collection.query(&[1.0, 0.0], 2, Distance::Cosine);
        assert_eq!(hits[0].text, "first");
        assert_eq!(hits[1].text, "second");
    }

    #[test]
    fn euclid_distance_ranks_closest_first() {
        let mut collection = Collection::new("legal", "test/fixed", 2);
        collection.push(doc("away", "a.txt", 1), vec![5.0, 5.0]).unwrap();
        collection.push(doc("close", "b.txt", 1), vec![1.0, 1.1]).unwrap();
        let hits = collection.query(&[1.0, 1.0], 2, Distance::Euclid);
        assert_eq!(hits[0].text, "close");
    }

    #[test]
    fn push_rejects_wrong_dimension() {
        let mut collection = Collection::new("legal", "test/fixed", 2);
        let err = collection.push(doc("bad", "a.txt", 1), vec![1.0]).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn distance_parse_rejects_unknown_metric() {
        assert!(Distance::parse("Cosine").is_ok());
        assert!(Distance::parse("Manhattan").is_err());
    }
}
