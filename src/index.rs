//! Semantic index and the fingerprint-keyed index store.
//!
//! A [`SemanticIndex`] pairs every chunk with its embedding vector and
//! answers top-k queries by brute-force cosine similarity. The
//! [`IndexStore`] maps a fingerprint to a built index and guarantees
//! at-most-one build per fingerprint for the process lifetime; there is no
//! eviction, which is acceptable for a single-session interactive tool.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sha2::{Digest, Sha256};

use crate::embedding::Embedder;
use crate::fingerprint::Fingerprint;
use crate::models::Chunk;

/// Indexing error: terminal for the triggering processing action.
#[derive(Debug)]
pub enum IndexError {
    EmptyChunkSet,
    Embedding(String),
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::EmptyChunkSet => {
                write!(f, "indexing failed: no text chunks were supplied")
            }
            IndexError::Embedding(e) => write!(f, "indexing failed: {}", e),
        }
    }
}

impl std::error::Error for IndexError {}

#[derive(Debug)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Embedding-backed structure over all chunks for one fingerprint.
///
/// Shared read-only by every query against that fingerprint.
#[derive(Debug)]
pub struct SemanticIndex {
    entries: Vec<IndexEntry>,
    chunk_set_hash: String,
}

impl SemanticIndex {
    /// The `k` chunks most similar to the query vector, descending.
    pub fn top_k(&self, query_vec: &[f32], k: usize) -> Vec<&Chunk> {
        let mut scored: Vec<(f32, &Chunk)> = self
            .entries
            .iter()
            .map(|e| (cosine_similarity(query_vec, &e.vector), &e.chunk))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored.into_iter().map(|(_, c)| c).collect()
    }

    /// Chunk texts in index order.
    pub fn chunk_texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.chunk.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Digest of a chunk set's content, used to surface the same-fingerprint /
/// different-chunks sharp edge on cache hits.
fn chunk_set_hash(chunks: &[Chunk]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.hash.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Cache of built indexes keyed by fingerprint.
///
/// Injected as a dependency rather than accessed as ambient state; entries
/// persist until process exit.
pub struct IndexStore {
    entries: RwLock<HashMap<String, Arc<SemanticIndex>>>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached index for `fingerprint`, building it on first use.
    ///
    /// Once an index exists for a fingerprint it is returned unchanged on
    /// every later call, even if the supplied chunks differ; fingerprints
    /// are content-derived, so a mismatch indicates a caller error and is
    /// reported as a warning rather than asserted.
    pub async fn get_or_build(
        &self,
        fingerprint: &Fingerprint,
        chunks: &[Chunk],
        embedder: &dyn Embedder,
    ) -> Result<Arc<SemanticIndex>, IndexError> {
        let supplied_hash = chunk_set_hash(chunks);

        if let Some(existing) = self.lookup(fingerprint) {
            if existing.chunk_set_hash != supplied_hash {
                eprintln!(
                    "warning: index cache hit for {} with a different chunk set; returning the cached index",
                    fingerprint.short()
                );
            }
            return Ok(existing);
        }

        if chunks.is_empty() {
            return Err(IndexError::EmptyChunkSet);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder
            .embed(&texts)
            .await
            .map_err(|e| IndexError::Embedding(e.to_string()))?;
        if vectors.len() != chunks.len() {
            return Err(IndexError::Embedding(format!(
                "embedded {} of {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let entries = chunks
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();
        let built = Arc::new(SemanticIndex {
            entries,
            chunk_set_hash: supplied_hash,
        });

        let mut guard = self.entries.write().unwrap();
        // Another call may have built between our lookup and this insert;
        // the first insert wins.
        let stored = guard
            .entry(fingerprint.as_hex().to_string())
            .or_insert(built);
        Ok(Arc::clone(stored))
    }

    fn lookup(&self, fingerprint: &Fingerprint) -> Option<Arc<SemanticIndex>> {
        self.entries
            .read()
            .unwrap()
            .get(fingerprint.as_hex())
            .cloned()
    }
}

impl Default for IndexStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosine similarity in `[-1.0, 1.0]`; `0.0` for empty or mismatched
/// lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
