//! Sliding-window text chunker.
//!
//! Splits extracted text units into fixed-size character windows with a
//! fixed overlap between consecutive windows, so a concept spanning a
//! boundary is never lost to either side. Windows are sliced on `char`
//! boundaries, never inside a multi-byte code point.
//!
//! Each chunk receives a UUID plus a SHA-256 hash of its text.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::{Chunk, TextUnit};

/// Returned when chunking produced nothing to index.
///
/// An all-whitespace input set must short-circuit indexing rather than
/// build an index over nothing.
#[derive(Debug)]
pub struct NoChunksError;

impl std::fmt::Display for NoChunksError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no text chunks could be created from the supplied content")
    }
}

impl std::error::Error for NoChunksError {}

/// Split text units into overlapping windows of `chunk_chars` characters.
///
/// Unit texts are joined with blank lines before windowing, so windows can
/// span unit boundaries. Consecutive chunks share a verbatim
/// `overlap_chars`-character region. Returns chunks with contiguous indices
/// starting at 0, or [`NoChunksError`] when every window is whitespace.
pub fn split_units(
    units: &[TextUnit],
    chunk_chars: usize,
    overlap_chars: usize,
) -> Result<Vec<Chunk>, NoChunksError> {
    let text = units
        .iter()
        .map(|u| u.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let chars: Vec<char> = text.chars().collect();
    let stride = chunk_chars.saturating_sub(overlap_chars).max(1);

    let mut chunks = Vec::new();
    let mut chunk_index: i64 = 0;
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_chars).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        if !window.trim().is_empty() {
            chunks.push(make_chunk(chunk_index, window));
            chunk_index += 1;
        }
        if end == chars.len() {
            break;
        }
        start += stride;
    }

    if chunks.is_empty() {
        return Err(NoChunksError);
    }

    Ok(chunks)
}

fn make_chunk(index: i64, text: String) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        index,
        text,
        hash,
    }
}
