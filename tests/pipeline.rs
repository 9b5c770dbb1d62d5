//! Integration tests for the processing pipeline with a stub embedder.
//!
//! These exercise the extract → fingerprint → chunk → index flow without
//! any network or external binaries, suitable for CI and deterministic
//! runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use omnidoc::chunk::split_units;
use omnidoc::embedding::Embedder;
use omnidoc::extract::{self, NO_TRANSCRIPT_SENTINEL};
use omnidoc::fingerprint::{self, Fingerprint};
use omnidoc::index::IndexStore;
use omnidoc::models::{SourceItem, TextUnit};

/// Deterministic embedder: an 8-dim vector derived from the text's SHA-256
/// digest, plus a build counter for cache assertions.
struct StubEmbedder {
    calls: AtomicUsize,
}

impl StubEmbedder {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn batch_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(text: &str) -> Vec<f32> {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();
        digest[..8].iter().map(|b| *b as f32 / 255.0).collect()
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }
}

fn unit(text: &str) -> TextUnit {
    TextUnit::new("test", text)
}

fn chunks_for(texts: &[&str]) -> Vec<omnidoc::models::Chunk> {
    let units: Vec<TextUnit> = texts.iter().map(|t| unit(t)).collect();
    split_units(&units, 1000, 100).unwrap()
}

fn file_fingerprint(byte_sets: &[&[u8]]) -> Fingerprint {
    let ids: Vec<String> = byte_sets
        .iter()
        .map(|bytes| {
            fingerprint::source_identifier(&SourceItem::File {
                name: "upload.pdf".to_string(),
                bytes: bytes.to_vec(),
            })
        })
        .collect();
    fingerprint::fingerprint(&ids)
}

#[tokio::test]
async fn cache_returns_same_index_instance() {
    let store = IndexStore::new();
    let embedder = StubEmbedder::new();
    let fp = fingerprint::fingerprint(&["source-a".to_string()]);

    let first = store
        .get_or_build(&fp, &chunks_for(&["some document text"]), &embedder)
        .await
        .unwrap();
    // Second call supplies a different chunk set for the same fingerprint;
    // the cached index must be returned unchanged.
    let second = store
        .get_or_build(&fp, &chunks_for(&["entirely different text"]), &embedder)
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(embedder.batch_calls(), 1);
}

#[tokio::test]
async fn identical_file_bytes_trigger_one_build() {
    // Two separate uploads with identical byte content: one fingerprint,
    // exactly one index build.
    let bytes = b"%PDF-1.4 fake content for hashing";
    let fp_two_uploads = file_fingerprint(&[bytes, bytes]);
    let fp_one_upload = file_fingerprint(&[bytes]);
    assert_eq!(fp_two_uploads, fp_one_upload);

    let store = IndexStore::new();
    let embedder = StubEmbedder::new();
    let chunks = chunks_for(&["extracted text from the upload"]);

    store
        .get_or_build(&fp_two_uploads, &chunks, &embedder)
        .await
        .unwrap();
    store
        .get_or_build(&fp_one_upload, &chunks, &embedder)
        .await
        .unwrap();

    assert_eq!(embedder.batch_calls(), 1);
}

#[tokio::test]
async fn distinct_content_builds_distinct_indexes() {
    let store = IndexStore::new();
    let embedder = StubEmbedder::new();

    let fp_a = file_fingerprint(&[b"content version one"]);
    let fp_b = file_fingerprint(&[b"content version two"]);
    assert_ne!(fp_a, fp_b);

    let a = store
        .get_or_build(&fp_a, &chunks_for(&["text a"]), &embedder)
        .await
        .unwrap();
    let b = store
        .get_or_build(&fp_b, &chunks_for(&["text b"]), &embedder)
        .await
        .unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(embedder.batch_calls(), 2);
}

#[tokio::test]
async fn whitespace_only_content_short_circuits_indexing() {
    let units = [unit("   "), unit("\n\t")];
    assert!(split_units(&units, 1000, 100).is_err());
}

#[tokio::test]
async fn retrieval_surfaces_the_matching_chunk() {
    let store = IndexStore::new();
    let embedder = StubEmbedder::new();
    let fp = fingerprint::fingerprint(&["retrieval-test".to_string()]);

    let chunks = chunks_for(&["alpha facts about rust"]);
    let more = chunks_for(&["beta notes on deployment"]);
    let mut all = chunks;
    all.extend(more);
    // Re-index the combined set under one fingerprint.
    let index = store.get_or_build(&fp, &all, &embedder).await.unwrap();

    // The stub embeds identical text to identical vectors, so querying
    // with a chunk's own text must rank that chunk first.
    let query_vec = StubEmbedder::vector_for(&all[1].text);
    let hits = index.top_k(&query_vec, 1);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, all[1].text);
}

#[tokio::test]
async fn transcriptless_video_sentinel_flows_through_indexing() {
    // A video with no transcript degrades to a sentinel unit, and the
    // pipeline still chunks and indexes it so summarization can proceed.
    let sentinel = TextUnit::new(
        "https://youtu.be/nonexistent",
        NO_TRANSCRIPT_SENTINEL,
    );
    assert!(sentinel.text.contains("No transcript available"));

    let chunks = split_units(&[sentinel], 1000, 100).unwrap();
    assert_eq!(chunks.len(), 1);

    let store = IndexStore::new();
    let embedder = StubEmbedder::new();
    let fp = fingerprint::fingerprint(&["https://youtu.be/nonexistent".to_string()]);
    let index = store.get_or_build(&fp, &chunks, &embedder).await.unwrap();
    assert_eq!(index.len(), 1);
    assert!(index.chunk_texts().next().unwrap().contains("No transcript"));
}

/// Minimal valid PDF containing `phrase`. Body offsets are computed so the
/// xref table is correct and the text extractor can parse it.
fn minimal_pdf_with_phrase(phrase: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    let stream = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET\n", phrase);
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}endstream endobj\n",
            stream.len(),
            stream
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n");
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

/// Minimal DOCX (ZIP) whose `word/document.xml` carries `phrase`.
fn minimal_docx_with_phrase(phrase: &str) -> Vec<u8> {
    use std::io::Write;
    let mut buf = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
            phrase
        );
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    buf
}

#[tokio::test]
async fn disk_files_extract_and_index_end_to_end() {
    let tmp = tempfile::TempDir::new().unwrap();
    let pdf_path = tmp.path().join("alpha.pdf");
    let docx_path = tmp.path().join("beta.docx");
    std::fs::write(&pdf_path, minimal_pdf_with_phrase("alpha document phrase")).unwrap();
    std::fs::write(&docx_path, minimal_docx_with_phrase("beta office phrase")).unwrap();

    let mut units = Vec::new();
    let mut identifiers = Vec::new();
    for path in [&pdf_path, &docx_path] {
        let item = SourceItem::File {
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            bytes: std::fs::read(path).unwrap(),
        };
        identifiers.push(fingerprint::source_identifier(&item));
        units.extend(extract::extract(&item).await.unwrap());
    }

    assert_eq!(units.len(), 2);
    assert!(units[0].text.contains("alpha document phrase"));
    assert!(units[1].text.contains("beta office phrase"));

    let fp = fingerprint::fingerprint(&identifiers);
    let chunks = split_units(&units, 1000, 100).unwrap();
    let store = IndexStore::new();
    let embedder = StubEmbedder::new();
    let index = store.get_or_build(&fp, &chunks, &embedder).await.unwrap();
    assert!(!index.is_empty());
}

#[tokio::test]
async fn unsupported_file_type_is_an_error_not_a_unit() {
    let err = extract::extract(&SourceItem::File {
        name: "slides.key".to_string(),
        bytes: b"binary".to_vec(),
    })
    .await
    .unwrap_err();
    assert!(err.to_string().contains("unsupported file type"));
}

#[tokio::test]
async fn empty_chunk_slice_is_rejected_by_the_store() {
    let store = IndexStore::new();
    let embedder = StubEmbedder::new();
    let fp = fingerprint::fingerprint(&["empty".to_string()]);

    let err = store.get_or_build(&fp, &[], &embedder).await.unwrap_err();
    assert!(err.to_string().contains("no text chunks"));
    assert_eq!(embedder.batch_calls(), 0);
}
