//! Processing and chat command handlers.
//!
//! Each handler is invoked only by its triggering CLI action: `process`
//! runs extract → fingerprint → chunk → index → summarize → translate and
//! returns a fresh [`Session`]; `ask` answers one question against the
//! active session. The index cache is consulted explicitly inside
//! `get_or_build`, so reprocessing an already-seen content set skips the
//! embedding work.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::chunk::split_units;
use crate::config::Config;
use crate::embedding::Embedder;
use crate::extract::{self, ExtractError};
use crate::fingerprint;
use crate::index::IndexStore;
use crate::llm::LlmClient;
use crate::models::{Role, SourceItem, TextUnit};
use crate::responder::Responder;
use crate::session::Session;
use crate::translate::{translate, Language};

pub struct ProcessRequest {
    pub sources: Vec<SourceItem>,
    pub language: Language,
    pub summary_words: usize,
}

/// Process a batch of sources into a fresh session.
///
/// Per-source extraction failures degrade to placeholder units inside the
/// extractor; unsupported file types are skipped with a warning so the
/// rest of the batch survives. Indexing and summarization failures are
/// terminal for this action.
pub async fn process(
    config: &Config,
    store: &IndexStore,
    embedder: Arc<dyn Embedder>,
    llm: LlmClient,
    request: ProcessRequest,
) -> Result<Session> {
    if request.sources.is_empty() {
        bail!("Please provide a URL or at least one file.");
    }

    let words = request.summary_words;
    let summary_range = config.summary.min_words..=config.summary.max_words;
    if !summary_range.contains(&words) {
        bail!(
            "Summary length must be between {} and {} words.",
            config.summary.min_words,
            config.summary.max_words
        );
    }

    let mut units: Vec<TextUnit> = Vec::new();
    let mut identifiers: Vec<String> = Vec::new();

    for source in &request.sources {
        match extract::extract(source).await {
            Ok(extracted) => {
                identifiers.push(fingerprint::source_identifier(source));
                units.extend(extracted);
            }
            Err(ExtractError::UnsupportedMediaType(name)) => {
                eprintln!("warning: skipping unsupported file type: {}", name);
            }
            Err(e) => {
                eprintln!("warning: skipping {}: {}", source.label(), e);
            }
        }
    }

    if units.is_empty() {
        bail!("No valid content could be processed.");
    }

    let fp = fingerprint::fingerprint(&identifiers);

    let chunks = split_units(
        &units,
        config.chunking.chunk_chars,
        config.chunking.overlap_chars,
    )
    .context("Indexing failed")?;

    let index = store
        .get_or_build(&fp, &chunks, embedder.as_ref())
        .await
        .context("Indexing failed")?;

    let responder = Responder::new(
        index,
        embedder,
        llm,
        config.retrieval.top_k,
        config.summary.context_budget_chars,
    );

    let summary_original = responder
        .summarize(words)
        .await
        .context("Summary generation failed")?;
    let summary_display = translate(responder.llm(), &summary_original, request.language)
        .await
        .context("Summary translation failed")?;

    Ok(Session::new(
        fp,
        request.language,
        summary_original,
        summary_display,
        responder,
    ))
}

/// Answer one question in the active session.
///
/// On success the user and assistant turns are appended; on failure the
/// turn log is left untouched so a failed call never corrupts history.
pub async fn ask(session: &mut Session, question: &str) -> Result<String> {
    let answer = session.responder.answer(question, &session.turns).await?;
    let display_answer = translate(session.responder.llm(), &answer, session.language).await?;

    session.push_turn(Role::User, question.to_string(), question.to_string());
    session.push_turn(Role::Assistant, answer, display_answer.clone());

    Ok(display_answer)
}
