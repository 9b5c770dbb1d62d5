//! # Omnidoc
//!
//! A multilingual document question-answering assistant with
//! retrieval-augmented chat.
//!
//! Omnidoc ingests heterogeneous inputs (PDF, DOCX, images, web pages,
//! video transcripts), builds a content-addressed semantic index, produces
//! a length-controlled Markdown summary, and answers follow-up questions
//! grounded in the indexed content. Output is presented in the user's
//! chosen display language and can be exported as JSON, DOCX, or
//! synthesized audio.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌─────────────┐
//! │  Extractors  │──▶│ Fingerprint+Chunk │──▶│ Index Store │
//! │ PDF/DOCX/OCR │   │   (content hash)  │   │  (in-mem)   │
//! │  Web/Video   │   └───────────────────┘   └──────┬──────┘
//! └──────────────┘                                  │
//!                         ┌────────────────────────┤
//!                         ▼                        ▼
//!                   ┌───────────┐           ┌────────────┐
//!                   │ Summarize │           │  RAG Chat  │
//!                   └─────┬─────┘           └─────┬──────┘
//!                         ▼                       ▼
//!                  translate / speech / JSON+DOCX export
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GROQ_API_KEY=...
//! omni summarize report.pdf --words 300
//! omni chat report.pdf notes.docx --language es
//! omni languages
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | Multi-format text extraction |
//! | [`fingerprint`] | Content-addressed source-set digests |
//! | [`chunk`] | Overlapping-window text chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | Semantic index and fingerprint-keyed cache |
//! | [`llm`] | Chat-completion client |
//! | [`responder`] | Retrieval-augmented answering and summarization |
//! | [`translate`] | Display languages and translation |
//! | [`speech`] | Markdown cleanup and speech synthesis |
//! | [`report`] | JSON and DOCX session export |
//! | [`session`] | Active session context |
//! | [`pipeline`] | Process and ask command handlers |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod extract;
pub mod fingerprint;
pub mod index;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod responder;
pub mod session;
pub mod speech;
pub mod translate;
