//! # Omnidoc CLI (`omni`)
//!
//! The `omni` binary is the interface to the document assistant. It
//! processes a batch of inputs into a semantic index, prints a summary,
//! and (in chat mode) answers follow-up questions grounded in the indexed
//! content.
//!
//! ## Usage
//!
//! ```bash
//! omni [--config ./omnidoc.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `omni summarize <files...>` | Process inputs and print a summary |
//! | `omni chat <files...>` | Process inputs, then answer questions interactively |
//! | `omni languages` | List supported display languages |
//!
//! ## Examples
//!
//! ```bash
//! # Summarize a PDF in about 300 words
//! omni summarize report.pdf --words 300
//!
//! # Summarize a web page in Spanish, exporting a DOCX report
//! omni summarize --url https://example.com/post --language es --docx report.docx
//!
//! # Chat with two documents in Hindi
//! omni chat report.pdf notes.docx --language hi
//!
//! # Synthesize the summary as MP3 audio
//! omni summarize scan.png --audio summary.mp3
//! ```
//!
//! Environment: `GROQ_API_KEY` is required; `OPENAI_API_KEY` only when the
//! embedding provider is `openai`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Input};

use omnidoc::config::{self, Config};
use omnidoc::embedding::{Embedder, HttpEmbedder};
use omnidoc::index::IndexStore;
use omnidoc::llm::LlmClient;
use omnidoc::models::SourceItem;
use omnidoc::pipeline::{self, ProcessRequest};
use omnidoc::report;
use omnidoc::session::Session;
use omnidoc::speech;
use omnidoc::translate::Language;

/// Omnidoc: chat with any document, in your language.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; built-in defaults apply when the file does not exist.
#[derive(Parser)]
#[command(
    name = "omni",
    about = "Omnidoc: a multilingual document question-answering assistant",
    version,
    long_about = "Omnidoc ingests PDFs, DOCX files, images (OCR), web pages, and video \
    transcripts, builds a semantic index over their content, produces a length-controlled \
    Markdown summary, and answers follow-up questions grounded in the indexed content, \
    with translation, speech synthesis, and report export."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./omnidoc.toml`; when absent, built-in defaults apply.
    #[arg(long, global = true, default_value = "./omnidoc.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Process inputs and print a summary.
    ///
    /// Accepts PDF, DOCX, PNG, and JPG files plus one optional URL
    /// (web page or video link). The summary can be exported as JSON or
    /// DOCX, or synthesized to MP3 audio.
    Summarize {
        /// Files to process (pdf, docx, png, jpg, jpeg).
        files: Vec<PathBuf>,

        /// Public web page or video URL to include.
        #[arg(long)]
        url: Option<String>,

        /// Approximate summary length in words.
        #[arg(long)]
        words: Option<usize>,

        /// Display language: en, es, hi, te, or ta.
        #[arg(long, default_value = "en")]
        language: Language,

        /// Write a JSON report to this path.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write a DOCX report to this path.
        #[arg(long)]
        docx: Option<PathBuf>,

        /// Write MP3 audio of the summary to this path.
        #[arg(long)]
        audio: Option<PathBuf>,
    },

    /// Process inputs, print the summary, then answer questions
    /// interactively.
    ///
    /// In-loop commands: `:json [path]`, `:docx [path]`, `:speak [path]`,
    /// `:quit`.
    Chat {
        /// Files to process (pdf, docx, png, jpg, jpeg).
        files: Vec<PathBuf>,

        /// Public web page or video URL to include.
        #[arg(long)]
        url: Option<String>,

        /// Approximate summary length in words.
        #[arg(long)]
        words: Option<usize>,

        /// Display language: en, es, hi, te, or ta.
        #[arg(long, default_value = "en")]
        language: Language,
    },

    /// List supported display languages.
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Summarize {
            files,
            url,
            words,
            language,
            json,
            docx,
            audio,
        } => {
            let session = run_process(&cfg, files, url, words, language).await?;
            println!("{}", session.summary_display);
            if let Some(path) = json {
                export_json(&session, &path)?;
            }
            if let Some(path) = docx {
                export_docx(&session, &path)?;
            }
            if let Some(path) = audio {
                export_audio(&session, &path).await?;
            }
        }
        Commands::Chat {
            files,
            url,
            words,
            language,
        } => {
            let mut session = run_process(&cfg, files, url, words, language).await?;
            println!("{}\n", session.summary_display);
            run_chat_loop(&mut session).await?;
        }
        Commands::Languages => {
            println!("{:<12} CODE", "LANGUAGE");
            for lang in Language::ALL {
                println!("{:<12} {}", lang.label(), lang.code());
            }
        }
    }

    Ok(())
}

/// Gather sources and run the processing pipeline into a fresh session.
async fn run_process(
    cfg: &Config,
    files: Vec<PathBuf>,
    url: Option<String>,
    words: Option<usize>,
    language: Language,
) -> Result<Session> {
    let mut sources = Vec::new();
    if let Some(url) = url {
        sources.push(SourceItem::Url { url });
    }
    for path in files {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        sources.push(SourceItem::File { name, bytes });
    }

    let store = IndexStore::new();
    let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(cfg.embedding.clone())?);
    let llm = LlmClient::new(cfg.llm.clone())?;

    eprintln!("Processing content...");
    let session = pipeline::process(
        cfg,
        &store,
        embedder,
        llm,
        ProcessRequest {
            sources,
            language,
            summary_words: words.unwrap_or(cfg.summary.default_words),
        },
    )
    .await?;
    eprintln!(
        "Indexed content {} ({} chunks)\n",
        session.fingerprint.short(),
        session.responder.chunk_count()
    );

    Ok(session)
}

/// Interactive question loop. A failed question is reported and the loop
/// continues with history intact.
async fn run_chat_loop(session: &mut Session) -> Result<()> {
    println!("Ask anything about the content. Commands: :json, :docx, :speak, :quit");

    loop {
        let line: String = match Input::with_theme(&ColorfulTheme::default())
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(_) => break,
        };
        let line = line.trim().to_string();

        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(':') {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let command = parts.next().unwrap_or("");
            let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());
            match command {
                "quit" | "exit" | "q" => break,
                "json" => {
                    let path = arg
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from(format!("{}.json", session.export_stem())));
                    if let Err(e) = export_json(session, &path) {
                        eprintln!("error: {:#}", e);
                    }
                }
                "docx" => {
                    let path = arg
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from(format!("{}.docx", session.export_stem())));
                    if let Err(e) = export_docx(session, &path) {
                        eprintln!("error: {:#}", e);
                    }
                }
                "speak" => {
                    let path = arg
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from(format!("{}.mp3", session.export_stem())));
                    if let Err(e) = export_audio(session, &path).await {
                        eprintln!("error: {:#}", e);
                    }
                }
                other => eprintln!("unknown command :{}", other),
            }
            continue;
        }

        match pipeline::ask(session, &line).await {
            Ok(answer) => println!("\n{}\n", answer),
            Err(e) => eprintln!("error: {:#}", e),
        }
    }

    Ok(())
}

fn export_json(session: &Session, path: &Path) -> Result<()> {
    let json = report::to_json(session)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn export_docx(session: &Session, path: &Path) -> Result<()> {
    let bytes = report::to_docx(session)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn export_audio(session: &Session, path: &Path) -> Result<()> {
    let plain = speech::markdown_to_plain(&session.summary_display);
    let audio = speech::synthesize(&plain, session.language.code()).await?;
    std::fs::write(path, audio)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
