//! Core data models used throughout omnidoc.
//!
//! These types represent the inputs, extracted text, chunks, and
//! conversation turns that flow through the processing and chat pipeline.

/// Media types accepted as file uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Docx,
    Png,
    Jpeg,
}

impl MediaType {
    /// Resolve a media type from a file name's extension.
    pub fn from_name(name: &str) -> Option<MediaType> {
        let ext = name.rsplit('.').next()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(MediaType::Pdf),
            "docx" => Some(MediaType::Docx),
            "png" => Some(MediaType::Png),
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            _ => None,
        }
    }
}

/// One input supplied by the user: a file's raw bytes or a URL.
///
/// Immutable once received; its lifecycle ends after extraction.
#[derive(Debug, Clone)]
pub enum SourceItem {
    File { name: String, bytes: Vec<u8> },
    Url { url: String },
}

impl SourceItem {
    /// Human-readable provenance label for extracted text.
    pub fn label(&self) -> &str {
        match self {
            SourceItem::File { name, .. } => name,
            SourceItem::Url { url } => url,
        }
    }
}

/// Extracted plain text plus the source it came from.
///
/// Degraded extractions produce sentinel units whose text explains the
/// failure, so a multi-source batch survives one bad input.
#[derive(Debug, Clone)]
pub struct TextUnit {
    pub source: String,
    pub text: String,
}

impl TextUnit {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// A bounded-length text window with fixed overlap to its neighbors.
///
/// Owned by the index once embedded; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub index: i64,
    pub text: String,
    pub hash: String,
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of the conversation.
///
/// `original` is the model-facing text (always the base language) and
/// `display` is what the user sees in their selected language. The two are
/// kept in parallel so translation never corrupts the model's memory.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub role: Role,
    pub original: String,
    pub display: String,
}
