//! Display-language selection and translation.
//!
//! Five supported display languages, each mapped to a two-letter code used
//! for both label lookup and speech synthesis. English is the base
//! language: the model always converses in it, so translating to English
//! is the identity.

use anyhow::Result;

use crate::llm::{ChatMessage, LlmClient};

/// Closed set of display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Spanish,
    Hindi,
    Telugu,
    Tamil,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Spanish,
        Language::Hindi,
        Language::Telugu,
        Language::Tamil,
    ];

    /// Two-letter code, used for labels and speech synthesis.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::Hindi => "hi",
            Language::Telugu => "te",
            Language::Tamil => "ta",
        }
    }

    /// Native-script label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Español",
            Language::Hindi => "हिन्दी",
            Language::Telugu => "తెలుగు",
            Language::Tamil => "தமிழ்",
        }
    }

    /// English name, used in translation prompts.
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::Hindi => "Hindi",
            Language::Telugu => "Telugu",
            Language::Tamil => "Tamil",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "es" | "spanish" | "español" => Ok(Language::Spanish),
            "hi" | "hindi" => Ok(Language::Hindi),
            "te" | "telugu" => Ok(Language::Telugu),
            "ta" | "tamil" => Ok(Language::Tamil),
            other => Err(format!(
                "unknown language '{}'; supported: en, es, hi, te, ta",
                other
            )),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Translate text into the target display language.
///
/// Identity for English; otherwise a translation prompt that returns only
/// the translated text.
pub async fn translate(llm: &LlmClient, text: &str, target: Language) -> Result<String> {
    if target == Language::English {
        return Ok(text.to_string());
    }

    let messages = [ChatMessage::user(format!(
        "Translate the following text accurately to {}. Provide only the \
         translated text, without any additional commentary or explanations.\n\n\
         Text to translate:\n---\n{}",
        target.english_name(),
        text
    ))];
    llm.complete(&messages).await
}
