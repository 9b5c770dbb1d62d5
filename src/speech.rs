//! Summary audio: Markdown cleanup and speech synthesis.
//!
//! Raw Markdown symbols (`#`, `**`, bullets) read aloud as noise, so the
//! text is first rendered to events and only the textual content kept,
//! with whitespace collapsed. Synthesis calls the Google Translate TTS
//! endpoint segment by segment and concatenates the MP3 bytes.

use anyhow::{bail, Result};
use pulldown_cmark::{Event, Parser};
use std::time::Duration;

const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// The endpoint rejects long inputs; segments stay under this many chars.
const MAX_SEGMENT_CHARS: usize = 180;

const TTS_TIMEOUT_SECS: u64 = 30;

/// Reduce Markdown to plain spoken text: textual events only, whitespace
/// collapsed to single spaces.
pub fn markdown_to_plain(markdown: &str) -> String {
    let mut out = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => {
                out.push_str(&text);
                out.push(' ');
            }
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Synthesize MP3 audio for plain text in the given language code.
pub async fn synthesize(text: &str, lang_code: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    if text.is_empty() {
        bail!("nothing to speak: text is empty");
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(TTS_TIMEOUT_SECS))
        .build()?;

    let mut audio = Vec::new();
    for segment in split_segments(text, MAX_SEGMENT_CHARS) {
        let response = client
            .get(TTS_ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang_code),
                ("q", segment.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("TTS endpoint returned {}", response.status());
        }

        audio.extend_from_slice(&response.bytes().await?);
    }

    Ok(audio)
}

/// Split text into segments of at most `max_chars` characters, breaking on
/// whitespace. A single word longer than the limit becomes its own
/// segment.
fn split_segments(text: &str, max_chars: usize) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if current_chars > 0 && current_chars + 1 + word_chars > max_chars {
            segments.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if current_chars > 0 {
            current.push(' ');
            current_chars += 1;
        }
        current.push_str(word);
        current_chars += word_chars;
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
