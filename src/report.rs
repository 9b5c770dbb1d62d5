//! Session report export: structured JSON and a formatted DOCX document.
//!
//! The JSON export carries the summary and the display-language chat
//! transcript. The DOCX export is a minimal OOXML package (content types,
//! relationships, `word/document.xml`) with a title, a summary section,
//! and a chat-history section with bold role labels; the chat-history
//! heading is written even when there are no turns yet.

use std::io::Write;

use anyhow::Result;
use chrono::Utc;
use quick_xml::escape::escape;
use serde::Serialize;
use zip::write::SimpleFileOptions;

use crate::session::Session;
use crate::speech::markdown_to_plain;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    fingerprint: &'a str,
    language: &'a str,
    summary: &'a str,
    chat_history: Vec<JsonTurn<'a>>,
}

#[derive(Serialize)]
struct JsonTurn<'a> {
    role: &'a str,
    text: &'a str,
}

/// Serialize the session report as pretty-printed JSON.
pub fn to_json(session: &Session) -> Result<String> {
    let report = JsonReport {
        generated_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        fingerprint: session.fingerprint.as_hex(),
        language: session.language.code(),
        summary: &session.summary_display,
        chat_history: session
            .turns
            .iter()
            .map(|turn| JsonTurn {
                role: turn.role.as_str(),
                text: &turn.display,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

const REPORT_TITLE: &str = "Omnidoc Session Report";
const SUMMARY_HEADING: &str = "Summary";
const CHAT_HEADING: &str = "Chat History";

/// Build the DOCX report bytes.
pub fn to_docx(session: &Session) -> Result<Vec<u8>> {
    let document_xml = build_document_xml(session);

    let mut buf = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = SimpleFileOptions::default();

        writer.start_file("[Content_Types].xml", options)?;
        writer.write_all(CONTENT_TYPES_XML.as_bytes())?;

        writer.start_file("_rels/.rels", options)?;
        writer.write_all(RELS_XML.as_bytes())?;

        writer.start_file("word/document.xml", options)?;
        writer.write_all(document_xml.as_bytes())?;

        writer.finish()?;
    }
    Ok(buf)
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

fn build_document_xml(session: &Session) -> String {
    let mut body = String::new();

    push_styled_paragraph(&mut body, REPORT_TITLE, 36, true);
    push_styled_paragraph(&mut body, SUMMARY_HEADING, 28, true);
    // Word paragraphs hold plain runs, so the Markdown is flattened first.
    for line in markdown_to_plain(&session.summary_display)
        .split('\n')
        .filter(|l| !l.trim().is_empty())
    {
        push_plain_paragraph(&mut body, line);
    }
    push_plain_paragraph(&mut body, "");

    push_styled_paragraph(&mut body, CHAT_HEADING, 28, true);
    for turn in &session.turns {
        let role = capitalize(turn.role.as_str());
        push_role_paragraph(&mut body, &format!("{}:", role), &turn.display);
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    )
}

fn push_styled_paragraph(body: &mut String, text: &str, half_points: u32, bold: bool) {
    let bold_tag = if bold { "<w:b/>" } else { "" };
    body.push_str(&format!(
        "<w:p><w:r><w:rPr>{}<w:sz w:val=\"{}\"/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        bold_tag,
        half_points,
        escape(text)
    ));
}

fn push_plain_paragraph(body: &mut String, text: &str) {
    body.push_str(&format!(
        "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        escape(text)
    ));
}

/// One chat turn: bold role label run followed by the content paragraph.
fn push_role_paragraph(body: &mut String, label: &str, content: &str) {
    body.push_str(&format!(
        "<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        escape(label)
    ));
    push_plain_paragraph(body, &markdown_to_plain(content));
    push_plain_paragraph(body, "");
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
