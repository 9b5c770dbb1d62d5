//! Multi-format text extraction.
//!
//! Converts a heterogeneous [`SourceItem`] (PDF, DOCX, image, web page, or
//! video URL) into plain-text [`TextUnit`]s tagged with provenance. Every
//! per-source failure degrades to a sentinel unit carrying a human-readable
//! explanation instead of aborting the batch; the only error that escapes
//! is an unsupported media type, which the caller reports as a warning.
//!
//! OCR delegates to the `tesseract` binary; transcripts come from the
//! YouTube timedtext endpoint; web pages are fetched and stripped of
//! non-content markup.

use std::io::Read;
use std::time::Duration;

use quick_xml::events::Event;
use scraper::{ElementRef, Html, Selector};
use uuid::Uuid;

use crate::models::{MediaType, SourceItem, TextUnit};

/// Maximum decompressed bytes to read from a single ZIP entry.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Timeout for transcript and web-page fetches.
const FETCH_TIMEOUT_SECS: u64 = 30;

const TRANSCRIPT_ENDPOINT: &str = "https://video.google.com/timedtext";

pub const NO_TRANSCRIPT_SENTINEL: &str = "(No transcript available for this video.)";
pub const EMPTY_PDF_SENTINEL: &str = "(Empty or scanned PDF, no text found.)";

/// Extraction error. Most variants are absorbed into sentinel units by
/// [`extract`]; only `UnsupportedMediaType` propagates.
#[derive(Debug)]
pub enum ExtractError {
    UnsupportedMediaType(String),
    Pdf(String),
    Ooxml(String),
    Ocr(String),
    Http(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::UnsupportedMediaType(name) => {
                write!(f, "unsupported file type: {}", name)
            }
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Ooxml(e) => write!(f, "DOCX extraction failed: {}", e),
            ExtractError::Ocr(e) => write!(f, "OCR failed: {}", e),
            ExtractError::Http(e) => write!(f, "fetch failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extract plain-text units from one source.
///
/// Returns at least one unit for every supported source; degraded
/// extractions yield sentinel units so downstream chunking never operates
/// on zero units silently.
pub async fn extract(item: &SourceItem) -> Result<Vec<TextUnit>, ExtractError> {
    let label = item.label().to_string();

    let text = match item {
        SourceItem::File { name, bytes } => {
            let media_type = MediaType::from_name(name)
                .ok_or_else(|| ExtractError::UnsupportedMediaType(name.clone()))?;
            match media_type {
                MediaType::Pdf => match extract_pdf(bytes) {
                    Ok(text) if text.trim().is_empty() => EMPTY_PDF_SENTINEL.to_string(),
                    Ok(text) => text,
                    Err(e) => format!("(Error reading PDF: {})", e),
                },
                MediaType::Docx => match extract_docx(bytes) {
                    Ok(text) if text.trim().is_empty() => {
                        "(Empty DOCX, no paragraph text found.)".to_string()
                    }
                    Ok(text) => text,
                    Err(e) => format!("(Error reading DOCX: {})", e),
                },
                MediaType::Png | MediaType::Jpeg => match run_ocr(bytes, media_type).await {
                    Ok(text) => text,
                    Err(e) => format!("(Error reading image: {})", e),
                },
            }
        }
        SourceItem::Url { url } => {
            if is_video_url(url) {
                load_transcript(url).await
            } else {
                match load_web(url).await {
                    Ok(text) => text,
                    Err(e) => format!("Error loading web page: {}", e),
                }
            }
        }
    };

    Ok(vec![TextUnit::new(label, text)])
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Pull `word/document.xml` out of the DOCX package and stream its `<w:t>`
/// runs, inserting a newline at each paragraph end.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;

    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Ooxml("word/document.xml not found".to_string()))?;
    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Ooxml(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }

    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(doc_xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(Event::Text(te)) = reader.read_event_into(&mut buf) {
                        out.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"p" && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(out.trim_end().to_string())
}

/// Run the `tesseract` binary over the image bytes via a scoped temp file.
///
/// The temp file is removed before the result is inspected.
async fn run_ocr(bytes: &[u8], media_type: MediaType) -> Result<String, ExtractError> {
    let ext = match media_type {
        MediaType::Png => "png",
        _ => "jpg",
    };
    let path = std::env::temp_dir().join(format!(
        "omnidoc_ocr_{}_{}.{}",
        std::process::id(),
        Uuid::new_v4(),
        ext
    ));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ExtractError::Ocr(e.to_string()))?;

    let output = tokio::process::Command::new("tesseract")
        .arg(&path)
        .arg("stdout")
        .output()
        .await;

    let _ = tokio::fs::remove_file(&path).await;

    let output = output.map_err(|e| ExtractError::Ocr(format!("failed to run tesseract: {}", e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractError::Ocr(format!(
            "tesseract returned non-zero exit status: {}",
            stderr.trim()
        )));
    }

    let text = String::from_utf8_lossy(&output.stdout)
        .replace('\u{0000}', "")
        .trim()
        .to_string();
    if text.is_empty() {
        return Err(ExtractError::Ocr(
            "OCR found no readable text in the image".to_string(),
        ));
    }
    Ok(text)
}

/// Whether a URL should be treated as a video link.
pub fn is_video_url(url: &str) -> bool {
    url.contains("youtube.com/watch?v=") || url.contains("youtu.be/")
}

/// Parse the video id from a watch URL (`v=` query) or short link
/// (`youtu.be/` path segment).
pub fn parse_video_id(url: &str) -> Option<String> {
    let after = if let Some(pos) = url.find("v=") {
        &url[pos + 2..]
    } else if let Some(pos) = url.find("youtu.be/") {
        &url[pos + "youtu.be/".len()..]
    } else {
        return None;
    };
    let id: String = after
        .chars()
        .take_while(|c| !matches!(c, '&' | '#' | '?' | '/'))
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Fetch the transcript for a video URL, degrading to sentinel text on any
/// failure including the no-transcript condition.
async fn load_transcript(url: &str) -> String {
    let Some(video_id) = parse_video_id(url) else {
        return format!("(Error fetching transcript: no video id found in {})", url);
    };

    match fetch_transcript_xml(&video_id).await {
        Ok(xml) if xml.trim().is_empty() => NO_TRANSCRIPT_SENTINEL.to_string(),
        Ok(xml) => match parse_transcript_xml(&xml) {
            Ok(text) if text.trim().is_empty() => NO_TRANSCRIPT_SENTINEL.to_string(),
            Ok(text) => text,
            Err(e) => format!("(Error fetching transcript: {})", e),
        },
        Err(e) => format!("(Error fetching transcript: {})", e),
    }
}

async fn fetch_transcript_xml(video_id: &str) -> Result<String, ExtractError> {
    let client = http_client()?;
    let response = client
        .get(TRANSCRIPT_ENDPOINT)
        .query(&[("lang", "en"), ("v", video_id)])
        .send()
        .await
        .map_err(|e| ExtractError::Http(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ExtractError::Http(format!(
            "transcript endpoint returned {}",
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| ExtractError::Http(e.to_string()))
}

/// Extract caption lines from timedtext XML (`<text start=... dur=...>`).
pub fn parse_transcript_xml(xml: &str) -> Result<String, ExtractError> {
    let mut lines = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut in_text = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"text" => in_text = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"text" => in_text = false,
            Ok(Event::Text(te)) if in_text => {
                let line = te.unescape().unwrap_or_default().trim().to_string();
                if !line.is_empty() {
                    lines.push(line);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Http(e.to_string())),
            _ => {}
        }
    }
    Ok(lines.join("\n"))
}

/// Fetch a web page and return its visible text.
async fn load_web(url: &str) -> Result<String, ExtractError> {
    let client = http_client()?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ExtractError::Http(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ExtractError::Http(format!(
            "server returned {}",
            response.status()
        )));
    }

    let html = response
        .text()
        .await
        .map_err(|e| ExtractError::Http(e.to_string()))?;
    Ok(strip_html(&html))
}

/// Strip non-content markup and return the remaining visible text.
///
/// Skips `script`, `style`, `nav`, `footer`, `aside`, `noscript`, `iframe`,
/// `svg`, and `head` subtrees.
pub fn strip_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();

    let body_selector = Selector::parse("body").expect("static selector");
    if let Some(body) = document.select(&body_selector).next() {
        collect_visible_text(body, &mut parts);
    } else if let Some(root) = document
        .select(&Selector::parse("html").expect("static selector"))
        .next()
    {
        collect_visible_text(root, &mut parts);
    }

    parts.join("\n")
}

fn collect_visible_text(element: ElementRef, parts: &mut Vec<String>) {
    use scraper::node::Node;

    if matches!(
        element.value().name(),
        "script" | "style" | "nav" | "footer" | "aside" | "noscript" | "iframe" | "svg" | "head"
    ) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_visible_text(child_element, parts);
                }
            }
            _ => {}
        }
    }
}

fn http_client() -> Result<reqwest::Client, ExtractError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| ExtractError::Http(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_item(name: &str, bytes: &[u8]) -> SourceItem {
        SourceItem::File {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn unsupported_media_type_propagates() {
        let err = extract(&file_item("data.bin", b"whatever")).await.unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedMediaType(_)));
    }

    #[tokio::test]
    async fn invalid_pdf_degrades_to_sentinel() {
        let units = extract(&file_item("broken.pdf", b"not a pdf")).await.unwrap();
        assert_eq!(units.len(), 1);
        assert!(units[0].text.contains("Error reading PDF"));
        assert_eq!(units[0].source, "broken.pdf");
    }

    #[tokio::test]
    async fn invalid_zip_degrades_to_sentinel_for_docx() {
        let units = extract(&file_item("broken.docx", b"not a zip")).await.unwrap();
        assert_eq!(units.len(), 1);
        assert!(units[0].text.contains("Error reading DOCX"));
    }

    #[test]
    fn docx_paragraph_text_is_concatenated() {
        use std::io::Write;
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            writer
                .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            let xml = "<?xml version=\"1.0\"?>\
                <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
                <w:body>\
                <w:p><w:r><w:t>first paragraph</w:t></w:r></w:p>\
                <w:p><w:r><w:t>second paragraph</w:t></w:r></w:p>\
                </w:body></w:document>";
            writer.write_all(xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }

        let text = extract_docx(&buf).unwrap();
        assert_eq!(text, "first paragraph\nsecond paragraph");
    }

    #[test]
    fn video_url_detection() {
        assert!(is_video_url("https://www.youtube.com/watch?v=abc123"));
        assert!(is_video_url("https://youtu.be/abc123"));
        assert!(!is_video_url("https://example.com/watch"));
    }

    #[test]
    fn video_id_from_watch_url() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn video_id_from_short_link() {
        assert_eq!(
            parse_video_id("https://youtu.be/dQw4w9WgXcQ?si=xyz"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn video_id_missing() {
        assert_eq!(parse_video_id("https://example.com/page"), None);
    }

    #[test]
    fn transcript_xml_lines_joined() {
        let xml = r#"<?xml version="1.0"?><transcript>
            <text start="0" dur="2">hello there</text>
            <text start="2" dur="3">general &amp; specific</text>
        </transcript>"#;
        let text = parse_transcript_xml(xml).unwrap();
        assert_eq!(text, "hello there\ngeneral & specific");
    }

    #[test]
    fn strip_html_drops_non_content_markup() {
        let html = r#"<html><head><title>t</title></head><body>
            <nav>menu items</nav>
            <script>var x = 1;</script>
            <style>.a { color: red }</style>
            <p>Visible paragraph.</p>
            <aside>sidebar junk</aside>
            <footer>footer junk</footer>
        </body></html>"#;
        let text = strip_html(html);
        assert!(text.contains("Visible paragraph."));
        assert!(!text.contains("menu items"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("sidebar junk"));
        assert!(!text.contains("footer junk"));
    }
}
