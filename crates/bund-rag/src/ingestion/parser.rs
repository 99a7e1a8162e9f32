//! Format-specific document loaders

use pulldown_cmark::{Event, Parser as MarkdownParser, Tag, TagEnd};

use crate::error::{Error, Result};
use crate::types::{Document, DocumentFormat, SegmentSource, TextSegment};

/// Turns a document's bytes into text segments
pub trait DocumentLoader: Send + Sync {
    /// Format this loader handles
    fn format(&self) -> DocumentFormat;

    /// Extract segments; empty segments are dropped
    fn load(&self, doc: &Document) -> Result<Vec<TextSegment>>;
}

/// Resolve the loader for a format
pub fn loader_for(format: DocumentFormat) -> &'static dyn DocumentLoader {
    match format {
        DocumentFormat::Json => &JsonLoader,
        DocumentFormat::Pdf => &PdfLoader,
        DocumentFormat::Html => &HtmlLoader,
        DocumentFormat::Word => &WordLoader,
        DocumentFormat::Markdown => &MarkdownLoader,
        DocumentFormat::Text => &TextLoader,
    }
}

/// Number the non-empty parts in order
fn into_segments(parts: Vec<(String, SegmentSource)>) -> Vec<TextSegment> {
    parts
        .into_iter()
        .map(|(text, source)| (text.trim().to_string(), source))
        .filter(|(text, _)| !text.is_empty())
        .enumerate()
        .map(|(i, (text, source))| TextSegment {
            text,
            source,
            segment_index: i as u32,
        })
        .collect()
}

/// Run a third-party extractor, turning a panic inside it into a load error for this file
fn contain_panic<T>(filename: &str, extract: impl FnOnce() -> T) -> Result<T> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(extract)).map_err(|panic| {
        let reason = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!("Extractor panicked on {}: {}", filename, reason);
        Error::load(filename, format!("Extractor panicked: {}", reason))
    })
}

/// Whole JSON value as a single record
pub struct JsonLoader;

impl DocumentLoader for JsonLoader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Json
    }

    fn load(&self, doc: &Document) -> Result<Vec<TextSegment>> {
        let value: serde_json::Value = serde_json::from_slice(&doc.data)
            .map_err(|e| Error::load(&doc.filename, format!("Invalid JSON: {}", e)))?;

        let text = serde_json::to_string(&value)?;
        Ok(into_segments(vec![(text, SegmentSource::document(doc))]))
    }
}

/// One segment per PDF page
pub struct PdfLoader;

impl PdfLoader {
    /// Clean up extracted page text (null chars, blank lines, stray whitespace)
    fn cleanup(text: &str) -> String {
        text.replace('\0', "")
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DocumentLoader for PdfLoader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn load(&self, doc: &Document) -> Result<Vec<TextSegment>> {
        let pdf = lopdf::Document::load_mem(&doc.data)
            .map_err(|e| Error::load(&doc.filename, format!("Failed to load PDF: {}", e)))?;

        let mut parts = Vec::new();
        for page_number in pdf.get_pages().keys() {
            match pdf.extract_text(&[*page_number]) {
                Ok(text) => parts.push((Self::cleanup(&text), SegmentSource::page(doc, *page_number))),
                Err(e) => tracing::debug!("Could not extract page {} of {}: {}", page_number, doc.filename, e),
            }
        }

        let segments = into_segments(parts);
        if !segments.is_empty() {
            return Ok(segments);
        }

        // Per-page extraction found nothing, try the whole document at once
        tracing::warn!("Page extraction produced no text for {}, trying fallback", doc.filename);
        let text = contain_panic(&doc.filename, || pdf_extract::extract_text_from_mem(&doc.data))?
            .map_err(|e| Error::load(&doc.filename, format!("Failed to extract PDF text: {}", e)))?;

        Ok(into_segments(vec![(Self::cleanup(&text), SegmentSource::document(doc))]))
    }
}

/// Visible body text of an HTML page
pub struct HtmlLoader;

impl DocumentLoader for HtmlLoader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Html
    }

    fn load(&self, doc: &Document) -> Result<Vec<TextSegment>> {
        let html = String::from_utf8_lossy(&doc.data);
        let document = scraper::Html::parse_document(&html);

        let body_selector = scraper::Selector::parse("body")
            .map_err(|e| Error::internal(format!("Invalid selector: {:?}", e)))?;

        let mut content = String::new();
        if let Some(body) = document.select(&body_selector).next() {
            for node in body.descendants() {
                let Some(text) = node.value().as_text() else {
                    continue;
                };

                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript" | "template"))
                });
                if hidden {
                    continue;
                }

                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    if !content.is_empty() {
                        content.push(' ');
                    }
                    content.push_str(trimmed);
                }
            }
        }

        Ok(into_segments(vec![(content, SegmentSource::document(doc))]))
    }
}

/// Word document text, paragraphs separated by blank lines
pub struct WordLoader;

impl WordLoader {
    fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
        let mut text = String::new();
        for child in &paragraph.children {
            match child {
                docx_rs::ParagraphChild::Run(run) => Self::run_text(run, &mut text),
                docx_rs::ParagraphChild::Hyperlink(link) => {
                    for child in &link.children {
                        if let docx_rs::ParagraphChild::Run(run) = child {
                            Self::run_text(run, &mut text);
                        }
                    }
                }
                _ => {}
            }
        }
        text
    }

    fn run_text(run: &docx_rs::Run, out: &mut String) {
        for child in &run.children {
            match child {
                docx_rs::RunChild::Text(t) => out.push_str(&t.text),
                docx_rs::RunChild::Tab(_) => out.push('\t'),
                docx_rs::RunChild::Break(_) => out.push('\n'),
                _ => {}
            }
        }
    }

    #[allow(irrefutable_let_patterns)]
    fn table_text(table: &docx_rs::Table, blocks: &mut Vec<String>) {
        for row in &table.rows {
            let docx_rs::TableChild::TableRow(row) = row else {
                continue;
            };
            let mut cells = Vec::new();
            for cell in &row.cells {
                let docx_rs::TableRowChild::TableCell(cell) = cell else {
                    continue;
                };
                let mut cell_text = Vec::new();
                for content in &cell.children {
                    if let docx_rs::TableCellContent::Paragraph(p) = content {
                        let text = Self::paragraph_text(p);
                        if !text.trim().is_empty() {
                            cell_text.push(text.trim().to_string());
                        }
                    }
                }
                cells.push(cell_text.join(" "));
            }
            if cells.iter().any(|c| !c.is_empty()) {
                blocks.push(cells.join(" | "));
            }
        }
    }
}

impl DocumentLoader for WordLoader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Word
    }

    fn load(&self, doc: &Document) -> Result<Vec<TextSegment>> {
        let docx = docx_rs::read_docx(&doc.data)
            .map_err(|e| Error::load(&doc.filename, format!("Failed to read Word document: {}", e)))?;

        let mut blocks = Vec::new();
        for child in &docx.document.children {
            match child {
                docx_rs::DocumentChild::Paragraph(p) => {
                    let text = Self::paragraph_text(p);
                    if !text.trim().is_empty() {
                        blocks.push(text.trim().to_string());
                    }
                }
                docx_rs::DocumentChild::Table(table) => Self::table_text(table, &mut blocks),
                _ => {}
            }
        }

        Ok(into_segments(vec![(blocks.join("\n\n"), SegmentSource::document(doc))]))
    }
}

/// Markdown rendered to plain text, one segment per heading section
pub struct MarkdownLoader;

impl MarkdownLoader {
    /// Split rendered text into `(title, body)` sections
    fn sections(source: &str) -> Vec<(Option<String>, String)> {
        let mut sections = Vec::new();
        let mut title: Option<String> = None;
        let mut body = String::new();
        let mut heading: Option<String> = None;

        for event in MarkdownParser::new(source) {
            match event {
                Event::Start(Tag::Heading { .. }) => {
                    if title.is_some() || !body.trim().is_empty() {
                        sections.push((title.take(), std::mem::take(&mut body)));
                    }
                    body.clear();
                    heading = Some(String::new());
                }
                Event::End(TagEnd::Heading(_)) => {
                    title = heading.take().map(|h| h.trim().to_string());
                }
                Event::Text(text) | Event::Code(text) => match heading.as_mut() {
                    Some(h) => h.push_str(&text),
                    None => body.push_str(&text),
                },
                Event::SoftBreak => match heading.as_mut() {
                    Some(h) => h.push(' '),
                    None => body.push(' '),
                },
                Event::HardBreak => body.push('\n'),
                Event::End(TagEnd::Paragraph)
                | Event::End(TagEnd::CodeBlock)
                | Event::End(TagEnd::Item)
                | Event::End(TagEnd::TableRow)
                | Event::End(TagEnd::TableHead) => body.push_str("\n\n"),
                Event::End(TagEnd::TableCell) => body.push(' '),
                _ => {}
            }
        }

        if title.is_some() || !body.trim().is_empty() {
            sections.push((title, body));
        }
        sections
    }
}

impl DocumentLoader for MarkdownLoader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Markdown
    }

    fn load(&self, doc: &Document) -> Result<Vec<TextSegment>> {
        let source = String::from_utf8_lossy(&doc.data);

        let parts = Self::sections(&source)
            .into_iter()
            .map(|(title, body)| {
                let body = body.trim();
                let text = match &title {
                    Some(t) if body.is_empty() => t.clone(),
                    Some(t) => format!("{}\n\n{}", t, body),
                    None => body.to_string(),
                };
                (text, SegmentSource::section(doc, title))
            })
            .collect();

        Ok(into_segments(parts))
    }
}

/// Plain text, verbatim
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Text
    }

    fn load(&self, doc: &Document) -> Result<Vec<TextSegment>> {
        let text = String::from_utf8_lossy(&doc.data).to_string();
        Ok(into_segments(vec![(text, SegmentSource::document(doc))]))
    }
}
