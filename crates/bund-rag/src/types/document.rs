//! Document, segment and chunk types with source tracking

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Loadable document formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// JSON payload, stored verbatim as one record
    Json,
    /// PDF document, one segment per page
    Pdf,
    /// HTML page
    Html,
    /// Microsoft Word document
    Word,
    /// Markdown file
    Markdown,
    /// Plain text file
    Text,
}

impl DocumentFormat {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Pdf => "PDF",
            Self::Html => "HTML",
            Self::Word => "Word Document",
            Self::Markdown => "Markdown",
            Self::Text => "Text File",
        }
    }

    /// Short tag used in vector payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Word => "word",
            Self::Markdown => "markdown",
            Self::Text => "text",
        }
    }

    /// Parse the short tag written by [`DocumentFormat::as_str`]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(Self::Json),
            "pdf" => Some(Self::Pdf),
            "html" => Some(Self::Html),
            "word" => Some(Self::Word),
            "markdown" => Some(Self::Markdown),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// A file as received from the upload endpoint
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as sent by the client
    pub filename: String,
    /// Raw bytes
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// A document accepted for ingestion
#[derive(Debug, Clone)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Original filename
    pub filename: String,
    /// Format resolved from the extension
    pub format: DocumentFormat,
    /// Raw payload
    pub data: Vec<u8>,
    /// SHA-256 of the payload (hex)
    pub content_hash: String,
    /// Upload timestamp
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document from an uploaded payload
    pub fn new(filename: String, format: DocumentFormat, data: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content_hash: hash_bytes(&data),
            filename,
            format,
            data,
            uploaded_at: chrono::Utc::now(),
        }
    }

    /// File size in bytes
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Provenance of a segment or chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentSource {
    /// Source document ID
    pub document_id: Uuid,
    /// Original filename
    pub filename: String,
    /// Document format
    pub format: DocumentFormat,
    /// Page number (1-indexed, PDFs only)
    pub page_number: Option<u32>,
    /// Heading the segment belongs to (sectioned Markdown)
    pub section_title: Option<String>,
}

impl SegmentSource {
    /// Source info for a whole document
    pub fn document(doc: &Document) -> Self {
        Self {
            document_id: doc.id,
            filename: doc.filename.clone(),
            format: doc.format,
            page_number: None,
            section_title: None,
        }
    }

    /// Source info for one page of a document
    pub fn page(doc: &Document, page_number: u32) -> Self {
        Self {
            page_number: Some(page_number),
            ..Self::document(doc)
        }
    }

    /// Source info for a titled section of a document
    pub fn section(doc: &Document, title: Option<String>) -> Self {
        Self {
            section_title: title,
            ..Self::document(doc)
        }
    }

    /// Format source for display
    pub fn format_reference(&self) -> String {
        let mut parts = vec![self.filename.clone()];

        if let Some(page) = self.page_number {
            parts.push(format!("Page {}", page));
        }

        if let Some(section) = &self.section_title {
            parts.push(format!("Section: {}", section));
        }

        parts.join(", ")
    }
}

/// Loader output unit: text plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    /// Extracted text
    pub text: String,
    /// Provenance
    pub source: SegmentSource,
    /// Position of the segment within its document
    pub segment_index: u32,
}

/// A chunk of text from a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique chunk ID (also the vector point ID)
    pub id: Uuid,
    /// Text content
    pub content: String,
    /// Source information
    pub source: SegmentSource,
    /// Chunk index within the document
    pub chunk_index: u32,
    /// Character span within the source segment
    pub char_start: usize,
    pub char_end: usize,
    /// Embedding vector, empty until embedded
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Create a new chunk without embedding
    pub fn new(
        content: String,
        source: SegmentSource,
        chunk_index: u32,
        char_start: usize,
        char_end: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            source,
            chunk_index,
            char_start,
            char_end,
            embedding: Vec::new(),
        }
    }

    /// Convert to vector payload for storage
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("page_content".to_string(), json!(self.content));
        payload.insert("document_id".to_string(), json!(self.source.document_id.to_string()));
        payload.insert("filename".to_string(), json!(self.source.filename));
        payload.insert("format".to_string(), json!(self.source.format.as_str()));
        payload.insert("chunk_index".to_string(), json!(self.chunk_index));
        payload.insert("char_start".to_string(), json!(self.char_start));
        payload.insert("char_end".to_string(), json!(self.char_end));

        if let Some(page) = self.source.page_number {
            payload.insert("page_number".to_string(), json!(page));
        }

        if let Some(section) = &self.source.section_title {
            payload.insert("section_title".to_string(), json!(section));
        }

        payload
    }

    /// Rebuild a chunk from a stored payload (embedding is not restored)
    pub fn from_payload(id: Uuid, payload: &Map<String, Value>) -> Self {
        let text = |key: &str| payload.get(key).and_then(|v| v.as_str());
        let number = |key: &str| payload.get(key).and_then(|v| v.as_u64());

        let source = SegmentSource {
            document_id: text("document_id")
                .and_then(|s| Uuid::parse_str(s).ok())
                .unwrap_or_else(Uuid::nil),
            filename: text("filename").unwrap_or("unknown").to_string(),
            format: text("format")
                .and_then(DocumentFormat::from_tag)
                .unwrap_or(DocumentFormat::Text),
            page_number: number("page_number").map(|p| p as u32),
            section_title: text("section_title").map(str::to_string),
        };

        Self {
            id,
            content: text("page_content").unwrap_or("").to_string(),
            source,
            chunk_index: number("chunk_index").unwrap_or(0) as u32,
            char_start: number("char_start").unwrap_or(0) as usize,
            char_end: number("char_end").unwrap_or(0) as usize,
            embedding: Vec::new(),
        }
    }
}

/// Hash a payload for provenance logging
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_keeps_source() {
        let doc = Document::new("manual.pdf".to_string(), DocumentFormat::Pdf, b"%PDF".to_vec());
        let chunk = Chunk::new("page text".to_string(), SegmentSource::page(&doc, 3), 7, 0, 9);

        let restored = Chunk::from_payload(chunk.id, &chunk.to_payload());

        assert_eq!(restored.content, "page text");
        assert_eq!(restored.source, chunk.source);
        assert_eq!(restored.chunk_index, 7);
        assert_eq!(restored.char_end, 9);
    }

    #[test]
    fn test_document_hash_is_stable() {
        let a = Document::new("a.txt".to_string(), DocumentFormat::Text, b"same".to_vec());
        let b = Document::new("b.txt".to_string(), DocumentFormat::Text, b"same".to_vec());
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.id, b.id);
    }
}
