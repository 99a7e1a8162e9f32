//! Response and retrieval result types

use serde::{Deserialize, Serialize};

use super::document::{Chunk, SegmentSource};

/// A retrieved chunk text with its similarity score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredContext {
    /// Chunk text
    pub content: String,
    /// Similarity score (higher is more similar)
    pub score: f32,
    /// Where the chunk came from
    pub source: SegmentSource,
}

impl ScoredContext {
    /// Create a context entry from a stored chunk
    pub fn from_chunk(chunk: Chunk, score: f32) -> Self {
        Self {
            content: chunk.content,
            score,
            source: chunk.source,
        }
    }
}

/// Ranked contexts for one query, highest similarity first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievedContext {
    entries: Vec<ScoredContext>,
}

impl RetrievedContext {
    /// Rank the given entries by descending score and keep at most `k`
    pub fn ranked(mut entries: Vec<ScoredContext>, k: usize) -> Self {
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        entries.truncate(k);
        Self { entries }
    }

    /// Empty context
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ScoredContext] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best match, if any
    pub fn top(&self) -> Option<&ScoredContext> {
        self.entries.first()
    }

    /// Context texts joined for prompting
    pub fn joined_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Generated answer together with the contexts that conditioned it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Raw model output
    pub text: String,
    /// Contexts placed in the prompt
    pub contexts: RetrievedContext,
}

/// Body of `POST /upload` responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
}

/// Body of `POST /rag` responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    pub response: String,
}

/// Body of `POST /clear` responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentFormat;
    use uuid::Uuid;

    fn context(content: &str, score: f32) -> ScoredContext {
        ScoredContext {
            content: content.to_string(),
            score,
            source: SegmentSource {
                document_id: Uuid::nil(),
                filename: "notes.md".to_string(),
                format: DocumentFormat::Markdown,
                page_number: None,
                section_title: None,
            },
        }
    }

    #[test]
    fn test_ranked_sorts_and_bounds() {
        let ranked = RetrievedContext::ranked(
            vec![context("low", 0.1), context("high", 0.9), context("mid", 0.5)],
            2,
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked.top().unwrap().content, "high");
        assert_eq!(ranked.entries()[1].content, "mid");
    }

    #[test]
    fn test_joined_text() {
        let ranked = RetrievedContext::ranked(vec![context("a", 0.9), context("b", 0.2)], 20);
        assert_eq!(ranked.joined_text(), "a\n\nb");
        assert_eq!(RetrievedContext::empty().joined_text(), "");
    }
}
