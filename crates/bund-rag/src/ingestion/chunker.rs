//! Text chunking with character-exact overlap and boundary preference

use crate::error::{Error, Result};
use crate::types::{Chunk, TextSegment};

/// Text chunker with configurable size and overlap
///
/// Sizes are counted in `char`s. Consecutive chunks share exactly `overlap`
/// characters, and cut points prefer a blank line, then a sentence end, then
/// any whitespace, falling back to a hard cut at `chunk_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::chunk("chunk_size must be greater than zero"));
        }
        if overlap >= chunk_size {
            return Err(Error::chunk(format!(
                "overlap ({}) must be less than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Lazily split `text` into spans
    ///
    /// The returned iterator is `Clone`, so it can be restarted from any point.
    pub fn split<'a>(&self, text: &'a str) -> Result<TextSpans<'a>> {
        if text.is_empty() {
            return Err(Error::chunk("cannot chunk empty text"));
        }

        let mut chars = Vec::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for (offset, c) in text.char_indices() {
            offsets.push(offset);
            chars.push(c);
        }
        offsets.push(text.len());

        Ok(TextSpans {
            text,
            chars,
            offsets,
            chunk_size: self.chunk_size,
            overlap: self.overlap,
            start: 0,
            finished: false,
        })
    }

    /// Chunk one segment, numbering chunks from `first_index`
    pub fn chunk_segment(&self, segment: &TextSegment, first_index: u32) -> Result<Vec<Chunk>> {
        let chunks = self
            .split(&segment.text)?
            .enumerate()
            .map(|(i, span)| {
                Chunk::new(
                    span.text.to_string(),
                    segment.source.clone(),
                    first_index + i as u32,
                    span.char_start,
                    span.char_end,
                )
            })
            .collect();

        Ok(chunks)
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            overlap: 50,
        }
    }
}

/// One chunk's text and its character span in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan<'a> {
    pub text: &'a str,
    pub char_start: usize,
    pub char_end: usize,
}

/// Lazy chunk sequence produced by [`TextChunker::split`]
#[derive(Debug, Clone)]
pub struct TextSpans<'a> {
    text: &'a str,
    chars: Vec<char>,
    /// Byte offset of every char, plus `text.len()`
    offsets: Vec<usize>,
    chunk_size: usize,
    overlap: usize,
    start: usize,
    finished: bool,
}

impl<'a> TextSpans<'a> {
    /// End (exclusive) of the chunk starting at `start`
    ///
    /// Only positions in the back half of the window are considered, and
    /// never at or before `start + overlap`, so every step makes progress.
    fn cut_point(&self, start: usize) -> usize {
        let hi = start + self.chunk_size;
        let lo = start + self.overlap.max(self.chunk_size / 2);
        let window = || (lo + 1..=hi).rev();

        let is_paragraph = |e: usize| e >= start + 2 && self.chars[e - 1] == '\n' && self.chars[e - 2] == '\n';
        let is_sentence = |e: usize| {
            e >= start + 2
                && self.chars[e - 1].is_whitespace()
                && matches!(self.chars[e - 2], '.' | '!' | '?')
        };
        let is_word = |e: usize| self.chars[e - 1].is_whitespace();

        window()
            .find(|&e| is_paragraph(e))
            .or_else(|| window().find(|&e| is_sentence(e)))
            .or_else(|| window().find(|&e| is_word(e)))
            .unwrap_or(hi)
    }
}

impl<'a> Iterator for TextSpans<'a> {
    type Item = TextSpan<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.chars.len();
        if self.finished || self.start >= total {
            return None;
        }

        let start = self.start;
        let end = if total - start <= self.chunk_size {
            self.finished = true;
            total
        } else {
            let end = self.cut_point(start);
            self.start = end - self.overlap;
            end
        };

        Some(TextSpan {
            text: &self.text[self.offsets[start]..self.offsets[end]],
            char_start: start,
            char_end: end,
        })
    }
}
