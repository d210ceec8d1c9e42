//! Recursive text chunking
//!
//! Splits documents on the coarsest boundary that fits (paragraph, line,
//! sentence, word) and merges the pieces back into chunks of at most
//! `chunk_size` graphemes, carrying up to `chunk_overlap` graphemes of
//! trailing context into the next chunk. Sizes are counted in grapheme
//! clusters so Devanagari and other Indic scripts are not over-counted.
//!
//! # Usage
//!
//! ```ignore
//! use agrosaathi_rag::chunker::TextChunker;
//!
//! let chunker = TextChunker::new(1000, 200);
//! let chunks = chunker.chunk("Long document text...");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use unicode_segmentation::UnicodeSegmentation;

/// Boundaries tried in order, coarsest first
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " "];

/// A single chunk of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text content
    pub text: String,
    /// Index of this chunk in the original document
    pub index: usize,
}

/// Recursive character chunker
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

fn grapheme_len(s: &str) -> usize {
    s.graphemes(true).count()
}

impl TextChunker {
    /// Create a chunker; overlap is clamped below the chunk size
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split text into chunks
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        self.split_recursive(text, SEPARATORS)
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(index, text)| Chunk { text, index })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if grapheme_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some(pos) = separators.iter().position(|sep| text.contains(sep)) else {
            return self.hard_split(text);
        };
        let separator = separators[pos];
        let finer = &separators[pos + 1..];

        let mut pieces = Vec::new();
        for piece in text.split_inclusive(separator) {
            if grapheme_len(piece) > self.chunk_size {
                pieces.extend(self.split_recursive(piece, finer));
            } else {
                pieces.push(piece.to_string());
            }
        }

        self.merge(pieces)
    }

    /// Greedily pack pieces into chunks, keeping a tail for overlap
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(String, usize)> = VecDeque::new();
        let mut window_len = 0;

        for piece in pieces {
            let len = grapheme_len(&piece);

            if window_len + len > self.chunk_size && !window.is_empty() {
                chunks.push(window.iter().map(|(s, _)| s.as_str()).collect::<String>());

                while window_len > self.chunk_overlap
                    || (window_len + len > self.chunk_size && window_len > 0)
                {
                    match window.pop_front() {
                        Some((_, l)) => window_len -= l,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            window_len += len;
        }

        if !window.is_empty() {
            chunks.push(window.iter().map(|(s, _)| s.as_str()).collect::<String>());
        }
        chunks
    }

    /// Fixed-width split for text with no usable boundary
    fn hard_split(&self, text: &str) -> Vec<String> {
        let graphemes: Vec<&str> = text.graphemes(true).collect();
        let step = (self.chunk_size - self.chunk_overlap).max(1);

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < graphemes.len() {
            let end = (start + self.chunk_size).min(graphemes.len());
            chunks.push(graphemes[start..end].concat());
            if end == graphemes.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}
