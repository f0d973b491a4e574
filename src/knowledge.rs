//! Knowledge-base loading and chunking.

use std::path::Path;

use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Cannot read knowledge base: {0}")]
    Io(#[from] std::io::Error),

    #[error("Knowledge base produced no usable chunks")]
    Empty,
}

/// Chunks shorter than this carry no retrievable signal and are dropped.
const MIN_CHUNK_LEN: usize = 20;

/// The food-labeling guide, split into overlapping chunks sized for the
/// vector index.
#[derive(Debug)]
pub struct KnowledgeBase {
    chunks: Vec<String>,
}

impl KnowledgeBase {
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let text = std::fs::read_to_string(path)?;
        let kb = Self::from_text(&text, config::CHUNK_SIZE, config::CHUNK_OVERLAP);
        if kb.is_empty() {
            return Err(KnowledgeError::Empty);
        }
        tracing::info!(path = %path.display(), chunks = kb.len(), "knowledge base loaded");
        Ok(kb)
    }

    /// Paragraph-aware chunking: paragraphs accumulate until `chunk_size`,
    /// then the chunk is cut and the next one starts with the last
    /// `overlap` characters of its predecessor.
    pub fn from_text(text: &str, chunk_size: usize, overlap: usize) -> Self {
        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();

        for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            if !current.is_empty() && current.len() + paragraph.len() + 2 > chunk_size {
                let tail = overlap_tail(&current, overlap);
                push_chunk(&mut chunks, std::mem::take(&mut current));
                current = tail;
            }
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);

            // A single paragraph longer than the chunk size is split hard.
            while current.len() > chunk_size {
                let cut = floor_char_boundary(&current, chunk_size);
                let head = current[..cut].to_string();
                let tail_start = floor_char_boundary(&head, cut.saturating_sub(overlap));
                let rest = format!("{}{}", &head[tail_start..], &current[cut..]);
                push_chunk(&mut chunks, head);
                current = rest;
            }
        }
        push_chunk(&mut chunks, current);

        Self { chunks }
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn push_chunk(chunks: &mut Vec<String>, chunk: String) {
    let trimmed = chunk.trim();
    if trimmed.len() >= MIN_CHUNK_LEN {
        chunks.push(trimmed.to_string());
    }
}

fn overlap_tail(chunk: &str, overlap: usize) -> String {
    let start = floor_char_boundary(chunk, chunk.len().saturating_sub(overlap));
    chunk[start..].to_string()
}

// str::floor_char_boundary is unstable; this is the same contract.
fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn short_text_is_one_chunk() {
        let kb = KnowledgeBase::from_text("Added sugars must be declared on the label.", 1000, 200);
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn paragraphs_accumulate_until_chunk_size() {
        let text = format!("{}\n\n{}\n\n{}", "a".repeat(400), "b".repeat(400), "c".repeat(400));
        let kb = KnowledgeBase::from_text(&text, 1000, 100);
        assert!(kb.len() >= 2);
        assert!(kb.chunks().iter().all(|c| c.len() <= 1000));
    }

    #[test]
    fn consecutive_chunks_share_overlap() {
        let text = format!("{}\n\n{}", "x".repeat(900), "y".repeat(900));
        let kb = KnowledgeBase::from_text(&text, 1000, 200);
        assert!(kb.len() >= 2);
        let first = &kb.chunks()[0];
        let tail: String = first.chars().rev().take(50).collect::<String>();
        let tail: String = tail.chars().rev().collect();
        assert!(kb.chunks()[1].contains(&tail));
    }

    #[test]
    fn oversized_paragraph_is_split() {
        let text = "w".repeat(2500);
        let kb = KnowledgeBase::from_text(&text, 1000, 200);
        assert!(kb.len() >= 3);
        assert!(kb.chunks().iter().all(|c| c.len() <= 1000));
    }

    #[test]
    fn tiny_fragments_are_dropped() {
        let kb = KnowledgeBase::from_text("ok\n\nshort", 1000, 200);
        assert!(kb.is_empty());
    }

    #[test]
    fn multibyte_text_does_not_split_characters() {
        let text = "⚠️é".repeat(500);
        let kb = KnowledgeBase::from_text(&text, 100, 20);
        assert!(!kb.is_empty());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Added sugars such as corn syrup must appear in the ingredient statement."
        )
        .unwrap();
        let kb = KnowledgeBase::load(file.path()).unwrap();
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn load_missing_file_errors() {
        let err = KnowledgeBase::load(Path::new("/nonexistent/guide.md")).unwrap_err();
        assert!(matches!(err, KnowledgeError::Io(_)));
    }

    #[test]
    fn load_empty_file_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = KnowledgeBase::load(file.path()).unwrap_err();
        assert!(matches!(err, KnowledgeError::Empty));
    }
}
