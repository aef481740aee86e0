use super::{CHUNK_ID_LEN, ChunkId};
use crate::parser::Section;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Whether a chunk is a whole section or a piece of a split one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    /// An entire section that fit within the size limit
    Main,
    /// Produced by the size-bounded splitter
    Sub,
}

impl ChunkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Main => "main",
            ChunkType::Sub => "sub",
        }
    }
}

/// A finalized chunk of markdown ready for embedding/indexing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Content fingerprint (truncated SHA-256 hex)
    pub id: ChunkId,
    /// Chunk text, including any overlap carried from the previous piece
    pub content: String,
    /// Title of the section this chunk came from
    pub heading: String,
    /// Heading level of that section (0 = before the first heading)
    pub level: u8,
    /// Breadcrumb of heading titles
    pub path: String,
    /// Estimated token count
    pub token_count: usize,
    pub chunk_type: ChunkType,
}

/// A chunk still carrying its source span, before ids are assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Draft {
    pub content: String,
    pub heading: String,
    pub level: u8,
    pub path: String,
    pub token_count: usize,
    pub chunk_type: ChunkType,
    /// Byte offset in the document (start), overlap excluded
    pub start_pos: usize,
    /// Byte offset in the document (end)
    pub end_pos: usize,
}

impl Draft {
    /// A whole section kept as one chunk
    pub fn main(section: &Section<'_>) -> Self {
        Self {
            content: section.content.to_string(),
            heading: section.heading.clone(),
            level: section.level,
            path: section.path.clone(),
            token_count: section.token_count,
            chunk_type: ChunkType::Main,
            start_pos: section.start_pos,
            end_pos: section.end_pos,
        }
    }

    /// A piece of an oversized section; `start`/`end` are section-relative
    pub fn sub(
        section: &Section<'_>,
        content: String,
        token_count: usize,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            content,
            heading: section.heading.clone(),
            level: section.level,
            path: section.path.clone(),
            token_count,
            chunk_type: ChunkType::Sub,
            start_pos: section.start_pos + start,
            end_pos: section.start_pos + end,
        }
    }

    /// Overlap text carried in front of the source slice
    pub fn overlap_prefix(&self) -> &str {
        let source_len = self.end_pos.saturating_sub(self.start_pos);
        let split = self.content.len().saturating_sub(source_len);
        self.content.get(..split).unwrap_or_default()
    }

    /// Assign the content id and drop the position bookkeeping
    pub fn finalize(self) -> Chunk {
        Chunk {
            id: chunk_id(&self.content),
            content: self.content,
            heading: self.heading,
            level: self.level,
            path: self.path,
            token_count: self.token_count,
            chunk_type: self.chunk_type,
        }
    }
}

/// Deterministic fingerprint of chunk content
pub fn chunk_id(content: &str) -> ChunkId {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(CHUNK_ID_LEN);
    id
}

/// Estimate token count for a piece of text
/// Uses a simple heuristic: 1 token ≈ 4 characters
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

#[cfg(test)]
mod chunk_tests {
    use super::*;

    #[test]
    fn test_token_estimation() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 0);
        assert_eq!(estimate_tokens("test"), 1);
        assert_eq!(estimate_tokens("test test"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(8000)), 2000);
        // Characters, not bytes
        assert_eq!(estimate_tokens("αβγδ"), 1);
    }

    #[test]
    fn test_chunk_id_is_stable() {
        let a = chunk_id("The quick brown fox");
        let b = chunk_id("The quick brown fox");
        assert_eq!(a, b);
        assert_eq!(a.len(), CHUNK_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_chunk_id_differs_by_one_character() {
        assert_ne!(chunk_id("force = m a"), chunk_id("force = m b"));
    }

    #[test]
    fn test_chunk_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ChunkType::Main).unwrap(), "\"main\"");
        assert_eq!(serde_json::to_string(&ChunkType::Sub).unwrap(), "\"sub\"");
        assert_eq!(ChunkType::Sub.as_str(), "sub");
    }

    #[test]
    fn test_overlap_prefix_from_span() {
        let section_text = "# S\nbody";
        let section = Section {
            content: section_text,
            heading: "S".to_string(),
            level: 1,
            path: "S".to_string(),
            start_pos: 100,
            end_pos: 108,
            token_count: 2,
        };

        let main = Draft::main(&section);
        assert_eq!(main.overlap_prefix(), "");

        let sub = Draft::sub(&section, "tail body".to_string(), 2, 4, 8);
        assert_eq!(sub.overlap_prefix(), "tail ");
    }

    #[test]
    fn test_finalize_drops_positions() {
        let draft = Draft {
            content: "Energy is conserved.".to_string(),
            heading: "Energy".to_string(),
            level: 2,
            path: "Mechanics > Energy".to_string(),
            token_count: 5,
            chunk_type: ChunkType::Main,
            start_pos: 40,
            end_pos: 60,
        };

        let chunk = draft.finalize();
        assert_eq!(chunk.id, chunk_id("Energy is conserved."));
        assert_eq!(chunk.heading, "Energy");
        assert_eq!(chunk.path, "Mechanics > Energy");
        assert_eq!(chunk.token_count, 5);
    }
}
