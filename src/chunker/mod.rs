mod chunk;
mod merger;
mod overlap;
mod pipeline;
mod splitter;


pub use chunk::{Chunk, ChunkType, chunk_id, estimate_tokens};
pub use merger::MERGE_SEPARATOR;
pub use pipeline::{PipelineReport, chunk, chunk_with_report};

/// Content-derived identifier for a chunk
pub type ChunkId = String;

/// Hex characters kept from the content digest
pub const CHUNK_ID_LEN: usize = 12;
