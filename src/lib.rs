// Public API exports
pub mod chunker;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod stats;

// Re-export main types for convenience
pub use config::{Breadcrumb, ChunkerConfig};
pub use error::ChunkError;

pub use parser::{FormulaSpan, HeadingMarker, Section, detect_formula_spans, index_headings, slice_sections};

pub use chunker::{Chunk, ChunkId, ChunkType, PipelineReport, chunk, chunk_with_report, estimate_tokens};

pub use output::{OutputFormat, load_markdown, read_jsonl, save_chunks, write_chunks};

pub use stats::{ChunkStats, Summary};
