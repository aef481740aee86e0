use super::chunk::{Chunk, Draft};
use super::merger::merge_small_chunks;
use super::splitter::split_section;
use crate::config::ChunkerConfig;
use crate::error::ChunkError;
use crate::parser::{index_headings, slice_sections};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Counters collected while chunking one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Non-empty sections found between headings
    pub sections: usize,
    /// Sections that exceeded `max_chunk_size`
    pub oversized_sections: usize,
    /// Pieces produced by splitting those sections
    pub sub_chunks: usize,
    /// Merges performed by the small-chunk pass
    pub merges: usize,
    /// Chunks emitted
    pub chunks: usize,
}

/// Chunk a markdown document
///
/// Headings define sections, oversized sections are split (paragraph, then
/// sentence, then fixed-width) without cutting formulas, undersized
/// neighbours are merged, and each chunk gets a content-derived id.
/// Output is in document order.
pub fn chunk(document: &str, config: &ChunkerConfig) -> Result<Vec<Chunk>, ChunkError> {
    chunk_with_report(document, config).map(|(chunks, _)| chunks)
}

/// Same as [`chunk`], also returning pipeline counters
pub fn chunk_with_report(
    document: &str,
    config: &ChunkerConfig,
) -> Result<(Vec<Chunk>, PipelineReport), ChunkError> {
    config.validate()?;

    let mut report = PipelineReport::default();
    let drafts = draft_chunks(document, config, &mut report);

    let (merged, merges) = merge_small_chunks(drafts, config);
    report.merges = merges;

    let chunks: Vec<Chunk> = merged.into_iter().map(Draft::finalize).collect();
    report.chunks = chunks.len();

    info!(
        sections = report.sections,
        oversized = report.oversized_sections,
        sub_chunks = report.sub_chunks,
        merges = report.merges,
        chunks = report.chunks,
        "chunked document"
    );

    Ok((chunks, report))
}

/// Heading sections, with oversized ones split into sub-chunks
pub(crate) fn draft_chunks(
    document: &str,
    config: &ChunkerConfig,
    report: &mut PipelineReport,
) -> Vec<Draft> {
    let markers = index_headings(document);
    let sections = slice_sections(document, &markers, config.breadcrumb);
    debug!(
        headings = markers.len().saturating_sub(2),
        sections = sections.len(),
        "indexed document"
    );

    let mut drafts = Vec::with_capacity(sections.len());
    for section in &sections {
        report.sections += 1;

        if section.token_count <= config.max_chunk_size {
            drafts.push(Draft::main(section));
            continue;
        }

        report.oversized_sections += 1;
        let pieces = split_section(section.content, config);
        debug!(
            heading = %section.heading,
            tokens = section.token_count,
            pieces = pieces.len(),
            "split oversized section"
        );

        report.sub_chunks += pieces.len();
        drafts.extend(pieces.into_iter().map(|piece| {
            Draft::sub(
                section,
                piece.content,
                piece.token_count,
                piece.start,
                piece.end,
            )
        }));
    }

    drafts
}
