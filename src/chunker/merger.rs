use super::chunk::{Draft, estimate_tokens};
use crate::config::ChunkerConfig;

/// Separator inserted between merged chunk contents
pub const MERGE_SEPARATOR: &str = "\n\n";

/// Coalesce undersized neighbours that share heading level and path
///
/// Single greedy pass: the accumulator keeps absorbing the next chunk while
/// it is below `min_chunk_size` and the combined count stays within
/// `max_chunk_size`. Returns the merged drafts and the number of merges.
pub(crate) fn merge_small_chunks(
    mut drafts: Vec<Draft>,
    config: &ChunkerConfig,
) -> (Vec<Draft>, usize) {
    drafts.sort_by_key(|d| d.start_pos);

    let mut merged = Vec::with_capacity(drafts.len());
    let mut merges = 0;
    let mut iter = drafts.into_iter();

    let Some(mut current) = iter.next() else {
        return (merged, merges);
    };

    for next in iter {
        if can_merge(&current, &next, config) {
            // Skip overlap that repeats the tail being merged into
            let prefix = next.overlap_prefix();
            let (body, tokens) = if !prefix.is_empty() && current.content.ends_with(prefix) {
                let body = &next.content[prefix.len()..];
                (body, estimate_tokens(body))
            } else {
                (next.content.as_str(), next.token_count)
            };
            current.content.push_str(MERGE_SEPARATOR);
            current.content.push_str(body);
            current.token_count += tokens;
            current.end_pos = next.end_pos;
            merges += 1;
        } else {
            merged.push(std::mem::replace(&mut current, next));
        }
    }

    merged.push(current);
    (merged, merges)
}

fn can_merge(current: &Draft, next: &Draft, config: &ChunkerConfig) -> bool {
    current.token_count < config.min_chunk_size
        && current.level == next.level
        && current.path == next.path
        && current.token_count + next.token_count <= config.max_chunk_size
}
