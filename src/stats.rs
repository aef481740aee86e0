use crate::chunker::{Chunk, ChunkType};
use crate::error::ChunkError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Largest token count before the report suggests a smaller limit
pub const LARGE_CHUNK_TOKENS: usize = 1500;
/// Mean token count below which the report suggests a larger limit
pub const SMALL_MEAN_TOKENS: f64 = 400.0;

/// Min/max/mean/median/sample-stdev of a series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
    pub stdev: f64,
}

impl Summary {
    pub fn from_values(values: &[usize]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let n = sorted.len();
        let mean = sorted.iter().sum::<usize>() as f64 / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2] as f64
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
        };
        let stdev = if n > 1 {
            let var = sorted
                .iter()
                .map(|&v| (v as f64 - mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Self {
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            stdev,
        }
    }
}

/// Aggregate statistics over a chunk sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkStats {
    pub total_chunks: usize,
    pub total_tokens: usize,
    pub token_count: Summary,
    /// Content lengths in characters
    pub content_length: Summary,
    /// Chunk count per heading level
    pub heading_levels: BTreeMap<u8, usize>,
    /// Chunk count per chunk type ("main" / "sub")
    pub chunk_types: BTreeMap<String, usize>,
    pub generated_at: DateTime<Utc>,
}

impl ChunkStats {
    pub fn from_chunks(chunks: &[Chunk]) -> Self {
        let tokens: Vec<usize> = chunks.iter().map(|c| c.token_count).collect();
        let lengths: Vec<usize> = chunks.iter().map(|c| c.content.chars().count()).collect();

        let mut heading_levels = BTreeMap::new();
        let mut chunk_types = BTreeMap::new();
        for chunk in chunks {
            *heading_levels.entry(chunk.level).or_insert(0) += 1;
            *chunk_types
                .entry(chunk.chunk_type.as_str().to_string())
                .or_insert(0) += 1;
        }

        Self {
            total_chunks: chunks.len(),
            total_tokens: tokens.iter().sum(),
            token_count: Summary::from_values(&tokens),
            content_length: Summary::from_values(&lengths),
            heading_levels,
            chunk_types,
            generated_at: Utc::now(),
        }
    }

    /// Share of chunks produced by splitting oversized sections
    pub fn sub_chunk_ratio(&self) -> f64 {
        if self.total_chunks == 0 {
            return 0.0;
        }
        let subs = self
            .chunk_types
            .get(ChunkType::Sub.as_str())
            .copied()
            .unwrap_or(0);
        subs as f64 / self.total_chunks as f64
    }

    /// Tuning hints derived from the size distribution
    pub fn recommendations(&self) -> Vec<&'static str> {
        let mut hints = Vec::new();
        if self.total_chunks == 0 {
            return hints;
        }

        let tokens = &self.token_count;
        if tokens.max > LARGE_CHUNK_TOKENS {
            hints.push("Consider reducing max_chunk_size as some chunks are quite large");
        }
        if tokens.mean < SMALL_MEAN_TOKENS {
            hints.push("Consider increasing max_chunk_size as chunks are relatively small on average");
        }
        if tokens.stdev > tokens.mean * 0.5 {
            hints.push("High variation in chunk sizes, the chunking strategy may need refining");
        }
        if self.sub_chunk_ratio() > 0.5 {
            hints.push("Many large sections were split into sub-chunks, consider restructuring the document");
        }
        hints
    }

    /// Pretty-printed JSON form of the statistics
    pub fn to_json(&self) -> Result<String, ChunkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render a markdown analysis report
    pub fn to_report(&self) -> String {
        if self.total_chunks == 0 {
            return "No data available for analysis.\n".to_string();
        }

        // Writing to a String cannot fail
        let mut out = String::new();
        let total = self.total_chunks as f64;

        let _ = writeln!(out, "# Chunk Analysis Report\n");
        let _ = writeln!(out, "Generated: {}\n", self.generated_at.to_rfc3339());

        let _ = writeln!(out, "## General Statistics");
        let _ = writeln!(out, "- Total chunks: {}", self.total_chunks);
        let _ = writeln!(out, "- Total tokens: {}", self.total_tokens);
        let _ = writeln!(out, "- Average tokens per chunk: {:.2}\n", self.token_count.mean);

        write_summary(&mut out, "Token Count Statistics", &self.token_count);
        write_summary(&mut out, "Content Length Statistics (characters)", &self.content_length);

        let _ = writeln!(out, "## Heading Level Distribution");
        for (level, count) in &self.heading_levels {
            let name = match level {
                0 => "Document Start".to_string(),
                n => format!("Level {}", n),
            };
            let _ = writeln!(
                out,
                "- {}: {} chunks ({:.1}%)",
                name,
                count,
                *count as f64 / total * 100.0
            );
        }
        out.push('\n');

        let _ = writeln!(out, "## Chunk Type Distribution");
        for (kind, count) in &self.chunk_types {
            let _ = writeln!(
                out,
                "- {}: {} chunks ({:.1}%)",
                kind,
                count,
                *count as f64 / total * 100.0
            );
        }
        out.push('\n');

        let _ = writeln!(out, "## Recommendations");
        let hints = self.recommendations();
        if hints.is_empty() {
            let _ = writeln!(out, "- None");
        }
        for hint in hints {
            let _ = writeln!(out, "- {}", hint);
        }

        out
    }
}

fn write_summary(out: &mut String, title: &str, summary: &Summary) {
    let _ = writeln!(out, "## {}", title);
    let _ = writeln!(out, "- Minimum: {}", summary.min);
    let _ = writeln!(out, "- Maximum: {}", summary.max);
    let _ = writeln!(out, "- Average: {:.2}", summary.mean);
    let _ = writeln!(out, "- Median: {}", summary.median);
    let _ = writeln!(out, "- Standard Deviation: {:.2}\n", summary.stdev);
}
