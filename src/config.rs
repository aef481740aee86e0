use crate::error::ChunkError;
use serde::{Deserialize, Serialize};

/// Upper bound on estimated tokens per chunk
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1024;

/// Tokens of trailing context carried into the next sub-chunk
pub const DEFAULT_OVERLAP_SIZE: usize = 200;

/// Chunks below this many tokens are merge candidates
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 100;

/// How the heading breadcrumb of a section is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breadcrumb {
    /// Every heading title seen so far, in document order
    #[default]
    Cumulative,
    /// Only the chain of enclosing headings
    Nested,
}

/// Size parameters for a chunking run, all in estimated tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    pub max_chunk_size: usize,
    pub overlap_size: usize,
    pub min_chunk_size: usize,
    pub breadcrumb: Breadcrumb,
}

impl ChunkerConfig {
    /// Create a config with the default limits
    pub fn new() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            breadcrumb: Breadcrumb::Cumulative,
        }
    }

    /// Set maximum tokens per chunk
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Set overlap carried between sub-chunks
    pub fn overlap_size(mut self, size: usize) -> Self {
        self.overlap_size = size;
        self
    }

    /// Set the merge threshold
    pub fn min_chunk_size(mut self, size: usize) -> Self {
        self.min_chunk_size = size;
        self
    }

    pub fn breadcrumb(mut self, breadcrumb: Breadcrumb) -> Self {
        self.breadcrumb = breadcrumb;
        self
    }

    /// Character width of a full chunk window
    pub(crate) fn max_chars(&self) -> usize {
        self.max_chunk_size * 4
    }

    /// Character width of the trailing overlap window
    pub(crate) fn overlap_chars(&self) -> usize {
        self.overlap_size * 4
    }

    /// Reject limits that would produce empty or runaway chunks
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.max_chunk_size == 0 {
            return Err(ChunkError::InvalidConfig(
                "max_chunk_size must be greater than zero".to_string(),
            ));
        }

        if self.max_chunk_size <= self.min_chunk_size {
            return Err(ChunkError::InvalidConfig(format!(
                "max_chunk_size ({}) must be greater than min_chunk_size ({})",
                self.max_chunk_size, self.min_chunk_size
            )));
        }

        if self.overlap_size >= self.max_chunk_size {
            return Err(ChunkError::InvalidConfig(format!(
                "overlap_size ({}) must be smaller than max_chunk_size ({})",
                self.overlap_size, self.max_chunk_size
            )));
        }

        Ok(())
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ChunkerConfig::default();
        assert_eq!(config.max_chunk_size, 1024);
        assert_eq!(config.overlap_size, 200);
        assert_eq!(config.min_chunk_size, 100);
        assert_eq!(config.breadcrumb, Breadcrumb::Cumulative);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = ChunkerConfig::new()
            .max_chunk_size(50)
            .overlap_size(10)
            .min_chunk_size(5)
            .breadcrumb(Breadcrumb::Nested);

        assert_eq!(config.max_chars(), 200);
        assert_eq!(config.overlap_chars(), 40);
        assert_eq!(config.breadcrumb, Breadcrumb::Nested);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reject_max_not_above_min() {
        let result = ChunkerConfig::new().max_chunk_size(100).min_chunk_size(100).validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("min_chunk_size"));
    }

    #[test]
    fn test_reject_overlap_not_below_max() {
        let result = ChunkerConfig::new()
            .max_chunk_size(200)
            .overlap_size(200)
            .min_chunk_size(10)
            .validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("overlap_size"));
    }

    #[test]
    fn test_reject_zero_max() {
        let result = ChunkerConfig::new()
            .max_chunk_size(0)
            .overlap_size(0)
            .min_chunk_size(0)
            .validate();
        assert!(result.is_err());
    }
}
