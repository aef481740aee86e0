use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("Invalid chunker configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read markdown from {path}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write chunks to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize chunks: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Malformed chunk record on line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}
