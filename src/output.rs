use crate::chunker::Chunk;
use crate::error::ChunkError;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Columns written for the CSV projection
pub const CSV_COLUMNS: [&str; 5] = ["id", "heading", "path", "token_count", "content"];

/// Serialization format for a chunk sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// Pretty-printed JSON array
    Json,
    /// Fixed columns: id, heading, path, token_count, content
    Csv,
}

impl OutputFormat {
    /// File extension used when writing this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ChunkError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Read a markdown document from disk
pub fn load_markdown(path: &Path) -> Result<String, ChunkError> {
    fs::read_to_string(path).map_err(|source| ChunkError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize chunks in `format` to any writer
///
/// Failures of the writer surface as the underlying `io::Error`.
pub fn write_chunks<W: Write>(
    chunks: &[Chunk],
    format: OutputFormat,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        OutputFormat::Jsonl => {
            for chunk in chunks {
                serde_json::to_writer(&mut *writer, chunk)?;
                writer.write_all(b"\n")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, chunks)?;
            writer.write_all(b"\n")?;
        }
        OutputFormat::Csv => {
            writeln!(writer, "{}", CSV_COLUMNS.join(","))?;
            for chunk in chunks {
                let token_count = chunk.token_count.to_string();
                let row = [
                    chunk.id.as_str(),
                    chunk.heading.as_str(),
                    chunk.path.as_str(),
                    token_count.as_str(),
                    chunk.content.as_str(),
                ];
                let line = row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",");
                writeln!(writer, "{}", line)?;
            }
        }
    }
    Ok(())
}

/// Write chunks to `path`, creating parent directories as needed
pub fn save_chunks(chunks: &[Chunk], format: OutputFormat, path: &Path) -> Result<(), ChunkError> {
    let io_err = |source| ChunkError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_chunks(chunks, format, &mut writer).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    info!(path = %path.display(), chunks = chunks.len(), %format, "saved chunks");
    Ok(())
}

/// Read chunks back from a JSONL file, skipping blank lines
pub fn read_jsonl(path: &Path) -> Result<Vec<Chunk>, ChunkError> {
    let file = File::open(path).map_err(|source| ChunkError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut chunks = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| ChunkError::InputUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk = serde_json::from_str(&line).map_err(|source| ChunkError::MalformedRecord {
            line: index + 1,
            source,
        })?;
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Quote a CSV field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
